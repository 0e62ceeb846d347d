use lettre::message::Mailbox;
use lettre::{Message, SmtpTransport, Transport};
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use thiserror::Error;
use crate::config::MailParameters;
use crate::models::RunReport;

pub struct Mail {
    sender: SmtpTransport,
    from: Mailbox,
    to: Mailbox,
}

impl Mail {
    /// Returns a new instance of the Mail struct
    ///
    /// # Arguments
    ///
    /// * 'config' - mail configuration parameters
    pub fn new(config: &MailParameters) -> Result<Self, MailError> {
        let credentials = Credentials::new(config.smtp_user.to_owned(), config.smtp_password.to_owned());
        let sender = SmtpTransport::relay(&config.smtp_endpoint)
            .map_err(|e| MailError::SMTPTransportError(e.to_string()))?
            .credentials(credentials)
            .build();

        let (from, to) = parse_addresses(&config.from, &config.to)?;

        Ok(Self { sender, from, to })
    }

    /// Sends a report of a successful run
    ///
    /// # Arguments
    ///
    /// * 'dag_id' - name of the pipeline
    /// * 'report' - outcome of the run
    pub fn send_report(&self, dag_id: &str, report: &RunReport) -> Result<(), MailError> {
        self.send_mail(format!("{}: Report", dag_id), report_body(report))
    }

    /// Sends a notice about a failed run
    ///
    /// # Arguments
    ///
    /// * 'dag_id' - name of the pipeline
    /// * 'error' - description of the failure
    pub fn send_failure(&self, dag_id: &str, error: &str) -> Result<(), MailError> {
        self.send_mail(format!("{}: Error", dag_id), format!("Run failed: {}", error))
    }

    fn send_mail(&self, subject: String, body: String) -> Result<(), MailError> {
        let message = compose(&self.from, &self.to, subject, body)?;

        self.sender.send(&message)
            .map_err(|e| MailError::TransportError(e.to_string()))?;

        Ok(())
    }
}

fn parse_addresses(from: &str, to: &str) -> Result<(Mailbox, Mailbox), MailError> {
    let from = from.parse::<Mailbox>()
        .map_err(|e| MailError::ParseError(format!("from address: {}", e)))?;
    let to = to.parse::<Mailbox>()
        .map_err(|e| MailError::ParseError(format!("to address: {}", e)))?;

    Ok((from, to))
}

fn compose(from: &Mailbox, to: &Mailbox, subject: String, body: String) -> Result<Message, MailError> {
    Message::builder()
        .from(from.clone())
        .to(to.clone())
        .subject(subject)
        .header(ContentType::TEXT_PLAIN)
        .body(body)
        .map_err(|e| MailError::MessageError(e.to_string()))
}

fn report_body(report: &RunReport) -> String {
    let mut body = format!(
        "City: {}\nDescription: {}\nTemperature_F: {:.2}\nTimestamp: {}\nTarget: {}\n",
        report.row.city, report.row.description, report.row.temperature_f, report.row.timestamp, report.target,
    );
    if let Some(path) = &report.written {
        body.push_str(&format!("Written: {}\n", path));
    }

    body
}

/// Error depicting errors that occur while sending emails
///
#[derive(Debug, Error)]
pub enum MailError {
    #[error("SMTPTransportError: {0}")]
    SMTPTransportError(String),
    #[error("TransportError: {0}")]
    TransportError(String),
    #[error("ParseError: {0}")]
    ParseError(String),
    #[error("MessageError: {0}")]
    MessageError(String),
}
