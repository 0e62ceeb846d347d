use anyhow::{anyhow, Result};
use log::error;
use crate::initialization::init;
use crate::manager_mail::MailError;
use crate::worker::{run, WorkerError};

mod config;
mod initialization;
mod logging;
mod macros;
mod manager_mail;
mod manager_storage;
mod manager_weather;
pub mod models;
mod transform;
mod worker;

fn main() -> Result<()> {
    // Load config and set up all managers. If initialization fails, we are pretty much out of luck
    // and can't even log or send notification mail.
    let (config, mgr) = match init() {
        Ok((c, m)) => (c, m),
        Err(e) => {
            return Err(anyhow!("Initialization failed: {}", e));
        }
    };

    match run(&mgr, config.pipeline.retry_policy(), None) {
        Ok(report) => {
            if let Some(mail) = &mgr.mail {
                mail.send_report(&config.pipeline.dag_id, &report)?;
            }
        },
        Err(e) => {
            return Err(report_failure(e, |msg| match &mgr.mail {
                Some(mail) => mail.send_failure(&config.pipeline.dag_id, msg),
                None => Ok(()),
            }));
        }
    }

    Ok(())
}

/// Logs a failed run and passes it to the notifier. A failing notification is logged,
/// the run error is what gets returned.
///
/// # Arguments
///
/// * 'e' - the error that stopped the run
/// * 'notify' - sends the failure message
fn report_failure<F>(e: WorkerError, notify: F) -> anyhow::Error
where
    F: FnOnce(&str) -> Result<(), MailError>,
{
    error!("Run failed: {}", e);
    if let Err(mail_err) = notify(&e.to_string()) {
        error!("Failure notification not sent: {}", mail_err);
    }

    e.into()
}
