use chrono::{DateTime, Local};
use log::info;
use thiserror::Error;
use crate::initialization::Mgr;
use crate::models::{RetryPolicy, RunReport};
use crate::transform::transform;
use crate::retry;

/// Runs the pipeline once: probe the weather api, fetch current weather, transform and load it.
/// A step only runs when the one before it succeeded.
///
/// # Arguments
///
/// * 'mgr' - struct with configured managers
/// * 'policy' - retry policy applied to each step
/// * 'debug_run_time' - a run time to be used instead of Local now
pub fn run(mgr: &Mgr, policy: RetryPolicy, debug_run_time: Option<DateTime<Local>>) -> Result<RunReport, WorkerError> {
    retry!(policy, "is_weather_api_ready", || mgr.weather.is_ready())
        .map_err(|e| WorkerError::ProbeError(e.to_string()))?;

    let reading = retry!(policy, "extract_weather_data", || mgr.weather.current_weather())
        .map_err(|e| WorkerError::FetchError(e.to_string()))?;
    info!("Fetched weather for {}: {}, {} K", reading.city, reading.description, reading.temp_kelvin);

    let now = debug_run_time.unwrap_or_else(Local::now);
    let row = transform(&reading, now);

    let (target, written) = retry!(policy, "transform_load_weather_data", || mgr.sink.load(&row, now))
        .map_err(|e| WorkerError::LoadError(e.to_string()))?;

    info!("City: {}, Description: {}, Temperature_F: {:.2}, Timestamp: {}",
        row.city, row.description, row.temperature_f, row.timestamp);

    Ok(RunReport { row, target, written })
}

/// Error depicting errors that occur while running the pipeline
///
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("error while probing weather api: {0}")]
    ProbeError(String),
    #[error("error while fetching weather data: {0}")]
    FetchError(String),
    #[error("error while loading weather data: {0}")]
    LoadError(String),
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;
    use std::time::Duration;
    use chrono::TimeZone;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};
    use crate::config::{StorageMode, StorageParameters, WeatherApiParameters};
    use crate::manager_storage::Sink;
    use crate::manager_weather::WeatherApi;
    use super::*;

    const NO_DELAY: RetryPolicy = RetryPolicy { retries: 2, delay: Duration::ZERO };

    fn weather_body() -> serde_json::Value {
        json!({
            "weather": [{"description": "clear sky"}],
            "main": {"temp": 293.15},
            "name": "Portland",
        })
    }

    fn run_against(uri: String, dir: Option<PathBuf>) -> Result<RunReport, WorkerError> {
        let api = WeatherApiParameters {
            http_conn: uri,
            endpoint: "/data/2.5/weather".to_string(),
            api_key: "secret".to_string(),
            api_key_env: "OPENWEATHER_API_KEY".to_string(),
            log_response: false,
        };
        let storage = StorageParameters {
            mode: if dir.is_some() { StorageMode::Directory } else { StorageMode::Disabled },
            bucket: "weather-bucket".to_string(),
            dir: dir.map(|d| d.display().to_string()),
        };
        let mgr = Mgr {
            weather: WeatherApi::new(&api, "Portland").unwrap(),
            sink: Sink::new(&storage),
            mail: None,
        };
        let run_time = Local.with_ymd_and_hms(2024, 5, 3, 12, 0, 0).single().unwrap();

        run(&mgr, NO_DELAY, Some(run_time))
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn runs_all_steps_and_writes_csv() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(weather_body()))
            .mount(&server)
            .await;
        let dir = tempfile::tempdir().unwrap();

        let uri = server.uri();
        let out = dir.path().to_path_buf();
        let report = tokio::task::spawn_blocking(move || run_against(uri, Some(out)))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(report.row.city, "Portland");
        assert!((report.row.temperature_f - 68.0).abs() < 1e-9);
        assert_eq!(report.row.timestamp, "2024-05-03 12:00:00");
        assert_eq!(report.target, "s3://weather-bucket/current_weather_data_Portland_202405031200.csv");

        let content = fs::read_to_string(report.written.unwrap()).unwrap();
        assert!(content.starts_with("City,Description,Temperature_F,Timestamp\n"));
        assert_eq!(server.received_requests().await.unwrap().len(), 2);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn probe_is_retried_until_api_is_ready() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(weather_body()))
            .mount(&server)
            .await;

        let uri = server.uri();
        let report = tokio::task::spawn_blocking(move || run_against(uri, None))
            .await
            .unwrap()
            .unwrap();

        assert!(report.written.is_none());
        assert_eq!(server.received_requests().await.unwrap().len(), 4);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn unavailable_api_stops_the_run() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let uri = server.uri();
        let res = tokio::task::spawn_blocking(move || run_against(uri, None))
            .await
            .unwrap();

        assert!(matches!(res, Err(WorkerError::ProbeError(_))));
        assert_eq!(server.received_requests().await.unwrap().len(), 3);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn malformed_document_fails_fetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"cod": 200})))
            .mount(&server)
            .await;

        let uri = server.uri();
        let res = tokio::task::spawn_blocking(move || run_against(uri, None))
            .await
            .unwrap();

        assert!(matches!(res, Err(WorkerError::FetchError(_))));
        assert_eq!(server.received_requests().await.unwrap().len(), 4);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn failing_load_is_retried_then_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(weather_body()))
            .mount(&server)
            .await;
        let dir = tempfile::tempdir().unwrap();

        let uri = server.uri();
        let missing = dir.path().join("missing");
        let res = tokio::task::spawn_blocking(move || run_against(uri, Some(missing)))
            .await
            .unwrap();

        match res {
            Err(WorkerError::LoadError(msg)) => assert!(msg.starts_with("WriteError:"), "{}", msg),
            other => panic!("expected LoadError, got {:?}", other.map(|r| r.target)),
        }
        assert_eq!(server.received_requests().await.unwrap().len(), 2);
    }

    #[test]
    fn error_messages_are_not_quoted() {
        let e = WorkerError::FetchError("StatusError: api answered 500".to_string());

        assert_eq!(e.to_string(), "error while fetching weather data: StatusError: api answered 500");
    }
}
