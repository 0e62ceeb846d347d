use std::time::Duration;
use serde::Serialize;

/// Current weather for one city as delivered by the weather api
#[derive(Clone, PartialEq, Debug)]
pub struct RawWeatherReading {
    pub city: String,
    pub description: String,
    pub temp_kelvin: f64,
}

/// Flat record ready to be appended to a tabular sink
#[derive(Clone, Serialize, PartialEq, Debug)]
pub struct TransformedWeatherRow {
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Temperature_F")]
    pub temperature_f: f64,
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct RetryPolicy {
    /// Attempts made after the first one fails
    pub retries: u32,
    pub delay: Duration,
}

/// Outcome of a successful run
#[derive(Debug)]
pub struct RunReport {
    pub row: TransformedWeatherRow,
    pub target: String,
    pub written: Option<String>,
}
