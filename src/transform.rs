use chrono::{DateTime, Local};
use serde::Deserialize;
use thiserror::Error;
use crate::models::{RawWeatherReading, TransformedWeatherRow};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Deserialize)]
struct WeatherEntry {
    description: String,
}

/// The api delivers a list of conditions, a single object is accepted as well
#[derive(Deserialize)]
#[serde(untagged)]
enum WeatherField {
    Many(Vec<WeatherEntry>),
    One(WeatherEntry),
}

#[derive(Deserialize)]
struct Main {
    temp: f64,
}

#[derive(Deserialize)]
struct WeatherDocument {
    name: String,
    weather: WeatherField,
    main: Main,
}

impl RawWeatherReading {
    /// Parses a current weather document into a reading
    ///
    /// # Arguments
    ///
    /// * 'json' - response body from the weather api
    pub fn from_json(json: &str) -> Result<RawWeatherReading, TransformError> {
        let doc: WeatherDocument = serde_json::from_str(json)
            .map_err(|e| TransformError::Document(e.to_string()))?;

        let description = match doc.weather {
            WeatherField::One(entry) => entry.description,
            WeatherField::Many(entries) => entries
                .into_iter()
                .next()
                .ok_or(TransformError::NoCondition)?
                .description,
        };

        Ok(RawWeatherReading {
            city: doc.name,
            description,
            temp_kelvin: doc.main.temp,
        })
    }
}

/// Converts a temperature from Kelvin to Fahrenheit
///
/// # Arguments
///
/// * 'kelvin' - temperature in Kelvin
pub fn kelvin_to_fahrenheit(kelvin: f64) -> f64 {
    (kelvin - 273.15) * 9.0 / 5.0 + 32.0
}

/// Builds the flat row for a reading, stamped with the given time
///
/// # Arguments
///
/// * 'reading' - the fetched weather reading
/// * 'now' - generation time of the row
pub fn transform(reading: &RawWeatherReading, now: DateTime<Local>) -> TransformedWeatherRow {
    TransformedWeatherRow {
        city: reading.city.clone(),
        description: reading.description.clone(),
        temperature_f: kelvin_to_fahrenheit(reading.temp_kelvin),
        timestamp: now.format(TIMESTAMP_FORMAT).to_string(),
    }
}

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("DocumentError: {0}")]
    Document(String),
    #[error("NoCondition: weather list is empty")]
    NoCondition,
}
