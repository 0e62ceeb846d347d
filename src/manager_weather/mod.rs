use std::time::Duration;
use log::info;
use reqwest::blocking::{Client, Response};
use thiserror::Error;
use crate::config::WeatherApiParameters;
use crate::models::RawWeatherReading;
use crate::transform::TransformError;

/// Struct for probing and fetching current weather from an OpenWeather compatible api
pub struct WeatherApi {
    client: Client,
    url: String,
    city: String,
    api_key: String,
    log_response: bool,
}

impl WeatherApi {
    /// Returns a weather api struct ready for probing and fetching
    ///
    /// # Arguments
    ///
    /// * 'config' - weather api configuration
    /// * 'city' - the city to get current weather for
    pub fn new(config: &WeatherApiParameters, city: &str) -> Result<WeatherApi, WeatherApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(WeatherApi {
            client,
            url: format!("{}{}", config.http_conn.trim_end_matches('/'), config.endpoint),
            city: city.to_string(),
            api_key: config.api_key.clone(),
            log_response: config.log_response,
        })
    }

    /// Checks whether the api is up and answering for the configured city
    ///
    pub fn is_ready(&self) -> Result<(), WeatherApiError> {
        let response = self.get()?;
        info!("Weather api probe answered {}", response.status());

        Ok(())
    }

    /// Retrieves the current weather for the configured city
    ///
    pub fn current_weather(&self) -> Result<RawWeatherReading, WeatherApiError> {
        let json = self.get()?.text()
            .map_err(|e| WeatherApiError::NetworkError(e.without_url()))?;

        if self.log_response {
            info!("Weather api response: {}", json);
        }

        Ok(RawWeatherReading::from_json(&json)?)
    }

    /// Sends the weather request, anything but a success status is an error.
    /// Urls are stripped from errors since they carry the api key.
    ///
    fn get(&self) -> Result<Response, WeatherApiError> {
        let response = self.client
            .get(&self.url)
            .query(&[("q", self.city.as_str()), ("appid", self.api_key.as_str())])
            .send()
            .map_err(|e| WeatherApiError::NetworkError(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WeatherApiError::StatusError(status.as_u16()));
        }

        Ok(response)
    }
}

#[derive(Error, Debug)]
pub enum WeatherApiError {
    #[error("NetworkError: {0}")]
    NetworkError(#[from] reqwest::Error),
    #[error("StatusError: api answered {0}")]
    StatusError(u16),
    #[error("ParseError: {0}")]
    ParseError(#[from] TransformError),
}
