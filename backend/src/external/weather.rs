//! Weather API client for fetching current conditions
//!
//! Integrates with WeatherAPI.com (`current.json`)

use reqwest::Client;
use serde::Deserialize;
use shared::{Coordinate, WeatherSnapshot};

use super::{http_client, success_body};
use crate::config::WeatherConfig;
use crate::error::{AppError, AppResult};

pub const SOURCE_NAME: &str = "weatherapi";

/// Weather API client
#[derive(Clone)]
pub struct WeatherApiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

/// WeatherAPI.com response for current weather
#[derive(Debug, Deserialize)]
struct CurrentResponse {
    current: CurrentConditions,
}

#[derive(Debug, Deserialize)]
struct CurrentConditions {
    temp_c: f64,
    humidity: f64,
}

impl WeatherApiClient {
    /// Create a new WeatherApiClient
    pub fn new(config: &WeatherConfig) -> AppResult<Self> {
        Ok(Self {
            client: http_client(config.timeout(), None)?,
            api_key: config.api_key.clone(),
            base_url: config.api_endpoint.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch current weather conditions by GPS coordinates
    pub async fn get_current_weather(&self, coord: &Coordinate) -> AppResult<WeatherSnapshot> {
        let url = format!("{}/current.json", self.base_url);
        let location = coord.to_string();
        tracing::debug!("Fetching current weather for {}", location);

        let response = self
            .client
            .get(&url)
            .query(&[("key", self.api_key.as_str()), ("q", location.as_str())])
            .send()
            .await
            .map_err(|e| AppError::external(SOURCE_NAME, format!("Request failed: {}", e)))?;

        let body = success_body(SOURCE_NAME, response).await?;
        parse_current_weather(&body)
    }
}

/// Convert a `current.json` payload to a weather snapshot
pub fn parse_current_weather(body: &str) -> AppResult<WeatherSnapshot> {
    let data: CurrentResponse = serde_json::from_str(body).map_err(|e| {
        AppError::external(SOURCE_NAME, format!("Failed to parse weather response: {}", e))
    })?;

    let CurrentConditions { temp_c, humidity } = data.current;
    if !temp_c.is_finite() || !humidity.is_finite() {
        return Err(AppError::external(SOURCE_NAME, "non-numeric weather reading"));
    }

    Ok(WeatherSnapshot {
        temperature: temp_c,
        humidity,
    })
}
