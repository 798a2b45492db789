//! Reverse geocoding client
//!
//! Integrates with OpenStreetMap Nominatim (`/reverse`). Nominatim requires
//! an identifying User-Agent on every request.

use reqwest::Client;
use serde::Deserialize;
use shared::Coordinate;

use super::{http_client, success_body};
use crate::config::GeocodingConfig;
use crate::error::{AppError, AppResult};

pub const SOURCE_NAME: &str = "nominatim";

/// Nominatim client
#[derive(Clone)]
pub struct NominatimClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    address: Option<Address>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Address {
    #[serde(default)]
    state: Option<String>,
}

impl NominatimClient {
    pub fn new(config: &GeocodingConfig) -> AppResult<Self> {
        Ok(Self {
            client: http_client(config.timeout(), Some(config.user_agent.as_str()))?,
            base_url: config.api_endpoint.clone(),
        })
    }

    /// Name of the state (top-level subdivision) containing the coordinate
    pub async fn reverse_state(&self, coord: &Coordinate) -> AppResult<String> {
        let query = [
            ("lat", coord.latitude.to_string()),
            ("lon", coord.longitude.to_string()),
            ("format", "jsonv2".to_string()),
            ("accept-language", "en".to_string()),
        ];
        tracing::debug!("Reverse geocoding {}", coord);

        let response = self
            .client
            .get(&self.base_url)
            .query(&query)
            .send()
            .await
            .map_err(|e| AppError::external(SOURCE_NAME, format!("Request failed: {}", e)))?;

        let body = success_body(SOURCE_NAME, response).await?;
        parse_state(&body)
    }
}

/// Extract `address.state` from a reverse geocoding payload
pub fn parse_state(body: &str) -> AppResult<String> {
    let data: ReverseResponse = serde_json::from_str(body).map_err(|e| {
        AppError::external(SOURCE_NAME, format!("Failed to parse geocoding response: {}", e))
    })?;

    if let Some(error) = data.error {
        return Err(AppError::external(SOURCE_NAME, error));
    }

    data.address
        .and_then(|a| a.state)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::external(SOURCE_NAME, "no state in address"))
}
