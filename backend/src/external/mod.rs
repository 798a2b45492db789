//! External API integrations

pub mod advisory;
pub mod geocoding;
pub mod rainfall;
pub mod soil;
pub mod weather;

pub use advisory::GeminiClient;
pub use geocoding::NominatimClient;
pub use rainfall::OpenMeteoArchiveClient;
pub use soil::SoilGridsClient;
pub use weather::WeatherApiClient;

use std::time::Duration;

use reqwest::{Client, Response};

use crate::error::{AppError, AppResult};

const USER_AGENT: &str = concat!("krishi-mitra/", env!("CARGO_PKG_VERSION"));

/// Build an HTTP client whose every request is bounded by `timeout`
pub(crate) fn http_client(timeout: Duration, user_agent: Option<&str>) -> AppResult<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(user_agent.unwrap_or(USER_AGENT))
        .build()
        .map_err(|e| AppError::Configuration(format!("Failed to create HTTP client: {}", e)))
}

/// Read the body of a successful response, turning error statuses into errors
pub(crate) async fn success_body(source_name: &'static str, response: Response) -> AppResult<String> {
    let status = response.status();
    if !status.is_success() {
        let body: String = response
            .text()
            .await
            .unwrap_or_default()
            .chars()
            .take(500)
            .collect();
        return Err(AppError::external(
            source_name,
            format!("API error: {} - {}", status, body),
        ));
    }

    response
        .text()
        .await
        .map_err(|e| AppError::external(source_name, format!("Failed to read response: {}", e)))
}
