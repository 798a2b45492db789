//! Historical rainfall client
//!
//! Integrates with the Open-Meteo archive API for daily precipitation sums.

use chrono::{Duration, NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;
use shared::{monthly_rainfall_from_daily, Coordinate, RainfallAverage};

use super::{http_client, success_body};
use crate::config::RainfallConfig;
use crate::error::{AppError, AppResult};

pub const SOURCE_NAME: &str = "open-meteo-archive";

/// Open-Meteo archive client
#[derive(Clone)]
pub struct OpenMeteoArchiveClient {
    client: Client,
    base_url: String,
    window_days: i64,
    lag_days: i64,
}

#[derive(Debug, Deserialize)]
struct ArchiveResponse {
    daily: ArchiveDaily,
}

#[derive(Debug, Deserialize)]
struct ArchiveDaily {
    precipitation_sum: Vec<Option<f64>>,
}

/// Inclusive date range of the precipitation series
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RainfallWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Window ending `lag_days` before `today` and spanning `window_days` before that
pub fn rainfall_window(today: NaiveDate, window_days: i64, lag_days: i64) -> RainfallWindow {
    let end = today - Duration::days(lag_days);
    let start = end - Duration::days(window_days);
    RainfallWindow { start, end }
}

impl OpenMeteoArchiveClient {
    pub fn new(config: &RainfallConfig) -> AppResult<Self> {
        Ok(Self {
            client: http_client(config.timeout(), None)?,
            base_url: config.api_endpoint.clone(),
            window_days: config.window_days,
            lag_days: config.lag_days,
        })
    }

    /// Average monthly rainfall (mm) over the configured window ending today
    pub async fn get_monthly_rainfall(&self, coord: &Coordinate) -> AppResult<f64> {
        let window = rainfall_window(Utc::now().date_naive(), self.window_days, self.lag_days);
        let daily = self.get_daily_precipitation(coord, window).await?;

        match monthly_rainfall_from_daily(&daily) {
            RainfallAverage::Monthly(mm) => Ok(mm),
            RainfallAverage::NoMeasurements => Err(AppError::external(
                SOURCE_NAME,
                format!(
                    "no precipitation values between {} and {}",
                    window.start, window.end
                ),
            )),
        }
    }

    /// Daily precipitation sums (mm) for the window; missing days are `None`
    pub async fn get_daily_precipitation(
        &self,
        coord: &Coordinate,
        window: RainfallWindow,
    ) -> AppResult<Vec<Option<f64>>> {
        let query = [
            ("latitude", coord.latitude.to_string()),
            ("longitude", coord.longitude.to_string()),
            ("start_date", window.start.format("%Y-%m-%d").to_string()),
            ("end_date", window.end.format("%Y-%m-%d").to_string()),
            ("daily", "precipitation_sum".to_string()),
        ];
        tracing::debug!(
            "Fetching daily precipitation for {} from {} to {}",
            coord,
            window.start,
            window.end
        );

        let response = self
            .client
            .get(&self.base_url)
            .query(&query)
            .send()
            .await
            .map_err(|e| AppError::external(SOURCE_NAME, format!("Request failed: {}", e)))?;

        let body = success_body(SOURCE_NAME, response).await?;
        parse_daily_precipitation(&body)
    }
}

/// Extract `daily.precipitation_sum` from an archive payload
pub fn parse_daily_precipitation(body: &str) -> AppResult<Vec<Option<f64>>> {
    let data: ArchiveResponse = serde_json::from_str(body).map_err(|e| {
        AppError::external(SOURCE_NAME, format!("Failed to parse archive response: {}", e))
    })?;
    Ok(data.daily.precipitation_sum)
}
