//! Environmental data gateway
//!
//! One interface over the three live data sources. Each operation applies
//! its source's failure policy:
//!
//! | source   | on failure                   |
//! |----------|------------------------------|
//! | weather  | `None` (request fails)       |
//! | rainfall | `None` (request fails)       |
//! | soil     | documented default profile   |
//!
//! Nothing here retries; each call is one attempt bounded by the client's
//! timeout.

use async_trait::async_trait;
use shared::{Coordinate, SoilProfile, WeatherSnapshot};

use crate::config::Config;
use crate::error::AppResult;
use crate::external::{
    rainfall, soil, weather, OpenMeteoArchiveClient, SoilGridsClient, WeatherApiClient,
};

/// Live environmental data for a coordinate
#[async_trait]
pub trait EnvironmentalGateway: Send + Sync {
    /// Current temperature and humidity, or `None` if unavailable
    async fn fetch_weather(&self, coord: &Coordinate) -> Option<WeatherSnapshot>;

    /// Average monthly rainfall (mm) over the recent window, or `None` if unavailable
    async fn fetch_rainfall_estimate(&self, coord: &Coordinate) -> Option<f64>;

    /// Topsoil chemistry; never fails, substitutes defaults instead
    async fn fetch_soil_profile(&self, coord: &Coordinate) -> SoilProfile;
}

/// Gateway backed by the WeatherAPI.com, Open-Meteo and SoilGrids clients
#[derive(Clone)]
pub struct HttpEnvironmentalGateway {
    weather: WeatherApiClient,
    rainfall: OpenMeteoArchiveClient,
    soil: SoilGridsClient,
}

impl HttpEnvironmentalGateway {
    pub fn new(config: &Config) -> AppResult<Self> {
        Ok(Self {
            weather: WeatherApiClient::new(&config.weather)?,
            rainfall: OpenMeteoArchiveClient::new(&config.rainfall)?,
            soil: SoilGridsClient::new(&config.soil)?,
        })
    }
}

#[async_trait]
impl EnvironmentalGateway for HttpEnvironmentalGateway {
    async fn fetch_weather(&self, coord: &Coordinate) -> Option<WeatherSnapshot> {
        match self.weather.get_current_weather(coord).await {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::warn!(source = weather::SOURCE_NAME, %coord, error = %e, "Weather fetch failed");
                None
            }
        }
    }

    async fn fetch_rainfall_estimate(&self, coord: &Coordinate) -> Option<f64> {
        match self.rainfall.get_monthly_rainfall(coord).await {
            Ok(mm) => Some(mm),
            Err(e) => {
                tracing::warn!(source = rainfall::SOURCE_NAME, %coord, error = %e, "Rainfall estimate failed");
                None
            }
        }
    }

    async fn fetch_soil_profile(&self, coord: &Coordinate) -> SoilProfile {
        let profile = match self.soil.get_topsoil(coord).await {
            Ok(readings) => {
                SoilProfile::from_provider_units(readings.ph_x10, readings.nitrogen_cg_per_kg)
            }
            Err(e) => {
                tracing::warn!(source = soil::SOURCE_NAME, %coord, error = %e, "Soil fetch failed, using defaults");
                SoilProfile::defaults()
            }
        };

        if profile.is_degraded() {
            tracing::warn!(
                source = soil::SOURCE_NAME,
                %coord,
                ph_source = ?profile.ph_source,
                nitrogen_source = ?profile.nitrogen_source,
                "Soil profile contains default values"
            );
        }
        profile
    }
}
