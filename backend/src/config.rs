//! Configuration management for the Krishi Mitra service
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with KRISHI_ prefix
//!
//! The legacy `WEATHERAPI_KEY` and `GEMINI_API_KEY` variables are honoured
//! when the prefixed keys are not set.

use std::time::Duration;

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Log output configuration
    pub logging: LoggingConfig,

    /// Classifier artifact
    pub model: ModelConfig,

    /// Regional crop catalog
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Current weather provider (WeatherAPI.com)
    pub weather: WeatherConfig,

    /// Historical rainfall provider (Open-Meteo archive)
    pub rainfall: RainfallConfig,

    /// Soil chemistry provider (ISRIC SoilGrids)
    pub soil: SoilConfig,

    /// Reverse geocoding provider (Nominatim)
    pub geocoding: GeocodingConfig,

    /// Advisory text generation (Gemini)
    pub advisory: AdvisoryConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// `pretty` or `json`
    pub format: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    /// Path to the exported random forest (JSON)
    pub path: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CatalogConfig {
    /// Optional CSV file (`region,crop`) replacing the built-in catalog
    pub path: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherConfig {
    pub api_endpoint: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RainfallConfig {
    pub api_endpoint: String,
    pub timeout_secs: u64,
    /// Length of the daily precipitation window
    pub window_days: i64,
    /// Days skipped before today to avoid provider latency gaps
    pub lag_days: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SoilConfig {
    pub api_endpoint: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeocodingConfig {
    pub api_endpoint: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AdvisoryConfig {
    pub api_endpoint: String,
    pub api_key: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("KRISHI_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 8000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("logging.format", "pretty")?
            .set_default("model.path", "model/crop_recommender.json")?
            .set_default("weather.api_endpoint", "http://api.weatherapi.com/v1")?
            // Legacy variable names fill the keys unless overridden below
            .set_default(
                "weather.api_key",
                std::env::var("WEATHERAPI_KEY").unwrap_or_default(),
            )?
            .set_default("weather.timeout_secs", 10)?
            .set_default(
                "rainfall.api_endpoint",
                "https://archive-api.open-meteo.com/v1/archive",
            )?
            .set_default("rainfall.timeout_secs", 20)?
            .set_default("rainfall.window_days", 90)?
            .set_default("rainfall.lag_days", 2)?
            .set_default(
                "soil.api_endpoint",
                "https://rest.isric.org/soilgrids/v2.0/properties/query",
            )?
            .set_default("soil.timeout_secs", 20)?
            .set_default(
                "geocoding.api_endpoint",
                "https://nominatim.openstreetmap.org/reverse",
            )?
            .set_default("geocoding.user_agent", "krishi_mitra_app")?
            .set_default("geocoding.timeout_secs", 10)?
            .set_default(
                "advisory.api_endpoint",
                "https://generativelanguage.googleapis.com/v1beta",
            )?
            .set_default(
                "advisory.api_key",
                std::env::var("GEMINI_API_KEY").unwrap_or_default(),
            )?
            .set_default("advisory.model", "gemini-1.5-flash")?
            .set_default("advisory.timeout_secs", 30)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (KRISHI_ prefix)
            .add_source(
                Environment::with_prefix("KRISHI")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the service cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.weather.api_key.trim().is_empty() {
            return Err(ConfigError::Message(
                "weather API key is missing (set KRISHI__WEATHER__API_KEY or WEATHERAPI_KEY)"
                    .to_string(),
            ));
        }
        if self.advisory.api_key.trim().is_empty() {
            return Err(ConfigError::Message(
                "advisory API key is missing (set KRISHI__ADVISORY__API_KEY or GEMINI_API_KEY)"
                    .to_string(),
            ));
        }
        if self.rainfall.window_days <= 0 || self.rainfall.lag_days < 0 {
            return Err(ConfigError::Message(
                "rainfall window must be positive and lag non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

impl WeatherConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl RainfallConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl SoilConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl GeocodingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl AdvisoryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
