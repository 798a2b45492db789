//! Error handling for the Krishi Mitra service
//!
//! Every failure a caller can see is one of these variants. Remote data
//! failures that the pipeline can absorb (soil) never become an `AppError`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::{FieldError, PredictionError};

use crate::services::ModelError;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    // Fatal remote data failures
    #[error("Could not determine the state for the given coordinates")]
    RegionUnavailable,

    #[error("Could not retrieve live weather data")]
    WeatherUnavailable,

    #[error("Could not retrieve historical rainfall data")]
    RainfallUnavailable,

    #[error("Advisory service error: {0}")]
    AdvisoryUnavailable(String),

    // Provider-level failure, reported by the HTTP clients
    #[error("{source_name} request failed: {message}")]
    ExternalService {
        source_name: &'static str,
        message: String,
    },

    // Classifier errors
    #[error("Model error: {0}")]
    Model(String),

    #[error("Prediction error: {0}")]
    Prediction(#[from] PredictionError),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl AppError {
    /// Shorthand used by the provider clients
    pub fn external(source_name: &'static str, message: impl Into<String>) -> Self {
        AppError::ExternalService {
            source_name,
            message: message.into(),
        }
    }

    /// Machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "VALIDATION_ERROR",
            AppError::RegionUnavailable => "REGION_UNAVAILABLE",
            AppError::WeatherUnavailable => "WEATHER_UNAVAILABLE",
            AppError::RainfallUnavailable => "RAINFALL_UNAVAILABLE",
            AppError::AdvisoryUnavailable(_) => "ADVISORY_UNAVAILABLE",
            AppError::ExternalService { .. } => "EXTERNAL_SERVICE_ERROR",
            AppError::Model(_) | AppError::Prediction(_) => "MODEL_ERROR",
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::RegionUnavailable
            | AppError::WeatherUnavailable
            | AppError::RainfallUnavailable
            | AppError::AdvisoryUnavailable(_)
            | AppError::ExternalService { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Model(_) | AppError::Prediction(_) | AppError::Configuration(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<FieldError> for AppError {
    fn from(err: FieldError) -> Self {
        AppError::Validation {
            field: err.field,
            message: err.message,
        }
    }
}

impl From<ModelError> for AppError {
    fn from(err: ModelError) -> Self {
        AppError::Model(err.to_string())
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_detail = match &self {
            AppError::Validation { field, message } => ErrorDetail {
                code: self.code().to_string(),
                message: message.clone(),
                field: Some(field.clone()),
            },
            AppError::AdvisoryUnavailable(_) => ErrorDetail {
                code: self.code().to_string(),
                message: "Could not generate advice for the recommended crop".to_string(),
                field: None,
            },
            AppError::Model(_) | AppError::Prediction(_) | AppError::Configuration(_) => {
                ErrorDetail {
                    code: self.code().to_string(),
                    message: "An internal server error occurred".to_string(),
                    field: None,
                }
            }
            _ => ErrorDetail {
                code: self.code().to_string(),
                message: self.to_string(),
                field: None,
            },
        };

        // Log the error for debugging
        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::debug!("Rejected request: {:?}", self);
        }

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
