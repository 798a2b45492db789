//! HTTP handlers for crop recommendation endpoints

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use shared::{Coordinate, RecommendationResponse};

use crate::error::{AppError, AppResult};
use crate::AppState;

/// Recommend a crop for a location using live data and the regional catalog
pub async fn recommend_by_location(
    State(state): State<AppState>,
    input: Result<Json<Coordinate>, JsonRejection>,
) -> AppResult<Json<RecommendationResponse>> {
    let Json(coord) = input.map_err(|rejection| AppError::Validation {
        field: "body".to_string(),
        message: rejection.body_text(),
    })?;

    let response = state.recommendations.recommend(coord).await?;
    Ok(Json(response))
}
