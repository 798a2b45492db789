//! Final recommendation and the response returned to callers

use serde::{Deserialize, Serialize};

use super::environment::{SoilProfile, WeatherSnapshot};
use crate::types::Region;

/// Why the selector settled on a crop
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SelectionBasis {
    /// The highest-ranked crop listed for the region
    RegionalMatch,
    /// The region has no catalog entry, so no constraint applied
    Unconstrained,
    /// No ranked crop is listed for the region; the top prediction was kept
    NoRegionalMatch,
}

/// The crop chosen for a request
#[derive(Debug, Clone, PartialEq)]
pub struct FinalRecommendation {
    pub crop: String,
    /// Index of `crop` in the ranked prediction (0 = most likely)
    pub probability_rank: usize,
    pub region: Region,
    pub basis: SelectionBasis,
}

/// Environmental values that went into the prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveDataUsed {
    pub temperature: f64,
    pub humidity: f64,
    pub ph: f64,
    #[serde(rename = "N")]
    pub nitrogen: f64,
    pub rainfall_mm_monthly_avg: f64,
}

impl LiveDataUsed {
    pub fn new(weather: &WeatherSnapshot, soil: &SoilProfile, rainfall_mm: f64) -> Self {
        Self {
            temperature: weather.temperature,
            humidity: weather.humidity,
            ph: soil.ph,
            nitrogen: soil.nitrogen,
            rainfall_mm_monthly_avg: rainfall_mm,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationInfo {
    pub state: String,
}

/// Response body of the recommendation endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub crop_recommendation: String,
    pub advice: String,
    pub live_data_used: LiveDataUsed,
    pub location_info: LocationInfo,
}
