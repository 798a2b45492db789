//! Classifier input

use serde::Serialize;

use super::environment::{SoilProfile, WeatherSnapshot};

/// Number of features the classifier was trained on
pub const FEATURE_COUNT: usize = 5;

/// Feature names in classifier column order
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = ["N", "temperature", "humidity", "ph", "rainfall"];

/// Fixed-order classifier input: (N, temperature, humidity, ph, rainfall).
///
/// The order is part of the contract with the trained model and must match
/// [`FEATURE_NAMES`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    /// Assemble the classifier input from validated environmental readings
    pub fn assemble(soil: &SoilProfile, weather: &WeatherSnapshot, rainfall_mm: f64) -> Self {
        Self([
            soil.nitrogen,
            weather.temperature,
            weather.humidity,
            soil.ph,
            rainfall_mm,
        ])
    }

    pub fn from_array(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn nitrogen(&self) -> f64 {
        self.0[0]
    }

    pub fn temperature(&self) -> f64 {
        self.0[1]
    }

    pub fn humidity(&self) -> f64 {
        self.0[2]
    }

    pub fn ph(&self) -> f64 {
        self.0[3]
    }

    pub fn rainfall(&self) -> f64 {
        self.0[4]
    }
}
