//! Environmental readings gathered for a coordinate
//!
//! Weather and rainfall are required inputs: when a provider fails they stay
//! absent and the request fails. Soil is best effort: every missing value is
//! replaced by an agronomic default and the substitution is recorded as
//! [`Provenance::Defaulted`].

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Days in the month the daily rainfall average is extrapolated to
pub const DAYS_PER_MONTH: f64 = 30.0;

/// Current weather at the farm
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct WeatherSnapshot {
    /// Air temperature in °C
    pub temperature: f64,
    /// Relative humidity in %
    pub humidity: f64,
}

/// Where a reading came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Measured,
    Defaulted,
}

/// Topsoil chemistry used by the classifier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoilProfile {
    pub ph: f64,
    /// Nitrogen, kg/ha equivalent
    pub nitrogen: f64,
    pub ph_source: Provenance,
    pub nitrogen_source: Provenance,
}

impl SoilProfile {
    pub const DEFAULT_PH: f64 = 6.5;
    pub const DEFAULT_NITROGEN: f64 = 90.0;

    /// Profile used when the soil provider could not be reached at all
    pub fn defaults() -> Self {
        Self {
            ph: Self::DEFAULT_PH,
            nitrogen: Self::DEFAULT_NITROGEN,
            ph_source: Provenance::Defaulted,
            nitrogen_source: Provenance::Defaulted,
        }
    }

    /// Build a profile from provider units.
    ///
    /// The soil provider reports pH multiplied by 10 and nitrogen in cg/kg.
    /// Each missing (or non-finite) value falls back to its own default.
    pub fn from_provider_units(ph_x10: Option<f64>, nitrogen_cg_per_kg: Option<f64>) -> Self {
        let (ph, ph_source) = match ph_x10.filter(|v| v.is_finite()) {
            Some(raw) => (round_hundredths(raw / 10.0), Provenance::Measured),
            None => (Self::DEFAULT_PH, Provenance::Defaulted),
        };
        let (nitrogen, nitrogen_source) = match nitrogen_cg_per_kg.filter(|v| v.is_finite()) {
            Some(raw) => (round_hundredths(raw / 100.0), Provenance::Measured),
            None => (Self::DEFAULT_NITROGEN, Provenance::Defaulted),
        };

        Self {
            ph,
            nitrogen,
            ph_source,
            nitrogen_source,
        }
    }

    /// True when at least one value was substituted
    pub fn is_degraded(&self) -> bool {
        self.ph_source == Provenance::Defaulted || self.nitrogen_source == Provenance::Defaulted
    }
}

/// Outcome of averaging a daily precipitation series
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RainfallAverage {
    /// Monthly estimate in mm, rounded to two decimals
    Monthly(f64),
    /// The series had entries but none of them carried a value
    NoMeasurements,
}

/// Extrapolate a daily precipitation series (mm/day) to a 30-day month.
///
/// Missing days are excluded from the average rather than counted as zero.
/// An empty series is an explicit zero-rainfall result. A series whose days
/// are all missing is deliberately not treated as zero rainfall: it yields
/// [`RainfallAverage::NoMeasurements`] and the caller fails the fetch.
pub fn monthly_rainfall_from_daily(daily: &[Option<f64>]) -> RainfallAverage {
    if daily.is_empty() {
        return RainfallAverage::Monthly(0.0);
    }

    let present: Vec<f64> = daily
        .iter()
        .filter_map(|d| *d)
        .filter(|d| d.is_finite())
        .collect();
    if present.is_empty() {
        return RainfallAverage::NoMeasurements;
    }

    let average_daily = present.iter().sum::<f64>() / present.len() as f64;
    RainfallAverage::Monthly(round_hundredths(average_daily * DAYS_PER_MONTH))
}

/// Round to two decimal places with banker's rounding on the exact binary value
pub fn round_hundredths(value: f64) -> f64 {
    Decimal::from_f64_retain(value)
        .map(|d| d.round_dp(2))
        .and_then(|d| d.to_f64())
        .unwrap_or(value)
}
