//! Recommendation pipeline
//!
//! coordinate -> (region ∥ weather ∥ rainfall ∥ soil) -> features -> ranking
//! -> regional selection -> advice.
//!
//! The four lookups are joined with `try_join!`: the request waits for the
//! slowest of them, and the first fatal failure (region, weather or rainfall)
//! drops whatever is still in flight.

use std::sync::Arc;

use shared::{
    select_crop, validate_coordinate, Coordinate, FeatureVector, FinalRecommendation,
    LiveDataUsed, LocationInfo, RankedPrediction, RecommendationResponse, Region,
    RegionalCatalog, SoilProfile, WeatherSnapshot,
};
use tracing::Instrument;
use uuid::Uuid;

use super::advisory::AdvisoryComposer;
use super::classifier::RankedPredictor;
use super::gateway::EnvironmentalGateway;
use super::region::RegionResolver;
use crate::error::{AppError, AppResult};

/// Everything the pipeline decided before writing advice
#[derive(Debug, Clone)]
pub struct RecommendationPlan {
    pub region: Region,
    pub weather: WeatherSnapshot,
    pub soil: SoilProfile,
    pub rainfall_mm: f64,
    pub ranked: RankedPrediction,
    pub selection: FinalRecommendation,
}

impl RecommendationPlan {
    pub fn live_data(&self) -> LiveDataUsed {
        LiveDataUsed::new(&self.weather, &self.soil, self.rainfall_mm)
    }
}

/// Recommendation service
#[derive(Clone)]
pub struct RecommendationService {
    gateway: Arc<dyn EnvironmentalGateway>,
    resolver: Arc<dyn RegionResolver>,
    predictor: RankedPredictor,
    catalog: Arc<RegionalCatalog>,
    advisory: Arc<dyn AdvisoryComposer>,
}

impl RecommendationService {
    pub fn new(
        gateway: Arc<dyn EnvironmentalGateway>,
        resolver: Arc<dyn RegionResolver>,
        predictor: RankedPredictor,
        catalog: Arc<RegionalCatalog>,
        advisory: Arc<dyn AdvisoryComposer>,
    ) -> Self {
        Self {
            gateway,
            resolver,
            predictor,
            catalog,
            advisory,
        }
    }

    pub fn classifier_labels(&self) -> usize {
        self.predictor.labels().len()
    }

    pub fn catalog_regions(&self) -> usize {
        self.catalog.len()
    }

    /// Recommend a crop for `coord`, with advice for the farmer
    pub async fn recommend(&self, coord: Coordinate) -> AppResult<RecommendationResponse> {
        let span = tracing::info_span!(
            "recommendation",
            request_id = %Uuid::new_v4(),
            coord = %coord
        );

        async move {
            let plan = self.plan(coord).await?;
            let advice = self
                .advisory
                .compose(&plan.region, &plan.selection.crop)
                .await?;

            tracing::info!(
                region = %plan.region,
                crop = %plan.selection.crop,
                rank = plan.selection.probability_rank,
                basis = ?plan.selection.basis,
                "Recommendation complete"
            );

            Ok(RecommendationResponse {
                crop_recommendation: plan.selection.crop.clone(),
                advice,
                live_data_used: plan.live_data(),
                location_info: LocationInfo {
                    state: plan.region.to_string(),
                },
            })
        }
        .instrument(span)
        .await
    }

    /// Gather live data, rank every crop and select one for the region
    pub async fn plan(&self, coord: Coordinate) -> AppResult<RecommendationPlan> {
        validate_coordinate(&coord)?;

        let (region, weather, rainfall_mm, soil) = tokio::try_join!(
            async {
                self.resolver
                    .resolve(&coord)
                    .await
                    .ok_or(AppError::RegionUnavailable)
            },
            async {
                self.gateway
                    .fetch_weather(&coord)
                    .await
                    .ok_or(AppError::WeatherUnavailable)
            },
            async {
                self.gateway
                    .fetch_rainfall_estimate(&coord)
                    .await
                    .ok_or(AppError::RainfallUnavailable)
            },
            async { Ok::<_, AppError>(self.gateway.fetch_soil_profile(&coord).await) },
        )?;

        let features = FeatureVector::assemble(&soil, &weather, rainfall_mm);
        tracing::debug!(features = ?features.as_slice(), "Assembled features");

        let ranked = self.predictor.predict(&features)?;
        tracing::debug!(
            top = %ranked.top().crop,
            probability = ranked.top().probability,
            "Ranked {} crops",
            ranked.len()
        );

        let selection = select_crop(&ranked, &region, &self.catalog);

        Ok(RecommendationPlan {
            region,
            weather,
            soil,
            rainfall_mm,
            ranked,
            selection,
        })
    }
}
