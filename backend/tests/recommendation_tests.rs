//! Recommendation pipeline integration tests
//!
//! Tests the pipeline and HTTP surface with in-process fakes including:
//! - Regional selection end to end
//! - Failure policy per data source (fatal vs. defaulted)
//! - Concurrent lookups and region short-circuit
//! - Request validation and error bodies

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use krishi_mitra::{
    config::{
        AdvisoryConfig, CatalogConfig, Config, GeocodingConfig, LoggingConfig, ModelConfig,
        RainfallConfig, ServerConfig, SoilConfig, WeatherConfig,
    },
    create_app,
    services::{
        AdvisoryComposer, Classifier, EnvironmentalGateway, RankedPredictor,
        RecommendationService, RegionResolver,
    },
    AppError, AppResult, AppState,
};
use serde_json::Value;
use shared::{
    Coordinate, FeatureVector, Region, RegionalCatalog, SelectionBasis, SoilProfile,
    WeatherSnapshot,
};
use tokio_test::{assert_err, assert_ok};
use tower::ServiceExt;

const LUDHIANA: Coordinate = Coordinate {
    latitude: 30.9,
    longitude: 75.85,
};

// ============================================================================
// Fakes
// ============================================================================

#[derive(Clone)]
struct FakeGateway {
    weather: Option<WeatherSnapshot>,
    rainfall: Option<f64>,
    soil: SoilProfile,
    weather_delay: Duration,
    rainfall_delay: Duration,
    soil_delay: Duration,
}

impl Default for FakeGateway {
    fn default() -> Self {
        Self {
            weather: Some(WeatherSnapshot {
                temperature: 28.4,
                humidity: 71.0,
            }),
            rainfall: Some(210.5),
            soil: SoilProfile::from_provider_units(Some(71.0), Some(12000.0)),
            weather_delay: Duration::ZERO,
            rainfall_delay: Duration::ZERO,
            soil_delay: Duration::ZERO,
        }
    }
}

#[async_trait]
impl EnvironmentalGateway for FakeGateway {
    async fn fetch_weather(&self, _coord: &Coordinate) -> Option<WeatherSnapshot> {
        tokio::time::sleep(self.weather_delay).await;
        self.weather
    }

    async fn fetch_rainfall_estimate(&self, _coord: &Coordinate) -> Option<f64> {
        tokio::time::sleep(self.rainfall_delay).await;
        self.rainfall
    }

    async fn fetch_soil_profile(&self, _coord: &Coordinate) -> SoilProfile {
        tokio::time::sleep(self.soil_delay).await;
        self.soil
    }
}

struct FakeResolver {
    region: Option<&'static str>,
    delay: Duration,
}

impl FakeResolver {
    fn of(region: &'static str) -> Self {
        Self {
            region: Some(region),
            delay: Duration::ZERO,
        }
    }
}

#[async_trait]
impl RegionResolver for FakeResolver {
    async fn resolve(&self, _coord: &Coordinate) -> Option<Region> {
        tokio::time::sleep(self.delay).await;
        self.region.map(Region::from)
    }
}

/// Returns the same distribution for every input
struct FixedClassifier {
    labels: Vec<String>,
    probabilities: Vec<f64>,
}

impl FixedClassifier {
    fn new(pairs: &[(&str, f64)]) -> Self {
        Self {
            labels: pairs.iter().map(|(l, _)| l.to_string()).collect(),
            probabilities: pairs.iter().map(|(_, p)| *p).collect(),
        }
    }
}

impl Classifier for FixedClassifier {
    fn labels(&self) -> &[String] {
        &self.labels
    }

    fn predict_proba(&self, _features: &FeatureVector) -> Vec<f64> {
        self.probabilities.clone()
    }
}

struct FakeAdvisory {
    fail: bool,
}

#[async_trait]
impl AdvisoryComposer for FakeAdvisory {
    async fn compose(&self, region: &Region, crop: &str) -> AppResult<String> {
        if self.fail {
            return Err(AppError::AdvisoryUnavailable("quota exceeded".to_string()));
        }
        Ok(format!("{} grows well in {} right now.", crop, region))
    }
}

fn service(
    gateway: FakeGateway,
    resolver: FakeResolver,
    classifier: FixedClassifier,
    advisory: FakeAdvisory,
) -> RecommendationService {
    RecommendationService::new(
        Arc::new(gateway),
        Arc::new(resolver),
        RankedPredictor::new(Arc::new(classifier)),
        Arc::new(RegionalCatalog::india()),
        Arc::new(advisory),
    )
}

fn wheat_first() -> FixedClassifier {
    FixedClassifier::new(&[("wheat", 0.5), ("rice", 0.3), ("maize", 0.2)])
}

fn punjab_service() -> RecommendationService {
    service(
        FakeGateway::default(),
        FakeResolver::of("Punjab"),
        wheat_first(),
        FakeAdvisory { fail: false },
    )
}

// ============================================================================
// Pipeline Tests
// ============================================================================

#[cfg(test)]
mod pipeline_tests {
    use super::*;

    /// Punjab does not list wheat, so the next ranked crop wins
    #[tokio::test]
    async fn test_punjab_skips_wheat_for_rice() {
        let response = assert_ok!(punjab_service().recommend(LUDHIANA).await);

        assert_eq!(response.crop_recommendation, "rice");
        assert_eq!(response.location_info.state, "Punjab");
        assert_eq!(response.advice, "rice grows well in Punjab right now.");
        assert_eq!(response.live_data_used.temperature, 28.4);
        assert_eq!(response.live_data_used.humidity, 71.0);
        assert_eq!(response.live_data_used.ph, 7.1);
        assert_eq!(response.live_data_used.nitrogen, 120.0);
        assert_eq!(response.live_data_used.rainfall_mm_monthly_avg, 210.5);
    }

    /// A region missing from the catalog keeps the top prediction
    #[tokio::test]
    async fn test_unknown_region_keeps_top_prediction() {
        let svc = service(
            FakeGateway::default(),
            FakeResolver::of("Bavaria"),
            FixedClassifier::new(&[("barley", 0.6), ("rice", 0.4)]),
            FakeAdvisory { fail: false },
        );

        let plan = assert_ok!(svc.plan(LUDHIANA).await);
        assert_eq!(plan.selection.crop, "barley");
        assert_eq!(plan.selection.basis, SelectionBasis::Unconstrained);
        assert_eq!(plan.ranked.len(), 2);
    }

    /// The plan keeps the full ranking and the chosen rank
    #[tokio::test]
    async fn test_plan_records_rank() {
        let plan = assert_ok!(punjab_service().plan(LUDHIANA).await);
        assert_eq!(plan.ranked.top().crop, "wheat");
        assert_eq!(plan.selection.probability_rank, 1);
        assert_eq!(plan.selection.basis, SelectionBasis::RegionalMatch);
    }

    /// A partly defaulted soil profile still yields a recommendation
    #[tokio::test]
    async fn test_degraded_soil_still_recommends() {
        let gateway = FakeGateway {
            soil: SoilProfile::from_provider_units(Some(58.0), None),
            ..FakeGateway::default()
        };
        let svc = service(
            gateway,
            FakeResolver::of("Punjab"),
            wheat_first(),
            FakeAdvisory { fail: false },
        );

        let plan = assert_ok!(svc.plan(LUDHIANA).await);
        assert!(plan.soil.is_degraded());

        let response = assert_ok!(svc.recommend(LUDHIANA).await);
        assert_eq!(response.crop_recommendation, "rice");
        assert_eq!(response.live_data_used.ph, 5.8);
        assert_eq!(response.live_data_used.nitrogen, 90.0);
    }

    #[tokio::test]
    async fn test_weather_failure_is_fatal() {
        let gateway = FakeGateway {
            weather: None,
            ..FakeGateway::default()
        };
        let svc = service(
            gateway,
            FakeResolver::of("Punjab"),
            wheat_first(),
            FakeAdvisory { fail: false },
        );

        let err = assert_err!(svc.recommend(LUDHIANA).await);
        assert!(matches!(err, AppError::WeatherUnavailable));
    }

    #[tokio::test]
    async fn test_rainfall_failure_is_fatal() {
        let gateway = FakeGateway {
            rainfall: None,
            ..FakeGateway::default()
        };
        let svc = service(
            gateway,
            FakeResolver::of("Punjab"),
            wheat_first(),
            FakeAdvisory { fail: false },
        );

        let err = assert_err!(svc.recommend(LUDHIANA).await);
        assert_eq!(err.code(), "RAINFALL_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_advisory_failure_is_fatal() {
        let svc = service(
            FakeGateway::default(),
            FakeResolver::of("Punjab"),
            wheat_first(),
            FakeAdvisory { fail: true },
        );

        let err = assert_err!(svc.recommend(LUDHIANA).await);
        assert_eq!(err.code(), "ADVISORY_UNAVAILABLE");
    }

    /// A classifier whose output does not match its labels is a model error
    #[tokio::test]
    async fn test_mismatched_distribution_is_model_error() {
        let classifier = FixedClassifier {
            labels: vec!["rice".to_string(), "maize".to_string()],
            probabilities: vec![1.0],
        };
        let svc = service(
            FakeGateway::default(),
            FakeResolver::of("Punjab"),
            classifier,
            FakeAdvisory { fail: false },
        );

        let err = assert_err!(svc.plan(LUDHIANA).await);
        assert_eq!(err.code(), "MODEL_ERROR");
    }

    /// Out-of-range input is rejected before any lookup
    #[tokio::test]
    async fn test_out_of_range_coordinate() {
        let err = assert_err!(punjab_service().plan(Coordinate::new(91.0, 75.0)).await);
        match err {
            AppError::Validation { field, .. } => assert_eq!(field, "latitude"),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}

// ============================================================================
// Concurrency Tests
// ============================================================================

#[cfg(test)]
mod concurrency_tests {
    use super::*;
    use tokio::time::Instant;

    /// Lookups overlap: the request takes as long as the slowest one
    #[tokio::test(start_paused = true)]
    async fn test_latency_is_bounded_by_slowest_source() {
        let gateway = FakeGateway {
            weather_delay: Duration::from_secs(3),
            rainfall_delay: Duration::from_secs(5),
            soil_delay: Duration::from_secs(4),
            ..FakeGateway::default()
        };
        let resolver = FakeResolver {
            region: Some("Punjab"),
            delay: Duration::from_secs(2),
        };
        let svc = service(gateway, resolver, wheat_first(), FakeAdvisory { fail: false });

        let start = Instant::now();
        assert_ok!(svc.plan(LUDHIANA).await);
        let elapsed = start.elapsed();

        assert!(elapsed >= Duration::from_secs(5));
        assert!(elapsed < Duration::from_secs(6), "took {:?}", elapsed);
    }

    /// Region failure returns without waiting for slow data fetches
    #[tokio::test(start_paused = true)]
    async fn test_region_failure_short_circuits() {
        let gateway = FakeGateway {
            weather_delay: Duration::from_secs(60),
            rainfall_delay: Duration::from_secs(60),
            soil_delay: Duration::from_secs(60),
            ..FakeGateway::default()
        };
        let resolver = FakeResolver {
            region: None,
            delay: Duration::from_secs(1),
        };
        let svc = service(gateway, resolver, wheat_first(), FakeAdvisory { fail: false });

        let start = Instant::now();
        let err = assert_err!(svc.plan(LUDHIANA).await);
        assert!(matches!(err, AppError::RegionUnavailable));
        assert!(start.elapsed() < Duration::from_secs(2));
    }
}

// ============================================================================
// HTTP Tests
// ============================================================================

#[cfg(test)]
mod http_tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            environment: "test".to_string(),
            server: ServerConfig {
                port: 0,
                host: "127.0.0.1".to_string(),
            },
            logging: LoggingConfig {
                format: "pretty".to_string(),
            },
            model: ModelConfig {
                path: "unused.json".to_string(),
            },
            catalog: CatalogConfig::default(),
            weather: WeatherConfig {
                api_endpoint: "http://localhost".to_string(),
                api_key: "test".to_string(),
                timeout_secs: 1,
            },
            rainfall: RainfallConfig {
                api_endpoint: "http://localhost".to_string(),
                timeout_secs: 1,
                window_days: 90,
                lag_days: 2,
            },
            soil: SoilConfig {
                api_endpoint: "http://localhost".to_string(),
                timeout_secs: 1,
            },
            geocoding: GeocodingConfig {
                api_endpoint: "http://localhost".to_string(),
                user_agent: "krishi_mitra_test".to_string(),
                timeout_secs: 1,
            },
            advisory: AdvisoryConfig {
                api_endpoint: "http://localhost".to_string(),
                api_key: "test".to_string(),
                model: "test-model".to_string(),
                timeout_secs: 1,
            },
        }
    }

    fn app(svc: RecommendationService) -> axum::Router {
        create_app(AppState {
            config: Arc::new(test_config()),
            recommendations: Arc::new(svc),
        })
    }

    async fn post_json(app: axum::Router, uri: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_recommend_endpoints() {
        for uri in [
            "/recommendations/location",
            "/v1/recommendations/location",
            "/recommend-by-location",
        ] {
            let (status, body) = post_json(
                app(punjab_service()),
                uri,
                r#"{"latitude": 30.9, "longitude": 75.85}"#,
            )
            .await;

            assert_eq!(status, StatusCode::OK, "{}", uri);
            assert_eq!(body["crop_recommendation"], "rice");
            assert_eq!(body["location_info"]["state"], "Punjab");
            assert_eq!(body["live_data_used"]["N"], 120.0);
            assert_eq!(body["live_data_used"]["rainfall_mm_monthly_avg"], 210.5);
        }
    }

    #[tokio::test]
    async fn test_out_of_range_is_bad_request() {
        let (status, body) = post_json(
            app(punjab_service()),
            "/recommendations/location",
            r#"{"latitude": 30.9, "longitude": 200.0}"#,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["field"], "longitude");
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let (status, body) = post_json(
            app(punjab_service()),
            "/recommendations/location",
            r#"{"latitude": "north"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["field"], "body");

        // The body is the coordinate itself; both fields are required
        let (status, body) = post_json(
            app(punjab_service()),
            "/recommendations/location",
            r#"{"latitude": 30.9}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]["message"].as_str().unwrap().contains("longitude"));
    }

    #[tokio::test]
    async fn test_weather_failure_is_service_unavailable() {
        let gateway = FakeGateway {
            weather: None,
            ..FakeGateway::default()
        };
        let svc = service(
            gateway,
            FakeResolver::of("Punjab"),
            wheat_first(),
            FakeAdvisory { fail: false },
        );

        let (status, body) = post_json(
            app(svc),
            "/recommendations/location",
            r#"{"latitude": 30.9, "longitude": 75.85}"#,
        )
        .await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["code"], "WEATHER_UNAVAILABLE");
        assert!(body["error"].get("field").is_none());
    }

    #[tokio::test]
    async fn test_region_failure_is_service_unavailable() {
        let resolver = FakeResolver {
            region: None,
            delay: Duration::ZERO,
        };
        let svc = service(
            FakeGateway::default(),
            resolver,
            wheat_first(),
            FakeAdvisory { fail: false },
        );

        let (status, body) = post_json(
            app(svc),
            "/recommend-by-location",
            r#"{"latitude": 30.9, "longitude": 75.85}"#,
        )
        .await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["code"], "REGION_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_root_and_health() {
        let response = app(punjab_service())
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body["message"],
            "Welcome to the Krishi Mitra AI API (Live & Regional)"
        );

        let response = app(punjab_service())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["environment"], "test");
        assert_eq!(body["classifier_labels"], 3);
        assert_eq!(body["catalog_regions"], 34);
    }
}
