//! Business logic services for the Krishi Mitra service

pub mod advisory;
pub mod catalog;
pub mod classifier;
pub mod gateway;
pub mod recommendation;
pub mod region;

pub use advisory::{AdvisoryComposer, GeminiAdvisoryComposer};
pub use catalog::load_catalog;
pub use classifier::{Classifier, ForestClassifier, ModelError, RankedPredictor};
pub use gateway::{EnvironmentalGateway, HttpEnvironmentalGateway};
pub use recommendation::{RecommendationPlan, RecommendationService};
pub use region::{NominatimRegionResolver, RegionResolver};
