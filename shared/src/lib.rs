//! Shared types and models for the Krishi Mitra crop recommendation service
//!
//! This crate holds the pure part of the recommendation pipeline: the data
//! model, feature assembly, ranking, the regional catalog and the selection
//! algorithm. Nothing in here performs I/O.

pub mod catalog;
pub mod models;
pub mod selection;
pub mod types;
pub mod validation;

pub use catalog::*;
pub use models::*;
pub use selection::*;
pub use types::*;
pub use validation::*;
