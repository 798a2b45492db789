//! Domain models for the crop recommendation pipeline

mod environment;
mod features;
mod prediction;
mod recommendation;

pub use environment::*;
pub use features::*;
pub use prediction::*;
pub use recommendation::*;
