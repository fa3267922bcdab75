//! Core data models for coverage resolution.

pub mod coverage;
pub mod point;
pub mod tower;

pub use coverage::{
    BatchResult, FailureReason, Generation, LocationResult, NetworkCoverage, OperatorCoverageMap,
};
pub use point::GeoPoint;
pub use tower::TowerRecord;
