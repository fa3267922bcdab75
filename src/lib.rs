//! Coverage - mobile network coverage lookup for French addresses
//!
//! Geocodes addresses, then checks which operators have 2G/3G/4G towers in
//! range using the national Lambert-93 sites dataset. The `server` binary
//! exposes the batch lookup over HTTP.

pub mod config;
pub mod coverage;
pub mod dataset;
pub mod geocoder;
pub mod geodesy;
pub mod models;

pub use coverage::{CoverageResolver, CoverageService};
pub use dataset::TowerStore;
pub use geocoder::{BanGeocoder, GeocodeOutcome, Geocoder};
pub use models::{BatchResult, GeoPoint, LocationResult, NetworkCoverage, TowerRecord};
