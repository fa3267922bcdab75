//! Address geocoding collaborators.
//!
//! The coverage engine only needs an address turned into a point. Every way that
//! can go wrong collapses into one of the `GeocodeOutcome` variants; geocoders
//! never return errors or panic.

pub(crate) mod ban;

pub use ban::BanGeocoder;

use std::future::Future;

use crate::models::GeoPoint;

/// Result of geocoding a single address
#[derive(Debug, Clone, PartialEq)]
pub enum GeocodeOutcome {
    Found(GeoPoint),
    /// The service answered but had no match for the address
    NoMatch,
    /// Network failure, bad status or undecodable response
    Unavailable(String),
}

impl GeocodeOutcome {
    pub fn point(&self) -> Option<GeoPoint> {
        match self {
            GeocodeOutcome::Found(point) => Some(*point),
            _ => None,
        }
    }
}

/// Turns free-text addresses into geographic points.
pub trait Geocoder: Send + Sync + 'static {
    fn geocode(&self, address: &str) -> impl Future<Output = GeocodeOutcome> + Send;
}
