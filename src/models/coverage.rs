//! Coverage results: per-operator generation flags and per-location outcomes.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Mobile network generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Generation {
    #[serde(rename = "2G")]
    G2,
    #[serde(rename = "3G")]
    G3,
    #[serde(rename = "4G")]
    G4,
}

impl Generation {
    pub const ALL: [Generation; 3] = [Generation::G2, Generation::G3, Generation::G4];

    /// Maximum distance at which a tower provides this generation
    pub fn radius_km(&self) -> f64 {
        match self {
            Generation::G2 => 30.0,
            Generation::G3 => 5.0,
            Generation::G4 => 10.0,
        }
    }

    /// Largest radius across all generations, used to prune far towers
    pub fn max_radius_km() -> f64 {
        Self::ALL
            .iter()
            .map(Generation::radius_km)
            .fold(0.0, f64::max)
    }
}

impl std::fmt::Display for Generation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Generation::G2 => write!(f, "2G"),
            Generation::G3 => write!(f, "3G"),
            Generation::G4 => write!(f, "4G"),
        }
    }
}

/// Whether at least one in-range tower of an operator serves each generation.
///
/// Flags only ever go from false to true.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkCoverage {
    #[serde(rename = "2G")]
    pub network_2g: bool,
    #[serde(rename = "3G")]
    pub network_3g: bool,
    #[serde(rename = "4G")]
    pub network_4g: bool,
}

impl NetworkCoverage {
    pub fn get(&self, generation: Generation) -> bool {
        match generation {
            Generation::G2 => self.network_2g,
            Generation::G3 => self.network_3g,
            Generation::G4 => self.network_4g,
        }
    }

    /// Mark a generation as covered
    pub fn mark(&mut self, generation: Generation) {
        match generation {
            Generation::G2 => self.network_2g = true,
            Generation::G3 => self.network_3g = true,
            Generation::G4 => self.network_4g = true,
        }
    }

    /// All three generations are covered
    pub fn is_complete(&self) -> bool {
        self.network_2g && self.network_3g && self.network_4g
    }
}

/// Operator key (lower-cased) → coverage
pub type OperatorCoverageMap = HashMap<String, NetworkCoverage>;

/// Why a location has no coverage map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// The geocoder found no match for the address
    NoMatch,
    /// The geocoder could not be reached or answered garbage
    GeocoderUnavailable,
    /// The point was geocoded but coverage could not be computed
    ResolutionFailed,
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::NoMatch => write!(f, "no_match"),
            FailureReason::GeocoderUnavailable => write!(f, "geocoder_unavailable"),
            FailureReason::ResolutionFailed => write!(f, "resolution_failed"),
        }
    }
}

/// Outcome for a single location of a batch
#[derive(Debug, Clone, PartialEq)]
pub enum LocationResult {
    Failed(FailureReason),
    Resolved(OperatorCoverageMap),
}

impl LocationResult {
    pub fn is_error(&self) -> bool {
        matches!(self, LocationResult::Failed(_))
    }

    pub fn error(&self) -> Option<FailureReason> {
        match self {
            LocationResult::Failed(reason) => Some(*reason),
            LocationResult::Resolved(_) => None,
        }
    }

    /// Coverage map, empty for failed locations
    pub fn operators(&self) -> OperatorCoverageMap {
        match self {
            LocationResult::Failed(_) => OperatorCoverageMap::new(),
            LocationResult::Resolved(map) => map.clone(),
        }
    }
}

/// Location id → result; keys always equal the input ids
pub type BatchResult = HashMap<String, LocationResult>;
