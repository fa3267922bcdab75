//! Batch orchestration: geocode and resolve many locations concurrently.

use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use super::{CoverageResolver, ResolveError};
use crate::dataset::{DatasetError, TowerStore};
use crate::geocoder::{GeocodeOutcome, Geocoder};
use crate::geodesy::CoordinateTransformer;
use crate::models::{
    BatchResult, FailureReason, GeoPoint, LocationResult, OperatorCoverageMap, TowerRecord,
};

#[derive(Debug, Error)]
pub enum CoverageError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// Resolves coverage for batches of addresses.
///
/// Each location runs as its own task; a failing location only affects its own
/// entry in the result.
pub struct CoverageService<G> {
    store: Arc<TowerStore>,
    resolver: CoverageResolver,
    geocoder: Arc<G>,
}

impl<G: Geocoder> CoverageService<G> {
    pub fn new(store: Arc<TowerStore>, geocoder: G) -> Self {
        Self::with_transformer(
            store,
            Arc::new(geocoder),
            Arc::new(CoordinateTransformer::new()),
        )
    }

    /// Build a service sharing an existing geocoder and coordinate cache
    pub fn with_transformer(
        store: Arc<TowerStore>,
        geocoder: Arc<G>,
        transformer: Arc<CoordinateTransformer>,
    ) -> Self {
        Self {
            store,
            resolver: CoverageResolver::new(transformer),
            geocoder,
        }
    }

    pub fn store(&self) -> &TowerStore {
        &self.store
    }

    /// Resolve coverage for an already geocoded point
    pub fn resolve_point(&self, point: GeoPoint) -> Result<OperatorCoverageMap, CoverageError> {
        let towers = self.store.load()?;
        Ok(self.resolver.resolve(point, &towers)?)
    }

    /// Resolve every (id → address) pair.
    ///
    /// The returned map has exactly the input ids as keys. Only a dataset that
    /// cannot be loaded fails the whole batch.
    pub async fn resolve_all(
        &self,
        locations: HashMap<String, String>,
    ) -> Result<BatchResult, DatasetError> {
        if locations.is_empty() {
            return Ok(BatchResult::new());
        }

        let towers = self.store.load()?;

        // Every id starts out failed; finished tasks overwrite their own entry
        let mut results: BatchResult = locations
            .keys()
            .map(|id| {
                (
                    id.clone(),
                    LocationResult::Failed(FailureReason::ResolutionFailed),
                )
            })
            .collect();

        let mut tasks = JoinSet::new();
        for (id, address) in locations {
            let geocoder = Arc::clone(&self.geocoder);
            let resolver = self.resolver.clone();
            let towers = Arc::clone(&towers);

            tasks.spawn(async move {
                let outcome = geocoder.geocode(&address).await;
                let result = resolve_location(&resolver, &towers, &address, outcome);
                (id, result)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((id, result)) => {
                    results.insert(id, result);
                }
                Err(e) => error!("Coverage task failed: {}", e),
            }
        }

        let failed = results.values().filter(|r| r.is_error()).count();
        info!(
            "Resolved coverage for {} locations ({} failed)",
            results.len(),
            failed
        );

        Ok(results)
    }
}

fn resolve_location(
    resolver: &CoverageResolver,
    towers: &[TowerRecord],
    address: &str,
    outcome: GeocodeOutcome,
) -> LocationResult {
    match outcome {
        GeocodeOutcome::Found(point) => match resolver.resolve(point, towers) {
            Ok(coverage) => LocationResult::Resolved(coverage),
            Err(e) => {
                warn!("Coverage resolution failed for '{}': {}", address, e);
                LocationResult::Failed(FailureReason::ResolutionFailed)
            }
        },
        GeocodeOutcome::NoMatch => LocationResult::Failed(FailureReason::NoMatch),
        GeocodeOutcome::Unavailable(_) => {
            LocationResult::Failed(FailureReason::GeocoderUnavailable)
        }
    }
}
