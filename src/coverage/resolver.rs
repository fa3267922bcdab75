//! Per-point coverage scan over the tower dataset.

use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::geodesy::{distance_km, CoordinateTransformer};
use crate::models::{GeoPoint, Generation, OperatorCoverageMap, TowerRecord};

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("query point {0} is not finite")]
    NonFinitePoint(GeoPoint),

    #[error("tower at ({x}, {y}) projects to a non-finite position")]
    NonFiniteTower { x: i64, y: i64 },
}

/// Computes which operators cover a point with which generations
#[derive(Clone)]
pub struct CoverageResolver {
    transformer: Arc<CoordinateTransformer>,
}

impl CoverageResolver {
    pub fn new(transformer: Arc<CoordinateTransformer>) -> Self {
        Self { transformer }
    }

    pub fn transformer(&self) -> &CoordinateTransformer {
        &self.transformer
    }

    /// Scan the towers once and aggregate coverage per operator.
    ///
    /// Every operator seen during the scan gets an entry, even when none of its
    /// towers is in range. Towers of an operator that already has all three
    /// generations are skipped, as are towers beyond the largest radius.
    pub fn resolve(
        &self,
        point: GeoPoint,
        towers: &[TowerRecord],
    ) -> Result<OperatorCoverageMap, ResolveError> {
        if !point.is_finite() {
            return Err(ResolveError::NonFinitePoint(point));
        }

        let max_radius = Generation::max_radius_km();
        let mut coverage = OperatorCoverageMap::new();
        let mut in_range = 0usize;

        for tower in towers {
            let entry = coverage.entry(tower.operator_key()).or_default();
            if entry.is_complete() {
                continue;
            }

            let (tower_lon, tower_lat) = self.transformer.to_geographic(tower.x, tower.y);
            if !tower_lon.is_finite() || !tower_lat.is_finite() {
                return Err(ResolveError::NonFiniteTower {
                    x: tower.x,
                    y: tower.y,
                });
            }

            let distance = distance_km(point.lat, point.lon, tower_lat, tower_lon);
            if distance > max_radius {
                continue;
            }
            in_range += 1;

            for generation in Generation::ALL {
                if tower.offers(generation) && distance <= generation.radius_km() {
                    entry.mark(generation);
                }
            }
        }

        debug!(
            "Resolved {}: {} towers in range, {} operators",
            point,
            in_range,
            coverage.len()
        );

        Ok(coverage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NetworkCoverage;

    fn resolver() -> CoverageResolver {
        CoverageResolver::new(Arc::new(CoordinateTransformer::new()))
    }

    fn point_at(resolver: &CoverageResolver, x: i64, y: i64) -> GeoPoint {
        let (lon, lat) = resolver.transformer().to_geographic(x, y);
        GeoPoint::new(lat, lon)
    }

    /// Straight scan with no skipping or pruning
    fn resolve_exhaustive(
        resolver: &CoverageResolver,
        point: GeoPoint,
        towers: &[TowerRecord],
    ) -> OperatorCoverageMap {
        let mut coverage = OperatorCoverageMap::new();
        for tower in towers {
            let (lon, lat) = resolver.transformer().to_geographic(tower.x, tower.y);
            let distance = distance_km(point.lat, point.lon, lat, lon);
            let entry = coverage.entry(tower.operator_key()).or_default();
            for generation in Generation::ALL {
                if tower.offers(generation) && distance <= generation.radius_km() {
                    entry.mark(generation);
                }
            }
        }
        coverage
    }

    #[test]
    fn test_near_and_far_towers() {
        let resolver = resolver();
        let towers = vec![
            TowerRecord::new("Orange", 652_000, 6_862_000, [true, true, false]),
            TowerRecord::new("Orange", 692_000, 6_862_000, [false, false, true]),
        ];
        let point = point_at(&resolver, 652_000, 6_862_000);

        let coverage = resolver.resolve(point, &towers).unwrap();
        assert_eq!(coverage.len(), 1);
        assert_eq!(
            coverage["orange"],
            NetworkCoverage {
                network_2g: true,
                network_3g: true,
                network_4g: false,
            }
        );
    }

    #[test]
    fn test_empty_dataset() {
        let resolver = resolver();
        let coverage = resolver
            .resolve(GeoPoint::new(48.8566, 2.3522), &[])
            .unwrap();
        assert!(coverage.is_empty());
    }

    #[test]
    fn test_out_of_range_operator_still_listed() {
        let resolver = resolver();
        let towers = vec![TowerRecord::new(
            "Bouygues",
            700_000,
            6_900_000,
            [true, true, true],
        )];
        // Roughly 110 km away from the tower
        let point = point_at(&resolver, 652_000, 6_810_000);

        let coverage = resolver.resolve(point, &towers).unwrap();
        assert_eq!(coverage["bouygues"], NetworkCoverage::default());
    }

    #[test]
    fn test_generation_radii() {
        let resolver = resolver();
        // 7 km east: inside 2G and 4G radii, outside 3G
        let towers = vec![TowerRecord::new(
            "SFR",
            659_000,
            6_862_000,
            [true, true, true],
        )];
        let point = point_at(&resolver, 652_000, 6_862_000);

        let coverage = resolver.resolve(point, &towers).unwrap();
        assert_eq!(
            coverage["sfr"],
            NetworkCoverage {
                network_2g: true,
                network_3g: false,
                network_4g: true,
            }
        );
    }

    #[test]
    fn test_operator_keys_are_case_folded() {
        let resolver = resolver();
        let towers = vec![
            TowerRecord::new("Orange", 652_000, 6_862_000, [true, false, false]),
            TowerRecord::new("ORANGE", 652_100, 6_862_000, [false, true, false]),
        ];
        let point = point_at(&resolver, 652_000, 6_862_000);

        let coverage = resolver.resolve(point, &towers).unwrap();
        assert_eq!(coverage.len(), 1);
        assert!(coverage["orange"].network_2g);
        assert!(coverage["orange"].network_3g);
        assert!(!coverage["orange"].network_4g);
    }

    #[test]
    fn test_covered_flag_is_not_reset_by_later_towers() {
        let resolver = resolver();
        let towers = vec![
            TowerRecord::new("Free", 652_000, 6_862_000, [false, false, true]),
            TowerRecord::new("Free", 800_000, 6_862_000, [false, false, true]),
            TowerRecord::new("Free", 652_500, 6_862_000, [false, false, false]),
        ];
        let point = point_at(&resolver, 652_000, 6_862_000);

        let coverage = resolver.resolve(point, &towers).unwrap();
        assert!(coverage["free"].network_4g);
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let resolver = resolver();
        let towers = vec![
            TowerRecord::new("Orange", 652_000, 6_862_000, [true, true, false]),
            TowerRecord::new("SFR", 660_000, 6_870_000, [true, false, true]),
        ];
        let point = GeoPoint::new(48.8566, 2.3522);

        let first = resolver.resolve(point, &towers).unwrap();
        let second = resolver.resolve(point, &towers).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_non_finite_point() {
        let resolver = resolver();
        let towers = vec![TowerRecord::new(
            "Orange",
            652_000,
            6_862_000,
            [true, true, true],
        )];
        let result = resolver.resolve(GeoPoint::new(f64::NAN, 2.35), &towers);
        assert!(matches!(result, Err(ResolveError::NonFinitePoint(_))));
    }

    #[test]
    fn test_non_finite_tower_position() {
        let resolver = resolver();
        resolver.transformer().seed(1, 2, (f64::NAN, f64::INFINITY));
        let towers = vec![
            TowerRecord::new("Orange", 652_000, 6_862_000, [true, false, false]),
            TowerRecord::new("Orange", 1, 2, [true, true, true]),
        ];
        let point = point_at(&resolver, 652_000, 6_862_000);

        let result = resolver.resolve(point, &towers);
        assert!(matches!(
            result,
            Err(ResolveError::NonFiniteTower { x: 1, y: 2 })
        ));
    }

    #[test]
    fn test_pruning_matches_exhaustive_scan() {
        let resolver = resolver();
        let operators = ["Orange", "SFR", "Bouygues", "Free"];

        // Deterministic pseudo-random towers within ~60 km of central Paris
        let mut state: u64 = 0x2545_f491_4f6c_dd1d;
        let mut next = move || {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            state >> 33
        };

        let towers: Vec<TowerRecord> = (0..400)
            .map(|_| {
                let operator = operators[(next() % 4) as usize];
                let x = 592_000 + (next() % 120_000) as i64;
                let y = 6_802_000 + (next() % 120_000) as i64;
                let flags = next();
                TowerRecord::new(
                    operator,
                    x,
                    y,
                    [flags & 1 == 1, flags & 2 == 2, flags & 4 == 4],
                )
            })
            .collect();

        for qx in (602_000..712_000).step_by(11_000) {
            for qy in (6_812_000..6_922_000).step_by(11_000) {
                let point = point_at(&resolver, qx, qy);
                let fast = resolver.resolve(point, &towers).unwrap();
                let reference = resolve_exhaustive(&resolver, point, &towers);
                assert_eq!(fast, reference, "mismatch at ({}, {})", qx, qy);
            }
        }
    }

    #[test]
    fn test_far_towers_never_contribute() {
        let resolver = resolver();
        let point = point_at(&resolver, 652_000, 6_862_000);
        // Every tower sits 31 km or more away
        let towers: Vec<TowerRecord> = (0..20)
            .map(|i| TowerRecord::new("Orange", 683_000 + i * 1_000, 6_862_000, [true, true, true]))
            .collect();

        let coverage = resolver.resolve(point, &towers).unwrap();
        assert_eq!(coverage["orange"], NetworkCoverage::default());
    }
}
