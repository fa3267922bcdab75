//! Inverse Lambert Conformal Conic projection for RGF93 / Lambert-93 (EPSG:2154).
//!
//! RGF93 is treated as identical to WGS84, so no datum shift is applied.

use std::f64::consts::FRAC_PI_2;
use std::f64::consts::FRAC_PI_4;

/// GRS80 semi-major axis (metres)
const GRS80_A: f64 = 6_378_137.0;
/// GRS80 inverse flattening
const GRS80_INV_F: f64 = 298.257_222_101;

const STANDARD_PARALLEL_1: f64 = 49.0;
const STANDARD_PARALLEL_2: f64 = 44.0;
const LATITUDE_OF_ORIGIN: f64 = 46.5;
const CENTRAL_MERIDIAN: f64 = 3.0;
const FALSE_EASTING: f64 = 700_000.0;
const FALSE_NORTHING: f64 = 6_600_000.0;

const LATITUDE_EPSILON: f64 = 1e-12;
const MAX_ITERATIONS: usize = 15;

/// Precomputed constants of the Lambert-93 cone
#[derive(Debug, Clone, Copy)]
pub struct Lambert93 {
    /// First eccentricity
    e: f64,
    /// Cone constant
    n: f64,
    /// a * F
    a_f: f64,
    /// Radius of the parallel of origin
    rho0: f64,
    lambda0: f64,
}

impl Lambert93 {
    pub fn new() -> Self {
        let f = 1.0 / GRS80_INV_F;
        let e = (2.0 * f - f * f).sqrt();

        let phi1 = STANDARD_PARALLEL_1.to_radians();
        let phi2 = STANDARD_PARALLEL_2.to_radians();
        let phi0 = LATITUDE_OF_ORIGIN.to_radians();

        let m1 = Self::m(e, phi1);
        let m2 = Self::m(e, phi2);
        let t1 = Self::t(e, phi1);
        let t2 = Self::t(e, phi2);
        let t0 = Self::t(e, phi0);

        let n = (m1.ln() - m2.ln()) / (t1.ln() - t2.ln());
        let big_f = m1 / (n * t1.powf(n));
        let a_f = GRS80_A * big_f;

        Self {
            e,
            n,
            a_f,
            rho0: a_f * t0.powf(n),
            lambda0: CENTRAL_MERIDIAN.to_radians(),
        }
    }

    fn m(e: f64, phi: f64) -> f64 {
        let s = phi.sin();
        phi.cos() / (1.0 - e * e * s * s).sqrt()
    }

    fn t(e: f64, phi: f64) -> f64 {
        let s = e * phi.sin();
        (FRAC_PI_4 - phi / 2.0).tan() / ((1.0 - s) / (1.0 + s)).powf(e / 2.0)
    }

    /// Convert planar (x, y) metres to (longitude, latitude) degrees.
    ///
    /// Non-finite inputs yield non-finite outputs.
    pub fn inverse(&self, x: f64, y: f64) -> (f64, f64) {
        let dx = x - FALSE_EASTING;
        let dy = self.rho0 - (y - FALSE_NORTHING);

        let rho = dx.hypot(dy).copysign(self.n);
        let t = (rho / self.a_f).powf(1.0 / self.n);
        let theta = dx.atan2(dy);

        let lambda = theta / self.n + self.lambda0;

        // Iterate phi = pi/2 - 2 atan(t * ((1 - e sin phi) / (1 + e sin phi))^(e/2))
        let mut phi = FRAC_PI_2 - 2.0 * t.atan();
        for _ in 0..MAX_ITERATIONS {
            let s = self.e * phi.sin();
            let next = FRAC_PI_2 - 2.0 * (t * ((1.0 - s) / (1.0 + s)).powf(self.e / 2.0)).atan();
            let delta = (next - phi).abs();
            phi = next;
            if delta < LATITUDE_EPSILON {
                break;
            }
        }

        (lambda.to_degrees(), phi.to_degrees())
    }
}

impl Default for Lambert93 {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_origin() {
        let (lon, lat) = Lambert93::new().inverse(FALSE_EASTING, FALSE_NORTHING);
        assert!((lon - CENTRAL_MERIDIAN).abs() < 1e-9);
        assert!((lat - LATITUDE_OF_ORIGIN).abs() < 1e-9);
    }

    #[test]
    fn test_paris() {
        let (lon, lat) = Lambert93::new().inverse(652_376.0, 6_862_327.0);
        assert!((lon - 2.3509).abs() < 0.001, "lon {}", lon);
        assert!((lat - 48.8592).abs() < 0.001, "lat {}", lat);
    }

    #[test]
    fn test_brittany_west_of_meridian() {
        let (lon, lat) = Lambert93::new().inverse(102_980.0, 6_847_973.0);
        assert!(lon < -5.0 && lon > -5.2, "lon {}", lon);
        assert!(lat > 48.4 && lat < 48.5, "lat {}", lat);
    }

    #[test]
    fn test_nan_propagates() {
        let (lon, lat) = Lambert93::new().inverse(f64::NAN, 6_600_000.0);
        assert!(lon.is_nan());
        assert!(lat.is_nan());
    }
}
