//! Coordinate conversion and distance calculations.
//!
//! Converts Lambert-93 planar coordinates to WGS84 longitude/latitude and
//! measures great-circle distances between geographic points.

mod distance;
mod lambert;
mod transformer;

pub use distance::{distance_km, EARTH_RADIUS_KM};
pub use lambert::Lambert93;
pub use transformer::CoordinateTransformer;
