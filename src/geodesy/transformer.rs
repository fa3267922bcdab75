//! Memoizing Lambert-93 → WGS84 transformer shared across resolution tasks.

use hashbrown::HashMap;
use parking_lot::RwLock;

use super::Lambert93;

/// Converts tower coordinates to (longitude, latitude), caching by exact (x, y).
///
/// The cache lives as long as the transformer and is never evicted; its size is
/// bounded by the distinct coordinates of the dataset.
pub struct CoordinateTransformer {
    projection: Lambert93,
    cache: RwLock<HashMap<(i64, i64), (f64, f64)>>,
}

impl CoordinateTransformer {
    pub fn new() -> Self {
        Self {
            projection: Lambert93::new(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Return (longitude, latitude) for a Lambert-93 coordinate
    pub fn to_geographic(&self, x: i64, y: i64) -> (f64, f64) {
        if let Some(lon_lat) = self.cache.read().get(&(x, y)) {
            return *lon_lat;
        }

        // Computed without holding the lock; a concurrent duplicate yields the same value
        let lon_lat = self.projection.inverse(x as f64, y as f64);
        *self.cache.write().entry((x, y)).or_insert(lon_lat)
    }

    /// Number of memoized coordinates
    pub fn cached_len(&self) -> usize {
        self.cache.read().len()
    }

    /// Force a cached position for a coordinate
    #[cfg(test)]
    pub(crate) fn seed(&self, x: i64, y: i64, lon_lat: (f64, f64)) {
        self.cache.write().insert((x, y), lon_lat);
    }
}

impl Default for CoordinateTransformer {
    fn default() -> Self {
        Self::new()
    }
}
