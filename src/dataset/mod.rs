//! Tower dataset loading and snapshot management.

mod store;

pub use store::{DatasetError, TowerStore};
