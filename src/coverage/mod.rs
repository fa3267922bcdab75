//! Coverage resolution: per-point tower scan and batch orchestration.

mod resolver;
mod service;

pub use resolver::{CoverageResolver, ResolveError};
pub use service::{CoverageError, CoverageService};
