//! Per-window analysis — pure functions from a scan window to a single
//! representative distance.
//!
//! ```text
//!  &[Point] ──▶ SpatialFilter ──▶ AdaptiveClusterer ──▶ DistanceEstimator ──▶ Option<f64>
//! ```
//!
//! Nothing here keeps state between passes.

pub mod cluster;
pub mod distance;
pub mod filter;

pub use cluster::{AdaptiveClusterer, Cluster};
pub use distance::DistanceEstimator;
pub use filter::SpatialFilter;
