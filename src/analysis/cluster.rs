//! Distance-adaptive single-link clustering.
//!
//! A fixed angular resolution covers more ground the further out a return
//! lands, so neighbouring returns from one body spread apart with range and
//! fewer of them hit it. Points are therefore split into distance bands and
//! each band is clustered with its own adjacency threshold and minimum
//! cluster size:
//!
//! ```text
//!  scale      = max(1, midpoint / scale_divisor)
//!  threshold  = base_threshold × scale
//!  min_points = max(2, round(base_min_points / √scale))
//! ```
//!
//! Within a band points are swept in angle order. A point joins the open
//! cluster if it is adjacent to any member; otherwise the open cluster is
//! closed (kept only if large enough) and a new one starts.

use core::f64::consts::{PI, TAU};

use crate::config::{ClusterConfig, DistanceRange};
use crate::lidar::Point;

/// Points judged to come from one physical object.
pub type Cluster = Vec<Point>;

/// Per-band parameters derived from a [`DistanceRange`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandParams {
    pub scale: f64,
    pub threshold: f64,
    pub min_points: usize,
}

#[derive(Debug, Clone)]
pub struct AdaptiveClusterer {
    ranges: Vec<DistanceRange>,
    base_threshold: f64,
    base_min_points: u32,
    scale_divisor: f64,
    far_field_cutoff: f64,
    far_field_tolerance: f64,
}

impl AdaptiveClusterer {
    pub fn new(config: &ClusterConfig) -> Self {
        Self {
            ranges: config.ranges.clone(),
            base_threshold: config.base_threshold,
            base_min_points: config.base_min_points,
            scale_divisor: config.scale_divisor,
            far_field_cutoff: config.far_field_cutoff,
            far_field_tolerance: config.far_field_tolerance,
        }
    }

    pub fn band_params(&self, range: &DistanceRange) -> BandParams {
        let scale = (range.midpoint() / self.scale_divisor).max(1.0);
        let min_points = (f64::from(self.base_min_points) / scale.sqrt()).round() as usize;
        BandParams {
            scale,
            threshold: self.base_threshold * scale,
            min_points: min_points.max(2),
        }
    }

    /// Cluster `points` band by band. Bands are visited in configuration
    /// order and their clusters concatenated.
    pub fn cluster(&self, points: &[Point]) -> Vec<Cluster> {
        let mut all = Vec::new();
        for range in &self.ranges {
            let mut band: Vec<Point> = points
                .iter()
                .filter(|p| range.contains(p.distance))
                .copied()
                .collect();
            if band.is_empty() {
                continue;
            }
            // Distance breaks angle ties so the sweep order, and with it the
            // result, does not depend on input order.
            band.sort_by(|a, b| {
                a.angle
                    .total_cmp(&b.angle)
                    .then(a.distance.total_cmp(&b.distance))
                    .then(a.confidence.cmp(&b.confidence))
            });
            self.sweep(&band, self.band_params(range), &mut all);
        }
        all
    }

    fn sweep(&self, sorted: &[Point], params: BandParams, out: &mut Vec<Cluster>) {
        let mut current: Cluster = Vec::new();
        for &candidate in sorted {
            if current.is_empty()
                || current
                    .iter()
                    .any(|member| self.adjacent(&candidate, member, params.threshold))
            {
                current.push(candidate);
                continue;
            }
            let closed = core::mem::replace(&mut current, vec![candidate]);
            if closed.len() >= params.min_points {
                out.push(closed);
            }
        }
        if current.len() >= params.min_points {
            out.push(current);
        }
    }

    /// Far candidates use arc length at the candidate's range: the
    /// Cartesian difference of two nearly parallel long vectors loses
    /// precision and the angular step dominates anyway.
    fn adjacent(&self, candidate: &Point, member: &Point, threshold: f64) -> bool {
        if candidate.distance > self.far_field_cutoff {
            let arc = wrapped_angle_diff(candidate.angle, member.angle) * candidate.distance;
            arc < threshold * self.far_field_tolerance
        } else {
            let (x1, y1) = candidate.cartesian();
            let (x2, y2) = member.cartesian();
            (x1 - x2).hypot(y1 - y2) < threshold
        }
    }
}

/// Absolute angular difference folded into `[0, π]`.
fn wrapped_angle_diff(a: f64, b: f64) -> f64 {
    let diff = (a - b).abs() % TAU;
    if diff > PI { TAU - diff } else { diff }
}
