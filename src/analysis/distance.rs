//! Representative distance of a scan window.

use super::Cluster;

#[derive(Debug, Clone, Copy)]
pub struct DistanceEstimator {
    nearest_points: usize,
    min_valid_distance: f64,
}

impl DistanceEstimator {
    pub fn new(nearest_points: usize, min_valid_distance: f64) -> Self {
        Self {
            nearest_points: nearest_points.max(1),
            min_valid_distance,
        }
    }

    /// Mean of the `nearest_points` smallest member distances, damping a
    /// single stray return. `None` for an empty cluster.
    pub fn cluster_distance(&self, cluster: &Cluster) -> Option<f64> {
        if cluster.is_empty() {
            return None;
        }
        let mut distances: Vec<f64> = cluster.iter().map(|p| p.distance).collect();
        distances.sort_by(f64::total_cmp);
        let n = self.nearest_points.min(distances.len());
        Some(distances[..n].iter().sum::<f64>() / n as f64)
    }

    /// Nearest surviving cluster, or `None` for "no detection".
    pub fn representative(&self, clusters: &[Cluster]) -> Option<f64> {
        clusters
            .iter()
            .filter_map(|c| self.cluster_distance(c))
            .filter(|&d| d >= self.min_valid_distance)
            .min_by(f64::total_cmp)
    }
}
