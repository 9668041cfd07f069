//! Corridor region-of-interest filter.
//!
//! The sensor sits at the mouth of a corridor facing down it. Only the
//! front half-plane (0°–180°) is of interest, and of that only the strip
//! whose perpendicular offset from the centreline is within the corridor
//! half-width.

use crate::config::FilterConfig;
use crate::lidar::Point;

#[derive(Debug, Clone)]
pub struct SpatialFilter {
    half_width: f64,
    min_distance: f64,
    max_distance: f64,
    min_confidence: i32,
}

impl SpatialFilter {
    pub fn new(config: &FilterConfig) -> Self {
        Self {
            half_width: config.corridor_half_width,
            min_distance: config.min_distance,
            max_distance: config.max_distance,
            min_confidence: config.min_confidence,
        }
    }

    /// True if `point` satisfies all four predicates.
    pub fn accepts(&self, point: &Point) -> bool {
        let angle_deg = point.angle.to_degrees().rem_euclid(360.0);
        let in_front = (0.0..=180.0).contains(&angle_deg);
        let offset = (point.distance * point.angle.cos()).abs();
        in_front
            && offset <= self.half_width
            && (self.min_distance..=self.max_distance).contains(&point.distance)
            && point.confidence >= self.min_confidence
    }

    /// Retain the accepted points, preserving input order.
    pub fn apply(&self, points: &[Point]) -> Vec<Point> {
        points.iter().filter(|p| self.accepts(p)).copied().collect()
    }
}
