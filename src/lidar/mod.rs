//! LIDAR ingestion — everything between the serial byte stream and the
//! scan window handed to analysis.
//!
//! ```text
//!  bytes ──▶ FrameDecoder ──▶ PacketDecoder ──▶ ScanAccumulator ──▶ analysis
//!            (framing)        (LD06 points)     (N-frame window)
//! ```

pub mod frame;
pub mod packet;
pub mod window;

/// One range sample in sensor coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// Radians in `[0, 2π)`.
    pub angle: f64,
    /// Raw units (meters × 10).
    pub distance: f64,
    /// Return quality reported by the sensor.
    pub confidence: i32,
}

impl Point {
    pub const fn new(angle: f64, distance: f64, confidence: i32) -> Self {
        Self {
            angle,
            distance,
            confidence,
        }
    }

    /// Cartesian position, x along the 0° ray.
    #[inline]
    pub fn cartesian(&self) -> (f64, f64) {
        (
            self.distance * self.angle.cos(),
            self.distance * self.angle.sin(),
        )
    }
}
