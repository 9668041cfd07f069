//! Scan window accumulation.
//!
//! Analysis is expensive relative to the sensor frame rate, so points are
//! buffered across a fixed number of raw frames and analysed once per
//! window. Malformed frames still advance the frame counter: a noisy link
//! yields sparser windows, never longer ones.

use super::Point;

pub struct ScanAccumulator {
    frames_per_window: u32,
    frames_seen: u32,
    points: Vec<Point>,
    windows_completed: u64,
}

impl ScanAccumulator {
    pub fn new(frames_per_window: u32) -> Self {
        Self {
            frames_per_window: frames_per_window.max(1),
            frames_seen: 0,
            points: Vec::new(),
            windows_completed: 0,
        }
    }

    /// Record one raw frame and the points it decoded to (possibly none).
    ///
    /// Returns `true` when this frame completes the window; the caller
    /// should then run one analysis pass over [`points`](Self::points)
    /// and call [`clear`](Self::clear).
    pub fn observe_frame(&mut self, points: impl IntoIterator<Item = Point>) -> bool {
        self.points.extend(points);
        self.frames_seen += 1;
        if self.frames_seen >= self.frames_per_window {
            self.frames_seen = 0;
            self.windows_completed += 1;
            true
        } else {
            false
        }
    }

    /// Read-only view of the current window.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Empty the window, retaining capacity for the next one.
    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Frames observed since the last window boundary.
    pub fn frames_seen(&self) -> u32 {
        self.frames_seen
    }

    pub fn windows_completed(&self) -> u64 {
        self.windows_completed
    }
}
