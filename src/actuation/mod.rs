//! Distance → lighting intensities.
//!
//! Two ramps are driven from the representative distance: the ambient RGB
//! wash brightens as a visitor walks away, the UV wash brightens as they
//! come close.
//!
//! ```text
//!   rgb %  100 ┤            ╭──────        uv %  100 ┤──╮
//!              │          ╱                          │    ╲
//!            0 ┤───────╯                           0 ┤      ╰──────
//!              └──┬──────┬──── d (m)                 └──┬────┬──── d (m)
//!                rgb_min rgb_max                       uv_min uv_max
//! ```
//!
//! The DMX buffer layout is fixed by the fixture patch: slot 0 RGB dimmer,
//! slots 1–3 the wash colour, slot 7 UV dimmer, slots 11–14 the always-on
//! strobe/shutter channels.

use crate::config::LightingConfig;

/// Slots in the intensity buffer.
pub const DMX_SLOTS: usize = 16;

const RGB_DIMMER: usize = 0;
const RGB_COLOUR: [(usize, u8); 3] = [(1, 255), (2, 0), (3, 135)];
const UV_DIMMER: usize = 7;
const FIXED_FULL: core::ops::RangeInclusive<usize> = 11..=14;

/// Intensities for one pass, in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActuationSignal {
    pub rgb_percent: f64,
    pub uv_percent: f64,
}

impl ActuationSignal {
    /// Output with nobody in range.
    pub const IDLE: Self = Self {
        rgb_percent: 100.0,
        uv_percent: 0.0,
    };
}

/// The 16-slot buffer handed to the lighting sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DmxFrame(pub [u8; DMX_SLOTS]);

impl DmxFrame {
    pub fn as_bytes(&self) -> &[u8; DMX_SLOTS] {
        &self.0
    }
}

impl From<&ActuationSignal> for DmxFrame {
    fn from(signal: &ActuationSignal) -> Self {
        let mut slots = [0u8; DMX_SLOTS];
        slots[RGB_DIMMER] = percent_to_level(signal.rgb_percent);
        for (slot, value) in RGB_COLOUR {
            slots[slot] = value;
        }
        slots[UV_DIMMER] = percent_to_level(signal.uv_percent);
        for slot in FIXED_FULL {
            slots[slot] = 255;
        }
        Self(slots)
    }
}

/// `trunc(pct × 255 / 100)`; the float→int cast saturates.
fn percent_to_level(percent: f64) -> u8 {
    (percent * 255.0 / 100.0) as u8
}

#[derive(Debug, Clone)]
pub struct ActuationEncoder {
    rgb_min_m: f64,
    rgb_max_m: f64,
    uv_min_m: f64,
    uv_max_m: f64,
}

impl ActuationEncoder {
    pub fn new(config: &LightingConfig) -> Self {
        Self {
            rgb_min_m: config.rgb_min_m,
            rgb_max_m: config.rgb_max_m,
            uv_min_m: config.uv_min_m,
            uv_max_m: config.uv_max_m,
        }
    }

    pub fn encode(&self, distance_m: Option<f64>) -> ActuationSignal {
        let Some(d) = distance_m.filter(|d| !d.is_nan()) else {
            return ActuationSignal::IDLE;
        };
        ActuationSignal {
            rgb_percent: ramp(d - self.rgb_min_m, self.rgb_max_m - self.rgb_min_m),
            uv_percent: ramp(self.uv_max_m - d, self.uv_max_m - self.uv_min_m),
        }
    }

    pub fn frame(&self, distance_m: Option<f64>) -> DmxFrame {
        DmxFrame::from(&self.encode(distance_m))
    }
}

fn ramp(offset: f64, span: f64) -> f64 {
    (offset / span * 100.0).clamp(0.0, 100.0)
}
