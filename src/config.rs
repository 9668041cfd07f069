//! System configuration parameters
//!
//! All tunable parameters for the presence pipeline. The defaults are the
//! reference installation values; any of them can be overridden from a JSON
//! file (see [`crate::adapters::config_file`]). Every section uses
//! `#[serde(default)]` so a file only needs to name what it changes.

use serde::{Deserialize, Serialize};

use crate::lidar::frame::MAX_PAYLOAD_LEN;

/// Core system configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    pub serial: SerialConfig,
    pub frame: FrameConfig,
    pub window: WindowConfig,
    pub filter: FilterConfig,
    pub cluster: ClusterConfig,
    pub zones: ZoneConfig,
    pub lighting: LightingConfig,
    pub events: EventConfig,
    pub runtime: RuntimeConfig,
}

// --- Serial link ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Device path of the LIDAR UART.
    pub port: String,
    /// Baud rate (8N1 is fixed).
    pub baud_rate: u32,
    /// Blocking read timeout in milliseconds.
    pub read_timeout_ms: u64,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: "/dev/ttyAMA0".into(),
            baud_rate: 230_400,
            read_timeout_ms: 5_000,
        }
    }
}

// --- Framing ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Byte that opens a packet.
    pub start_marker: u8,
    /// Byte that must directly follow the start marker.
    pub header_marker: u8,
    /// Payload bytes between two headers.
    pub payload_len: usize,
    /// Reject packets whose CRC-8 does not match.
    pub verify_checksum: bool,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            start_marker: 0x54,
            header_marker: 0x2C,
            payload_len: 45,
            verify_checksum: true,
        }
    }
}

// --- Scan window ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Raw frames observed per analysis pass.
    pub frames_per_window: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            frames_per_window: 40,
        }
    }
}

// --- Spatial filter (raw distance units: meters x 10) ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Maximum perpendicular offset from the corridor centreline.
    pub corridor_half_width: f64,
    pub min_distance: f64,
    pub max_distance: f64,
    pub min_confidence: i32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            corridor_half_width: 3.0,
            min_distance: 0.5,
            max_distance: 60.0,
            min_confidence: 10,
        }
    }
}

// --- Adaptive clustering ---

/// Half-open distance band `[min, max)` clustered independently.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceRange {
    pub min: f64,
    pub max: f64,
}

impl DistanceRange {
    #[inline]
    pub fn contains(&self, distance: f64) -> bool {
        self.min <= distance && distance < self.max
    }

    #[inline]
    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    pub ranges: Vec<DistanceRange>,
    /// Adjacency threshold at scale 1.0.
    pub base_threshold: f64,
    /// Minimum cluster size at scale 1.0.
    pub base_min_points: u32,
    /// Range midpoint divided by this gives the scale factor (floored at 1).
    pub scale_divisor: f64,
    /// Beyond this distance membership uses the arc-length approximation.
    pub far_field_cutoff: f64,
    /// Arc-length tolerance as a multiple of the adjacency threshold.
    pub far_field_tolerance: f64,
    /// Number of nearest points averaged into a cluster distance.
    pub nearest_points: usize,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            ranges: vec![
                DistanceRange { min: 0.5, max: 10.0 },
                DistanceRange { min: 10.0, max: 20.0 },
                DistanceRange { min: 20.0, max: 30.0 },
                DistanceRange { min: 30.0, max: 60.0 },
            ],
            base_threshold: 0.5,
            base_min_points: 3,
            scale_divisor: 20.0,
            far_field_cutoff: 20.0,
            far_field_tolerance: 2.0,
            nearest_points: 3,
        }
    }
}

// --- Zones (meters) ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneConfig {
    /// Raw units per meter.
    pub units_per_meter: f64,
    pub contact_limit_m: f64,
    pub approach_limit_m: f64,
    /// Time an instantaneous zone must hold before it is committed.
    pub stability_secs: f64,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            units_per_meter: 10.0,
            contact_limit_m: 2.0,
            approach_limit_m: 5.0,
            stability_secs: 0.5,
        }
    }
}

// --- Lighting ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightingBackend {
    /// Art-Net ArtDmx over UDP.
    ArtNet,
    /// Log the buffer only.
    Log,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    pub backend: LightingBackend,
    /// Art-Net node address, `host:port`.
    pub target: String,
    pub universe: u16,
    pub rgb_min_m: f64,
    pub rgb_max_m: f64,
    pub uv_min_m: f64,
    pub uv_max_m: f64,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            backend: LightingBackend::ArtNet,
            target: "127.0.0.1:6454".into(),
            universe: 1,
            rgb_min_m: 2.0,
            rgb_max_m: 5.0,
            uv_min_m: 1.0,
            uv_max_m: 3.0,
        }
    }
}

// --- Lifecycle events ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventBackend {
    /// JSON command files in a drop directory.
    DropDir,
    /// Log the events only.
    Log,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    pub backend: EventBackend,
    pub drop_dir: String,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            backend: EventBackend::DropDir,
            drop_dir: "/tmp/oracle_commands".into(),
        }
    }
}

// --- Runtime loop ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Bytes requested per link read.
    pub read_chunk: usize,
    /// Pause after a non-timeout link error before retrying.
    pub io_error_backoff_ms: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            read_chunk: 256,
            io_error_backoff_ms: 100,
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

impl SystemConfig {
    /// Reject structurally invalid values. Every message names the field.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.serial.baud_rate == 0 {
            return Err("serial.baud_rate must be non-zero");
        }
        if self.frame.payload_len == 0 {
            return Err("frame.payload_len must be non-zero");
        }
        if self.frame.payload_len > MAX_PAYLOAD_LEN {
            return Err("frame.payload_len exceeds the frame buffer");
        }
        if self.frame.start_marker == self.frame.header_marker {
            return Err("frame markers must differ");
        }
        if self.window.frames_per_window == 0 {
            return Err("window.frames_per_window must be non-zero");
        }

        let f = &self.filter;
        if !(f.corridor_half_width > 0.0) {
            return Err("filter.corridor_half_width must be positive");
        }
        if !(f.min_distance >= 0.0 && f.min_distance < f.max_distance) {
            return Err("filter distance bounds are inverted");
        }

        let c = &self.cluster;
        if c.ranges.is_empty() {
            return Err("cluster.ranges must not be empty");
        }
        if c.ranges.iter().any(|r| !(r.min < r.max)) {
            return Err("cluster.ranges contains an empty or inverted range");
        }
        if !(c.base_threshold > 0.0) {
            return Err("cluster.base_threshold must be positive");
        }
        if c.base_min_points == 0 {
            return Err("cluster.base_min_points must be non-zero");
        }
        if !(c.scale_divisor > 0.0) {
            return Err("cluster.scale_divisor must be positive");
        }
        if !(c.far_field_tolerance > 0.0) {
            return Err("cluster.far_field_tolerance must be positive");
        }
        if c.nearest_points == 0 {
            return Err("cluster.nearest_points must be non-zero");
        }

        let z = &self.zones;
        if !(z.units_per_meter > 0.0) {
            return Err("zones.units_per_meter must be positive");
        }
        if !(z.contact_limit_m > 0.0 && z.contact_limit_m < z.approach_limit_m) {
            return Err("zones.contact_limit_m must be below zones.approach_limit_m");
        }
        if !(z.stability_secs >= 0.0) {
            return Err("zones.stability_secs must not be negative");
        }
        if core::time::Duration::try_from_secs_f64(z.stability_secs).is_err() {
            return Err("zones.stability_secs is out of range");
        }

        let l = &self.lighting;
        if !(l.rgb_min_m < l.rgb_max_m) {
            return Err("lighting RGB ramp is inverted");
        }
        if !(l.uv_min_m < l.uv_max_m) {
            return Err("lighting UV ramp is inverted");
        }

        if self.runtime.read_chunk == 0 {
            return Err("runtime.read_chunk must be non-zero");
        }
        Ok(())
    }
}
