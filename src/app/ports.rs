//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   SerialLink ──▶ PresenceService ──▶ LightingSink
//!        Clock ──▶   (pipeline)    ──▶ EventSink
//! ```
//!
//! Driven adapters (serial device, replay file, Art-Net node, drop
//! directory, clock, config file) implement these traits. The
//! [`PresenceService`](super::service::PresenceService) and the
//! [`runner`](super::runner) consume them via generics, so the pipeline
//! never touches a device directly and every test can swap in fakes.

use core::time::Duration;

use crate::actuation::DmxFrame;
use crate::config::SystemConfig;
use crate::error::{LinkError, SinkError};

use super::events::LifecycleEvent;

// ───────────────────────────────────────────────────────────────
// Sensor link (driving adapter: device → domain)
// ───────────────────────────────────────────────────────────────

/// Byte source carrying the sensor stream.
pub trait SerialLink {
    /// Read up to `buf.len()` bytes.
    ///
    /// `Ok(0)` and [`LinkError::Timeout`] both mean "nothing this time";
    /// [`LinkError::Closed`] ends the run.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, LinkError>;
}

// ───────────────────────────────────────────────────────────────
// Output sinks (driven adapters: domain → outside)
// ───────────────────────────────────────────────────────────────

/// Receives one intensity buffer per analysis pass. Fire-and-forget.
pub trait LightingSink {
    fn send(&mut self, frame: &DmxFrame) -> Result<(), SinkError>;
}

/// Receives lifecycle events. Must not block the caller.
pub trait EventSink {
    fn emit(&mut self, event: LifecycleEvent) -> Result<(), SinkError>;
}

// Boxed and borrowed adapters forward to the inner one, so the binary
// can pick backends at runtime.

impl<T: SerialLink + ?Sized> SerialLink for Box<T> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, LinkError> {
        (**self).read(buf)
    }
}

impl<T: LightingSink + ?Sized> LightingSink for Box<T> {
    fn send(&mut self, frame: &DmxFrame) -> Result<(), SinkError> {
        (**self).send(frame)
    }
}

impl<T: EventSink + ?Sized> EventSink for Box<T> {
    fn emit(&mut self, event: LifecycleEvent) -> Result<(), SinkError> {
        (**self).emit(event)
    }
}

impl<T: EventSink + ?Sized> EventSink for &mut T {
    fn emit(&mut self, event: LifecycleEvent) -> Result<(), SinkError> {
        (**self).emit(event)
    }
}

// ───────────────────────────────────────────────────────────────
// Time
// ───────────────────────────────────────────────────────────────

/// Monotonic time since an arbitrary, fixed origin.
pub trait Clock {
    fn now(&self) -> Duration;
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists system configuration.
///
/// Implementations must validate before persisting and reject invalid
/// values with [`ConfigError::ValidationFailed`] rather than clamp them.
pub trait ConfigPort {
    /// Returns [`SystemConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<SystemConfig, ConfigError>;

    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError>;
}

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No config found in storage.
    NotFound,
    /// Stored config could not be parsed.
    Corrupted,
    /// A config field failed validation; the message names the field.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for crate::error::Error {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::ValidationFailed(msg) => Self::Config(msg),
            ConfigError::NotFound => Self::Init("config not found"),
            ConfigError::Corrupted => Self::Init("config corrupted"),
            ConfigError::IoError => Self::Init("config I/O error"),
        }
    }
}
