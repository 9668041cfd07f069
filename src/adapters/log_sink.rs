//! Log-based sink adapters.
//!
//! Used in dry-run mode: lifecycle events and DMX buffers are written to
//! the logger instead of leaving the process.

use log::info;

use crate::actuation::DmxFrame;
use crate::app::events::LifecycleEvent;
use crate::app::ports::{EventSink, LightingSink};
use crate::error::SinkError;

pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: LifecycleEvent) -> Result<(), SinkError> {
        info!("EVENT | {}", event);
        Ok(())
    }
}

/// Logs a buffer only when it differs from the previous one.
pub struct LogLightingSink {
    last: Option<DmxFrame>,
}

impl LogLightingSink {
    pub fn new() -> Self {
        Self { last: None }
    }
}

impl Default for LogLightingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LightingSink for LogLightingSink {
    fn send(&mut self, frame: &DmxFrame) -> Result<(), SinkError> {
        if self.last.as_ref() != Some(frame) {
            info!("DMX   | {:?}", frame.as_bytes());
            self.last = Some(*frame);
        }
        Ok(())
    }
}
