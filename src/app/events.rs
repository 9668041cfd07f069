//! Outbound lifecycle events.
//!
//! The [`ZoneMachine`](crate::fsm::ZoneMachine) decides these on committed
//! zone edges and the [`PresenceService`](super::service::PresenceService)
//! emits them through the [`EventSink`](super::ports::EventSink) port.
//! Downstream they drive the installation's show controller.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleEvent {
    /// Someone entered the contact zone.
    Start,
    /// The contact zone was left.
    Stop,
    /// Someone stepped in from outside.
    Engage,
    /// Contact, then approach, then gone.
    Departure,
}

impl LifecycleEvent {
    /// Command name understood by the consumer.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Engage => "engage",
            Self::Departure => "departure",
        }
    }
}

impl core::fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lifecycle event as it leaves the process.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EventRecord {
    pub command: LifecycleEvent,
    /// Wall-clock seconds since the Unix epoch.
    pub timestamp: f64,
}
