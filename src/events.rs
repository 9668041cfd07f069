//! Outbound lifecycle queue.
//!
//! The sensor loop produces, a forwarder thread consumes:
//!
//! ```text
//! ┌──────────────┐  QueueMsg   ┌──────────────────┐
//! │ Sensor Loop  │────────────▶│ DropDirForwarder │──▶ cmd_*.cmd files
//! │  (try_send)  │             │  (block_on recv) │
//! └──────────────┘             └──────────────────┘
//! ```
//!
//! The channel is a bounded `embassy-sync` MPMC channel. The producer
//! never waits: when the queue is full the event is dropped and counted.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use crate::app::events::EventRecord;

/// Pending lifecycle events before the producer starts dropping.
pub const LIFECYCLE_QUEUE_DEPTH: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QueueMsg {
    Event(EventRecord),
    /// Drain what is queued, then exit.
    Shutdown,
}

pub type LifecycleChannel = Channel<CriticalSectionRawMutex, QueueMsg, LIFECYCLE_QUEUE_DEPTH>;

pub fn lifecycle_channel() -> LifecycleChannel {
    Channel::new()
}
