//! Blocking sensor loop.
//!
//! Reads chunks from the link and feeds the service until the link closes
//! or the stop flag is raised. The flag is checked before every read and
//! after every pass, so a silent link still shuts down within one read
//! timeout and no pass runs once the flag is seen.

use core::sync::atomic::{AtomicBool, Ordering};
use core::time::Duration;

use log::{debug, info, warn};

use crate::config::RuntimeConfig;
use crate::error::LinkError;
use crate::lidar::frame::DecoderStats;

use super::ports::{Clock, EventSink, LightingSink, SerialLink};
use super::service::{PresenceService, ServiceStats};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEnd {
    /// The stop flag was raised.
    Stopped,
    /// The link reported end of stream.
    LinkClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub end: RunEnd,
    pub bytes_read: u64,
    pub timeouts: u64,
    pub io_errors: u64,
    pub decoder: DecoderStats,
    pub service: ServiceStats,
}

pub fn run(
    service: &mut PresenceService,
    link: &mut impl SerialLink,
    clock: &impl Clock,
    lighting: &mut impl LightingSink,
    events: &mut impl EventSink,
    stop: &AtomicBool,
    config: &RuntimeConfig,
) -> RunSummary {
    let mut buf = vec![0u8; config.read_chunk.max(1)];
    let backoff = Duration::from_millis(config.io_error_backoff_ms);
    let mut bytes_read = 0u64;
    let mut timeouts = 0u64;
    let mut io_errors = 0u64;

    let end = loop {
        if stop.load(Ordering::Relaxed) {
            break RunEnd::Stopped;
        }
        match link.read(&mut buf) {
            Ok(0) | Err(LinkError::Timeout) => {
                timeouts += 1;
                debug!("link idle");
            }
            Ok(n) => {
                bytes_read += n as u64;
                for &byte in &buf[..n] {
                    let Some(report) = service.push_byte(byte, clock, lighting, events) else {
                        continue;
                    };
                    if report.transition.is_some() {
                        debug!("pass at {:?} committed {}", report.at, report.committed.label());
                    }
                    // The rest of the chunk is discarded once stopped.
                    if stop.load(Ordering::Relaxed) {
                        break;
                    }
                }
            }
            Err(LinkError::Closed) => {
                info!("link closed");
                break RunEnd::LinkClosed;
            }
            Err(e) => {
                io_errors += 1;
                warn!("link read failed: {}", e);
                if !backoff.is_zero() {
                    std::thread::sleep(backoff);
                }
            }
        }
    };

    RunSummary {
        end,
        bytes_read,
        timeouts,
        io_errors,
        decoder: service.decoder_stats(),
        service: service.stats(),
    }
}
