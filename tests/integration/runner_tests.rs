//! Runtime loop against scripted and recorded links.

use std::collections::VecDeque;
use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use oracle_presence::adapters::replay::ReplayLink;
use oracle_presence::app::events::LifecycleEvent;
use oracle_presence::actuation::DmxFrame;
use oracle_presence::app::ports::{LightingSink, SerialLink};
use oracle_presence::app::runner::{RunEnd, run};
use oracle_presence::app::service::PresenceService;
use oracle_presence::config::{RuntimeConfig, SystemConfig};
use oracle_presence::error::{LinkError, SinkError};

use crate::mock_io::{
    ManualClock, RecordingEvents, RecordingLighting, SteppingClock, capture, corridor_packet,
};

/// Plays back a fixed script of read results, then closes.
struct ScriptedLink {
    script: VecDeque<Result<Vec<u8>, LinkError>>,
    /// Raised when the script runs dry, if set.
    stop_when_empty: Option<Arc<AtomicBool>>,
}

impl ScriptedLink {
    fn new(script: Vec<Result<Vec<u8>, LinkError>>) -> Self {
        Self {
            script: script.into(),
            stop_when_empty: None,
        }
    }
}

impl SerialLink for ScriptedLink {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, LinkError> {
        match self.script.pop_front() {
            Some(Ok(bytes)) => {
                buf[..bytes.len()].copy_from_slice(&bytes);
                Ok(bytes.len())
            }
            Some(Err(e)) => Err(e),
            None => match &self.stop_when_empty {
                Some(stop) => {
                    stop.store(true, Ordering::Relaxed);
                    Err(LinkError::Timeout)
                }
                None => Err(LinkError::Closed),
            },
        }
    }
}

fn no_backoff() -> RuntimeConfig {
    RuntimeConfig {
        io_error_backoff_ms: 0,
        ..RuntimeConfig::default()
    }
}

#[test]
fn timeouts_and_io_errors_are_survived() {
    let mut service = PresenceService::new(&SystemConfig::default());
    let mut link = ScriptedLink::new(vec![
        Err(LinkError::Timeout),
        Ok(vec![0x54, 0x2C]),
        Ok(Vec::new()),
        Err(LinkError::Io(std::io::ErrorKind::Other)),
        Ok(vec![1, 2, 3]),
    ]);
    let stop = AtomicBool::new(false);
    let summary = run(
        &mut service,
        &mut link,
        &ManualClock::default(),
        &mut RecordingLighting::default(),
        &mut RecordingEvents::default(),
        &stop,
        &no_backoff(),
    );
    assert_eq!(summary.end, RunEnd::LinkClosed);
    assert_eq!(summary.bytes_read, 5);
    assert_eq!(summary.timeouts, 2);
    assert_eq!(summary.io_errors, 1);
    assert_eq!(summary.decoder.malformed, 1);
}

#[test]
fn raised_stop_flag_returns_before_reading() {
    let mut service = PresenceService::new(&SystemConfig::default());
    let mut link = ScriptedLink::new(vec![Ok(vec![0x54, 0x2C])]);
    let stop = AtomicBool::new(true);
    let summary = run(
        &mut service,
        &mut link,
        &ManualClock::default(),
        &mut RecordingLighting::default(),
        &mut RecordingEvents::default(),
        &stop,
        &no_backoff(),
    );
    assert_eq!(summary.end, RunEnd::Stopped);
    assert_eq!(summary.bytes_read, 0);
}

#[test]
fn idle_link_still_honours_stop() {
    let mut service = PresenceService::new(&SystemConfig::default());
    let stop = Arc::new(AtomicBool::new(false));
    let mut link = ScriptedLink::new(vec![Err(LinkError::Timeout)]);
    link.stop_when_empty = Some(stop.clone());
    let summary = run(
        &mut service,
        &mut link,
        &ManualClock::default(),
        &mut RecordingLighting::default(),
        &mut RecordingEvents::default(),
        &stop,
        &no_backoff(),
    );
    assert_eq!(summary.end, RunEnd::Stopped);
    assert_eq!(summary.timeouts, 2);
}

#[test]
fn replayed_capture_runs_to_completion() {
    // Three windows of a body at one meter, 300 ms of clock per pass.
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&capture(&corridor_packet(1.0), 3 * 40 - 1))
        .unwrap();
    let mut link = ReplayLink::open(file.path()).unwrap();

    let mut service = PresenceService::new(&SystemConfig::default());
    let mut lighting = RecordingLighting::default();
    let mut events = RecordingEvents::default();
    let stop = AtomicBool::new(false);
    let summary = run(
        &mut service,
        &mut link,
        &SteppingClock::new(Duration::from_millis(300)),
        &mut lighting,
        &mut events,
        &stop,
        &RuntimeConfig::default(),
    );

    assert_eq!(summary.end, RunEnd::LinkClosed);
    assert_eq!(summary.service.passes, 3);
    assert_eq!(summary.decoder.frames, 3 * 40 - 1);
    assert_eq!(lighting.frames.len(), 3);
    assert_eq!(events.events, vec![LifecycleEvent::Start]);
}

/// Raises the stop flag when the first buffer goes out.
struct StopOnFirstFrame<'a> {
    stop: &'a AtomicBool,
    frames: usize,
}

impl LightingSink for StopOnFirstFrame<'_> {
    fn send(&mut self, _frame: &DmxFrame) -> Result<(), SinkError> {
        self.frames += 1;
        self.stop.store(true, Ordering::Relaxed);
        Ok(())
    }
}

#[test]
fn stop_mid_chunk_skips_the_remaining_passes() {
    // Three windows in a single read; the flag goes up during the first pass.
    let bytes = capture(&corridor_packet(1.0), 3 * 40 - 1);
    let config = RuntimeConfig {
        read_chunk: bytes.len(),
        ..no_backoff()
    };
    let mut link = ScriptedLink::new(vec![Ok(bytes)]);
    let mut service = PresenceService::new(&SystemConfig::default());
    let stop = AtomicBool::new(false);
    let mut lighting = StopOnFirstFrame {
        stop: &stop,
        frames: 0,
    };
    let mut events = RecordingEvents::default();
    let summary = run(
        &mut service,
        &mut link,
        &SteppingClock::new(Duration::from_millis(300)),
        &mut lighting,
        &mut events,
        &stop,
        &config,
    );

    assert_eq!(summary.end, RunEnd::Stopped);
    assert_eq!(summary.service.passes, 1);
    assert_eq!(lighting.frames, 1);
    assert!(events.events.is_empty());
}
