//! Mock adapters and LD06 stream builders for integration tests.
//!
//! Sinks record everything they are handed; the clock only moves when a
//! test moves it.

use std::cell::Cell;
use std::time::Duration;

use oracle_presence::actuation::DmxFrame;
use oracle_presence::app::events::LifecycleEvent;
use oracle_presence::app::ports::{Clock, EventSink, LightingSink};
use oracle_presence::app::service::{PassReport, PresenceService};
use oracle_presence::config::SystemConfig;
use oracle_presence::error::SinkError;
use oracle_presence::lidar::packet::{POINTS_PER_PACKET, Packet, Sample};

// ── Clocks ────────────────────────────────────────────────────

#[derive(Default)]
pub struct ManualClock(Cell<Duration>);

#[allow(dead_code)]
impl ManualClock {
    pub fn set(&self, t: Duration) {
        self.0.set(t);
    }

    pub fn advance(&self, by: Duration) {
        self.0.set(self.0.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.0.get()
    }
}

/// Moves forward by a fixed step every time it is read.
pub struct SteppingClock {
    next: Cell<Duration>,
    step: Duration,
}

#[allow(dead_code)]
impl SteppingClock {
    pub fn new(step: Duration) -> Self {
        Self {
            next: Cell::new(Duration::ZERO),
            step,
        }
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> Duration {
        let t = self.next.get();
        self.next.set(t + self.step);
        t
    }
}

// ── Sinks ─────────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingLighting {
    pub frames: Vec<DmxFrame>,
}

impl LightingSink for RecordingLighting {
    fn send(&mut self, frame: &DmxFrame) -> Result<(), SinkError> {
        self.frames.push(*frame);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingEvents {
    pub events: Vec<LifecycleEvent>,
}

#[allow(dead_code)]
impl RecordingEvents {
    pub fn count(&self, event: LifecycleEvent) -> usize {
        self.events.iter().filter(|&&e| e == event).count()
    }
}

impl EventSink for RecordingEvents {
    fn emit(&mut self, event: LifecycleEvent) -> Result<(), SinkError> {
        self.events.push(event);
        Ok(())
    }
}

/// Rejects everything.
pub struct FailingSink;

impl LightingSink for FailingSink {
    fn send(&mut self, _: &DmxFrame) -> Result<(), SinkError> {
        Err(SinkError::Unreachable)
    }
}

impl EventSink for FailingSink {
    fn emit(&mut self, _: LifecycleEvent) -> Result<(), SinkError> {
        Err(SinkError::QueueFull)
    }
}

// ── LD06 stream builders ──────────────────────────────────────

const HEADER: [u8; 2] = [0x54, 0x2C];

/// Twelve equal returns spread from `start_deg` to `end_deg`.
pub fn packet(start_deg: f64, end_deg: f64, distance_mm: u16, confidence: u8) -> Packet {
    let mut p = Packet {
        speed_dps: 3600,
        start_angle_cdeg: (start_deg * 100.0).round() as u16,
        end_angle_cdeg: (end_deg * 100.0).round() as u16,
        timestamp_ms: 0,
        samples: [Sample {
            distance_mm,
            confidence,
        }; POINTS_PER_PACKET],
    };
    // A header pair inside the body would split the frame.
    while has_inner_header(&p.to_bytes()) {
        p.timestamp_ms += 1;
    }
    p
}

/// A body straight down the corridor at `meters`.
pub fn corridor_packet(meters: f64) -> Packet {
    packet(85.0, 95.0, (meters * 1000.0).round() as u16, 200)
}

fn has_inner_header(bytes: &[u8]) -> bool {
    bytes[2..].windows(2).any(|w| w == HEADER)
}

/// Body of `packet` followed by the next header, which closes it.
pub fn frame_chunk(packet: &Packet) -> Vec<u8> {
    let mut out = packet.to_bytes()[2..].to_vec();
    out.extend_from_slice(&HEADER);
    out
}

/// Header, `n` copies of `packet`, closing header: `n` frames plus one
/// leading empty boundary.
pub fn capture(packet: &Packet, n: usize) -> Vec<u8> {
    let mut out = HEADER.to_vec();
    for _ in 0..n {
        out.extend(frame_chunk(packet));
    }
    out
}

// ── Test rig ──────────────────────────────────────────────────

pub struct Rig {
    pub service: PresenceService,
    pub clock: ManualClock,
    pub lighting: RecordingLighting,
    pub events: RecordingEvents,
}

#[allow(dead_code)]
impl Rig {
    /// The stream is primed with one header, which is the first boundary
    /// counted toward the first window.
    pub fn new(config: &SystemConfig) -> Self {
        let mut rig = Self {
            service: PresenceService::new(config),
            clock: ManualClock::default(),
            lighting: RecordingLighting::default(),
            events: RecordingEvents::default(),
        };
        assert!(rig.feed(&HEADER).is_empty());
        rig
    }

    pub fn feed(&mut self, bytes: &[u8]) -> Vec<PassReport> {
        self.service
            .feed(bytes, &self.clock, &mut self.lighting, &mut self.events)
    }

    /// Feed copies of `packet` at time `at` until a window completes.
    pub fn window_at(&mut self, at: Duration, packet: &Packet) -> PassReport {
        self.clock.set(at);
        let chunk = frame_chunk(packet);
        for _ in 0..1_000 {
            if let Some(report) = self.feed(&chunk).pop() {
                return report;
            }
        }
        panic!("window never completed");
    }

    /// Hold `packet` in windows every 200 ms from `from` until a commit.
    /// Returns the committing report and the time after it.
    pub fn hold(&mut self, from: Duration, packet: &Packet) -> (PassReport, Duration) {
        let mut t = from;
        for _ in 0..50 {
            let report = self.window_at(t, packet);
            t += Duration::from_millis(200);
            if report.transition.is_some() {
                return (report, t);
            }
        }
        panic!("zone never committed");
    }
}
