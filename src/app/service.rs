//! Presence service — the hexagonal core.
//!
//! [`PresenceService`] owns every pipeline stage and the zone state. Bytes
//! go in; once per scan window one analysis pass runs and its outputs go
//! out through the port traits injected at the call site.
//!
//! ```text
//!  bytes ──▶ ┌──────────────────────────────────────────┐ ──▶ LightingSink
//!            │            PresenceService                │
//!  Clock ──▶ │ decode · window · filter · cluster · zone │ ──▶ EventSink
//!            └──────────────────────────────────────────┘
//! ```

use core::time::Duration;

use heapless::Vec as HVec;
use log::{debug, info, warn};

use crate::actuation::{ActuationEncoder, ActuationSignal, DmxFrame};
use crate::analysis::{AdaptiveClusterer, DistanceEstimator, SpatialFilter};
use crate::config::SystemConfig;
use crate::fsm::{MAX_EVENTS_PER_STEP, Transition, Zone, ZoneMachine, ZoneState};
use crate::lidar::Point;
use crate::lidar::frame::{DecoderStats, FrameDecoder, FrameEvent};
use crate::lidar::packet::PacketDecoder;
use crate::lidar::window::ScanAccumulator;

use super::events::LifecycleEvent;
use super::ports::{Clock, EventSink, LightingSink};

// ───────────────────────────────────────────────────────────────
// Pass report
// ───────────────────────────────────────────────────────────────

/// Everything one analysis pass decided.
#[derive(Debug, Clone, PartialEq)]
pub struct PassReport {
    /// Monotonic time the pass ran at.
    pub at: Duration,
    pub points_in_window: usize,
    pub points_kept: usize,
    pub clusters: usize,
    /// Representative distance in meters; `None` is "no detection".
    pub distance_m: Option<f64>,
    pub instant: Zone,
    pub committed: Zone,
    pub transition: Option<Transition>,
    pub actuation: ActuationSignal,
    pub frame: DmxFrame,
    pub events: HVec<LifecycleEvent, MAX_EVENTS_PER_STEP>,
}

/// Sink bookkeeping kept across the service lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceStats {
    pub passes: u64,
    pub events_emitted: u64,
    pub lighting_failures: u64,
    pub event_failures: u64,
}

// ───────────────────────────────────────────────────────────────
// Stateless analysis stages
// ───────────────────────────────────────────────────────────────

struct Analysis {
    filter: SpatialFilter,
    clusterer: AdaptiveClusterer,
    estimator: DistanceEstimator,
    units_per_meter: f64,
}

struct Evaluation {
    points_in_window: usize,
    points_kept: usize,
    clusters: usize,
    distance_m: Option<f64>,
}

impl Analysis {
    fn evaluate(&self, window: &[Point]) -> Evaluation {
        let kept = self.filter.apply(window);
        let clusters = self.clusterer.cluster(&kept);
        let distance_m = self
            .estimator
            .representative(&clusters)
            .map(|raw| raw / self.units_per_meter);
        Evaluation {
            points_in_window: window.len(),
            points_kept: kept.len(),
            clusters: clusters.len(),
            distance_m,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// PresenceService
// ───────────────────────────────────────────────────────────────

pub struct PresenceService {
    decoder: FrameDecoder,
    packets: PacketDecoder,
    window: ScanAccumulator,
    analysis: Analysis,
    zones: ZoneMachine,
    encoder: ActuationEncoder,
    state: ZoneState,
    stats: ServiceStats,
}

impl PresenceService {
    /// `config` is expected to have passed [`SystemConfig::validate`].
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            decoder: FrameDecoder::new(&config.frame),
            packets: PacketDecoder::new(config.frame.verify_checksum),
            window: ScanAccumulator::new(config.window.frames_per_window),
            analysis: Analysis {
                filter: SpatialFilter::new(&config.filter),
                clusterer: AdaptiveClusterer::new(&config.cluster),
                estimator: DistanceEstimator::new(
                    config.cluster.nearest_points,
                    config.filter.min_distance,
                ),
                units_per_meter: config.zones.units_per_meter,
            },
            zones: ZoneMachine::new(&config.zones),
            encoder: ActuationEncoder::new(&config.lighting),
            state: ZoneState::new(),
            stats: ServiceStats::default(),
        }
    }

    // ── Byte ingestion ────────────────────────────────────────

    /// Feed one byte. Returns the report if it completed a scan window.
    pub fn push_byte(
        &mut self,
        byte: u8,
        clock: &impl Clock,
        lighting: &mut impl LightingSink,
        events: &mut impl EventSink,
    ) -> Option<PassReport> {
        let boundary = self.decoder.push(byte)?;
        if !self.observe(boundary) {
            return None;
        }
        let report = self.run_window(clock.now());
        self.publish(&report, lighting, events);
        Some(report)
    }

    /// Feed a chunk, returning the reports of every pass it completed.
    pub fn feed(
        &mut self,
        data: &[u8],
        clock: &impl Clock,
        lighting: &mut impl LightingSink,
        events: &mut impl EventSink,
    ) -> Vec<PassReport> {
        data.iter()
            .filter_map(|&b| self.push_byte(b, clock, lighting, events))
            .collect()
    }

    // ── Analysis ──────────────────────────────────────────────

    /// Run one pass over an explicit point set, bypassing the window.
    /// Outputs are returned, not published.
    pub fn analyse(&mut self, points: &[Point], now: Duration) -> PassReport {
        let eval = self.analysis.evaluate(points);
        self.conclude(eval, now)
    }

    /// Send a report's buffer and events to the sinks. Failures are logged
    /// and counted; the pipeline never waits on or retries a sink.
    pub fn publish(
        &mut self,
        report: &PassReport,
        lighting: &mut impl LightingSink,
        events: &mut impl EventSink,
    ) {
        if let Err(e) = lighting.send(&report.frame) {
            self.stats.lighting_failures += 1;
            warn!("lighting sink: {}", e);
        }
        for &event in &report.events {
            info!("lifecycle event: {}", event);
            match events.emit(event) {
                Ok(()) => self.stats.events_emitted += 1,
                Err(e) => {
                    self.stats.event_failures += 1;
                    warn!("event sink dropped {}: {}", event, e);
                }
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn zone_state(&self) -> &ZoneState {
        &self.state
    }

    pub fn committed_zone(&self) -> Zone {
        self.state.committed()
    }

    pub fn decoder_stats(&self) -> DecoderStats {
        self.decoder.stats()
    }

    pub fn stats(&self) -> ServiceStats {
        self.stats
    }

    /// Drop any partial frame and window, keeping zone state.
    pub fn reset_stream(&mut self) {
        self.decoder.reset();
        self.window.clear();
    }

    // ── Internal ──────────────────────────────────────────────

    /// Every boundary counts toward the window; malformed ones add no points.
    fn observe(&mut self, boundary: FrameEvent) -> bool {
        match boundary {
            FrameEvent::Frame(frame) => {
                let batch = self.packets.decode(&frame);
                self.window.observe_frame(batch.points())
            }
            FrameEvent::Malformed { .. } => self.window.observe_frame(core::iter::empty()),
        }
    }

    fn run_window(&mut self, now: Duration) -> PassReport {
        let eval = self.analysis.evaluate(self.window.points());
        self.window.clear();
        self.conclude(eval, now)
    }

    fn conclude(&mut self, eval: Evaluation, now: Duration) -> PassReport {
        let (next, step) = self.zones.step(&self.state, eval.distance_m, now);
        self.state = next;
        self.stats.passes += 1;

        let actuation = self.encoder.encode(eval.distance_m);
        let report = PassReport {
            at: now,
            points_in_window: eval.points_in_window,
            points_kept: eval.points_kept,
            clusters: eval.clusters,
            distance_m: eval.distance_m,
            instant: step.instant,
            committed: self.state.committed(),
            transition: step.transition,
            actuation,
            frame: DmxFrame::from(&actuation),
            events: step.events,
        };
        debug!(
            "pass {}: {} pts, {} kept, {} clusters, d={:?} m, zone {} ({}), rgb={:.0}% uv={:.0}%",
            self.stats.passes,
            report.points_in_window,
            report.points_kept,
            report.clusters,
            report.distance_m,
            report.committed.label(),
            report.instant.label(),
            actuation.rgb_percent,
            actuation.uv_percent,
        );
        report
    }
}
