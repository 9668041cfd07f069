//! Debounced proximity-zone state machine.
//!
//! ```text
//!            d < 2 m            2 m ≤ d < 5 m        d ≥ 5 m / none
//!        ┌───────────┐        ┌──────────────┐      ┌───────────┐
//!        │  Contact  │◀──────▶│   Approach   │◀────▶│    Out    │
//!        └───────────┘        └──────────────┘      └───────────┘
//!              ▲                                          │
//!              └──────────────────────────────────────────┘
//! ```
//!
//! Each analysis pass classifies the representative distance into an
//! *instantaneous* zone. A change is only *committed* once the
//! instantaneous zone has differed from the committed one for the whole
//! stability window; a pass that agrees with the committed zone restarts
//! the window. Outputs are Mealy-style: lifecycle events depend on the
//! committed edge, not on the resulting zone alone.
//!
//! | Committed edge          | Immediate event |
//! |-------------------------|-----------------|
//! | Out → Approach          | `engage`        |
//! | Contact → (any other)   | `stop`          |
//! | (any other) → Contact   | `start`         |
//!
//! Independently, the committed history is matched against
//! `[Contact, Approach, Out]` to emit `departure`.
//!
//! The machine itself is stateless. [`ZoneState`] is owned by the caller
//! and threaded through [`ZoneMachine::step`] together with the current
//! time, so passes can be replayed with a simulated clock.

pub mod sequence;

use core::time::Duration;

use heapless::Vec;
use log::info;

use crate::app::events::LifecycleEvent;
use crate::config::ZoneConfig;
use sequence::ZoneSequence;

// ---------------------------------------------------------------------------
// Zone identity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zone {
    Contact,
    Approach,
    Out,
}

impl Zone {
    pub fn label(self) -> &'static str {
        match self {
            Self::Contact => "contact",
            Self::Approach => "approach",
            Self::Out => "out",
        }
    }
}

// ---------------------------------------------------------------------------
// State carried between passes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneState {
    committed: Zone,
    /// When the instantaneous zone first diverged from `committed`.
    pending_since: Option<Duration>,
    sequence: ZoneSequence,
}

impl Default for ZoneState {
    fn default() -> Self {
        Self {
            committed: Zone::Out,
            pending_since: None,
            sequence: ZoneSequence::new(),
        }
    }
}

impl ZoneState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn committed(&self) -> Zone {
        self.committed
    }

    pub fn pending_since(&self) -> Option<Duration> {
        self.pending_since
    }

    pub fn sequence(&self) -> &ZoneSequence {
        &self.sequence
    }
}

// ---------------------------------------------------------------------------
// Step output
// ---------------------------------------------------------------------------

/// Upper bound of events per pass: one immediate plus one departure.
pub const MAX_EVENTS_PER_STEP: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: Zone,
    pub to: Zone,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutput {
    /// Zone implied by this pass's distance alone.
    pub instant: Zone,
    /// Set when this pass committed a change.
    pub transition: Option<Transition>,
    /// Departure first, then the immediate event.
    pub events: Vec<LifecycleEvent, MAX_EVENTS_PER_STEP>,
}

// ---------------------------------------------------------------------------
// Machine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ZoneMachine {
    contact_limit_m: f64,
    approach_limit_m: f64,
    stability: Duration,
}

impl ZoneMachine {
    pub fn new(config: &ZoneConfig) -> Self {
        Self {
            contact_limit_m: config.contact_limit_m,
            approach_limit_m: config.approach_limit_m,
            // Validated configs always convert; anything else saturates.
            stability: Duration::try_from_secs_f64(config.stability_secs)
                .unwrap_or(Duration::MAX),
        }
    }

    /// `None` (no detection) is always `Out`.
    pub fn classify(&self, distance_m: Option<f64>) -> Zone {
        match distance_m {
            Some(d) if d < self.contact_limit_m => Zone::Contact,
            Some(d) if d < self.approach_limit_m => Zone::Approach,
            _ => Zone::Out,
        }
    }

    /// Advance one analysis pass.
    pub fn step(
        &self,
        state: &ZoneState,
        distance_m: Option<f64>,
        now: Duration,
    ) -> (ZoneState, StepOutput) {
        let instant = self.classify(distance_m);
        let mut next = state.clone();
        let mut out = StepOutput {
            instant,
            transition: None,
            events: Vec::new(),
        };

        if instant == state.committed {
            next.pending_since = None;
            return (next, out);
        }

        let since = *next.pending_since.get_or_insert(now);
        if now.saturating_sub(since) < self.stability {
            return (next, out);
        }

        let from = state.committed;
        next.committed = instant;
        next.pending_since = None;
        out.transition = Some(Transition { from, to: instant });
        info!("zone committed: {} -> {}", from.label(), instant.label());

        next.sequence.record(instant);
        if next.sequence.is_departure() {
            next.sequence.clear();
            push_event(&mut out.events, LifecycleEvent::Departure);
        }
        if let Some(event) = immediate_event(from, instant) {
            push_event(&mut out.events, event);
        }

        (next, out)
    }
}

fn immediate_event(from: Zone, to: Zone) -> Option<LifecycleEvent> {
    match (from, to) {
        (Zone::Out, Zone::Approach) => Some(LifecycleEvent::Engage),
        (Zone::Contact, _) => Some(LifecycleEvent::Stop),
        (_, Zone::Contact) => Some(LifecycleEvent::Start),
        _ => None,
    }
}

fn push_event(events: &mut Vec<LifecycleEvent, MAX_EVENTS_PER_STEP>, event: LifecycleEvent) {
    // At most one departure and one immediate event per step.
    let pushed = events.push(event).is_ok();
    debug_assert!(pushed, "more than {MAX_EVENTS_PER_STEP} events in one step");
}
