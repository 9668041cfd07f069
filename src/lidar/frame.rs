//! Marker-delimited streaming frame decoder.
//!
//! Wire format (LD06):
//! ```text
//! ┌──────┬──────┬───────────────────────────────┐
//! │ 0x54 │ 0x2C │ payload (45 B, CRC included)  │
//! └──────┴──────┴───────────────────────────────┘
//! ```
//!
//! The stream carries no length prefix, so a frame is only known to be
//! complete when the *next* `0x54 0x2C` header arrives. The decoder
//! accumulates bytes until that header and then checks that exactly
//! `payload_len` bytes were collected in between. Anything else is a
//! malformed frame: the accumulator is discarded and scanning resumes.
//! One corrupted byte therefore costs at most the frame it lands in.

use heapless::Vec;
use log::debug;

use crate::config::FrameConfig;

/// Largest frame the decoder can hand out (markers + payload).
pub const MAX_FRAME_LEN: usize = 64;

/// Largest configurable payload.
pub const MAX_PAYLOAD_LEN: usize = MAX_FRAME_LEN - 2;

/// Accumulator capacity. Filling it without a boundary resets the decoder.
const ACCUMULATOR_CAP: usize = 256;

/// A complete frame: both markers followed by the payload.
pub type SensorFrame = Vec<u8, MAX_FRAME_LEN>;

/// Outcome of a header boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameEvent {
    /// A length-valid frame.
    Frame(SensorFrame),
    /// A boundary was seen but the payload length was wrong.
    Malformed { payload_len: usize },
}

/// Decoder state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecoderState {
    /// Collecting bytes; the last byte was not a start marker.
    Collecting,
    /// The last byte was a start marker.
    AfterStart,
}

/// Counters kept across the decoder lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecoderStats {
    /// Length-valid frames emitted.
    pub frames: u64,
    /// Boundaries with the wrong payload length.
    pub malformed: u64,
    /// Accumulator overflows without any boundary.
    pub overflow_resets: u64,
}

/// Streaming frame decoder.
pub struct FrameDecoder {
    state: DecoderState,
    buf: Vec<u8, ACCUMULATOR_CAP>,
    start_marker: u8,
    header_marker: u8,
    payload_len: usize,
    stats: DecoderStats,
}

impl FrameDecoder {
    /// `payload_len` is clamped to [`MAX_PAYLOAD_LEN`]; config validation
    /// rejects larger values before this point.
    pub fn new(config: &FrameConfig) -> Self {
        Self {
            state: DecoderState::Collecting,
            buf: Vec::new(),
            start_marker: config.start_marker,
            header_marker: config.header_marker,
            payload_len: config.payload_len.min(MAX_PAYLOAD_LEN),
            stats: DecoderStats::default(),
        }
    }

    /// Feed one byte. Returns an event whenever a header boundary closes a
    /// frame, valid or not.
    pub fn push(&mut self, byte: u8) -> Option<FrameEvent> {
        if byte == self.start_marker {
            self.append(byte);
            self.state = DecoderState::AfterStart;
            return None;
        }

        if byte == self.header_marker && self.state == DecoderState::AfterStart {
            self.append(byte);
            return Some(self.close());
        }

        self.append(byte);
        self.state = DecoderState::Collecting;
        None
    }

    /// Feed a slice, invoking `on_event` for every boundary in order.
    pub fn feed(&mut self, data: &[u8], mut on_event: impl FnMut(FrameEvent)) {
        for &byte in data {
            if let Some(event) = self.push(byte) {
                on_event(event);
            }
        }
    }

    /// Drop any partial frame (e.g. after reopening the link).
    pub fn reset(&mut self) {
        self.buf.clear();
        self.state = DecoderState::Collecting;
    }

    pub fn stats(&self) -> DecoderStats {
        self.stats
    }

    /// Expected payload length between two headers.
    pub fn payload_len(&self) -> usize {
        self.payload_len
    }

    // ── Internal ──────────────────────────────────────────────

    fn append(&mut self, byte: u8) {
        if self.buf.push(byte).is_err() {
            debug!(
                "frame accumulator overflow ({} bytes without a header), resetting",
                ACCUMULATOR_CAP
            );
            self.stats.overflow_resets += 1;
            self.buf.clear();
            self.state = DecoderState::Collecting;
            // Capacity is non-zero, the push after a clear cannot fail.
            let _ = self.buf.push(byte);
        }
    }

    /// The accumulator ends with the two marker bytes just received; what
    /// precedes them is the payload of the previous frame.
    fn close(&mut self) -> FrameEvent {
        let collected = self.buf.len().saturating_sub(2);
        let event = if collected == self.payload_len {
            let mut frame = SensorFrame::new();
            // Both pushes and the slice fit: payload_len <= MAX_PAYLOAD_LEN.
            let _ = frame.push(self.start_marker);
            let _ = frame.push(self.header_marker);
            let _ = frame.extend_from_slice(&self.buf[..collected]);
            self.stats.frames += 1;
            FrameEvent::Frame(frame)
        } else {
            debug!(
                "malformed frame: {} payload bytes, expected {}",
                collected, self.payload_len
            );
            self.stats.malformed += 1;
            FrameEvent::Malformed {
                payload_len: collected,
            }
        };
        self.buf.clear();
        self.state = DecoderState::Collecting;
        event
    }
}
