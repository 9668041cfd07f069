//! LD06 packet decoding.
//!
//! A packet is 47 bytes, little-endian:
//!
//! | Offset | Size | Field                                   |
//! |--------|------|-----------------------------------------|
//! | 0      | 1    | start marker `0x54`                     |
//! | 1      | 1    | header marker `0x2C` (12 points)        |
//! | 2      | 2    | rotation speed, degrees/s               |
//! | 4      | 2    | start angle, 0.01°                      |
//! | 6      | 36   | 12 × (distance mm u16, confidence u8)   |
//! | 42     | 2    | end angle, 0.01°                        |
//! | 44     | 2    | timestamp, ms (wraps at 30000)          |
//! | 46     | 1    | CRC-8 over bytes 0..46                  |
//!
//! Point angles are interpolated linearly between the start and end angle.

use core::f64::consts::PI;

use super::Point;

pub const POINTS_PER_PACKET: usize = 12;
pub const PACKET_LEN: usize = 47;
pub const PACKET_PAYLOAD_LEN: usize = PACKET_LEN - 2;

const START_MARKER: u8 = 0x54;
const HEADER_MARKER: u8 = 0x2C;
const SAMPLES_OFFSET: usize = 6;
const SAMPLE_LEN: usize = 3;
const END_ANGLE_OFFSET: usize = SAMPLES_OFFSET + POINTS_PER_PACKET * SAMPLE_LEN;

/// Millimetres per raw distance unit.
const MM_PER_UNIT: f64 = 100.0;

// ── CRC-8 (poly 0x4D, init 0, MSB first) ─────────────────────

const CRC_TABLE: [u8; 256] = build_crc_table(0x4D);

const fn build_crc_table(poly: u8) -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u8;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ poly
            } else {
                crc << 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

pub fn crc8(data: &[u8]) -> u8 {
    data.iter()
        .fold(0u8, |crc, &b| CRC_TABLE[(crc ^ b) as usize])
}

// ── Packet ────────────────────────────────────────────────────

/// One raw distance/confidence sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sample {
    pub distance_mm: u16,
    pub confidence: u8,
}

/// A parsed LD06 packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub speed_dps: u16,
    pub start_angle_cdeg: u16,
    pub end_angle_cdeg: u16,
    pub timestamp_ms: u16,
    pub samples: [Sample; POINTS_PER_PACKET],
}

/// Why a frame could not be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketError {
    Length(usize),
    Markers,
    Checksum { expected: u8, actual: u8 },
}

impl core::fmt::Display for PacketError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Length(len) => write!(f, "length {} != {}", len, PACKET_LEN),
            Self::Markers => write!(f, "bad markers"),
            Self::Checksum { expected, actual } => {
                write!(f, "crc 0x{:02x} != 0x{:02x}", actual, expected)
            }
        }
    }
}

fn u16_at(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

impl Packet {
    pub fn parse(frame: &[u8], verify_checksum: bool) -> Result<Self, PacketError> {
        if frame.len() != PACKET_LEN {
            return Err(PacketError::Length(frame.len()));
        }
        if frame[0] != START_MARKER || frame[1] != HEADER_MARKER {
            return Err(PacketError::Markers);
        }
        if verify_checksum {
            let expected = crc8(&frame[..PACKET_LEN - 1]);
            let actual = frame[PACKET_LEN - 1];
            if expected != actual {
                return Err(PacketError::Checksum { expected, actual });
            }
        }

        let mut samples = [Sample::default(); POINTS_PER_PACKET];
        for (i, sample) in samples.iter_mut().enumerate() {
            let at = SAMPLES_OFFSET + i * SAMPLE_LEN;
            *sample = Sample {
                distance_mm: u16_at(frame, at),
                confidence: frame[at + 2],
            };
        }

        Ok(Self {
            speed_dps: u16_at(frame, 2),
            start_angle_cdeg: u16_at(frame, 4),
            end_angle_cdeg: u16_at(frame, END_ANGLE_OFFSET),
            timestamp_ms: u16_at(frame, END_ANGLE_OFFSET + 2),
            samples,
        })
    }

    /// Serialise back to wire format with a fresh CRC.
    pub fn to_bytes(&self) -> [u8; PACKET_LEN] {
        let mut out = [0u8; PACKET_LEN];
        out[0] = START_MARKER;
        out[1] = HEADER_MARKER;
        out[2..4].copy_from_slice(&self.speed_dps.to_le_bytes());
        out[4..6].copy_from_slice(&self.start_angle_cdeg.to_le_bytes());
        for (i, s) in self.samples.iter().enumerate() {
            let at = SAMPLES_OFFSET + i * SAMPLE_LEN;
            out[at..at + 2].copy_from_slice(&s.distance_mm.to_le_bytes());
            out[at + 2] = s.confidence;
        }
        out[END_ANGLE_OFFSET..END_ANGLE_OFFSET + 2]
            .copy_from_slice(&self.end_angle_cdeg.to_le_bytes());
        out[END_ANGLE_OFFSET + 2..END_ANGLE_OFFSET + 4]
            .copy_from_slice(&self.timestamp_ms.to_le_bytes());
        out[PACKET_LEN - 1] = crc8(&out[..PACKET_LEN - 1]);
        out
    }

    /// Angle of sample `index` in degrees, in `[0, 360)`.
    pub fn sample_angle_deg(&self, index: usize) -> f64 {
        let start = f64::from(self.start_angle_cdeg) / 100.0;
        let end = f64::from(self.end_angle_cdeg) / 100.0;
        let span = if end >= start { end - start } else { end + 360.0 - start };
        let step = span / (POINTS_PER_PACKET - 1) as f64;
        (start + step * index as f64).rem_euclid(360.0)
    }
}

// ── Point batch ───────────────────────────────────────────────

/// Parallel angle / distance / confidence sequences for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointBatch {
    pub angles: Vec<f64>,
    pub distances: Vec<f64>,
    pub confidences: Vec<i32>,
}

impl PointBatch {
    pub fn len(&self) -> usize {
        self.angles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.angles.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.angles
            .iter()
            .zip(&self.distances)
            .zip(&self.confidences)
            .map(|((&a, &d), &c)| Point::new(a, d, c))
    }
}

impl From<&Packet> for PointBatch {
    fn from(packet: &Packet) -> Self {
        let mut batch = PointBatch {
            angles: Vec::with_capacity(POINTS_PER_PACKET),
            distances: Vec::with_capacity(POINTS_PER_PACKET),
            confidences: Vec::with_capacity(POINTS_PER_PACKET),
        };
        for (i, s) in packet.samples.iter().enumerate() {
            batch.angles.push(packet.sample_angle_deg(i) * PI / 180.0);
            batch.distances.push(f64::from(s.distance_mm) / MM_PER_UNIT);
            batch.confidences.push(i32::from(s.confidence));
        }
        batch
    }
}

/// Point decoder handed every length-valid frame.
#[derive(Debug, Clone, Copy)]
pub struct PacketDecoder {
    verify_checksum: bool,
}

impl PacketDecoder {
    pub fn new(verify_checksum: bool) -> Self {
        Self { verify_checksum }
    }

    /// Never fails: an unparsable frame yields an empty batch.
    pub fn decode(&self, frame: &[u8]) -> PointBatch {
        match Packet::parse(frame, self.verify_checksum) {
            Ok(packet) => PointBatch::from(&packet),
            Err(e) => {
                log::debug!("packet rejected: {}", e);
                PointBatch::default()
            }
        }
    }
}
