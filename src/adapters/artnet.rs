//! Art-Net lighting sink.
//!
//! Wraps each intensity buffer in an `ArtDmx` packet and sends it over a
//! non-blocking UDP socket. Most DMX nodes (and OLA) accept Art-Net input.
//!
//! | Offset | Size | Field                          |
//! |--------|------|--------------------------------|
//! | 0      | 8    | `"Art-Net\0"`                  |
//! | 8      | 2    | opcode `0x5000`, little-endian |
//! | 10     | 2    | protocol version 14, big-endian|
//! | 12     | 1    | sequence (1–255, 0 = off)      |
//! | 13     | 1    | physical port                  |
//! | 14     | 1    | SubUni (low 8 bits of universe)|
//! | 15     | 1    | Net (bits 8–14)                |
//! | 16     | 2    | data length, big-endian, even  |
//! | 18     | n    | slot data                      |

use std::net::{ToSocketAddrs, UdpSocket};

use log::{debug, info};

use crate::actuation::{DMX_SLOTS, DmxFrame};
use crate::app::ports::LightingSink;
use crate::config::LightingConfig;
use crate::error::SinkError;

const ART_NET_ID: &[u8; 8] = b"Art-Net\0";
const OP_DMX: u16 = 0x5000;
const PROTOCOL_VERSION: u16 = 14;
const HEADER_LEN: usize = 18;

/// Full ArtDmx packet for the 16-slot buffer.
pub const ARTDMX_LEN: usize = HEADER_LEN + DMX_SLOTS;

/// Encode one `ArtDmx` packet.
pub fn artdmx_packet(sequence: u8, universe: u16, frame: &DmxFrame) -> [u8; ARTDMX_LEN] {
    let mut out = [0u8; ARTDMX_LEN];
    out[..8].copy_from_slice(ART_NET_ID);
    out[8..10].copy_from_slice(&OP_DMX.to_le_bytes());
    out[10..12].copy_from_slice(&PROTOCOL_VERSION.to_be_bytes());
    out[12] = sequence;
    out[13] = 0;
    out[14] = (universe & 0xFF) as u8;
    out[15] = ((universe >> 8) & 0x7F) as u8;
    out[16..18].copy_from_slice(&(DMX_SLOTS as u16).to_be_bytes());
    out[HEADER_LEN..].copy_from_slice(frame.as_bytes());
    out
}

pub struct ArtNetSink {
    socket: UdpSocket,
    universe: u16,
    sequence: u8,
}

impl ArtNetSink {
    /// Bind an ephemeral local port and aim it at the configured node.
    pub fn connect(config: &LightingConfig) -> std::io::Result<Self> {
        let target = config
            .target
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::InvalidInput, "no address"))?;
        let bind = if target.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = UdpSocket::bind(bind)?;
        socket.set_nonblocking(true)?;
        socket.connect(target)?;
        info!("Art-Net sink: {} universe {}", target, config.universe);
        Ok(Self {
            socket,
            universe: config.universe,
            sequence: 0,
        })
    }

    fn next_sequence(&mut self) -> u8 {
        self.sequence = if self.sequence == u8::MAX { 1 } else { self.sequence + 1 };
        self.sequence
    }
}

impl LightingSink for ArtNetSink {
    fn send(&mut self, frame: &DmxFrame) -> Result<(), SinkError> {
        let seq = self.next_sequence();
        let packet = artdmx_packet(seq, self.universe, frame);
        match self.socket.send(&packet) {
            Ok(_) => {
                debug!("ArtDmx seq {} sent", seq);
                Ok(())
            }
            Err(e) => Err(SinkError::from_io(&e)),
        }
    }
}
