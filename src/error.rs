//! Unified error types for the presence pipeline.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! startup path and the runtime loop's error handling uniform.
//! All variants are `Copy` so they can be passed through the service and the
//! runner without allocation.

use core::fmt;
use std::io;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the crate funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The sensor link failed or timed out.
    Link(LinkError),
    /// A lighting or lifecycle sink rejected an output.
    Sink(SinkError),
    /// Configuration is structurally invalid.
    Config(&'static str),
    /// A resource could not be initialised at startup.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Link(e) => write!(f, "link: {e}"),
            Self::Sink(e) => write!(f, "sink: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Link errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// No byte arrived within the link read timeout.
    Timeout,
    /// The link reached end of stream (replay exhausted, device gone).
    Closed,
    /// Any other I/O failure reported by the device.
    Io(io::ErrorKind),
}

impl LinkError {
    /// Map a `std::io::Error` from a blocking read onto the link taxonomy.
    pub fn from_io(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => Self::Timeout,
            io::ErrorKind::UnexpectedEof | io::ErrorKind::BrokenPipe => Self::Closed,
            kind => Self::Io(kind),
        }
    }
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "read timed out"),
            Self::Closed => write!(f, "link closed"),
            Self::Io(kind) => write!(f, "I/O error ({kind})"),
        }
    }
}

impl From<LinkError> for Error {
    fn from(e: LinkError) -> Self {
        Self::Link(e)
    }
}

// ---------------------------------------------------------------------------
// Sink errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkError {
    /// The outbound queue is full; the item was dropped.
    QueueFull,
    /// The consumer side is gone or unreachable.
    Unreachable,
    /// Transmission failed at the socket / filesystem layer.
    Io(io::ErrorKind),
}

impl SinkError {
    pub fn from_io(err: &io::Error) -> Self {
        Self::Io(err.kind())
    }
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QueueFull => write!(f, "queue full"),
            Self::Unreachable => write!(f, "consumer unreachable"),
            Self::Io(kind) => write!(f, "I/O error ({kind})"),
        }
    }
}

impl From<SinkError> for Error {
    fn from(e: SinkError) -> Self {
        Self::Sink(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
