//! Recorded-capture link.
//!
//! Streams raw sensor bytes from any reader (normally a capture file) so
//! the full pipeline can run offline. End of input closes the link.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

use crate::app::ports::SerialLink;
use crate::error::LinkError;

pub struct ReplayLink<R> {
    source: R,
    exhausted: bool,
}

impl ReplayLink<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }
}

impl<R: Read> ReplayLink<R> {
    pub fn new(source: R) -> Self {
        Self {
            source,
            exhausted: false,
        }
    }
}

impl<R: Read> SerialLink for ReplayLink<R> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, LinkError> {
        if self.exhausted {
            return Err(LinkError::Closed);
        }
        loop {
            match self.source.read(buf) {
                Ok(0) if !buf.is_empty() => {
                    self.exhausted = true;
                    return Err(LinkError::Closed);
                }
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(LinkError::from_io(&e)),
            }
        }
    }
}
