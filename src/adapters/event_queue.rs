//! Lifecycle events to the show controller's drop directory.
//!
//! [`QueueEventSink`] stamps each event with wall-clock time and pushes it
//! onto the bounded [`LifecycleChannel`] without waiting.
//! [`DropDirForwarder`] runs on its own thread, drains the channel and
//! writes one JSON command file per event:
//!
//! ```text
//! <drop_dir>/cmd_<millis>_<seq>.cmd   {"command":"start","timestamp":1712345678.123}
//! ```
//!
//! Files are written under a temporary name and renamed into place, so a
//! consumer polling the directory only ever sees complete files.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::JoinHandle;

use log::{debug, info, warn};

use crate::app::events::{EventRecord, LifecycleEvent};
use crate::app::ports::EventSink;
use crate::error::SinkError;
use crate::events::{LifecycleChannel, QueueMsg};

use super::time::unix_secs;

// ───────────────────────────────────────────────────────────────
// Producer
// ───────────────────────────────────────────────────────────────

pub struct QueueEventSink {
    channel: Arc<LifecycleChannel>,
    dropped: u64,
}

impl QueueEventSink {
    pub fn new(channel: Arc<LifecycleChannel>) -> Self {
        Self {
            channel,
            dropped: 0,
        }
    }

    /// Events rejected because the queue was full.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Ask the forwarder to exit once it has drained the queue.
    ///
    /// Waits for a free slot, so the forwarder must already be running.
    pub fn close(&self) {
        futures_lite::future::block_on(self.channel.send(QueueMsg::Shutdown));
    }
}

impl EventSink for QueueEventSink {
    fn emit(&mut self, event: LifecycleEvent) -> Result<(), SinkError> {
        let record = EventRecord {
            command: event,
            timestamp: unix_secs(),
        };
        self.channel.try_send(QueueMsg::Event(record)).map_err(|_| {
            self.dropped += 1;
            SinkError::QueueFull
        })
    }
}

// ───────────────────────────────────────────────────────────────
// Consumer
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ForwarderStats {
    pub written: u64,
    pub failed: u64,
}

pub struct DropDirForwarder {
    dir: PathBuf,
    seq: u64,
    stats: ForwarderStats,
}

impl DropDirForwarder {
    /// Creates `dir` if needed.
    pub fn new(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            seq: 0,
            stats: ForwarderStats::default(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn stats(&self) -> ForwarderStats {
        self.stats
    }

    /// Write one command file, returning its final path.
    pub fn write_record(&mut self, record: &EventRecord) -> io::Result<PathBuf> {
        self.seq += 1;
        let millis = (record.timestamp * 1000.0) as u64;
        let name = format!("cmd_{}_{}.cmd", millis, self.seq);
        let tmp = self.dir.join(format!(".{}.tmp", name));
        let path = self.dir.join(name);

        let body = serde_json::to_vec(record).map_err(io::Error::other)?;
        fs::write(&tmp, body)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp, fs::Permissions::from_mode(0o666))?;
        }
        fs::rename(&tmp, &path)?;
        Ok(path)
    }

    /// Handle one queue message. Returns `false` on shutdown.
    pub fn handle(&mut self, msg: QueueMsg) -> bool {
        match msg {
            QueueMsg::Event(record) => {
                match self.write_record(&record) {
                    Ok(path) => {
                        self.stats.written += 1;
                        debug!("forwarded {} to {}", record.command, path.display());
                    }
                    Err(e) => {
                        self.stats.failed += 1;
                        warn!("drop dir write failed for {}: {}", record.command, e);
                    }
                }
                true
            }
            QueueMsg::Shutdown => false,
        }
    }

    /// Write everything currently queued without waiting.
    pub fn drain(&mut self, channel: &LifecycleChannel) {
        while let Ok(msg) = channel.try_receive() {
            if !self.handle(msg) {
                break;
            }
        }
    }

    /// Run on a dedicated thread until [`QueueMsg::Shutdown`] arrives.
    pub fn spawn(mut self, channel: Arc<LifecycleChannel>) -> io::Result<JoinHandle<ForwarderStats>> {
        std::thread::Builder::new()
            .name("event-forwarder".into())
            .spawn(move || {
                info!("event forwarder writing to {}", self.dir.display());
                loop {
                    let msg = futures_lite::future::block_on(channel.receive());
                    if !self.handle(msg) {
                        break;
                    }
                }
                info!(
                    "event forwarder stopped: {} written, {} failed",
                    self.stats.written, self.stats.failed
                );
                self.stats
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{LIFECYCLE_QUEUE_DEPTH, lifecycle_channel};

    fn read_dir(dir: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        files.sort();
        files
    }

    #[test]
    fn record_file_name_and_body() {
        let tmp = tempfile::tempdir().unwrap();
        let mut fwd = DropDirForwarder::new(tmp.path()).unwrap();
        let path = fwd
            .write_record(&EventRecord {
                command: LifecycleEvent::Start,
                timestamp: 1_700_000_000.25,
            })
            .unwrap();
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "cmd_1700000000250_1.cmd"
        );
        let body: serde_json::Value =
            serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(body["command"], "start");
        assert_eq!(body["timestamp"], 1_700_000_000.25);
        // No temporary left behind.
        assert_eq!(read_dir(tmp.path()), vec![path]);
    }

    #[cfg(unix)]
    #[test]
    fn files_are_world_writable() {
        use std::os::unix::fs::PermissionsExt;
        let tmp = tempfile::tempdir().unwrap();
        let mut fwd = DropDirForwarder::new(tmp.path()).unwrap();
        let path = fwd
            .write_record(&EventRecord {
                command: LifecycleEvent::Stop,
                timestamp: 1.0,
            })
            .unwrap();
        let mode = fs::metadata(path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o666);
    }

    #[test]
    fn full_queue_drops_and_counts() {
        let channel = Arc::new(lifecycle_channel());
        let mut sink = QueueEventSink::new(channel.clone());
        for _ in 0..LIFECYCLE_QUEUE_DEPTH {
            sink.emit(LifecycleEvent::Engage).unwrap();
        }
        assert_eq!(sink.emit(LifecycleEvent::Engage), Err(SinkError::QueueFull));
        assert_eq!(sink.dropped(), 1);

        let tmp = tempfile::tempdir().unwrap();
        let mut fwd = DropDirForwarder::new(tmp.path()).unwrap();
        fwd.drain(&channel);
        assert_eq!(fwd.stats().written, LIFECYCLE_QUEUE_DEPTH as u64);
        assert_eq!(read_dir(tmp.path()).len(), LIFECYCLE_QUEUE_DEPTH);
    }

    #[test]
    fn forwarder_thread_writes_then_stops() {
        let channel = Arc::new(lifecycle_channel());
        let mut sink = QueueEventSink::new(channel.clone());
        let tmp = tempfile::tempdir().unwrap();
        let handle = DropDirForwarder::new(tmp.path())
            .unwrap()
            .spawn(channel.clone())
            .unwrap();

        sink.emit(LifecycleEvent::Start).unwrap();
        sink.emit(LifecycleEvent::Departure).unwrap();
        sink.close();

        let stats = handle.join().unwrap();
        assert_eq!(stats.written, 2);
        let files = read_dir(tmp.path());
        assert_eq!(files.len(), 2);
        let commands: Vec<String> = files
            .iter()
            .map(|p| {
                let v: serde_json::Value = serde_json::from_slice(&fs::read(p).unwrap()).unwrap();
                v["command"].as_str().unwrap().to_owned()
            })
            .collect();
        assert!(commands.contains(&"start".to_owned()));
        assert!(commands.contains(&"departure".to_owned()));
    }

    #[test]
    fn close_on_a_full_queue_still_stops_the_forwarder() {
        let channel = Arc::new(lifecycle_channel());
        let mut sink = QueueEventSink::new(channel.clone());
        for _ in 0..LIFECYCLE_QUEUE_DEPTH {
            sink.emit(LifecycleEvent::Engage).unwrap();
        }
        assert_eq!(sink.emit(LifecycleEvent::Engage), Err(SinkError::QueueFull));

        let tmp = tempfile::tempdir().unwrap();
        let handle = DropDirForwarder::new(tmp.path())
            .unwrap()
            .spawn(channel.clone())
            .unwrap();
        sink.close();

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while !handle.is_finished() {
            assert!(std::time::Instant::now() < deadline, "forwarder still running");
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        let stats = handle.join().unwrap();
        assert_eq!(stats.written, LIFECYCLE_QUEUE_DEPTH as u64);
    }
}
