//! Oracle presence — main entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  SerialPortLink   ArtNetSink      QueueEventSink  MonotonicClock│
//! │  ReplayLink       LogLightingSink LogEventSink    JsonConfigFile│
//! │  (SerialLink)     (LightingSink)  (EventSink)                  │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            PresenceService (pure logic)                │    │
//! │  │  decode · window · filter · cluster · zone · actuate   │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  DropDirForwarder thread (drains the lifecycle queue)          │
//! └────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info, warn};

use oracle_presence::adapters::artnet::ArtNetSink;
use oracle_presence::adapters::config_file::JsonConfigFile;
use oracle_presence::adapters::event_queue::{DropDirForwarder, QueueEventSink};
use oracle_presence::adapters::log_sink::{LogEventSink, LogLightingSink};
use oracle_presence::adapters::replay::ReplayLink;
use oracle_presence::adapters::serial::SerialPortLink;
use oracle_presence::adapters::time::MonotonicClock;
use oracle_presence::app::ports::{ConfigPort, EventSink, LightingSink, SerialLink};
use oracle_presence::app::runner::{self, RunSummary};
use oracle_presence::app::service::PresenceService;
use oracle_presence::config::{EventBackend, LightingBackend, SystemConfig};
use oracle_presence::error::Error;
use oracle_presence::events::lifecycle_channel;

/// LIDAR presence detection driving the installation's lighting and show
/// controller.
#[derive(Parser, Debug)]
#[command(name = "oracle-presence", version, about)]
struct Args {
    /// JSON configuration file; missing means defaults.
    #[arg(long, short, default_value = "/etc/oracle/presence.json")]
    config: PathBuf,

    /// Serial device, overriding `serial.port`.
    #[arg(long, short)]
    port: Option<String>,

    /// Replay a recorded capture instead of opening the serial device.
    #[arg(long, conflicts_with = "port")]
    replay: Option<PathBuf>,

    /// Log lighting buffers and lifecycle events instead of sending them.
    #[arg(long)]
    dry_run: bool,

    /// Log filter (`error`, `warn`, `info`, `debug`, `trace`); `RUST_LOG` wins.
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Write the effective configuration to `--config` and exit.
    #[arg(long)]
    write_default_config: bool,
}

fn main() {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&args.log_level))
        .init();

    if let Err(e) = try_main(&args) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn try_main(args: &Args) -> Result<()> {
    info!("oracle-presence v{}", env!("CARGO_PKG_VERSION"));

    // ── 1. Configuration ─────────────────────────────────────
    let store = JsonConfigFile::new(&args.config);
    if args.write_default_config {
        store
            .save(&SystemConfig::default())
            .with_context(|| format!("writing {}", args.config.display()))?;
        return Ok(());
    }
    let mut config = store
        .load()
        .with_context(|| format!("loading {}", args.config.display()))?;
    if let Some(port) = &args.port {
        config.serial.port.clone_from(port);
    }
    config
        .validate()
        .map_err(Error::Config)
        .context("invalid configuration")?;

    // ── 2. Shutdown flag ─────────────────────────────────────
    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = stop.clone();
        ctrlc::set_handler(move || stop.store(true, Ordering::Relaxed))
            .context("installing signal handler")?;
    }

    // ── 3. Sensor link ───────────────────────────────────────
    let mut link: Box<dyn SerialLink> = match &args.replay {
        Some(path) => Box::new(
            ReplayLink::open(path).with_context(|| format!("opening replay {}", path.display()))?,
        ),
        None => Box::new(
            SerialPortLink::open(&config.serial)
                .with_context(|| format!("opening serial port {}", config.serial.port))?,
        ),
    };

    // ── 4. Output sinks ──────────────────────────────────────
    let mut lighting: Box<dyn LightingSink> = match (args.dry_run, config.lighting.backend) {
        (false, LightingBackend::ArtNet) => Box::new(
            ArtNetSink::connect(&config.lighting)
                .with_context(|| format!("connecting Art-Net sink {}", config.lighting.target))?,
        ),
        _ => Box::new(LogLightingSink::new()),
    };

    let channel = Arc::new(lifecycle_channel());
    let mut forwarder = None;
    let mut queue = None;
    let mut log_events = LogEventSink::new();
    if !args.dry_run && config.events.backend == EventBackend::DropDir {
        let fwd = DropDirForwarder::new(&config.events.drop_dir)
            .with_context(|| format!("creating drop dir {}", config.events.drop_dir))?;
        forwarder = Some(fwd.spawn(channel.clone()).context("spawning event forwarder")?);
        queue = Some(QueueEventSink::new(channel.clone()));
    }

    // ── 5. Run ───────────────────────────────────────────────
    let mut service = PresenceService::new(&config);
    let clock = MonotonicClock::new();
    let mut events: &mut dyn EventSink = match queue.as_mut() {
        Some(q) => q,
        None => &mut log_events,
    };
    let summary = runner::run(
        &mut service,
        &mut link,
        &clock,
        &mut lighting,
        &mut events,
        &stop,
        &config.runtime,
    );
    drop(link);
    log_summary(&summary);

    // ── 6. Drain the lifecycle queue ─────────────────────────
    if let (Some(q), Some(handle)) = (&queue, &forwarder) {
        if q.dropped() > 0 {
            warn!("{} lifecycle events dropped on a full queue", q.dropped());
        }
        // A dead forwarder would never free a slot.
        if !handle.is_finished() {
            q.close();
        }
    }
    if let Some(handle) = forwarder {
        match handle.join() {
            Ok(stats) => info!("forwarded {} events ({} failed)", stats.written, stats.failed),
            Err(_) => warn!("event forwarder panicked"),
        }
    }
    Ok(())
}

fn log_summary(s: &RunSummary) {
    info!(
        "run ended ({:?}): {} bytes, {} passes, {} frames, {} malformed, {} overflow resets, \
         {} timeouts, {} I/O errors, {} events, {} sink failures",
        s.end,
        s.bytes_read,
        s.service.passes,
        s.decoder.frames,
        s.decoder.malformed,
        s.decoder.overflow_resets,
        s.timeouts,
        s.io_errors,
        s.service.events_emitted,
        s.service.lighting_failures + s.service.event_failures,
    );
}
