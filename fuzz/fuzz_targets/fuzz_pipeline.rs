//! Fuzz target: full `PresenceService` over an arbitrary byte stream.
//!
//! cargo fuzz run fuzz_pipeline

#![no_main]

use core::time::Duration;

use libfuzzer_sys::fuzz_target;
use oracle_presence::actuation::DmxFrame;
use oracle_presence::app::events::LifecycleEvent;
use oracle_presence::app::ports::{Clock, EventSink, LightingSink};
use oracle_presence::app::service::PresenceService;
use oracle_presence::config::{SystemConfig, WindowConfig};
use oracle_presence::error::SinkError;

struct Tick(core::cell::Cell<Duration>);

impl Clock for Tick {
    fn now(&self) -> Duration {
        let t = self.0.get();
        self.0.set(t + Duration::from_millis(250));
        t
    }
}

struct Null;

impl LightingSink for Null {
    fn send(&mut self, _: &DmxFrame) -> Result<(), SinkError> {
        Ok(())
    }
}

impl EventSink for Null {
    fn emit(&mut self, _: LifecycleEvent) -> Result<(), SinkError> {
        Ok(())
    }
}

fuzz_target!(|data: &[u8]| {
    let config = SystemConfig {
        window: WindowConfig { frames_per_window: 1 },
        ..SystemConfig::default()
    };
    let mut service = PresenceService::new(&config);
    let clock = Tick(core::cell::Cell::new(Duration::ZERO));
    for report in service.feed(data, &clock, &mut Null, &mut Null) {
        assert!((0.0..=100.0).contains(&report.actuation.rgb_percent));
        assert!((0.0..=100.0).contains(&report.actuation.uv_percent));
    }
});
