//! Byte stream → zone → actuation scenarios.

use std::time::Duration;

use oracle_presence::actuation::ActuationSignal;
use oracle_presence::app::events::LifecycleEvent;
use oracle_presence::config::SystemConfig;
use oracle_presence::fsm::Zone;

use crate::mock_io::{FailingSink, Rig, corridor_packet, frame_chunk, packet};

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn rig() -> Rig {
    Rig::new(&SystemConfig::default())
}

#[test]
fn body_at_one_meter_commits_contact_and_starts_once() {
    let mut rig = rig();
    let near = corridor_packet(1.0);

    let first = rig.window_at(ms(0), &near);
    assert_eq!(first.instant, Zone::Contact);
    assert_eq!(first.committed, Zone::Out);
    assert!((first.distance_m.unwrap() - 1.0).abs() < 1e-9);

    let (commit, mut t) = rig.hold(ms(200), &near);
    assert_eq!(commit.committed, Zone::Contact);
    assert!(commit.at >= ms(500));

    for _ in 0..5 {
        rig.window_at(t, &near);
        t += ms(200);
    }
    assert_eq!(rig.events.events, vec![LifecycleEvent::Start]);
}

#[test]
fn stepping_back_to_three_meters_stops() {
    let mut rig = rig();
    let (_, t) = rig.hold(ms(0), &corridor_packet(1.0));
    let (commit, _) = rig.hold(t, &corridor_packet(3.0));
    assert_eq!(commit.committed, Zone::Approach);
    assert_eq!(commit.events.as_slice(), &[LifecycleEvent::Stop]);
    assert_eq!(
        rig.events.events,
        vec![LifecycleEvent::Start, LifecycleEvent::Stop]
    );
}

#[test]
fn a_full_visit_departs_exactly_once() {
    let mut rig = rig();
    let gone = corridor_packet(7.0); // beyond the filter's max distance
    let mut t = ms(0);
    for meters in [3.0, 1.0, 3.0] {
        let (_, next) = rig.hold(t, &corridor_packet(meters));
        t = next;
    }
    let (commit, t) = rig.hold(t, &gone);
    assert_eq!(commit.committed, Zone::Out);
    assert_eq!(commit.distance_m, None);
    assert!(rig.service.zone_state().sequence().is_empty());

    // Lingering outside changes nothing.
    rig.window_at(t, &gone);
    assert_eq!(rig.events.count(LifecycleEvent::Departure), 1);
    assert_eq!(
        rig.events.events,
        vec![
            LifecycleEvent::Engage,
            LifecycleEvent::Start,
            LifecycleEvent::Stop,
            LifecycleEvent::Departure,
        ]
    );
}

#[test]
fn a_short_blip_is_ignored() {
    let mut rig = rig();
    rig.window_at(ms(0), &corridor_packet(1.0));
    rig.window_at(ms(300), &corridor_packet(7.0));
    let report = rig.window_at(ms(600), &corridor_packet(1.0));
    assert_eq!(report.committed, Zone::Out);
    assert!(rig.events.events.is_empty());
}

#[test]
fn a_dropped_byte_costs_one_frame() {
    let mut rig = rig();
    let near = corridor_packet(1.0);
    let good = frame_chunk(&near);
    let mut damaged = good.clone();
    damaged.remove(20);

    // The priming header plus 39 chunks fill the first window.
    let mut stream = Vec::new();
    for i in 0..39 {
        stream.extend_from_slice(if i == 10 { &damaged } else { &good });
    }
    let reports = rig.feed(&stream);
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].points_in_window, 38 * 12);
    let stats = rig.service.decoder_stats();
    assert_eq!(stats.malformed, 2);
    assert_eq!(stats.frames, 38);
}

#[test]
fn a_flipped_byte_fails_the_checksum_only() {
    let mut rig = rig();
    let mut flipped = frame_chunk(&corridor_packet(1.0));
    flipped[8] ^= 0x01; // a distance byte
    let good = frame_chunk(&corridor_packet(1.0));

    let mut stream = flipped.clone();
    for _ in 0..38 {
        stream.extend_from_slice(&good);
    }
    let reports = rig.feed(&stream);
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].points_in_window, 38 * 12);
    assert_eq!(rig.service.decoder_stats().malformed, 1);
    assert_eq!(rig.service.decoder_stats().frames, 39);
}

#[test]
fn nothing_in_the_corridor_idles() {
    let mut rig = rig();
    let behind = packet(265.0, 275.0, 1000, 200);
    let report = rig.window_at(ms(0), &behind);
    assert!(report.points_in_window > 0);
    assert_eq!(report.points_kept, 0);
    assert_eq!(report.distance_m, None);
    assert_eq!(report.actuation, ActuationSignal::IDLE);
    assert_eq!(report.committed, Zone::Out);
    assert_eq!(
        rig.lighting.frames.last().map(|f| f.0),
        Some([255, 255, 0, 135, 0, 0, 0, 0, 0, 0, 0, 255, 255, 255, 255, 0])
    );
}

#[test]
fn low_confidence_returns_are_ignored() {
    let mut rig = rig();
    let faint = packet(85.0, 95.0, 1000, 5);
    let report = rig.window_at(ms(0), &faint);
    assert_eq!(report.points_kept, 0);
    assert_eq!(report.instant, Zone::Out);
}

#[test]
fn actuation_follows_distance() {
    let mut rig = rig();
    let report = rig.window_at(ms(0), &corridor_packet(2.5));
    assert!((report.actuation.uv_percent - 25.0).abs() < 1e-6);
    assert!((report.actuation.rgb_percent - 100.0 / 6.0).abs() < 1e-6);
    assert_eq!(rig.lighting.frames.len(), 1);
    assert_eq!(rig.lighting.frames[0].0[7], 63);
}

#[test]
fn one_lighting_frame_per_pass() {
    let mut rig = rig();
    for i in 0..4 {
        rig.window_at(ms(i * 100), &corridor_packet(4.0));
    }
    assert_eq!(rig.lighting.frames.len(), 4);
    assert_eq!(rig.service.stats().passes, 4);
}

#[test]
fn failing_sinks_do_not_stall_zone_tracking() {
    let mut rig = rig();
    let near = corridor_packet(1.0);
    let chunk = frame_chunk(&near);
    let mut lighting = FailingSink;
    let mut events = FailingSink;
    let mut committed = None;
    for (i, t) in [0u64, 300, 600].into_iter().enumerate() {
        rig.clock.set(ms(t));
        for _ in 0..40 {
            let reports = rig
                .service
                .feed(&chunk, &rig.clock, &mut lighting, &mut events);
            if let Some(r) = reports.last() {
                committed = Some(r.committed);
            }
        }
        assert_eq!(rig.service.stats().passes, i as u64 + 1);
    }
    assert_eq!(committed, Some(Zone::Contact));
    let stats = rig.service.stats();
    assert_eq!(stats.lighting_failures, 3);
    assert_eq!(stats.event_failures, 1);
}
