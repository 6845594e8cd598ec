//! Integration tests for the sample-driven side of a session.

use pacekeeper_core::{
    AnnouncementSettings, AutoPauseSettings, DistanceUnit, OutputEvent, RecordingSink, Sample,
    SessionReactionEngine, SessionSettings, VibrationPattern, Zone, ZoneAlertSettings,
};

fn settings() -> SessionSettings {
    SessionSettings {
        auto_pause: AutoPauseSettings {
            enabled: true,
            speed_threshold_mps: 1.0,
            pause_delay_ms: 3_000,
            resume_delay_ms: 2_000,
        },
        zone_alert: ZoneAlertSettings {
            enabled: true,
            target_zone: Zone::Z3,
            alert_on_exit: true,
            alert_on_entry: false,
            cooldown_ms: 10_000,
            max_hr: 200,
        },
        announcements: AnnouncementSettings {
            enabled: true,
            distance_unit: DistanceUnit::Kilometers,
            announce_distance: true,
            time_interval_ms: 0,
            include_heart_rate: false,
        },
        ..SessionSettings::default()
    }
}

fn count(events: &[OutputEvent], wanted: &OutputEvent) -> usize {
    events.iter().filter(|e| *e == wanted).count()
}

#[test]
fn test_pause_debounce_through_engine() {
    let mut engine = SessionReactionEngine::new(settings());
    engine.start(0, 0.0);

    let mut all = Vec::new();
    for ts in [0, 1_000, 2_000, 2_999] {
        all.extend(engine.on_sample(&Sample::new(ts, 150, 0.2, 0.0)));
    }
    assert_eq!(count(&all, &OutputEvent::PauseClock), 0);

    all.extend(engine.on_sample(&Sample::new(3_000, 150, 0.2, 0.0)));
    all.extend(engine.on_sample(&Sample::new(4_000, 150, 0.2, 0.0)));
    assert_eq!(count(&all, &OutputEvent::PauseClock), 1);
    assert_eq!(engine.current_pause_ms(4_000), 1_000);
}

#[test]
fn test_alert_cooldown_through_engine() {
    let exit = OutputEvent::vibrate(VibrationPattern::ZoneExit);

    let run = |second_exit_at: i64| {
        let mut engine = SessionReactionEngine::new(settings());
        engine.start(0, 0.0);
        let mut all = Vec::new();
        all.extend(engine.on_sample(&Sample::new(0, 150, 3.0, 0.0)));
        all.extend(engine.on_sample(&Sample::new(1_000, 170, 3.0, 3.0)));
        all.extend(engine.on_sample(&Sample::new(2_000, 150, 3.0, 6.0)));
        all.extend(engine.on_sample(&Sample::new(1_000 + second_exit_at, 170, 3.0, 9.0)));
        all
    };

    assert_eq!(count(&run(5_000), &exit), 1);
    assert_eq!(count(&run(11_000), &exit), 2);
}

#[test]
fn test_lap_numbering_through_engine() {
    let mut engine = SessionReactionEngine::new(settings());
    engine.start(0, 0.0);

    for lap in 1..=3i64 {
        for s in 0..60i64 {
            let ts = (lap - 1) * 60_000 + s * 1_000;
            let distance = ts as f64 * 0.003;
            engine.on_sample(&Sample::new(ts, 150, 3.0, distance));
        }
        engine.mark_lap(lap * 60_000);
    }

    let numbers: Vec<u32> = engine.laps().iter().map(|l| l.number).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
    assert_eq!(engine.lap_segmenter().current_lap_number(), 4);
}

#[test]
fn test_full_run_with_stop_and_sink() {
    let mut engine = SessionReactionEngine::new(settings());
    let mut sink = RecordingSink::default();
    engine.start(0, 0.0);

    // 1.2 km at 4 m/s, a 20 s stop, then another 1 km.
    let mut ts = 0;
    let mut distance = 0.0;
    while distance < 1_200.0 {
        let events = engine.on_sample(&Sample::new(ts, 150, 4.0, distance));
        SessionReactionEngine::dispatch(&events, &mut sink);
        ts += 1_000;
        distance += 4.0;
    }
    for _ in 0..20 {
        let events = engine.on_sample(&Sample::new(ts, 120, 0.0, distance));
        SessionReactionEngine::dispatch(&events, &mut sink);
        ts += 1_000;
    }
    while distance < 2_200.0 {
        let events = engine.on_sample(&Sample::new(ts, 150, 4.0, distance));
        SessionReactionEngine::dispatch(&events, &mut sink);
        ts += 1_000;
        distance += 4.0;
    }

    let speaks: Vec<&OutputEvent> = sink
        .events
        .iter()
        .filter(|e| matches!(e, OutputEvent::Speak { .. }))
        .collect();
    assert_eq!(speaks.len(), 2, "one announcement per kilometre");
    assert_eq!(count(&sink.events, &OutputEvent::PauseClock), 1);
    assert_eq!(count(&sink.events, &OutputEvent::ResumeClock), 1);

    let summary = engine.finish(ts).unwrap();
    assert_eq!(summary.pause_count, 1);
    assert!(summary.active_elapsed_ms < summary.total_elapsed_ms);
    // HR dropped to Z2 during the stop; only the exit alerts, entry is off.
    assert_eq!(summary.zone_alert_count, 1);
}

#[test]
fn test_settings_changes_keep_history() {
    let mut engine = SessionReactionEngine::new(settings());
    engine.start(0, 0.0);
    engine.on_sample(&Sample::new(0, 150, 3.0, 0.0));
    engine.on_sample(&Sample::new(60_000, 150, 3.0, 180.0));
    engine.mark_lap(60_000);
    let before = engine.laps().to_vec();

    let mut zone = settings().zone_alert;
    zone.target_zone = Zone::Z4;
    zone.max_hr = 170;
    engine.update_zone_alert(zone);
    engine.update_announcements(AnnouncementSettings::default());

    assert_eq!(engine.laps(), before.as_slice());
    assert_eq!(engine.zone_alert_state().alert_count, 0);
}
