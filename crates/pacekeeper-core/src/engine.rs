//! Session reaction engine.
//!
//! Owns one instance of every controller for the lifetime of a session and
//! fans the two external triggers out to them:
//!
//! - a [`Sample`] goes to auto-pause, zone alerts, lap accumulation,
//!   time-in-zone and announcements, in that order;
//! - a 1 Hz tick goes to the interval scheduler.
//!
//! Each call runs to completion and returns the emitted events in order.
//! Forwarding them to a device is the caller's job, either directly or via
//! [`SessionReactionEngine::dispatch`].

use serde::{Deserialize, Serialize};

use crate::announce::{AnnouncementPolicy, AnnouncementSettings};
use crate::auto_pause::{AutoPauseController, AutoPauseSettings, AutoPauseState};
use crate::config::Config;
use crate::error::SinkError;
use crate::events::{OutputEvent, VibrationPattern};
use crate::interval::{IntervalScheduler, IntervalState, IntervalWorkout};
use crate::laps::{Lap, LapSegmenter};
use crate::sample::Sample;
use crate::zone_alert::{ZoneAlertController, ZoneAlertSettings, ZoneAlertState};
use crate::zones::{ZoneDistribution, ZoneTimeTracker};

/// Receiver for output events (haptic driver, speech queue, ...).
///
/// Implementations must hand the event off without blocking. Queuing and
/// cancellation policy belong to the sink.
pub trait OutputSink {
    /// Deliver one event.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink could not accept the event. The engine
    /// logs it and does not retry.
    fn deliver(&mut self, event: &OutputEvent) -> Result<(), SinkError>;
}

/// Sink that keeps every delivered event in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub events: Vec<OutputEvent>,
}

impl OutputSink for RecordingSink {
    fn deliver(&mut self, event: &OutputEvent) -> Result<(), SinkError> {
        self.events.push(event.clone());
        Ok(())
    }
}

/// Settings for every controller the engine owns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSettings {
    pub auto_pause: AutoPauseSettings,
    pub zone_alert: ZoneAlertSettings,
    pub announcements: AnnouncementSettings,
    pub workout: IntervalWorkout,
}

impl From<&Config> for SessionSettings {
    fn from(cfg: &Config) -> Self {
        Self {
            auto_pause: cfg.auto_pause.clone(),
            zone_alert: cfg.zone_alert.clone(),
            announcements: cfg.announcements.clone(),
            workout: cfg.workout.clone(),
        }
    }
}

/// Totals for a finished session, handed to storage collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub started_at_ms: i64,
    pub finished_at_ms: i64,
    pub total_elapsed_ms: i64,
    pub active_elapsed_ms: i64,
    pub distance_meters: f64,
    pub pause_count: u32,
    pub zone_alert_count: u32,
    pub laps: Vec<Lap>,
    pub zone_distribution: ZoneDistribution,
    pub completed_reps: u32,
}

#[derive(Debug, Clone, Default)]
pub struct SessionReactionEngine {
    auto_pause: AutoPauseController,
    zone_alert: ZoneAlertController,
    laps: LapSegmenter,
    intervals: IntervalScheduler,
    announcements: AnnouncementPolicy,
    zone_time: ZoneTimeTracker,
    started_at_ms: Option<i64>,
    last_sample: Option<Sample>,
}

impl SessionReactionEngine {
    pub fn new(settings: SessionSettings) -> Self {
        Self {
            auto_pause: AutoPauseController::new(settings.auto_pause),
            zone_alert: ZoneAlertController::new(settings.zone_alert),
            laps: LapSegmenter::new(),
            intervals: IntervalScheduler::new(settings.workout),
            announcements: AnnouncementPolicy::new(settings.announcements),
            zone_time: ZoneTimeTracker::new(),
            started_at_ms: None,
            last_sample: None,
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(SessionSettings::from(cfg))
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn is_started(&self) -> bool {
        self.started_at_ms.is_some()
    }

    pub fn started_at_ms(&self) -> Option<i64> {
        self.started_at_ms
    }

    pub fn last_sample(&self) -> Option<&Sample> {
        self.last_sample.as_ref()
    }

    pub fn total_elapsed_ms(&self, now_ms: i64) -> i64 {
        self.started_at_ms.map_or(0, |start| (now_ms - start).max(0))
    }

    pub fn active_elapsed_ms(&self, now_ms: i64) -> i64 {
        self.auto_pause
            .active_elapsed_ms(self.total_elapsed_ms(now_ms), now_ms)
    }

    pub fn auto_pause_state(&self) -> &AutoPauseState {
        self.auto_pause.state()
    }

    pub fn current_pause_ms(&self, now_ms: i64) -> i64 {
        self.auto_pause.current_pause_ms(now_ms)
    }

    pub fn zone_alert_state(&self) -> &ZoneAlertState {
        self.zone_alert.state()
    }

    pub fn interval_state(&self) -> &IntervalState {
        self.intervals.state()
    }

    pub fn intervals(&self) -> &IntervalScheduler {
        &self.intervals
    }

    pub fn laps(&self) -> &[Lap] {
        self.laps.laps()
    }

    pub fn lap_segmenter(&self) -> &LapSegmenter {
        &self.laps
    }

    pub fn zone_distribution(&self) -> &ZoneDistribution {
        self.zone_time.distribution()
    }

    // ── Session lifecycle ────────────────────────────────────────────

    /// Begin a session. Restarting discards all previous session state.
    pub fn start(&mut self, now_ms: i64, distance_meters: f64) {
        self.reset_controllers();
        self.started_at_ms = Some(now_ms);
        self.laps.start(now_ms, distance_meters);
        tracing::info!(at_ms = now_ms, "session started");
    }

    /// Close the session and return its totals. The engine is idle afterwards.
    pub fn finish(&mut self, now_ms: i64) -> Option<SessionSummary> {
        let started_at_ms = self.started_at_ms?;
        let summary = SessionSummary {
            started_at_ms,
            finished_at_ms: now_ms,
            total_elapsed_ms: self.total_elapsed_ms(now_ms),
            active_elapsed_ms: self.active_elapsed_ms(now_ms),
            distance_meters: self.last_sample.map_or(0.0, |s| s.distance_meters),
            pause_count: self.auto_pause.state().pause_count,
            zone_alert_count: self.zone_alert.state().alert_count,
            laps: self.laps.laps().to_vec(),
            zone_distribution: self.zone_time.distribution().clone(),
            completed_reps: self.intervals.state().completed_reps,
        };
        tracing::info!(
            total_ms = summary.total_elapsed_ms,
            active_ms = summary.active_elapsed_ms,
            laps = summary.laps.len(),
            "session finished"
        );
        self.reset_controllers();
        Some(summary)
    }

    // ── Triggers ─────────────────────────────────────────────────────

    pub fn on_sample(&mut self, sample: &Sample) -> Vec<OutputEvent> {
        if !self.is_started() {
            tracing::debug!(at_ms = sample.timestamp_ms, "sample before session start ignored");
            return Vec::new();
        }

        let mut events = Vec::new();
        events.extend(self.auto_pause.on_sample(sample));
        events.extend(self.zone_alert.on_sample(sample));

        self.laps.add_heart_rate_sample(sample.heart_rate);
        self.laps.add_speed_sample(sample.speed_mps);
        self.zone_time.record(sample, self.zone_alert.settings().max_hr);

        let active = self.active_elapsed_ms(sample.timestamp_ms);
        events.extend(
            self.announcements
                .evaluate(sample.distance_meters, active, sample.heart_rate),
        );

        self.last_sample = Some(*sample);
        events
    }

    pub fn on_tick(&mut self, _now_ms: i64) -> Vec<OutputEvent> {
        self.intervals.tick()
    }

    // ── Operator actions ─────────────────────────────────────────────

    /// Close the current lap using the latest sample's distance and HR.
    pub fn mark_lap(&mut self, now_ms: i64) -> Vec<OutputEvent> {
        let (distance, hr) = self
            .last_sample
            .map_or((0.0, 0), |s| (s.distance_meters, s.heart_rate));
        match self.laps.mark_lap(now_ms, distance, hr) {
            Some(lap) => vec![
                OutputEvent::LapClosed { lap },
                OutputEvent::vibrate(VibrationPattern::Lap),
            ],
            None => Vec::new(),
        }
    }

    pub fn start_intervals(&mut self) -> Vec<OutputEvent> {
        self.intervals.start()
    }

    pub fn toggle_interval_pause(&mut self) -> bool {
        self.intervals.toggle_pause()
    }

    pub fn skip_interval_step(&mut self) -> Vec<OutputEvent> {
        self.intervals.skip()
    }

    pub fn stop_intervals(&mut self) {
        self.intervals.stop();
    }

    pub fn set_workout(&mut self, workout: IntervalWorkout) {
        self.intervals.set_template(workout);
    }

    // ── Settings ─────────────────────────────────────────────────────

    pub fn update_auto_pause(&mut self, settings: AutoPauseSettings, now_ms: i64) -> Vec<OutputEvent> {
        self.auto_pause.update_settings(settings, now_ms).into_iter().collect()
    }

    pub fn update_zone_alert(&mut self, settings: ZoneAlertSettings) {
        self.zone_alert.update_settings(settings);
    }

    pub fn update_announcements(&mut self, settings: AnnouncementSettings) {
        self.announcements.update_settings(settings);
    }

    // ── Output ───────────────────────────────────────────────────────

    /// Hand events to a sink, fire-and-forget.
    ///
    /// A failed delivery is logged and dropped. Returns how many events the
    /// sink accepted.
    pub fn dispatch(events: &[OutputEvent], sink: &mut dyn OutputSink) -> usize {
        let mut delivered = 0;
        for event in events {
            match sink.deliver(event) {
                Ok(()) => delivered += 1,
                Err(e) => tracing::warn!(event = event.kind(), error = %e, "output sink dropped event"),
            }
        }
        delivered
    }

    fn reset_controllers(&mut self) {
        self.auto_pause.reset();
        self.zone_alert.reset();
        self.laps.reset();
        self.intervals.stop();
        self.announcements.reset();
        self.zone_time.reset();
        self.started_at_ms = None;
        self.last_sample = None;
    }
}
