//! Periodic progress announcements.
//!
//! Two independent milestones feed the speech sink: whole distance units
//! (kilometres or miles) and a fixed elapsed-time interval. The first
//! evaluation after enabling only records baselines, so nothing is spoken at
//! time zero or for distance covered before enabling.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::events::OutputEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    Kilometers,
    Miles,
}

impl DistanceUnit {
    pub fn meters(self) -> f64 {
        match self {
            DistanceUnit::Kilometers => 1_000.0,
            DistanceUnit::Miles => 1_609.344,
        }
    }

    fn name(self, count: f64) -> &'static str {
        let singular = (count - 1.0).abs() < f64::EPSILON;
        match (self, singular) {
            (DistanceUnit::Kilometers, true) => "kilometer",
            (DistanceUnit::Kilometers, false) => "kilometers",
            (DistanceUnit::Miles, true) => "mile",
            (DistanceUnit::Miles, false) => "miles",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnouncementSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_unit")]
    pub distance_unit: DistanceUnit,
    #[serde(default = "default_true")]
    pub announce_distance: bool,
    /// Zero disables time announcements.
    #[serde(default = "default_time_interval")]
    pub time_interval_ms: i64,
    #[serde(default = "default_true")]
    pub include_heart_rate: bool,
}

fn default_unit() -> DistanceUnit {
    DistanceUnit::Kilometers
}
fn default_true() -> bool {
    true
}
fn default_time_interval() -> i64 {
    5 * 60 * 1_000
}

impl Default for AnnouncementSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            distance_unit: default_unit(),
            announce_distance: true,
            time_interval_ms: default_time_interval(),
            include_heart_rate: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AnnouncementPolicy {
    settings: AnnouncementSettings,
    last_announced_units: Option<u32>,
    last_announced_elapsed_ms: Option<i64>,
}

impl AnnouncementPolicy {
    pub fn new(settings: AnnouncementSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn settings(&self) -> &AnnouncementSettings {
        &self.settings
    }

    pub fn last_announced_units(&self) -> Option<u32> {
        self.last_announced_units
    }

    pub fn last_announced_elapsed_ms(&self) -> Option<i64> {
        self.last_announced_elapsed_ms
    }

    pub fn update_settings(&mut self, settings: AnnouncementSettings) {
        let enabling = settings.enabled && !self.settings.enabled;
        let unit_changed = settings.distance_unit != self.settings.distance_unit;
        if enabling || unit_changed {
            self.last_announced_units = None;
        }
        if enabling {
            self.last_announced_elapsed_ms = None;
        }
        self.settings = settings;
    }

    /// Evaluate both milestones against the current progress.
    ///
    /// `elapsed_ms` is active (auto-pause adjusted) session time.
    pub fn evaluate(&mut self, distance_meters: f64, elapsed_ms: i64, heart_rate: i32) -> Vec<OutputEvent> {
        if !self.settings.enabled {
            return Vec::new();
        }

        let mut events = Vec::new();
        let mut announced = false;

        if self.settings.announce_distance {
            let unit = self.settings.distance_unit;
            let units = whole_units(distance_meters, unit);
            match self.last_announced_units {
                None => self.last_announced_units = Some(units),
                Some(last) if units > last => {
                    self.last_announced_units = Some(units);
                    let mut text = format!(
                        "{units} {}. Time {}",
                        unit.name(units as f64),
                        spoken_duration(elapsed_ms / 1_000)
                    );
                    self.append_heart_rate(&mut text, heart_rate);
                    events.push(OutputEvent::speak(text));
                    announced = true;
                }
                Some(_) => {}
            }
        }

        let interval = self.settings.time_interval_ms;
        if interval > 0 {
            match self.last_announced_elapsed_ms {
                None => self.last_announced_elapsed_ms = Some(elapsed_ms),
                Some(_) if announced => self.last_announced_elapsed_ms = Some(elapsed_ms),
                Some(last) if elapsed_ms - last >= interval => {
                    self.last_announced_elapsed_ms = Some(elapsed_ms);
                    let unit = self.settings.distance_unit;
                    let covered = distance_meters.max(0.0) / unit.meters();
                    let mut text = format!(
                        "Time {}. Distance {covered:.2} {}",
                        spoken_duration(elapsed_ms / 1_000),
                        unit.name(covered)
                    );
                    self.append_heart_rate(&mut text, heart_rate);
                    events.push(OutputEvent::speak(text));
                }
                Some(_) => {}
            }
        }

        events
    }

    pub fn reset(&mut self) {
        self.last_announced_units = None;
        self.last_announced_elapsed_ms = None;
    }

    fn append_heart_rate(&self, text: &mut String, heart_rate: i32) {
        if self.settings.include_heart_rate && heart_rate > 0 {
            text.push_str(&format!(". Heart rate {heart_rate}"));
        }
    }
}

/// Whole units covered, truncated so a partial overshoot never counts.
fn whole_units(distance_meters: f64, unit: DistanceUnit) -> u32 {
    if !distance_meters.is_finite() || distance_meters <= 0.0 {
        return 0;
    }
    (distance_meters / unit.meters()).floor() as u32
}

/// Render seconds the way they are read aloud: "1 hour 2 minutes 5 seconds".
pub fn spoken_duration(secs: i64) -> String {
    let d = Duration::seconds(secs.max(0));
    let hours = d.num_hours();
    let minutes = d.num_minutes() % 60;
    let seconds = d.num_seconds() % 60;

    let mut parts = Vec::with_capacity(3);
    for (value, singular, plural) in [
        (hours, "hour", "hours"),
        (minutes, "minute", "minutes"),
        (seconds, "second", "seconds"),
    ] {
        if value > 0 {
            parts.push(format!("{value} {}", if value == 1 { singular } else { plural }));
        }
    }
    if parts.is_empty() {
        return "0 seconds".into();
    }
    parts.join(" ")
}
