//! Target-zone entry/exit alerts.
//!
//! An alert needs a previously observed zone to compare against, so the first
//! classified sample after enabling (or after retargeting) never fires.
//! Alerts are rate limited by a cooldown measured on sample timestamps.

use serde::{Deserialize, Serialize};

use crate::events::{OutputEvent, VibrationPattern};
use crate::sample::Sample;
use crate::zones::{classify, Zone};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneAlertSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_target_zone")]
    pub target_zone: Zone,
    #[serde(default = "default_true")]
    pub alert_on_exit: bool,
    #[serde(default)]
    pub alert_on_entry: bool,
    #[serde(default = "default_cooldown")]
    pub cooldown_ms: i64,
    /// Also the max HR used for time-in-zone bookkeeping.
    #[serde(default = "default_max_hr")]
    pub max_hr: i32,
}

fn default_target_zone() -> Zone {
    Zone::Z3
}
fn default_true() -> bool {
    true
}
fn default_cooldown() -> i64 {
    30_000
}
fn default_max_hr() -> i32 {
    190
}

impl Default for ZoneAlertSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            target_zone: default_target_zone(),
            alert_on_exit: true,
            alert_on_entry: false,
            cooldown_ms: default_cooldown(),
            max_hr: default_max_hr(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneAlertState {
    /// Last classified zone; `None` until a sample has been seen.
    pub current_zone: Option<Zone>,
    pub is_in_target_zone: bool,
    pub last_alert_at_ms: Option<i64>,
    pub alert_count: u32,
}

#[derive(Debug, Clone, Default)]
pub struct ZoneAlertController {
    settings: ZoneAlertSettings,
    state: ZoneAlertState,
}

impl ZoneAlertController {
    pub fn new(settings: ZoneAlertSettings) -> Self {
        Self {
            settings,
            state: ZoneAlertState::default(),
        }
    }

    pub fn settings(&self) -> &ZoneAlertSettings {
        &self.settings
    }

    pub fn state(&self) -> &ZoneAlertState {
        &self.state
    }

    pub fn update_settings(&mut self, settings: ZoneAlertSettings) {
        if settings.target_zone != self.settings.target_zone {
            self.state.alert_count = 0;
            self.forget_zone();
        } else if settings.enabled && !self.settings.enabled {
            self.forget_zone();
        }
        self.settings = settings;
    }

    pub fn on_sample(&mut self, sample: &Sample) -> Option<OutputEvent> {
        if !self.settings.enabled || !sample.has_heart_rate() {
            return None;
        }

        let now = sample.timestamp_ms;
        let zone = classify(sample.heart_rate, self.settings.max_hr);
        let in_target = zone == self.settings.target_zone;
        let was_in_target = self.state.is_in_target_zone;
        let previous = self.state.current_zone.replace(zone);
        self.state.is_in_target_zone = in_target;

        if previous.is_none() || !self.cooldown_elapsed(now) {
            return None;
        }

        let pattern = if self.settings.alert_on_exit && was_in_target && !in_target {
            VibrationPattern::ZoneExit
        } else if self.settings.alert_on_entry && !was_in_target && in_target {
            VibrationPattern::ZoneEntry
        } else {
            return None;
        };

        self.state.last_alert_at_ms = Some(now);
        self.state.alert_count += 1;
        tracing::debug!(
            ?pattern,
            zone = zone.number(),
            target = self.settings.target_zone.number(),
            "zone alert"
        );
        Some(OutputEvent::vibrate(pattern))
    }

    pub fn reset(&mut self) {
        self.state = ZoneAlertState::default();
    }

    fn cooldown_elapsed(&self, now: i64) -> bool {
        match self.state.last_alert_at_ms {
            Some(last) => now - last >= self.settings.cooldown_ms.max(0),
            None => true,
        }
    }

    fn forget_zone(&mut self) {
        self.state.current_zone = None;
        self.state.is_in_target_zone = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // max_hr 200: 150 bpm is Z3, 170 bpm is Z4, 100 bpm is Z1.
    fn controller(cooldown_ms: i64, on_entry: bool) -> ZoneAlertController {
        ZoneAlertController::new(ZoneAlertSettings {
            enabled: true,
            target_zone: Zone::Z3,
            alert_on_exit: true,
            alert_on_entry: on_entry,
            cooldown_ms,
            max_hr: 200,
        })
    }

    fn hr(ts: i64, bpm: i32) -> Sample {
        Sample::new(ts, bpm, 3.0, 0.0)
    }

    #[test]
    fn first_sample_never_alerts() {
        for bpm in [100, 150, 170, 199] {
            let mut c = controller(0, true);
            assert_eq!(c.on_sample(&hr(0, bpm)), None);
            assert!(c.state().current_zone.is_some());
        }
    }

    #[test]
    fn exit_fires_with_exit_pattern() {
        let mut c = controller(0, false);
        c.on_sample(&hr(0, 150));
        assert_eq!(
            c.on_sample(&hr(1_000, 170)),
            Some(OutputEvent::vibrate(VibrationPattern::ZoneExit))
        );
        assert_eq!(c.state().alert_count, 1);
        // Entering again is silent without alert_on_entry.
        assert_eq!(c.on_sample(&hr(2_000, 150)), None);
    }

    #[test]
    fn entry_fires_with_entry_pattern() {
        let mut c = controller(0, true);
        c.on_sample(&hr(0, 100));
        assert_eq!(
            c.on_sample(&hr(1_000, 150)),
            Some(OutputEvent::vibrate(VibrationPattern::ZoneEntry))
        );
    }

    #[test]
    fn cooldown_suppresses_close_exits() {
        let mut c = controller(10_000, false);
        c.on_sample(&hr(0, 150));
        assert!(c.on_sample(&hr(1_000, 170)).is_some());
        c.on_sample(&hr(3_000, 150));
        assert_eq!(c.on_sample(&hr(6_000, 170)), None);
        assert_eq!(c.state().alert_count, 1);
    }

    #[test]
    fn cooldown_allows_spaced_exits() {
        let mut c = controller(10_000, false);
        c.on_sample(&hr(0, 150));
        assert!(c.on_sample(&hr(1_000, 170)).is_some());
        c.on_sample(&hr(5_000, 150));
        assert!(c.on_sample(&hr(12_000, 170)).is_some());
        assert_eq!(c.state().alert_count, 2);
    }

    #[test]
    fn state_tracks_zone_even_during_cooldown() {
        let mut c = controller(60_000, false);
        c.on_sample(&hr(0, 150));
        c.on_sample(&hr(1_000, 170));
        c.on_sample(&hr(2_000, 150));
        assert_eq!(c.state().current_zone, Some(Zone::Z3));
        assert!(c.state().is_in_target_zone);
    }

    #[test]
    fn missing_heart_rate_is_ignored() {
        let mut c = controller(0, false);
        c.on_sample(&hr(0, 150));
        assert_eq!(c.on_sample(&hr(1_000, 0)), None);
        assert_eq!(c.state().current_zone, Some(Zone::Z3));
    }

    #[test]
    fn retargeting_resets_memory_and_count() {
        let mut c = controller(0, true);
        c.on_sample(&hr(0, 150));
        c.on_sample(&hr(1_000, 170));
        assert_eq!(c.state().alert_count, 1);

        let mut s = c.settings().clone();
        s.target_zone = Zone::Z4;
        c.update_settings(s);
        assert_eq!(c.state().alert_count, 0);
        assert_eq!(c.state().current_zone, None);

        // First sample after retargeting only observes.
        assert_eq!(c.on_sample(&hr(2_000, 170)), None);
        assert!(c.on_sample(&hr(3_000, 150)).is_some());
    }

    #[test]
    fn re_enabling_suppresses_first_sample() {
        let mut c = controller(0, false);
        c.on_sample(&hr(0, 150));
        let mut s = c.settings().clone();
        s.enabled = false;
        c.update_settings(s.clone());
        s.enabled = true;
        c.update_settings(s);
        assert_eq!(c.on_sample(&hr(1_000, 170)), None);
    }
}
