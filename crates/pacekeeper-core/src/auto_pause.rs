//! Speed-driven auto-pause.
//!
//! The controller is a debounced state machine over the sample stream. It
//! owns no clock: every transition is computed from the sample timestamp.
//!
//! ## State Transitions
//!
//! ```text
//!            slow                 slow for pause_delay
//! Active ----------> WaitingToPause -------------------> Paused
//!   ^                     | fast                          |  ^
//!   |<--------------------+                          fast |  | slow
//!   |                                                     v  |
//!   +-------------------------------------------- WaitingToResume
//!                 fast for resume_delay
//! ```

use serde::{Deserialize, Serialize};

use crate::events::OutputEvent;
use crate::sample::Sample;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoPauseSettings {
    #[serde(default)]
    pub enabled: bool,
    /// Below this speed the athlete counts as stopped. `<= 0` never pauses.
    #[serde(default = "default_speed_threshold")]
    pub speed_threshold_mps: f64,
    #[serde(default = "default_pause_delay")]
    pub pause_delay_ms: i64,
    #[serde(default = "default_resume_delay")]
    pub resume_delay_ms: i64,
}

fn default_speed_threshold() -> f64 {
    0.8
}
fn default_pause_delay() -> i64 {
    3_000
}
fn default_resume_delay() -> i64 {
    2_000
}

impl Default for AutoPauseSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            speed_threshold_mps: default_speed_threshold(),
            pause_delay_ms: default_pause_delay(),
            resume_delay_ms: default_resume_delay(),
        }
    }
}

impl AutoPauseSettings {
    fn is_stopped(&self, speed_mps: f64) -> bool {
        self.speed_threshold_mps > 0.0 && speed_mps < self.speed_threshold_mps
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutoPauseState {
    pub is_paused: bool,
    pub accumulated_paused_ms: i64,
    pub last_pause_at_ms: Option<i64>,
    pub pause_count: u32,
    pub is_waiting_to_pause: bool,
    pub is_waiting_to_resume: bool,
    pub stop_detected_at_ms: Option<i64>,
    pub move_detected_at_ms: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoPausePhase {
    Active,
    WaitingToPause,
    Paused,
    WaitingToResume,
}

impl AutoPauseState {
    pub fn phase(&self) -> AutoPausePhase {
        match (self.is_paused, self.is_waiting_to_pause, self.is_waiting_to_resume) {
            (true, _, true) => AutoPausePhase::WaitingToResume,
            (true, _, false) => AutoPausePhase::Paused,
            (false, true, _) => AutoPausePhase::WaitingToPause,
            (false, false, _) => AutoPausePhase::Active,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AutoPauseController {
    settings: AutoPauseSettings,
    state: AutoPauseState,
}

impl AutoPauseController {
    pub fn new(settings: AutoPauseSettings) -> Self {
        Self {
            settings,
            state: AutoPauseState::default(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn settings(&self) -> &AutoPauseSettings {
        &self.settings
    }

    pub fn state(&self) -> &AutoPauseState {
        &self.state
    }

    pub fn phase(&self) -> AutoPausePhase {
        self.state.phase()
    }

    pub fn is_paused(&self) -> bool {
        self.state.is_paused
    }

    /// Length of the pause in progress, 0 when moving.
    pub fn current_pause_ms(&self, now_ms: i64) -> i64 {
        match (self.state.is_paused, self.state.last_pause_at_ms) {
            (true, Some(at)) => (now_ms - at).max(0),
            _ => 0,
        }
    }

    /// Session time with all auto-paused spans removed.
    pub fn active_elapsed_ms(&self, total_elapsed_ms: i64, now_ms: i64) -> i64 {
        (total_elapsed_ms - self.state.accumulated_paused_ms - self.current_pause_ms(now_ms)).max(0)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Replace the settings. Disabling while paused resumes immediately,
    /// ignoring the resume delay.
    pub fn update_settings(&mut self, settings: AutoPauseSettings, now_ms: i64) -> Option<OutputEvent> {
        let disabling = self.settings.enabled && !settings.enabled;
        self.settings = settings;
        if !disabling {
            return None;
        }

        self.state.is_waiting_to_pause = false;
        self.state.stop_detected_at_ms = None;
        if self.state.is_paused {
            tracing::debug!("auto-pause disabled while paused, forcing resume");
            Some(self.resume(now_ms))
        } else {
            None
        }
    }

    pub fn on_sample(&mut self, sample: &Sample) -> Option<OutputEvent> {
        if !self.settings.enabled {
            return None;
        }

        let now = sample.timestamp_ms;
        let stopped = self.settings.is_stopped(sample.speed_mps);
        let pause_delay = self.settings.pause_delay_ms.max(0);
        let resume_delay = self.settings.resume_delay_ms.max(0);

        match self.state.phase() {
            AutoPausePhase::Active => {
                if stopped {
                    self.state.is_waiting_to_pause = true;
                    self.state.stop_detected_at_ms = Some(now);
                    return self.try_pause(now, pause_delay);
                }
                None
            }
            AutoPausePhase::WaitingToPause => {
                if stopped {
                    self.try_pause(now, pause_delay)
                } else {
                    self.state.is_waiting_to_pause = false;
                    self.state.stop_detected_at_ms = None;
                    None
                }
            }
            AutoPausePhase::Paused => {
                if !stopped {
                    self.state.is_waiting_to_resume = true;
                    self.state.move_detected_at_ms = Some(now);
                    return self.try_resume(now, resume_delay);
                }
                None
            }
            AutoPausePhase::WaitingToResume => {
                if stopped {
                    self.state.is_waiting_to_resume = false;
                    self.state.move_detected_at_ms = None;
                    None
                } else {
                    self.try_resume(now, resume_delay)
                }
            }
        }
    }

    pub fn reset(&mut self) {
        self.state = AutoPauseState::default();
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn try_pause(&mut self, now: i64, delay: i64) -> Option<OutputEvent> {
        let since = self.state.stop_detected_at_ms?;
        if now - since < delay {
            return None;
        }
        self.state.is_paused = true;
        self.state.is_waiting_to_pause = false;
        self.state.stop_detected_at_ms = None;
        self.state.last_pause_at_ms = Some(now);
        self.state.pause_count += 1;
        tracing::debug!(at_ms = now, count = self.state.pause_count, "auto-pause engaged");
        Some(OutputEvent::PauseClock)
    }

    fn try_resume(&mut self, now: i64, delay: i64) -> Option<OutputEvent> {
        let since = self.state.move_detected_at_ms?;
        if now - since < delay {
            return None;
        }
        Some(self.resume(now))
    }

    fn resume(&mut self, now: i64) -> OutputEvent {
        self.state.accumulated_paused_ms += self.current_pause_ms(now);
        self.state.is_paused = false;
        self.state.is_waiting_to_resume = false;
        self.state.move_detected_at_ms = None;
        tracing::debug!(
            at_ms = now,
            paused_total_ms = self.state.accumulated_paused_ms,
            "auto-pause released"
        );
        OutputEvent::ResumeClock
    }
}
