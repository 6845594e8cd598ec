//! Interval workout scheduler.
//!
//! Like the rest of the core, the scheduler has no internal timer. The caller
//! invokes `tick()` once per second; a tick while idle, paused or completed
//! does nothing.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> (start) -> step[0] -> step[1] -> ... -> Completed
//!   ^                                                 |
//!   +----------------------- stop -------------------+
//! ```

use serde::{Deserialize, Serialize};

use super::workout::{IntervalPhase, IntervalStep, IntervalWorkout};
use crate::announce::spoken_duration;
use crate::events::{OutputEvent, VibrationPattern};

/// Remaining seconds at which the countdown is spoken.
const SPOKEN_COUNTDOWN: [u32; 3] = [10, 5, 3];
/// The last seconds of a step get a short pulse each.
const VIBRATE_COUNTDOWN_FROM: u32 = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalState {
    pub is_running: bool,
    pub is_paused: bool,
    pub step_index: usize,
    pub current_phase: IntervalPhase,
    pub remaining_sec: u32,
    pub elapsed_sec: u32,
    pub completed_reps: u32,
    /// Snapshot of the template taken at `start`.
    pub workout: Option<IntervalWorkout>,
}

impl Default for IntervalState {
    fn default() -> Self {
        Self {
            is_running: false,
            is_paused: false,
            step_index: 0,
            current_phase: IntervalPhase::Idle,
            remaining_sec: 0,
            elapsed_sec: 0,
            completed_reps: 0,
            workout: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct IntervalScheduler {
    template: IntervalWorkout,
    steps: Vec<IntervalStep>,
    state: IntervalState,
}

impl IntervalScheduler {
    pub fn new(template: IntervalWorkout) -> Self {
        Self {
            template,
            steps: Vec::new(),
            state: IntervalState::default(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &IntervalState {
        &self.state
    }

    pub fn template(&self) -> &IntervalWorkout {
        &self.template
    }

    /// Steps of the in-flight workout; empty while idle.
    pub fn steps(&self) -> &[IntervalStep] {
        &self.steps
    }

    pub fn current_step(&self) -> Option<&IntervalStep> {
        if self.state.is_running {
            self.steps.get(self.state.step_index)
        } else {
            None
        }
    }

    pub fn total_duration_sec(&self) -> u32 {
        if self.steps.is_empty() {
            self.template.total_duration_sec()
        } else {
            self.steps.iter().map(|s| s.duration_sec).sum()
        }
    }

    /// 0.0 .. 100.0 progress across the whole workout.
    pub fn progress_pct(&self) -> f64 {
        if self.state.current_phase == IntervalPhase::Completed {
            return 100.0;
        }
        let total = self.total_duration_sec();
        if total == 0 {
            return 0.0;
        }
        (self.state.elapsed_sec as f64 / total as f64 * 100.0).min(100.0)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Replace the template. An in-flight workout keeps its own copy.
    pub fn set_template(&mut self, template: IntervalWorkout) {
        self.template = template;
    }

    /// Rebuild the steps from the template and enter the first one.
    pub fn start(&mut self) -> Vec<OutputEvent> {
        self.steps = self.template.expand();
        self.state = IntervalState {
            is_running: true,
            workout: Some(self.template.clone()),
            ..IntervalState::default()
        };
        tracing::info!(
            workout = %self.template.name,
            steps = self.steps.len(),
            total_sec = self.total_duration_sec(),
            "interval workout started"
        );
        self.enter_step(0)
    }

    pub fn toggle_pause(&mut self) -> bool {
        if self.state.is_running {
            self.state.is_paused = !self.state.is_paused;
        }
        self.state.is_paused
    }

    pub fn stop(&mut self) {
        self.steps.clear();
        self.state = IntervalState::default();
    }

    /// Jump to the next step now, with the same bookkeeping as a natural
    /// transition.
    pub fn skip(&mut self) -> Vec<OutputEvent> {
        if !self.state.is_running {
            return Vec::new();
        }
        self.advance()
    }

    pub fn tick(&mut self) -> Vec<OutputEvent> {
        if !self.state.is_running || self.state.is_paused {
            return Vec::new();
        }

        self.state.elapsed_sec += 1;
        self.state.remaining_sec = self.state.remaining_sec.saturating_sub(1);
        let remaining = self.state.remaining_sec;
        if remaining == 0 {
            return self.advance();
        }

        let mut events = Vec::new();
        if SPOKEN_COUNTDOWN.contains(&remaining) {
            events.push(OutputEvent::speak(format!("{remaining} seconds")));
        }
        if remaining <= VIBRATE_COUNTDOWN_FROM {
            events.push(OutputEvent::vibrate(VibrationPattern::Countdown));
        }
        events
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn advance(&mut self) -> Vec<OutputEvent> {
        let index = self.state.step_index;
        let leaving_work = self
            .steps
            .get(index)
            .is_some_and(|s| s.phase == IntervalPhase::Work);
        let into_recovery = self
            .steps
            .get(index + 1)
            .is_some_and(|s| matches!(s.phase, IntervalPhase::Rest | IntervalPhase::Cooldown));
        // A rep counts only on Work -> Rest/Cooldown.
        if leaving_work && into_recovery {
            self.state.completed_reps += 1;
        }
        self.enter_step(index + 1)
    }

    fn enter_step(&mut self, index: usize) -> Vec<OutputEvent> {
        let Some(step) = self.steps.get(index).cloned() else {
            return self.complete(index);
        };

        self.state.step_index = index;
        self.state.current_phase = step.phase;
        self.state.remaining_sec = step.duration_sec;
        tracing::debug!(index, phase = ?step.phase, duration_sec = step.duration_sec, "interval step");

        let text = self.announce_step(&step);
        vec![
            OutputEvent::PhaseChanged { step },
            OutputEvent::vibrate(VibrationPattern::PhaseChange),
            OutputEvent::speak(text),
        ]
    }

    fn complete(&mut self, index: usize) -> Vec<OutputEvent> {
        self.state.step_index = index;
        self.state.current_phase = IntervalPhase::Completed;
        self.state.remaining_sec = 0;
        self.state.is_running = false;
        self.state.is_paused = false;
        tracing::info!(
            completed_reps = self.state.completed_reps,
            elapsed_sec = self.state.elapsed_sec,
            "interval workout completed"
        );
        vec![
            OutputEvent::PhaseChanged {
                step: IntervalStep::completed(),
            },
            OutputEvent::vibrate(VibrationPattern::PhaseChange),
            OutputEvent::speak(IntervalPhase::Completed.label()),
        ]
    }

    fn announce_step(&self, step: &IntervalStep) -> String {
        let mut parts = Vec::with_capacity(3);
        match (step.phase, step.repetition) {
            (IntervalPhase::Work, Some(rep)) => {
                let reps = self.state.workout.as_ref().map_or(rep, |w| w.repetitions.max(1));
                parts.push(format!("Work, interval {rep} of {reps}"));
            }
            (phase, _) => parts.push(phase.label().to_string()),
        }
        parts.push(spoken_duration(step.duration_sec as i64));
        if let Some(zone) = step.target_zone {
            parts.push(format!("target {zone}"));
        }
        parts.join(", ")
    }
}
