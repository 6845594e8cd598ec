use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::zones::Zone;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalPhase {
    /// No workout running. Only appears in [`super::IntervalState`].
    Idle,
    Warmup,
    Work,
    Rest,
    Cooldown,
    Completed,
}

impl IntervalPhase {
    pub fn label(self) -> &'static str {
        match self {
            IntervalPhase::Idle => "Idle",
            IntervalPhase::Warmup => "Warm up",
            IntervalPhase::Work => "Work",
            IntervalPhase::Rest => "Rest",
            IntervalPhase::Cooldown => "Cool down",
            IntervalPhase::Completed => "Workout complete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalStep {
    pub phase: IntervalPhase,
    pub duration_sec: u32,
    #[serde(default)]
    pub target_zone: Option<Zone>,
    /// 1-based repetition for Work and Rest steps.
    #[serde(default)]
    pub repetition: Option<u32>,
}

impl IntervalStep {
    pub fn completed() -> Self {
        Self {
            phase: IntervalPhase::Completed,
            duration_sec: 0,
            target_zone: None,
            repetition: None,
        }
    }
}

/// Template for a structured interval workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalWorkout {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub warmup_sec: u32,
    pub work_sec: u32,
    #[serde(default)]
    pub rest_sec: u32,
    pub repetitions: u32,
    #[serde(default)]
    pub cooldown_sec: u32,
    #[serde(default)]
    pub work_zone: Option<Zone>,
    #[serde(default)]
    pub rest_zone: Option<Zone>,
}

fn default_name() -> String {
    "Custom".into()
}

impl Default for IntervalWorkout {
    fn default() -> Self {
        Self::tabata()
    }
}

impl IntervalWorkout {
    pub fn tabata() -> Self {
        Self {
            name: "Tabata".into(),
            warmup_sec: 300,
            work_sec: 20,
            rest_sec: 10,
            repetitions: 8,
            cooldown_sec: 120,
            work_zone: Some(Zone::Z5),
            rest_zone: Some(Zone::Z2),
        }
    }

    pub fn classic() -> Self {
        Self {
            name: "Classic".into(),
            warmup_sec: 600,
            work_sec: 180,
            rest_sec: 120,
            repetitions: 5,
            cooldown_sec: 600,
            work_zone: Some(Zone::Z4),
            rest_zone: Some(Zone::Z2),
        }
    }

    pub fn sprints() -> Self {
        Self {
            name: "Sprints".into(),
            warmup_sec: 600,
            work_sec: 30,
            rest_sec: 90,
            repetitions: 10,
            cooldown_sec: 300,
            work_zone: Some(Zone::Z5),
            rest_zone: Some(Zone::Z1),
        }
    }

    pub fn presets() -> Vec<Self> {
        vec![Self::tabata(), Self::classic(), Self::sprints()]
    }

    /// Look up a built-in preset by case-insensitive name.
    pub fn preset(name: &str) -> Option<Self> {
        Self::presets()
            .into_iter()
            .find(|w| w.name.eq_ignore_ascii_case(name))
    }

    /// Check the template shape.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no repetitions or the work step is empty.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.repetitions < 1 {
            return Err(ValidationError::invalid("repetitions", "must be at least 1"));
        }
        if self.work_sec < 1 {
            return Err(ValidationError::invalid("work_sec", "must be at least 1 second"));
        }
        Ok(())
    }

    /// Expand into the ordered step timeline.
    ///
    /// Zero-length steps are left out. The final rest is dropped only when
    /// there is no cooldown to follow it.
    pub fn expand(&self) -> Vec<IntervalStep> {
        let reps = self.repetitions.max(1);
        let mut steps = Vec::with_capacity(reps as usize * 2 + 2);

        if self.warmup_sec > 0 {
            steps.push(IntervalStep {
                phase: IntervalPhase::Warmup,
                duration_sec: self.warmup_sec,
                target_zone: None,
                repetition: None,
            });
        }

        for rep in 1..=reps {
            if self.work_sec > 0 {
                steps.push(IntervalStep {
                    phase: IntervalPhase::Work,
                    duration_sec: self.work_sec,
                    target_zone: self.work_zone,
                    repetition: Some(rep),
                });
            }
            let is_last = rep == reps;
            if self.rest_sec > 0 && !(is_last && self.cooldown_sec == 0) {
                steps.push(IntervalStep {
                    phase: IntervalPhase::Rest,
                    duration_sec: self.rest_sec,
                    target_zone: self.rest_zone,
                    repetition: Some(rep),
                });
            }
        }

        if self.cooldown_sec > 0 {
            steps.push(IntervalStep {
                phase: IntervalPhase::Cooldown,
                duration_sec: self.cooldown_sec,
                target_zone: None,
                repetition: None,
            });
        }
        steps
    }

    pub fn total_duration_sec(&self) -> u32 {
        self.expand().iter().map(|s| s.duration_sec).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(steps: &[IntervalStep]) -> Vec<(IntervalPhase, u32)> {
        steps.iter().map(|s| (s.phase, s.duration_sec)).collect()
    }

    #[test]
    fn expands_with_cooldown_keeps_final_rest() {
        let w = IntervalWorkout {
            name: "test".into(),
            warmup_sec: 300,
            work_sec: 60,
            rest_sec: 30,
            repetitions: 3,
            cooldown_sec: 300,
            work_zone: None,
            rest_zone: None,
        };
        use IntervalPhase::*;
        assert_eq!(
            shape(&w.expand()),
            vec![
                (Warmup, 300),
                (Work, 60),
                (Rest, 30),
                (Work, 60),
                (Rest, 30),
                (Work, 60),
                (Rest, 30),
                (Cooldown, 300),
            ]
        );
        assert_eq!(w.total_duration_sec(), 870);
    }

    #[test]
    fn final_rest_dropped_without_cooldown() {
        let w = IntervalWorkout {
            warmup_sec: 0,
            cooldown_sec: 0,
            repetitions: 2,
            ..IntervalWorkout::tabata()
        };
        use IntervalPhase::*;
        assert_eq!(shape(&w.expand()), vec![(Work, 20), (Rest, 10), (Work, 20)]);
    }

    #[test]
    fn steps_carry_zone_targets_and_repetition() {
        let steps = IntervalWorkout::tabata().expand();
        assert_eq!(steps.len(), 1 + 8 * 2 + 1);
        assert_eq!(steps[1].target_zone, Some(Zone::Z5));
        assert_eq!(steps[1].repetition, Some(1));
        assert_eq!(steps[2].target_zone, Some(Zone::Z2));
        assert_eq!(steps[16].repetition, Some(8));
        assert_eq!(IntervalWorkout::tabata().total_duration_sec(), 660);
    }

    #[test]
    fn validate_rejects_degenerate_templates() {
        let mut w = IntervalWorkout::tabata();
        assert!(w.validate().is_ok());
        w.repetitions = 0;
        assert!(w.validate().is_err());
        w.repetitions = 1;
        w.work_sec = 0;
        assert!(w.validate().is_err());
    }

    #[test]
    fn preset_lookup_is_case_insensitive() {
        assert_eq!(IntervalWorkout::preset("TABATA"), Some(IntervalWorkout::tabata()));
        assert!(IntervalWorkout::preset("marathon").is_none());
    }
}
