use serde::{Deserialize, Serialize};

use crate::interval::IntervalStep;
use crate::laps::Lap;

/// Every decision the core makes surfaces as an OutputEvent.
/// Haptic and speech sinks consume them; the core never waits on delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputEvent {
    Vibrate { pattern: VibrationPattern },
    Speak { text: String },
    PauseClock,
    ResumeClock,
    LapClosed { lap: Lap },
    PhaseChanged { step: IntervalStep },
}

impl OutputEvent {
    pub fn vibrate(pattern: VibrationPattern) -> Self {
        OutputEvent::Vibrate { pattern }
    }

    pub fn speak(text: impl Into<String>) -> Self {
        OutputEvent::Speak { text: text.into() }
    }

    /// Short machine-friendly name, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            OutputEvent::Vibrate { .. } => "vibrate",
            OutputEvent::Speak { .. } => "speak",
            OutputEvent::PauseClock => "pause_clock",
            OutputEvent::ResumeClock => "resume_clock",
            OutputEvent::LapClosed { .. } => "lap_closed",
            OutputEvent::PhaseChanged { .. } => "phase_changed",
        }
    }
}

/// Named haptic patterns. The haptic driver only needs [`VibrationPattern::timings_ms`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VibrationPattern {
    /// Left the target zone: two long pulses.
    ZoneExit,
    /// Entered the target zone: one short pulse.
    ZoneEntry,
    /// Final seconds of an interval step.
    Countdown,
    PhaseChange,
    Lap,
}

impl VibrationPattern {
    /// Alternating on/off durations, starting with "on".
    pub fn timings_ms(self) -> &'static [u64] {
        match self {
            VibrationPattern::ZoneExit => &[400, 200, 400],
            VibrationPattern::ZoneEntry => &[150],
            VibrationPattern::Countdown => &[80],
            VibrationPattern::PhaseChange => &[300, 100, 300, 100, 300],
            VibrationPattern::Lap => &[200, 100, 200],
        }
    }

    pub fn total_ms(self) -> u64 {
        self.timings_ms().iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_tagged_by_type() {
        let json = serde_json::to_string(&OutputEvent::PauseClock).unwrap();
        assert_eq!(json, r#"{"type":"pause_clock"}"#);

        let json = serde_json::to_string(&OutputEvent::vibrate(VibrationPattern::ZoneExit)).unwrap();
        assert_eq!(json, r#"{"type":"vibrate","pattern":"zone_exit"}"#);
    }

    #[test]
    fn exit_and_entry_patterns_differ() {
        assert_ne!(
            VibrationPattern::ZoneExit.timings_ms(),
            VibrationPattern::ZoneEntry.timings_ms()
        );
        assert_eq!(VibrationPattern::ZoneExit.total_ms(), 1_000);
    }
}
