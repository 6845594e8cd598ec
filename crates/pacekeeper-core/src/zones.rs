//! Heart-rate zone classification and time-in-zone bookkeeping.
//!
//! Zones are bands of percent-of-max heart rate:
//!
//! ```text
//! Z1 < 60% <= Z2 < 70% <= Z3 < 80% <= Z4 < 90% <= Z5
//! ```
//!
//! [`classify`] is the only place these boundaries live. Live zone alerts and
//! the time-in-zone distribution both go through it with the same max HR.

use serde::{Deserialize, Serialize};

use crate::sample::Sample;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Zone {
    Z1 = 1,
    Z2 = 2,
    Z3 = 3,
    Z4 = 4,
    Z5 = 5,
}

impl Zone {
    pub const ALL: [Zone; 5] = [Zone::Z1, Zone::Z2, Zone::Z3, Zone::Z4, Zone::Z5];

    pub fn number(self) -> u8 {
        self as u8
    }

    /// Build a zone from its ordinal, clamping out-of-range values into 1..=5.
    pub fn from_number(n: u8) -> Self {
        match n {
            0 | 1 => Zone::Z1,
            2 => Zone::Z2,
            3 => Zone::Z3,
            4 => Zone::Z4,
            _ => Zone::Z5,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Zone::Z1 => "Recovery",
            Zone::Z2 => "Endurance",
            Zone::Z3 => "Tempo",
            Zone::Z4 => "Threshold",
            Zone::Z5 => "Maximum",
        }
    }

    fn index(self) -> usize {
        self as usize - 1
    }
}

impl From<Zone> for u8 {
    fn from(z: Zone) -> Self {
        z.number()
    }
}

impl TryFrom<u8> for Zone {
    type Error = String;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        if (1..=5).contains(&n) {
            Ok(Zone::from_number(n))
        } else {
            Err(format!("zone must be between 1 and 5, got {n}"))
        }
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "zone {}", self.number())
    }
}

/// Map a heart rate to its zone. Total: non-positive inputs land in Z1.
pub fn classify(hr: i32, max_hr: i32) -> Zone {
    if hr <= 0 || max_hr <= 0 {
        return Zone::Z1;
    }
    let percent = hr as f64 / max_hr as f64 * 100.0;
    if percent < 60.0 {
        Zone::Z1
    } else if percent < 70.0 {
        Zone::Z2
    } else if percent < 80.0 {
        Zone::Z3
    } else if percent < 90.0 {
        Zone::Z4
    } else {
        Zone::Z5
    }
}

/// Gaps longer than this between samples are treated as transport dropouts
/// and not credited to any zone.
pub const MAX_SAMPLE_GAP_MS: i64 = 10_000;

/// Time spent in each zone over a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneDistribution {
    /// Milliseconds per zone, index 0 is Z1.
    pub zone_ms: [i64; 5],
}

impl ZoneDistribution {
    pub fn time_in(&self, zone: Zone) -> i64 {
        self.zone_ms[zone.index()]
    }

    pub fn total_ms(&self) -> i64 {
        self.zone_ms.iter().sum()
    }

    /// Share of the tracked time spent in `zone`, 0.0 .. 100.0.
    pub fn percent_in(&self, zone: Zone) -> f64 {
        let total = self.total_ms();
        if total == 0 {
            return 0.0;
        }
        self.time_in(zone) as f64 / total as f64 * 100.0
    }
}

/// Accumulates [`ZoneDistribution`] from the sample stream.
///
/// Each inter-sample interval is credited to the zone of the sample that
/// opened it.
#[derive(Debug, Clone, Default)]
pub struct ZoneTimeTracker {
    distribution: ZoneDistribution,
    previous: Option<(i64, Zone)>,
}

impl ZoneTimeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, sample: &Sample, max_hr: i32) {
        let zone = if sample.has_heart_rate() {
            Some(classify(sample.heart_rate, max_hr))
        } else {
            None
        };

        if let Some((prev_ts, prev_zone)) = self.previous {
            let delta = (sample.timestamp_ms - prev_ts).max(0);
            if delta <= MAX_SAMPLE_GAP_MS {
                self.distribution.zone_ms[prev_zone.index()] += delta;
            }
        }

        self.previous = zone.map(|z| (sample.timestamp_ms, z));
    }

    pub fn distribution(&self) -> &ZoneDistribution {
        &self.distribution
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn classify_boundaries() {
        assert_eq!(classify(119, 200), Zone::Z1);
        assert_eq!(classify(120, 200), Zone::Z2);
        assert_eq!(classify(139, 200), Zone::Z2);
        assert_eq!(classify(140, 200), Zone::Z3);
        assert_eq!(classify(160, 200), Zone::Z4);
        assert_eq!(classify(179, 200), Zone::Z4);
        assert_eq!(classify(180, 200), Zone::Z5);
        assert_eq!(classify(250, 200), Zone::Z5);
    }

    #[test]
    fn classify_degenerate_inputs_are_zone_one() {
        assert_eq!(classify(0, 190), Zone::Z1);
        assert_eq!(classify(-5, 190), Zone::Z1);
        assert_eq!(classify(150, 0), Zone::Z1);
        assert_eq!(classify(150, -190), Zone::Z1);
    }

    #[test]
    fn zone_serializes_as_ordinal() {
        assert_eq!(serde_json::to_string(&Zone::Z4).unwrap(), "4");
        let z: Zone = serde_json::from_str("2").unwrap();
        assert_eq!(z, Zone::Z2);
        assert!(serde_json::from_str::<Zone>("6").is_err());
    }

    #[test]
    fn from_number_clamps() {
        assert_eq!(Zone::from_number(0), Zone::Z1);
        assert_eq!(Zone::from_number(9), Zone::Z5);
    }

    #[test]
    fn tracker_credits_interval_to_opening_zone() {
        let mut t = ZoneTimeTracker::new();
        t.record(&Sample::new(0, 100, 2.0, 0.0), 200); // Z1
        t.record(&Sample::new(1_000, 150, 2.0, 0.0), 200); // Z3
        t.record(&Sample::new(3_000, 150, 2.0, 0.0), 200);

        let d = t.distribution();
        assert_eq!(d.time_in(Zone::Z1), 1_000);
        assert_eq!(d.time_in(Zone::Z3), 2_000);
        assert_eq!(d.total_ms(), 3_000);
        assert!((d.percent_in(Zone::Z3) - 66.666).abs() < 0.01);
    }

    #[test]
    fn tracker_skips_dropouts_and_missing_hr() {
        let mut t = ZoneTimeTracker::new();
        t.record(&Sample::new(0, 150, 2.0, 0.0), 200);
        t.record(&Sample::new(60_000, 150, 2.0, 0.0), 200); // gap too long
        t.record(&Sample::new(61_000, 0, 2.0, 0.0), 200); // no reading
        t.record(&Sample::new(62_000, 150, 2.0, 0.0), 200);

        assert_eq!(t.distribution().time_in(Zone::Z3), 1_000);
    }

    proptest! {
        #[test]
        fn classify_is_monotonic_in_hr(max_hr in 1i32..300, a in -50i32..400, b in -50i32..400) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(classify(lo, max_hr) <= classify(hi, max_hr));
        }

        #[test]
        fn classify_is_deterministic(hr in -50i32..400, max_hr in -10i32..300) {
            prop_assert_eq!(classify(hr, max_hr), classify(hr, max_hr));
        }
    }
}
