//! Operator-marked laps.
//!
//! Heart-rate and speed samples accumulate passively between marks; a mark
//! summarises them into an immutable [`Lap`] and starts the next segment.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lap {
    pub number: u32,
    pub start_ms: i64,
    pub end_ms: i64,
    pub duration_ms: i64,
    pub distance_meters: f64,
    pub avg_hr: i32,
    pub max_hr: i32,
    pub avg_speed_mps: f64,
}

impl Lap {
    /// Seconds per kilometre, `None` for a stationary lap.
    pub fn pace_sec_per_km(&self) -> Option<f64> {
        if self.avg_speed_mps > 0.0 {
            Some(1_000.0 / self.avg_speed_mps)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LapState {
    pub current_lap_number: u32,
    pub current_lap_start_ms: i64,
    pub current_lap_start_distance: f64,
    pub laps: Vec<Lap>,
    pub hr_samples: Vec<i32>,
    pub speed_samples: Vec<f64>,
}

impl Default for LapState {
    fn default() -> Self {
        Self {
            current_lap_number: 1,
            current_lap_start_ms: 0,
            current_lap_start_distance: 0.0,
            laps: Vec::new(),
            hr_samples: Vec::new(),
            speed_samples: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LapSegmenter {
    state: LapState,
    tracking: bool,
}

impl LapSegmenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &LapState {
        &self.state
    }

    pub fn laps(&self) -> &[Lap] {
        &self.state.laps
    }

    pub fn current_lap_number(&self) -> u32 {
        self.state.current_lap_number
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    pub fn current_lap_elapsed_ms(&self, now_ms: i64) -> i64 {
        if !self.tracking {
            return 0;
        }
        (now_ms - self.state.current_lap_start_ms).max(0)
    }

    pub fn current_lap_distance(&self, current_distance: f64) -> f64 {
        if !self.tracking {
            return 0.0;
        }
        (current_distance - self.state.current_lap_start_distance).max(0.0)
    }

    /// Lap with the highest average speed.
    pub fn fastest_lap(&self) -> Option<&Lap> {
        self.state
            .laps
            .iter()
            .max_by(|a, b| a.avg_speed_mps.total_cmp(&b.avg_speed_mps))
    }

    /// Begin tracking; the first lap starts here.
    pub fn start(&mut self, now_ms: i64, distance_meters: f64) {
        self.state = LapState {
            current_lap_start_ms: now_ms,
            current_lap_start_distance: distance_meters,
            ..LapState::default()
        };
        self.tracking = true;
    }

    pub fn add_heart_rate_sample(&mut self, hr: i32) {
        if self.tracking && hr > 0 {
            self.state.hr_samples.push(hr);
        }
    }

    pub fn add_speed_sample(&mut self, speed_mps: f64) {
        if self.tracking && speed_mps >= 0.0 {
            self.state.speed_samples.push(speed_mps);
        }
    }

    /// Close the current lap. Returns `None` if tracking has not started.
    pub fn mark_lap(&mut self, now_ms: i64, current_distance: f64, current_hr: i32) -> Option<Lap> {
        if !self.tracking {
            return None;
        }

        let s = &mut self.state;
        let duration_ms = (now_ms - s.current_lap_start_ms).max(0);
        let distance_meters = (current_distance - s.current_lap_start_distance).max(0.0);

        let avg_hr = if s.hr_samples.is_empty() {
            current_hr
        } else {
            let sum: i64 = s.hr_samples.iter().map(|&h| h as i64).sum();
            (sum as f64 / s.hr_samples.len() as f64).round() as i32
        };
        let max_hr = s.hr_samples.iter().copied().max().unwrap_or(current_hr);

        let avg_speed_mps = if !s.speed_samples.is_empty() {
            s.speed_samples.iter().sum::<f64>() / s.speed_samples.len() as f64
        } else if duration_ms > 0 {
            distance_meters / (duration_ms as f64 / 1_000.0)
        } else {
            0.0
        };

        let lap = Lap {
            number: s.current_lap_number,
            start_ms: s.current_lap_start_ms,
            end_ms: now_ms,
            duration_ms,
            distance_meters,
            avg_hr,
            max_hr,
            avg_speed_mps,
        };

        s.laps.push(lap.clone());
        s.current_lap_number += 1;
        s.current_lap_start_ms = now_ms;
        s.current_lap_start_distance = current_distance;
        s.hr_samples.clear();
        s.speed_samples.clear();

        tracing::debug!(
            lap = lap.number,
            duration_ms = lap.duration_ms,
            distance_m = lap.distance_meters,
            "lap closed"
        );
        Some(lap)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
