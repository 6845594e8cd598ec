use serde::{Deserialize, Serialize};

/// One telemetry reading from the wearable.
///
/// Distance and speed arrive pre-computed; this crate never derives them from
/// GPS fixes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    /// Milliseconds on the session clock (any monotonic origin).
    #[serde(alias = "timestamp_ms")]
    pub timestamp_ms: i64,
    /// Beats per minute. Zero or negative means "no reading".
    #[serde(alias = "heart_rate", default)]
    pub heart_rate: i32,
    #[serde(alias = "speed_mps", default)]
    pub speed_mps: f64,
    /// Cumulative distance since the session began.
    #[serde(alias = "distance_meters", default)]
    pub distance_meters: f64,
}

impl Sample {
    pub fn new(timestamp_ms: i64, heart_rate: i32, speed_mps: f64, distance_meters: f64) -> Self {
        Self {
            timestamp_ms,
            heart_rate,
            speed_mps,
            distance_meters,
        }
    }

    pub fn has_heart_rate(&self) -> bool {
        self.heart_rate > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_camel_and_snake_case() {
        let camel: Sample = serde_json::from_str(
            r#"{"timestampMs":1000,"heartRate":140,"speedMps":3.2,"distanceMeters":120.5}"#,
        )
        .unwrap();
        let snake: Sample = serde_json::from_str(
            r#"{"timestamp_ms":1000,"heart_rate":140,"speed_mps":3.2,"distance_meters":120.5}"#,
        )
        .unwrap();
        assert_eq!(camel, snake);
        assert_eq!(camel.heart_rate, 140);
    }

    #[test]
    fn missing_readings_default_to_zero() {
        let s: Sample = serde_json::from_str(r#"{"timestampMs":5}"#).unwrap();
        assert_eq!(s, Sample::new(5, 0, 0.0, 0.0));
        assert!(!s.has_heart_rate());
    }
}
