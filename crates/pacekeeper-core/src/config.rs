//! TOML-based session configuration.
//!
//! Holds the settings injected into each controller:
//! - Auto-pause thresholds and debounce delays
//! - Zone alert target, cooldown and max heart rate
//! - Progress announcement units and interval
//! - The interval workout template
//!
//! Configuration is stored at `~/.config/pacekeeper/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::announce::AnnouncementSettings;
use crate::auto_pause::AutoPauseSettings;
use crate::error::{ConfigError, ValidationError};
use crate::interval::IntervalWorkout;
use crate::ticker::DEFAULT_TICK_PERIOD_MS;
use crate::zone_alert::ZoneAlertSettings;

/// Session configuration.
///
/// Serialized to/from TOML at `~/.config/pacekeeper/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub auto_pause: AutoPauseSettings,
    #[serde(default)]
    pub zone_alert: ZoneAlertSettings,
    #[serde(default)]
    pub announcements: AnnouncementSettings,
    #[serde(default)]
    pub workout: IntervalWorkout,
    /// Period of the interval scheduler tick.
    #[serde(default = "default_tick_period")]
    pub tick_period_ms: i64,
}

fn default_tick_period() -> i64 {
    DEFAULT_TICK_PERIOD_MS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auto_pause: AutoPauseSettings::default(),
            zone_alert: ZoneAlertSettings::default(),
            announcements: AnnouncementSettings::default(),
            workout: IntervalWorkout::default(),
            tick_period_ms: default_tick_period(),
        }
    }
}

/// Returns `~/.config/pacekeeper[-dev]/` based on PACEKEEPER_ENV.
///
/// Set PACEKEEPER_ENV=dev to use the development directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("PACEKEEPER_ENV").unwrap_or_else(|_| "production".to_string());
    let dir = if env == "dev" {
        base_dir.join("pacekeeper-dev")
    } else {
        base_dir.join("pacekeeper")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::SaveFailed {
        path: dir.clone(),
        message: e.to_string(),
    })?;
    Ok(dir)
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                // "none" clears an optional field whatever it currently holds;
                // required fields then fail to deserialize.
                let new_value = match existing {
                    serde_json::Value::String(_) => serde_json::Value::String(value.into()),
                    _ if value == "none" => serde_json::Value::Null,
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<i64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    // Optional fields (e.g. work_zone) are null until set.
                    serde_json::Value::Null => serde_json::from_str(value)
                        .unwrap_or_else(|_| serde_json::Value::String(value.into())),
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(config_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            let cfg = Self::default();
            cfg.save_to(&path)?;
            Ok(cfg)
        }
    }

    /// Load and validate a config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or fails validation.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let cfg: Config = toml::from_str(&content)?;
        cfg.validate().map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(cfg)
    }

    /// Persist to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        tracing::debug!(path = %path.display(), "config saved");
        Ok(())
    }

    /// Check values no controller can work with.
    ///
    /// Out-of-range but meaningful values (negative delays, zero thresholds)
    /// are accepted; controllers clamp them.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.auto_pause.speed_threshold_mps.is_finite() {
            return Err(ValidationError::invalid(
                "auto_pause.speed_threshold_mps",
                "must be a finite number",
            ));
        }
        if self.zone_alert.max_hr <= 0 {
            return Err(ValidationError::invalid("zone_alert.max_hr", "must be positive"));
        }
        if self.tick_period_ms <= 0 {
            return Err(ValidationError::invalid("tick_period_ms", "must be positive"));
        }
        self.workout.validate()
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key, in memory only.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the resulting config is invalid.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate().map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        *self = updated;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::announce::DistanceUnit;
    use crate::zones::Zone;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            [zone_alert]
            enabled = true
            target_zone = 4
            max_hr = 185
            "#,
        )
        .unwrap();
        assert!(cfg.zone_alert.enabled);
        assert_eq!(cfg.zone_alert.target_zone, Zone::Z4);
        assert_eq!(cfg.zone_alert.cooldown_ms, 30_000);
        assert!(!cfg.auto_pause.enabled);
        assert_eq!(cfg.workout, IntervalWorkout::tabata());
        assert_eq!(cfg.tick_period_ms, 1_000);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("auto_pause.enabled").as_deref(), Some("false"));
        assert_eq!(cfg.get("zone_alert.max_hr").as_deref(), Some("190"));
        assert_eq!(cfg.get("workout.name").as_deref(), Some("Tabata"));
        assert_eq!(cfg.get("announcements.distance_unit").as_deref(), Some("kilometers"));
        assert!(cfg.get("auto_pause.missing_key").is_none());
    }

    #[test]
    fn set_updates_typed_values() {
        let mut cfg = Config::default();
        cfg.set("auto_pause.enabled", "true").unwrap();
        cfg.set("auto_pause.speed_threshold_mps", "1.25").unwrap();
        cfg.set("zone_alert.target_zone", "2").unwrap();
        cfg.set("announcements.distance_unit", "miles").unwrap();
        cfg.set("workout.work_zone", "none").unwrap();

        assert!(cfg.auto_pause.enabled);
        assert_eq!(cfg.auto_pause.speed_threshold_mps, 1.25);
        assert_eq!(cfg.zone_alert.target_zone, Zone::Z2);
        assert_eq!(cfg.announcements.distance_unit, DistanceUnit::Miles);
        assert_eq!(cfg.workout.work_zone, None);

        cfg.set("workout.work_zone", "4").unwrap();
        assert_eq!(cfg.workout.work_zone, Some(Zone::Z4));
    }

    #[test]
    fn set_none_clears_a_preset_zone() {
        let mut cfg = Config::default();
        assert_eq!(cfg.workout.rest_zone, Some(Zone::Z2));

        cfg.set("workout.rest_zone", "none").unwrap();
        assert_eq!(cfg.workout.rest_zone, None);
        assert_eq!(cfg.get("workout.rest_zone").as_deref(), Some("null"));

        cfg.set("workout.rest_zone", "1").unwrap();
        assert_eq!(cfg.workout.rest_zone, Some(Zone::Z1));
    }

    #[test]
    fn set_none_on_required_field_is_rejected() {
        let mut cfg = Config::default();
        let err = cfg.set("zone_alert.max_hr", "none").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        assert_eq!(cfg.zone_alert.max_hr, 190);
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = Config::default();
        let err = cfg.set("auto_pause.nonexistent", "1").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownKey(_)));
    }

    #[test]
    fn set_rejects_invalid_type_and_leaves_config_untouched() {
        let mut cfg = Config::default();
        assert!(cfg.set("auto_pause.enabled", "not_a_bool").is_err());
        assert!(cfg.set("zone_alert.target_zone", "9").is_err());
        assert!(cfg.set("workout.repetitions", "0").is_err());
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn save_and_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut cfg = Config::default();
        cfg.workout = IntervalWorkout::sprints();
        cfg.auto_pause.enabled = true;
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn load_from_rejects_invalid_workout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[workout]\nwork_sec = 30\nrepetitions = 0\n",
        )
        .unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::LoadFailed { .. }));
    }

    #[test]
    fn load_from_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load_from(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::LoadFailed { .. }));
    }
}
