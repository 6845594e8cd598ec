//! # Pacekeeper Core Library
//!
//! This library provides the reactive decision layer of a workout recorder.
//! It turns a stream of telemetry samples (heart rate, speed, cumulative
//! distance) and a steady 1 Hz tick into output events: pause or resume the
//! recording clock, vibrate on a heart-rate zone change, close a lap, or
//! advance an interval workout.
//!
//! ## Architecture
//!
//! - **Controllers**: small state machines that own no clock. Every call
//!   receives the current timestamp explicitly, so behaviour is reproducible
//!   by feeding synthetic timestamps.
//! - **Engine**: owns one instance of each controller per session and fans
//!   the triggers out to them.
//! - **Sinks**: haptic/speech drivers implement [`OutputSink`]; delivery is
//!   fire-and-forget.
//!
//! ## Key Components
//!
//! - [`SessionReactionEngine`]: composes all controllers
//! - [`AutoPauseController`]: debounced speed-based auto-pause
//! - [`ZoneAlertController`]: target-zone alerts with cooldown
//! - [`LapSegmenter`]: manual laps with rolling aggregation
//! - [`IntervalScheduler`]: structured interval workouts
//! - [`AnnouncementPolicy`]: distance and time milestones
//! - [`Config`]: TOML configuration for all of the above

pub mod announce;
pub mod auto_pause;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod interval;
pub mod laps;
pub mod sample;
pub mod ticker;
pub mod zone_alert;
pub mod zones;

pub use announce::{AnnouncementPolicy, AnnouncementSettings, DistanceUnit};
pub use auto_pause::{AutoPauseController, AutoPausePhase, AutoPauseSettings, AutoPauseState};
pub use config::Config;
pub use engine::{OutputSink, RecordingSink, SessionReactionEngine, SessionSettings, SessionSummary};
pub use error::{ConfigError, CoreError, Result, SinkError, ValidationError};
pub use events::{OutputEvent, VibrationPattern};
pub use interval::{IntervalPhase, IntervalScheduler, IntervalState, IntervalStep, IntervalWorkout};
pub use laps::{Lap, LapSegmenter, LapState};
pub use sample::Sample;
pub use ticker::Ticker;
pub use zone_alert::{ZoneAlertController, ZoneAlertSettings, ZoneAlertState};
pub use zones::{classify, Zone, ZoneDistribution, ZoneTimeTracker};
