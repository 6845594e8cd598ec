use std::path::Path;

use clap::Subcommand;
use pacekeeper_core::announce::spoken_duration;
use pacekeeper_core::{IntervalWorkout, Result, ValidationError};

use super::{load_config, save_config};

#[derive(Subcommand)]
pub enum WorkoutAction {
    /// List built-in presets and the configured workout
    List,
    /// Print the expanded steps of a preset (or the configured workout)
    Show {
        /// Preset name; defaults to the configured workout
        name: Option<String>,
    },
    /// Make a preset the configured workout
    Use {
        /// Preset name
        name: String,
    },
}

fn find_preset(name: &str) -> Result<IntervalWorkout> {
    IntervalWorkout::preset(name)
        .ok_or_else(|| ValidationError::invalid("workout", format!("unknown preset '{name}'")).into())
}

pub fn run(action: WorkoutAction, path: Option<&Path>) -> Result<()> {
    match action {
        WorkoutAction::List => {
            let config = load_config(path)?;
            println!("configured: {}", config.workout.name);
            for w in IntervalWorkout::presets() {
                println!(
                    "{:<10} {} x {}s work / {}s rest, {}",
                    w.name,
                    w.repetitions,
                    w.work_sec,
                    w.rest_sec,
                    spoken_duration(w.total_duration_sec() as i64)
                );
            }
        }
        WorkoutAction::Show { name } => {
            let workout = match name {
                Some(name) => find_preset(&name)?,
                None => load_config(path)?.workout,
            };
            println!("{}", serde_json::to_string_pretty(&workout.expand())?);
        }
        WorkoutAction::Use { name } => {
            let workout = find_preset(&name)?;
            let mut config = load_config(path)?;
            config.workout = workout;
            save_config(&config, path)?;
            println!("workout set to {}", config.workout.name);
        }
    }
    Ok(())
}
