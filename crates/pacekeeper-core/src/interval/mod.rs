mod scheduler;
mod workout;

pub use scheduler::{IntervalScheduler, IntervalState};
pub use workout::{IntervalPhase, IntervalStep, IntervalWorkout};
