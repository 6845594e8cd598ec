use std::io::BufRead;
use std::path::{Path, PathBuf};

use clap::Args;
use pacekeeper_core::{Result, Sample, SessionReactionEngine, Ticker, ValidationError};

use super::load_config;
use crate::sink::JsonLineSink;

#[derive(Args)]
pub struct ReplayArgs {
    /// File with one JSON sample per line
    file: PathBuf,
    /// Close a lap every N meters
    #[arg(long)]
    lap_every: Option<f64>,
    /// Run the configured interval workout from the first sample
    #[arg(long)]
    intervals: bool,
    /// Skip the session summary printed at the end
    #[arg(long)]
    no_summary: bool,
}

pub fn run(args: ReplayArgs, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let mut engine = SessionReactionEngine::from_config(&config);
    let mut ticker = Ticker::new(config.tick_period_ms);
    let mut sink = JsonLineSink::new();
    let mut next_lap_at = args.lap_every.filter(|m| *m > 0.0);
    let mut last_ts = None;

    let reader = std::io::BufReader::new(std::fs::File::open(&args.file)?);
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let sample: Sample = match serde_json::from_str(&line) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(line = line_no + 1, error = %e, "skipping malformed sample");
                continue;
            }
        };
        let now = sample.timestamp_ms;

        if !engine.is_started() {
            engine.start(now, sample.distance_meters);
            ticker.start(now);
            if args.intervals {
                sink.set_time(now);
                SessionReactionEngine::dispatch(&engine.start_intervals(), &mut sink);
            }
        }

        // Ticks that fell due before this sample are delivered first.
        for _ in 0..ticker.poll(now) {
            let events = engine.on_tick(now);
            sink.set_time(now);
            SessionReactionEngine::dispatch(&events, &mut sink);
        }

        let events = engine.on_sample(&sample);
        sink.set_time(now);
        SessionReactionEngine::dispatch(&events, &mut sink);

        if let (Some(every), Some(at)) = (args.lap_every, next_lap_at) {
            if sample.distance_meters >= at {
                SessionReactionEngine::dispatch(&engine.mark_lap(now), &mut sink);
                next_lap_at = Some(at + every);
            }
        }
        last_ts = Some(now);
    }

    ticker.stop();
    let Some(end) = last_ts else {
        return Err(ValidationError::invalid(
            args.file.display().to_string(),
            "file contains no samples",
        )
        .into());
    };
    if let Some(summary) = engine.finish(end) {
        if !args.no_summary {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }
    Ok(())
}
