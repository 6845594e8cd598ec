use std::path::Path;
use std::time::Duration;

use clap::Args;
use pacekeeper_core::{OutputEvent, Result, Sample, SessionReactionEngine};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::Instant;

use super::load_config;
use crate::sink::JsonLineSink;

/// Every trigger is stamped with wall time since the session began; any
/// `timestampMs` in an incoming sample is replaced on arrival.
#[derive(Args)]
pub struct LiveArgs {
    /// Start the configured interval workout immediately
    #[arg(long)]
    intervals: bool,
}

/// One line of stdin: either a JSON sample or an operator command.
enum Input {
    Sample(Sample),
    Lap,
    IntervalsStart,
    IntervalsPause,
    IntervalsSkip,
    IntervalsStop,
    Finish,
}

/// Milliseconds on the session clock.
fn session_ms(started: Instant) -> i64 {
    i64::try_from(started.elapsed().as_millis()).unwrap_or(i64::MAX)
}

fn stamp(sample: Sample, now_ms: i64) -> Sample {
    Sample {
        timestamp_ms: now_ms,
        ..sample
    }
}

fn parse_input(line: &str) -> Option<Input> {
    let line = line.trim();
    if line.starts_with('{') {
        return match serde_json::from_str(line) {
            Ok(sample) => Some(Input::Sample(sample)),
            Err(e) => {
                tracing::warn!(error = %e, "skipping malformed sample");
                None
            }
        };
    }
    match line {
        "lap" => Some(Input::Lap),
        "start" => Some(Input::IntervalsStart),
        "pause" => Some(Input::IntervalsPause),
        "skip" => Some(Input::IntervalsSkip),
        "stop" => Some(Input::IntervalsStop),
        "finish" => Some(Input::Finish),
        "" => None,
        other => {
            tracing::warn!(command = other, "unknown command");
            None
        }
    }
}

pub fn run(args: LiveArgs, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run_session(args, config))
}

async fn run_session(
    args: LiveArgs,
    config: pacekeeper_core::Config,
) -> Result<()> {
    let mut engine = SessionReactionEngine::from_config(&config);
    let mut sink = JsonLineSink::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let period = Duration::from_millis(config.tick_period_ms as u64);
    let started = Instant::now();
    let mut ticks = tokio::time::interval_at(started + period, period);
    ticks.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    let mut now: i64 = 0;
    engine.start(now, 0.0);
    if args.intervals {
        SessionReactionEngine::dispatch(&engine.start_intervals(), &mut sink);
    }

    // Both branches run on this one task, so a sample and a tick are never
    // processed at the same time.
    loop {
        let events: Vec<OutputEvent> = tokio::select! {
            _ = ticks.tick() => {
                now = session_ms(started);
                engine.on_tick(now)
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                now = session_ms(started);
                match parse_input(&line) {
                    Some(Input::Sample(sample)) => engine.on_sample(&stamp(sample, now)),
                    Some(Input::Lap) => engine.mark_lap(now),
                    Some(Input::IntervalsStart) => engine.start_intervals(),
                    Some(Input::IntervalsPause) => {
                        engine.toggle_interval_pause();
                        Vec::new()
                    }
                    Some(Input::IntervalsSkip) => engine.skip_interval_step(),
                    Some(Input::IntervalsStop) => {
                        engine.stop_intervals();
                        Vec::new()
                    }
                    Some(Input::Finish) => break,
                    None => Vec::new(),
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        };
        sink.set_time(now);
        SessionReactionEngine::dispatch(&events, &mut sink);
    }

    if let Some(summary) = engine.finish(session_ms(started)) {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    Ok(())
}
