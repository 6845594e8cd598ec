use std::io::Write;

use pacekeeper_core::{OutputEvent, OutputSink, SinkError};
use serde::Serialize;

#[derive(Serialize)]
struct EventLine<'a> {
    at_ms: i64,
    #[serde(flatten)]
    event: &'a OutputEvent,
}

/// Writes each event as one JSON line on stdout, stamped with the time of
/// the trigger that produced it.
pub struct JsonLineSink {
    at_ms: i64,
}

impl JsonLineSink {
    pub fn new() -> Self {
        Self { at_ms: 0 }
    }

    pub fn set_time(&mut self, at_ms: i64) {
        self.at_ms = at_ms;
    }
}

impl OutputSink for JsonLineSink {
    fn deliver(&mut self, event: &OutputEvent) -> Result<(), SinkError> {
        let line = serde_json::to_string(&EventLine {
            at_ms: self.at_ms,
            event,
        })
        .map_err(|e| SinkError::Rejected(e.to_string()))?;
        let mut out = std::io::stdout().lock();
        writeln!(out, "{line}").map_err(|_| SinkError::Unavailable)
    }
}
