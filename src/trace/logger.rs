use std::{
    fs::{File, OpenOptions},
    io::Write,
    sync::Mutex,
};

use crate::trace::trace::TraceEvent;

/// JSONL sink for console trace events, one event per line.
///
/// Tracing is best effort. A file that cannot be opened turns the logger
/// off; a failed write is reported on stderr and the session carries on.
pub struct TraceLogger {
    sink: Option<Mutex<File>>,
}

impl TraceLogger {
    /// Append to `path`, creating it if needed.
    pub fn new(path: &str) -> Self {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Self {
                sink: Some(Mutex::new(file)),
            },
            Err(e) => {
                eprintln!("Warning: tracing disabled, cannot open '{}': {}", path, e);
                Self::disabled()
            }
        }
    }

    pub fn disabled() -> Self {
        Self { sink: None }
    }

    pub fn from_path(path: Option<&str>) -> Self {
        path.map_or_else(Self::disabled, Self::new)
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    pub fn log(&self, event: &TraceEvent) {
        let Some(sink) = &self.sink else {
            return;
        };

        let line = match serde_json::to_string(event) {
            Ok(line) => line,
            Err(e) => {
                eprintln!("Warning: dropping trace event '{}': {}", event.event, e);
                return;
            }
        };

        // Keep writing through a poisoned lock.
        let mut file = sink.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Err(e) = writeln!(file, "{}", line) {
            eprintln!("Warning: trace write failed: {}", e);
        }
    }
}
