use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::{console::console_state::ScanState, form::controller::FormState};

/// One line of the console trace file.
#[derive(Debug, Serialize)]
pub struct TraceEvent {
    pub timestamp_ms: u128,
    pub event: String,

    pub scan_state: String,
    pub form_state: String,

    pub tick: Option<u64>,
    pub uid: Option<String>,
    pub message: Option<String>,
}

impl TraceEvent {
    pub fn now(event: &str, scan_state: ScanState, form_state: FormState) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or_default(),
            event: event.to_string(),
            scan_state: format!("{:?}", scan_state),
            form_state: format!("{:?}", form_state),
            tick: None,
            uid: None,
            message: None,
        }
    }

    pub fn with_tick(mut self, tick: u64) -> Self {
        self.tick = Some(tick);
        self
    }

    pub fn with_uid(mut self, uid: &str) -> Self {
        self.uid = Some(uid.to_string());
        self
    }

    pub fn with_message(mut self, message: impl ToString) -> Self {
        self.message = Some(message.to_string());
        self
    }
}
