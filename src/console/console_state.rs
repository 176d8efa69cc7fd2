use crate::poll::poll_loop::PollTick;

/// Reader indicator: `Idle -> Scanning -> {NewScanDisplayed | Idle}`.
///
/// Independent of the form state; the two only meet in the draft fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanState {
    #[default]
    Idle,
    Scanning,
    NewScanDisplayed,
}

impl ScanState {
    pub fn on_tick(self, tick: &PollTick) -> ScanState {
        match tick {
            PollTick::Started { .. } => ScanState::Scanning,
            PollTick::NewScan { .. } => ScanState::NewScanDisplayed,
            PollTick::Stale { .. } | PollTick::Miss { .. } => ScanState::Idle,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScanState::Idle => "idle",
            ScanState::Scanning => "reading",
            ScanState::NewScanDisplayed => "new scan",
        }
    }
}
