use crate::scan::scan_model::ScanRecord;

// ============================================================================
// Scan reconciliation — NEW vs STALE decision for each poll result
// ============================================================================

/// Result of comparing one poll result against the last observed one.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    /// The record to keep as the new watermark. Always the incoming record.
    pub previous: ScanRecord,

    /// Whether the incoming record is a physical scan not seen before.
    pub is_new_scan: bool,
}

/// Decide whether `incoming` is a new physical scan.
///
/// - With no previous record the incoming one only establishes the baseline,
///   so whatever tag sits on the reader at start-up never counts as new.
/// - Otherwise a scan is new when it succeeded and its `scanned` token
///   differs from the previous token. No other field takes part.
///
/// The incoming record becomes the watermark regardless of the outcome, so a
/// failed or stale poll still moves it forward.
pub fn reconcile(previous: Option<&ScanRecord>, incoming: ScanRecord) -> Reconciliation {
    let is_new_scan = match previous {
        None => false,
        Some(prev) => incoming.success && incoming.scanned != prev.scanned,
    };

    Reconciliation {
        previous: incoming,
        is_new_scan,
    }
}

/// Owns the "last seen" watermark for one poll loop.
#[derive(Debug, Default)]
pub struct ScanReconciler {
    last_seen: Option<ScanRecord>,
    observed: u64,
}

impl ScanReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one poll result. Returns the record when it is a new scan.
    pub fn observe(&mut self, incoming: ScanRecord) -> Option<ScanRecord> {
        let outcome = reconcile(self.last_seen.as_ref(), incoming);
        self.observed += 1;

        let fresh = outcome.is_new_scan.then(|| outcome.previous.clone());
        self.last_seen = Some(outcome.previous);
        fresh
    }

    pub fn last_seen(&self) -> Option<&ScanRecord> {
        self.last_seen.as_ref()
    }

    /// Number of poll results fed so far (failed transports excluded).
    pub fn observed(&self) -> u64 {
        self.observed
    }
}
