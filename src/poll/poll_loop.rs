use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::{
    scan::{reconciler::ScanReconciler, scan_model::ScanRecord},
    transport::error::TransportError,
};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Shortest delay between two polls; shorter intervals are raised to this.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// What happened on one poll tick.
#[derive(Debug)]
pub enum PollTick {
    /// A poll is about to be issued
    Started { tick: u64 },

    /// The poll returned a physical scan not seen before
    NewScan { tick: u64, record: ScanRecord },

    /// The poll returned nothing new (repeat, failed scan or baseline)
    Stale { tick: u64 },

    /// The poll never produced a record; the watermark is untouched
    Miss { tick: u64, error: TransportError },
}

impl PollTick {
    pub fn tick(&self) -> u64 {
        match self {
            PollTick::Started { tick }
            | PollTick::NewScan { tick, .. }
            | PollTick::Stale { tick }
            | PollTick::Miss { tick, .. } => *tick,
        }
    }
}

/// Run one poll through the reconciler.
pub fn tick<P>(reconciler: &mut ScanReconciler, poll_fn: &mut P, tick: u64) -> PollTick
where
    P: FnMut() -> Result<ScanRecord, TransportError>,
{
    match poll_fn() {
        Ok(record) => match reconciler.observe(record) {
            Some(record) => PollTick::NewScan { tick, record },
            None => PollTick::Stale { tick },
        },
        Err(error) => PollTick::Miss { tick, error },
    }
}

// ============================================================================
// Poll loop — background thread with a cancellable delay between ticks
// ============================================================================

/// Polls on its own thread until stopped.
///
/// The first poll runs immediately. The delay before the next one starts only
/// after the previous poll has returned, so at most one request is ever in
/// flight. The delay is a `recv_timeout` on a stop channel, which makes
/// `stop` take effect without waiting out the interval.
///
/// The reconciler lives on the poll thread: it is created by `start` and
/// dropped when the loop ends.
pub struct PollLoop {
    interval: Duration,
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl PollLoop {
    /// Call `on_new_scan` once for every new physical scan.
    pub fn start<P, S>(interval: Duration, poll_fn: P, mut on_new_scan: S) -> Self
    where
        P: FnMut() -> Result<ScanRecord, TransportError> + Send + 'static,
        S: FnMut(ScanRecord) + Send + 'static,
    {
        Self::spawn(interval, poll_fn, move |outcome| {
            if let PollTick::NewScan { record, .. } = outcome {
                on_new_scan(record);
            }
        })
    }

    /// Like `start`, but `observer` sees every tick, misses included.
    ///
    /// The observer runs on the poll thread and must not call `stop` on this
    /// loop.
    pub fn spawn<P, O>(interval: Duration, mut poll_fn: P, mut observer: O) -> Self
    where
        P: FnMut() -> Result<ScanRecord, TransportError> + Send + 'static,
        O: FnMut(PollTick) + Send + 'static,
    {
        let interval = interval.max(MIN_POLL_INTERVAL);
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let handle = thread::spawn(move || {
            let mut reconciler = ScanReconciler::new();
            let mut count: u64 = 0;

            loop {
                count += 1;
                observer(PollTick::Started { tick: count });

                let outcome = tick(&mut reconciler, &mut poll_fn, count);

                // Stopped while the request was in flight: drop the result.
                if stop_requested(&stop_rx) {
                    break;
                }
                observer(outcome);

                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => continue,
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        });

        Self {
            interval,
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Cancel the pending delay and wait for the poll thread to exit. A poll
    /// in flight is allowed to return but its result is discarded. Calling
    /// `stop` again does nothing.
    pub fn stop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                eprintln!("Warning: poll thread panicked");
            }
        }
    }
}

impl Drop for PollLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

fn stop_requested(stop_rx: &Receiver<()>) -> bool {
    match stop_rx.try_recv() {
        Ok(()) | Err(TryRecvError::Disconnected) => true,
        Err(TryRecvError::Empty) => false,
    }
}
