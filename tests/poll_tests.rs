mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use common::{MockTransport, unavailable};
use pummeluff_console::{
    poll::poll_loop::{MIN_POLL_INTERVAL, PollLoop, PollTick, tick},
    scan::{reconciler::ScanReconciler, scan_model::ScanRecord},
    transport::{error::TransportError, transport::{Endpoint, Transport}},
};

const FAST: Duration = Duration::from_millis(5);

/// Drain non-`Started` ticks from `rx` until `count` arrived or time runs out.
fn collect_outcomes(rx: &mpsc::Receiver<PollTick>, count: usize) -> Vec<PollTick> {
    let deadline = Instant::now() + Duration::from_secs(5);
    let mut outcomes = Vec::new();
    while outcomes.len() < count && Instant::now() < deadline {
        if let Ok(t) = rx.recv_timeout(Duration::from_millis(100)) {
            if !matches!(t, PollTick::Started { .. }) {
                outcomes.push(t);
            }
        }
    }
    outcomes
}

// ============================================================================
// Single tick
// ============================================================================

#[test]
fn tick_classifies_new_and_stale() {
    let mut reconciler = ScanReconciler::new();
    let mut script = vec![ScanRecord::new("B", 2u64), ScanRecord::new("A", 1u64)];
    let mut poll = || -> Result<ScanRecord, TransportError> { Ok(script.pop().unwrap()) };

    assert!(matches!(tick(&mut reconciler, &mut poll, 1), PollTick::Stale { tick: 1 }));
    match tick(&mut reconciler, &mut poll, 2) {
        PollTick::NewScan { tick, record } => {
            assert_eq!(tick, 2);
            assert_eq!(record.uid, "B");
        }
        other => panic!("expected NewScan, got {:?}", other),
    }
}

#[test]
fn transport_error_leaves_watermark_unchanged() {
    let mut reconciler = ScanReconciler::new();
    reconciler.observe(ScanRecord::new("A", 1u64));

    let mut failing = || -> Result<ScanRecord, TransportError> { Err(unavailable(Endpoint::Latest)) };
    let outcome = tick(&mut reconciler, &mut failing, 2);

    assert!(matches!(outcome, PollTick::Miss { tick: 2, .. }));
    assert_eq!(reconciler.last_seen().unwrap().uid, "A");
    assert_eq!(reconciler.observed(), 1, "a miss is not an observation");

    // Same token after the miss is still stale.
    let mut same = || -> Result<ScanRecord, TransportError> { Ok(ScanRecord::new("A", 1u64)) };
    assert!(matches!(tick(&mut reconciler, &mut same, 3), PollTick::Stale { .. }));
}

// ============================================================================
// Running loop
// ============================================================================

#[test]
fn first_poll_runs_immediately() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);

    let mut poll_loop = PollLoop::start(
        Duration::from_secs(60),
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(ScanRecord::new("A", 1u64))
        },
        |_| {},
    );

    let deadline = Instant::now() + Duration::from_secs(5);
    while calls.load(Ordering::SeqCst) == 0 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
    poll_loop.stop();

    assert_eq!(calls.load(Ordering::SeqCst), 1, "one immediate poll, next one a minute away");
}

#[test]
fn reference_sequence_through_loop() {
    let transport = Arc::new(MockTransport::new().with_latest(vec![
        ScanRecord::new("A", 1u64),
        ScanRecord::new("A", 1u64),
        ScanRecord::new("B", 2u64).with_alias("Bob"),
    ]));

    let (tx, rx) = mpsc::channel();
    let source = Arc::clone(&transport);
    let mut poll_loop = PollLoop::spawn(FAST, move || source.fetch_latest(), move |t| {
        let _ = tx.send(t);
    });

    let outcomes = collect_outcomes(&rx, 5);
    poll_loop.stop();

    assert_eq!(outcomes.len(), 5);
    assert!(matches!(outcomes[0], PollTick::Stale { .. }));
    assert!(matches!(outcomes[1], PollTick::Stale { .. }));
    match &outcomes[2] {
        PollTick::NewScan { record, .. } => {
            assert_eq!(record.uid, "B");
            assert_eq!(record.alias.as_deref(), Some("Bob"));
        }
        other => panic!("expected NewScan, got {:?}", other),
    }
    // Script exhausted: the backend keeps returning B@2.
    assert!(matches!(outcomes[3], PollTick::Stale { .. }));
    assert!(matches!(outcomes[4], PollTick::Stale { .. }));
}

#[test]
fn on_new_scan_fires_once_per_physical_scan() {
    let transport = Arc::new(MockTransport::new().with_latest(vec![
        ScanRecord::new("A", 1u64),
        ScanRecord::new("B", 2u64),
        ScanRecord::new("B", 2u64),
        ScanRecord::new("B", 3u64),
    ]));

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let source = Arc::clone(&transport);

    let mut poll_loop = PollLoop::start(FAST, move || source.fetch_latest(), move |record| {
        sink.lock().unwrap().push(record);
    });

    let deadline = Instant::now() + Duration::from_secs(5);
    while transport.latest_calls() < 10 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
    poll_loop.stop();

    let seen = seen.lock().unwrap();
    let tokens: Vec<String> = seen
        .iter()
        .map(|r| r.scanned.as_ref().unwrap().to_string())
        .collect();
    assert_eq!(tokens, vec!["2", "3"]);
}

#[test]
fn errors_do_not_stop_the_loop() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);

    let mut poll_loop = PollLoop::start(
        FAST,
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(unavailable(Endpoint::Latest))
        },
        |_| panic!("no scan can be new"),
    );

    let deadline = Instant::now() + Duration::from_secs(5);
    while calls.load(Ordering::SeqCst) < 3 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
    assert!(poll_loop.is_running());
    poll_loop.stop();

    assert!(calls.load(Ordering::SeqCst) >= 3, "loop kept polling after failures");
}

#[test]
fn polls_never_overlap() {
    let in_flight = Arc::new(AtomicUsize::new(0));
    let max_in_flight = Arc::new(AtomicUsize::new(0));
    let calls = Arc::new(AtomicUsize::new(0));

    let (f, m, c) = (Arc::clone(&in_flight), Arc::clone(&max_in_flight), Arc::clone(&calls));
    let mut poll_loop = PollLoop::start(
        Duration::from_millis(1),
        move || {
            let now = f.fetch_add(1, Ordering::SeqCst) + 1;
            m.fetch_max(now, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(10));
            f.fetch_sub(1, Ordering::SeqCst);
            c.fetch_add(1, Ordering::SeqCst);
            Ok(ScanRecord::new("A", 1u64))
        },
        |_| {},
    );

    let deadline = Instant::now() + Duration::from_secs(5);
    while calls.load(Ordering::SeqCst) < 5 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
    poll_loop.stop();

    assert_eq!(max_in_flight.load(Ordering::SeqCst), 1);
}

// ============================================================================
// Cancellation
// ============================================================================

#[test]
fn stop_ends_polling_and_is_idempotent() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);

    let mut poll_loop = PollLoop::start(
        FAST,
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(ScanRecord::new("A", 1u64))
        },
        |_| {},
    );

    let deadline = Instant::now() + Duration::from_secs(5);
    while calls.load(Ordering::SeqCst) < 2 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(2));
    }

    poll_loop.stop();
    assert!(!poll_loop.is_running());
    let after_stop = calls.load(Ordering::SeqCst);

    thread::sleep(Duration::from_millis(50));
    assert_eq!(calls.load(Ordering::SeqCst), after_stop, "no poll after stop");

    poll_loop.stop();
    assert!(!poll_loop.is_running());
}

#[test]
fn zero_interval_is_raised_to_the_minimum() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);

    let mut poll_loop = PollLoop::start(
        Duration::ZERO,
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(ScanRecord::new("A", 1u64))
        },
        |_| {},
    );
    assert_eq!(poll_loop.interval(), MIN_POLL_INTERVAL);

    thread::sleep(Duration::from_millis(50));
    poll_loop.stop();

    let polled = calls.load(Ordering::SeqCst);
    assert!(polled >= 1);
    assert!(polled <= 60, "polled {} times in 50ms", polled);
}

#[test]
fn stop_does_not_wait_out_the_interval() {
    let mut poll_loop = PollLoop::start(
        Duration::from_secs(60),
        || Ok(ScanRecord::new("A", 1u64)),
        |_| {},
    );

    thread::sleep(Duration::from_millis(20));
    let started = Instant::now();
    poll_loop.stop();
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[test]
fn result_of_poll_in_flight_at_stop_is_discarded() {
    let (tx, rx) = mpsc::channel();
    let (entered_tx, entered_rx) = mpsc::channel();

    let mut poll_loop = PollLoop::spawn(
        Duration::from_secs(60),
        move || {
            let _ = entered_tx.send(());
            thread::sleep(Duration::from_millis(100));
            Ok(ScanRecord::new("A", 1u64))
        },
        move |t| {
            let _ = tx.send(t);
        },
    );

    entered_rx.recv_timeout(Duration::from_secs(5)).unwrap();
    poll_loop.stop();

    let outcomes: Vec<PollTick> = rx.try_iter().collect();
    assert!(
        outcomes.iter().all(|t| matches!(t, PollTick::Started { .. })),
        "only the Started notification may have been delivered: {:?}",
        outcomes
    );
}
