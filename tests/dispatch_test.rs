/*!
 * Dispatcher Tests
 * End-to-end tests for submission, FIFO draining, back-pressure, and teardown
 */

use dispatchq::{DispatchConfig, Dispatcher, SubmitError, TaskTarget, RESULT_ABORTED};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use serial_test::serial;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Poll until `done` holds or the deadline passes
fn wait_for(deadline: Duration, mut done: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < deadline {
        if done() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    false
}

fn recording_target(log: Arc<Mutex<Vec<i32>>>) -> Arc<dyn TaskTarget> {
    Arc::new(move |arg: i32, _: Option<&[u8]>| {
        log.lock().push(arg);
        arg
    })
}

/// Target that parks on a gate channel before recording, so tests can hold
/// the dispatch loop mid-run
fn gated_target(gate: flume::Receiver<()>, log: Arc<Mutex<Vec<i32>>>) -> Arc<dyn TaskTarget> {
    Arc::new(move |arg: i32, _: Option<&[u8]>| {
        gate.recv().ok();
        log.lock().push(arg);
        arg
    })
}

#[test]
fn test_single_producer_fifo() {
    let dispatcher = Dispatcher::new(DispatchConfig::with_capacity(64));
    let log = Arc::new(Mutex::new(Vec::new()));
    let target = recording_target(log.clone());

    for i in 0..50 {
        dispatcher.submit_async(target.clone(), i, None).unwrap();
    }

    assert!(wait_for(Duration::from_secs(5), || {
        dispatcher.stats().executed == 50
    }));
    assert_eq!(*log.lock(), (0..50).collect::<Vec<_>>());

    dispatcher.shutdown();
}

#[test]
fn test_multi_producer_per_producer_order() {
    const PRODUCERS: i32 = 4;
    const PER_PRODUCER: i32 = 50;

    let dispatcher = Dispatcher::new(DispatchConfig::default());
    let log = Arc::new(Mutex::new(Vec::new()));
    let target = recording_target(log.clone());

    let producers: Vec<_> = (0..PRODUCERS)
        .map(|producer| {
            let dispatcher = dispatcher.clone();
            let target = target.clone();
            thread::spawn(move || {
                for seq in 0..PER_PRODUCER {
                    // Tag encodes (producer, seq); retry through back-pressure
                    let arg = producer * 1000 + seq;
                    loop {
                        match dispatcher.submit_async(target.clone(), arg, None) {
                            Ok(()) => break,
                            Err(SubmitError::QueueFull) => thread::yield_now(),
                            Err(err) => panic!("unexpected submit error: {err}"),
                        }
                    }
                }
            })
        })
        .collect();

    for producer in producers {
        producer.join().unwrap();
    }

    let total = (PRODUCERS * PER_PRODUCER) as u64;
    assert!(wait_for(Duration::from_secs(5), || {
        dispatcher.stats().executed == total
    }));

    // FIFO across the queue implies each producer's submissions ran in
    // their submission order
    let log = log.lock();
    for producer in 0..PRODUCERS {
        let sequence: Vec<_> = log
            .iter()
            .filter(|arg| *arg / 1000 == producer)
            .copied()
            .collect();
        let expected: Vec<_> = (0..PER_PRODUCER).map(|seq| producer * 1000 + seq).collect();
        assert_eq!(sequence, expected);
    }

    dispatcher.shutdown();
}

#[test]
#[serial]
fn test_capacity_boundary_with_backpressure() {
    // 4 slots, 3 usable
    let dispatcher = Dispatcher::new(DispatchConfig::with_capacity(4));
    let log = Arc::new(Mutex::new(Vec::new()));
    let (gate_tx, gate_rx) = flume::unbounded::<()>();
    let target = gated_target(gate_rx, log.clone());

    // First task is taken by the loop immediately and parks on the gate,
    // leaving the whole ring free
    dispatcher.submit_async(target.clone(), 0, None).unwrap();
    assert!(wait_for(Duration::from_secs(5), || {
        let stats = dispatcher.stats();
        stats.submitted == 1 && stats.queued == 0
    }));

    for arg in 1..=3 {
        dispatcher.submit_async(target.clone(), arg, None).unwrap();
    }
    assert_eq!(dispatcher.stats().queued, 3);
    assert_eq!(
        dispatcher.submit_async(target.clone(), 99, None),
        Err(SubmitError::QueueFull)
    );

    // Let exactly one item finish; exactly one slot frees up
    gate_tx.send(()).unwrap();
    assert!(wait_for(Duration::from_secs(5), || {
        let stats = dispatcher.stats();
        stats.executed == 1 && stats.queued == 2
    }));

    dispatcher.submit_async(target.clone(), 4, None).unwrap();
    assert_eq!(
        dispatcher.submit_async(target, 99, None),
        Err(SubmitError::QueueFull)
    );

    for _ in 0..4 {
        gate_tx.send(()).unwrap();
    }
    assert!(wait_for(Duration::from_secs(5), || {
        dispatcher.stats().executed == 5
    }));
    assert_eq!(*log.lock(), vec![0, 1, 2, 3, 4]);

    dispatcher.shutdown();
}

#[test]
fn test_sync_round_trip_returns_after_target_ran() {
    let dispatcher = Dispatcher::new(DispatchConfig::default());
    let ran = Arc::new(AtomicBool::new(false));
    let target: Arc<dyn TaskTarget> = {
        let ran = ran.clone();
        Arc::new(move |_: i32, _: Option<&[u8]>| {
            ran.store(true, Ordering::SeqCst);
            42
        })
    };

    assert_eq!(dispatcher.submit_sync(target, 0, None), Ok(42));
    // The caller can only observe its result after the target finished
    assert!(ran.load(Ordering::SeqCst));

    dispatcher.shutdown();
}

#[test]
fn test_async_payload_is_duplicated_up_front() {
    let dispatcher = Dispatcher::new(DispatchConfig::default());
    let log = Arc::new(Mutex::new(Vec::new()));
    let (gate_tx, gate_rx) = flume::unbounded::<()>();
    let blocker = gated_target(gate_rx, log.clone());

    let seen = Arc::new(Mutex::new(None));
    let inspector: Arc<dyn TaskTarget> = {
        let seen = seen.clone();
        Arc::new(move |_: i32, payload: Option<&[u8]>| {
            *seen.lock() = Some(payload.map(<[u8]>::to_vec));
            0
        })
    };

    // Park the loop so the payload task stays queued
    dispatcher.submit_async(blocker, 0, None).unwrap();
    assert!(wait_for(Duration::from_secs(5), || {
        dispatcher.stats().queued == 0
    }));

    let mut buffer = vec![1u8, 2, 3, 4];
    dispatcher
        .submit_async(inspector, 0, Some(&buffer))
        .unwrap();

    // Caller reuses its buffer before the task runs; the slot's duplicate
    // must be unaffected
    buffer.fill(0xff);
    gate_tx.send(()).unwrap();

    assert!(wait_for(Duration::from_secs(5), || {
        dispatcher.stats().executed == 2
    }));
    assert_eq!(*seen.lock(), Some(Some(vec![1, 2, 3, 4])));

    dispatcher.shutdown();
}

#[test]
fn test_submission_from_inside_a_target_is_drained() {
    let dispatcher = Dispatcher::new(DispatchConfig::default());
    let log = Arc::new(Mutex::new(Vec::new()));
    let follow_up = recording_target(log.clone());

    let first: Arc<dyn TaskTarget> = {
        let dispatcher = dispatcher.clone();
        let log = log.clone();
        Arc::new(move |_: i32, _: Option<&[u8]>| {
            log.lock().push(1);
            dispatcher.submit_async(follow_up.clone(), 2, None).unwrap();
            0
        })
    };

    dispatcher.submit_async(first, 1, None).unwrap();

    assert!(wait_for(Duration::from_secs(5), || {
        dispatcher.stats().executed == 2
    }));
    assert_eq!(*log.lock(), vec![1, 2]);

    dispatcher.shutdown();
}

#[test]
#[serial]
fn test_teardown_unblocks_sync_submitter() {
    let dispatcher = Dispatcher::new(DispatchConfig::with_capacity(8));
    let log = Arc::new(Mutex::new(Vec::new()));
    let (gate_tx, gate_rx) = flume::unbounded::<()>();
    let blocker = gated_target(gate_rx, log);

    // Occupy the loop so the sync submission stays queued
    dispatcher.submit_async(blocker, 0, None).unwrap();
    assert!(wait_for(Duration::from_secs(5), || {
        dispatcher.stats().queued == 0
    }));

    let waiter = {
        let dispatcher = dispatcher.clone();
        thread::spawn(move || {
            let target: Arc<dyn TaskTarget> = Arc::new(|_: i32, _: Option<&[u8]>| 7);
            dispatcher.submit_sync(target, 0, Some(b"queued payload"))
        })
    };
    assert!(wait_for(Duration::from_secs(5), || {
        dispatcher.stats().queued == 1
    }));

    let teardown = {
        let dispatcher = dispatcher.clone();
        thread::spawn(move || dispatcher.shutdown())
    };

    // Give teardown time to flag shutdown, then let the blocker finish so
    // the loop can observe the flag and stop
    thread::sleep(Duration::from_millis(100));
    gate_tx.send(()).unwrap();

    // The blocked submitter is released with the sentinel, never the
    // target's real code
    assert_eq!(waiter.join().unwrap(), Ok(RESULT_ABORTED));
    teardown.join().unwrap();

    let stats = dispatcher.stats();
    assert_eq!(stats.aborted, 1);
    assert_eq!(stats.queued, 0);

    // And the dispatcher stays closed
    let target: Arc<dyn TaskTarget> = Arc::new(|_: i32, _: Option<&[u8]>| 0);
    assert_eq!(
        dispatcher.submit_async(target, 0, None),
        Err(SubmitError::Closed)
    );
}

#[test]
#[serial]
fn test_targets_never_run_concurrently() {
    use rand::Rng;

    const PRODUCERS: usize = 8;
    const PER_PRODUCER: usize = 200;

    let dispatcher = Dispatcher::new(DispatchConfig::default());
    let active = Arc::new(AtomicUsize::new(0));
    let max_active = Arc::new(AtomicUsize::new(0));

    let target: Arc<dyn TaskTarget> = {
        let active = active.clone();
        let max_active = max_active.clone();
        Arc::new(move |_: i32, payload: Option<&[u8]>| {
            let now = active.fetch_add(1, Ordering::SeqCst) + 1;
            max_active.fetch_max(now, Ordering::SeqCst);
            // Touch the payload so the duplicate isn't optimized away
            let checksum = payload.map_or(0, |p| p.iter().map(|b| *b as i32).sum());
            active.fetch_sub(1, Ordering::SeqCst);
            checksum
        })
    };

    let producers: Vec<_> = (0..PRODUCERS)
        .map(|_| {
            let dispatcher = dispatcher.clone();
            let target = target.clone();
            thread::spawn(move || {
                let mut rng = rand::thread_rng();
                for i in 0..PER_PRODUCER {
                    let payload = vec![rng.gen::<u8>(); rng.gen_range(0..64)];
                    loop {
                        match dispatcher.submit_async(target.clone(), i as i32, Some(&payload)) {
                            Ok(()) => break,
                            Err(SubmitError::QueueFull) => thread::yield_now(),
                            Err(err) => panic!("unexpected submit error: {err}"),
                        }
                    }
                }
            })
        })
        .collect();

    for producer in producers {
        producer.join().unwrap();
    }

    let total = (PRODUCERS * PER_PRODUCER) as u64;
    assert!(wait_for(Duration::from_secs(10), || {
        dispatcher.stats().executed == total
    }));
    assert_eq!(max_active.load(Ordering::SeqCst), 1);

    dispatcher.shutdown();
}

#[test]
fn test_shutdown_on_drop_releases_queued_work() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let (gate_tx, gate_rx) = flume::unbounded::<()>();

    {
        let dispatcher = Dispatcher::new(DispatchConfig::with_capacity(8));
        let blocker = gated_target(gate_rx, log.clone());
        dispatcher.submit_async(blocker, 0, None).unwrap();
        gate_tx.send(()).unwrap();
        assert!(wait_for(Duration::from_secs(5), || {
            dispatcher.stats().executed == 1
        }));
        // Dropping the last handle tears the dispatcher down cleanly
    }

    assert_eq!(*log.lock(), vec![0]);
}
