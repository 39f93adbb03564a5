//! Integration tests for the cross-core dispatch protocol.
//!
//! A real worker thread runs `WorkerCore::poll_once` against the same
//! pool the registry owns, talking to the registry's `CoreLink` over the
//! 3-word FIFO pair.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::mock_device::{RecordingDevice, RecordingSink, SLOW_MESSAGE_ID, journal};

use expander::adapters::time::MonotonicClock;
use expander::app::ports::AttachParams;
use expander::app::service::DeviceRegistry;
use expander::arena::Arena;
use expander::dispatch::fifo::{ChannelFifo, fifo_pair};
use expander::dispatch::link::CoreLink;
use expander::dispatch::mailbox::PayloadMailbox;
use expander::error::DispatchError;
use expander::protocol::MESSAGE_ID_POWER_SAVING;
use expander::slots::SharedPool;
use expander::worker::{WorkerCore, WorkerSettings};

type Link = CoreLink<ChannelFifo, MonotonicClock>;
type Registry = DeviceRegistry<RecordingDevice, Link, RecordingSink>;

const HANDSHAKE_TIMEOUT_MS: u32 = 2_000;

/// Worker thread that stops and joins on drop.
struct WorkerThread {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Drop for WorkerThread {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn spawn_worker(pool: SharedPool<RecordingDevice>, settings: WorkerSettings) -> (Link, WorkerThread) {
    let (control, worker_end) = fifo_pair();
    let mailbox = Arc::new(PayloadMailbox::new());
    let mut worker = WorkerCore::new(
        pool,
        worker_end,
        Arc::clone(&mailbox),
        MonotonicClock::new(),
        settings,
    );

    let stop = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&stop);
    let handle = std::thread::spawn(move || {
        worker.announce_ready();
        while !flag.load(Ordering::SeqCst) {
            worker.poll_once();
            std::thread::yield_now();
        }
    });

    let link = CoreLink::new(
        control,
        mailbox,
        MonotonicClock::new(),
        Some(HANDSHAKE_TIMEOUT_MS),
    );
    (
        link,
        WorkerThread {
            stop,
            handle: Some(handle),
        },
    )
}

fn make_registry(count: u16, settings: WorkerSettings) -> (Registry, Arena, WorkerThread) {
    let mut arena = Arena::new(8 * 1024);
    let pool = SharedPool::default();
    let (link, worker) = spawn_worker(pool.clone(), settings);
    let mut reg = DeviceRegistry::new(pool, link, RecordingSink::default());
    reg.setup_array(&mut arena, count).unwrap();
    (reg, arena, worker)
}

fn no_polling() -> WorkerSettings {
    WorkerSettings {
        device_has_update: false,
        poll_interval_ms: None,
    }
}

fn params(pin: u16) -> AttachParams {
    AttachParams::new(pin, 1, 0, pin % 2 == 0)
}

/// Wait until `f` holds or the deadline passes.
fn eventually(mut f: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if f() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    false
}

// ── Delivery ──────────────────────────────────────────────────

#[test]
fn set_returns_after_worker_applied_it() {
    let (mut reg, _arena, _worker) = make_registry(4, no_polling());
    reg.add(params(1));
    reg.add(params(2));

    assert_eq!(reg.on_set(0, 5, "hello"), Ok(true));

    // No waiting: the handshake guarantees `set` already returned.
    assert_eq!(journal(reg.pool(), 0).sets(), vec![(5, "hello".to_string())]);
    assert!(journal(reg.pool(), 1).sets().is_empty());
    assert!(reg.dispatcher().holds_ready());
}

#[test]
fn out_of_range_never_reaches_the_fifo() {
    let (mut reg, _arena, _worker) = make_registry(2, no_polling());
    reg.add(params(1));

    assert_eq!(reg.on_set(1, 5, "x"), Ok(false));
    assert_eq!(reg.on_set(-1, 5, "x"), Ok(false));
    assert!(!reg.dispatcher().holds_ready(), "no handshake started");
    assert!(journal(reg.pool(), 0).sets().is_empty());
}

#[test]
fn back_to_back_sets_never_overlap() {
    let (mut reg, _arena, _worker) = make_registry(2, no_polling());
    reg.add(params(1));
    reg.add(params(2));

    reg.on_set(0, SLOW_MESSAGE_ID, "first").unwrap();
    reg.on_set(1, SLOW_MESSAGE_ID, "second").unwrap();

    let first = journal(reg.pool(), 0).set_spans();
    let second = journal(reg.pool(), 1).set_spans();
    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);

    let (seq0, _, finished0) = first[0];
    let (seq1, started1, _) = second[0];
    assert!(seq0 < seq1);
    assert!(
        started1 >= finished0,
        "second set started before the first returned"
    );
}

#[test]
fn power_save_serialized_through_worker() {
    let (mut reg, _arena, _worker) = make_registry(3, no_polling());
    for pin in 0..3 {
        reg.add(params(pin));
    }

    reg.power_save(true).unwrap();
    reg.power_save(false).unwrap();

    let mut all = Vec::new();
    for index in 0..3 {
        let dev = journal(reg.pool(), index);
        assert_eq!(
            dev.sets(),
            vec![
                (MESSAGE_ID_POWER_SAVING, "1".to_string()),
                (MESSAGE_ID_POWER_SAVING, "0".to_string()),
            ]
        );
        for (seq, ..) in dev.set_spans() {
            all.push((seq, index));
        }
    }
    all.sort_unstable();
    let order: Vec<usize> = all.iter().map(|&(_, index)| index).collect();
    assert_eq!(order, vec![0, 1, 2, 0, 1, 2]);
}

// ── Worker polling ────────────────────────────────────────────

#[test]
fn stop_and_restart_worker_polling() {
    let settings = WorkerSettings {
        device_has_update: true,
        poll_interval_ms: Some(1),
    };
    let (mut reg, _arena, _worker) = make_registry(1, settings);
    reg.add(params(1));

    assert!(eventually(|| journal(reg.pool(), 0).update_count() > 0));

    reg.stop_worker_updates(true).unwrap();
    // The control frame is acknowledged only after the flag is set, so
    // no update pass starts after this point.
    let frozen = journal(reg.pool(), 0).update_count();
    std::thread::sleep(Duration::from_millis(20));
    assert_eq!(journal(reg.pool(), 0).update_count(), frozen);

    reg.stop_worker_updates(false).unwrap();
    assert!(eventually(|| journal(reg.pool(), 0).update_count() > frozen));
}

#[test]
fn control_core_update_is_a_no_op() {
    let (mut reg, _arena, _worker) = make_registry(1, no_polling());
    reg.add(params(1));
    reg.update();
    reg.update();
    assert_eq!(journal(reg.pool(), 0).update_count(), 0);
}

// ── Failure modes ─────────────────────────────────────────────

#[test]
fn silent_worker_times_out() {
    let mut arena = Arena::new(8 * 1024);
    let pool = SharedPool::<RecordingDevice>::default();
    // Worker end created but never served.
    let (control, _worker_end) = fifo_pair();
    let link = CoreLink::new(
        control,
        Arc::new(PayloadMailbox::new()),
        MonotonicClock::new(),
        Some(20),
    );
    let mut reg = DeviceRegistry::new(pool, link, RecordingSink::default());
    reg.setup_array(&mut arena, 1).unwrap();
    reg.add(params(1));

    assert_eq!(reg.on_set(0, 1, "x"), Err(DispatchError::HandshakeTimeout));
    assert!(journal(reg.pool(), 0).sets().is_empty());
}
