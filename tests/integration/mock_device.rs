//! Mock devices and ports for integration tests.
//!
//! Every device call is journaled with a process-wide sequence number and
//! wall-clock timestamps, so tests can assert on call order across
//! devices (and across cores) without touching real peripherals.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use expander::app::events::RegistryEvent;
use expander::app::ports::{AttachParams, CommandArgs, CustomDevice, EventSink};
use expander::slots::SharedPool;

/// Message id whose `set` takes a few milliseconds, to widen race windows.
pub const SLOW_MESSAGE_ID: i16 = 99;
const SLOW_SET: Duration = Duration::from_millis(5);

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

fn next_seq() -> u64 {
    SEQUENCE.fetch_add(1, Ordering::SeqCst)
}

// ── Device call record ────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    Attach(AttachParams),
    Detach,
    Update,
    Set {
        message_id: i16,
        payload: String,
        started: Instant,
        finished: Instant,
    },
}

#[derive(Debug, Clone)]
pub struct Entry {
    pub seq: u64,
    pub call: DeviceCall,
}

// ── RecordingDevice ───────────────────────────────────────────

#[derive(Debug, Default)]
pub struct RecordingDevice {
    pub journal: Vec<Entry>,
}

#[allow(dead_code)]
impl RecordingDevice {
    pub fn sets(&self) -> Vec<(i16, String)> {
        self.journal
            .iter()
            .filter_map(|e| match &e.call {
                DeviceCall::Set {
                    message_id,
                    payload,
                    ..
                } => Some((*message_id, payload.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn detach_seqs(&self) -> Vec<u64> {
        self.journal
            .iter()
            .filter(|e| e.call == DeviceCall::Detach)
            .map(|e| e.seq)
            .collect()
    }

    pub fn attach_params(&self) -> Vec<AttachParams> {
        self.journal
            .iter()
            .filter_map(|e| match e.call {
                DeviceCall::Attach(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    pub fn update_count(&self) -> usize {
        self.journal
            .iter()
            .filter(|e| e.call == DeviceCall::Update)
            .count()
    }

    /// `(seq, started, finished)` of every `set` call.
    pub fn set_spans(&self) -> Vec<(u64, Instant, Instant)> {
        self.journal
            .iter()
            .filter_map(|e| match e.call {
                DeviceCall::Set {
                    started, finished, ..
                } => Some((e.seq, started, finished)),
                _ => None,
            })
            .collect()
    }

    fn record(&mut self, call: DeviceCall) {
        self.journal.push(Entry {
            seq: next_seq(),
            call,
        });
    }
}

impl CustomDevice for RecordingDevice {
    fn attach(&mut self, params: &AttachParams) {
        self.record(DeviceCall::Attach(*params));
    }

    fn detach(&mut self) {
        self.record(DeviceCall::Detach);
    }

    fn update(&mut self) {
        self.record(DeviceCall::Update);
    }

    fn set(&mut self, message_id: i16, payload: &str) {
        let started = Instant::now();
        if message_id == SLOW_MESSAGE_ID {
            std::thread::sleep(SLOW_SET);
        }
        self.record(DeviceCall::Set {
            message_id,
            payload: payload.to_string(),
            started,
            finished: Instant::now(),
        });
    }
}

/// Snapshot of the journal of device `index`.
#[allow(dead_code)]
pub fn journal(pool: &SharedPool<RecordingDevice>, index: usize) -> RecordingDevice {
    pool.with(|p| RecordingDevice {
        journal: p
            .device(index)
            .map(|d| d.journal.clone())
            .unwrap_or_default(),
    })
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<RegistryEvent>,
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &RegistryEvent) {
        self.events.push(event.clone());
    }
}

// ── ScriptedArgs ──────────────────────────────────────────────

/// Command frame with pre-loaded arguments.
#[allow(dead_code)]
pub struct ScriptedArgs {
    ints: VecDeque<i16>,
    text: String,
    pub reads: usize,
}

#[allow(dead_code)]
impl ScriptedArgs {
    pub fn new(index: i16, message_id: i16, text: &str) -> Self {
        Self {
            ints: VecDeque::from([index, message_id]),
            text: text.to_string(),
            reads: 0,
        }
    }
}

impl CommandArgs for ScriptedArgs {
    fn read_i16_arg(&mut self) -> i16 {
        self.reads += 1;
        self.ints.pop_front().unwrap_or(0)
    }

    fn read_string_arg(&mut self) -> &str {
        self.reads += 1;
        &self.text
    }
}
