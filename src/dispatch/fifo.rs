//! Inter-core word FIFO.
//!
//! Two bounded `embassy-sync` channels of depth [`FIFO_DEPTH`] model the
//! bidirectional hardware queue between the cores. Each core owns one
//! [`ChannelFifo`] end: it pushes into one channel and pops from the other.
//!
//! ```text
//! ┌───────────────┐   to_worker (3 words)   ┌───────────────┐
//! │ Control core  │────────────────────────▶│  Worker core  │
//! │  (CoreLink)   │◀────────────────────────│ (WorkerCore)  │
//! └───────────────┘   to_control (3 words)  └───────────────┘
//! ```

use std::sync::Arc;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

/// Depth of each direction.
pub const FIFO_DEPTH: usize = 3;

type WordChannel = Channel<CriticalSectionRawMutex, u32, FIFO_DEPTH>;

/// One end of the inter-core queue.
pub trait Fifo {
    /// Push a word if there is room. Returns `false` when full.
    fn try_push(&mut self, word: u32) -> bool;

    /// Pop the oldest inbound word, if any.
    fn try_pop(&mut self) -> Option<u32>;

    /// Number of inbound words waiting.
    fn available(&self) -> usize;

    /// Push, spinning while the queue is full.
    fn push(&mut self, word: u32) {
        while !self.try_push(word) {
            core::hint::spin_loop();
        }
    }
}

/// Channel-backed FIFO end.
pub struct ChannelFifo {
    tx: Arc<WordChannel>,
    rx: Arc<WordChannel>,
}

/// Create the connected `(control, worker)` ends.
pub fn fifo_pair() -> (ChannelFifo, ChannelFifo) {
    let to_worker = Arc::new(WordChannel::new());
    let to_control = Arc::new(WordChannel::new());
    let control = ChannelFifo {
        tx: Arc::clone(&to_worker),
        rx: Arc::clone(&to_control),
    };
    let worker = ChannelFifo {
        tx: to_control,
        rx: to_worker,
    };
    (control, worker)
}

impl Fifo for ChannelFifo {
    fn try_push(&mut self, word: u32) -> bool {
        self.tx.try_send(word).is_ok()
    }

    fn try_pop(&mut self) -> Option<u32> {
        self.rx.try_receive().ok()
    }

    fn available(&self) -> usize {
        self.rx.len()
    }
}
