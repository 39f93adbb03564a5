//! Worker-core loop.
//!
//! Permanent residency of the second core. Each pass it
//!
//! 1. runs `update()` on every registered device when the poll interval
//!    elapsed (unless the control core stopped local polling), then
//! 2. checks whether a complete 3-word frame is waiting and, if so,
//!    executes it and answers with the handshake tokens.
//!
//! The loop never blocks: with fewer than three words queued it falls
//! straight through, so device polling is never starved by an idle FIFO.
//! A partially pushed frame is left alone until it is complete.

use std::sync::Arc;

use log::{debug, info, warn};

use crate::app::ports::{Clock, CustomDevice};
use crate::dispatch::fifo::Fifo;
use crate::dispatch::frame::{ControlCommand, FRAME_WORDS, Frame, Token};
use crate::dispatch::mailbox::PayloadMailbox;
use crate::slots::SharedPool;

/// What a single [`WorkerCore::poll_once`] pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PollOutcome {
    /// Registered devices were updated.
    pub updated: bool,
    /// A frame was consumed (valid or not).
    pub frame: Option<Frame>,
}

/// Polling behaviour of the worker.
#[derive(Debug, Clone, Copy)]
pub struct WorkerSettings {
    /// The device type has a periodic `update()` worth calling.
    pub device_has_update: bool,
    /// Minimum time between update passes; `None` updates every pass.
    pub poll_interval_ms: Option<u32>,
}

pub struct WorkerCore<D, F, C> {
    pool: SharedPool<D>,
    fifo: F,
    mailbox: Arc<PayloadMailbox>,
    clock: C,
    settings: WorkerSettings,
    last_poll_ms: u32,
    updates_stopped: bool,
}

impl<D, F, C> WorkerCore<D, F, C>
where
    D: CustomDevice + Default,
    F: Fifo,
    C: Clock,
{
    pub fn new(
        pool: SharedPool<D>,
        fifo: F,
        mailbox: Arc<PayloadMailbox>,
        clock: C,
        settings: WorkerSettings,
    ) -> Self {
        let last_poll_ms = clock.now_ms();
        Self {
            pool,
            fifo,
            mailbox,
            clock,
            settings,
            last_poll_ms,
            updates_stopped: false,
        }
    }

    /// Tell the control core the worker is ready for its first frame.
    pub fn announce_ready(&mut self) {
        self.fifo.push(Token::Ready.word());
        info!("Worker core ready");
    }

    pub fn updates_stopped(&self) -> bool {
        self.updates_stopped
    }

    /// One loop pass. Never blocks.
    pub fn poll_once(&mut self) -> PollOutcome {
        let mut outcome = PollOutcome::default();

        if self.settings.device_has_update && self.poll_due() {
            if !self.updates_stopped {
                self.pool.with(|p| p.update_active());
                outcome.updated = true;
            }
            self.last_poll_ms = self.clock.now_ms();
        }

        if self.fifo.available() == FRAME_WORDS {
            outcome.frame = self.serve_frame();
        }

        outcome
    }

    /// Run forever.
    pub fn run(mut self) -> ! {
        self.announce_ready();
        loop {
            self.poll_once();
        }
    }

    fn poll_due(&self) -> bool {
        match self.settings.poll_interval_ms {
            Some(interval) => self.clock.now_ms().wrapping_sub(self.last_poll_ms) >= interval,
            None => true,
        }
    }

    /// Pop and execute one frame. Always answers with `Ready`, so the
    /// control core is never left waiting on a frame we could not use.
    fn serve_frame(&mut self) -> Option<Frame> {
        let mut words = [0u32; FRAME_WORDS];
        for word in &mut words {
            // `available() == FRAME_WORDS` was checked; only this core pops.
            *word = self.fifo.try_pop()?;
        }

        let decoded = Frame::decode(words);
        match decoded {
            Ok(Frame::Update {
                index,
                message_id,
                payload_len,
            }) => self.apply_update(usize::from(index), message_id, usize::from(payload_len)),
            Ok(Frame::Control(ControlCommand::StopUpdates(stop))) => {
                self.updates_stopped = stop;
                info!(
                    "Worker core: periodic updates {}",
                    if stop { "stopped" } else { "resumed" }
                );
                self.fifo.push(Token::ControlDone.word());
            }
            Err(e) => {
                warn!("Worker core: dropping frame {:x?}: {}", words, e);
                // The payload of a rejected update would otherwise block
                // the next one.
                self.mailbox.take();
            }
        }

        self.fifo.push(Token::Ready.word());
        decoded.ok()
    }

    fn apply_update(&mut self, index: usize, message_id: i16, payload_len: usize) {
        let Some(payload) = self.mailbox.take() else {
            warn!("Worker core: update for device {} without payload", index);
            return;
        };
        if payload.len() != payload_len {
            warn!(
                "Worker core: payload length {} != announced {}, dropping",
                payload.len(),
                payload_len
            );
            return;
        }

        let delivered = self.pool.with(|p| p.set(index, message_id, &payload));
        if delivered {
            debug!("Worker core: set({}, ..) on device {}", message_id, index);
        } else {
            debug!("Worker core: device {} not registered, dropped", index);
        }
    }
}
