//! Control-core end of the cross-core dispatch protocol.
//!
//! The FIFO is used as a synchronous rendezvous, never as a buffered queue.
//! The worker pushes a `Ready` token whenever it is idle; the control core
//! must hold one before it may push a frame.
//!
//! ```text
//!  control                                   worker
//!  ───────                                   ──────
//!                      ◀── Ready             (at start-up)
//!  pop Ready
//!  mailbox.put(payload)
//!  push index, id, len ──▶
//!                                            pop 3 words, mailbox.take()
//!                                            device.set(id, payload)
//!                      ◀── Ready
//!  pop Ready, return
//!
//!  push -1, stop, 0    ──▶                   stop flag = stop
//!                      ◀── ControlDone
//!                      ◀── Ready
//!  pop ControlDone, pop Ready, return
//! ```
//!
//! Every call returns holding the `Ready` token, so the next call can push
//! immediately and at most one frame is ever in flight.
//!
//! Without a handshake timeout a stalled worker blocks the control core
//! forever.

use std::sync::Arc;

use log::{debug, warn};

use super::fifo::Fifo;
use super::frame::{ControlCommand, Frame, Token};
use super::mailbox::PayloadMailbox;
use super::Dispatcher;
use crate::app::ports::Clock;
use crate::error::DispatchError;
use crate::protocol::Payload;
use crate::slots::SharedPool;

pub struct CoreLink<F, C> {
    fifo: F,
    mailbox: Arc<PayloadMailbox>,
    clock: C,
    timeout_ms: Option<u32>,
    /// The worker's `Ready` token has been popped and not yet spent.
    holding_ready: bool,
    /// A control frame went out and its `ControlDone` has not been popped.
    pending_control_done: bool,
}

impl<F: Fifo, C: Clock> CoreLink<F, C> {
    pub fn new(fifo: F, mailbox: Arc<PayloadMailbox>, clock: C, timeout_ms: Option<u32>) -> Self {
        Self {
            fifo,
            mailbox,
            clock,
            timeout_ms,
            holding_ready: false,
            pending_control_done: false,
        }
    }

    /// True when the worker is known to be idle.
    pub fn holds_ready(&self) -> bool {
        self.holding_ready
    }

    /// Spin until a word arrives (or the timeout expires).
    fn pop_word(&mut self) -> Result<u32, DispatchError> {
        let started = self.clock.now_ms();
        loop {
            if let Some(word) = self.fifo.try_pop() {
                return Ok(word);
            }
            if let Some(limit) = self.timeout_ms {
                if self.clock.now_ms().wrapping_sub(started) >= limit {
                    warn!("CoreLink: no answer from worker after {} ms", limit);
                    return Err(DispatchError::HandshakeTimeout);
                }
            }
            core::hint::spin_loop();
        }
    }

    fn expect(&mut self, token: Token) -> Result<(), DispatchError> {
        let word = self.pop_word()?;
        if word == token.word() {
            Ok(())
        } else {
            warn!("CoreLink: expected {:?}, got {:#x}", token, word);
            Err(DispatchError::Desync(word))
        }
    }

    /// Make sure we hold the worker's `Ready` token.
    fn acquire_ready(&mut self) -> Result<(), DispatchError> {
        if !self.holding_ready {
            self.expect(Token::Ready)?;
            self.holding_ready = true;
        }
        Ok(())
    }

    /// Pop the `ControlDone` of an earlier control frame, if still owed.
    fn settle_control(&mut self) -> Result<(), DispatchError> {
        if self.pending_control_done {
            self.expect(Token::ControlDone)?;
            self.pending_control_done = false;
        }
        Ok(())
    }

    fn send(&mut self, frame: Frame) {
        for word in frame.encode() {
            self.fifo.push(word);
        }
        self.holding_ready = false;
    }
}

impl<D, F: Fifo, C: Clock> Dispatcher<D> for CoreLink<F, C> {
    fn dispatch(
        &mut self,
        _pool: &SharedPool<D>,
        index: usize,
        message_id: i16,
        payload: Payload,
    ) -> Result<(), DispatchError> {
        self.settle_control()?;
        self.acquire_ready()?;

        let frame = Frame::Update {
            index: index as u16,
            message_id,
            payload_len: payload.len() as u16,
        };
        self.mailbox.put(payload)?;
        self.send(frame);
        debug!("CoreLink: update for device {} (id {}) sent", index, message_id);

        // The worker only answers after the device's `set` returned.
        self.acquire_ready()
    }

    fn updates_locally(&self) -> bool {
        false
    }

    fn stop_updates(&mut self, stop: bool) -> Result<(), DispatchError> {
        self.settle_control()?;
        self.acquire_ready()?;
        self.send(Frame::Control(ControlCommand::StopUpdates(stop)));
        self.pending_control_done = true;
        self.settle_control()?;
        self.acquire_ready()
    }
}
