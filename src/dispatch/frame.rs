//! 3-word dispatch frames.
//!
//! Wire format (one `u32` per word, pushed in order):
//! ```text
//! ┌──────────────┬──────────────────┬──────────────┐
//! │ device index │ message id (i16, │ payload len  │   update
//! │              │  sign-extended)  │              │
//! ├──────────────┼──────────────────┼──────────────┤
//! │ -1 sentinel  │ stop (0 | 1)     │ 0            │   control
//! └──────────────┴──────────────────┴──────────────┘
//! ```
//!
//! Inside the firmware the two kinds are a tagged [`Frame`]; the sentinel
//! only exists on the wire.

use crate::error::FrameError;
use crate::protocol::{PAYLOAD_CAPACITY, START_STOP_WORKER};

/// Every exchange is exactly this many words.
pub const FRAME_WORDS: usize = 3;

/// Out-of-band commands for the worker core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    /// Stop (true) or restart (false) periodic device updates.
    StopUpdates(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    /// Deliver the mailbox payload to `set(message_id, ..)` of slot `index`.
    Update {
        index: u16,
        message_id: i16,
        payload_len: u16,
    },
    Control(ControlCommand),
}

/// Words the worker pushes back to the control core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Token {
    /// Worker is idle; the previous frame has been fully applied.
    Ready = 1,
    /// A control command has been executed.
    ControlDone = 2,
}

impl Token {
    pub const fn word(self) -> u32 {
        self as u32
    }
}

impl Frame {
    pub fn encode(&self) -> [u32; FRAME_WORDS] {
        match *self {
            Self::Update {
                index,
                message_id,
                payload_len,
            } => [
                u32::from(index),
                i32::from(message_id) as u32,
                u32::from(payload_len),
            ],
            Self::Control(ControlCommand::StopUpdates(stop)) => {
                [i32::from(START_STOP_WORKER) as u32, u32::from(stop), 0]
            }
        }
    }

    pub fn decode(words: [u32; FRAME_WORDS]) -> Result<Self, FrameError> {
        let [head, second, third] = words;

        let head_signed = head as i32;
        if head_signed < 0 {
            if head_signed != i32::from(START_STOP_WORKER) {
                return Err(FrameError::UnknownSentinel(head_signed));
            }
            let stop = match second {
                0 => false,
                1 => true,
                other => return Err(FrameError::ControlArg(other)),
            };
            if third != 0 {
                return Err(FrameError::ControlFiller(third));
            }
            return Ok(Self::Control(ControlCommand::StopUpdates(stop)));
        }

        let index = u16::try_from(head).map_err(|_| FrameError::IndexOutOfRange(head))?;
        let message_id = i16::try_from(second as i32)
            .map_err(|_| FrameError::MessageIdOutOfRange(second))?;
        if third as usize > PAYLOAD_CAPACITY {
            return Err(FrameError::PayloadTooLong(third));
        }

        Ok(Self::Update {
            index,
            message_id,
            payload_len: third as u16,
        })
    }
}
