//! Unified error types for the expander firmware.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! command-handling path uniform. All variants are `Copy` so they can be
//! passed back through the registry and the dispatch link without
//! allocation.
//!
//! None of these are fatal: capacity problems are reported to the caller,
//! which refuses the operation and keeps its existing state.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The memory arena could not satisfy a request.
    Arena(ArenaError),
    /// The cross-core handshake failed.
    Dispatch(DispatchError),
    /// A 3-word frame could not be decoded.
    Frame(FrameError),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Arena(e) => write!(f, "arena: {e}"),
            Self::Dispatch(e) => write!(f, "dispatch: {e}"),
            Self::Frame(e) => write!(f, "frame: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Arena errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArenaError {
    /// Not enough bytes left between the cursor and the end of the arena.
    Exhausted { requested: usize, remaining: usize },
    /// `count * slot size` does not fit in `usize`.
    SizeOverflow,
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted {
                requested,
                remaining,
            } => write!(f, "exhausted ({requested} B requested, {remaining} B left)"),
            Self::SizeOverflow => write!(f, "allocation size overflow"),
        }
    }
}

impl From<ArenaError> for Error {
    fn from(e: ArenaError) -> Self {
        Self::Arena(e)
    }
}

// ---------------------------------------------------------------------------
// Dispatch errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchError {
    /// The worker core did not answer within the configured timeout.
    HandshakeTimeout,
    /// A handshake word other than the expected token was read back.
    Desync(u32),
    /// The previous payload has not been taken by the worker yet.
    PayloadBusy,
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HandshakeTimeout => write!(f, "worker core handshake timed out"),
            Self::Desync(word) => write!(f, "unexpected handshake word {word:#010x}"),
            Self::PayloadBusy => write!(f, "payload mailbox still occupied"),
        }
    }
}

impl From<DispatchError> for Error {
    fn from(e: DispatchError) -> Self {
        Self::Dispatch(e)
    }
}

// ---------------------------------------------------------------------------
// Frame errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// Negative device index that is not a known control sentinel.
    UnknownSentinel(i32),
    /// Device index above the addressable range.
    IndexOutOfRange(u32),
    /// Message id does not fit in an `i16`.
    MessageIdOutOfRange(u32),
    /// Control command argument is not 0 or 1.
    ControlArg(u32),
    /// Control frame filler word is not zero.
    ControlFiller(u32),
    /// Announced payload length exceeds the payload capacity.
    PayloadTooLong(u32),
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownSentinel(v) => write!(f, "unknown control sentinel {v}"),
            Self::IndexOutOfRange(v) => write!(f, "device index {v} out of range"),
            Self::MessageIdOutOfRange(v) => write!(f, "message id word {v:#010x} out of range"),
            Self::ControlArg(v) => write!(f, "control argument {v} is not a boolean"),
            Self::ControlFiller(v) => write!(f, "control filler word {v} is not zero"),
            Self::PayloadTooLong(v) => write!(f, "payload length {v} exceeds capacity"),
        }
    }
}

impl From<FrameError> for Error {
    fn from(e: FrameError) -> Self {
        Self::Frame(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
