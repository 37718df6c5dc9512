// src/error.rs

use crate::command::CommandCode;

/// Everything that can go wrong while encoding or decoding S-Bus frames.
///
/// Decoding errors double as cursor guidance for streaming callers: the
/// offsets they carry say how much of the caller's window is settled and
/// where decoding should resume once more symbols arrive.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SbusError {
    /// The window holds a prefix of a valid frame; more symbols are needed.
    /// Everything before `sync` is noise and can be dropped; the frame
    /// itself starts at `sync`.
    #[error("incomplete frame, resume at offset {sync}")]
    Incomplete { sync: usize },

    /// Structural violation that appending more symbols cannot repair.
    /// `advance` leading symbols may be dropped safely; `0` means the
    /// caller must pick its own resynchronization point.
    #[error("malformed frame data")]
    InvalidData { advance: usize },

    /// The command byte is not part of the catalog.
    #[error("unknown command code {0:#04x}")]
    UnknownCommand(u8),

    /// No address symbol anywhere in the window.
    #[error("no frame start found")]
    FrameNotFound,

    /// An address symbol appeared where a response body was expected.
    /// The `offset` leading symbols belong to the aborted exchange; what
    /// follows is the start of a new frame.
    #[error("unexpected address symbol at offset {offset}")]
    UnexpectedAddress { offset: usize },

    /// Framing was correct but the checksum did not match. `consumed`
    /// spans the whole frame so the caller can step past it.
    #[error("CRC mismatch: expected {expected:#06x}, calculated {calculated:#06x}")]
    CrcMismatch {
        expected: u16,
        calculated: u16,
        consumed: usize,
    },

    /// The provided buffer cannot hold the frame.
    #[error("buffer overflow: needed {needed}, got {got}")]
    BufferOverflow { needed: usize, got: usize },

    /// The request's command does not support the attempted operation.
    #[error("operation not valid for command {0:?}")]
    WrongCommand(CommandCode),

    /// A register or bit count outside the range the protocol can encode.
    #[error("count {0} cannot be encoded")]
    InvalidCount(u16),

    /// The value slice does not match the count the request declared.
    #[error("count mismatch: request declares {expected}, got {got}")]
    CountMismatch { expected: usize, got: usize },

    /// Text rendering failed.
    #[error("formatting failed")]
    FormatFailed,
}

impl From<core::fmt::Error> for SbusError {
    fn from(_: core::fmt::Error) -> Self {
        SbusError::FormatFailed
    }
}
