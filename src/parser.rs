// src/parser.rs

use crate::command::{CommandCode, RequestShape};
use crate::crc;
use crate::error::SbusError;
use crate::frame::Symbol;
use crate::request::{Request, MAX_PAYLOAD};

use core::convert::TryFrom;

/// A request frame decoded out of a symbol window.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ParsedRequest {
    /// The decoded request record.
    pub request: Request,
    /// Leading symbols of the window the frame occupied, noise prefix
    /// included. Drop this many symbols before parsing again.
    pub consumed: usize,
}

/// Decodes the first complete request frame found in `window`.
///
/// The parser is built for streaming: hand it whatever contiguous run of
/// symbols has arrived so far, act on the outcome, compact the window and
/// call again. It is pure and restartable; the same window always yields
/// the same result.
///
/// * `Ok(parsed)`: a frame was decoded; drop `parsed.consumed` symbols.
/// * [`SbusError::FrameNotFound`]: no address symbol in the window.
/// * [`SbusError::Incomplete`]: a frame has started at offset `sync` but
///   has not fully arrived; drop the prefix before `sync` and wait.
/// * [`SbusError::InvalidData`]: the frame is structurally broken; drop
///   `advance` symbols, or resynchronize by other means when it is `0`.
/// * [`SbusError::UnknownCommand`]: the command byte is not in the
///   catalog; the window is left to the caller.
/// * [`SbusError::CrcMismatch`]: well-formed frame, bad checksum; drop
///   `consumed` symbols to step past it.
pub fn parse_request(window: &[Symbol]) -> Result<ParsedRequest, SbusError> {
    let start = window
        .iter()
        .position(|symbol| symbol.is_address())
        .ok_or(SbusError::FrameNotFound)?;
    let destination = window[start].byte();

    if start + 3 > window.len() {
        return Err(SbusError::Incomplete { sync: start });
    }

    // Two frame starts in a row; the first one cannot be a frame.
    if window[start + 1].is_address() {
        return Err(SbusError::InvalidData { advance: start + 1 });
    }

    let command = CommandCode::try_from(window[start + 1].byte())?;
    let payload = &window[start + 2..];
    let need = match payload_extent(command, payload) {
        Ok(need) => need,
        Err(SbusError::Incomplete { .. }) => return Err(SbusError::Incomplete { sync: start }),
        Err(other) => return Err(other),
    };

    // The payload must consist of data symbols only.
    if payload[..need].iter().any(|symbol| symbol.is_address()) {
        return Err(SbusError::InvalidData { advance: 0 });
    }

    let mut bytes = [0u8; MAX_PAYLOAD];
    for (slot, symbol) in bytes.iter_mut().zip(&payload[..need]) {
        *slot = symbol.byte();
    }
    let request = Request::new(destination, command, &bytes[..need])?;

    if start + 2 + need + 2 > window.len() {
        return Err(SbusError::Incomplete { sync: start });
    }

    let consumed = start + 2 + need + 2;
    let calculated = crc::crc16_symbols(&window[start..start + 2 + need]);
    let expected = u16::from_be_bytes([
        window[start + 2 + need].byte(),
        window[start + 2 + need + 1].byte(),
    ]);
    if calculated != expected {
        return Err(SbusError::CrcMismatch {
            expected,
            calculated,
            consumed,
        });
    }

    Ok(ParsedRequest { request, consumed })
}

/// Determines how many payload symbols `command` claims at the head of
/// `payload`, enforcing the per-command count rules.
///
/// Returns [`SbusError::Incomplete`] (with a placeholder offset the caller
/// rewrites) when the payload has not fully arrived, and
/// [`SbusError::InvalidData`] when a count byte can never become valid.
fn payload_extent(command: CommandCode, payload: &[Symbol]) -> Result<usize, SbusError> {
    const INCOMPLETE: SbusError = SbusError::Incomplete { sync: 0 };
    const INVALID: SbusError = SbusError::InvalidData { advance: 0 };

    match command.request_shape() {
        RequestShape::Empty => Ok(0),

        RequestShape::Fixed(need) => {
            if payload.len() < need {
                return Err(INCOMPLETE);
            }
            Ok(need)
        }

        RequestShape::CountedWords => {
            let count = payload.first().ok_or(INCOMPLETE)?.byte() as usize;
            if !(5..=129).contains(&count) || (count - 1) % 4 != 0 {
                return Err(INVALID);
            }
            let need = 2 + count;
            if payload.len() < need {
                return Err(INCOMPLETE);
            }
            Ok(need)
        }

        RequestShape::CountedBits => {
            if payload.len() < 3 {
                return Err(INCOMPLETE);
            }
            let count = payload[0].byte() as usize;
            if !(2..=17).contains(&count) || payload[2].byte() > 127 {
                return Err(INVALID);
            }
            let need = 2 + count;
            if payload.len() < need {
                return Err(INCOMPLETE);
            }
            Ok(need)
        }
    }
}
