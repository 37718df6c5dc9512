// src/request.rs

use crate::command::CommandCode;
use crate::crc;
use crate::error::SbusError;
use crate::frame::{Symbol, BROADCAST_ADDRESS};

use arrayvec::ArrayString;
use core::fmt::{self, Write};

/// Capacity of the inline payload buffer of a [`Request`].
pub const MAX_PAYLOAD: usize = 256;

/// Worst-case length of the textual rendering produced by
/// [`Request::format_into`]: the header line plus five characters per
/// payload byte.
pub const MAX_DISPLAY_LEN: usize = 36 + 5 * MAX_PAYLOAD;

/// A request frame, decoded from the wire or built to be sent.
///
/// The payload lives in an inline 256-byte buffer so that parsing and
/// serializing never touch a heap; only the first `data_len` bytes are
/// meaningful. Records are plain values the caller owns, copies and drops
/// freely.
#[derive(Copy, Clone)]
pub struct Request {
    destination: u8,
    command: CommandCode,
    data_len: u8,
    data: [u8; MAX_PAYLOAD],
}

impl Request {
    /// Builds a request carrying an arbitrary payload.
    ///
    /// Only the payload length is checked here; whether the bytes fit the
    /// command's shape is the parser's concern, on both ends of the wire.
    ///
    /// # Arguments
    ///
    /// * `destination`: station address, or [`BROADCAST_ADDRESS`].
    /// * `command`: the command to issue.
    /// * `payload`: at most 255 payload bytes.
    pub fn new(
        destination: u8,
        command: CommandCode,
        payload: &[u8],
    ) -> Result<Self, SbusError> {
        if payload.len() > u8::MAX as usize {
            return Err(SbusError::BufferOverflow {
                needed: payload.len(),
                got: u8::MAX as usize,
            });
        }
        let mut data = [0u8; MAX_PAYLOAD];
        data[..payload.len()].copy_from_slice(payload);
        Ok(Request {
            destination,
            command,
            data_len: payload.len() as u8,
            data,
        })
    }

    /// Builds a request reading `count` consecutive 32-bit registers
    /// starting at `start`. The wire encodes the count as `count - 1`, so
    /// `count` must lie in `[1, 256]`.
    pub fn read_registers(destination: u8, start: u16, count: u16) -> Result<Self, SbusError> {
        if count == 0 || count > 256 {
            return Err(SbusError::InvalidCount(count));
        }
        let [start_hi, start_lo] = start.to_be_bytes();
        Self::new(
            destination,
            CommandCode::ReadRegister,
            &[(count - 1) as u8, start_hi, start_lo],
        )
    }

    /// Builds a request writing a single 32-bit register at `address`.
    pub fn write_register(destination: u8, address: u16, value: u32) -> Self {
        let [addr_hi, addr_lo] = address.to_be_bytes();
        let [b0, b1, b2, b3] = value.to_be_bytes();
        let mut data = [0u8; MAX_PAYLOAD];
        data[..7].copy_from_slice(&[5, addr_hi, addr_lo, b0, b1, b2, b3]);
        Request {
            destination,
            command: CommandCode::WriteRegister,
            data_len: 7,
            data,
        }
    }

    /// The station address the request is directed at.
    #[inline]
    pub const fn destination(&self) -> u8 {
        self.destination
    }

    /// The command the request issues.
    #[inline]
    pub const fn command(&self) -> CommandCode {
        self.command
    }

    /// The meaningful portion of the payload buffer.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.data[..self.data_len as usize]
    }

    /// Whether the request addresses every station at once.
    #[inline]
    pub const fn is_broadcast(&self) -> bool {
        self.destination == BROADCAST_ADDRESS
    }

    /// Number of elements a counted read asks for; the wire stores
    /// `count - 1` in the first payload byte.
    ///
    /// Only meaningful for the counted read commands.
    pub fn read_count(&self) -> usize {
        self.data[0] as usize + 1
    }

    /// Starting element address of a counted read or write payload.
    pub fn register_address(&self) -> u16 {
        u16::from_be_bytes([self.data[1], self.data[2]])
    }

    /// Total reply length in symbols the addressed station will produce
    /// for this request, trailing CRC included. Broadcasts are never
    /// answered, so their reply length is zero.
    pub fn response_length(&self) -> usize {
        if self.is_broadcast() {
            return 0;
        }

        match self.command {
            CommandCode::ReadCounter | CommandCode::ReadRegister | CommandCode::ReadTimer => {
                self.read_count() * 4 + 2
            }

            CommandCode::ReadDisplayRegister => 4 + 2,

            // Truncating division, bit-compatible with deployed PCD firmware.
            CommandCode::ReadFlag | CommandCode::ReadInput | CommandCode::ReadOutput => {
                self.read_count() / 8 + 2
            }

            CommandCode::ReadRealTimeClock => 6 + 2,

            CommandCode::WriteCounter
            | CommandCode::WriteFlag
            | CommandCode::WriteRealTimeClock
            | CommandCode::WriteOutput
            | CommandCode::WriteRegister
            | CommandCode::WriteTimer => 2,

            CommandCode::ReadPcdStatusCpu0
            | CommandCode::ReadPcdStatusCpu1
            | CommandCode::ReadPcdStatusCpu2
            | CommandCode::ReadPcdStatusCpu3
            | CommandCode::ReadPcdStatusCpu4
            | CommandCode::ReadPcdStatusCpu5
            | CommandCode::ReadPcdStatusCpu6
            | CommandCode::ReadPcdStatusSelf
            | CommandCode::ReadStationNumber => 1 + 2,
        }
    }

    /// Writes the request as a 9-bit symbol frame into `out`.
    ///
    /// Layout: address symbol, command byte, payload bytes, CRC high byte,
    /// CRC low byte.
    ///
    /// # Returns
    ///
    /// The number of symbols written, `4 + data_len`, or
    /// [`SbusError::BufferOverflow`] when `out` is too small.
    pub fn serialize_into(&self, out: &mut [Symbol]) -> Result<usize, SbusError> {
        let data_len = self.data_len as usize;
        let needed = 4 + data_len;
        if out.len() < needed {
            return Err(SbusError::BufferOverflow {
                needed,
                got: out.len(),
            });
        }

        out[0] = Symbol::address(self.destination);
        out[1] = Symbol::data(self.command.code());
        for (slot, byte) in out[2..2 + data_len].iter_mut().zip(self.payload()) {
            *slot = Symbol::data(*byte);
        }

        let [crc_hi, crc_lo] = crc::crc16_symbols(&out[..2 + data_len]).to_be_bytes();
        out[2 + data_len] = Symbol::data(crc_hi);
        out[2 + data_len + 1] = Symbol::data(crc_lo);
        Ok(needed)
    }

    /// Renders the textual summary into a stack buffer, for hosts without
    /// a `core::fmt` sink of their own.
    ///
    /// The buffer is sized for the worst case, so the rendering cannot
    /// truncate.
    pub fn format_into(&self) -> Result<ArrayString<MAX_DISPLAY_LEN>, SbusError> {
        let mut buffer = ArrayString::<MAX_DISPLAY_LEN>::new();
        write!(buffer, "{}", self)?;
        Ok(buffer)
    }
}

impl PartialEq for Request {
    fn eq(&self, other: &Self) -> bool {
        self.destination == other.destination
            && self.command == other.command
            && self.payload() == other.payload()
    }
}

impl Eq for Request {}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("destination", &self.destination)
            .field("command", &self.command)
            .field("data", &self.payload())
            .finish()
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Request for {}, command {}",
            self.destination,
            self.command.code()
        )?;
        if self.data_len > 0 {
            f.write_str("\tData:")?;
            for byte in self.payload() {
                write!(f, " 0x{:02X}", byte)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_oversized_payload() {
        let payload = [0u8; 256];
        assert_eq!(
            Request::new(1, CommandCode::WriteRegister, &payload),
            Err(SbusError::BufferOverflow {
                needed: 256,
                got: 255
            })
        );
        assert!(Request::new(1, CommandCode::WriteRegister, &payload[..255]).is_ok());
    }

    #[test]
    fn test_read_registers_encoding() {
        let request = Request::read_registers(4, 0x024B, 3).unwrap();
        assert_eq!(request.destination(), 4);
        assert_eq!(request.command(), CommandCode::ReadRegister);
        assert_eq!(request.payload(), &[2, 0x02, 0x4B]);
        assert_eq!(request.read_count(), 3);
        assert_eq!(request.register_address(), 0x024B);
    }

    #[test]
    fn test_read_registers_count_bounds() {
        assert_eq!(
            Request::read_registers(1, 0, 0),
            Err(SbusError::InvalidCount(0))
        );
        assert_eq!(
            Request::read_registers(1, 0, 257),
            Err(SbusError::InvalidCount(257))
        );
        let maxed = Request::read_registers(1, 0, 256).unwrap();
        assert_eq!(maxed.payload()[0], 255);
        assert_eq!(maxed.read_count(), 256);
    }

    #[test]
    fn test_write_register_encoding() {
        let request = Request::write_register(9, 0x1234, 0xDEADBEEF);
        assert_eq!(request.command(), CommandCode::WriteRegister);
        assert_eq!(
            request.payload(),
            &[5, 0x12, 0x34, 0xDE, 0xAD, 0xBE, 0xEF]
        );
        assert_eq!(request.register_address(), 0x1234);
    }

    #[test]
    fn test_response_lengths() {
        let registers = Request::read_registers(1, 0, 2).unwrap();
        assert_eq!(registers.response_length(), 2 * 4 + 2);

        let display = Request::new(1, CommandCode::ReadDisplayRegister, &[]).unwrap();
        assert_eq!(display.response_length(), 6);

        let clock = Request::new(1, CommandCode::ReadRealTimeClock, &[]).unwrap();
        assert_eq!(clock.response_length(), 8);

        let status = Request::new(1, CommandCode::ReadPcdStatusSelf, &[]).unwrap();
        assert_eq!(status.response_length(), 3);

        let write = Request::write_register(1, 0, 0);
        assert_eq!(write.response_length(), 2);
    }

    #[test]
    fn test_bit_read_response_length_truncates() {
        // count 8 and count 9 both fit a single reply byte.
        for (count_byte, expected) in [(0u8, 2), (6, 2), (7, 3), (8, 3), (14, 3), (15, 4)] {
            let request =
                Request::new(1, CommandCode::ReadFlag, &[count_byte, 0, 0]).unwrap();
            assert_eq!(request.response_length(), expected, "count byte {count_byte}");
        }
    }

    #[test]
    fn test_broadcast_has_no_response() {
        let request = Request::read_registers(crate::frame::BROADCAST_ADDRESS, 0, 2).unwrap();
        assert!(request.is_broadcast());
        assert_eq!(request.response_length(), 0);
    }

    #[test]
    fn test_serialize_layout_and_crc() {
        let request = Request::read_registers(1, 0x004B, 3).unwrap();
        let mut buffer = [Symbol::data(0); 16];
        let written = request.serialize_into(&mut buffer).unwrap();
        assert_eq!(written, 7);

        assert_eq!(buffer[0], Symbol::address(1));
        assert_eq!(buffer[1], Symbol::data(6));
        assert_eq!(buffer[2], Symbol::data(2));
        assert_eq!(buffer[3], Symbol::data(0x00));
        assert_eq!(buffer[4], Symbol::data(0x4B));

        let expected = crc::crc16(&[0x01, 0x06, 0x02, 0x00, 0x4B]);
        assert_eq!(buffer[5], Symbol::data((expected >> 8) as u8));
        assert_eq!(buffer[6], Symbol::data(expected as u8));
    }

    #[test]
    fn test_serialize_rejects_short_buffer() {
        let request = Request::read_registers(1, 0, 1).unwrap();
        let mut buffer = [Symbol::data(0); 6];
        assert_eq!(
            request.serialize_into(&mut buffer),
            Err(SbusError::BufferOverflow { needed: 7, got: 6 })
        );
    }

    #[test]
    fn test_display_with_data() {
        let request = Request::read_registers(1, 0x004B, 3).unwrap();
        assert_eq!(
            format!("{request}"),
            "Request for 1, command 6\n\tData: 0x02 0x00 0x4B\n"
        );
    }

    #[test]
    fn test_display_without_data() {
        let request = Request::new(7, CommandCode::ReadRealTimeClock, &[]).unwrap();
        assert_eq!(format!("{request}"), "Request for 7, command 4\n");
    }

    #[test]
    fn test_format_into_matches_display() {
        let request = Request::write_register(2, 0x0010, 42);
        let rendered = request.format_into().unwrap();
        assert_eq!(rendered.as_str(), format!("{request}"));
    }

    #[test]
    fn test_equality_ignores_buffer_tail() {
        let lhs = Request::new(1, CommandCode::ReadRegister, &[2, 0, 0x4B]).unwrap();
        let rhs = Request::read_registers(1, 0x004B, 3).unwrap();
        assert_eq!(lhs, rhs);

        let other = Request::read_registers(1, 0x004B, 4).unwrap();
        assert_ne!(lhs, other);
    }
}
