// src/command.rs

use crate::error::SbusError;
use core::convert::TryFrom;

/// Command codes understood by PCD stations.
///
/// The discriminants are the on-wire command bytes. The set is closed: any
/// other byte is rejected during parsing with
/// [`SbusError::UnknownCommand`], which is distinct from a structurally
/// invalid payload.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CommandCode {
    ReadCounter = 0,
    ReadDisplayRegister = 1,
    ReadFlag = 2,
    ReadInput = 3,
    ReadRealTimeClock = 4,
    ReadOutput = 5,
    ReadRegister = 6,
    ReadTimer = 7,
    WriteCounter = 10,
    WriteFlag = 11,
    WriteRealTimeClock = 12,
    WriteOutput = 13,
    WriteRegister = 14,
    WriteTimer = 15,
    ReadPcdStatusCpu0 = 20,
    ReadPcdStatusCpu1 = 21,
    ReadPcdStatusCpu2 = 22,
    ReadPcdStatusCpu3 = 23,
    ReadPcdStatusCpu4 = 24,
    ReadPcdStatusCpu5 = 25,
    ReadPcdStatusCpu6 = 26,
    ReadPcdStatusSelf = 27,
    ReadStationNumber = 29,
}

/// Shape of the payload that follows the command byte in a request frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RequestShape {
    /// No payload at all.
    Empty,
    /// Exactly this many payload bytes.
    Fixed(usize),
    /// `[count, addr_hi, addr_lo, values…]`; the count byte declares the
    /// payload extent in bytes, must lie in `[5, 129]` and satisfy
    /// `(count - 1) % 4 == 0` (whole 32-bit values). Total `2 + count`.
    CountedWords,
    /// `[count, addr_hi, addr_lo, bits…]`; count in `[2, 17]`, the byte
    /// at payload offset 2 limited to 127. Total `2 + count`.
    CountedBits,
}

impl CommandCode {
    /// The on-wire command byte.
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Whether the station answers this command with an ACK/NAK pair
    /// instead of a data reply.
    pub const fn is_write(self) -> bool {
        matches!(
            self,
            CommandCode::WriteCounter
                | CommandCode::WriteFlag
                | CommandCode::WriteRealTimeClock
                | CommandCode::WriteOutput
                | CommandCode::WriteRegister
                | CommandCode::WriteTimer
        )
    }

    /// The request payload shape the parser must expect after this
    /// command byte.
    pub const fn request_shape(self) -> RequestShape {
        match self {
            CommandCode::ReadDisplayRegister
            | CommandCode::ReadRealTimeClock
            | CommandCode::ReadPcdStatusCpu0
            | CommandCode::ReadPcdStatusCpu1
            | CommandCode::ReadPcdStatusCpu2
            | CommandCode::ReadPcdStatusCpu3
            | CommandCode::ReadPcdStatusCpu4
            | CommandCode::ReadPcdStatusCpu5
            | CommandCode::ReadPcdStatusCpu6
            | CommandCode::ReadPcdStatusSelf
            | CommandCode::ReadStationNumber => RequestShape::Empty,

            CommandCode::ReadCounter
            | CommandCode::ReadFlag
            | CommandCode::ReadInput
            | CommandCode::ReadOutput
            | CommandCode::ReadRegister
            | CommandCode::ReadTimer => RequestShape::Fixed(3),

            CommandCode::WriteCounter | CommandCode::WriteRegister | CommandCode::WriteTimer => {
                RequestShape::CountedWords
            }

            CommandCode::WriteOutput | CommandCode::WriteFlag => RequestShape::CountedBits,

            CommandCode::WriteRealTimeClock => RequestShape::Fixed(6),
        }
    }
}

impl TryFrom<u8> for CommandCode {
    type Error = SbusError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => CommandCode::ReadCounter,
            1 => CommandCode::ReadDisplayRegister,
            2 => CommandCode::ReadFlag,
            3 => CommandCode::ReadInput,
            4 => CommandCode::ReadRealTimeClock,
            5 => CommandCode::ReadOutput,
            6 => CommandCode::ReadRegister,
            7 => CommandCode::ReadTimer,
            10 => CommandCode::WriteCounter,
            11 => CommandCode::WriteFlag,
            12 => CommandCode::WriteRealTimeClock,
            13 => CommandCode::WriteOutput,
            14 => CommandCode::WriteRegister,
            15 => CommandCode::WriteTimer,
            20 => CommandCode::ReadPcdStatusCpu0,
            21 => CommandCode::ReadPcdStatusCpu1,
            22 => CommandCode::ReadPcdStatusCpu2,
            23 => CommandCode::ReadPcdStatusCpu3,
            24 => CommandCode::ReadPcdStatusCpu4,
            25 => CommandCode::ReadPcdStatusCpu5,
            26 => CommandCode::ReadPcdStatusCpu6,
            27 => CommandCode::ReadPcdStatusSelf,
            29 => CommandCode::ReadStationNumber,
            other => return Err(SbusError::UnknownCommand(other)),
        })
    }
}

impl From<CommandCode> for u8 {
    fn from(command: CommandCode) -> Self {
        command.code()
    }
}
