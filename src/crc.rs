// src/crc.rs

use crate::frame::Symbol;
use crc::{Algorithm, Crc};

/// Frame-check algorithm used on the bus.
/// Polynomial: 0x1021 (CCITT)
/// Initial Value: 0x0000
/// Input Reflected: false
/// Output Reflected: false
/// Final XOR: 0x0000
/// Check Value: 0x31C3 (for "123456789")
/// Residue: 0x0000
pub const SBUS_CRC: Algorithm<u16> = Algorithm {
    poly: 0x1021,
    init: 0x0000,
    refin: false,
    refout: false,
    xorout: 0x0000,
    check: 0x31C3,
    width: 16,
    residue: 0x0000,
};

// Create a Crc instance for the S-Bus algorithm for reuse.
const CRC_COMPUTER: Crc<u16> = Crc::<u16>::new(&SBUS_CRC);

/// Calculates the frame-check sequence over a run of 8-bit bytes.
///
/// Covers `[address byte, command byte, payload]` of a frame; the two CRC
/// bytes themselves are excluded. An empty input yields `0`. The result is
/// transmitted big-endian, high byte first.
///
/// # Arguments
///
/// * `data`: A slice of bytes for which to calculate the CRC.
///
/// # Returns
///
/// The calculated 16-bit CRC value.
#[inline]
pub fn crc16(data: &[u8]) -> u16 {
    CRC_COMPUTER.checksum(data)
}

/// Calculates the frame-check sequence over a run of 9-bit symbols.
///
/// Only the low byte of each symbol enters the calculation; the address
/// bit is not part of the checksum. For any byte sequence this therefore
/// agrees with [`crc16`] over the same bytes, whatever the address bits.
///
/// # Arguments
///
/// * `symbols`: The symbols to checksum, address symbol included.
///
/// # Returns
///
/// The calculated 16-bit CRC value.
pub fn crc16_symbols(symbols: &[Symbol]) -> u16 {
    let mut digest = CRC_COMPUTER.digest();
    for symbol in symbols {
        digest.update(&[symbol.byte()]);
    }
    digest.finalize()
}
