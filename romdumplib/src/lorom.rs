//! SNES LoROM address translation.
//!
//! In LoROM every bank maps 32 KiB of ROM at CPU addresses `$8000-$FFFF`. Bit 23 of
//! the address only selects the FastROM mirror, so banks `$00-$7F` and `$80-$FF`
//! map to the same file offsets. Copier headers add 512 bytes in front of the ROM.

use crate::error::{DumpError, DumpErrorKind};

/// Size of a copier header in front of the ROM data.
pub const HEADER_SIZE: usize = 0x200;

/// Bytes of ROM mapped by one LoROM bank.
pub const BANK_SIZE: usize = 0x8000;

const fn header_offset(header_present: bool) -> usize {
    if header_present { HEADER_SIZE } else { 0 }
}

/// File offset of the 24-bit LoROM address `addr`.
///
/// # Example
/// ```
/// use romdumplib::lorom_address_to_offset;
///
/// assert_eq!(lorom_address_to_offset(0x84_86D0, false), 0x02_06D0);
/// assert_eq!(lorom_address_to_offset(0x84_86D0, true), 0x02_08D0);
/// ```
#[must_use]
pub const fn lorom_address_to_offset(addr: u32, header_present: bool) -> usize {
    let offset = ((addr & 0x7F_0000) >> 1) | (addr & 0x7FFF);
    offset as usize + header_offset(header_present)
}

/// File offset of `addr` within `bank`, i.e. the bank/address pair form of
/// [`lorom_address_to_offset`] without a header.
#[must_use]
pub const fn lorom_to_file_offset(bank: u8, addr: u16) -> usize {
    (((bank & 0x7F) as usize) << 15) | (addr as usize & 0x7FFF)
}

/// First and last file offset (inclusive) of `bank`.
///
/// # Example
/// ```
/// assert_eq!(romdumplib::bank_range(0x84, false), (0x2_0000, 0x2_7FFF));
/// ```
#[must_use]
pub const fn bank_range(bank: u8, header_present: bool) -> (usize, usize) {
    let start = (bank & 0x7F) as usize * BANK_SIZE + header_offset(header_present);
    (start, start + BANK_SIZE - 1)
}

/// LoROM address of the byte at file `offset`, in the FastROM mirror (`$80-$FF`).
/// Returns `None` if the offset falls inside the header or beyond bank `$FF`.
#[allow(clippy::cast_possible_truncation)]
#[must_use]
pub const fn offset_to_lorom_address(offset: usize, header_present: bool) -> Option<u32> {
    let header = header_offset(header_present);
    if offset < header {
        return None;
    }
    let rom_offset = offset - header;
    let bank = rom_offset / BANK_SIZE;
    if bank > 0x7F {
        return None;
    }
    let addr = (rom_offset % BANK_SIZE) | 0x8000;
    Some((((bank | 0x80) << 16) | addr) as u32)
}

/// Parse a bank given as exactly 2 hex digits.
///
/// # Errors
/// Returns an error if the input is not exactly 2 hex digits.
pub fn parse_bank(input: &str) -> Result<u8, DumpError> {
    let digits = exact_hex_digits(input, 2)?;
    u8::from_str_radix(digits, 16).map_err(|_| invalid_address(input))
}

/// Parse a full LoROM address given as exactly 6 hex digits.
///
/// # Errors
/// Returns an error if the input is not exactly 6 hex digits.
///
/// # Example
/// ```
/// use romdumplib::{lorom_address_to_offset, parse_lorom_address};
///
/// let addr = parse_lorom_address("8486D0").unwrap();
/// assert_eq!(lorom_address_to_offset(addr, false), 0x0206D0);
///
/// assert!(parse_lorom_address("86D0").is_err());
/// ```
pub fn parse_lorom_address(input: &str) -> Result<u32, DumpError> {
    let digits = exact_hex_digits(input, 6)?;
    u32::from_str_radix(digits, 16).map_err(|_| invalid_address(input))
}

fn exact_hex_digits(input: &str, count: usize) -> Result<&str, DumpError> {
    let digits = input.trim();
    if digits.len() == count && digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        Ok(digits)
    } else {
        Err(invalid_address(input))
    }
}

fn invalid_address(input: &str) -> DumpError {
    DumpError::AddressError(DumpErrorKind::InvalidAddress(input.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_to_offset() {
        assert_eq!(lorom_address_to_offset(0x84_86D0, false), 0x02_06D0);
        assert_eq!(lorom_address_to_offset(0x80_8000, false), 0x0);
        assert_eq!(lorom_address_to_offset(0x00_8000, false), 0x0);
        assert_eq!(lorom_address_to_offset(0xFF_FFFF, false), 0x3F_FFFF);
        assert_eq!(lorom_address_to_offset(0x80_8000, true), HEADER_SIZE);
    }

    #[test]
    fn test_bank_pair_matches_full_address() {
        for bank in [0x00u8, 0x01, 0x7F, 0x80, 0x8F, 0xFF] {
            for addr in [0x8000u16, 0x86D0, 0xFFFF] {
                let full = (u32::from(bank) << 16) | u32::from(addr);
                assert_eq!(
                    lorom_to_file_offset(bank, addr),
                    lorom_address_to_offset(full, false)
                );
            }
        }
    }

    #[test]
    fn test_bank_range() {
        assert_eq!(bank_range(0x84, false), (0x2_0000, 0x2_7FFF));
        assert_eq!(bank_range(0x04, false), (0x2_0000, 0x2_7FFF));
        assert_eq!(bank_range(0x80, true), (0x200, 0x81FF));
        assert_eq!(bank_range(0xFF, false), (0x3F_8000, 0x3F_FFFF));
    }

    #[test]
    fn test_offset_to_address_round_trip() {
        for offset in [0usize, 0x7FFF, 0x8000, 0x2_06D0, 0x3F_FFFF] {
            let addr = offset_to_lorom_address(offset, false);
            assert_eq!(addr.map(|a| lorom_address_to_offset(a, false)), Some(offset));
        }
        assert_eq!(offset_to_lorom_address(0x2_06D0, false), Some(0x84_86D0));
        assert_eq!(offset_to_lorom_address(0x100, true), None);
        assert_eq!(offset_to_lorom_address(0x40_0000, false), None);
    }

    #[test]
    fn test_parse_bank() {
        assert_eq!(parse_bank("84").ok(), Some(0x84));
        assert_eq!(parse_bank("8f").ok(), Some(0x8F));
        assert!(parse_bank("8").is_err());
        assert!(parse_bank("084").is_err());
        assert!(parse_bank("G4").is_err());
    }

    #[test]
    fn test_parse_lorom_address() {
        // Arrange
        let inputs = ["8486D0", "0x86D0", "8486D", "84:86D0", "+486D0"];

        // Act
        let results: Vec<_> = inputs.iter().map(|s| parse_lorom_address(s).ok()).collect();

        // Assert
        assert_eq!(results, vec![Some(0x84_86D0), None, None, None, None]);
        assert!(matches!(
            parse_lorom_address("zz"),
            Err(DumpError::AddressError(DumpErrorKind::InvalidAddress(ref s))) if s == "zz"
        ));
    }
}
