//! The `formatter` module renders chunks of bytes into aligned hex + ASCII dump lines.
//!
//! A rendered line looks like:
//!
//! ```text
//! 00000010: 48 65 6C 6C 6F 2C 20 57  6F 72 6C 64 21 0A 00 FF  Hello, World!...
//! ```
//!
//! The hex column is always padded to the same width so the ASCII column starts at
//! the same position on every line, including a short final line.

use crate::error::{DumpError, DumpErrorKind};
use std::fmt::Write;

/// Width of the address column: 8 hex digits followed by `": "`.
pub const ADDRESS_COLUMN_WIDTH: usize = 10;

/// Largest accepted number of bytes per line.
pub const MAX_BYTES_PER_LINE: usize = 0x1000;

/// Addresses are shown modulo 2^32.
pub(crate) const ADDRESS_MASK: usize = 0xFFFF_FFFF;

/// Layout of a rendered dump. Fixed for the lifetime of one dump/view session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayLayout {
    bytes_per_line: usize,
    group_size: usize,
}

impl Default for DisplayLayout {
    fn default() -> Self {
        Self {
            bytes_per_line: 16,
            group_size: 8,
        }
    }
}

impl DisplayLayout {
    /// Creates a layout with the provided number of bytes per line and bytes per group.
    ///
    /// # Errors
    /// Returns an error if either value is zero, or if `bytes_per_line` exceeds
    /// [`MAX_BYTES_PER_LINE`].
    ///
    /// # Example
    /// ```
    /// use romdumplib::DisplayLayout;
    ///
    /// let layout = DisplayLayout::new(32, 4).unwrap();
    /// assert_eq!(layout.groups_per_line(), 8);
    ///
    /// assert!(DisplayLayout::new(0, 8).is_err());
    /// assert!(DisplayLayout::new(usize::MAX / 2, 8).is_err());
    /// ```
    pub fn new(bytes_per_line: usize, group_size: usize) -> Result<Self, DumpError> {
        if bytes_per_line == 0 {
            return Err(DumpError::LayoutError(DumpErrorKind::InvalidLayout(
                "bytes per line must be greater than zero".into(),
            )));
        }
        if bytes_per_line > MAX_BYTES_PER_LINE {
            return Err(DumpError::LayoutError(DumpErrorKind::InvalidLayout(format!(
                "at most {MAX_BYTES_PER_LINE} bytes per line are supported"
            ))));
        }
        if group_size == 0 {
            return Err(DumpError::LayoutError(DumpErrorKind::InvalidLayout(
                "group size must be greater than zero".into(),
            )));
        }
        Ok(Self {
            bytes_per_line,
            group_size,
        })
    }

    #[must_use]
    pub const fn bytes_per_line(&self) -> usize {
        self.bytes_per_line
    }

    #[must_use]
    pub const fn group_size(&self) -> usize {
        self.group_size
    }

    #[must_use]
    pub const fn groups_per_line(&self) -> usize {
        self.bytes_per_line.div_ceil(self.group_size)
    }

    /// Fixed width of the hex column, padding included.
    #[must_use]
    pub const fn hex_width(&self) -> usize {
        self.bytes_per_line * 3 - 1 + (self.groups_per_line() - 1) * 2
    }

    /// Column at which the ASCII rendering starts.
    #[must_use]
    pub const fn ascii_column(&self) -> usize {
        ADDRESS_COLUMN_WIDTH + self.hex_width() + 1
    }

    /// Width of a full rendered line, without the trailing newline.
    #[must_use]
    pub const fn line_width(&self) -> usize {
        self.ascii_column() + self.bytes_per_line
    }
}

/// One rendered dump line and its ASCII column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedLine {
    /// Full line: address, hex column, ASCII column and a trailing `\n`
    pub text: String,
    /// ASCII column only, without the newline
    pub ascii: String,
}

/// Render one dump line for `chunk`, which starts at `address`.
///
/// `chunk` is expected to hold at most `layout.bytes_per_line()` bytes. Only the low
/// 32 bits of `address` are shown.
///
/// # Example
/// ```
/// use romdumplib::{DisplayLayout, format_line};
///
/// let line = format_line(0x10, b"Hi!", &DisplayLayout::default());
/// assert!(line.text.starts_with("00000010: 48 69 21 "));
/// assert!(line.text.ends_with(" Hi!\n"));
/// assert_eq!(line.ascii, "Hi!");
/// ```
#[must_use]
pub fn format_line(address: usize, chunk: &[u8], layout: &DisplayLayout) -> FormattedLine {
    debug_assert!(chunk.len() <= layout.bytes_per_line());

    let mut hex = String::with_capacity(layout.hex_width());
    for (i, byte) in chunk.iter().enumerate() {
        if i > 0 {
            // Double space between groups
            hex.push_str(if i % layout.group_size() == 0 { "  " } else { " " });
        }
        let _ = write!(hex, "{byte:02X}");
    }

    let ascii: String = chunk.iter().map(|&b| printable_char(b)).collect();

    let text = format!(
        "{:08X}: {hex:<width$} {ascii}\n",
        address & ADDRESS_MASK,
        width = layout.hex_width()
    );

    FormattedLine { text, ascii }
}

/// Printable ASCII `[32, 126]` is shown as is, everything else as `.`.
#[must_use]
pub const fn printable_char(byte: u8) -> char {
    if byte >= 32 && byte <= 126 {
        byte as char
    } else {
        '.'
    }
}

/// Uppercase hex rendering of `value`, zero-padded to `width` digits.
///
/// # Example
/// ```
/// assert_eq!(romdumplib::to_hex_string(90, 4), "005A");
/// ```
#[must_use]
pub fn to_hex_string(value: u64, width: usize) -> String {
    format!("{value:0width$X}")
}

/// Binary rendering of `value`, zero-padded to `width` digits.
///
/// # Example
/// ```
/// assert_eq!(romdumplib::to_binary_string(13, 8), "00001101");
/// ```
#[must_use]
pub fn to_binary_string(value: u64, width: usize) -> String {
    format!("{value:0width$b}")
}

/// Parse bare hex digits, optionally prefixed with `0x`.
///
/// # Errors
/// Returns an error if the input holds no digits, a non-hex digit, or does not fit
/// in 64 bits.
///
/// # Example
/// ```
/// assert_eq!(romdumplib::parse_hex_string("5A").unwrap(), 90);
/// assert_eq!(romdumplib::parse_hex_string(" 0x00ff ").unwrap(), 255);
/// ```
pub fn parse_hex_string(input: &str) -> Result<u64, DumpError> {
    let s = input.trim();
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    parse_radix(input, digits, 16)
}

/// Parse binary digits, optionally prefixed with `0b`.
///
/// # Errors
/// Returns an error if the input holds no digits, a digit other than `0`/`1`, or
/// does not fit in 64 bits.
///
/// # Example
/// ```
/// assert_eq!(romdumplib::parse_binary_string("0b1101").unwrap(), 13);
/// ```
pub fn parse_binary_string(input: &str) -> Result<u64, DumpError> {
    let s = input.trim();
    let digits = s
        .strip_prefix("0b")
        .or_else(|| s.strip_prefix("0B"))
        .unwrap_or(s);
    parse_radix(input, digits, 2)
}

fn parse_radix(input: &str, digits: &str, radix: u32) -> Result<u64, DumpError> {
    // from_str_radix would also take a leading '+'
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(DumpError::QueryError(DumpErrorKind::MalformedQuery(
            input.to_string(),
        )));
    }
    u64::from_str_radix(digits, radix)
        .map_err(|_| DumpError::QueryError(DumpErrorKind::MalformedQuery(input.to_string())))
}

/// Is bit `bit` (0 = least significant) of `value` set.
#[must_use]
pub const fn bit_is_set(value: u64, bit: u32) -> bool {
    bit < u64::BITS && (value >> bit) & 1 == 1
}
