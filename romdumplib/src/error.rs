//! The `error` module defines the [`DumpError`] enum that describes the errors that
//! can occur when dumping, searching, patching or translating addresses.
//! It carries up to three pieces of information:
//! 1. When the error occurs, e.g., while parsing a query or a patch.
//! 2. What kind of error was encountered (via [`DumpErrorKind`]).
//! 3. What is the line number (if applicable), e.g., at which line of an edited dump
//!    the patch parsing failed.

use std::error::Error;
use std::fmt;
use std::io;

#[derive(Debug)]
pub enum DumpError {
    /// Search or jump input was rejected
    QueryError(DumpErrorKind),
    /// Edited dump text could not be turned back into bytes (1-based line number)
    PatchError(DumpErrorKind, usize),
    /// Address translation input was rejected
    AddressError(DumpErrorKind),
    /// Display layout options are invalid
    LayoutError(DumpErrorKind),
    /// Underlying read or write on the byte source failed
    IoError(io::Error),
}

impl DumpError {
    /// Returns the error kind, or `None` for I/O failures.
    #[must_use]
    pub const fn kind(&self) -> Option<&DumpErrorKind> {
        match self {
            Self::QueryError(kind)
            | Self::PatchError(kind, _)
            | Self::AddressError(kind)
            | Self::LayoutError(kind) => Some(kind),
            Self::IoError(_) => None,
        }
    }
}

impl fmt::Display for DumpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QueryError(base_err) => {
                write!(f, "Error encountered while evaluating query:\n{base_err}")
            }
            Self::PatchError(base_err, line) => {
                write!(
                    f,
                    "Error encountered during patch parsing at line #{line}:\n{base_err}",
                )
            }
            Self::AddressError(base_err) => {
                write!(
                    f,
                    "Error encountered during address translation:\n{base_err}"
                )
            }
            Self::LayoutError(base_err) => {
                write!(f, "Error encountered in display layout:\n{base_err}")
            }
            Self::IoError(err) => {
                write!(f, "I/O error on byte source: {err}")
            }
        }
    }
}

impl From<io::Error> for DumpError {
    fn from(err: io::Error) -> Self {
        Self::IoError(err)
    }
}

impl Error for DumpError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::IoError(err) => Some(err),
            Self::QueryError(kind)
            | Self::PatchError(kind, _)
            | Self::AddressError(kind)
            | Self::LayoutError(kind) => Some(kind),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DumpErrorKind {
    /// Search/jump/number input does not match the expected grammar
    MalformedQuery(String),
    /// Query is valid but has no match in the source
    PatternNotFound,
    /// Line holds more hex tokens than fit on one line (found, max)
    CorruptPatch(usize, usize),
    /// Bank or LoROM address text has the wrong shape
    InvalidAddress(String),
    /// Offset lies past the end of the source (offset, source length)
    OffsetOutOfRange(usize, usize),
    /// Bytes per line or group size is zero
    InvalidLayout(String),
}

impl fmt::Display for DumpErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedQuery(input) => {
                write!(f, "Malformed query: '{input}'")
            }
            Self::PatternNotFound => {
                write!(f, "Pattern not found")
            }
            Self::CorruptPatch(found, max) => {
                write!(
                    f,
                    "Line holds {found} hex bytes, at most {max} are allowed per line"
                )
            }
            Self::InvalidAddress(input) => {
                write!(f, "Invalid address: '{input}'")
            }
            Self::OffsetOutOfRange(offset, len) => {
                write!(
                    f,
                    "Offset 0x{offset:X} is out of range (source length 0x{len:X})"
                )
            }
            Self::InvalidLayout(reason) => {
                write!(f, "Invalid layout: {reason}")
            }
        }
    }
}

impl Error for DumpErrorKind {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_error_display_names_line() {
        // Arrange
        let err = DumpError::PatchError(DumpErrorKind::CorruptPatch(17, 16), 3);

        // Act
        let msg = err.to_string();

        // Assert
        assert!(msg.contains("line #3"));
        assert!(msg.contains("17 hex bytes"));
    }

    #[test]
    fn test_io_error_has_source_and_no_kind() {
        // Arrange
        let err = DumpError::from(io::Error::new(io::ErrorKind::NotFound, "gone"));

        // Act & Assert
        assert!(err.kind().is_none());
        assert!(err.source().is_some());
        assert!(err.to_string().contains("gone"));
    }
}
