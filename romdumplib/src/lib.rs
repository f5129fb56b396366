//! # `romdumplib`
//!
//! `romdumplib` is the formatting, parsing and addressing engine of a hex viewer used
//! for poking at SNES ROM images.
//!
//! The library provides:
//! - Aligned hex + ASCII line rendering (via [`format_line`] and [`DisplayLayout`]).
//! - Streaming dumps of files and buffers in bounded chunks (via [`StreamDumper`]),
//!   optionally on a background thread with progress reports (via [`DumpTask`]).
//! - Mapping between dump positions and byte offsets (via [`ViewIndex`]).
//! - Turning an edited dump back into bytes and saving it (via [`parse_patch`] and
//!   [`save_patch`]).
//! - SNES LoROM address <-> file offset translation.
//! - Search and jump query parsing.
//! - Error handling with [`DumpError`].
//!
//! ## Example
//!
//! ```
//! use romdumplib::{DisplayLayout, dump_buffer, parse_patch};
//!
//! let layout = DisplayLayout::default();
//! let text = dump_buffer(b"SUPER METROID", 0x7FC0, &layout);
//! assert!(text.starts_with("00007FC0: 53 55 50 45 52 20 4D 45  54 52 4F 49 44"));
//!
//! assert_eq!(parse_patch(&text, &layout).unwrap(), b"SUPER METROID");
//! ```

mod dumper;
mod error;
mod formatter;
mod lorom;
mod patch;
mod search;
mod task;
mod view;

// Public APIs
pub use dumper::{
    DEFAULT_CHUNK_SIZE, DumpOptions, DumpOutput, LineRecord, StreamDumper, dump_buffer,
    dump_file, dump_file_to, dump_to_writer,
};
pub use error::{DumpError, DumpErrorKind};
pub use formatter::{
    ADDRESS_COLUMN_WIDTH, DisplayLayout, FormattedLine, MAX_BYTES_PER_LINE, bit_is_set,
    format_line, parse_binary_string, parse_hex_string, printable_char, to_binary_string,
    to_hex_string,
};
pub use lorom::{
    BANK_SIZE, HEADER_SIZE, bank_range, lorom_address_to_offset, lorom_to_file_offset,
    offset_to_lorom_address, parse_bank, parse_lorom_address,
};
pub use patch::{parse_patch, save_patch};
pub use search::{SearchType, find_next, parse_jump_query, parse_number, search};
pub use task::{DumpEvent, DumpTask};
pub use view::ViewIndex;
