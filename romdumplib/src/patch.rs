//! Turning a rendered (and possibly edited) dump back into raw bytes, and saving the
//! result over the original file.

use crate::error::{DumpError, DumpErrorKind};
use crate::formatter::{ADDRESS_COLUMN_WIDTH, DisplayLayout};
use std::io::Write;
use std::path::Path;

/// Padding between a short hex column and the ASCII column always contains this.
const HEX_PADDING: &str = "   ";

/// Parse the dump `text` back into the bytes it shows.
///
/// Lines without a `:` are ignored. On every other line the hex tokens after the
/// first `:` are collected until the first token that is not a 2-digit hex value.
/// A line still shaped exactly like the formatter renders it only has its hex
/// column read, so an ASCII preview such as `AB` is never taken for data. On any
/// other line a run of three or more spaces ends the hex values, as rendered hex
/// never holds more than two spaces in a row.
///
/// # Errors
/// Returns [`DumpErrorKind::CorruptPatch`] with the 1-based line number if a line
/// holds more hex values than `layout.bytes_per_line()`. Nothing is returned in that
/// case, not even the lines before it.
///
/// # Example
/// ```
/// use romdumplib::{DisplayLayout, dump_buffer, parse_patch};
///
/// let layout = DisplayLayout::default();
/// let text = dump_buffer(b"Hello, World!", 0, &layout).replace("48 65", "4A 65");
///
/// assert_eq!(parse_patch(&text, &layout).unwrap(), b"Jello, World!");
/// ```
pub fn parse_patch(text: &str, layout: &DisplayLayout) -> Result<Vec<u8>, DumpError> {
    let mut bytes = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let Some((_, rest)) = line.split_once(':') else {
            continue;
        };

        let hex_column = rendered_hex_column(line, layout).unwrap_or_else(|| {
            rest.split_once(HEX_PADDING).map_or(rest, |(hex, _)| hex)
        });
        let line_bytes: Vec<u8> = hex_column
            .split_whitespace()
            .map_while(parse_hex_token)
            .collect();

        if line_bytes.len() > layout.bytes_per_line() {
            log::warn!(
                "Rejecting patch: line {} holds {} bytes",
                idx + 1,
                line_bytes.len()
            );
            return Err(DumpError::PatchError(
                DumpErrorKind::CorruptPatch(line_bytes.len(), layout.bytes_per_line()),
                idx + 1,
            ));
        }

        bytes.extend_from_slice(&line_bytes);
    }

    Ok(bytes)
}

/// Parse `text` and replace the contents of the file at `filepath` with the result.
/// The new contents are written to a temporary file next to the target and then
/// renamed over it, so the target is either fully old or fully new.
/// The file may shrink or grow. Returns the new length.
///
/// # Errors
/// Returns an error if the text is not a valid patch (the file is left untouched),
/// or if writing or replacing the file fails.
pub fn save_patch<P: AsRef<Path>>(
    filepath: P,
    text: &str,
    layout: &DisplayLayout,
) -> Result<usize, DumpError> {
    let bytes = parse_patch(text, layout)?;
    let path = filepath.as_ref();

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(&bytes)?;
    tmp.as_file().sync_all()?;

    // Keep the permissions of the file being replaced
    if let Ok(meta) = std::fs::metadata(path) {
        std::fs::set_permissions(tmp.path(), meta.permissions())?;
    }

    tmp.persist(path).map_err(|err| DumpError::IoError(err.error))?;

    log::debug!("Saved 0x{:X} bytes to {}", bytes.len(), path.display());
    Ok(bytes.len())
}

/// Hex column of `line` if the line still has the exact rendered shape:
/// 8 hex digit address, `": "`, padded hex column, one space, ASCII column.
fn rendered_hex_column<'a>(line: &'a str, layout: &DisplayLayout) -> Option<&'a str> {
    if !line.is_ascii() {
        return None;
    }

    let ascii = layout.ascii_column();
    if line.len() < ascii || line.len() > ascii + layout.bytes_per_line() {
        return None;
    }

    let raw = line.as_bytes();
    let address_ok = raw[..ADDRESS_COLUMN_WIDTH - 2]
        .iter()
        .all(u8::is_ascii_hexdigit);
    if !address_ok || &raw[ADDRESS_COLUMN_WIDTH - 2..ADDRESS_COLUMN_WIDTH] != b": " {
        return None;
    }
    if raw[ascii - 1] != b' ' {
        return None;
    }

    Some(&line[ADDRESS_COLUMN_WIDTH..ascii - 1])
}

fn parse_hex_token(token: &str) -> Option<u8> {
    if token.len() != 2 || !token.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u8::from_str_radix(token, 16).ok()
}
