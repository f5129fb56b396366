//! Search and jump queries: turning user input into byte patterns or offsets and
//! finding patterns in the source bytes.

use crate::error::{DumpError, DumpErrorKind};
use regex::bytes::Regex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchType {
    Hex(Vec<u8>),
    Ascii(String),
    Regex(String),
}

impl SearchType {
    /// Interprets a search query. Input made only of hex digits and spaces, with an
    /// even number of digits, is a byte pattern; anything else is literal ASCII text.
    ///
    /// # Errors
    /// Returns an error if the query is empty.
    ///
    /// # Example
    /// ```
    /// use romdumplib::SearchType;
    ///
    /// assert_eq!(
    ///     SearchType::parse("DE AD BE EF").unwrap(),
    ///     SearchType::Hex(vec![0xDE, 0xAD, 0xBE, 0xEF])
    /// );
    /// assert_eq!(SearchType::parse("zz").unwrap(), SearchType::Ascii("zz".into()));
    /// ```
    pub fn parse(query: &str) -> Result<Self, DumpError> {
        if query.trim().is_empty() {
            return Err(malformed(query));
        }

        let is_hex_shaped = query.chars().all(|c| c.is_ascii_hexdigit() || c == ' ');
        let digits: Vec<u8> = query.bytes().filter(u8::is_ascii_hexdigit).collect();

        if is_hex_shaped && digits.len() % 2 == 0 {
            let pattern = digits
                .chunks_exact(2)
                .map(|pair| {
                    std::str::from_utf8(pair)
                        .ok()
                        .and_then(|s| u8::from_str_radix(s, 16).ok())
                        .ok_or_else(|| malformed(query))
                })
                .collect::<Result<Vec<u8>, DumpError>>()?;
            return Ok(Self::Hex(pattern));
        }

        Ok(Self::Ascii(query.to_string()))
    }
}

/// Searches for a pattern in `data`.
/// Returns the starting offsets of all matches.
///
/// # Errors
/// Returns an error if a regex pattern does not compile.
pub fn search(data: &[u8], search_type: &SearchType) -> Result<Vec<usize>, DumpError> {
    match search_type {
        SearchType::Hex(p) => Ok(search_bytes(data, p)),
        SearchType::Ascii(s) => Ok(search_bytes(data, s.as_bytes())),
        SearchType::Regex(p) => search_regex(data, p),
    }
}

/// Offset of the first match at or after `from`, wrapping around to the start.
///
/// # Errors
/// Returns [`DumpErrorKind::PatternNotFound`] if nothing matches, or an error if a
/// regex pattern does not compile.
///
/// # Example
/// ```
/// use romdumplib::{SearchType, find_next};
///
/// let mut data = vec![0u8; 64];
/// data[32..36].copy_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);
///
/// let query = SearchType::parse("DE AD BE EF").unwrap();
/// assert_eq!(find_next(&data, &query, 0).unwrap(), 32);
/// ```
pub fn find_next(data: &[u8], search_type: &SearchType, from: usize) -> Result<usize, DumpError> {
    let matches = search(data, search_type)?;

    matches
        .iter()
        .find(|&&offset| offset >= from)
        .or_else(|| matches.first())
        .copied()
        .ok_or(DumpError::QueryError(DumpErrorKind::PatternNotFound))
}

/// Slide window search.
/// Returns the starting offsets of all matches.
fn search_bytes(data: &[u8], pattern: &[u8]) -> Vec<usize> {
    let size = pattern.len();
    if size == 0 {
        return vec![];
    }

    data.windows(size)
        .enumerate()
        .filter(|(_, window)| *window == pattern)
        .map(|(offset, _)| offset)
        .collect()
}

/// Regex search over raw bytes.
/// Returns the starting offsets of all matches.
fn search_regex(data: &[u8], pattern: &str) -> Result<Vec<usize>, DumpError> {
    let re = Regex::new(pattern).map_err(|_| malformed(pattern))?;
    Ok(re.find_iter(data).map(|m| m.start()).collect())
}

/// Parse an address-jump query: optional `0x` or `$` prefix and 1 to 8 hex digits.
///
/// # Errors
/// Returns an error if the input does not follow that grammar, or if the offset is
/// not inside a source of `source_len` bytes.
///
/// # Example
/// ```
/// use romdumplib::parse_jump_query;
///
/// assert_eq!(parse_jump_query("$7FC0", 0x8000).unwrap(), 0x7FC0);
/// assert!(parse_jump_query("0x8000", 0x8000).is_err());
/// ```
pub fn parse_jump_query(input: &str, source_len: usize) -> Result<usize, DumpError> {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .or_else(|| trimmed.strip_prefix('$'))
        .unwrap_or(trimmed);

    if digits.is_empty() || digits.len() > 8 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(malformed(input));
    }

    let offset = usize::from_str_radix(digits, 16).map_err(|_| malformed(input))?;
    if offset >= source_len {
        return Err(DumpError::QueryError(DumpErrorKind::OffsetOutOfRange(
            offset, source_len,
        )));
    }
    Ok(offset)
}

/// Parse a number given as `0x`-prefixed hex or as decimal.
///
/// # Errors
/// Returns an error if the input is neither.
///
/// # Example
/// ```
/// use romdumplib::parse_number;
///
/// assert_eq!(parse_number("0x200").unwrap(), 512);
/// assert_eq!(parse_number("256").unwrap(), 256);
/// ```
pub fn parse_number(input: &str) -> Result<u64, DumpError> {
    let s = input.trim();

    let res = if let Some(hex_str) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u64::from_str_radix(hex_str, 16)
    } else {
        s.parse::<u64>()
    };

    res.map_err(|_| malformed(input))
}

fn malformed(input: &str) -> DumpError {
    DumpError::QueryError(DumpErrorKind::MalformedQuery(input.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn random_bytes_with(pattern: &[u8], at: usize) -> Vec<u8> {
        let rng = rand::rng();
        let mut random_bytes: Vec<u8> = rng
            .sample_iter(rand::distr::StandardUniform)
            .take(1000)
            .collect();
        random_bytes[at..at + pattern.len()].copy_from_slice(pattern); // plant the pattern
        random_bytes
    }

    #[test]
    fn test_search_bytes() {
        // Arrange
        let pattern = vec![0xAA, 0xBB, 0xCC, 0xDD, 0xEE];
        let data = random_bytes_with(&pattern, 203);

        // Act
        let res = search(&data, &SearchType::Hex(pattern));

        // Assert
        assert_eq!(res.ok(), Some(vec![203]));
    }

    #[test]
    fn test_search_ascii_literals() {
        // Arrange
        let pattern = b"20.71";
        let data = random_bytes_with(pattern, 203);

        // Act
        let res = search(&data, &SearchType::Ascii("20.71".to_string()));

        // Assert
        assert_eq!(res.ok(), Some(vec![203]));
    }

    #[test]
    fn test_search_ascii_regex() {
        // Arrange
        let mut data = vec![0u8; 1000];
        data[203..208].copy_from_slice(b"77LoL");

        // Act
        let res = search(&data, &SearchType::Regex(r"\d{2}\D{2}L".to_string()));

        // Assert
        assert_eq!(res.ok(), Some(vec![203]));
    }

    #[test]
    fn test_invalid_regex_is_malformed() {
        // Act
        let res = search(b"abc", &SearchType::Regex("(".to_string()));

        // Assert
        assert!(matches!(
            res,
            Err(DumpError::QueryError(DumpErrorKind::MalformedQuery(_)))
        ));
    }

    #[test]
    fn test_parse_query_kinds() {
        assert_eq!(
            SearchType::parse("DE AD BE EF").ok(),
            Some(SearchType::Hex(vec![0xDE, 0xAD, 0xBE, 0xEF]))
        );
        assert_eq!(
            SearchType::parse("cafe").ok(),
            Some(SearchType::Hex(vec![0xCA, 0xFE]))
        );
        assert_eq!(
            SearchType::parse("zz").ok(),
            Some(SearchType::Ascii("zz".to_string()))
        );
        assert_eq!(
            SearchType::parse("ABC").ok(),
            Some(SearchType::Ascii("ABC".to_string()))
        );
        assert!(SearchType::parse("").is_err());
        assert!(SearchType::parse("   ").is_err());
    }

    #[test]
    fn test_find_next_wraps_and_reports_missing() {
        // Arrange
        let mut data = vec![0u8; 64];
        data[32..36].copy_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);
        data[8..12].copy_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);
        let query = SearchType::Hex(vec![0xDE, 0xAD, 0xBE, 0xEF]);

        // Act & Assert
        assert_eq!(find_next(&data, &query, 9).ok(), Some(32));
        assert_eq!(find_next(&data, &query, 33).ok(), Some(8));
        assert!(matches!(
            find_next(&data, &SearchType::Ascii("zz".into()), 0),
            Err(DumpError::QueryError(DumpErrorKind::PatternNotFound))
        ));
    }

    #[test]
    fn test_parse_jump_query() {
        assert_eq!(parse_jump_query("1f", 0x100).ok(), Some(0x1F));
        assert_eq!(parse_jump_query("0x1F", 0x100).ok(), Some(0x1F));
        assert_eq!(parse_jump_query(" $FF ", 0x100).ok(), Some(0xFF));
        assert!(parse_jump_query("", 0x100).is_err());
        assert!(parse_jump_query("$", 0x100).is_err());
        assert!(parse_jump_query("123456789", usize::MAX).is_err());
        assert!(parse_jump_query("0xG0", 0x100).is_err());
        assert!(matches!(
            parse_jump_query("100", 0x100),
            Err(DumpError::QueryError(DumpErrorKind::OffsetOutOfRange(0x100, 0x100)))
        ));
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("0x200").ok(), Some(0x200));
        assert_eq!(parse_number("0X1f").ok(), Some(0x1F));
        assert_eq!(parse_number("42").ok(), Some(42));
        assert!(parse_number("1f").is_err());
        assert!(parse_number("-1").is_err());
    }
}
