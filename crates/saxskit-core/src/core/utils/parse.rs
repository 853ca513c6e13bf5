//! Best-effort parsing combinators.
//!
//! Field-level and row-level failures in the flat formats are recovered by
//! skipping the field or row. These helpers make that skip an explicit `None`
//! instead of a swallowed error.

use std::str::FromStr;

/// Returns the `[start, end)` byte slice of `line`, clipped to the line length.
///
/// Short lines yield a shorter (possibly empty) slice. A range that would split
/// a multi-byte character yields an empty slice.
pub fn columns(line: &str, start: usize, end: usize) -> &str {
    let end = end.min(line.len());
    if start >= end {
        return "";
    }
    line.get(start..end).unwrap_or("")
}

/// Parses a trimmed column slice, or `None` if it is blank or malformed.
pub fn field<T: FromStr>(slice: &str) -> Option<T> {
    let trimmed = slice.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse().ok()
}

/// Reads the first `N` whitespace-separated tokens of `line` as floats.
///
/// Returns `None` if the line has fewer than `N` tokens or any of them is not
/// a number. Extra trailing tokens are ignored.
pub fn float_row<const N: usize>(line: &str) -> Option<[f64; N]> {
    let mut row = [0.0; N];
    let mut tokens = line.split_whitespace();
    for slot in row.iter_mut() {
        *slot = tokens.next()?.parse().ok()?;
    }
    Some(row)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_clips_to_line_length() {
        let line = "ATOM      1";
        assert_eq!(columns(line, 6, 11), "    1");
        assert_eq!(columns(line, 6, 20), "    1");
        assert_eq!(columns(line, 30, 38), "");
    }

    #[test]
    fn field_returns_none_for_blank_or_malformed_text() {
        assert_eq!(field::<i64>("   42 "), Some(42));
        assert_eq!(field::<f64>("  11.104"), Some(11.104));
        assert_eq!(field::<i64>("     "), None);
        assert_eq!(field::<f64>("  1x.00"), None);
    }

    #[test]
    fn float_row_requires_enough_numeric_tokens() {
        assert_eq!(float_row::<3>("0.1 2.0 0.5 extra"), Some([0.1, 2.0, 0.5]));
        assert_eq!(float_row::<3>("0.1 2.0"), None);
        assert_eq!(float_row::<3>("Q I E"), None);
        assert_eq!(float_row::<3>(""), None);
    }
}
