//! Helpers for building and applying prompt patterns.

use memchr::memrchr;
use regex::bytes::Regex;

/// Build one regex matching any of `patterns`.
///
/// Inline flags such as `(?mi)` stay scoped to their own alternative.
pub fn any_of<'a>(patterns: impl IntoIterator<Item = &'a Regex>) -> Result<Regex, regex::Error> {
    let combined = patterns
        .into_iter()
        .map(|p| format!("(?:{})", p.as_str()))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&combined)
}

/// The final line of `data`, without trailing whitespace.
///
/// After a prompt match this is the prompt itself.
pub fn last_line(data: &[u8]) -> String {
    let trimmed = trim_end(data);
    let start = memrchr(b'\n', trimmed).map_or(0, |pos| pos + 1);
    String::from_utf8_lossy(&trimmed[start..])
        .trim_start_matches('\r')
        .to_string()
}

fn trim_end(data: &[u8]) -> &[u8] {
    let end = data
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(0, |pos| pos + 1);
    &data[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_of() {
        let user = Regex::new(r"(?m)^\w+>\s?$").unwrap();
        let privileged = Regex::new(r"(?m)^\w+#\s?$").unwrap();
        let combined = any_of([&user, &privileged]).unwrap();

        assert!(combined.is_match(b"output\r\nR1>"));
        assert!(combined.is_match(b"output\r\nR1#"));
        assert!(!combined.is_match(b"output\r\nR1(config)#"));
    }

    #[test]
    fn test_last_line() {
        assert_eq!(last_line(b"show clock\r\n*10:00:00\r\nR1#"), "R1#");
        assert_eq!(last_line(b"R1(config)# \r\n"), "R1(config)#");
        assert_eq!(last_line(b"R1>"), "R1>");
        assert_eq!(last_line(b""), "");
    }
}
