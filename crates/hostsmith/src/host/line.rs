//! Line helpers — comment stripping, IP stripping and DNS label utilities.

use std::iter;

use thiserror::Error;

use super::{is_ip_address, CUTSET, DELIM_COMMENT, DELIM_DNS};

/// A line fed to [`trim_comment`] contained a line feed before its comment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line break found before comment in {line:?}")]
pub struct LineBreakError {
    pub line: String,
}

/// Collapses every run of white space into a single space and trims both ends.
pub fn trim_word_gaps(line: &str) -> String {
    line.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Removes the comment from `line` and right-trims what is left.
///
/// A `#` preceded by a backslash is literal and does not start a comment.
/// The line must be a single line: a `\n` before the comment is an error.
pub fn trim_comment(line: &str) -> Result<&str, LineBreakError> {
    let mut escaped = false;
    let mut end = line.len();

    for (pos, ch) in line.char_indices() {
        match ch {
            '\n' => {
                return Err(LineBreakError {
                    line: line.to_string(),
                })
            }
            '\\' => {
                escaped = !escaped;
                continue;
            }
            DELIM_COMMENT if !escaped => {
                end = pos;
                break;
            }
            _ => {}
        }
        escaped = false;
    }

    Ok(line[..end].trim_end_matches(CUTSET))
}

/// Strips every leading IP address token from `line`.
///
/// Word gaps are collapsed first, so the result is single-space separated.
/// An IP-only line becomes empty.
pub fn trim_ip_address(line: &str) -> String {
    let collapsed = trim_word_gaps(line);
    let mut rest = collapsed.as_str();

    loop {
        let (head, tail) = rest.split_once(' ').unwrap_or((rest, ""));
        if head.is_empty() || !is_ip_address(head) {
            break;
        }
        rest = tail;
    }

    rest.to_string()
}

/// Returns true if the first non-space character of `line` is `#`.
pub fn is_comment_line(line: &str) -> bool {
    line.trim_start_matches(CUTSET).starts_with(DELIM_COMMENT)
}

/// Keeps the right-most `level + 1` labels of `host`.
///
/// `trim_dns_by_level("www.example.com", 0)` is `com`. A level past the
/// number of labels returns the host unchanged.
pub fn trim_dns_by_level(host: &str, level: usize) -> &str {
    match host.rmatch_indices(DELIM_DNS).nth(level) {
        Some((pos, _)) => &host[pos + 1..],
        None => host,
    }
}

/// Splits a normalized line into its chunks, skipping repeated separators.
pub(crate) fn chunks(line: &str) -> impl Iterator<Item = &str> {
    line.split(CUTSET).filter(|chunk| !chunk.is_empty())
}

/// Joins host chunks after an optional leading IP token.
pub(crate) fn join_with_ip<'a>(ip: &'a str, hosts: &'a [String]) -> String {
    iter::once(ip)
        .filter(|ip| !ip.is_empty())
        .chain(hosts.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── trim_word_gaps ──────────────────────────────────────────

    #[test]
    fn test_trim_word_gaps() {
        assert_eq!(trim_word_gaps("  a \t b\u{0B}c  "), "a b c");
        assert_eq!(trim_word_gaps(""), "");
        assert_eq!(trim_word_gaps(" \t "), "");
    }

    // ── trim_comment ────────────────────────────────────────────

    #[test]
    fn test_trim_comment() {
        let cases = [
            ("0.0.0.0 example.com # comment", "0.0.0.0 example.com"),
            ("# comment only", ""),
            ("example.com\t#tab before", "example.com"),
            ("no comment here  ", "no comment here"),
            ("  leading kept # x", "  leading kept"),
            (r"escaped \# hash", r"escaped \# hash"),
            (r"double \\# hash", r"double \\"),
            ("", ""),
        ];

        for (input, expect) in cases {
            assert_eq!(trim_comment(input).unwrap(), expect, "input: {input:?}");
        }
    }

    #[test]
    fn test_trim_comment_line_break() {
        let err = trim_comment("127.0.0.1 example.com \n # comment").unwrap_err();
        assert!(err.line.contains("example.com"));

        // A line feed after the comment starts is part of the comment.
        assert_eq!(trim_comment("host # a\nb").unwrap(), "host");
    }

    // ── trim_ip_address ─────────────────────────────────────────

    #[test]
    fn test_trim_ip_address() {
        let cases = [
            (
                "123.123.123.123    0.0.0.0    sub1.example.com    sub2.example.com",
                "sub1.example.com sub2.example.com",
            ),
            ("123.123.123.123", ""),
            ("::1 localhost", "localhost"),
            ("example.com 0.0.0.0", "example.com 0.0.0.0"),
            ("  \t ", ""),
        ];

        for (input, expect) in cases {
            assert_eq!(trim_ip_address(input), expect, "input: {input:?}");
        }
    }

    // ── is_comment_line ─────────────────────────────────────────

    #[test]
    fn test_is_comment_line() {
        assert!(is_comment_line("# hello"));
        assert!(is_comment_line(" \t# hello"));
        assert!(!is_comment_line("0.0.0.0 example.com # hello"));
        assert!(!is_comment_line(""));
    }

    // ── DNS labels ──────────────────────────────────────────────

    #[test]
    fn test_trim_dns_by_level() {
        let cases = [
            (0, "com"),
            (1, "example.com"),
            (2, "www.example.com"),
            (5, "www.example.com"),
        ];

        for (level, expect) in cases {
            assert_eq!(trim_dns_by_level("www.example.com", level), expect, "level {level}");
        }
    }

    #[test]
    fn test_chunks_and_join() {
        let hosts: Vec<String> = chunks(" a \t b  c").map(str::to_string).collect();
        assert_eq!(hosts, vec!["a", "b", "c"]);
        assert_eq!(join_with_ip("0.0.0.0", &hosts), "0.0.0.0 a b c");
        assert_eq!(join_with_ip("", &hosts), "a b c");
        assert_eq!(join_with_ip("", &[]), "");
    }
}
