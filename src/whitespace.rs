//! Whitespace cleanup shared by the formatting surfaces.

use once_cell::sync::Lazy;
use regex::Regex;

static TRAILING_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)[ \t]+$").unwrap());

/// Normalize line endings to `\n`, optionally strip trailing spaces and
/// tabs, squeeze runs of blank lines down to `max_blank_lines`, and drop
/// blank lines at both ends.
pub fn tidy_whitespace(text: &str, max_blank_lines: usize, trim_trailing: bool) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let text = if trim_trailing {
        TRAILING_RE.replace_all(&text, "").into_owned()
    } else {
        text
    };

    let mut out: Vec<&str> = Vec::new();
    let mut blank_run = 0;
    for line in text.split('\n') {
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run <= max_blank_lines {
                out.push(line);
            }
        } else {
            blank_run = 0;
            out.push(line);
        }
    }

    while out.first().is_some_and(|l| l.trim().is_empty()) {
        out.remove(0);
    }
    while out.last().is_some_and(|l| l.trim().is_empty()) {
        out.pop();
    }

    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_runs_squeezed() {
        let out = tidy_whitespace("a\n\n\n\nb", 1, false);
        assert_eq!(out, "a\n\nb");
    }

    #[test]
    fn test_zero_blank_lines_allowed() {
        let out = tidy_whitespace("a\n\n\nb", 0, false);
        assert_eq!(out, "a\nb");
    }

    #[test]
    fn test_trailing_whitespace_stripped() {
        let out = tidy_whitespace("a  \nb\t\n", 1, true);
        assert_eq!(out, "a\nb");
    }

    #[test]
    fn test_trailing_whitespace_kept_when_disabled() {
        let out = tidy_whitespace("a  \nb", 1, false);
        assert_eq!(out, "a  \nb");
    }

    #[test]
    fn test_crlf_normalized() {
        let out = tidy_whitespace("a\r\nb\rc", 1, false);
        assert_eq!(out, "a\nb\nc");
    }

    #[test]
    fn test_outer_blank_lines_dropped() {
        let out = tidy_whitespace("\n\na\n\n", 2, false);
        assert_eq!(out, "a");
    }
}
