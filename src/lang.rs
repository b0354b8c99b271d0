//! Language detection from cheap structural signatures.
//!
//! No parsing happens here beyond a single JSON probe: the detector looks at
//! the shape of the first few kilobytes (leading bracket, `<?php`, tag shape,
//! keyword patterns, selector patterns) and picks the most plausible tag.
//! Callers treat the answer as a hint, never as a guarantee.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

/// Number of characters of the sample the detector looks at.
pub const DETECT_SAMPLE_LIMIT: usize = 8192;

/// The closed set of languages the transformers understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LanguageTag {
    HtmlXml,
    Css,
    JavaScript,
    Php,
    Json,
    Python,
    Plain,
}

impl LanguageTag {
    /// All tags, in display order.
    pub const ALL: [LanguageTag; 7] = [
        LanguageTag::HtmlXml,
        LanguageTag::Css,
        LanguageTag::JavaScript,
        LanguageTag::Php,
        LanguageTag::Json,
        LanguageTag::Python,
        LanguageTag::Plain,
    ];
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LanguageTag::HtmlXml => "HTML/XML",
            LanguageTag::Css => "CSS",
            LanguageTag::JavaScript => "JavaScript",
            LanguageTag::Php => "PHP",
            LanguageTag::Json => "JSON",
            LanguageTag::Python => "Python",
            LanguageTag::Plain => "Plain",
        };
        write!(f, "{}", name)
    }
}

/// Error for unrecognized language names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLanguage(pub String);

impl fmt::Display for UnknownLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown language '{}'", self.0)
    }
}

impl std::error::Error for UnknownLanguage {}

impl FromStr for LanguageTag {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "html" | "xml" | "html/xml" => Ok(LanguageTag::HtmlXml),
            "css" => Ok(LanguageTag::Css),
            "javascript" | "js" => Ok(LanguageTag::JavaScript),
            "php" => Ok(LanguageTag::Php),
            "json" => Ok(LanguageTag::Json),
            "python" | "py" => Ok(LanguageTag::Python),
            "plain" | "text" => Ok(LanguageTag::Plain),
            _ => Err(UnknownLanguage(s.to_string())),
        }
    }
}

static HTML_DOC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:<!DOCTYPE|<html|<svg|<\?xml)").unwrap());
static HTML_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^<\w+[^>]*>").unwrap());
static PYTHON_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|\n)[\t ]*#|^[\t ]*(?:def|class)\s+\w+|^[\t ]*import\s+\w+").unwrap()
});
static JS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:function|let|const|var|import\s+.*from)\b|=>").unwrap());
static CSS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.#][\w-]+\s*\{|@media|:root\s*\{").unwrap());

/// Classify a text sample into one of the supported languages.
///
/// Only the first [`DETECT_SAMPLE_LIMIT`] characters are examined. Empty or
/// unrecognizable input is `Plain`.
pub fn detect_language(sample: &str) -> LanguageTag {
    detect_language_limited(sample, DETECT_SAMPLE_LIMIT)
}

/// [`detect_language`] with an explicit sample cap.
pub fn detect_language_limited(sample: &str, limit: usize) -> LanguageTag {
    let mut s = sample;
    if s.chars().count() > limit {
        let end = s
            .char_indices()
            .nth(limit)
            .map(|(i, _)| i)
            .unwrap_or(s.len());
        s = &s[..end];
    }
    let s = s.trim();
    if s.is_empty() {
        return LanguageTag::Plain;
    }
    if s.starts_with('{') || s.starts_with('[') {
        if serde_json::from_str::<serde_json::Value>(s).is_ok() {
            return LanguageTag::Json;
        }
    }
    if s.contains("<?php") {
        return LanguageTag::Php;
    }
    if s.starts_with('<') && (HTML_DOC_RE.is_match(s) || HTML_TAG_RE.is_match(s)) {
        return LanguageTag::HtmlXml;
    }
    if PYTHON_RE.is_match(s) {
        return LanguageTag::Python;
    }
    if JS_RE.is_match(s) {
        return LanguageTag::JavaScript;
    }
    if CSS_RE.is_match(s) {
        return LanguageTag::Css;
    }
    LanguageTag::Plain
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_json() {
        assert_eq!(detect_language(r#"{"a": [1, 2]}"#), LanguageTag::Json);
        // Broken JSON with a leading brace is not JSON
        assert_ne!(detect_language(r#"{a: 1}"#), LanguageTag::Json);
    }

    #[test]
    fn test_detect_php_anywhere() {
        assert_eq!(
            detect_language("<html><?php echo 1; ?></html>"),
            LanguageTag::Php
        );
    }

    #[test]
    fn test_detect_html() {
        assert_eq!(
            detect_language("<!DOCTYPE html>\n<html></html>"),
            LanguageTag::HtmlXml
        );
        assert_eq!(detect_language("<div class=\"x\">hi</div>"), LanguageTag::HtmlXml);
    }

    #[test]
    fn test_detect_python() {
        assert_eq!(detect_language("def main():\n    pass\n"), LanguageTag::Python);
        assert_eq!(detect_language("# a comment\nx = 1\n"), LanguageTag::Python);
    }

    #[test]
    fn test_detect_javascript() {
        assert_eq!(
            detect_language("const x = () => 1;"),
            LanguageTag::JavaScript
        );
    }

    #[test]
    fn test_detect_css() {
        assert_eq!(
            detect_language(".btn { color: red; }"),
            LanguageTag::Css
        );
        assert_eq!(detect_language("@media (min-width: 10px) {}"), LanguageTag::Css);
    }

    #[test]
    fn test_detect_plain() {
        assert_eq!(detect_language(""), LanguageTag::Plain);
        assert_eq!(detect_language("just words here"), LanguageTag::Plain);
    }

    #[test]
    fn test_roundtrip_display_fromstr() {
        for tag in LanguageTag::ALL {
            assert_eq!(tag.to_string().parse::<LanguageTag>().unwrap(), tag);
        }
    }
}
