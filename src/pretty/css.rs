//! CSS reformatting.
//!
//! Comments are stripped first, then the text is tokenized into quoted
//! strings, the three structural characters `{` `}` `;`, and everything in
//! between. Selector text and declaration text are normalized on flush.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::lang::LanguageTag;
use crate::strip::strip_comments;

static CSS_TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)"[^"\\]*(?:\\.[^"\\]*)*"|'[^'\\]*(?:\\.[^'\\]*)*'|[{};]|[^{};'"]+"#).unwrap()
});

static WS_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static COMMA_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*,\s*").unwrap());
static OPEN_PAREN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(\s*").unwrap());
static CLOSE_PAREN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\)").unwrap());
static SEL_COLON_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r":\s*").unwrap());
static PROP_COLON_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*:\s*").unwrap());

/// Normalize selector text: collapsed whitespace, tight pseudo-class colons,
/// tight parentheses, spaced commas.
fn norm_selector(text: &str) -> String {
    let t = WS_RUN_RE.replace_all(text, " ");
    let t = COMMA_RE.replace_all(&t, ", ");
    let t = OPEN_PAREN_RE.replace_all(&t, "(");
    let t = CLOSE_PAREN_RE.replace_all(&t, ")");
    let t = SEL_COLON_RE.replace_all(&t, ":");
    t.trim().to_string()
}

/// Normalize declaration text: `prop: value`, spaced commas.
fn norm_declaration(text: &str) -> String {
    let t = WS_RUN_RE.replace_all(text, " ");
    let t = PROP_COLON_RE.replace_all(&t, ": ");
    let t = COMMA_RE.replace_all(&t, ", ");
    t.trim().to_string()
}

pub fn format_css(code: &str, indent: &str) -> String {
    let stripped = strip_comments(code, LanguageTag::Css);
    let stripped = stripped.trim();

    let mut level: usize = 0;
    let mut out: Vec<String> = Vec::new();
    let mut buf = String::new();

    for tok in CSS_TOKEN_RE.find_iter(stripped).map(|m| m.as_str()) {
        match tok {
            "{" => {
                let sel = norm_selector(&buf);
                buf.clear();
                out.push(format!("{}{} {{", indent.repeat(level), sel));
                level += 1;
            }
            "}" => {
                if !buf.trim().is_empty() {
                    let line = norm_declaration(&buf);
                    let line = line.trim_end_matches(';');
                    out.push(format!("{}{};", indent.repeat(level), line));
                    buf.clear();
                } else {
                    buf.clear();
                }
                level = level.saturating_sub(1);
                out.push(format!("{}}}", indent.repeat(level)));
            }
            ";" => {
                let line = norm_declaration(&buf);
                buf.clear();
                out.push(format!("{}{};", indent.repeat(level), line));
            }
            _ => buf.push_str(tok),
        }
    }

    if !buf.trim().is_empty() {
        let line = norm_declaration(&buf);
        let line = line.trim_end_matches(';');
        out.push(format!("{}{};", indent.repeat(level), line));
    }

    out.join("\n").trim_end().to_string()
}
