//! Comment removal.
//!
//! Four strategies share one rule set: a comment that is the only
//! non-whitespace content of its line takes the whole line with it (including
//! the trailing newline); a comment trailing code on a line is removed
//! together with the whitespace before it, but the line survives. Comment
//! markers inside strings and template literals are never touched — every
//! character is routed through [`crate::scan::LexState`].
//!
//! HTML comments are the exception: they are removed by a two-phase regex
//! sweep (line-only first, inline second). The line-only phase skips IE
//! conditional comments (`<!--[if`); the inline phase removes them. That
//! asymmetry is deliberate and load-bearing for existing inputs.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::lang::LanguageTag;
use crate::scan::{LexState, ScanOptions, StepClass};

/// Which comment syntaxes the custom stripper removes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkerSelection {
    /// `<!-- ... -->`
    pub html: bool,
    /// `/* ... */`
    pub c_block: bool,
    /// `// ...`
    pub c_line: bool,
    /// `# ...`
    pub hash: bool,
}

static HTML_COMMENT_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?ms)^[ \t]*<!--.*?-->[ \t]*(?:\r?\n|$)").unwrap());
static HTML_COMMENT_INLINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());
static TRAILING_BLANKS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+(\r?\n)").unwrap());

static C_BLOCK_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?ms)^[ \t]*/\*.*?\*/[ \t]*(?:\r?\n|$)").unwrap());
static C_BLOCK_INLINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());
static C_LINE_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*//[^\n]*(?:\r?\n|$)").unwrap());
static C_LINE_INLINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"//[^\n]*").unwrap());
static HASH_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*#[^\n]*(?:\r?\n|$)").unwrap());
static HASH_INLINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"([^"'`\n])#[^\n]*"#).unwrap());

/// Strip comments from `code` according to `lang`.
///
/// Unrecognized languages fall back to the generic C-like stripper with hash
/// comments and template literals disabled.
pub fn strip_comments(code: &str, lang: LanguageTag) -> String {
    match lang {
        LanguageTag::HtmlXml => strip_html_comments(code),
        LanguageTag::JavaScript => strip_with_markers(code, true, true, false, true, false),
        LanguageTag::Php => strip_with_markers(code, true, true, true, true, false),
        LanguageTag::Python => strip_comments_python(code),
        LanguageTag::Css | LanguageTag::Json | LanguageTag::Plain => {
            strip_with_markers(code, true, true, false, false, false)
        }
    }
}

/// Strict Python stripper: `#` comments only, with `'''`/`"""` literals
/// treated as opaque regions never scanned for markers.
pub fn strip_comments_python(code: &str) -> String {
    strip_with_markers(code, false, false, true, false, true)
}

/// Strip a custom selection of comment kinds, language-agnostic.
pub fn strip_comments_custom(code: &str, selection: MarkerSelection) -> String {
    let mut s = if selection.html {
        strip_html_comments(code)
    } else {
        code.to_string()
    };
    if selection.c_block || selection.c_line || selection.hash {
        s = strip_with_markers(
            &s,
            selection.c_line,
            selection.c_block,
            selection.hash,
            true,
            false,
        );
    }
    s
}

/// Remove every recognized comment marker kind in one sweep, without language
/// context. Purely regex-driven and therefore blunter than the per-language
/// strippers: a marker inside a string survives only the hash pass (which
/// refuses a `#` directly preceded by a quote).
pub fn strip_comments_all(code: &str) -> String {
    let s = replace_html_line_comments(code);
    let s = HTML_COMMENT_INLINE_RE.replace_all(&s, "");

    let s = C_BLOCK_LINE_RE.replace_all(&s, "");
    let s = C_BLOCK_INLINE_RE.replace_all(&s, "");

    let s = C_LINE_LINE_RE.replace_all(&s, "");
    let s = C_LINE_INLINE_RE.replace_all(&s, "");

    let s = HASH_LINE_RE.replace_all(&s, "");
    let s = HASH_INLINE_RE.replace_all(&s, "$1");

    TRAILING_BLANKS_RE.replace_all(&s, "$1").into_owned()
}

/// Two-phase HTML comment removal, then trailing-blank cleanup.
pub fn strip_html_comments(code: &str) -> String {
    let s = replace_html_line_comments(code);
    let s = HTML_COMMENT_INLINE_RE.replace_all(&s, "");
    TRAILING_BLANKS_RE.replace_all(&s, "$1").into_owned()
}

/// Line-only `<!-- ... -->` removal that leaves `<!--[if` blocks in place.
fn replace_html_line_comments(code: &str) -> String {
    HTML_COMMENT_LINE_RE
        .replace_all(code, |caps: &regex::Captures<'_>| {
            let m = &caps[0];
            if m.trim_start().starts_with("<!--[if") {
                m.to_string()
            } else {
                String::new()
            }
        })
        .into_owned()
}

/// True when the output already holds non-whitespace content on its last line.
fn had_code_on_line(out: &[char]) -> bool {
    out.iter()
        .rev()
        .take_while(|&&c| c != '\n')
        .any(|c| !c.is_whitespace())
}

/// Drop spaces and tabs at the end of the current output line.
fn pop_line_blanks(out: &mut Vec<char>) {
    while matches!(out.last(), Some(' ') | Some('\t')) {
        out.pop();
    }
}

/// The machine-driven stripper behind every non-HTML strategy.
fn strip_with_markers(
    code: &str,
    c_line: bool,
    c_block: bool,
    hash: bool,
    template_literals: bool,
    triple_quotes: bool,
) -> String {
    let chars: Vec<char> = code.chars().collect();
    let opts = ScanOptions {
        slash_line_comments: c_line,
        block_comments: c_block,
        hash_comments: hash,
        template_literals,
        triple_quotes,
        ..Default::default()
    };
    let mut state = LexState::new();
    let mut out: Vec<char> = Vec::with_capacity(chars.len());
    let mut i = 0;
    let mut line_had_code = true;
    let mut block_had_code_before = true;

    while i < chars.len() {
        let step = state.step(&chars, i, &opts);
        match step.class {
            StepClass::LineCommentOpen => {
                line_had_code = had_code_on_line(&out);
                pop_line_blanks(&mut out);
                i += step.width;
            }
            StepClass::LineCommentBody => {
                i += step.width;
            }
            StepClass::LineCommentEnd => {
                // Whole-line comments take the newline with them.
                if line_had_code {
                    out.push('\n');
                }
                i += step.width;
            }
            StepClass::BlockCommentOpen => {
                block_had_code_before = had_code_on_line(&out);
                pop_line_blanks(&mut out);
                i += step.width;
            }
            StepClass::BlockCommentBody => {
                i += step.width;
            }
            StepClass::BlockCommentClose => {
                i += step.width;
                if !block_had_code_before {
                    // Consume the rest of a now-blank line.
                    let mut j = i;
                    while j < chars.len() && (chars[j] == ' ' || chars[j] == '\t') {
                        j += 1;
                    }
                    if j < chars.len() && chars[j] == '\n' {
                        i = j + 1;
                    }
                }
            }
            _ => {
                out.extend_from_slice(&chars[i..i + step.width]);
                i += step.width;
            }
        }
    }

    out.into_iter().collect()
}
