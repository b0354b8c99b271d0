//! Minification.
//!
//! JSON gets the strict treatment: parse and re-serialize with no extraneous
//! whitespace. Everything else is layered on the comment stripper: collapse
//! whitespace runs outside strings to a single space, then drop the spaces
//! hugging punctuation. String and template-literal interiors pass through
//! byte-for-byte — the collapse pass already leaves no newlines outside
//! strings, so no blind newline sweep runs over the result.

use crate::lang::LanguageTag;
use crate::scan::{LexState, ScanOptions, StepClass};
use crate::strip::strip_comments;

/// Punctuation that sheds surrounding spaces during minification.
const TIGHT_PUNCT: &str = ";,:{}()[]=+-*/<>|&!%^?.";

/// Minify `code` for `lang`. Idempotent; total (malformed JSON falls back to
/// the generic path rather than erroring).
pub fn minify(code: &str, lang: LanguageTag) -> String {
    if lang == LanguageTag::Json {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(code) {
            if let Ok(compact) = serde_json::to_string(&value) {
                return compact;
            }
        }
    }
    let s = strip_comments(code, lang);
    let s = collapse_ws_outside_strings(&s);
    let s = tighten_punct_ws(&s);
    s.trim().to_string()
}

/// Scanner options for the minifier passes: comments are already gone, and a
/// backtick behaves like a plain quote so template interiors stay untouched.
fn quote_only_opts() -> ScanOptions {
    ScanOptions {
        backtick_quotes: true,
        ..Default::default()
    }
}

/// Collapse every whitespace run outside strings to a single space.
fn collapse_ws_outside_strings(code: &str) -> String {
    let chars: Vec<char> = code.chars().collect();
    let opts = quote_only_opts();
    let mut state = LexState::new();
    let mut out = String::with_capacity(code.len());
    let mut i = 0;
    let mut pending_ws = false;

    while i < chars.len() {
        let step = state.step(&chars, i, &opts);
        match step.class {
            StepClass::StringOpen => {
                out.push(chars[i]);
                pending_ws = false;
                i += step.width;
            }
            StepClass::StringBody | StepClass::StringClose => {
                out.extend(&chars[i..i + step.width]);
                i += step.width;
            }
            _ => {
                let c = chars[i];
                if c.is_whitespace() {
                    pending_ws = true;
                } else {
                    if pending_ws {
                        if out.chars().last().map_or(true, |l| !l.is_whitespace()) {
                            out.push(' ');
                        }
                        pending_ws = false;
                    }
                    out.push(c);
                }
                i += step.width;
            }
        }
    }
    out
}

/// Remove spaces immediately before and after tight punctuation, outside
/// strings.
fn tighten_punct_ws(code: &str) -> String {
    let chars: Vec<char> = code.chars().collect();
    let opts = quote_only_opts();
    let mut state = LexState::new();
    let mut out = String::with_capacity(code.len());
    let mut i = 0;

    while i < chars.len() {
        let step = state.step(&chars, i, &opts);
        match step.class {
            StepClass::Code => {
                let c = chars[i];
                if TIGHT_PUNCT.contains(c) {
                    while out.ends_with(' ') {
                        out.pop();
                    }
                    out.push(c);
                    i += 1;
                    // Spaces after the punctuation go too; the scanner state
                    // cannot change across a run of plain spaces.
                    while i < chars.len() && chars[i] == ' ' {
                        i += 1;
                    }
                } else {
                    out.push(c);
                    i += 1;
                }
            }
            _ => {
                out.extend(&chars[i..i + step.width]);
                i += step.width;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minify_json_canonical() {
        let src = "{\n  \"b\": [1, 2],\n  \"a\": \"x y\"\n}";
        assert_eq!(minify(src, LanguageTag::Json), r#"{"b":[1,2],"a":"x y"}"#);
    }

    #[test]
    fn test_minify_invalid_json_falls_back() {
        let src = "{ a : 1 } // note";
        assert_eq!(minify(src, LanguageTag::Json), "{a:1}");
    }

    #[test]
    fn test_minify_js_collapses_and_tightens() {
        let src = "function f( a , b ) {\n    return a + b ;\n}\n";
        assert_eq!(
            minify(src, LanguageTag::JavaScript),
            "function f(a,b){return a+b;}"
        );
    }

    #[test]
    fn test_minify_preserves_string_whitespace() {
        let src = "var s = \"a    b\\n  c\";";
        assert_eq!(
            minify(src, LanguageTag::JavaScript),
            "var s=\"a    b\\n  c\";"
        );
    }

    #[test]
    fn test_minify_preserves_template_literal() {
        let src = "let t = `keep   this\n  spacing`;";
        assert_eq!(
            minify(src, LanguageTag::JavaScript),
            "let t=`keep   this\n  spacing`;"
        );
    }

    #[test]
    fn test_minify_strips_comments_first() {
        let src = "a(); // gone\n/* also */\nb();\n";
        assert_eq!(minify(src, LanguageTag::JavaScript), "a();b();");
    }

    #[test]
    fn test_minify_idempotent() {
        let src = "function f( x ) { // c\n  return x * 2 ;\n}\n";
        let once = minify(src, LanguageTag::JavaScript);
        assert_eq!(minify(&once, LanguageTag::JavaScript), once);
    }
}
