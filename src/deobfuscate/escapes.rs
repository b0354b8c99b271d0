//! C/PHP escape-sequence decoding.
//!
//! Two layers: [`decode_c_escapes`] decodes one string fragment, and
//! [`decode_php_string_literals`] walks whole source text decoding string
//! contents in place while leaving code, comments, and quoting intact.
//! Single-quoted strings get PHP semantics (only `\\` and `\'` are
//! escapes); double-quoted strings get the full C repertoire.

use crate::scan::{LexState, ScanOptions, StepClass};

/// Decode C-style escapes in a bare string fragment (no surrounding
/// quotes). Supported: `\n \r \t \v \f \\ \' \" \a \b`, `\xHH` with one or
/// two hex digits, and octal `\NNN` up to three digits. Anything else keeps
/// its backslash.
pub fn decode_c_escapes(fragment: &str) -> String {
    let chars: Vec<char> = fragment.chars().collect();
    let n = chars.len();
    let mut out = String::with_capacity(n);
    let mut i = 0;

    while i < n {
        let c = chars[i];
        if c != '\\' {
            out.push(c);
            i += 1;
            continue;
        }
        i += 1;
        if i >= n {
            out.push('\\');
            break;
        }
        let ch = chars[i];
        i += 1;

        match ch {
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            'v' => out.push('\u{0B}'),
            't' => out.push('\t'),
            'f' => out.push('\u{0C}'),
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'a' => out.push('\u{07}'),
            'b' => out.push('\u{08}'),
            'x' | 'X' => {
                let mut val: u32 = 0;
                let mut digits = 0;
                while i < n && digits < 2 {
                    match chars[i].to_digit(16) {
                        Some(d) => {
                            val = val * 16 + d;
                            digits += 1;
                            i += 1;
                        }
                        None => break,
                    }
                }
                if digits > 0 {
                    // Single-byte escapes only, so the value always maps.
                    match char::from_u32(val) {
                        Some(decoded) => out.push(decoded),
                        None => out.push_str("\\x"),
                    }
                } else {
                    out.push_str("\\x");
                }
            }
            '0'..='7' => {
                let mut val: u32 = ch.to_digit(8).unwrap_or(0);
                let mut digits = 1;
                while i < n && digits < 3 {
                    match chars[i].to_digit(8) {
                        Some(d) => {
                            val = val * 8 + d;
                            digits += 1;
                            i += 1;
                        }
                        None => break,
                    }
                }
                // Three octal digits max out at 0o777, always a valid char.
                if let Some(decoded) = char::from_u32(val) {
                    out.push(decoded);
                }
            }
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }
    out
}

/// Decode string literals throughout PHP-like source. `//` and `/* */`
/// comments are copied verbatim so escape-looking text inside them is never
/// touched. Double-quoted bodies are accumulated raw and decoded as one
/// fragment at the closing quote (or at end of input when unterminated).
pub fn decode_php_string_literals(code: &str) -> String {
    let chars: Vec<char> = code.chars().collect();
    let n = chars.len();
    let opts = ScanOptions {
        slash_line_comments: true,
        block_comments: true,
        ..Default::default()
    };
    let mut state = LexState::new();
    let mut out = String::with_capacity(n);
    let mut delim = '"';
    let mut body = String::new();
    let mut i = 0;

    while i < n {
        let step = state.step(&chars, i, &opts);
        match step.class {
            StepClass::StringOpen => {
                delim = chars[i];
                body.clear();
                out.push(delim);
            }
            StepClass::StringBody => {
                let unit = &chars[i..i + step.width];
                if delim == '"' {
                    body.extend(unit);
                } else if step.width == 2 {
                    // Single-quoted strings decode only \\ and \'.
                    match unit[1] {
                        '\\' | '\'' => out.push(unit[1]),
                        other => {
                            out.push('\\');
                            out.push(other);
                        }
                    }
                } else {
                    out.push(unit[0]);
                }
            }
            StepClass::StringClose => {
                if delim == '"' {
                    out.push_str(&decode_c_escapes(&body));
                    body.clear();
                }
                out.push(chars[i]);
            }
            _ => out.extend(&chars[i..i + step.width]),
        }
        i += step.width;
    }

    if state.in_string && delim == '"' {
        out.push_str(&decode_c_escapes(&body));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_escapes() {
        assert_eq!(decode_c_escapes(r"a\nb\tc"), "a\nb\tc");
        assert_eq!(decode_c_escapes(r"\a\b\v\f"), "\u{07}\u{08}\u{0B}\u{0C}");
    }

    #[test]
    fn test_hex_escapes() {
        assert_eq!(decode_c_escapes(r"\x41\x42"), "AB");
        assert_eq!(decode_c_escapes(r"\x4"), "\u{04}");
        assert_eq!(decode_c_escapes(r"\xZZ"), "\\xZZ");
    }

    #[test]
    fn test_octal_escapes() {
        assert_eq!(decode_c_escapes(r"\101"), "A");
        assert_eq!(decode_c_escapes(r"\7"), "\u{07}");
        assert_eq!(decode_c_escapes(r"\1018"), "A8");
    }

    #[test]
    fn test_unknown_escape_keeps_backslash() {
        assert_eq!(decode_c_escapes(r"\q"), "\\q");
    }

    #[test]
    fn test_trailing_backslash() {
        assert_eq!(decode_c_escapes("abc\\"), "abc\\");
    }

    #[test]
    fn test_double_quoted_decoded() {
        let src = r#"echo "a\x41b";"#;
        assert_eq!(decode_php_string_literals(src), "echo \"aAb\";");
    }

    #[test]
    fn test_single_quoted_only_backslash_and_quote() {
        let src = r"echo 'a\x41\\b\'c';";
        assert_eq!(decode_php_string_literals(src), "echo 'a\\x41\\b'c';");
    }

    #[test]
    fn test_comments_untouched() {
        let src = "// \\x41\n/* \\x42 */\"\\x43\"";
        assert_eq!(
            decode_php_string_literals(src),
            "// \\x41\n/* \\x42 */\"C\""
        );
    }

    #[test]
    fn test_unterminated_double_quote_decodes_to_end() {
        assert_eq!(decode_php_string_literals("\"\\x41"), "\"A");
    }
}
