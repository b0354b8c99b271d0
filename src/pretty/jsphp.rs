//! The shared JS/PHP brace-depth reformatter.
//!
//! Line breaks come only from the formatter's own rules — newlines in the
//! input outside strings and comments are ignored:
//!
//! - `{` opens a block and forces newline+indent; `}` always takes its own
//!   line, except that a following `else`/`catch`/`finally` is stitched back
//!   onto the `}` line, both during emission and by an idempotent post-pass.
//! - `;` breaks only at paren depth 0, so `for (;;)` headers survive.
//! - A `/` opens a regex literal (copied verbatim through its closing `/`
//!   plus flag letters) when the previous significant token is an operator,
//!   a statement-starting keyword, or the start of input; otherwise it is
//!   division and spaced like a binary operator.
//! - Multi-character operators are matched greedily before single-character
//!   spacing rules apply.
//!
//! The classification is deliberately heuristic (the classic JS regex vs.
//! division ambiguity); the previous-significant-token rule here is the
//! compatibility contract, not a placeholder for something stricter.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::scan::{LexState, ScanOptions, StepClass};

/// Keywords after which a `/` starts a regex literal.
const REGEX_KEYWORDS: &[&str] = &[
    "return",
    "case",
    "throw",
    "delete",
    "typeof",
    "instanceof",
    "in",
    "of",
    "new",
    "do",
    "else",
];

/// Single characters after which a `/` starts a regex literal.
const REGEX_STARTERS: &str = "({[=:+-*/%&|^!~?,;<";

/// Keywords that take a space before their opening paren.
const PAREN_KEYWORDS: &[&str] = &["if", "for", "while", "switch", "catch"];

/// Multi-character operators, longest first.
const OPERATORS: &[&str] = &[
    ">>>=", ">>>", ">>=", "<<=", "===", "!==", "&&", "||", ">>", "<<", "+=", "-=", "*=", "/=",
    "%=", "&=", "|=", "^=", "=>",
];

/// Characters that may start an operator run.
const OP_START: &str = "=!<>+-*/%&|^~?.";
/// Characters that may continue an operator run.
const OP_CONT: &str = "=!<>+-*/%&|^~?.:";

static TRAIL_WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+\n").unwrap());
static MULTI_NL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());
static BLANK_BEFORE_BRACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n[ \t]*\n([ \t]*)\}").unwrap());
static STITCH_ELSE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*\}[ \t]*\r?\n[ \t]*(else\b(?:\s+if\b[^{\r\n]*?)?)").unwrap()
});
static STITCH_CATCH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*\}[ \t]*\r?\n[ \t]*(catch\b[^{\r\n]*?)").unwrap());
static STITCH_FINALLY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*\}[ \t]*\r?\n[ \t]*(finally\b)").unwrap());

struct Emitter<'a> {
    out: String,
    indent: &'a str,
    level: usize,
    last_word: String,
}

impl<'a> Emitter<'a> {
    fn ends_with_any(&self, set: &str) -> bool {
        self.out.chars().last().is_some_and(|c| set.contains(c))
    }

    fn prev_non_ws_char(&self) -> Option<char> {
        self.out.chars().rev().find(|c| !" \t\n".contains(*c))
    }

    /// Drop trailing spaces/tabs (not newlines).
    fn drop_trailing_blanks(&mut self) {
        while self.ends_with_any(" \t") {
            self.out.pop();
        }
    }

    /// Start a fresh line at the current indent level.
    fn ensure_newline(&mut self) {
        if self.out.is_empty() || !self.out.ends_with('\n') {
            self.out.push('\n');
        }
        self.out.push_str(&self.indent.repeat(self.level));
    }
}

pub fn format_jsphp(code: &str, indent: &str) -> String {
    let code = code.replace("\r\n", "\n").replace('\r', "\n");
    let chars: Vec<char> = code.chars().collect();
    let n = chars.len();
    let opts = ScanOptions {
        slash_line_comments: true,
        block_comments: true,
        template_literals: true,
        ..Default::default()
    };

    let mut st = LexState::new();
    let mut e = Emitter {
        out: String::with_capacity(code.len() + code.len() / 4),
        indent,
        level: 0,
        last_word: String::new(),
    };
    let mut paren: usize = 0;
    // Set at the word `case`, consumed by the next top-level colon.
    let mut case_label = false;
    let mut i = 0;

    while i < n {
        let step = st.step(&chars, i, &opts);
        match step.class {
            StepClass::LineCommentEnd => {
                e.out.push('\n');
                e.ensure_newline();
                i += step.width;
                continue;
            }
            StepClass::StringOpen | StepClass::TemplateOpen => {
                e.out.extend(&chars[i..i + step.width]);
                e.last_word.clear();
                i += step.width;
                continue;
            }
            StepClass::Code => {}
            _ => {
                // Comment and string interiors pass through verbatim.
                e.out.extend(&chars[i..i + step.width]);
                i += step.width;
                continue;
            }
        }

        let c = chars[i];

        if c == ' ' || c == '\t' {
            let mut j = i;
            while j < n && (chars[j] == ' ' || chars[j] == '\t') {
                j += 1;
            }
            let next_c = chars.get(j).copied();
            if !e.out.is_empty() && !e.ends_with_any(" \n\t") {
                if let Some(nc) = next_c {
                    if !")}];,.:?".contains(nc) {
                        e.out.push(' ');
                    }
                }
            }
            i = j;
            continue;
        }

        if c == '\n' {
            i += 1;
            continue;
        }

        if c == '(' {
            if PAREN_KEYWORDS.contains(&e.last_word.as_str()) && !e.ends_with_any(" \n\t") {
                e.out.push(' ');
            }
            paren += 1;
            e.out.push('(');
            i += 1;
            continue;
        }
        if c == ')' {
            paren = paren.saturating_sub(1);
            e.out.push(')');
            e.last_word.clear();
            i += 1;
            continue;
        }
        if c == '[' {
            e.out.push('[');
            i += 1;
            continue;
        }
        if c == ']' {
            e.out.push(']');
            e.last_word.clear();
            i += 1;
            continue;
        }

        if c == '{' {
            if !e.out.is_empty() && !e.ends_with_any(" \n\t([{") {
                e.out.push(' ');
            }
            e.out.push('{');
            e.level += 1;
            e.ensure_newline();
            e.last_word.clear();
            case_label = false;
            i += 1;
            continue;
        }
        if c == '}' {
            e.drop_trailing_blanks();
            if !e.out.ends_with('\n') {
                e.out.push('\n');
            }
            e.level = e.level.saturating_sub(1);
            e.out.push_str(&e.indent.repeat(e.level));
            e.out.push('}');
            e.ensure_newline();
            e.last_word.clear();
            case_label = false;
            i += 1;
            continue;
        }

        if c == ';' {
            e.out.push(';');
            if paren == 0 {
                e.ensure_newline();
            }
            e.last_word.clear();
            case_label = false;
            i += 1;
            continue;
        }
        if c == ',' {
            e.out.push_str(", ");
            e.last_word.clear();
            i += 1;
            continue;
        }
        if c == ':' {
            e.out.push(':');
            if case_label && paren == 0 {
                e.ensure_newline();
                case_label = false;
                e.last_word.clear();
            } else {
                e.out.push(' ');
            }
            i += 1;
            continue;
        }

        if c == '/' {
            // Not a comment (the scanner already ruled that out): regex
            // literal or division, depending on the previous significant
            // token.
            let prev = e.prev_non_ws_char();
            let starts_regex = prev.is_none()
                || prev.is_some_and(|p| REGEX_STARTERS.contains(p))
                || REGEX_KEYWORDS.contains(&e.last_word.as_str());
            if starts_regex {
                e.out.push('/');
                i += 1;
                let mut escaped = false;
                while i < n {
                    let ch = chars[i];
                    e.out.push(ch);
                    i += 1;
                    if escaped {
                        escaped = false;
                    } else if ch == '\\' {
                        escaped = true;
                    } else if ch == '/' {
                        break;
                    }
                }
                while i < n && chars[i].is_alphabetic() {
                    e.out.push(chars[i]);
                    i += 1;
                }
                e.last_word.clear();
                continue;
            }
            // Division falls through to the operator rules below.
        }

        if c.is_alphabetic() || c == '_' || c == '$' {
            let mut j = i + 1;
            while j < n && (chars[j].is_alphanumeric() || chars[j] == '_' || chars[j] == '$') {
                j += 1;
            }
            let word: String = chars[i..j].iter().collect();

            if !e.out.is_empty() && !e.ends_with_any(" \n\t([{!~.?:+-*/%&|^=") {
                e.out.push(' ');
            }

            if matches!(word.as_str(), "else" | "catch" | "finally")
                && e.prev_non_ws_char() == Some('}')
            {
                // Pull the keyword back onto the `}` line.
                while e.ends_with_any(" \t\n") {
                    e.out.pop();
                }
                e.out.push(' ');
            }

            if word == "case" {
                case_label = true;
            }
            e.out.push_str(&word);
            e.last_word = word;
            i = j;
            continue;
        }

        if c.is_ascii_digit() {
            let mut j = i + 1;
            while j < n && (chars[j].is_ascii_digit() || "._xXbBeE+-".contains(chars[j])) {
                j += 1;
            }
            if !e.out.is_empty() && !e.ends_with_any(" \n\t([{+-*/%&|^!~?:=") {
                e.out.push(' ');
            }
            e.out.extend(&chars[i..j]);
            e.last_word.clear();
            i = j;
            continue;
        }

        if OP_START.contains(c) {
            let mut op = String::new();
            op.push(c);
            let mut j = i + 1;
            while j < n && OP_CONT.contains(chars[j]) {
                op.push(chars[j]);
                j += 1;
            }
            let matched: &str = match OPERATORS.iter().copied().find(|cand| op.starts_with(*cand)) {
                Some(cand) => cand,
                None if op.starts_with("++") || op.starts_with("--") => &op[..2],
                None => &op[..1],
            };

            match matched {
                "." | "++" | "--" => e.out.push_str(matched),
                "=>" => e.out.push_str(" => "),
                _ => {
                    if !e.out.is_empty() && !e.ends_with_any(" \n\t") {
                        e.out.push(' ');
                    }
                    e.out.push_str(matched);
                    e.out.push(' ');
                }
            }
            i += matched.chars().count();
            e.last_word.clear();
            continue;
        }

        e.out.push(c);
        e.last_word.clear();
        i += 1;
    }

    let txt = e.out;
    let txt = TRAIL_WS_RE.replace_all(&txt, "\n");
    let txt = MULTI_NL_RE.replace_all(&txt, "\n\n");
    let txt = BLANK_BEFORE_BRACE_RE.replace_all(&txt, "\n$1}");
    // Post-pass stitch: makes the `} else` join idempotent even when the
    // emission-time join was bypassed (e.g. by comments between the lines).
    let txt = STITCH_ELSE_RE.replace_all(&txt, "} $1");
    let txt = STITCH_CATCH_RE.replace_all(&txt, "} $1");
    let txt = STITCH_FINALLY_RE.replace_all(&txt, "} $1");
    txt.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_braces_open_blocks() {
        let out = format_jsphp("if(a){b();}", "    ");
        assert_eq!(out, "if (a) {\n    b();\n}");
    }

    #[test]
    fn test_else_joined_to_closing_brace() {
        let out = format_jsphp("if(a){b();}else{c();}", "    ");
        assert_eq!(out, "if (a) {\n    b();\n} else {\n    c();\n}");
    }

    #[test]
    fn test_try_catch_finally_joined() {
        let out = format_jsphp("try{a();}catch(e){b();}finally{c();}", "  ");
        assert_eq!(
            out,
            "try {\n  a();\n} catch (e) {\n  b();\n} finally {\n  c();\n}"
        );
    }

    #[test]
    fn test_for_header_semicolons_not_broken() {
        let out = format_jsphp("for(i=0;i<3;i++){x();}", "  ");
        assert_eq!(out, "for (i = 0; i < 3; i++) {\n  x();\n}");
    }

    #[test]
    fn test_regex_literal_after_operator_kept_verbatim() {
        let out = format_jsphp("x=/a b\\/c/gi;", "  ");
        assert_eq!(out, "x = /a b\\/c/gi;");
    }

    #[test]
    fn test_division_spaced_as_operator() {
        let out = format_jsphp("a=b/c;", "  ");
        assert_eq!(out, "a = b / c;");
    }

    #[test]
    fn test_multichar_operators_greedy() {
        let out = format_jsphp("a===b&&c!==d;", "  ");
        assert_eq!(out, "a === b && c !== d;");
    }

    #[test]
    fn test_arrow_function_spacing() {
        let out = format_jsphp("f=(x)=>x*2;", "  ");
        assert_eq!(out, "f = (x) => x * 2;");
    }

    #[test]
    fn test_case_colon_breaks_line() {
        let out = format_jsphp("switch(x){case 1:a();break;}", "  ");
        assert_eq!(
            out,
            "switch (x) {\n  case 1:\n  a();\n  break;\n}"
        );
    }

    #[test]
    fn test_case_label_breaks_after_constant_expression() {
        // The break fires even when tokens sit between `case` and the colon.
        let out = format_jsphp("switch(x){case FOO:b();}", "  ");
        assert_eq!(out, "switch (x) {\n  case FOO:\n  b();\n}");
    }

    #[test]
    fn test_colon_outside_case_gets_trailing_space() {
        let out = format_jsphp("x={a:1}", "  ");
        assert_eq!(out, "x = {\n  a: 1\n}");
    }

    #[test]
    fn test_string_contents_untouched() {
        let out = format_jsphp("s=\"a   {b}; c\";", "  ");
        assert_eq!(out, "s = \"a   {b}; c\";");
    }

    #[test]
    fn test_idempotent() {
        let src = "function f(a,b){if(a){return a+b;}else{return 0;}}";
        let once = format_jsphp(src, "    ");
        assert_eq!(format_jsphp(&once, "    "), once);
    }
}
