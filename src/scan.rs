//! Scanner primitives shared by every transformer in the crate.
//!
//! Structure:
//!     All transformations here are single-pass (or two-pass) character scanners that
//! must agree on one question: "is this position inside a string, a template literal,
//! a line comment, a block comment, or plain code?" Getting that wrong corrupts string
//! contents, which is the one failure mode the crate promises never to have. So the
//! answer lives in exactly one place: [`LexState::step`].
//!
//! Each transformer owns a fresh [`LexState`] per call, drives it over the input one
//! lexical unit at a time, and decides what to emit based on the returned [`Step`].
//! The state machine never emits anything itself; consumption and emission are the
//! caller's business. Escaped characters (`\x`), interpolation openers (`${`) and
//! triple quotes are consumed as single multi-character units so callers never see
//! half of an escape sequence.
//!
//! [`ScanOptions`] selects which syntaxes are live for a given pass: a CSS stripper
//! has no hash comments or template literals, the strict Python stripper has only
//! hash comments and triple-quoted strings, the minifier passes treat backticks as
//! ordinary quotes, and so on.

/// Which lexical syntaxes a scanning pass recognizes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanOptions {
    /// Recognize `//` line comments.
    pub slash_line_comments: bool,
    /// Recognize `/* ... */` block comments.
    pub block_comments: bool,
    /// Recognize `#` line comments.
    pub hash_comments: bool,
    /// Recognize backtick template literals with `${...}` interpolation.
    pub template_literals: bool,
    /// Treat a backtick as an ordinary string delimiter (no interpolation
    /// tracking). Used by the minifier passes. Ignored when
    /// `template_literals` is set.
    pub backtick_quotes: bool,
    /// Recognize `'''` / `"""` triple-quoted strings (strict Python mode).
    pub triple_quotes: bool,
}

/// Classification of one scanning step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepClass {
    /// Plain code character.
    Code,
    /// Opening string delimiter (1 char, or 3 for a triple quote).
    StringOpen,
    /// String interior, including escape pairs.
    StringBody,
    /// Closing string delimiter.
    StringClose,
    /// Opening backtick of a template literal.
    TemplateOpen,
    /// Template interior, including escape pairs and `${` / `}`.
    TemplateBody,
    /// Closing backtick of a template literal.
    TemplateClose,
    /// `//` or `#` that starts a line comment.
    LineCommentOpen,
    /// Character inside a line comment.
    LineCommentBody,
    /// The newline that terminates a line comment. The newline itself is
    /// consumed; the caller decides whether to emit one.
    LineCommentEnd,
    /// `/*` that starts a block comment.
    BlockCommentOpen,
    /// Character inside a block comment.
    BlockCommentBody,
    /// `*/` that terminates a block comment.
    BlockCommentClose,
}

/// Result of advancing the cursor: what the consumed unit was and how many
/// characters it covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub class: StepClass,
    pub width: usize,
}

impl Step {
    fn new(class: StepClass, width: usize) -> Self {
        Step { class, width }
    }
}

/// Mutable lexical cursor. One per transformation call, discarded at the end
/// of the pass; never shared.
///
/// Invariant: at most one of `in_string` / `in_line_comment` /
/// `in_block_comment` / `in_template_literal` is true; `string_delimiter` is
/// `Some` iff `in_string`.
#[derive(Debug, Clone, Default)]
pub struct LexState {
    pub in_string: bool,
    pub string_delimiter: Option<char>,
    pub in_line_comment: bool,
    pub in_block_comment: bool,
    pub in_template_literal: bool,
    pub template_interpolation_depth: u32,
    /// The current string is triple-quoted (strict Python mode only).
    pub triple: bool,
}

impl LexState {
    pub fn new() -> Self {
        LexState::default()
    }

    /// True when the cursor is inside any string, template literal or comment.
    pub fn in_any(&self) -> bool {
        self.in_string || self.in_line_comment || self.in_block_comment || self.in_template_literal
    }

    /// Advance one lexical unit starting at `text[i]`.
    ///
    /// Always consumes at least one character; multi-character units (escape
    /// pairs, `${`, `/*`, `*/`, triple quotes) are consumed whole.
    pub fn step(&mut self, text: &[char], i: usize, opts: &ScanOptions) -> Step {
        let c = text[i];
        let next = text.get(i + 1).copied();

        if self.in_line_comment {
            if c == '\n' {
                self.in_line_comment = false;
                return Step::new(StepClass::LineCommentEnd, 1);
            }
            return Step::new(StepClass::LineCommentBody, 1);
        }

        if self.in_block_comment {
            if c == '*' && next == Some('/') {
                self.in_block_comment = false;
                return Step::new(StepClass::BlockCommentClose, 2);
            }
            return Step::new(StepClass::BlockCommentBody, 1);
        }

        if self.in_template_literal {
            if c == '\\' && next.is_some() {
                return Step::new(StepClass::TemplateBody, 2);
            }
            if c == '`' && self.template_interpolation_depth == 0 {
                self.in_template_literal = false;
                return Step::new(StepClass::TemplateClose, 1);
            }
            if c == '$' && next == Some('{') {
                self.template_interpolation_depth += 1;
                return Step::new(StepClass::TemplateBody, 2);
            }
            if c == '}' && self.template_interpolation_depth > 0 {
                self.template_interpolation_depth -= 1;
                return Step::new(StepClass::TemplateBody, 1);
            }
            return Step::new(StepClass::TemplateBody, 1);
        }

        if self.in_string {
            if self.triple {
                // Triple-quoted interiors are opaque: no escape processing.
                if Some(c) == self.string_delimiter
                    && next == self.string_delimiter
                    && text.get(i + 2).copied() == self.string_delimiter
                {
                    self.in_string = false;
                    self.triple = false;
                    self.string_delimiter = None;
                    return Step::new(StepClass::StringClose, 3);
                }
                return Step::new(StepClass::StringBody, 1);
            }
            if c == '\\' && next.is_some() {
                return Step::new(StepClass::StringBody, 2);
            }
            if Some(c) == self.string_delimiter {
                self.in_string = false;
                self.string_delimiter = None;
                return Step::new(StepClass::StringClose, 1);
            }
            return Step::new(StepClass::StringBody, 1);
        }

        // Plain code: openers.
        if c == '\'' || c == '"' {
            if opts.triple_quotes && next == Some(c) && text.get(i + 2).copied() == Some(c) {
                self.in_string = true;
                self.triple = true;
                self.string_delimiter = Some(c);
                return Step::new(StepClass::StringOpen, 3);
            }
            self.in_string = true;
            self.string_delimiter = Some(c);
            return Step::new(StepClass::StringOpen, 1);
        }

        if c == '`' {
            if opts.template_literals {
                self.in_template_literal = true;
                self.template_interpolation_depth = 0;
                return Step::new(StepClass::TemplateOpen, 1);
            }
            if opts.backtick_quotes {
                self.in_string = true;
                self.string_delimiter = Some('`');
                return Step::new(StepClass::StringOpen, 1);
            }
        }

        if c == '/' {
            if opts.slash_line_comments && next == Some('/') {
                self.in_line_comment = true;
                return Step::new(StepClass::LineCommentOpen, 2);
            }
            if opts.block_comments && next == Some('*') {
                self.in_block_comment = true;
                return Step::new(StepClass::BlockCommentOpen, 2);
            }
        }

        if c == '#' && opts.hash_comments {
            self.in_line_comment = true;
            return Step::new(StepClass::LineCommentOpen, 1);
        }

        Step::new(StepClass::Code, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classes(src: &str, opts: &ScanOptions) -> Vec<(StepClass, usize)> {
        let chars: Vec<char> = src.chars().collect();
        let mut state = LexState::new();
        let mut i = 0;
        let mut result = Vec::new();
        while i < chars.len() {
            let step = state.step(&chars, i, opts);
            result.push((step.class, step.width));
            i += step.width;
        }
        result
    }

    fn js_opts() -> ScanOptions {
        ScanOptions {
            slash_line_comments: true,
            block_comments: true,
            template_literals: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_string_with_comment_marker_stays_string() {
        let steps = classes(r#""// nope""#, &js_opts());
        assert_eq!(steps[0].0, StepClass::StringOpen);
        assert!(steps[1..steps.len() - 1]
            .iter()
            .all(|(c, _)| *c == StepClass::StringBody));
        assert_eq!(steps.last().unwrap().0, StepClass::StringClose);
    }

    #[test]
    fn test_escaped_quote_does_not_close() {
        let steps = classes(r#""a\"b""#, &js_opts());
        // open, 'a', escape pair (width 2), 'b', close
        assert_eq!(
            steps,
            vec![
                (StepClass::StringOpen, 1),
                (StepClass::StringBody, 1),
                (StepClass::StringBody, 2),
                (StepClass::StringBody, 1),
                (StepClass::StringClose, 1),
            ]
        );
    }

    fn max_interpolation_depth(src: &str) -> (u32, bool) {
        let chars: Vec<char> = src.chars().collect();
        let mut state = LexState::new();
        let mut i = 0;
        let opts = js_opts();
        let mut max_depth = 0;
        while i < chars.len() {
            let step = state.step(&chars, i, &opts);
            max_depth = max_depth.max(state.template_interpolation_depth);
            i += step.width;
        }
        (max_depth, state.in_template_literal)
    }

    #[test]
    fn test_template_interpolation_depth() {
        // Each `${` raises the depth; the nested literal's interpolation
        // raises it again, and the outer literal still closes cleanly.
        let (max_depth, open) = max_interpolation_depth("`a${ `${b}` }c`");
        assert!(max_depth >= 2);
        assert!(!open);
    }

    #[test]
    fn test_bare_brace_does_not_raise_interpolation_depth() {
        // Only the two-character `${` unit affects the counter; a bare `{`
        // inside an interpolation is plain template body.
        let (max_depth, open) = max_interpolation_depth("`a${ {b: 1} }c`");
        assert_eq!(max_depth, 1);
        assert!(!open);
    }

    #[test]
    fn test_block_comment_boundaries() {
        let steps = classes("a/*x*/b", &js_opts());
        assert_eq!(steps[0].0, StepClass::Code);
        assert_eq!(steps[1], (StepClass::BlockCommentOpen, 2));
        assert_eq!(steps[2], (StepClass::BlockCommentBody, 1));
        assert_eq!(steps[3], (StepClass::BlockCommentClose, 2));
        assert_eq!(steps[4].0, StepClass::Code);
    }

    #[test]
    fn test_line_comment_terminated_by_newline() {
        let steps = classes("//c\nx", &js_opts());
        assert_eq!(steps[0], (StepClass::LineCommentOpen, 2));
        assert_eq!(steps[1], (StepClass::LineCommentBody, 1));
        assert_eq!(steps[2], (StepClass::LineCommentEnd, 1));
        assert_eq!(steps[3].0, StepClass::Code);
    }

    #[test]
    fn test_hash_comment_only_when_enabled() {
        let none = classes("#x", &js_opts());
        assert!(none.iter().all(|(c, _)| *c == StepClass::Code));
        let opts = ScanOptions {
            hash_comments: true,
            ..Default::default()
        };
        let some = classes("#x", &opts);
        assert_eq!(some[0], (StepClass::LineCommentOpen, 1));
    }

    #[test]
    fn test_triple_quote_opaque_interior() {
        let opts = ScanOptions {
            hash_comments: true,
            triple_quotes: true,
            ..Default::default()
        };
        let steps = classes("'''# not a comment'''", &opts);
        assert_eq!(steps[0], (StepClass::StringOpen, 3));
        assert_eq!(steps.last().unwrap(), &(StepClass::StringClose, 3));
        assert!(steps[1..steps.len() - 1]
            .iter()
            .all(|(c, _)| *c == StepClass::StringBody));
    }

    #[test]
    fn test_backtick_as_plain_quote() {
        let opts = ScanOptions {
            backtick_quotes: true,
            ..Default::default()
        };
        let steps = classes("`a b`", &opts);
        assert_eq!(steps[0].0, StepClass::StringOpen);
        assert_eq!(steps.last().unwrap().0, StepClass::StringClose);
    }
}
