//! HTML/XML reformatting.
//!
//! The input is tokenized in one regex pass into comments, CDATA sections,
//! tags, and text runs. A tag stack tracks which open tags introduced an
//! indent level. Three element classes bend the flow:
//!
//! - void elements never push indentation (`<br>`, `<img>`, ...);
//! - raw-text elements (`script`, `style`, `pre`, `code`, `textarea`) have
//!   their bodies copied verbatim, with only outer blank lines trimmed;
//! - inline elements (`<b>`, `<span>`, ...) are concatenated onto the
//!   current line instead of starting new ones, tracked by an inline-depth
//!   counter plus a one-shot "inline flow" latch that lets trailing text
//!   (e.g. punctuation after `</b>`) stay on the same line.

use once_cell::sync::Lazy;
use regex::Regex;

static TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!--.*?-->|<!\[CDATA\[.*?\]\]>|</?[^>]+>|[^<]+").unwrap());
static TAG_NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^</?\s*([\w:-]+)").unwrap());
static WS_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

const RAW_ELEMENTS: &[&str] = &["script", "style", "pre", "code", "textarea"];

const INLINE_ELEMENTS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "cite", "code", "data", "dfn", "em", "i", "kbd", "label",
    "mark", "q", "rp", "rt", "rtc", "ruby", "s", "samp", "small", "span", "strong", "sub", "sup",
    "time", "u", "var", "wbr",
];

/// Characters that never get a space inserted before them in inline flow.
const NO_SPACE_BEFORE: &str = ".,;:!?)]}";

fn tag_name(tag: &str) -> String {
    match TAG_NAME_RE.captures(tag) {
        Some(caps) => caps[1].to_lowercase(),
        None => tag.to_lowercase(),
    }
}

fn is_self_closing(name: &str, token: &str) -> bool {
    token.ends_with("/>") || VOID_ELEMENTS.contains(&name)
}

struct HtmlWriter<'a> {
    indent: &'a str,
    level: usize,
    out: Vec<String>,
    last_was_inline_open: bool,
    allow_inline_flow: bool,
}

impl<'a> HtmlWriter<'a> {
    fn append_line(&mut self, text: &str) {
        self.out
            .push(format!("{}{}", self.indent.repeat(self.level), text.trim()));
        self.last_was_inline_open = false;
        self.allow_inline_flow = false;
    }

    fn append_inline(&mut self, text: &str, add_space: bool) {
        let text = text.trim();
        match self.out.last_mut() {
            None => {
                let line = format!("{}{}", self.indent.repeat(self.level), text);
                self.out.push(line);
            }
            Some(last) => {
                if add_space && !last.is_empty() && !last.ends_with(' ') && !last.ends_with('\t') {
                    last.push(' ');
                }
                last.push_str(text);
            }
        }
        self.last_was_inline_open = false;
    }
}

pub fn format_html(code: &str, indent: &str) -> String {
    let mut w = HtmlWriter {
        indent,
        level: 0,
        out: Vec::new(),
        last_was_inline_open: false,
        allow_inline_flow: false,
    };
    let mut tag_stack: Vec<String> = Vec::new();
    let mut indent_stack: Vec<bool> = Vec::new();
    let mut raw_stack: Vec<String> = Vec::new();
    let mut inline_depth: usize = 0;

    for token in TOKEN_RE.find_iter(code).map(|m| m.as_str()) {
        if token.is_empty() {
            continue;
        }

        if (token.starts_with("<!--") && token.ends_with("-->"))
            || token.starts_with("<![CDATA[")
        {
            w.append_line(token);
            continue;
        }

        if token.starts_with("</") {
            let name = tag_name(token);

            if inline_depth > 0 && INLINE_ELEMENTS.contains(&name.as_str()) {
                w.append_inline(token, false);
                if tag_stack.last() == Some(&name) {
                    tag_stack.pop();
                    indent_stack.pop();
                    inline_depth = inline_depth.saturating_sub(1);
                }
                if inline_depth == 0 {
                    w.allow_inline_flow = true;
                }
                continue;
            }

            if raw_stack.last() == Some(&name) {
                raw_stack.pop();
            }

            if tag_stack.last() == Some(&name) {
                if indent_stack.last() == Some(&true) {
                    w.level = w.level.saturating_sub(1);
                }
                tag_stack.pop();
                indent_stack.pop();
            }
            w.append_line(token);
            continue;
        }

        if token.starts_with('<') {
            let name = tag_name(token);
            let self_closing = is_self_closing(&name, token);

            if inline_depth > 0
                || INLINE_ELEMENTS.contains(&name.as_str())
                || w.allow_inline_flow
            {
                let add_space = !w.last_was_inline_open;
                w.append_inline(token, add_space);
                if !self_closing {
                    tag_stack.push(name);
                    indent_stack.push(false);
                    inline_depth += 1;
                    w.last_was_inline_open = true;
                }
                w.allow_inline_flow = inline_depth == 0;
                continue;
            }

            w.append_line(token);
            if !self_closing {
                if RAW_ELEMENTS.contains(&name.as_str()) {
                    raw_stack.push(name.clone());
                }
                tag_stack.push(name);
                indent_stack.push(true);
                w.level += 1;
            }
            continue;
        }

        // Text run.
        if !raw_stack.is_empty() {
            let mut lines: Vec<&str> = token.split('\n').collect();
            while lines.first().is_some_and(|l| l.trim().is_empty()) {
                lines.remove(0);
            }
            while lines.last().is_some_and(|l| l.trim().is_empty()) {
                lines.pop();
            }
            for line in lines {
                w.append_line(line.trim_end());
            }
        } else {
            let text = token.trim();
            if text.is_empty() {
                continue;
            }
            let text = WS_RUN_RE.replace_all(text, " ");
            if inline_depth > 0 || w.allow_inline_flow {
                let starts_tight = text
                    .chars()
                    .next()
                    .is_some_and(|c| NO_SPACE_BEFORE.contains(c));
                let add_space = !w.last_was_inline_open && !starts_tight;
                w.append_inline(&text, add_space);
                w.allow_inline_flow = true;
            } else {
                w.append_line(&text);
            }
        }
    }

    w.out.join("\n").trim_end().to_string()
}
