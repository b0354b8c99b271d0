//! Python indentation reconstruction.
//!
//! Line-oriented and heuristic: statements are re-indented from a flat
//! stream using the dedent keywords and trailing-colon rule. If the input's
//! block structure was already lost, this cannot recover it — it only
//! rebuilds the obvious nesting.

use once_cell::sync::Lazy;
use regex::Regex;

static DEDENT_HEADS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:elif\b.*:|else:|except\b.*:|finally:)\s*$").unwrap());

pub fn format_python(code: &str, indent: &str) -> String {
    let mut level: usize = 0;
    let mut out: Vec<String> = Vec::new();

    for raw in code.lines() {
        let line = raw.trim_end();
        let stripped = line.trim_start();
        if stripped.is_empty() {
            continue;
        }
        if DEDENT_HEADS.is_match(stripped) {
            level = level.saturating_sub(1);
        }
        out.push(format!("{}{}", indent.repeat(level), stripped));
        if stripped.ends_with(':') && !stripped.starts_with('#') {
            level += 1;
        }
    }

    out.join("\n").trim_end().to_string()
}
