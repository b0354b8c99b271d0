//! Top-level PHP `goto` flattening.
//!
//! Obfuscators shred PHP scripts into labeled fragments glued back together
//! with `goto`. This pass segments the top level of the script into labels
//! and statements (brace blocks are copied opaquely, so function and class
//! bodies are never rewritten), then replays the statement list following
//! each `goto` edge. Re-visit and step counters bound the replay so cyclic
//! label graphs still terminate.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::deobfuscate::escapes::decode_php_string_literals;
use crate::scan::{LexState, ScanOptions, StepClass};

/// A `goto` statement may re-enter the same node this many times before
/// the replay gives up and appends the remaining statements verbatim.
pub const MAX_GOTO_VISITS: usize = 3;

/// Hard bound on replayed statements.
pub const MAX_GOTO_STEPS: usize = 10_000;

static GOTO_STMT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*goto\s+([A-Za-z_]\w*)\s*;\s*$").unwrap());
static TRAILING_IDENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"([A-Za-z_]\w*)\s*$").unwrap());
static TRAIL_WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+\n").unwrap());

enum Node {
    Label(String),
    Stmt(String),
}

/// Flatten top-level `goto`/label control flow. Returns `None` when the
/// result is empty or identical to the input (nothing to flatten).
pub fn linearize_goto(code: &str) -> Option<String> {
    let text = code.replace("\r\n", "\n").replace('\r', "\n");
    let nodes = segment(&text);

    // Consecutive labels resolve to the first statement after the run;
    // a duplicated label name keeps its last definition.
    let mut label_to_idx: HashMap<&str, usize> = HashMap::new();
    for (idx, node) in nodes.iter().enumerate() {
        if let Node::Label(name) = node {
            let mut j = idx + 1;
            while j < nodes.len() && matches!(nodes[j], Node::Label(_)) {
                j += 1;
            }
            label_to_idx.insert(name.as_str(), j);
        }
    }

    let mut pc = 0;
    let mut steps = 0;
    let mut visit_count: HashMap<usize, usize> = HashMap::new();
    let mut out = String::new();

    while pc < nodes.len() && steps < MAX_GOTO_STEPS {
        steps += 1;
        let stmt = match &nodes[pc] {
            Node::Label(_) => {
                pc += 1;
                continue;
            }
            Node::Stmt(text) => text,
        };

        if let Some(caps) = GOTO_STMT_RE.captures(stmt.trim()) {
            match label_to_idx.get(&caps[1]) {
                None => {
                    // Unresolved target: keep the goto as-is.
                    out.push_str(stmt);
                    pc += 1;
                }
                Some(&target) => {
                    let count = visit_count.entry(pc).or_insert(0);
                    *count += 1;
                    if *count > MAX_GOTO_VISITS {
                        for node in &nodes[pc..] {
                            if let Node::Stmt(text) = node {
                                out.push_str(text);
                            }
                        }
                        break;
                    }
                    pc = target;
                }
            }
        } else {
            out.push_str(stmt);
            pc += 1;
        }
    }

    let linear = decode_php_string_literals(&out);
    let linear = TRAIL_WS_RE.replace_all(&linear, "\n");
    let linear = linear.trim();
    if linear.is_empty() || linear == code {
        None
    } else {
        Some(linear.to_string())
    }
}

/// Split top-level source into label and statement nodes. Strings and
/// comments are opaque; `{ ... }` blocks are copied whole, flushing when
/// the depth returns to zero.
fn segment(text: &str) -> Vec<Node> {
    let chars: Vec<char> = text.chars().collect();
    let n = chars.len();
    let opts = ScanOptions {
        slash_line_comments: true,
        block_comments: true,
        ..Default::default()
    };
    let mut state = LexState::new();
    let mut nodes: Vec<Node> = Vec::new();
    let mut cur = String::new();
    let mut depth: usize = 0;
    let mut i = 0;

    let flush = |cur: &mut String, nodes: &mut Vec<Node>| {
        if !cur.trim().is_empty() {
            nodes.push(Node::Stmt(cur.clone()));
        }
        cur.clear();
    };

    while i < n {
        let step = state.step(&chars, i, &opts);
        if step.class != StepClass::Code {
            // String and comment content is opaque.
            cur.extend(&chars[i..i + step.width]);
            i += step.width;
            continue;
        }

        let c = chars[i];
        if c == '{' {
            depth += 1;
            cur.push(c);
            i += 1;
            continue;
        }
        if c == '}' {
            depth = depth.saturating_sub(1);
            cur.push(c);
            i += 1;
            if depth == 0 {
                flush(&mut cur, &mut nodes);
            }
            continue;
        }

        if depth == 0 && c == ';' {
            cur.push(';');
            i += 1;
            flush(&mut cur, &mut nodes);
            continue;
        }

        if depth == 0 && c == ':' {
            let buf = cur.trim_end().to_string();
            if let Some(caps) = TRAILING_IDENT_RE.captures(&buf) {
                let m = caps.get(1).map(|g| (g.start(), g.as_str().to_string()));
                if let Some((start, name)) = m {
                    cur = buf[..start].to_string();
                    flush(&mut cur, &mut nodes);
                    nodes.push(Node::Label(name));
                    i += 1;
                    while i < n && chars[i].is_whitespace() {
                        i += 1;
                    }
                    continue;
                }
            }
        }

        cur.push(c);
        i += 1;
    }

    if !cur.trim().is_empty() {
        nodes.push(Node::Stmt(cur));
    }
    nodes
}
