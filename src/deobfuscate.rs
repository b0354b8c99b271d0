//! Heuristic decoding of obfuscated source.
//!
//! [`deobfuscate`] runs a fixed battery of recognizers over the input and
//! returns the first decoded form, or `None` when nothing matches. The
//! battery order goes from the most specific shape (a base64 data URI) to
//! the most speculative (treating the whole input as a bare base64 blob),
//! so a more precise recognizer always wins.

pub mod escapes;
pub mod goto;

use base64::alphabet;
use base64::engine::general_purpose::GeneralPurposeConfig;
use base64::engine::{DecodePaddingMode, GeneralPurpose};
use base64::Engine;
use once_cell::sync::Lazy;
use regex::Regex;

pub use escapes::{decode_c_escapes, decode_php_string_literals};
pub use goto::{linearize_goto, MAX_GOTO_STEPS, MAX_GOTO_VISITS};

// Padding in the wild is unreliable; decode it leniently.
static B64_DECODER: Lazy<GeneralPurpose> = Lazy::new(|| {
    GeneralPurpose::new(
        &alphabet::STANDARD,
        GeneralPurposeConfig::new()
            .with_decode_allow_trailing_bits(true)
            .with_decode_padding_mode(DecodePaddingMode::Indifferent),
    )
});

static DATA_URI_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)data:[^;]+;base64,([A-Za-z0-9+/=_-]+)").unwrap());
static EVAL_HEX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"eval\s*\(\s*'((?:\\x[0-9A-Fa-f]{2})+)'\s*\)|eval\s*\(\s*"((?:\\x[0-9A-Fa-f]{2})+)"\s*\)"#,
    )
    .unwrap()
});
static B64_CALL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(?:atob|base64_decode|b64decode)\s*\(\s*['"]([A-Za-z0-9+/=_-]+)['"]\s*\)"#)
        .unwrap()
});
static FULL_HEX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\\x[0-9A-Fa-f]{2}\s*)+$").unwrap());
static HEX_BYTE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\x([0-9A-Fa-f]{2})").unwrap());
static CODE_SIG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:function|goto|header|var|let|const|class|style|<\w+)\b").unwrap()
});
static GOTO_WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bgoto\b").unwrap());
static OCTAL_ESC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\[0-7]{1,3}").unwrap());
static HTML_ENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"&#(x[0-9A-Fa-f]+|\d+);").unwrap());
static CSS_HEX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\([0-9A-Fa-f]{1,6})\s?").unwrap());
static NON_B64_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9+/=]").unwrap());

/// Pad to a multiple of four and decode, tolerating URL-safe stragglers by
/// dropping characters outside the standard alphabet first.
fn decode_base64_forgiving(payload: &str) -> Option<Vec<u8>> {
    let cleaned = NON_B64_RE.replace_all(payload, "");
    let mut buf = cleaned.into_owned();
    let pad = (4 - buf.len() % 4) % 4;
    buf.push_str(&"=".repeat(pad));
    B64_DECODER.decode(buf.as_bytes()).ok()
}

fn bytes_to_text(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

/// UTF-8 first, then a Latin-1 fallback that maps each byte to the
/// codepoint of the same value.
fn bytes_to_text_latin1_fallback(raw: &[u8]) -> String {
    match std::str::from_utf8(raw) {
        Ok(text) => text.to_string(),
        Err(_) => raw.iter().map(|&b| b as char).collect(),
    }
}

fn decode_hex_escape_run(payload: &str) -> String {
    let bytes: Vec<u8> = HEX_BYTE_RE
        .captures_iter(payload)
        .filter_map(|caps| u8::from_str_radix(&caps[1], 16).ok())
        .collect();
    bytes_to_text(&bytes)
}

/// Try every recognizer in order; `None` means nothing decodable was found.
pub fn deobfuscate(text: &str) -> Option<String> {
    let s = text.trim();
    if s.is_empty() {
        return None;
    }

    // Base64 data URI payload.
    if let Some(caps) = DATA_URI_RE.captures(s) {
        if let Some(raw) = decode_base64_forgiving(&caps[1]) {
            return Some(bytes_to_text(&raw));
        }
    }

    // eval('\xNN...') wrapper.
    if let Some(caps) = EVAL_HEX_RE.captures(s) {
        let payload = caps.get(1).or_else(|| caps.get(2));
        if let Some(payload) = payload {
            return Some(decode_hex_escape_run(payload.as_str()));
        }
    }

    // atob/base64_decode/b64decode call argument.
    if let Some(caps) = B64_CALL_RE.captures(s) {
        if let Some(raw) = decode_base64_forgiving(&caps[1]) {
            return Some(bytes_to_text_latin1_fallback(&raw));
        }
    }

    // The whole input is a run of \xNN escapes.
    if FULL_HEX_RE.is_match(s) {
        return Some(decode_hex_escape_run(s));
    }

    // Code-shaped input: flatten goto spaghetti, then decode string escapes.
    let looks_like_code = s.contains("<?php") || CODE_SIG_RE.is_match(s);
    if looks_like_code {
        if GOTO_WORD_RE.is_match(s) {
            if let Some(flat) = linearize_goto(s) {
                return Some(flat);
            }
        }
        let has_escapes = s.contains("\\x") || OCTAL_ESC_RE.is_match(s);
        if has_escapes {
            return Some(decode_php_string_literals(s));
        }
    }

    // Numeric HTML entities.
    if s.contains("&#") {
        let decoded = HTML_ENT_RE.replace_all(s, |caps: &regex::Captures| {
            let g = &caps[1];
            let parsed = if let Some(hex) = g.strip_prefix('x') {
                u32::from_str_radix(hex, 16).ok()
            } else {
                g.parse::<u32>().ok()
            };
            match parsed.and_then(char::from_u32) {
                Some(c) => c.to_string(),
                None => caps[0].to_string(),
            }
        });
        if decoded != s {
            return Some(decoded.into_owned());
        }
    }

    // CSS hex escapes (backslash plus up to six hex digits).
    if s.contains('\\') && CSS_HEX_RE.is_match(s) {
        let decoded = CSS_HEX_RE.replace_all(s, |caps: &regex::Captures| {
            match u32::from_str_radix(&caps[1], 16)
                .ok()
                .and_then(char::from_u32)
            {
                Some(c) => c.to_string(),
                None => caps[0].to_string(),
            }
        });
        return Some(decoded.into_owned());
    }

    // Last resort: treat the input as a bare base64 blob.
    let cleaned = NON_B64_RE.replace_all(s, "");
    if cleaned.len() >= 12 {
        if let Some(raw) = decode_base64_forgiving(&cleaned) {
            return Some(bytes_to_text(&raw));
        }
    }

    None
}
