//! Pretty-printing / reformatting.
//!
//! Five independent engines, dispatched on [`LanguageTag`]:
//!
//! - JSON: strict parse + 4-space re-serialization (optionally key-sorted);
//!   on parse failure the JS/PHP engine takes over so the call stays total.
//! - HTML/XML: tag-stream tokenizer with void / raw-text / inline element
//!   tracking.
//! - CSS: selector/declaration tokenizer.
//! - JS/PHP: single-pass brace-depth emitter with regex-literal detection and
//!   `} else` stitching. Also the fallback engine for anything unrecognized.
//! - Python: indentation reconstruction from a flat statement stream.
//!
//! All engines are best-effort: they never fail on malformed input, they just
//! do less. Each is idempotent — formatting a second time is a no-op.

pub mod css;
pub mod html;
pub mod json;
pub mod jsphp;
pub mod python;

use crate::lang::LanguageTag;

/// How one indentation level is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndentSpec {
    pub use_tabs: bool,
    pub size: usize,
}

impl Default for IndentSpec {
    fn default() -> Self {
        IndentSpec {
            use_tabs: false,
            size: 4,
        }
    }
}

impl IndentSpec {
    /// Resolve into the literal indent string used for one level.
    pub fn resolve(&self) -> String {
        if self.use_tabs {
            "\t".to_string()
        } else {
            " ".repeat(self.size.max(1))
        }
    }
}

/// Reformat `code` according to `lang`.
///
/// JSON that does not parse, and any language without a dedicated engine,
/// goes through the JS/PHP engine. The JSON engine ignores `indent` (fixed
/// 4-space output); key sorting applies to JSON only.
pub fn pretty_format(
    code: &str,
    lang: LanguageTag,
    indent: IndentSpec,
    sort_json_keys: bool,
) -> String {
    let indent = indent.resolve();
    match lang {
        LanguageTag::Json => match json::format_json(code, sort_json_keys) {
            Some(s) => s,
            None => jsphp::format_jsphp(code, &indent),
        },
        LanguageTag::HtmlXml => html::format_html(code, &indent),
        LanguageTag::Css => css::format_css(code, &indent),
        LanguageTag::Python => python::format_python(code, &indent),
        LanguageTag::JavaScript | LanguageTag::Php | LanguageTag::Plain => {
            jsphp::format_jsphp(code, &indent)
        }
    }
}
