//! # recast
//!
//! Best-effort structural transformations for source text: language
//! detection, comment stripping, minification, pretty-printing, and
//! obfuscation with a heuristic decoder for the reverse direction.
//!
//! Everything operates on plain strings and is total: malformed input is
//! passed through as unchanged as possible rather than rejected. The one
//! exception is JSON formatting, which parses strictly and reports failure
//! by falling back (see [`pretty::pretty_format`]).

pub mod deobfuscate;
pub mod lang;
pub mod minify;
pub mod obfuscate;
pub mod pretty;
pub mod scan;
pub mod strip;
pub mod whitespace;

pub use deobfuscate::{deobfuscate, linearize_goto};
pub use lang::{detect_language, LanguageTag};
pub use minify::minify;
pub use obfuscate::{append_comment, obfuscate, ObfuscationMethod};
pub use pretty::{pretty_format, IndentSpec};
pub use strip::{strip_comments, strip_comments_all, strip_comments_custom, MarkerSelection};
pub use whitespace::tidy_whitespace;
