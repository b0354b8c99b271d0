//! Source obfuscation encoders.
//!
//! Three reversible encodings, all recoverable by the [`crate::deobfuscate`]
//! battery: a base64 eval wrapper, a `\xNN` hex eval wrapper, and a
//! language-specific base64 container. Plus a comment prepender that picks
//! the marker style from the target language.

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::lang::LanguageTag;

/// The available encoding methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObfuscationMethod {
    /// JS IIFE decoding base64 through `atob` with a UTF-8 repair shim.
    Eval64,
    /// JS `eval` over a `\xNN` escape string of the UTF-8 bytes.
    HexEval,
    /// Language-specific base64 container (Python/PHP/HTML/CSS injectors,
    /// bare base64 otherwise).
    GenericContainer,
}

impl ObfuscationMethod {
    pub const ALL: [ObfuscationMethod; 3] = [
        ObfuscationMethod::Eval64,
        ObfuscationMethod::HexEval,
        ObfuscationMethod::GenericContainer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ObfuscationMethod::Eval64 => "eval64",
            ObfuscationMethod::HexEval => "hex",
            ObfuscationMethod::GenericContainer => "container",
        }
    }

    /// The language of the encoded output, given the input language.
    pub fn output_language(&self, lang: LanguageTag) -> LanguageTag {
        match self {
            ObfuscationMethod::Eval64 | ObfuscationMethod::HexEval => LanguageTag::JavaScript,
            ObfuscationMethod::GenericContainer => match lang {
                LanguageTag::HtmlXml | LanguageTag::Css => LanguageTag::JavaScript,
                other => other,
            },
        }
    }
}

impl fmt::Display for ObfuscationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for unrecognized method names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMethod(pub String);

impl fmt::Display for UnknownMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown obfuscation method: {}", self.0)
    }
}

impl std::error::Error for UnknownMethod {}

impl FromStr for ObfuscationMethod {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "eval64" | "eval-b64" | "b64" => Ok(ObfuscationMethod::Eval64),
            "hex" | "hex-eval" => Ok(ObfuscationMethod::HexEval),
            "container" | "generic" => Ok(ObfuscationMethod::GenericContainer),
            other => Err(UnknownMethod(other.to_string())),
        }
    }
}

fn b64(code: &str) -> String {
    BASE64.encode(code.as_bytes())
}

/// Encode `code` with `method`. `lang` matters only for the generic
/// container, which picks its wrapper per language.
pub fn obfuscate(code: &str, lang: LanguageTag, method: ObfuscationMethod) -> String {
    match method {
        ObfuscationMethod::Eval64 => eval_base64(code),
        ObfuscationMethod::HexEval => hex_eval(code),
        ObfuscationMethod::GenericContainer => generic_container(code, lang),
    }
}

/// JS IIFE: base64 payload, decoded via `atob` with a
/// `decodeURIComponent(escape(...))` repair for multibyte UTF-8.
fn eval_base64(code: &str) -> String {
    format!(
        "(function(){{\
         const d=(s)=>{{try{{return decodeURIComponent(escape(s))}}catch(e){{return s}}}};\
         eval(d(atob('{}')));\
         }})();",
        b64(code)
    )
}

/// `eval` over every UTF-8 byte as a lowercase `\xNN` escape, so decoding
/// recovers the original text including non-ASCII.
fn hex_eval(code: &str) -> String {
    let mut esc = String::with_capacity(code.len() * 4);
    for b in code.as_bytes() {
        esc.push_str(&format!("\\x{:02x}", b));
    }
    format!("eval('{}');", esc)
}

fn generic_container(code: &str, lang: LanguageTag) -> String {
    let b = b64(code);
    match lang {
        LanguageTag::Python => {
            format!("import base64;exec(base64.b64decode('{b}').decode('utf-8'))")
        }
        LanguageTag::Php => format!("<?php eval(base64_decode('{b}'));"),
        LanguageTag::HtmlXml => format!(
            "<script>(()=>{{const s=atob('{b}');\
             try{{document.write(decodeURIComponent(escape(s)))}}\
             catch(e){{document.write(s)}}}})();</script>"
        ),
        LanguageTag::Css => format!(
            "<script>(()=>{{const css=(()=>{{const s=atob('{b}');\
             try{{return decodeURIComponent(escape(s))}}\
             catch(e){{return s}}}})();\
             const st=document.createElement('style');st.textContent=css;\
             document.head.appendChild(st);}})();</script>"
        ),
        _ => b,
    }
}

/// Prepend `comment` to `code` using the marker style of `lang`. A blank
/// comment leaves the code unchanged. Python comments are emitted per line.
pub fn append_comment(code: &str, lang: LanguageTag, comment: &str) -> String {
    let c = comment.trim();
    if c.is_empty() {
        return code.to_string();
    }
    match lang {
        LanguageTag::JavaScript
        | LanguageTag::Php
        | LanguageTag::Css
        | LanguageTag::Plain
        | LanguageTag::Json => format!("/* {c} */\n{code}"),
        LanguageTag::Python => {
            let lines: Vec<String> = c
                .lines()
                .map(|ln| {
                    if ln.trim().is_empty() {
                        "#".to_string()
                    } else {
                        format!("# {ln}")
                    }
                })
                .collect();
            format!("{}\n{code}", lines.join("\n"))
        }
        LanguageTag::HtmlXml => format!("<!-- {c} -->\n{code}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eval64_wraps_payload() {
        let out = obfuscate("alert(1);", LanguageTag::JavaScript, ObfuscationMethod::Eval64);
        assert!(out.starts_with("(function(){"));
        assert!(out.contains("atob('YWxlcnQoMSk7')"));
        assert!(out.ends_with("})();"));
    }

    #[test]
    fn test_hex_eval_lowercase_bytes() {
        let out = obfuscate("ab", LanguageTag::Plain, ObfuscationMethod::HexEval);
        assert_eq!(out, "eval('\\x61\\x62');");
    }

    #[test]
    fn test_hex_eval_multibyte_utf8() {
        let out = obfuscate("é", LanguageTag::Plain, ObfuscationMethod::HexEval);
        assert_eq!(out, "eval('\\xc3\\xa9');");
    }

    #[test]
    fn test_container_python() {
        let out = obfuscate("print(1)", LanguageTag::Python, ObfuscationMethod::GenericContainer);
        assert_eq!(
            out,
            "import base64;exec(base64.b64decode('cHJpbnQoMSk=').decode('utf-8'))"
        );
    }

    #[test]
    fn test_container_php() {
        let out = obfuscate("echo 1;", LanguageTag::Php, ObfuscationMethod::GenericContainer);
        assert!(out.starts_with("<?php eval(base64_decode('"));
    }

    #[test]
    fn test_container_plain_is_bare_base64() {
        let out = obfuscate("hi", LanguageTag::Plain, ObfuscationMethod::GenericContainer);
        assert_eq!(out, "aGk=");
    }

    #[test]
    fn test_output_language() {
        assert_eq!(
            ObfuscationMethod::Eval64.output_language(LanguageTag::Python),
            LanguageTag::JavaScript
        );
        assert_eq!(
            ObfuscationMethod::GenericContainer.output_language(LanguageTag::Css),
            LanguageTag::JavaScript
        );
        assert_eq!(
            ObfuscationMethod::GenericContainer.output_language(LanguageTag::Python),
            LanguageTag::Python
        );
    }

    #[test]
    fn test_append_comment_styles() {
        assert_eq!(
            append_comment("x;", LanguageTag::JavaScript, "note"),
            "/* note */\nx;"
        );
        assert_eq!(
            append_comment("<p/>", LanguageTag::HtmlXml, "note"),
            "<!-- note -->\n<p/>"
        );
        assert_eq!(
            append_comment("x=1", LanguageTag::Python, "a\n\nb"),
            "# a\n#\n# b\nx=1"
        );
    }

    #[test]
    fn test_append_comment_blank_is_noop() {
        assert_eq!(append_comment("x;", LanguageTag::JavaScript, "   "), "x;");
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!("eval64".parse(), Ok(ObfuscationMethod::Eval64));
        assert_eq!("HEX".parse(), Ok(ObfuscationMethod::HexEval));
        assert_eq!("container".parse(), Ok(ObfuscationMethod::GenericContainer));
        assert!("rot13".parse::<ObfuscationMethod>().is_err());
    }
}
