//! Property-based tests: totality on arbitrary input, idempotence of the
//! formatters, and encode/decode inverses.

use proptest::prelude::*;

use recast::lang::LanguageTag;
use recast::obfuscate::ObfuscationMethod;
use recast::pretty::IndentSpec;

fn four() -> IndentSpec {
    IndentSpec {
        use_tabs: false,
        size: 4,
    }
}

/// Statement-shaped JS without strings or comments, so formatting is
/// structure-only.
fn js_statements_strategy() -> impl Strategy<Value = String> {
    proptest::collection::vec("[a-z]{1,6}", 1..6).prop_map(|names| {
        names
            .iter()
            .map(|n| format!("var {} = 1;", n))
            .collect::<Vec<_>>()
            .join(" ")
    })
}

proptest! {
    #[test]
    fn test_transformations_never_panic(input in "\\PC{0,200}") {
        for lang in LanguageTag::ALL {
            let _ = recast::detect_language(&input);
            let _ = recast::strip_comments(&input, lang);
            let _ = recast::minify(&input, lang);
            let _ = recast::pretty_format(&input, lang, four(), false);
        }
        let _ = recast::deobfuscate(&input);
        let _ = recast::tidy_whitespace(&input, 1, true);
    }

    #[test]
    fn test_js_format_idempotent(input in js_statements_strategy()) {
        let once = recast::pretty_format(&input, LanguageTag::JavaScript, four(), false);
        let twice = recast::pretty_format(&once, LanguageTag::JavaScript, four(), false);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn test_minify_idempotent(input in js_statements_strategy()) {
        let once = recast::minify(&input, LanguageTag::JavaScript);
        let twice = recast::minify(&once, LanguageTag::JavaScript);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn test_json_format_preserves_value(value in json_value_strategy()) {
        let src = serde_json::to_string(&value).expect("serializable");
        let out = recast::pretty_format(&src, LanguageTag::Json, four(), false);
        let back: serde_json::Value = serde_json::from_str(&out).expect("valid JSON out");
        prop_assert_eq!(back, value);
    }

    #[test]
    fn test_json_sorted_format_preserves_value(value in json_value_strategy()) {
        let src = serde_json::to_string(&value).expect("serializable");
        let out = recast::pretty_format(&src, LanguageTag::Json, four(), true);
        let back: serde_json::Value = serde_json::from_str(&out).expect("valid JSON out");
        prop_assert_eq!(back, value);
    }

    #[test]
    fn test_eval64_inverse(src in "[a-zA-Z0-9 ();=+'\"\\n]{1,120}") {
        let enc = recast::obfuscate(&src, LanguageTag::JavaScript, ObfuscationMethod::Eval64);
        let dec = recast::deobfuscate(&enc);
        prop_assert_eq!(dec.as_deref(), Some(src.as_str()));
    }

    #[test]
    fn test_hex_eval_inverse(src in "[a-zA-Z0-9 ();=+\\n\\u{e0}-\\u{ff}]{1,80}") {
        let enc = recast::obfuscate(&src, LanguageTag::JavaScript, ObfuscationMethod::HexEval);
        let dec = recast::deobfuscate(&enc);
        prop_assert_eq!(dec.as_deref(), Some(src.as_str()));
    }

    #[test]
    fn test_strip_never_adds_comment_markers(input in "[a-z ();{}\\n]{0,120}") {
        // Comment-free input stays comment-free and keeps its code.
        let out = recast::strip_comments(&input, LanguageTag::JavaScript);
        prop_assert!(!out.contains("/*"));
        prop_assert!(!out.contains("//"));
    }
}

fn json_value_strategy() -> impl Strategy<Value = serde_json::Value> {
    let leaf = prop_oneof![
        Just(serde_json::Value::Null),
        any::<bool>().prop_map(serde_json::Value::from),
        any::<i64>().prop_map(serde_json::Value::from),
        "[a-zA-Z0-9 ]{0,12}".prop_map(serde_json::Value::from),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..4).prop_map(serde_json::Value::from),
            proptest::collection::hash_map("[a-z]{1,6}", inner, 0..4).prop_map(|m| {
                serde_json::Value::Object(m.into_iter().collect())
            }),
        ]
    })
}
