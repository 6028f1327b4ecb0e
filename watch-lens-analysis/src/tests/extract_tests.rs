use serde_json::json;

use super::*;

#[test]
fn plain_json_parses_directly() {
    let got = extract_json(r#"  {"a": 1}  "#).unwrap();
    assert_eq!(got.value, json!({"a": 1}));
    assert_eq!(got.strategy, ExtractStrategy::Direct);
}

#[test]
fn fenced_json_is_unwrapped() {
    let got = extract_json("```json\n{\"a\":1}\n```").unwrap();
    assert_eq!(got.value, json!({"a": 1}));
    assert_eq!(got.strategy, ExtractStrategy::Fenced);

    let got = extract_json("```\n[1, 2]\n```").unwrap();
    assert_eq!(got.value, json!([1, 2]));
}

#[test]
fn unclosed_fence_runs_to_end() {
    let got = extract_json("```json\n{\"a\": 1}").unwrap();
    assert_eq!(got.value, json!({"a": 1}));
}

#[test]
fn malformed_json_is_repaired() {
    let got = extract_json("{a: 1,}").unwrap();
    assert_eq!(got.value, json!({"a": 1}));
    assert_eq!(got.strategy, ExtractStrategy::Repaired);
}

#[test]
fn json_inside_prose_is_found() {
    let text = "Sure! Here is the analysis:\n{\"batchCount\": 2, \"categories\": []}\nLet me know if you need more.";
    let got = extract_json(text).unwrap();
    assert_eq!(got.value, json!({"batchCount": 2, "categories": []}));
    assert_eq!(got.strategy, ExtractStrategy::Substring);
}

#[test]
fn malformed_json_inside_prose_is_found_and_repaired() {
    let got = extract_json("Result: {'a': True,} done").unwrap();
    assert_eq!(got.value, json!({"a": true}));
    assert_eq!(got.strategy, ExtractStrategy::Substring);
}

#[test]
fn control_characters_are_dropped_before_parsing() {
    let got = extract_json("{\"a\":\u{0}1}").unwrap();
    assert_eq!(got.value, json!({"a": 1}));
    assert_eq!(got.strategy, ExtractStrategy::Direct);
}

#[test]
fn unrecoverable_text_reports_every_attempt() {
    let err = extract_json("Error generating final analysis").unwrap_err();
    let ExtractError::Exhausted { attempts } = err;
    assert_eq!(attempts.len(), 4);
    assert!(attempts[0].starts_with("direct"));
    assert!(attempts[3].starts_with("pattern fix"));
}

#[test]
fn pattern_fix_quotes_keys_and_bare_values() {
    let fixed = pattern_fix("{name: 'x', n: 5, ok: true, tag: foo,}");
    let value: serde_json::Value = serde_json::from_str(&fixed).unwrap();
    assert_eq!(value, json!({"name": "x", "n": 5, "ok": true, "tag": "foo"}));
}

#[test]
fn backticks_inside_valid_json_do_not_hide_it() {
    let text = r#"{"keyInsights": {"formatInsight": "Wrap code in ```sh``` blocks"}, "batchCount": 2}"#;
    let got = extract_json(text).unwrap();
    assert_eq!(got.strategy, ExtractStrategy::Direct);
    assert_eq!(got.value["batchCount"], 2);
    assert_eq!(
        got.value["keyInsights"]["formatInsight"],
        "Wrap code in ```sh``` blocks"
    );
}

#[test]
fn fenced_snippet_in_trailing_prose_is_ignored() {
    let got = extract_json("{\"batchCount\": 2}\n\nTip: run ```jq .``` on it.").unwrap();
    assert_eq!(got.value, json!({"batchCount": 2}));
    assert_eq!(got.strategy, ExtractStrategy::Repaired);
}

#[test]
fn fence_block_inside_prose_is_a_late_fallback() {
    let got = extract_json("The count is:\n```\n42\n```\nThanks!").unwrap();
    assert_eq!(got.value, json!(42));
    assert_eq!(got.strategy, ExtractStrategy::FenceBlock);

    let got = extract_json("Here you go:\n```json\n{\"a\": 1}\n```").unwrap();
    assert_eq!(got.value, json!({"a": 1}));
    assert_eq!(got.strategy, ExtractStrategy::Substring);
}

#[test]
fn fence_and_span_helpers() {
    assert_eq!(strip_fence("no fence"), None);
    assert_eq!(strip_fence("x ```json\n{}\n``` y"), None);
    assert_eq!(strip_fence("  ```json\n{}\n```  "), Some("{}"));
    assert_eq!(strip_fence("```{\"a\":1}```"), Some("{\"a\":1}"));
    assert_eq!(first_fence_block("x ```json\n{}\n``` y"), Some("{}"));
    assert_eq!(first_fence_block("x ```\n[1]"), Some("[1]"));
    assert_eq!(first_fence_block("none"), None);
    assert_eq!(bracketed_span("a {b} c"), Some("{b}"));
    assert_eq!(bracketed_span("} backwards {"), None);
    assert_eq!(bracketed_span("none"), None);
}

#[test]
fn pattern_regexes_compile() {
    assert!(BARE_KEY.is_match("{a: 1}"));
    assert!(BARE_VALUE.is_match(": foo}"));
    assert!(TRAILING_COMMA.is_match("[1,]"));
}
