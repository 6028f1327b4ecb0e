use serde_json::{Value, json};

use super::*;

fn repaired(text: &str) -> Value {
    let fixed = repair_json(text).unwrap();
    serde_json::from_str(&fixed).unwrap_or_else(|e| panic!("{fixed:?} did not parse: {e}"))
}

#[test]
fn valid_json_is_unchanged_in_meaning() {
    let text = r#"{"a": [1, 2.5, -3], "b": {"c": "d\"e"}, "f": null}"#;
    assert_eq!(repaired(text), serde_json::from_str::<Value>(text).unwrap());
}

#[test]
fn single_quotes_and_bare_keys() {
    assert_eq!(
        repaired("{'name': 'it's fine', count: 3}"),
        json!({"name": "it's fine", "count": 3})
    );
}

#[test]
fn python_literals_and_bare_words() {
    assert_eq!(
        repaired("{a: True, b: None, c: False, d: Music Videos}"),
        json!({"a": true, "b": null, "c": false, "d": "Music Videos"})
    );
}

#[test]
fn trailing_commas_are_dropped() {
    assert_eq!(repaired("{\"a\": [1, 2,], }"), json!({"a": [1, 2]}));
    assert_eq!(repaired("[,,1,,2,]"), json!([1, 2]));
}

#[test]
fn missing_commas_between_lines() {
    let text = "{\n  \"a\": \"x\"\n  \"b\": 2\n  \"c\": [1 2]\n}";
    assert_eq!(repaired(text), json!({"a": "x", "b": 2, "c": [1, 2]}));
}

#[test]
fn missing_comma_after_number_on_one_line() {
    assert_eq!(repaired(r#"{"a": 1 "b": 2}"#), json!({"a": 1, "b": 2}));
}

#[test]
fn raw_control_characters_inside_strings_are_escaped() {
    assert_eq!(
        repaired("{\"text\": \"line one\nline two\tend\"}"),
        json!({"text": "line one\nline two\tend"})
    );
}

#[test]
fn truncated_output_is_closed() {
    assert_eq!(
        repaired(r#"{"categories": [{"name": "Gaming", "percentage": 40"#),
        json!({"categories": [{"name": "Gaming", "percentage": 40}]})
    );
    assert_eq!(repaired(r#"{"insight": "cut off mid"#), json!({"insight": "cut off mid"}));
    assert_eq!(repaired(r#"{"key":"#), json!({"key": null}));
}

#[test]
fn inner_quotes_stay_in_the_string() {
    assert_eq!(
        repaired(r#"{"d": "he said "hi" to me"}"#),
        json!({"d": "he said \"hi\" to me"})
    );
}

#[test]
fn loose_numbers_are_fixed() {
    assert_eq!(
        repaired("[+1, .5, 2., -.25, 60%]"),
        json!([1, 0.5, 2.0, -0.25, "60%"])
    );
}

#[test]
fn trailing_text_after_value_is_ignored() {
    assert_eq!(repaired("{\"a\": 1} and then some prose"), json!({"a": 1}));
}

#[test]
fn prose_is_not_repaired() {
    assert!(repair_json("Error generating final analysis").is_none());
    assert!(repair_json("").is_none());
}

#[test]
fn deep_nesting_does_not_overflow() {
    let text = "[".repeat(10_000);
    let fixed = repair_json(&text).unwrap();
    assert!(fixed.starts_with("[["));
}
