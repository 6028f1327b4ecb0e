use std::fs;

use super::*;

#[test]
fn test_parse_history_keeps_export_fields() {
    let json = r#"[
        {"header": "YouTube", "title": "Watched A video", "titleUrl": "https://example.com/1",
         "time": "2024-03-01T10:00:00Z"},
        {"title": "Watched Another", "name": "Some Channel"}
    ]"#;
    let records = parse_history(json).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].title, "Watched A video");
    assert_eq!(records[0].extra["titleUrl"], "https://example.com/1");
    assert_eq!(records[1].name.as_deref(), Some("Some Channel"));
}

#[test]
fn test_parse_history_rejects_non_array() {
    assert!(parse_history(r#"{"title": "x"}"#).is_err());
}

#[test]
fn test_load_history_missing_file_names_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.json");
    let err = load_history(&path).unwrap_err();
    assert!(matches!(err, IntakeError::Read { .. }));
    assert!(err.to_string().contains("missing.json"));
}

#[test]
fn test_load_history_malformed_is_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");
    fs::write(&path, "[{\"title\": ").unwrap();
    assert!(matches!(
        load_history(&path).unwrap_err(),
        IntakeError::Parse { .. }
    ));
}

#[test]
fn test_taxonomy_object_and_wrapped_array() {
    let obj = taxonomy_from_value(serde_json::json!({"1": "Film", "2": "Autos"}));
    assert_eq!(obj.len(), 2);
    let arr = taxonomy_from_value(serde_json::json!(["Film", "Music"]));
    assert_eq!(arr.len(), 1);
    assert_eq!(arr.0["categories"][1], "Music");
    assert!(taxonomy_from_value(serde_json::Value::Null).is_empty());
}

#[test]
fn test_bundle_load_with_optional_sources() {
    let dir = tempfile::tempdir().unwrap();
    let history = dir.path().join("history.json");
    let taxonomy = dir.path().join("categories.json");
    let prompt = dir.path().join("prompt.txt");
    fs::write(&history, r#"[{"title": "Watched One"}]"#).unwrap();
    fs::write(&taxonomy, r#"{"10": "Music"}"#).unwrap();
    fs::write(&prompt, "Analyze this.\n").unwrap();

    let bundle = IntakeBundle::load(
        &IntakeSources::new(&history)
            .taxonomy(Some(taxonomy))
            .instructions(Some(prompt)),
    )
    .unwrap();
    assert_eq!(bundle.records.len(), 1);
    assert_eq!(bundle.taxonomy.0["10"], "Music");
    assert_eq!(bundle.instructions.as_deref(), Some("Analyze this.\n"));

    let bare = IntakeBundle::load(&IntakeSources::new(&history)).unwrap();
    assert!(bare.taxonomy.is_empty());
    assert!(bare.instructions.is_none());
}

#[test]
fn test_blank_instructions_fall_back_to_default() {
    let dir = tempfile::tempdir().unwrap();
    let prompt = dir.path().join("prompt.txt");
    fs::write(&prompt, "  \n\t").unwrap();
    assert_eq!(load_instructions(&prompt).unwrap(), None);
}
