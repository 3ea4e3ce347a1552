use serde_json::json;
use spotai::llm::{LlmError, clean_json, parse_object};

#[test]
fn test_clean_json_strips_fences() {
    let content = "```json\n{\n  \"genres\": [\"pop\"]\n}\n```";
    assert_eq!(clean_json(content), "{  \"genres\": [\"pop\"]}");

    let content = "```\n{\"a\": 1}\n```\n";
    assert_eq!(clean_json(content), "{\"a\": 1}");
}

#[test]
fn test_clean_json_leaves_plain_json_alone() {
    assert_eq!(clean_json("{\"a\": 1}"), "{\"a\": 1}");
    assert_eq!(clean_json("   "), "");
}

#[test]
fn test_parse_object() {
    let value = parse_object("```json\n{\"genres\": [\"rock\", \"metal\"]}\n```").unwrap();
    assert_eq!(value, json!({ "genres": ["rock", "metal"] }));
}

#[test]
fn test_parse_object_errors() {
    assert!(matches!(parse_object(""), Err(LlmError::EmptyResponse)));
    assert!(matches!(parse_object("```json\n```"), Err(LlmError::EmptyResponse)));
    assert!(matches!(
        parse_object("Sure! Here are some genres."),
        Err(LlmError::InvalidJson(_))
    ));
}
