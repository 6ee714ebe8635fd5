use losslessjson::{
    json_value_from_serde, json_value_to_serde, node_from_serialize, parse, Document, JsonValue,
};
use rstest::rstest;
use serde::Serialize;

#[rstest]
#[case("null")]
#[case("true")]
#[case("42")]
#[case("-0.5")]
#[case("\"hi\\n\"")]
#[case("[1, 2, [3]]")]
#[case("{\"a\": 1, \"b\": {\"c\": []}}")]
fn strict_json_projection_matches_serde(#[case] input: &str) {
    let doc = parse(input).unwrap();
    let ours = json_value_to_serde(&doc.to_json());
    let theirs: serde_json::Value = serde_json::from_str(input).unwrap();
    assert_eq!(ours, theirs);
}

#[test]
fn json5_literals_decode_to_their_values() {
    let doc = parse("[0x2A, .5, 5., NaN, -Infinity, 'single']").unwrap();
    let values = match doc.to_json() {
        JsonValue::Array(values) => values,
        other => panic!("expected array, got {:?}", other),
    };
    assert_eq!(values[0], JsonValue::Number(42.0));
    assert_eq!(values[1], JsonValue::Number(0.5));
    assert_eq!(values[2], JsonValue::Number(5.0));
    assert_eq!(values[3], JsonValue::Number(f64::NAN));
    assert_eq!(values[4], JsonValue::Number(f64::NEG_INFINITY));
    assert_eq!(values[5], JsonValue::String("single".to_string()));
}

#[test]
fn identifier_keys_project_to_plain_strings() {
    let doc = parse("{ foo: 1, NaN: 2 }").unwrap();
    let json = doc.to_json();
    assert_eq!(
        json,
        JsonValue::Object(vec![
            ("foo".to_string(), JsonValue::Number(1.0)),
            ("NaN".to_string(), JsonValue::Number(2.0)),
        ])
    );
}

#[test]
fn escapes_and_line_continuations_decode() {
    let doc = parse("\"a\\u0041\\n\\x41\\q\\\n b\"").unwrap();
    assert_eq!(doc.to_json(), JsonValue::String("aA\nAq b".to_string()));
}

#[test]
fn non_finite_numbers_become_null_in_strict_json() {
    let doc = parse("[NaN, Infinity]").unwrap();
    let plain = json_value_to_serde(&doc.to_json());
    assert_eq!(plain, serde_json::json!([null, null]));
}

#[test]
fn serde_value_round_trips_through_plain_values() {
    let source = serde_json::json!({"a": [1, 2], "b": "x"});
    let ours = json_value_from_serde(&source);
    assert_eq!(json_value_to_serde(&ours), source);
}

#[test]
fn nodes_can_be_built_from_serializable_types() {
    #[derive(Serialize)]
    struct Server {
        host: String,
        port: u16,
    }

    let mut doc = parse("{}").unwrap();
    let node = node_from_serialize(&Server { host: "localhost".into(), port: 8080 }).unwrap();
    doc.root_mut().as_object_mut().unwrap().set_node("server", node);
    assert_eq!(
        doc.to_text(),
        "{\"server\":{\"host\":\"localhost\",\"port\":8080}}"
    );
}

#[test]
fn update_without_merge_replaces_the_property_set() {
    let mut doc = parse("{\"a\":1,\"b\":2}").unwrap();
    doc.update(
        JsonValue::Object(vec![
            ("a".to_string(), JsonValue::Number(1.0)),
            ("c".to_string(), JsonValue::Number(3.0)),
        ]),
        false,
    );
    assert_eq!(doc.to_text(), "{\"a\":1,\"c\":3}");
}

#[test]
fn update_with_merge_keeps_absent_properties() {
    let mut doc = parse("{\"a\": 1}").unwrap();
    doc.update(
        JsonValue::Object(vec![("b".to_string(), JsonValue::Number(2.0))]),
        true,
    );
    assert_eq!(doc.to_text(), "{\"a\": 1,\"b\": 2}");
}

#[test]
fn update_with_identical_content_changes_nothing() {
    let mut doc = parse("{ foo: 0x2A, }").unwrap();
    doc.update(
        JsonValue::Object(vec![("foo".to_string(), JsonValue::Number(42.0))]),
        false,
    );
    assert_eq!(doc.to_text(), "{ foo: 0x2A, }");
}

#[test]
fn update_shrinks_arrays_from_the_tail() {
    let mut doc = parse("[1, 2, 3]").unwrap();
    doc.update(
        JsonValue::Array(vec![JsonValue::Number(1.0), JsonValue::Number(2.0)]),
        false,
    );
    assert_eq!(doc.to_text(), "[1, 2]");
}

#[test]
fn update_swaps_kinds_wholesale() {
    let mut doc = parse("{\"a\": 1}").unwrap();
    doc.update(JsonValue::Array(vec![JsonValue::Bool(true)]), false);
    assert_eq!(doc.to_text(), "[true]");
}

#[test]
fn documents_can_be_built_from_plain_values() {
    let mut doc = Document::from_value(42);
    assert_eq!(doc.to_text(), "42");

    let mut doc = Document::from_value(JsonValue::Object(vec![(
        "a".to_string(),
        JsonValue::String("b".to_string()),
    )]));
    assert_eq!(doc.to_text(), "{\"a\":\"b\"}");
}

#[test]
fn equivalence_ignores_location_but_equals_does_not() {
    let a = parse("[1, 2]").unwrap();
    let b = parse("  [1,2]").unwrap();
    assert!(a.root().is_equivalent(b.root()));
    assert!(!a.root().equals(b.root()));

    let c = parse("[1, 2]").unwrap();
    assert!(a.root().equals(c.root()));
}

#[test]
fn nan_is_equivalent_to_nan() {
    let a = parse("NaN").unwrap();
    let b = parse("NaN").unwrap();
    assert!(a.root().is_equivalent(b.root()));
}

#[test]
fn primitive_accessors_expose_decoded_values() {
    let doc = parse("'hi'").unwrap();
    let primitive = doc.root().as_primitive().unwrap();
    assert_eq!(primitive.verbatim(), Some("'hi'"));
    assert_eq!(doc.to_json().as_str(), Some("hi"));
}
