use losslessjson::{parse, JsonValue};

#[test]
fn empty_object_stays_empty() {
    let mut doc = parse("{}").unwrap();
    assert_eq!(doc.to_text(), "{}");
}

#[test]
fn set_on_empty_object_uses_tight_defaults() {
    let mut doc = parse("{}").unwrap();
    doc.root_mut().as_object_mut().unwrap().set("foo", 1);
    assert_eq!(doc.to_text(), "{\"foo\":1}");
}

#[test]
fn delete_first_element_keeps_sibling_indentation() {
    let mut doc = parse("[1,\n  2,\n   3\n]").unwrap();
    doc.root_mut().as_array_mut().unwrap().delete(0).unwrap();
    assert_eq!(doc.to_text(), "[\n  2,\n   3\n]");
}

#[test]
fn unmutated_unquoted_key_document_is_untouched() {
    let mut doc = parse("{ foo: 1 }").unwrap();
    assert_eq!(doc.to_text(), "{ foo: 1 }");
}

#[test]
fn line_comment_forces_newline_before_pushed_element() {
    let mut doc = parse("[1, 2 // c\n]").unwrap();
    doc.root_mut().as_array_mut().unwrap().push(3);
    assert_eq!(doc.to_text(), "[1, 2, // c\n3\n]");
}

#[test]
fn sibling_quote_style_is_inherited_by_new_property() {
    let mut doc = parse("{'foo':'baz'}").unwrap();
    doc.root_mut().as_object_mut().unwrap().set("bar", "qux");
    assert_eq!(doc.to_text(), "{'foo':'baz','bar':'qux'}");
}

#[test]
fn hex_number_survives_verbatim() {
    let mut doc = parse("0x2A").unwrap();
    assert_eq!(doc.to_json(), JsonValue::Number(42.0));
    assert_eq!(doc.to_text(), "0x2A");
}

#[test]
fn push_follows_detected_indentation() {
    let mut doc = parse("[\n  1\n]").unwrap();
    doc.root_mut().as_array_mut().unwrap().push(2);
    assert_eq!(doc.to_text(), "[\n  1,\n  2\n]");
}

#[test]
fn unshift_inserts_before_existing_elements() {
    let mut doc = parse("[1, 2]").unwrap();
    doc.root_mut().as_array_mut().unwrap().unshift(0);
    assert_eq!(doc.to_text(), "[0, 1, 2]");
}

#[test]
fn insert_in_the_middle_picks_up_comma_spacing() {
    let mut doc = parse("[1, 3]").unwrap();
    doc.root_mut().as_array_mut().unwrap().insert(1, 2).unwrap();
    assert_eq!(doc.to_text(), "[1, 2, 3]");
}

#[test]
fn pop_removes_the_tail() {
    let mut doc = parse("[1, 2]").unwrap();
    let removed = doc.root_mut().as_array_mut().unwrap().pop().unwrap();
    assert_eq!(removed.to_json(), JsonValue::Number(2.0));
    assert_eq!(doc.to_text(), "[1]");
}

#[test]
fn shift_keeps_the_next_elements_lead_in() {
    let mut doc = parse("[1, 2]").unwrap();
    let removed = doc.root_mut().as_array_mut().unwrap().shift().unwrap();
    assert_eq!(removed.to_json(), JsonValue::Number(1.0));
    assert_eq!(doc.to_text(), "[ 2]");
}

#[test]
fn set_replaces_in_place_and_keeps_surroundings() {
    let mut doc = parse("[1, 2]").unwrap();
    doc.root_mut().as_array_mut().unwrap().set(0, 99).unwrap();
    assert_eq!(doc.to_text(), "[99, 2]");
}

#[test]
fn set_with_an_equal_value_keeps_the_original_spelling() {
    let mut doc = parse("[0x2A]").unwrap();
    doc.root_mut().as_array_mut().unwrap().set(0, 42).unwrap();
    assert_eq!(doc.to_text(), "[0x2A]");
}

#[test]
fn mutation_leaves_untouched_siblings_byte_identical() {
    let mut doc = parse("[1,2, 3]").unwrap();
    doc.root_mut().as_array_mut().unwrap().push(4);
    assert_eq!(doc.to_text(), "[1,2, 3, 4]");
}

#[test]
fn set_existing_property_keeps_its_own_quirks() {
    let mut doc = parse("{\"a\": 1,\n \"b\":2,\n  \"c\":  3}").unwrap();
    doc.root_mut().as_object_mut().unwrap().set("b", 5);
    assert_eq!(doc.to_text(), "{\"a\": 1,\n \"b\":5,\n  \"c\":  3}");
}

#[test]
fn delete_property_keeps_the_rest() {
    let mut doc = parse("{\"a\":1, \"b\":2}").unwrap();
    doc.root_mut().as_object_mut().unwrap().delete("a").unwrap();
    assert_eq!(doc.to_text(), "{ \"b\":2}");
}

#[test]
fn delete_missing_property_is_an_error() {
    let mut doc = parse("{}").unwrap();
    let err = doc.root_mut().as_object_mut().unwrap().delete("x").unwrap_err();
    assert!(err.to_string().contains("no property named 'x'"));
}

#[test]
fn new_property_inherits_trailing_comma_and_unquoted_keys() {
    let mut doc = parse("{\n  a: 1,\n}").unwrap();
    doc.root_mut().as_object_mut().unwrap().set("b", 2);
    assert_eq!(doc.to_text(), "{\n  a: 1,\n  b: 2,\n}");
}

#[test]
fn clear_empties_the_collection() {
    let mut doc = parse("[1,\n]").unwrap();
    doc.root_mut().as_array_mut().unwrap().clear();
    assert_eq!(doc.to_text(), "[]");
}

#[test]
fn splice_replaces_a_range() {
    let mut doc = parse("[1, 2, 3, 4]").unwrap();
    let removed = doc
        .root_mut()
        .as_array_mut()
        .unwrap()
        .splice(1, 2, vec![JsonValue::Number(9.0)])
        .unwrap();
    assert_eq!(removed.len(), 2);
    assert_eq!(doc.to_text(), "[1, 9, 4]");
}

#[test]
fn nested_mutation_is_local_to_the_nested_structure() {
    let mut doc = parse("{\n  \"keep\": [1, 2], // note\n  \"edit\": [1, 2]\n}").unwrap();
    doc.root_mut()
        .as_object_mut()
        .unwrap()
        .get_mut("edit")
        .unwrap()
        .as_array_mut()
        .unwrap()
        .push(3);
    assert_eq!(
        doc.to_text(),
        "{\n  \"keep\": [1, 2], // note\n  \"edit\": [1, 2, 3]\n}"
    );
}

#[test]
fn set_root_keeps_document_trivia() {
    let mut doc = parse("// keep\n1\n").unwrap();
    doc.set_root(2);
    assert_eq!(doc.to_text(), "// keep\n2\n");
}

#[test]
fn out_of_bounds_set_is_an_error() {
    let mut doc = parse("[]").unwrap();
    let err = doc.root_mut().as_array_mut().unwrap().set(5, 1).unwrap_err();
    assert!(err.to_string().contains("out of bounds"));
}
