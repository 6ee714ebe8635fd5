use losslessjson::{parse, FormatOptions, IndentCharacter, QuoteStyle};

#[test]
fn detects_comma_spacing_and_inline_layout() {
    let doc = parse("[1, 2]").unwrap();
    let style = doc.root().as_array().unwrap().detected_style();
    assert_eq!(style.array.comma_spacing, Some(true));
    assert_eq!(style.array.entry_indentation, Some(false));
    assert_eq!(style.array.leading_indentation, Some(false));
    assert_eq!(style.array.trailing_comma, Some(false));
}

#[test]
fn detects_indented_layout() {
    let doc = parse("[\n  1\n]").unwrap();
    let style = doc.root().as_array().unwrap().detected_style();
    assert_eq!(style.array.entry_indentation, Some(true));
    assert_eq!(style.array.leading_indentation, Some(true));
    assert_eq!(style.array.trailing_indentation, Some(true));
    assert_eq!(style.array.indentation_size, Some(2));
    assert_eq!(style.indentation_character, Some(IndentCharacter::Space));
}

#[test]
fn detects_tab_indentation() {
    let doc = parse("[\n\t1\n]").unwrap();
    let style = doc.root().as_array().unwrap().detected_style();
    assert_eq!(style.array.indentation_size, Some(1));
    assert_eq!(style.indentation_character, Some(IndentCharacter::Tab));
}

#[test]
fn detects_unquoted_property_style() {
    let doc = parse("{ foo: 1 }").unwrap();
    let style = doc.root().as_object().unwrap().detected_style();
    assert_eq!(style.property_unquoted, Some(true));
}

#[test]
fn detects_quote_characters_and_colon_spacing() {
    let doc = parse("{'a': 'b'}").unwrap();
    let style = doc.root().as_object().unwrap().detected_style();
    assert_eq!(style.property_quote, Some(QuoteStyle::Single));
    assert_eq!(style.string_quote, Some(QuoteStyle::Single));
    assert_eq!(style.object.colon_spacing, Some(true));
    assert_eq!(style.property_unquoted, Some(false));
}

#[test]
fn detects_trailing_comma() {
    let doc = parse("[1, 2,]").unwrap();
    let style = doc.root().as_array().unwrap().detected_style();
    assert_eq!(style.array.trailing_comma, Some(true));
}

#[test]
fn empty_multiline_block_defaults_to_indented_and_spaced() {
    let doc = parse("[\n]").unwrap();
    let style = doc.root().as_array().unwrap().detected_style();
    assert_eq!(style.array.entry_indentation, Some(true));
    assert_eq!(style.array.leading_indentation, Some(true));
    assert_eq!(style.array.trailing_indentation, Some(true));
    assert_eq!(style.array.comma_spacing, Some(true));
}

// The unit arithmetic divides the deepest observed indentation by its
// nesting depth, folding the remainder back in.

#[test]
fn unit_width_from_property_value_on_its_own_line() {
    // Width 6 at depth 2: (6 - 6 % 2) / 2 + 6 % 2 == 3.
    let doc = parse("{\n  \"a\":\n      1\n}").unwrap();
    let style = doc.root().as_object().unwrap().detected_style();
    assert_eq!(style.object.indentation_size, Some(3));
}

#[test]
fn unit_width_keeps_the_remainder_of_uneven_indentation() {
    // Width 7 at depth 2: (7 - 1) / 2 + 1 == 4.
    let doc = parse("{\n  \"a\":\n       1\n}").unwrap();
    let style = doc.root().as_object().unwrap().detected_style();
    assert_eq!(style.object.indentation_size, Some(4));
}

#[test]
fn uneven_sibling_indentation_takes_the_last_deepest_line() {
    let doc = parse("[1,\n  2,\n   3\n]").unwrap();
    let style = doc.root().as_array().unwrap().detected_style();
    assert_eq!(style.array.indentation_size, Some(3));
}

#[test]
fn reformat_pretty_and_idempotence() {
    let mut doc = parse("[1,2,3]").unwrap();
    let options = FormatOptions::pretty(2);
    doc.reformat(&options);
    let first = doc.to_text();
    assert_eq!(first, "[\n  1,\n  2,\n  3\n]");
    doc.reformat(&options);
    assert_eq!(doc.to_text(), first);
}

#[test]
fn reformat_keeps_comments_on_their_own_lines() {
    let mut doc = parse("[1, // c\n2]").unwrap();
    let options = FormatOptions::pretty(2);
    doc.reformat(&options);
    let first = doc.to_text();
    assert_eq!(first, "[\n  1,\n  // c\n  2\n]");
    doc.reformat(&options);
    assert_eq!(doc.to_text(), first);
}

#[test]
fn compact_collapses_arrays() {
    let mut doc = parse("[\n  1,\n  2\n]").unwrap();
    assert_eq!(doc.to_text_with(&FormatOptions::compact()), "[1,2]");
}

#[test]
fn compact_collapses_objects() {
    let mut doc = parse("{ \"a\": 1, \"b\": 2 }").unwrap();
    assert_eq!(doc.to_text_with(&FormatOptions::compact()), "{\"a\":1,\"b\":2}");
}

#[test]
fn compact_is_idempotent() {
    let mut doc = parse("{ \"a\": [1, 2],\n \"b\": 2 }").unwrap();
    let options = FormatOptions::compact();
    let first = doc.to_text_with(&options);
    assert_eq!(doc.to_text_with(&options), first);
}

#[test]
fn quote_overrides_reencode_strings_and_keys() {
    let mut doc = parse("{\"a\": \"b\"}").unwrap();
    let options = FormatOptions {
        string_quote: Some(QuoteStyle::Single),
        property_quote: Some(QuoteStyle::Single),
        ..FormatOptions::default()
    };
    assert_eq!(doc.to_text_with(&options), "{'a': 'b'}");
}

#[test]
fn unquoted_keys_override_skips_reserved_words() {
    let mut doc = parse("{\"a\": 1, \"class\": 2}").unwrap();
    let options = FormatOptions {
        property_unquoted: Some(true),
        ..FormatOptions::default()
    };
    assert_eq!(doc.to_text_with(&options), "{a: 1, \"class\": 2}");
}

#[test]
fn fresh_nested_values_serialize_tight_without_evidence() {
    let mut doc = parse("{}").unwrap();
    doc.root_mut().as_object_mut().unwrap().set("a", vec![1, 2]);
    assert_eq!(doc.to_text(), "{\"a\":[1,2]}");
}

#[test]
fn pushed_property_follows_three_space_indentation() {
    let mut doc = parse("{\n   \"a\": 1\n}").unwrap();
    doc.root_mut().as_object_mut().unwrap().set("b", 2);
    assert_eq!(doc.to_text(), "{\n   \"a\": 1,\n   \"b\": 2\n}");
}

#[test]
fn reset_discards_formatting_but_not_content() {
    let mut doc = parse("[1,\n  2\n]").unwrap();
    doc.root_mut().as_array_mut().unwrap().reset();
    assert_eq!(doc.to_text(), "[1,2]");
}

#[test]
fn detection_runs_on_every_rebuild() {
    // A first edit must not freeze the style: later edits see the text as
    // it stands, including the first edit's own output.
    let mut doc = parse("[1]").unwrap();
    doc.root_mut().as_array_mut().unwrap().push(2);
    assert_eq!(doc.to_text(), "[1,2]");
    doc.root_mut().as_array_mut().unwrap().push(3);
    assert_eq!(doc.to_text(), "[1,2,3]");
}
