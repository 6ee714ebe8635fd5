use losslessjson::{parse, parse_as, InputPosition, NodeKind, TokenCursor};

#[test]
fn unrecognized_character_names_itself_and_its_position() {
    let err = parse("@").unwrap_err();
    assert!(err.to_string().contains("Unrecognized character '@'"));
    assert!(err.to_string().contains("line 1, column 1"));
}

#[test]
fn missing_comma_names_expected_and_actual_kinds() {
    let err = parse("[1 2]").unwrap_err();
    assert!(err.to_string().contains("Expected ',' or ']' but found number"));
    assert_eq!(
        err.input_position,
        Some(InputPosition { index: 3, line: 1, column: 4 })
    );
}

#[test]
fn unterminated_object_is_reported() {
    let err = parse("{").unwrap_err();
    assert!(err
        .to_string()
        .contains("Unexpected end of input while parsing an object"));
}

#[test]
fn unterminated_string_is_reported() {
    let err = parse("\"abc").unwrap_err();
    assert!(err.to_string().contains("end of input while processing string"));
}

#[test]
fn reserved_word_key_is_rejected() {
    let err = parse("{class: 1}").unwrap_err();
    assert!(err.to_string().contains("'class' is a reserved word"));
}

#[test]
fn literal_keyword_is_not_a_key() {
    let err = parse("{null: 1}").unwrap_err();
    assert!(err
        .to_string()
        .contains("Expected string or identifier but found null"));
}

#[test]
fn trailing_content_after_root_is_fatal() {
    let err = parse("1 2").unwrap_err();
    assert!(err
        .to_string()
        .contains("Unexpected number after the end of the document"));
}

#[test]
fn bad_unicode_escape_is_positioned_inside_the_source() {
    let err = parse("\"ab\\uZZZZ\"").unwrap_err();
    assert!(err.to_string().contains("Bad string literal"));
    assert_eq!(err.input_position.map(|p| p.line), Some(1));
}

#[test]
fn value_position_identifier_is_rejected() {
    let err = parse("flase").unwrap_err();
    assert!(err
        .to_string()
        .contains("Expected a value but found identifier"));
}

#[test]
fn numbers_do_not_run_into_keywords() {
    // "nullable" must lex as one identifier, not null + able.
    let err = parse("nullable").unwrap_err();
    assert!(err.to_string().contains("identifier"));
}

#[test]
fn typed_accessor_mismatch_names_both_kinds() {
    let doc = parse("{}").unwrap();
    let err = doc.root().expect_array().unwrap_err();
    assert!(err
        .to_string()
        .contains("Expected an array but found an object"));
}

#[test]
fn parse_as_checks_the_root_kind() {
    let err = parse_as("{}", NodeKind::Array).unwrap_err();
    assert!(err.to_string().contains("document root"));
    assert!(parse_as("[]", NodeKind::Array).is_ok());
}

#[test]
fn cursor_misuse_is_reported_not_ignored() {
    let cursor = TokenCursor::new("[]");
    assert!(cursor.current().is_err());

    let mut cursor = TokenCursor::new("[]");
    assert!(cursor.peek().is_err());
    cursor.move_next().unwrap();
    assert!(cursor.peek().is_ok());
}

#[test]
fn bad_number_is_rejected_with_position() {
    let err = parse("0x").unwrap_err();
    assert!(err.to_string().contains("number"));
    let err = parse("1e").unwrap_err();
    assert!(err.to_string().contains("number"));
}

#[test]
fn comments_must_terminate() {
    let err = parse("[1] /* open").unwrap_err();
    assert!(err
        .to_string()
        .contains("end of input while processing comment"));
}
