use losslessjson::{parse, TokenGenerator};
use rstest::rstest;

#[rstest]
#[case::empty_object("{}")]
#[case::empty_array("[]")]
#[case::empty_array_multiline("[\n]")]
#[case::empty_object_spaced("{ }")]
#[case::null("null")]
#[case::boolean("true")]
#[case::integer("42")]
#[case::negative_fraction("-0.5")]
#[case::leading_dot(".5")]
#[case::trailing_dot("5.")]
#[case::exponent("1e3")]
#[case::hex("0x2A")]
#[case::nan("NaN")]
#[case::negative_infinity("-Infinity")]
#[case::signed("+1")]
#[case::double_quoted("\"hello\"")]
#[case::single_quoted("'hi'")]
#[case::flat_array("[1,2,3]")]
#[case::spaced_array("[1, 2, 3]")]
#[case::loose_array("[ 1 , 2 ]")]
#[case::tight_object("{\"a\":1}")]
#[case::spaced_object("{ \"a\": 1 }")]
#[case::identifier_key("{ foo: 1 }")]
#[case::single_quoted_object("{'a':'b'}")]
#[case::trailing_comma_array("[1,2,]")]
#[case::trailing_comma_object("{a:1,}")]
#[case::uneven_indentation("[1,\n  2,\n   3\n]")]
#[case::indented_object("{\n  \"a\": 1,\n  \"b\": [true, null]\n}")]
#[case::line_comment_in_array("[1, 2 // c\n]")]
#[case::comments_everywhere("/* lead */ [1 /* mid */, 2] /* tail */")]
#[case::leading_comment_line("// only\n[]")]
#[case::tabs("\t[\t1\t]\t")]
#[case::escapes("[\"\\u0041\", '\\n']")]
#[case::line_continuation("\"line\\\ncont\"")]
#[case::crlf("[1,\r\n2]")]
#[case::unicode_newline("[1,\u{2028}2]")]
#[case::nested("{\"a\": {\"b\": [[]]}}")]
#[case::bom("\u{FEFF}{}")]
#[case::surrounding_trivia(" \n 0x2A \n ")]
fn round_trip(#[case] input: &str) {
    let mut doc = parse(input).unwrap();
    assert_eq!(doc.to_text(), input);
}

#[rstest]
#[case("{\"a\": [1, 2, {\"b\": null}]}")]
#[case("[1,\n  2,\n   3\n]")]
#[case("{ foo: 1, 'bar': [true,] }")]
fn serializing_twice_is_stable(#[case] input: &str) {
    let mut doc = parse(input).unwrap();
    let first = doc.to_text();
    assert_eq!(doc.to_text(), first);
}

/// The token stream covers the input exactly: contiguous spans, no gaps,
/// and the concatenated texts rebuild the source.
#[rstest]
#[case("{ foo: 1, bar: [0x2A, .5, 'x'] } // done")]
#[case("[1,\r\n2, /* block */ 3]")]
fn token_stream_covers_input(#[case] input: &str) {
    let tokens: Vec<_> = TokenGenerator::new(input)
        .collect::<Result<Vec<_>, _>>()
        .unwrap();

    let rebuilt: String = tokens.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(rebuilt, input);

    let mut expected_index = 0;
    for token in &tokens {
        assert_eq!(token.span.start.index, expected_index);
        expected_index += token.text.len();
        assert_eq!(token.span.end.index, expected_index);
    }
    assert_eq!(tokens.last().unwrap().token_type, losslessjson::TokenType::End);
    assert!(tokens.last().unwrap().text.is_empty());
}

#[test]
fn positions_are_one_based_lines_and_columns() {
    let tokens: Vec<_> = TokenGenerator::new("[\n  1\n]")
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    let one = tokens.iter().find(|t| t.text == "1").unwrap();
    assert_eq!(one.span.start.line, 2);
    assert_eq!(one.span.start.column, 3);
}
