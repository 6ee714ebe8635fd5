use crate::error::LosslessJsonError;
use crate::model::{InputPosition, InputSpan, JsonToken, TokenType};
use crate::node::{
    ArrayNode, Document, IdentifierNode, ObjectNode, Primitive, PrimitiveNode, PropertyNode, Rib,
    ValueNode,
};
use crate::tokenizer::TokenGenerator;
use crate::value::{is_reserved_word, is_valid_identifier};

/// A cursor over the token stream with one token of lookahead.
///
/// `current` is the token under the cursor; `move_next` advances. The
/// convenience methods raise positioned errors that name the expected and
/// actual token kinds in words.
pub struct TokenCursor {
    generator: TokenGenerator,
    current: Option<JsonToken>,
    peeked: Option<JsonToken>,
}

impl TokenCursor {
    pub fn new(input: &str) -> Self {
        Self { generator: TokenGenerator::new(input), current: None, peeked: None }
    }

    pub fn current(&self) -> Result<&JsonToken, LosslessJsonError> {
        self.current
            .as_ref()
            .ok_or_else(|| LosslessJsonError::simple("Illegal cursor usage: no token has been read"))
    }

    pub fn move_next(&mut self) -> Result<&JsonToken, LosslessJsonError> {
        if let Some(token) = self.peeked.take() {
            self.current = Some(token);
            return self.current();
        }
        match self.generator.next() {
            Some(Ok(token)) => {
                self.current = Some(token);
                self.current()
            }
            Some(Err(err)) => Err(err),
            // Past the End sentinel the cursor just stays there.
            None => self.current(),
        }
    }

    /// Reads the next token without consuming it. Errors if called before
    /// the first `move_next`.
    pub fn peek(&mut self) -> Result<&JsonToken, LosslessJsonError> {
        if self.current.is_none() {
            return Err(LosslessJsonError::simple(
                "Illegal cursor usage: peek before the first advance",
            ));
        }
        if self.peeked.is_none() {
            match self.generator.next() {
                Some(Ok(token)) => self.peeked = Some(token),
                Some(Err(err)) => return Err(err),
                None => {}
            }
        }
        match &self.peeked {
            Some(token) => Ok(token),
            None => self.current(),
        }
    }

    /// Type-checks the current token without consuming it.
    pub fn expect(&self, kinds: &[TokenType]) -> Result<&JsonToken, LosslessJsonError> {
        let token = self.current()?;
        if kinds.contains(&token.token_type) {
            Ok(token)
        } else {
            Err(unexpected_token(token, kinds))
        }
    }

    /// Type-checks and consumes the current token, returning it.
    pub fn consume(&mut self, kinds: &[TokenType]) -> Result<JsonToken, LosslessJsonError> {
        let token = self.expect(kinds)?.clone();
        self.move_next()?;
        Ok(token)
    }

    /// Consumes and returns a run of tokens of the given kinds.
    pub fn skip(&mut self, kinds: &[TokenType]) -> Result<Vec<JsonToken>, LosslessJsonError> {
        let mut run = Vec::new();
        loop {
            let token = self.current()?;
            if token.token_type == TokenType::End || !kinds.contains(&token.token_type) {
                return Ok(run);
            }
            run.push(token.clone());
            self.move_next()?;
        }
    }

    /// Consumes and returns the trivia run in front of the next significant
    /// token, so it can be re-attached around the surrounding value.
    pub fn skip_insignificant(&mut self) -> Result<Vec<JsonToken>, LosslessJsonError> {
        self.skip(&[
            TokenType::Whitespace,
            TokenType::Newline,
            TokenType::LineComment,
            TokenType::BlockComment,
        ])
    }
}

fn unexpected_token(token: &JsonToken, expected: &[TokenType]) -> LosslessJsonError {
    let names: Vec<&str> = expected.iter().map(|k| k.name()).collect();
    LosslessJsonError::new(
        format!(
            "Expected {} but found {}",
            names.join(" or "),
            token.token_type.name()
        ),
        Some(token.span.start),
    )
}

/// Parses a complete document: leading trivia, one value, trailing trivia,
/// end of input.
pub(crate) fn parse_document(input: &str) -> Result<Document, LosslessJsonError> {
    let mut cursor = TokenCursor::new(input);
    cursor.move_next()?;
    let leading = cursor.skip_insignificant()?;
    let root = parse_value(&mut cursor)?;
    let trailing = cursor.skip_insignificant()?;
    let token = cursor.current()?;
    if token.token_type != TokenType::End {
        return Err(LosslessJsonError::new(
            format!(
                "Unexpected {} after the end of the document",
                token.token_type.name()
            ),
            Some(token.span.start),
        ));
    }
    Ok(Document { leading, root, trailing })
}

fn parse_value(cursor: &mut TokenCursor) -> Result<ValueNode, LosslessJsonError> {
    let token = cursor.current()?.clone();
    match token.token_type {
        TokenType::BeginArray => parse_array(cursor),
        TokenType::BeginObject => parse_object(cursor),
        TokenType::String => {
            let decoded = decode_string(&token)?;
            cursor.move_next()?;
            Ok(ValueNode::Primitive(PrimitiveNode::parsed(
                token,
                Primitive::String(decoded),
            )))
        }
        TokenType::Number => {
            let decoded = decode_number(&token)?;
            cursor.move_next()?;
            Ok(ValueNode::Primitive(PrimitiveNode::parsed(
                token,
                Primitive::Number(decoded),
            )))
        }
        TokenType::Boolean => {
            let value = token.text == "true";
            cursor.move_next()?;
            Ok(ValueNode::Primitive(PrimitiveNode::parsed(
                token,
                Primitive::Bool(value),
            )))
        }
        TokenType::Null => {
            cursor.move_next()?;
            Ok(ValueNode::Primitive(PrimitiveNode::parsed(token, Primitive::Null)))
        }
        TokenType::End => Err(LosslessJsonError::new(
            "Unexpected end of input while parsing a value",
            Some(token.span.start),
        )),
        other => Err(LosslessJsonError::new(
            format!("Expected a value but found {}", other.name()),
            Some(token.span.start),
        )),
    }
}

fn parse_array(cursor: &mut TokenCursor) -> Result<ValueNode, LosslessJsonError> {
    let open = cursor.consume(&[TokenType::BeginArray])?;
    let start = open.span.start;
    let mut array = ArrayNode::new_parsed(InputSpan::UNKNOWN);
    array.children.push(Rib::Token(open));

    loop {
        for token in cursor.skip_insignificant()? {
            array.children.push(Rib::Token(token));
        }
        let token = cursor.current()?;
        match token.token_type {
            TokenType::EndArray => {
                let close = cursor.consume(&[TokenType::EndArray])?;
                array.span = InputSpan::new(start, close.span.end);
                array.children.push(Rib::Token(close));
                return Ok(ValueNode::Array(array));
            }
            TokenType::End => {
                return Err(LosslessJsonError::new(
                    "Unexpected end of input while parsing an array",
                    Some(start),
                ));
            }
            _ => {}
        }

        let element = parse_value(cursor)?;
        let id = array.add_slot(element);
        array.order.push(id);
        array.children.push(Rib::Item(id));

        for token in cursor.skip_insignificant()? {
            array.children.push(Rib::Token(token));
        }
        let token = cursor.expect(&[TokenType::Comma, TokenType::EndArray])?;
        if token.token_type == TokenType::Comma {
            let comma = cursor.consume(&[TokenType::Comma])?;
            array.children.push(Rib::Token(comma));
        }
    }
}

fn parse_object(cursor: &mut TokenCursor) -> Result<ValueNode, LosslessJsonError> {
    let open = cursor.consume(&[TokenType::BeginObject])?;
    let start = open.span.start;
    let mut object = ObjectNode::new_parsed(InputSpan::UNKNOWN);
    object.children.push(Rib::Token(open));

    loop {
        for token in cursor.skip_insignificant()? {
            object.children.push(Rib::Token(token));
        }
        let token = cursor.current()?;
        match token.token_type {
            TokenType::EndObject => {
                let close = cursor.consume(&[TokenType::EndObject])?;
                object.span = InputSpan::new(start, close.span.end);
                object.children.push(Rib::Token(close));
                return Ok(ValueNode::Object(object));
            }
            TokenType::End => {
                return Err(LosslessJsonError::new(
                    "Unexpected end of input while parsing an object",
                    Some(start),
                ));
            }
            _ => {}
        }

        let property = parse_property(cursor)?;
        let id = object.add_slot(property);
        object.order.push(id);
        object.children.push(Rib::Item(id));

        for token in cursor.skip_insignificant()? {
            object.children.push(Rib::Token(token));
        }
        let token = cursor.expect(&[TokenType::Comma, TokenType::EndObject])?;
        if token.token_type == TokenType::Comma {
            let comma = cursor.consume(&[TokenType::Comma])?;
            object.children.push(Rib::Token(comma));
        }
    }
}

fn parse_property(cursor: &mut TokenCursor) -> Result<PropertyNode, LosslessJsonError> {
    let token = cursor.current()?.clone();
    let key = match token.token_type {
        TokenType::String => {
            let decoded = decode_string(&token)?;
            ValueNode::Primitive(PrimitiveNode::parsed(token, Primitive::String(decoded)))
        }
        TokenType::Identifier => {
            if is_reserved_word(&token.text) {
                return Err(LosslessJsonError::new(
                    format!(
                        "'{}' is a reserved word and may not be used as an unquoted key",
                        token.text
                    ),
                    Some(token.span.start),
                ));
            }
            ValueNode::Identifier(IdentifierNode::parsed(token))
        }
        // NaN and Infinity lex as numbers but are identifier-shaped, and
        // JSON5 admits any identifier name as a key.
        TokenType::Number if is_valid_identifier(&token.text) => {
            ValueNode::Identifier(IdentifierNode::parsed(token))
        }
        other => {
            return Err(LosslessJsonError::new(
                format!("Expected string or identifier but found {}", other.name()),
                Some(token.span.start),
            ));
        }
    };
    let key_start = key.span().start;
    cursor.move_next()?;

    let mut between: Vec<Rib> = Vec::new();
    for token in cursor.skip_insignificant()? {
        between.push(Rib::Token(token));
    }
    let colon = cursor.consume(&[TokenType::Colon])?;
    between.push(Rib::Token(colon));
    for token in cursor.skip_insignificant()? {
        between.push(Rib::Token(token));
    }

    let value = parse_value(cursor)?;
    let span = InputSpan::new(key_start, value.span().end);
    Ok(PropertyNode::parsed(key, value, between, span))
}

fn decode_number(token: &JsonToken) -> Result<f64, LosslessJsonError> {
    let text = token.text.as_str();
    let (sign, rest) = match text.chars().next() {
        Some('-') => (-1.0, &text[1..]),
        Some('+') => (1.0, &text[1..]),
        _ => (1.0, text),
    };

    if rest == "NaN" {
        return Ok(f64::NAN);
    }
    if rest == "Infinity" {
        return Ok(sign * f64::INFINITY);
    }
    if let Some(hex) = rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X")) {
        let mut value = 0.0f64;
        for ch in hex.chars() {
            match ch.to_digit(16) {
                Some(d) => value = value * 16.0 + d as f64,
                None => {
                    return Err(LosslessJsonError::new(
                        "Malformed hex number",
                        Some(token.span.start),
                    ));
                }
            }
        }
        return Ok(sign * value);
    }

    // Normalize the bare-dot forms the grammar allows before handing the
    // text to the standard float parser.
    let mut normalized = rest.to_string();
    if normalized.starts_with('.') {
        normalized.insert(0, '0');
    }
    if normalized.ends_with('.') {
        normalized.pop();
    }
    if let Some(pos) = normalized.find(".e").or_else(|| normalized.find(".E")) {
        normalized.remove(pos);
    }
    normalized
        .parse::<f64>()
        .map(|n| sign * n)
        .map_err(|_| LosslessJsonError::new("Malformed number", Some(token.span.start)))
}

fn decode_string(token: &JsonToken) -> Result<String, LosslessJsonError> {
    let chars: Vec<char> = token.text.chars().collect();
    if chars.len() < 2 {
        return Err(LosslessJsonError::new(
            "Malformed string literal",
            Some(token.span.start),
        ));
    }
    let body = &chars[1..chars.len() - 1];

    // Normalize into a double-quoted strict-JSON literal: strip line
    // continuations, resolve JSON5-only escapes, re-escape as needed. The
    // actual decoding is then delegated to the standard string decoder.
    let mut literal = String::with_capacity(body.len() + 2);
    literal.push('"');
    let mut i = 0;
    while i < body.len() {
        let ch = body[i];
        if ch != '\\' {
            push_literal_char(&mut literal, ch);
            i += 1;
            continue;
        }
        let next = match body.get(i + 1) {
            Some(c) => *c,
            None => {
                return Err(LosslessJsonError::new(
                    "Malformed string escape",
                    Some(token.span.start),
                ));
            }
        };
        match next {
            '\n' | '\u{2028}' | '\u{2029}' => i += 2,
            '\r' => {
                i += 2;
                if body.get(i) == Some(&'\n') {
                    i += 1;
                }
            }
            '"' => {
                literal.push_str("\\\"");
                i += 2;
            }
            '\'' => {
                literal.push('\'');
                i += 2;
            }
            '\\' | '/' | 'b' | 'f' | 'n' | 'r' | 't' | 'u' => {
                literal.push('\\');
                literal.push(next);
                i += 2;
            }
            'x' => {
                let hi = body.get(i + 2).and_then(|c| c.to_digit(16));
                let lo = body.get(i + 3).and_then(|c| c.to_digit(16));
                match (hi, lo) {
                    (Some(h), Some(l)) => {
                        let code = h * 16 + l;
                        match char::from_u32(code) {
                            Some(c) => push_literal_char(&mut literal, c),
                            None => literal.push_str(&format!("\\u{:04x}", code)),
                        }
                        i += 4;
                    }
                    _ => {
                        return Err(LosslessJsonError::new(
                            "Bad hex escape in string",
                            Some(token.span.start),
                        ));
                    }
                }
            }
            '0' => {
                literal.push_str("\\u0000");
                i += 2;
            }
            other => {
                // JSON5 identity escape: the backslash simply vanishes.
                push_literal_char(&mut literal, other);
                i += 2;
            }
        }
    }
    literal.push('"');

    serde_json::from_str::<String>(&literal).map_err(|err| remap_decode_error(err, token))
}

fn push_literal_char(literal: &mut String, ch: char) {
    if ch == '"' {
        literal.push_str("\\\"");
    } else if ch == '\\' {
        literal.push_str("\\\\");
    } else if (ch as u32) < 0x20 {
        literal.push_str(&format!("\\u{:04x}", ch as u32));
    } else {
        literal.push(ch);
    }
}

/// Translates a string-decoder failure into a parse error positioned inside
/// the original token rather than inside the normalized literal.
fn remap_decode_error(err: serde_json::Error, token: &JsonToken) -> LosslessJsonError {
    let offset = err.column().saturating_sub(1);
    let start = token.span.start;
    let pos = InputPosition {
        index: start.index.saturating_add(offset),
        line: start.line,
        column: start.column.saturating_add(offset),
    };
    let mut message = err.to_string();
    if let Some(idx) = message.find(" at line ") {
        message.truncate(idx);
    }
    LosslessJsonError::new(format!("Bad string literal: {}", message), Some(pos))
}
