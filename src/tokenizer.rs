use crate::error::LosslessJsonError;
use crate::model::{InputPosition, InputSpan, JsonToken, TokenType};

#[derive(Clone)]
pub struct ScannerState {
    original_text: String,
    chars: Vec<char>,
    byte_indices: Vec<usize>,
    char_index: usize,
    line: usize,
    column: usize,
    token_char_index: usize,
    token_line: usize,
    token_column: usize,
}

impl ScannerState {
    pub fn new(original_text: &str) -> Self {
        let mut chars: Vec<char> = Vec::new();
        let mut byte_indices: Vec<usize> = Vec::new();
        for (idx, ch) in original_text.char_indices() {
            byte_indices.push(idx);
            chars.push(ch);
        }
        byte_indices.push(original_text.len());

        Self {
            original_text: original_text.to_string(),
            chars,
            byte_indices,
            char_index: 0,
            line: 1,
            column: 1,
            token_char_index: 0,
            token_line: 1,
            token_column: 1,
        }
    }

    pub fn current_position(&self) -> InputPosition {
        InputPosition {
            index: self.byte_indices[self.char_index],
            line: self.line,
            column: self.column,
        }
    }

    fn token_position(&self) -> InputPosition {
        InputPosition {
            index: self.byte_indices[self.token_char_index],
            line: self.token_line,
            column: self.token_column,
        }
    }

    pub fn advance(&mut self) {
        self.char_index += 1;
        self.column += 1;
    }

    /// Consumes one line terminator, folding a CRLF pair into a single step.
    pub fn consume_line_terminator(&mut self) {
        let ch = self.chars[self.char_index];
        self.char_index += 1;
        self.line += 1;
        self.column = 1;
        if ch == '\r' && self.current() == Some('\n') {
            self.char_index += 1;
        }
    }

    pub fn set_token_start(&mut self) {
        self.token_char_index = self.char_index;
        self.token_line = self.line;
        self.token_column = self.column;
    }

    pub fn make_token_from_buffer(&self, token_type: TokenType) -> JsonToken {
        let start = self.byte_indices[self.token_char_index];
        let end = self.byte_indices[self.char_index];
        JsonToken {
            token_type,
            text: self.original_text[start..end].to_string(),
            span: InputSpan::new(self.token_position(), self.current_position()),
        }
    }

    pub fn current(&self) -> Option<char> {
        if self.at_end() {
            None
        } else {
            Some(self.chars[self.char_index])
        }
    }

    pub fn at_end(&self) -> bool {
        self.char_index >= self.chars.len()
    }

    pub fn error(&self, message: &str) -> LosslessJsonError {
        LosslessJsonError::new(message, Some(self.current_position()))
    }
}

/// Splits source text into a complete token stream: every byte of the input
/// belongs to exactly one token, trivia included, and the stream ends with a
/// zero-width [`TokenType::End`] sentinel.
pub struct TokenGenerator {
    state: ScannerState,
    end_emitted: bool,
}

impl TokenGenerator {
    pub fn new(input: &str) -> Self {
        Self { state: ScannerState::new(input), end_emitted: false }
    }
}

impl Iterator for TokenGenerator {
    type Item = Result<JsonToken, LosslessJsonError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state.at_end() {
            if self.end_emitted {
                return None;
            }
            self.end_emitted = true;
            self.state.set_token_start();
            return Some(Ok(self.state.make_token_from_buffer(TokenType::End)));
        }

        let ch = self.state.current()?;
        match ch {
            '{' => Some(process_single_char(&mut self.state, TokenType::BeginObject)),
            '}' => Some(process_single_char(&mut self.state, TokenType::EndObject)),
            '[' => Some(process_single_char(&mut self.state, TokenType::BeginArray)),
            ']' => Some(process_single_char(&mut self.state, TokenType::EndArray)),
            ':' => Some(process_single_char(&mut self.state, TokenType::Colon)),
            ',' => Some(process_single_char(&mut self.state, TokenType::Comma)),
            '/' => Some(process_comment(&mut self.state)),
            '"' | '\'' => Some(process_string(&mut self.state, ch)),
            '\n' | '\r' | '\u{2028}' | '\u{2029}' => Some(process_newline(&mut self.state)),
            '+' | '-' | '.' => Some(process_number(&mut self.state)),
            c if is_digit(c) => Some(process_number(&mut self.state)),
            c if is_identifier_start(c) => Some(process_word(&mut self.state)),
            c if is_inline_whitespace(c) => Some(process_whitespace(&mut self.state)),
            _ => Some(Err(self
                .state
                .error(&format!("Unrecognized character '{}'", ch)))),
        }
    }
}

fn process_single_char(
    state: &mut ScannerState,
    token_type: TokenType,
) -> Result<JsonToken, LosslessJsonError> {
    state.set_token_start();
    state.advance();
    Ok(state.make_token_from_buffer(token_type))
}

fn process_newline(state: &mut ScannerState) -> Result<JsonToken, LosslessJsonError> {
    state.set_token_start();
    state.consume_line_terminator();
    Ok(state.make_token_from_buffer(TokenType::Newline))
}

fn process_whitespace(state: &mut ScannerState) -> Result<JsonToken, LosslessJsonError> {
    state.set_token_start();
    while let Some(ch) = state.current() {
        if !is_inline_whitespace(ch) {
            break;
        }
        state.advance();
    }
    Ok(state.make_token_from_buffer(TokenType::Whitespace))
}

fn process_comment(state: &mut ScannerState) -> Result<JsonToken, LosslessJsonError> {
    state.set_token_start();
    state.advance();

    let is_block_comment = match state.current() {
        Some('*') => true,
        Some('/') => false,
        _ => return Err(state.error("Bad character for start of comment")),
    };
    state.advance();

    if !is_block_comment {
        // Up to, but not including, the line terminator: the newline stays a
        // token of its own so the formatting detector can see it.
        while let Some(ch) = state.current() {
            if is_line_terminator(ch) {
                break;
            }
            state.advance();
        }
        return Ok(state.make_token_from_buffer(TokenType::LineComment));
    }

    let mut last_char_was_asterisk = false;
    loop {
        if state.at_end() {
            return Err(state.error("Unexpected end of input while processing comment"));
        }
        let ch = state.current().unwrap();
        if is_line_terminator(ch) {
            state.consume_line_terminator();
            last_char_was_asterisk = false;
            continue;
        }
        state.advance();
        if ch == '/' && last_char_was_asterisk {
            return Ok(state.make_token_from_buffer(TokenType::BlockComment));
        }
        last_char_was_asterisk = ch == '*';
    }
}

fn process_string(state: &mut ScannerState, quote: char) -> Result<JsonToken, LosslessJsonError> {
    state.set_token_start();
    state.advance();

    loop {
        if state.at_end() {
            return Err(state.error("Unexpected end of input while processing string"));
        }

        let ch = state.current().unwrap();
        if ch == quote {
            state.advance();
            return Ok(state.make_token_from_buffer(TokenType::String));
        }
        if ch == '\\' {
            state.advance();
            if state.at_end() {
                return Err(state.error("Unexpected end of input while processing string"));
            }
            let escaped = state.current().unwrap();
            if is_line_terminator(escaped) {
                // Escaped line terminators are line continuations; they are
                // stripped at decode time, not here.
                state.consume_line_terminator();
            } else {
                state.advance();
            }
            continue;
        }
        if ch == '\n' || ch == '\r' {
            return Err(state.error("Unterminated string"));
        }
        if ch == '\u{2028}' || ch == '\u{2029}' {
            state.consume_line_terminator();
        } else {
            state.advance();
        }
    }
}

fn process_number(state: &mut ScannerState) -> Result<JsonToken, LosslessJsonError> {
    state.set_token_start();

    if matches!(state.current(), Some('+') | Some('-')) {
        state.advance();
    }

    // Signed NaN/Infinity keywords; the unsigned forms come in through the
    // identifier path instead.
    match state.current() {
        Some('N') => return finish_number_keyword(state, "NaN"),
        Some('I') => return finish_number_keyword(state, "Infinity"),
        _ => {}
    }

    let mut phase = NumberPhase::AfterSign;
    loop {
        let ch = match state.current() {
            Some(c) => c,
            None => {
                return if phase.may_end() {
                    Ok(state.make_token_from_buffer(TokenType::Number))
                } else {
                    Err(state.error("Unexpected end of input while processing number"))
                };
            }
        };

        let mut handling = CharHandling::ValidAndConsumed;
        match phase {
            NumberPhase::AfterSign => {
                if ch == '0' {
                    phase = NumberPhase::PastZero;
                } else if is_digit(ch) {
                    phase = NumberPhase::PastFirstDigitOfWhole;
                } else if ch == '.' {
                    phase = NumberPhase::PastLeadingDot;
                } else {
                    handling = CharHandling::InvalidatesToken;
                }
            }
            NumberPhase::PastZero => {
                if ch == 'x' || ch == 'X' {
                    phase = NumberPhase::PastHexMarker;
                } else if ch == '.' {
                    phase = NumberPhase::PastDecimalPoint;
                } else if ch == 'e' || ch == 'E' {
                    phase = NumberPhase::PastE;
                } else {
                    handling = CharHandling::StartOfNewToken;
                }
            }
            NumberPhase::PastHexMarker => {
                if is_hex(ch) {
                    phase = NumberPhase::PastFirstHexDigit;
                } else {
                    handling = CharHandling::InvalidatesToken;
                }
            }
            NumberPhase::PastFirstHexDigit => {
                if !is_hex(ch) {
                    handling = CharHandling::StartOfNewToken;
                }
            }
            NumberPhase::PastLeadingDot => {
                if is_digit(ch) {
                    phase = NumberPhase::PastFirstDigitOfFractional;
                } else {
                    handling = CharHandling::InvalidatesToken;
                }
            }
            NumberPhase::PastFirstDigitOfWhole => {
                if ch == '.' {
                    phase = NumberPhase::PastDecimalPoint;
                } else if ch == 'e' || ch == 'E' {
                    phase = NumberPhase::PastE;
                } else if !is_digit(ch) {
                    handling = CharHandling::StartOfNewToken;
                }
            }
            NumberPhase::PastDecimalPoint => {
                if is_digit(ch) {
                    phase = NumberPhase::PastFirstDigitOfFractional;
                } else if ch == 'e' || ch == 'E' {
                    phase = NumberPhase::PastE;
                } else {
                    handling = CharHandling::StartOfNewToken;
                }
            }
            NumberPhase::PastFirstDigitOfFractional => {
                if ch == 'e' || ch == 'E' {
                    phase = NumberPhase::PastE;
                } else if !is_digit(ch) {
                    handling = CharHandling::StartOfNewToken;
                }
            }
            NumberPhase::PastE => {
                if ch == '+' || ch == '-' {
                    phase = NumberPhase::PastExpSign;
                } else if is_digit(ch) {
                    phase = NumberPhase::PastFirstDigitOfExponent;
                } else {
                    handling = CharHandling::InvalidatesToken;
                }
            }
            NumberPhase::PastExpSign => {
                if is_digit(ch) {
                    phase = NumberPhase::PastFirstDigitOfExponent;
                } else {
                    handling = CharHandling::InvalidatesToken;
                }
            }
            NumberPhase::PastFirstDigitOfExponent => {
                if !is_digit(ch) {
                    handling = CharHandling::StartOfNewToken;
                }
            }
        }

        match handling {
            CharHandling::InvalidatesToken => {
                return Err(state.error("Bad character while processing number"));
            }
            CharHandling::StartOfNewToken => {
                return Ok(state.make_token_from_buffer(TokenType::Number));
            }
            CharHandling::ValidAndConsumed => state.advance(),
        }
    }
}

fn finish_number_keyword(
    state: &mut ScannerState,
    keyword: &str,
) -> Result<JsonToken, LosslessJsonError> {
    for expected in keyword.chars() {
        match state.current() {
            Some(c) if c == expected => state.advance(),
            Some(_) => return Err(state.error("Bad character while processing number")),
            None => return Err(state.error("Unexpected end of input while processing number")),
        }
    }
    if matches!(state.current(), Some(c) if is_identifier_continue(c)) {
        return Err(state.error("Bad character while processing number"));
    }
    Ok(state.make_token_from_buffer(TokenType::Number))
}

fn process_word(state: &mut ScannerState) -> Result<JsonToken, LosslessJsonError> {
    state.set_token_start();
    state.advance();
    while let Some(ch) = state.current() {
        if !is_identifier_continue(ch) {
            break;
        }
        state.advance();
    }

    // Maximal munch doubles as the negative lookahead on keywords: "nullable"
    // arrives here as one word and falls through to Identifier.
    let token = state.make_token_from_buffer(TokenType::Identifier);
    let token_type = match token.text.as_str() {
        "null" => TokenType::Null,
        "true" | "false" => TokenType::Boolean,
        "NaN" | "Infinity" => TokenType::Number,
        _ => TokenType::Identifier,
    };
    Ok(JsonToken { token_type, ..token })
}

fn is_digit(ch: char) -> bool {
    ch.is_ascii_digit()
}

fn is_hex(ch: char) -> bool {
    ch.is_ascii_hexdigit()
}

fn is_line_terminator(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

fn is_inline_whitespace(ch: char) -> bool {
    ch == '\u{FEFF}' || (ch.is_whitespace() && !is_line_terminator(ch))
}

pub(crate) fn is_identifier_start(ch: char) -> bool {
    ch == '$' || ch == '_' || unicode_ident::is_xid_start(ch)
}

pub(crate) fn is_identifier_continue(ch: char) -> bool {
    ch == '$' || ch == '\u{200C}' || ch == '\u{200D}' || unicode_ident::is_xid_continue(ch)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NumberPhase {
    AfterSign,
    PastZero,
    PastHexMarker,
    PastFirstHexDigit,
    PastLeadingDot,
    PastFirstDigitOfWhole,
    PastDecimalPoint,
    PastFirstDigitOfFractional,
    PastE,
    PastExpSign,
    PastFirstDigitOfExponent,
}

impl NumberPhase {
    fn may_end(&self) -> bool {
        matches!(
            self,
            NumberPhase::PastZero
                | NumberPhase::PastFirstHexDigit
                | NumberPhase::PastFirstDigitOfWhole
                | NumberPhase::PastDecimalPoint
                | NumberPhase::PastFirstDigitOfFractional
                | NumberPhase::PastFirstDigitOfExponent
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharHandling {
    InvalidatesToken,
    ValidAndConsumed,
    StartOfNewToken,
}
