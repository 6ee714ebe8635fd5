use std::fmt;

/// A position within the JSON input text.
///
/// `index` is a zero-based byte offset from the start of the input; `line`
/// and `column` are one-based, the way editors and error messages count.
///
/// Nodes built from plain values rather than parsed from text carry
/// [`InputPosition::UNKNOWN`] until the document is next serialized.
///
/// # Example
///
/// ```rust
/// use losslessjson::InputPosition;
///
/// // The start of the document.
/// let pos = InputPosition { index: 0, line: 1, column: 1 };
/// assert!(pos.is_known());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputPosition {
    /// Byte offset from the start of the input (zero-based).
    pub index: usize,
    /// Line number (one-based).
    pub line: usize,
    /// Column number within the line (one-based, counted in characters).
    pub column: usize,
}

impl InputPosition {
    /// Sentinel for synthetic nodes that have never been part of a parse.
    pub const UNKNOWN: InputPosition = InputPosition {
        index: usize::MAX,
        line: usize::MAX,
        column: usize::MAX,
    };

    /// The first position of any document.
    pub fn start() -> Self {
        InputPosition { index: 0, line: 1, column: 1 }
    }

    /// Whether this position refers to real input text.
    pub fn is_known(&self) -> bool {
        self.index != usize::MAX
    }
}

impl fmt::Display for InputPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_known() {
            write!(f, "line {}, column {}", self.line, self.column)
        } else {
            f.write_str("unknown position")
        }
    }
}

/// A half-open range of input text: `start` is inclusive, `end` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputSpan {
    pub start: InputPosition,
    pub end: InputPosition,
}

impl InputSpan {
    /// Sentinel span for synthetic nodes.
    pub const UNKNOWN: InputSpan = InputSpan {
        start: InputPosition::UNKNOWN,
        end: InputPosition::UNKNOWN,
    };

    pub fn new(start: InputPosition, end: InputPosition) -> Self {
        InputSpan { start, end }
    }

    pub fn is_known(&self) -> bool {
        self.start.is_known()
    }
}

/// The lexical class of a token.
///
/// Every character of the input belongs to exactly one token, including
/// whitespace, newlines, and comments; the stream ends with a zero-width
/// [`TokenType::End`] sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    BeginObject,
    EndObject,
    BeginArray,
    EndArray,
    Colon,
    Comma,
    String,
    Number,
    Boolean,
    Null,
    Identifier,
    LineComment,
    BlockComment,
    Whitespace,
    Newline,
    End,
}

impl TokenType {
    /// Human-readable name used in "expected X but found Y" errors.
    pub fn name(&self) -> &'static str {
        match self {
            TokenType::BeginObject => "'{'",
            TokenType::EndObject => "'}'",
            TokenType::BeginArray => "'['",
            TokenType::EndArray => "']'",
            TokenType::Colon => "':'",
            TokenType::Comma => "','",
            TokenType::String => "string",
            TokenType::Number => "number",
            TokenType::Boolean => "boolean",
            TokenType::Null => "null",
            TokenType::Identifier => "identifier",
            TokenType::LineComment => "line comment",
            TokenType::BlockComment => "block comment",
            TokenType::Whitespace => "whitespace",
            TokenType::Newline => "newline",
            TokenType::End => "end of input",
        }
    }

    /// Trivia tokens: retained for round-tripping, skipped when the parser
    /// and the reconciler look for the next significant token.
    pub fn is_insignificant(&self) -> bool {
        matches!(
            self,
            TokenType::Whitespace
                | TokenType::Newline
                | TokenType::LineComment
                | TokenType::BlockComment
        )
    }

    pub fn is_comment(&self) -> bool {
        matches!(self, TokenType::LineComment | TokenType::BlockComment)
    }
}

/// One token of input: its class, its verbatim text, and where it came from.
///
/// Concatenating the `text` of every non-sentinel token of a parse, in
/// order, reproduces the input exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonToken {
    pub token_type: TokenType,
    pub text: String,
    pub span: InputSpan,
}

impl JsonToken {
    /// A token with no source location, created during a rebuild.
    pub fn synthetic(token_type: TokenType, text: impl Into<String>) -> Self {
        JsonToken { token_type, text: text.into(), span: InputSpan::UNKNOWN }
    }

    pub fn is_insignificant(&self) -> bool {
        self.token_type.is_insignificant()
    }

    /// Structural/textual equality, ignoring the span. This is the token
    /// half of the node model's `is_equivalent`; full `equals` additionally
    /// compares spans.
    pub fn is_equivalent(&self, other: &JsonToken) -> bool {
        self.token_type == other.token_type && self.text == other.text
    }

    pub fn equals(&self, other: &JsonToken) -> bool {
        self.is_equivalent(other) && self.span == other.span
    }
}
