//! # losslessjson
//!
//! A format-preserving JSON and JSON5 editor built on a lossless concrete
//! syntax tree: parse a document, query and mutate it as plain JSON, and
//! write it back with the human author's formatting, comments, quoting,
//! and trailing commas intact everywhere the edit didn't reach.
//!
//! - Parsing keeps every byte of the input, whitespace and comments
//!   included; an unmutated document serializes back byte-for-byte.
//! - Mutations touch the logical structure only; on the next
//!   serialization, the changed regions are reconciled against the
//!   original token stream and new tokens are synthesized in the style the
//!   surrounding text already uses (indentation, comma/colon spacing,
//!   quote characters, trailing commas).
//! - JSON5 flavoring is understood throughout: single quotes, unquoted
//!   identifier keys, trailing commas, comments, hex numbers, `NaN` and
//!   `Infinity`, leading/trailing decimal points.
//!
//! ## Command-Line Tool
//!
//! This crate includes the `ljson` CLI for editing JSON5 files in place
//! from the terminal:
//!
//! ```sh
//! # Change one key, leaving the rest of the file untouched
//! ljson config.json5 --set server.port=8080 --in-place
//!
//! # Read a value
//! ljson config.json5 --get server.host
//!
//! # Convert to strict JSON
//! ljson config.json5 --to-json
//! ```
//!
//! Run `ljson --help` for all options.
//!
//! ## Quick Start
//!
//! ```rust
//! use losslessjson::parse;
//!
//! let mut doc = parse("{\n  // the port\n  port: 8080,\n}").unwrap();
//! doc.root_mut().as_object_mut().unwrap().set("host", "localhost");
//!
//! assert_eq!(
//!     doc.to_text(),
//!     "{\n  // the port\n  port: 8080,\n  host: \"localhost\",\n}"
//! );
//! ```
//!
//! The comment, the unquoted keys, the two-space indentation, and the
//! trailing comma all carried over to the inserted property.
//!
//! ## Configuration
//!
//! Explicit style overrides can be applied on top of (or instead of) the
//! detected formatting through [`FormatOptions`]:
//!
//! ```rust
//! use losslessjson::{parse, FormatOptions};
//!
//! let mut doc = parse("[1,2,3]").unwrap();
//! let text = doc.to_text_with(&FormatOptions::pretty(2));
//! assert_eq!(text, "[\n  1,\n  2,\n  3\n]");
//! ```
//!
//! ## Serializing Rust Types
//!
//! Any type implementing [`serde::Serialize`] can be turned into a node
//! tree and spliced into a document:
//!
//! ```rust
//! use losslessjson::{parse, node_from_serialize};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Server {
//!     host: String,
//!     port: u16,
//! }
//!
//! let mut doc = parse("{}").unwrap();
//! let server = Server { host: "localhost".into(), port: 8080 };
//! let node = node_from_serialize(&server).unwrap();
//! doc.root_mut().as_object_mut().unwrap().set_node("server", node);
//! ```

mod convert;
mod error;
mod format;
mod manipulator;
mod model;
mod node;
mod options;
mod parser;
mod tokenizer;
mod value;

pub use crate::convert::{json_value_from_serde, json_value_to_serde, node_from_serialize};
pub use crate::error::LosslessJsonError;
pub use crate::model::{InputPosition, InputSpan, JsonToken, TokenType};
pub use crate::node::{
    ArrayNode, Document, IdentifierNode, NodeKind, ObjectNode, Primitive, PrimitiveNode,
    PropertyNode, Structure, ValueNode,
};
pub use crate::options::{CollectionOptions, FormatOptions, IndentCharacter, QuoteStyle};
pub use crate::parser::TokenCursor;
pub use crate::tokenizer::TokenGenerator;
pub use crate::value::JsonValue;

/// Parses JSON or JSON5 text into a lossless document.
pub fn parse(input: &str) -> Result<Document, LosslessJsonError> {
    parser::parse_document(input)
}

/// Parses and additionally checks that the document root is of the
/// expected kind, raising a descriptive error otherwise.
pub fn parse_as(input: &str, kind: NodeKind) -> Result<Document, LosslessJsonError> {
    let doc = parse(input)?;
    let actual = doc.root().kind();
    if actual != kind {
        return Err(LosslessJsonError::new(
            format!(
                "Expected the document root to be {} but found {}",
                kind.name(),
                actual.name()
            ),
            Some(doc.root().span().start),
        ));
    }
    Ok(doc)
}
