use std::fmt::{self, Display};

use crate::model::InputPosition;

/// The error type for every fallible operation in this crate.
///
/// Lexical and parse errors carry the source position they were raised at;
/// API-usage errors (bad index, unknown property, type mismatch) usually
/// carry the position of the node they were raised against, when known.
#[derive(Debug, Clone)]
pub struct LosslessJsonError {
    pub message: String,
    pub input_position: Option<InputPosition>,
}

impl LosslessJsonError {
    pub fn new(message: impl Into<String>, pos: Option<InputPosition>) -> Self {
        let message = message.into();
        let message = match pos {
            Some(p) if p.is_known() => format!("{} at {}", message, p),
            _ => message,
        };
        Self { message, input_position: pos }
    }

    pub fn simple(message: impl Into<String>) -> Self {
        Self::new(message, None)
    }
}

impl Display for LosslessJsonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for LosslessJsonError {}
