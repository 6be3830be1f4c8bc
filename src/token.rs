//! Lexical token produced by the tokenizer.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Smallest lexical unit: kind tag, raw source text, and byte span.
pub struct Token {
    /// Kind tag from the tokenizer vocabulary (for example `number` or `**`).
    pub kind: String,
    /// Raw matched substring, quotes included for strings.
    pub value: String,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

impl Token {
    /// Creates a token spanning `start..end` in the source.
    pub fn new(
        kind: impl Into<String>,
        value: impl Into<String>,
        start: usize,
        end: usize,
    ) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
            start,
            end,
        }
    }

    /// Returns `true` when this token has kind `kind`.
    pub fn is(&self, kind: &str) -> bool {
        self.kind == kind
    }

    /// Returns `true` when this token's kind is one of `kinds`.
    pub fn is_any(&self, kinds: &[&str]) -> bool {
        kinds.contains(&self.kind.as_str())
    }

    /// Returns `(start, end)`.
    pub fn span(&self) -> (usize, usize) {
        (self.start, self.end)
    }

    /// Equality on kind and raw text only.
    pub fn same_lexeme(&self, other: &Token) -> bool {
        self.kind == other.kind && self.value == other.value
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// Strips one pair of surrounding quote characters from a string token value.
///
/// Values that are not quoted are returned unchanged.
pub fn unquote(raw: &str) -> &str {
    let quoted = raw.len() >= 2
        && ((raw.starts_with('"') && raw.ends_with('"'))
            || (raw.starts_with('\'') && raw.ends_with('\'')));
    if quoted {
        &raw[1..raw.len() - 1]
    } else {
        raw
    }
}
