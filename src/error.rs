//! Error definitions for tokenizer configuration and expression parsing.

use thiserror::Error;

#[derive(Debug, Error)]
/// Top-level error type returned by public APIs.
pub enum ExprError {
    /// Invalid tokenizer vocabulary or pattern table.
    #[error("tokenizer config error: {0}")]
    Config(String),
    /// A configured lexical pattern failed to compile.
    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),
    /// Scan offset is past the end of the source or splits a character.
    #[error("invalid offset {offset} into source of length {len}")]
    InvalidOffset { offset: usize, len: usize },
    /// Non-whitespace text that no token kind matches.
    #[error("unexpected input at {offset}: '{snippet}'")]
    UnexpectedInput { offset: usize, snippet: String },
    /// A grammar rule required a token kind that is not present.
    #[error("expected {expected} at {start}, found '{found}'")]
    UnexpectedToken {
        expected: String,
        found: String,
        start: usize,
    },
    /// Input ended where a grammar rule required more.
    #[error("unexpected end of expression; expected {expected}")]
    UnexpectedEnd { expected: String },
    /// Input left over after a complete expression.
    #[error("unexpected token after expression: '{value}' at {start}")]
    TrailingToken { value: String, start: usize },
    /// Nesting deeper than `ParseOptions::max_depth`.
    #[error("expression nesting exceeds max depth ({0})")]
    DepthExceeded(usize),
    /// AST serialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),
}
