//! Parser for the JSON-e expression language.
//!
//! Turns expression text such as `a.b + len(items[1:]) > 2 && x in [1, 2]`
//! into a [`Node`] tree for an evaluator to walk. Parsing follows the legacy
//! permissive policy by default: a missing token is skipped over rather than
//! reported, and trailing input is left for the caller to inspect. Use
//! [`parse_expression_strict`] or [`ParseOptions::strict`] to reject such
//! input instead.

pub mod ast;
pub mod error;
pub mod parser;
pub mod token;
pub mod tokenizer;
pub mod writer;

use std::sync::OnceLock;

pub use ast::Node;
pub use error::ExprError;
pub use parser::{ConsumePolicy, ParseOptions, Parser};
pub use token::Token;
pub use tokenizer::{create_tokenizer, Tokenizer};
pub use writer::to_source;

#[derive(Debug, Clone)]
/// Result of [`parse_expression_with`].
pub struct ParseOutput {
    /// Root node, or `None` when no expression could be read.
    pub root: Option<Node>,
    /// Byte offset where parsing stopped: the next unconsumed token, input the
    /// tokenizer could not read, or the source length.
    pub end: usize,
    /// Mismatches absorbed by the permissive policy, in order.
    pub warnings: Vec<String>,
}

/// Parses `source` with the permissive policy.
pub fn parse_expression(source: &str) -> Option<Node> {
    Parser::new(source, shared_tokenizer()).parse().ok().flatten()
}

/// Parses `source`, failing on any unexpected or leftover token.
pub fn parse_expression_strict(source: &str) -> Result<Node, ExprError> {
    parse_expression_with(source, &ParseOptions::strict())?
        .root
        .ok_or_else(|| ExprError::UnexpectedEnd {
            expected: "expression".to_string(),
        })
}

/// Parses `source` with caller-provided options.
pub fn parse_expression_with(source: &str, options: &ParseOptions) -> Result<ParseOutput, ExprError> {
    let mut parser = Parser::with_options(source, shared_tokenizer(), options.clone());
    let root = parser.parse()?;
    let end = parser.offset();
    Ok(ParseOutput {
        root,
        end,
        warnings: parser.into_warnings(),
    })
}

fn shared_tokenizer() -> &'static Tokenizer {
    static TOKENIZER: OnceLock<Tokenizer> = OnceLock::new();
    TOKENIZER.get_or_init(create_tokenizer)
}
