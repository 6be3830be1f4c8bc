//! Regex-driven token source for expression source text.
//!
//! A [`Tokenizer`] is configured with an ordered vocabulary of kind tags and
//! compiles it into one anchored alternation. Alternation in `regex` is
//! leftmost-first, so earlier kinds win over later ones that match at the
//! same position (`**` before `*`, `true` before `identifier`).

use std::collections::{BTreeMap, HashSet};

use regex::Regex;

use crate::error::ExprError;
use crate::token::Token;

/// Whitespace skipped between tokens. ASCII only, like the word boundaries
/// in [`TOKEN_PATTERNS`].
pub const WHITESPACE: &str = r"[\t\n\f\r ]+";

/// Token kinds of the expression language, in match-priority order.
pub const TOKEN_KINDS: &[&str] = &[
    "**", "+", "-", "*", "/", "[", "]", ".", "(", ")", "{", "}", ":", ",", ">=", "<=", "<", ">",
    "==", "!=", "!", "&&", "||", "true", "false", "in", "null", "number", "identifier", "string",
];

/// Lexical patterns for kinds that are not matched by their own text.
pub const TOKEN_PATTERNS: &[(&str, &str)] = &[
    ("number", r"[0-9]+(?:\.[0-9]+)?"),
    ("identifier", r"[a-zA-Z_][a-zA-Z_0-9]*"),
    ("string", r#"'[^']*'|"[^"]*""#),
    ("true", r"true(?-u:\b)"),
    ("false", r"false(?-u:\b)"),
    ("in", r"in(?-u:\b)"),
    ("null", r"null(?-u:\b)"),
];

const SNIPPET_CHARS: usize = 16;

#[derive(Debug, Clone)]
/// Configured token source.
///
/// Stateless between calls: every [`Tokenizer::next`] call scans from the
/// offset it is given, which makes look-ahead a plain second call.
pub struct Tokenizer {
    kinds: Vec<String>,
    groups: Vec<String>,
    ignore: Regex,
    pattern: Regex,
}

impl Tokenizer {
    /// Builds a tokenizer from an ignore pattern, an ordered kind vocabulary,
    /// and patterns for the kinds that are not literal punctuation.
    ///
    /// Kinds without an entry in `patterns` match their own text.
    pub fn new(ignore: &str, kinds: &[&str], patterns: &[(&str, &str)]) -> Result<Self, ExprError> {
        if kinds.is_empty() {
            return Err(ExprError::Config(
                "token vocabulary must not be empty".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for kind in kinds {
            if !seen.insert(*kind) {
                return Err(ExprError::Config(format!("duplicate token kind '{kind}'")));
            }
        }

        let mut table = BTreeMap::new();
        for (kind, pattern) in patterns {
            if !seen.contains(kind) {
                return Err(ExprError::Config(format!(
                    "pattern given for unknown token kind '{kind}'"
                )));
            }
            table.insert(*kind, *pattern);
        }

        let groups: Vec<String> = (0..kinds.len()).map(|idx| format!("k{idx}")).collect();
        let alternatives: Vec<String> = kinds
            .iter()
            .zip(&groups)
            .map(|(kind, group)| {
                let pattern = match table.get(kind) {
                    Some(p) => (*p).to_string(),
                    None => regex::escape(kind),
                };
                format!("(?P<{group}>{pattern})")
            })
            .collect();

        let ignore_re = Regex::new(&format!("^(?:{ignore})*"))?;
        let pattern_re = Regex::new(&format!(
            "^(?:{ignore})*(?:{})",
            alternatives.join("|")
        ))?;

        Ok(Self {
            kinds: kinds.iter().map(|k| (*k).to_string()).collect(),
            groups,
            ignore: ignore_re,
            pattern: pattern_re,
        })
    }

    /// Configured kind tags in priority order.
    pub fn kinds(&self) -> &[String] {
        &self.kinds
    }

    /// Returns the next token at or after `offset`.
    ///
    /// `Ok(None)` means only ignorable text remains.
    pub fn next(&self, source: &str, offset: usize) -> Result<Option<Token>, ExprError> {
        let rest = source.get(offset..).ok_or(ExprError::InvalidOffset {
            offset,
            len: source.len(),
        })?;

        let skipped = self.ignore.find(rest).map_or(0, |m| m.end());
        if skipped == rest.len() {
            return Ok(None);
        }

        let Some(caps) = self.pattern.captures(rest) else {
            return Err(unexpected_input(rest, offset, skipped));
        };

        for (kind, group) in self.kinds.iter().zip(&self.groups) {
            if let Some(m) = caps.name(group) {
                // empty matches would never advance the scan
                if m.is_empty() {
                    return Err(unexpected_input(rest, offset, skipped));
                }
                return Ok(Some(Token::new(
                    kind.clone(),
                    m.as_str(),
                    offset + m.start(),
                    offset + m.end(),
                )));
            }
        }

        Err(unexpected_input(rest, offset, skipped))
    }

    /// Scans all of `source` into tokens.
    pub fn tokenize(&self, source: &str) -> Result<Vec<Token>, ExprError> {
        let mut tokens = Vec::new();
        let mut offset = 0;
        while let Some(token) = self.next(source, offset)? {
            offset = token.end;
            tokens.push(token);
        }
        Ok(tokens)
    }
}

/// Creates the tokenizer for the expression language vocabulary.
pub fn create_tokenizer() -> Tokenizer {
    Tokenizer::new(WHITESPACE, TOKEN_KINDS, TOKEN_PATTERNS).expect("valid token table")
}

fn unexpected_input(rest: &str, offset: usize, skipped: usize) -> ExprError {
    ExprError::UnexpectedInput {
        offset: offset + skipped,
        snippet: rest[skipped..].chars().take(SNIPPET_CHARS).collect(),
    }
}
