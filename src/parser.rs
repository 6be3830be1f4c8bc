//! Recursive-descent parser for expression source text.
//!
//! Precedence, loosest to tightest:
//!
//! ```text
//! expr           : logicalAnd ('||' logicalAnd)*
//! logicalAnd     : inStatement ('&&' inStatement)*
//! inStatement    : equality ('in' equality)*
//! equality       : comparison (('==' | '!=') comparison)*
//! comparison     : addition (('<' | '>' | '<=' | '>=') addition)*
//! addition       : multiplication (('+' | '-') multiplication)*
//! multiplication : exponentiation (('*' | '/') exponentiation)*
//! exponentiation : factor ('**' factor)*
//! factor         : unaryOp factor | primitive | '(' expr ')' | list | object
//!                | ID (arrayAccess | '.' ID | builtin)
//! ```
//!
//! Every binary level folds to the left, `**` included.

use std::collections::BTreeMap;

use crate::ast::Node;
use crate::error::ExprError;
use crate::token::{unquote, Token};
use crate::tokenizer::Tokenizer;

const UNARY_OPS: &[&str] = &["-", "+", "!"];
const PRIMITIVES: &[&str] = &["number", "null", "string", "true", "false"];

const OR_OPS: &[&str] = &["||"];
const AND_OPS: &[&str] = &["&&"];
const IN_OPS: &[&str] = &["in"];
const EQUALITY_OPS: &[&str] = &["==", "!="];
const COMPARISON_OPS: &[&str] = &["<", ">", "<=", ">="];
const ADDITION_OPS: &[&str] = &["+", "-"];
const MULTIPLICATION_OPS: &[&str] = &["*", "/"];
const EXPONENT_OPS: &[&str] = &["**"];

/// Default bound on `factor` nesting.
pub const DEFAULT_MAX_DEPTH: usize = 64;

type ParseResult = Result<Option<Node>, ExprError>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// What the parser does when a required token is missing.
pub enum ConsumePolicy {
    /// Leave the current token in place and keep going.
    #[default]
    Permissive,
    /// Fail with [`ExprError::UnexpectedToken`] or [`ExprError::UnexpectedEnd`].
    Strict,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Parser configuration.
pub struct ParseOptions {
    /// Mismatch handling.
    pub policy: ConsumePolicy,
    /// Fail with [`ExprError::TrailingToken`] if input remains after the expression.
    pub require_end: bool,
    /// Maximum `factor` nesting depth.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            policy: ConsumePolicy::Permissive,
            require_end: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParseOptions {
    /// Strict policy plus full-input consumption.
    pub fn strict() -> Self {
        Self {
            policy: ConsumePolicy::Strict,
            require_end: true,
            ..Self::default()
        }
    }
}

/// Single-token look-ahead parser over one source string.
pub struct Parser<'a> {
    source: &'a str,
    tokenizer: &'a Tokenizer,
    current: Option<Token>,
    options: ParseOptions,
    depth: usize,
    warnings: Vec<String>,
    pending: Option<ExprError>,
    stalled: Option<(usize, String)>,
}

impl<'a> Parser<'a> {
    /// Creates a permissive parser positioned on the first token of `source`.
    pub fn new(source: &'a str, tokenizer: &'a Tokenizer) -> Self {
        Self::with_options(source, tokenizer, ParseOptions::default())
    }

    /// Creates a parser with explicit options.
    ///
    /// A lexing failure on the first token is held back until [`Parser::parse`]
    /// under the strict policy.
    pub fn with_options(source: &'a str, tokenizer: &'a Tokenizer, options: ParseOptions) -> Self {
        let mut parser = Self {
            source,
            tokenizer,
            current: None,
            options,
            depth: 0,
            warnings: Vec::new(),
            pending: None,
            stalled: None,
        };

        match parser.fetch(0) {
            Ok(token) => parser.current = token,
            Err(err) => parser.pending = Some(err),
        }
        parser
    }

    /// Parses one expression starting at the current token.
    ///
    /// Trailing input is left in place unless `require_end` is set; check
    /// [`Parser::at_end`] afterwards for full consumption.
    pub fn parse(&mut self) -> ParseResult {
        if let Some(err) = self.pending.take() {
            return Err(err);
        }

        let root = self.parse_expr()?;

        if self.options.require_end {
            if let Some((offset, snippet)) = &self.stalled {
                return Err(ExprError::UnexpectedInput {
                    offset: *offset,
                    snippet: snippet.clone(),
                });
            }
            if let Some(token) = &self.current {
                return Err(ExprError::TrailingToken {
                    value: token.value.clone(),
                    start: token.start,
                });
            }
        }

        Ok(root)
    }

    /// Next unconsumed token.
    pub fn current(&self) -> Option<&Token> {
        self.current.as_ref()
    }

    /// Token after the current one, without consuming anything.
    pub fn peek(&self) -> Option<Token> {
        let current = self.current.as_ref()?;
        self.tokenizer.next(self.source, current.end).ok().flatten()
    }

    /// Returns `true` when every token was consumed and the rest of the
    /// source is ignorable.
    ///
    /// Text the tokenizer could not read is never treated as the end.
    pub fn at_end(&self) -> bool {
        self.current.is_none() && self.stalled.is_none()
    }

    /// Byte offset of the next unconsumed token, of unreadable input, or the
    /// source length.
    pub fn offset(&self) -> usize {
        match (&self.current, &self.stalled) {
            (Some(token), _) => token.start,
            (None, Some((offset, _))) => *offset,
            (None, None) => self.source.len(),
        }
    }

    /// Mismatches absorbed under [`ConsumePolicy::Permissive`].
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Consumes the parser, returning its warnings.
    pub fn into_warnings(self) -> Vec<String> {
        self.warnings
    }

    fn parse_expr(&mut self) -> ParseResult {
        self.fold_left(OR_OPS, Self::parse_logical_and)
    }

    fn parse_logical_and(&mut self) -> ParseResult {
        self.fold_left(AND_OPS, Self::parse_in)
    }

    fn parse_in(&mut self) -> ParseResult {
        self.fold_left(IN_OPS, Self::parse_equality)
    }

    fn parse_equality(&mut self) -> ParseResult {
        self.fold_left(EQUALITY_OPS, Self::parse_comparison)
    }

    fn parse_comparison(&mut self) -> ParseResult {
        self.fold_left(COMPARISON_OPS, Self::parse_addition)
    }

    fn parse_addition(&mut self) -> ParseResult {
        self.fold_left(ADDITION_OPS, Self::parse_multiplication)
    }

    fn parse_multiplication(&mut self) -> ParseResult {
        self.fold_left(MULTIPLICATION_OPS, Self::parse_exponentiation)
    }

    fn parse_exponentiation(&mut self) -> ParseResult {
        self.fold_left(EXPONENT_OPS, Self::parse_factor)
    }

    fn fold_left(&mut self, ops: &[&str], operand: fn(&mut Self) -> ParseResult) -> ParseResult {
        let mut node = operand(self)?;
        while let Some(op) = self.current.clone().filter(|t| t.is_any(ops)) {
            self.advance()?;
            let right = operand(self)?;
            node = Some(Node::binary(op, node, right));
        }
        Ok(node)
    }

    fn parse_factor(&mut self) -> ParseResult {
        if self.depth >= self.options.max_depth {
            self.absorb(ExprError::DepthExceeded(self.options.max_depth))?;
            return Ok(None);
        }

        self.depth += 1;
        let node = self.parse_primary();
        self.depth -= 1;
        node
    }

    fn parse_primary(&mut self) -> ParseResult {
        let Some(token) = self.current.clone() else {
            self.mismatch("expression")?;
            return Ok(None);
        };

        if token.is_any(UNARY_OPS) {
            self.advance()?;
            let operand = self.parse_factor()?;
            return Ok(Some(Node::unary(token, operand)));
        }

        if token.is_any(PRIMITIVES) {
            self.advance()?;
            return Ok(Some(Node::literal(token)));
        }

        match token.kind.as_str() {
            "(" => {
                self.eat("(")?;
                let node = self.parse_expr()?;
                self.eat(")")?;
                Ok(node)
            }
            "[" => self.parse_list(token).map(Some),
            "{" => self.parse_object(token).map(Some),
            "identifier" => match self.peek() {
                Some(next) if next.is("[") => self.parse_array_access(token).map(Some),
                Some(dot) if dot.is(".") => {
                    self.advance()?;
                    self.parse_member(Node::reference(token), dot).map(Some)
                }
                _ => self.parse_builtin(token).map(Some),
            },
            _ => {
                self.mismatch("expression")?;
                Ok(None)
            }
        }
    }

    /// `builtin : ID ('(' (expr (',' expr)*)? ')')?`
    fn parse_builtin(&mut self, token: Token) -> Result<Node, ExprError> {
        self.eat("identifier")?;
        if !self.current_is("(") {
            return Ok(Node::reference(token));
        }

        self.eat("(")?;
        let args = self.parse_sequence(")")?;
        self.eat(")")?;
        Ok(Node::call(token, args))
    }

    /// `list : '[' (expr (',' expr)*)? ']'`
    fn parse_list(&mut self, token: Token) -> Result<Node, ExprError> {
        self.eat("[")?;
        let items = self.parse_sequence("]")?;
        self.eat("]")?;
        Ok(Node::list(token, items))
    }

    fn parse_sequence(&mut self, close: &str) -> Result<Vec<Option<Node>>, ExprError> {
        let mut items = Vec::new();
        if self.current_is(close) {
            return Ok(items);
        }

        items.push(self.parse_expr()?);
        while self.current_is(",") {
            self.eat(",")?;
            items.push(self.parse_expr()?);
        }
        Ok(items)
    }

    /// `arrayAccess : ID '[' (expr | expr? ':' expr?) ']'`
    fn parse_array_access(&mut self, token: Token) -> Result<Node, ExprError> {
        self.eat("identifier")?;
        self.eat("[")?;

        let mut left = None;
        let mut right = None;
        let mut is_interval = false;

        if !self.current_is(":") {
            left = self.parse_expr()?;
        }
        if self.current_is(":") {
            is_interval = true;
            self.eat(":")?;
            if !self.current_is("]") {
                right = self.parse_expr()?;
            }
        }

        self.eat("]")?;
        Ok(Node::array_access(token, is_interval, left, right))
    }

    /// `object : '{' ((STR | ID) ':' expr (',' (STR | ID) ':' expr)*)? '}' ('.' ID)?`
    fn parse_object(&mut self, token: Token) -> Result<Node, ExprError> {
        self.eat("{")?;

        let mut entries = BTreeMap::new();
        while let Some(key) = self
            .current
            .clone()
            .filter(|t| t.is_any(&["string", "identifier"]))
        {
            self.advance()?;
            self.eat(":")?;
            let value = self.parse_expr()?;
            entries.insert(object_key(&key), value);

            if self.current_is("}") {
                break;
            }
            self.eat(",")?;
        }

        self.eat("}")?;
        let object = Node::object(token, entries);

        match self.current.clone().filter(|t| t.is(".")) {
            Some(dot) => self.parse_member(object, dot),
            None => Ok(object),
        }
    }

    /// `'.' ID` applied to an already-parsed identifier or object.
    fn parse_member(&mut self, target: Node, dot: Token) -> Result<Node, ExprError> {
        self.eat(".")?;

        if !self.current_is("identifier") {
            let err = self.unexpected("identifier after '.'");
            self.absorb(err)?;
        }
        let member = self.advance()?;

        Ok(Node::binary(dot, Some(target), member.map(Node::reference)))
    }

    fn current_is(&self, kind: &str) -> bool {
        self.current.as_ref().is_some_and(|t| t.is(kind))
    }

    /// Consumes the current token if it has kind `kind`.
    ///
    /// On mismatch the current token stays put and the policy decides
    /// whether that is an error.
    fn eat(&mut self, kind: &str) -> Result<(), ExprError> {
        if self.current_is(kind) {
            self.advance()?;
            Ok(())
        } else {
            self.mismatch(&format!("'{kind}'"))
        }
    }

    /// Consumes whatever the current token is.
    fn advance(&mut self) -> Result<Option<Token>, ExprError> {
        let Some(token) = self.current.take() else {
            return Ok(None);
        };
        self.current = self.fetch(token.end)?;
        Ok(Some(token))
    }

    fn fetch(&mut self, offset: usize) -> Result<Option<Token>, ExprError> {
        match self.tokenizer.next(self.source, offset) {
            Ok(token) => Ok(token),
            Err(err) => {
                self.stalled = Some(match &err {
                    ExprError::UnexpectedInput { offset, snippet } => (*offset, snippet.clone()),
                    _ => (offset, String::new()),
                });
                self.absorb(err)?;
                Ok(None)
            }
        }
    }

    fn mismatch(&mut self, expected: &str) -> Result<(), ExprError> {
        let err = self.unexpected(expected);
        self.absorb(err)
    }

    fn unexpected(&self, expected: &str) -> ExprError {
        match &self.current {
            Some(token) => ExprError::UnexpectedToken {
                expected: expected.to_string(),
                found: token.value.clone(),
                start: token.start,
            },
            None => ExprError::UnexpectedEnd {
                expected: expected.to_string(),
            },
        }
    }

    fn absorb(&mut self, err: ExprError) -> Result<(), ExprError> {
        match self.options.policy {
            ConsumePolicy::Permissive => {
                self.warnings.push(err.to_string());
                Ok(())
            }
            ConsumePolicy::Strict => Err(err),
        }
    }
}

fn object_key(token: &Token) -> String {
    if token.is("string") {
        unquote(&token.value).to_string()
    } else {
        token.value.clone()
    }
}
