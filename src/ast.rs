//! Expression syntax tree produced by the parser.
//!
//! Every node keeps the token it was built from. A slot the permissive
//! grammar could not fill is `None`; see [`Node::is_complete`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Number as JsonNumber, Value as JsonValue};

use crate::error::ExprError;
use crate::token::{unquote, Token};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
/// Expression AST node.
pub enum Node {
    /// Number, string, boolean, or null literal.
    Literal { token: Token },
    /// Prefix `-`, `+`, or `!`.
    UnaryOp {
        /// Operator token.
        token: Token,
        /// Operand expression.
        expr: Option<Box<Node>>,
    },
    /// Binary operator, `in`, or member access `.`.
    BinOp {
        /// Operator token.
        token: Token,
        /// Left operand.
        left: Option<Box<Node>>,
        /// Right operand.
        right: Option<Box<Node>>,
    },
    /// `[a, b, ...]`
    List {
        /// Opening `[` token.
        token: Token,
        /// Elements in source order.
        items: Vec<Option<Node>>,
    },
    /// `{key: value, ...}`
    Object {
        /// Opening `{` token.
        token: Token,
        /// Values keyed by unquoted key text.
        entries: BTreeMap<String, Option<Node>>,
    },
    /// Identifier reference or `name(args)` call.
    Builtin {
        /// Identifier token.
        token: Token,
        /// Call arguments; empty for a bare reference.
        args: Vec<Option<Node>>,
        /// Whether the identifier was followed by `(`.
        is_call: bool,
    },
    /// `name[index]` or `name[left:right]`.
    ArrayAccess {
        /// Identifier token of the indexed value.
        token: Token,
        /// Whether a `:` was present.
        is_interval: bool,
        /// Index, or lower slice bound.
        left: Option<Box<Node>>,
        /// Upper slice bound.
        right: Option<Box<Node>>,
    },
}

impl Node {
    /// Literal leaf from a primitive token.
    pub fn literal(token: Token) -> Self {
        Node::Literal { token }
    }

    /// Prefix operator applied to an optional operand.
    pub fn unary(token: Token, expr: Option<Node>) -> Self {
        Node::UnaryOp {
            token,
            expr: expr.map(Box::new),
        }
    }

    /// Binary operator or member access; either operand may be absent.
    pub fn binary(token: Token, left: Option<Node>, right: Option<Node>) -> Self {
        Node::BinOp {
            token,
            left: left.map(Box::new),
            right: right.map(Box::new),
        }
    }

    /// List built from its `[` token.
    pub fn list(token: Token, items: Vec<Option<Node>>) -> Self {
        Node::List { token, items }
    }

    /// Object built from its `{` token.
    pub fn object(token: Token, entries: BTreeMap<String, Option<Node>>) -> Self {
        Node::Object { token, entries }
    }

    /// Bare identifier reference.
    pub fn reference(token: Token) -> Self {
        Node::Builtin {
            token,
            args: Vec::new(),
            is_call: false,
        }
    }

    /// `name(args)` call. An empty `args` is a zero-argument call.
    pub fn call(token: Token, args: Vec<Option<Node>>) -> Self {
        Node::Builtin {
            token,
            args,
            is_call: true,
        }
    }

    /// Index (`is_interval == false`) or slice on the named identifier.
    pub fn array_access(
        token: Token,
        is_interval: bool,
        left: Option<Node>,
        right: Option<Node>,
    ) -> Self {
        Node::ArrayAccess {
            token,
            is_interval,
            left: left.map(Box::new),
            right: right.map(Box::new),
        }
    }

    /// Token this node was built from.
    pub fn token(&self) -> &Token {
        match self {
            Node::Literal { token }
            | Node::UnaryOp { token, .. }
            | Node::BinOp { token, .. }
            | Node::List { token, .. }
            | Node::Object { token, .. }
            | Node::Builtin { token, .. }
            | Node::ArrayAccess { token, .. } => token,
        }
    }

    /// Variant name, as used in the serialized `type` tag.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Literal { .. } => "literal",
            Node::UnaryOp { .. } => "unary_op",
            Node::BinOp { .. } => "bin_op",
            Node::List { .. } => "list",
            Node::Object { .. } => "object",
            Node::Builtin { .. } => "builtin",
            Node::ArrayAccess { .. } => "array_access",
        }
    }

    /// Smallest `(start, end)` byte range covering every token in the subtree.
    pub fn span(&self) -> (usize, usize) {
        let mut span = self.token().span();
        self.for_each_child(|child| {
            let (start, end) = child.span();
            span.0 = span.0.min(start);
            span.1 = span.1.max(end);
        });
        span
    }

    /// Returns `true` when no slot in the subtree was left empty.
    ///
    /// Open slice bounds of an interval access do not count as empty.
    pub fn is_complete(&self) -> bool {
        let own = match self {
            Node::Literal { .. } => true,
            Node::UnaryOp { expr, .. } => expr.is_some(),
            Node::BinOp { left, right, .. } => left.is_some() && right.is_some(),
            Node::List { items, .. } => items.iter().all(Option::is_some),
            Node::Object { entries, .. } => entries.values().all(Option::is_some),
            Node::Builtin { args, .. } => args.iter().all(Option::is_some),
            Node::ArrayAccess {
                is_interval, left, ..
            } => *is_interval || left.is_some(),
        };

        let mut children = true;
        self.for_each_child(|child| children &= child.is_complete());
        own && children
    }

    /// Structural equality that ignores token offsets.
    pub fn eq_ignoring_spans(&self, other: &Node) -> bool {
        if !self.token().same_lexeme(other.token()) {
            return false;
        }

        match (self, other) {
            (Node::Literal { .. }, Node::Literal { .. }) => true,
            (Node::UnaryOp { expr: a, .. }, Node::UnaryOp { expr: b, .. }) => boxed_eq(a, b),
            (
                Node::BinOp {
                    left: la,
                    right: ra,
                    ..
                },
                Node::BinOp {
                    left: lb,
                    right: rb,
                    ..
                },
            ) => boxed_eq(la, lb) && boxed_eq(ra, rb),
            (Node::List { items: a, .. }, Node::List { items: b, .. }) => seq_eq(a, b),
            (Node::Object { entries: a, .. }, Node::Object { entries: b, .. }) => {
                a.len() == b.len()
                    && a.iter().zip(b).all(|((ka, va), (kb, vb))| {
                        ka == kb && slot_eq(va.as_ref(), vb.as_ref())
                    })
            }
            (
                Node::Builtin {
                    args: a,
                    is_call: ca,
                    ..
                },
                Node::Builtin {
                    args: b,
                    is_call: cb,
                    ..
                },
            ) => ca == cb && seq_eq(a, b),
            (
                Node::ArrayAccess {
                    is_interval: ia,
                    left: la,
                    right: ra,
                    ..
                },
                Node::ArrayAccess {
                    is_interval: ib,
                    left: lb,
                    right: rb,
                    ..
                },
            ) => ia == ib && boxed_eq(la, lb) && boxed_eq(ra, rb),
            _ => false,
        }
    }

    /// JSON value of a literal node; `None` for every other node.
    pub fn literal_value(&self) -> Option<JsonValue> {
        let Node::Literal { token } = self else {
            return None;
        };

        match token.kind.as_str() {
            "number" => number(&token.value),
            "string" => Some(JsonValue::String(unquote(&token.value).to_string())),
            "true" => Some(JsonValue::Bool(true)),
            "false" => Some(JsonValue::Bool(false)),
            "null" => Some(JsonValue::Null),
            _ => None,
        }
    }

    /// Identifier name of a builtin node.
    pub fn builtin_name(&self) -> Option<&str> {
        match self {
            Node::Builtin { token, .. } => Some(&token.value),
            _ => None,
        }
    }

    /// Serializes the tree to JSON text.
    ///
    /// When `pretty` is `true`, output is formatted with indentation.
    pub fn to_json_string(&self, pretty: bool) -> Result<String, ExprError> {
        if pretty {
            serde_json::to_string_pretty(self).map_err(|e| ExprError::Serialization(e.to_string()))
        } else {
            serde_json::to_string(self).map_err(|e| ExprError::Serialization(e.to_string()))
        }
    }

    fn for_each_child<F: FnMut(&Node)>(&self, mut f: F) {
        match self {
            Node::Literal { .. } => {}
            Node::UnaryOp { expr, .. } => expr.iter().for_each(|n| f(&**n)),
            Node::BinOp { left, right, .. } | Node::ArrayAccess { left, right, .. } => {
                left.iter().chain(right.iter()).for_each(|n| f(&**n))
            }
            Node::List { items, .. } | Node::Builtin { args: items, .. } => {
                items.iter().flatten().for_each(f)
            }
            Node::Object { entries, .. } => entries.values().flatten().for_each(f),
        }
    }
}

fn slot_eq(a: Option<&Node>, b: Option<&Node>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.eq_ignoring_spans(b),
        (None, None) => true,
        _ => false,
    }
}

fn boxed_eq(a: &Option<Box<Node>>, b: &Option<Box<Node>>) -> bool {
    slot_eq(a.as_deref(), b.as_deref())
}

fn seq_eq(a: &[Option<Node>], b: &[Option<Node>]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| slot_eq(x.as_ref(), y.as_ref()))
}

fn number(raw: &str) -> Option<JsonValue> {
    if let Ok(int) = raw.parse::<i64>() {
        return Some(JsonValue::Number(JsonNumber::from(int)));
    }
    let float: f64 = raw.parse().ok()?;
    JsonNumber::from_f64(float).map(JsonValue::Number)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::Node;
    use crate::token::Token;

    fn lit(kind: &str, value: &str, start: usize) -> Node {
        Node::literal(Token::new(kind, value, start, start + value.len()))
    }

    #[test]
    fn literal_values_convert_to_json() {
        assert_eq!(lit("number", "42", 0).literal_value(), Some(json!(42)));
        assert_eq!(lit("number", "2.5", 0).literal_value(), Some(json!(2.5)));
        assert_eq!(lit("string", "'hi'", 0).literal_value(), Some(json!("hi")));
        assert_eq!(lit("true", "true", 0).literal_value(), Some(json!(true)));
        assert_eq!(lit("null", "null", 0).literal_value(), Some(json!(null)));
        let reference = Node::reference(Token::new("identifier", "x", 0, 1));
        assert_eq!(reference.literal_value(), None);
    }

    #[test]
    fn span_covers_children() {
        let node = Node::binary(
            Token::new("+", "+", 2, 3),
            Some(lit("number", "1", 0)),
            Some(lit("number", "22", 4)),
        );
        assert_eq!(node.span(), (0, 6));
    }

    #[test]
    fn completeness_tracks_empty_slots() {
        let plus = Token::new("+", "+", 2, 3);
        let full = Node::binary(plus.clone(), Some(lit("number", "1", 0)), Some(lit("number", "2", 4)));
        let partial = Node::binary(plus, Some(lit("number", "1", 0)), None);
        assert!(full.is_complete());
        assert!(!partial.is_complete());

        let open_slice =
            Node::array_access(Token::new("identifier", "x", 0, 1), true, None, None);
        assert!(open_slice.is_complete());
    }

    #[test]
    fn serializes_with_type_tag() {
        let node = lit("number", "1", 0);
        let json: serde_json::Value = serde_json::from_str(&node.to_json_string(false).unwrap()).unwrap();
        assert_eq!(json["type"], json!("literal"));
        assert_eq!(json["token"]["value"], json!("1"));
    }
}
