//! Renders an expression tree back to source text.
//!
//! Binary operations are fully parenthesized so the output reparses to the
//! same tree regardless of precedence. Empty slots render as nothing.

use std::fmt;

use crate::ast::Node;

/// Renders `node` as expression source that parses back to the same tree.
pub fn to_source(node: &Node) -> String {
    let mut out = String::new();
    write_node(node, &mut out);
    out
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&to_source(self))
    }
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Literal { token } => out.push_str(&token.value),
        Node::UnaryOp { token, expr } => {
            out.push_str(&token.value);
            write_slot(expr.as_deref(), out);
        }
        Node::BinOp { token, left, right } if token.is(".") => {
            write_slot(left.as_deref(), out);
            out.push('.');
            write_slot(right.as_deref(), out);
        }
        Node::BinOp { token, left, right } => {
            out.push('(');
            write_slot(left.as_deref(), out);
            out.push(' ');
            out.push_str(&token.value);
            out.push(' ');
            write_slot(right.as_deref(), out);
            out.push(')');
        }
        Node::List { items, .. } => {
            out.push('[');
            write_sequence(items, out);
            out.push(']');
        }
        Node::Object { entries, .. } => {
            out.push('{');
            for (idx, (key, value)) in entries.iter().enumerate() {
                if idx > 0 {
                    out.push_str(", ");
                }
                out.push_str(&render_key(key));
                out.push_str(": ");
                write_slot(value.as_ref(), out);
            }
            out.push('}');
        }
        Node::Builtin {
            token,
            args,
            is_call,
        } => {
            out.push_str(&token.value);
            if *is_call {
                out.push('(');
                write_sequence(args, out);
                out.push(')');
            }
        }
        Node::ArrayAccess {
            token,
            is_interval,
            left,
            right,
        } => {
            out.push_str(&token.value);
            out.push('[');
            write_slot(left.as_deref(), out);
            if *is_interval {
                out.push(':');
                write_slot(right.as_deref(), out);
            }
            out.push(']');
        }
    }
}

fn write_slot(node: Option<&Node>, out: &mut String) {
    if let Some(node) = node {
        write_node(node, out);
    }
}

fn write_sequence(items: &[Option<Node>], out: &mut String) {
    for (idx, item) in items.iter().enumerate() {
        if idx > 0 {
            out.push_str(", ");
        }
        write_slot(item.as_ref(), out);
    }
}

// string tokens have no escapes, so pick the quote the key does not contain
fn render_key(key: &str) -> String {
    if key.contains('"') {
        format!("'{key}'")
    } else {
        format!("\"{key}\"")
    }
}
