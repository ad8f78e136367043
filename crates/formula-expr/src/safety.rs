//! The single "is this node allowed" predicate.
//!
//! The evaluator runs [`check_node`] on every node before dispatching on it and the validator
//! runs it over every node of a parsed formula. A tree produced by the parser always passes;
//! the check exists for trees assembled by hand (or deserialized from elsewhere) so that both
//! paths reject exactly the same things.

use std::fmt;

use crate::ast::{Expr, Literal};
use crate::ops::OperatorTable;

/// Characters a formula may contain, anywhere (including inside string literals).
pub fn is_allowed_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || c == '_'
        || c.is_whitespace()
        || matches!(
            c,
            '.' | '<' | '>' | '=' | '!' | '&' | '|' | '(' | ')' | '+' | '-' | '*' | '/' | '%'
                | '?' | ':' | '"' | '\''
        )
}

pub(crate) fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

pub(crate) fn is_ident_part(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Words the lexer turns into literals; they can never name a field.
pub const RESERVED_WORDS: &[&str] = &["true", "false"];

/// Whether `name` is something the lexer would produce as an identifier token.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    is_ident_start(first) && chars.all(is_ident_part) && !RESERVED_WORDS.contains(&name)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disallowed {
    pub node: &'static str,
    pub reason: String,
}

impl fmt::Display for Disallowed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} node {}", self.node, self.reason)
    }
}

impl std::error::Error for Disallowed {}

/// Check a single node (not its children) against the safe subset of the grammar.
pub fn check_node(expr: &Expr) -> Result<(), Disallowed> {
    check_node_with(expr, OperatorTable::standard())
}

pub fn check_node_with(expr: &Expr, table: &OperatorTable) -> Result<(), Disallowed> {
    let reject = |reason: String| {
        Err(Disallowed {
            node: expr.kind_name(),
            reason,
        })
    };

    match expr {
        Expr::Literal(Literal::Number(n)) if !n.is_finite() => {
            reject(format!("has non-finite number {n}"))
        }
        Expr::Literal(Literal::Text(s)) => match s.chars().find(|c| !is_allowed_char(*c)) {
            Some(c) => reject(format!("contains disallowed character {c:?}")),
            None if s.contains('"') && s.contains('\'') => {
                reject("mixes both quote characters".to_string())
            }
            None => Ok(()),
        },
        Expr::Literal(_) => Ok(()),
        Expr::Identifier(name) if !is_identifier(name) => {
            reject(format!("{name:?} is not a valid identifier"))
        }
        Expr::Identifier(_) => Ok(()),
        Expr::Unary { op, .. } if !table.contains_unary(*op) => {
            reject(format!("uses unsupported operator '{}'", op.symbol()))
        }
        Expr::Binary { op, .. } if !table.contains_binary(*op) => {
            reject(format!("uses unsupported operator '{}'", op.symbol()))
        }
        Expr::Logical { op, .. } if !table.contains_logical(*op) => {
            reject(format!("uses unsupported operator '{}'", op.symbol()))
        }
        Expr::Unary { .. }
        | Expr::Binary { .. }
        | Expr::Logical { .. }
        | Expr::Conditional { .. } => Ok(()),
    }
}
