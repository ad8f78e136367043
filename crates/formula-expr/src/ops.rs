//! The operator table.
//!
//! This table is the whole operator vocabulary of the formula language: the lexer only
//! recognises symbols listed here and the parser only builds nodes for entries found here.
//! There is no member, call or index operator, so `a.b`, `f(x)` and `a[0]` cannot reach the
//! AST.
//!
//! The table is a `static` built at compile time and handed to every parser by reference;
//! nothing can mutate it at runtime.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    Negate,
    Plus,
    Not,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    StrictEquals,
    StrictNotEquals,
    Equals,
    NotEquals,
    Greater,
    Less,
    GreaterEquals,
    LessEquals,
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalOp {
    And,
    Or,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InfixOp {
    Binary(BinaryOp),
    Logical(LogicalOp),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InfixEntry {
    pub symbol: &'static str,
    pub op: InfixOp,
    /// Higher binds tighter. All infix operators are left-associative.
    pub precedence: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrefixEntry {
    pub symbol: &'static str,
    pub op: UnaryOp,
    pub precedence: u8,
}

/// Binding power of prefix operators; tighter than every infix operator.
pub const UNARY_PRECEDENCE: u8 = 7;

#[derive(Debug)]
pub struct OperatorTable {
    infix: &'static [InfixEntry],
    prefix: &'static [PrefixEntry],
}

const fn infix(symbol: &'static str, op: InfixOp, precedence: u8) -> InfixEntry {
    InfixEntry {
        symbol,
        op,
        precedence,
    }
}

const fn prefix(symbol: &'static str, op: UnaryOp) -> PrefixEntry {
    PrefixEntry {
        symbol,
        op,
        precedence: UNARY_PRECEDENCE,
    }
}

// Precedence follows the usual C-family ordering:
//   unary  >  * / %  >  + -  >  relational  >  equality  >  &&  >  ||
// The conditional `? :` is not an operator entry; the parser handles it as its own production
// below `||`.
static STANDARD: OperatorTable = OperatorTable {
    infix: &[
        infix("||", InfixOp::Logical(LogicalOp::Or), 1),
        infix("&&", InfixOp::Logical(LogicalOp::And), 2),
        infix("===", InfixOp::Binary(BinaryOp::StrictEquals), 3),
        infix("!==", InfixOp::Binary(BinaryOp::StrictNotEquals), 3),
        infix("==", InfixOp::Binary(BinaryOp::Equals), 3),
        infix("!=", InfixOp::Binary(BinaryOp::NotEquals), 3),
        infix(">", InfixOp::Binary(BinaryOp::Greater), 4),
        infix("<", InfixOp::Binary(BinaryOp::Less), 4),
        infix(">=", InfixOp::Binary(BinaryOp::GreaterEquals), 4),
        infix("<=", InfixOp::Binary(BinaryOp::LessEquals), 4),
        infix("+", InfixOp::Binary(BinaryOp::Add), 5),
        infix("-", InfixOp::Binary(BinaryOp::Subtract), 5),
        infix("*", InfixOp::Binary(BinaryOp::Multiply), 6),
        infix("/", InfixOp::Binary(BinaryOp::Divide), 6),
        infix("%", InfixOp::Binary(BinaryOp::Remainder), 6),
    ],
    prefix: &[
        prefix("-", UnaryOp::Negate),
        prefix("+", UnaryOp::Plus),
        prefix("!", UnaryOp::Not),
    ],
};

impl OperatorTable {
    /// The one operator table used by the formula grammar.
    #[must_use]
    pub fn standard() -> &'static OperatorTable {
        &STANDARD
    }

    pub fn infix_entries(&self) -> &[InfixEntry] {
        self.infix
    }

    pub fn prefix_entries(&self) -> &[PrefixEntry] {
        self.prefix
    }

    pub fn infix(&self, symbol: &str) -> Option<&InfixEntry> {
        self.infix.iter().find(|e| e.symbol == symbol)
    }

    pub fn prefix(&self, symbol: &str) -> Option<&PrefixEntry> {
        self.prefix.iter().find(|e| e.symbol == symbol)
    }

    pub fn contains_unary(&self, op: UnaryOp) -> bool {
        self.prefix.iter().any(|e| e.op == op)
    }

    pub fn contains_binary(&self, op: BinaryOp) -> bool {
        self.infix.iter().any(|e| e.op == InfixOp::Binary(op))
    }

    pub fn contains_logical(&self, op: LogicalOp) -> bool {
        self.infix.iter().any(|e| e.op == InfixOp::Logical(op))
    }

    /// Longest operator symbol (prefix or infix) that `rest` starts with.
    ///
    /// `!==` must win over `!=` and `!`, `<=` over `<`, and so on.
    pub fn longest_symbol_at(&self, rest: &str) -> Option<&'static str> {
        self.infix
            .iter()
            .map(|e| e.symbol)
            .chain(self.prefix.iter().map(|e| e.symbol))
            .filter(|sym| rest.starts_with(sym))
            .max_by_key(|sym| sym.len())
    }
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Negate => "-",
            UnaryOp::Plus => "+",
            UnaryOp::Not => "!",
        }
    }
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::StrictEquals => "===",
            BinaryOp::StrictNotEquals => "!==",
            BinaryOp::Equals => "==",
            BinaryOp::NotEquals => "!=",
            BinaryOp::Greater => ">",
            BinaryOp::Less => "<",
            BinaryOp::GreaterEquals => ">=",
            BinaryOp::LessEquals => "<=",
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Remainder => "%",
        }
    }
}

impl LogicalOp {
    pub fn symbol(self) -> &'static str {
        match self {
            LogicalOp::And => "&&",
            LogicalOp::Or => "||",
        }
    }
}
