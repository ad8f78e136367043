use std::fmt;

use crate::ops::{BinaryOp, LogicalOp, UnaryOp};

#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Number(f64),
    Text(String),
    Boolean(bool),
}

/// A parsed formula.
///
/// This enum is closed: there is no variant for property access, indexing or invocation, so
/// neither the evaluator nor the validator can ever be handed one.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Literal(Literal),
    Identifier(String),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `&&` / `||`. Kept apart from [`Expr::Binary`] because the right side is evaluated lazily.
    Logical {
        op: LogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Conditional {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
    },
}

impl Expr {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expr::Literal(_) => "Literal",
            Expr::Identifier(_) => "Identifier",
            Expr::Unary { .. } => "Unary",
            Expr::Binary { .. } => "Binary",
            Expr::Logical { .. } => "Logical",
            Expr::Conditional { .. } => "Conditional",
        }
    }

    /// Direct children, left to right.
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::Literal(_) | Expr::Identifier(_) => Vec::new(),
            Expr::Unary { operand, .. } => vec![&**operand],
            Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
                vec![&**left, &**right]
            }
            Expr::Conditional {
                test,
                consequent,
                alternate,
            } => vec![&**test, &**consequent, &**alternate],
        }
    }

    /// Pre-order traversal (a node before its children, children left to right).
    ///
    /// Uses an explicit stack so arbitrarily deep hand-built trees can be inspected.
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }

    /// Number of nodes on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        let mut max = 0;
        let mut stack = vec![(self, 1usize)];
        while let Some((node, depth)) = stack.pop() {
            max = max.max(depth);
            stack.extend(node.children().into_iter().map(|child| (child, depth + 1)));
        }
        max
    }

    /// Identifier names in order of first appearance, without duplicates.
    pub fn identifiers(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for node in self.walk() {
            if let Expr::Identifier(name) = node {
                if !out.contains(&name.as_str()) {
                    out.push(name);
                }
            }
        }
        out
    }
}

#[derive(Debug)]
pub struct Walk<'a> {
    stack: Vec<&'a Expr>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a Expr;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().into_iter().rev());
        Some(node)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Number(n) => write!(f, "{n}"),
            Literal::Boolean(b) => write!(f, "{b}"),
            // The grammar has no escapes, so pick whichever quote the text does not contain.
            Literal::Text(s) if s.contains('"') => write!(f, "'{s}'"),
            Literal::Text(s) => write!(f, "\"{s}\""),
        }
    }
}

/// Fully parenthesized canonical form; re-parses to an equal AST.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(lit) => write!(f, "{lit}"),
            Expr::Identifier(name) => f.write_str(name),
            Expr::Unary { op, operand } => write!(f, "({}{operand})", op.symbol()),
            Expr::Binary { op, left, right } => write!(f, "({left} {} {right})", op.symbol()),
            Expr::Logical { op, left, right } => write!(f, "({left} {} {right})", op.symbol()),
            Expr::Conditional {
                test,
                consequent,
                alternate,
            } => write!(f, "({test} ? {consequent} : {alternate})"),
        }
    }
}
