use serde::{Deserialize, Serialize};

/// Byte range into the formula source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SyntaxErrorKind {
    /// The source is empty or whitespace only.
    Empty,
    /// A character outside the formula allow-list.
    DisallowedCharacter,
    UnterminatedString,
    InvalidNumber,
    UnbalancedParentheses,
    UnexpectedToken,
    /// `expr.name` (or any other use of `.` outside a numeric literal).
    PropertyAccess,
    /// `name(...)` / `(expr)(...)`.
    Call,
    /// The input exceeds one of the configured [`ExprLimits`](crate::ExprLimits).
    LimitExceeded,
}

/// Malformed formula text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{message} (at {}..{})", .span.start, .span.end)]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub message: String,
    pub span: Span,
}

impl SyntaxError {
    #[must_use]
    pub fn new(kind: SyntaxErrorKind, message: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            message: message.into(),
            span,
        }
    }
}

/// Failure while evaluating a formula against a scope.
///
/// Evaluation is fail-fast: the first error aborts with no partial result.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    #[error("unknown identifier: {0}")]
    UnknownIdentifier(String),

    #[error("cannot convert {type_name} {value} to a number")]
    NotNumeric {
        value: String,
        type_name: &'static str,
    },

    #[error("division by zero in '{op}'")]
    DivisionByZero { op: &'static str },

    #[error("result of '{op}' is not a finite number")]
    NonFiniteResult { op: &'static str },

    #[error("disallowed operation: {0}")]
    Disallowed(String),

    #[error("expression nesting exceeds the {max}-level limit")]
    DepthExceeded { max: usize },
}

pub type EvalResult<T> = Result<T, EvalError>;
