//! `formula-expr` implements the expression language behind computed (formula) record fields.
//!
//! Formulas are written by workspace users and are therefore untrusted. The language is a
//! small arithmetic/comparison/logical subset with a conditional operator; the grammar has no
//! production for property access, indexing or calls, so those constructs cannot be expressed
//! at all rather than being filtered out after parsing.
//!
//! The crate exposes:
//! - [`validate`]: check a formula against the sibling field names before it is saved.
//! - [`evaluate`]: compute a formula's value for one record.
//! - [`ExprEngine`]/[`CompiledExpr`]: the same operations with custom [`ExprLimits`], and
//!   parse-once/evaluate-many for materializing many records.
//!
//! ```
//! use std::collections::HashMap;
//! use formula_expr::{evaluate, validate, Value};
//!
//! let mut record = HashMap::new();
//! record.insert("price".to_string(), Value::from(12.5));
//! record.insert("qty".to_string(), Value::from(4));
//!
//! assert_eq!(evaluate("price * qty", &record).unwrap(), Value::from(50.0));
//! assert!(!validate("price.toString", &["price", "qty"]).is_valid);
//! ```

mod ast;
mod engine;
mod error;
mod eval;
mod lexer;
mod limits;
pub mod ops;
mod parser;
pub mod safety;
mod validate;
mod value;

pub use crate::ast::{Expr, Literal, Walk};
pub use crate::engine::{CompiledExpr, ExprEngine};
pub use crate::error::{EvalError, EvalResult, Span, SyntaxError, SyntaxErrorKind};
pub use crate::eval::{EmptyScope, Evaluator, Scope};
pub use crate::limits::ExprLimits;
pub use crate::ops::{BinaryOp, LogicalOp, OperatorTable, UnaryOp};
pub use crate::validate::ValidationResult;
pub use crate::value::Value;

const DEFAULT_ENGINE: ExprEngine = ExprEngine::new();

/// Parse a formula with the default [`ExprLimits`].
pub fn parse(source: &str) -> Result<Expr, SyntaxError> {
    DEFAULT_ENGINE.parse(source)
}

/// Parse and evaluate a formula against a record's field values.
pub fn evaluate<S: Scope + ?Sized>(expression: &str, scope: &S) -> EvalResult<Value> {
    DEFAULT_ENGINE.evaluate(expression, scope)
}

/// Check a formula before it is saved. `available_identifiers` are the field names it may
/// reference.
pub fn validate<S: AsRef<str>>(expression: &str, available_identifiers: &[S]) -> ValidationResult {
    DEFAULT_ENGINE.validate(expression, available_identifiers)
}

/// Field names referenced by `expr`, in order of first appearance.
pub fn referenced_identifiers(expr: &Expr) -> Vec<&str> {
    expr.identifiers()
}
