use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use crate::ast::{Expr, Literal};
use crate::error::{EvalError, EvalResult};
use crate::ops::{BinaryOp, LogicalOp, UnaryOp};
use crate::safety;
use crate::value::Value;

/// Field values visible to a formula during one evaluation.
///
/// `None` means the name is not a field at all (an error); a field that exists but has no
/// value should be supplied as [`Value::Null`].
pub trait Scope {
    fn lookup(&self, name: &str) -> Option<&Value>;
}

impl<S: BuildHasher> Scope for HashMap<String, Value, S> {
    fn lookup(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

impl Scope for BTreeMap<String, Value> {
    fn lookup(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

impl<K: AsRef<str>> Scope for [(K, Value)] {
    fn lookup(&self, name: &str) -> Option<&Value> {
        self.iter()
            .find(|(key, _)| key.as_ref() == name)
            .map(|(_, value)| value)
    }
}

impl<K: AsRef<str>, const N: usize> Scope for [(K, Value); N] {
    fn lookup(&self, name: &str) -> Option<&Value> {
        self.as_slice().lookup(name)
    }
}

impl<T: Scope + ?Sized> Scope for &T {
    fn lookup(&self, name: &str) -> Option<&Value> {
        (**self).lookup(name)
    }
}

/// A scope with no fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyScope;

impl Scope for EmptyScope {
    fn lookup(&self, _name: &str) -> Option<&Value> {
        None
    }
}

/// Tree-walking interpreter over [`Expr`].
///
/// Holds no state beyond the borrowed scope and a recursion counter; a fresh evaluator is
/// created per call.
pub struct Evaluator<'a, S: Scope + ?Sized> {
    scope: &'a S,
    max_depth: usize,
    depth: usize,
}

impl<'a, S: Scope + ?Sized> Evaluator<'a, S> {
    pub fn new(scope: &'a S, max_depth: usize) -> Self {
        Self {
            scope,
            max_depth,
            depth: 0,
        }
    }

    pub fn eval(&mut self, expr: &Expr) -> EvalResult<Value> {
        if self.depth >= self.max_depth {
            return Err(EvalError::DepthExceeded {
                max: self.max_depth,
            });
        }
        self.depth += 1;
        let out = self.eval_node(expr);
        self.depth -= 1;
        out
    }

    fn eval_node(&mut self, expr: &Expr) -> EvalResult<Value> {
        if let Err(disallowed) = safety::check_node(expr) {
            log::warn!("refusing to evaluate formula node: {disallowed}");
            return Err(EvalError::Disallowed(disallowed.to_string()));
        }

        match expr {
            Expr::Literal(Literal::Number(n)) => Ok(Value::Number(*n)),
            Expr::Literal(Literal::Text(s)) => Ok(Value::Text(s.clone())),
            Expr::Literal(Literal::Boolean(b)) => Ok(Value::Bool(*b)),
            Expr::Identifier(name) => self
                .scope
                .lookup(name)
                .cloned()
                .ok_or_else(|| EvalError::UnknownIdentifier(name.clone())),
            Expr::Unary { op, operand } => {
                let value = self.eval(operand)?;
                eval_unary(*op, &value)
            }
            Expr::Binary { op, left, right } => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                eval_binary(*op, &left, &right)
            }
            Expr::Logical { op, left, right } => {
                // Short-circuit: the right side is only evaluated when it decides the result,
                // and the deciding operand's value is returned as-is (`discount || 0`).
                let left = self.eval(left)?;
                match (op, left.is_truthy()) {
                    (LogicalOp::And, false) | (LogicalOp::Or, true) => Ok(left),
                    (LogicalOp::And, true) | (LogicalOp::Or, false) => self.eval(right),
                }
            }
            Expr::Conditional {
                test,
                consequent,
                alternate,
            } => {
                if self.eval(test)?.is_truthy() {
                    self.eval(consequent)
                } else {
                    self.eval(alternate)
                }
            }
        }
    }
}

pub(crate) fn to_number(value: &Value) -> EvalResult<f64> {
    value.to_number().ok_or_else(|| EvalError::NotNumeric {
        value: match value {
            Value::Text(s) => format!("{s:?}"),
            other => other.to_string(),
        },
        type_name: value.type_name(),
    })
}

fn eval_unary(op: UnaryOp, value: &Value) -> EvalResult<Value> {
    match op {
        UnaryOp::Negate => Ok(Value::Number(-to_number(value)?)),
        UnaryOp::Plus => Ok(Value::Number(to_number(value)?)),
        UnaryOp::Not => Ok(Value::Bool(!value.is_truthy())),
    }
}

fn eval_binary(op: BinaryOp, left: &Value, right: &Value) -> EvalResult<Value> {
    match op {
        BinaryOp::Add => arithmetic(op, left, right, |a, b| a + b),
        BinaryOp::Subtract => arithmetic(op, left, right, |a, b| a - b),
        BinaryOp::Multiply => arithmetic(op, left, right, |a, b| a * b),
        BinaryOp::Divide => arithmetic(op, left, right, |a, b| a / b),
        // `f64 %` truncates toward zero and keeps the dividend's sign (`-7 % 3 == -1`).
        BinaryOp::Remainder => arithmetic(op, left, right, |a, b| a % b),
        BinaryOp::StrictEquals => Ok(Value::Bool(strict_equals(left, right))),
        BinaryOp::StrictNotEquals => Ok(Value::Bool(!strict_equals(left, right))),
        BinaryOp::Equals => Ok(Value::Bool(loose_equals(left, right)?)),
        BinaryOp::NotEquals => Ok(Value::Bool(!loose_equals(left, right)?)),
        BinaryOp::Greater => compare(left, right).map(|o| Value::Bool(o == Ordering::Greater)),
        BinaryOp::Less => compare(left, right).map(|o| Value::Bool(o == Ordering::Less)),
        BinaryOp::GreaterEquals => {
            compare(left, right).map(|o| Value::Bool(o != Ordering::Less))
        }
        BinaryOp::LessEquals => {
            compare(left, right).map(|o| Value::Bool(o != Ordering::Greater))
        }
    }
}

fn arithmetic(
    op: BinaryOp,
    left: &Value,
    right: &Value,
    apply: impl FnOnce(f64, f64) -> f64,
) -> EvalResult<Value> {
    let a = to_number(left)?;
    let b = to_number(right)?;
    if matches!(op, BinaryOp::Divide | BinaryOp::Remainder) && b == 0.0 {
        return Err(EvalError::DivisionByZero { op: op.symbol() });
    }
    let out = apply(a, b);
    if !out.is_finite() {
        return Err(EvalError::NonFiniteResult { op: op.symbol() });
    }
    Ok(Value::Number(out))
}

/// `===`: same type and same value, no coercion.
pub(crate) fn strict_equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::Text(a), Value::Text(b)) => a == b,
        _ => false,
    }
}

/// `==`: operands of the same type compare by value; when either side is a boolean both sides
/// are compared numerically (`true == 1`, `false == null`, `true == "1"`); every other mix of
/// types is unequal (`1 == "1"` is `false`).
pub(crate) fn loose_equals(left: &Value, right: &Value) -> EvalResult<bool> {
    match (left, right) {
        (Value::Bool(_), _) | (_, Value::Bool(_))
            if std::mem::discriminant(left) != std::mem::discriminant(right) =>
        {
            Ok(to_number(left)? == to_number(right)?)
        }
        _ => Ok(strict_equals(left, right)),
    }
}

/// Relational operators: two strings compare by code point, anything else numerically.
fn compare(left: &Value, right: &Value) -> EvalResult<Ordering> {
    if let (Value::Text(a), Value::Text(b)) = (left, right) {
        return Ok(a.cmp(b));
    }
    let a = to_number(left)?;
    let b = to_number(right)?;
    // `to_number` only yields finite values, so this is total.
    Ok(a.partial_cmp(&b).unwrap_or(Ordering::Equal))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loose_equality_only_coerces_around_booleans() {
        let t = Value::Bool(true);
        assert_eq!(loose_equals(&t, &Value::from(1)), Ok(true));
        assert_eq!(loose_equals(&t, &Value::from("1")), Ok(true));
        assert_eq!(loose_equals(&Value::Bool(false), &Value::Null), Ok(true));
        assert_eq!(loose_equals(&Value::from(1), &Value::from("1")), Ok(false));
        assert_eq!(loose_equals(&Value::Null, &Value::from(0)), Ok(false));
        assert_eq!(loose_equals(&Value::Null, &Value::Null), Ok(true));
        assert!(matches!(
            loose_equals(&t, &Value::from("yes")),
            Err(EvalError::NotNumeric { .. })
        ));
    }

    #[test]
    fn remainder_keeps_the_dividend_sign() {
        assert_eq!(
            eval_binary(BinaryOp::Remainder, &Value::from(-7), &Value::from(3)),
            Ok(Value::Number(-1.0))
        );
        assert_eq!(
            eval_binary(BinaryOp::Remainder, &Value::from(7), &Value::Null),
            Err(EvalError::DivisionByZero { op: "%" })
        );
    }
}
