use serde::{Deserialize, Serialize};

use crate::ast::Expr;
use crate::error::SyntaxErrorKind;
use crate::limits::ExprLimits;
use crate::ops::OperatorTable;
use crate::parser;
use crate::safety::{self, is_allowed_char};

/// Outcome of checking a formula before it is saved.
///
/// Serializes as `{"isValid": bool, "errors": [..]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

/// Check `source` against the grammar and the set of field names it may reference.
///
/// Never fails and never evaluates anything; every problem found is reported so the author can
/// fix them all at once.
pub(crate) fn validate_with<S: AsRef<str>>(
    source: &str,
    available_identifiers: &[S],
    table: &OperatorTable,
    limits: &ExprLimits,
) -> ValidationResult {
    let mut errors = Vec::new();

    let mut disallowed: Vec<char> = Vec::new();
    for c in source.chars().filter(|c| !is_allowed_char(*c)) {
        if !disallowed.contains(&c) {
            disallowed.push(c);
        }
    }
    if !disallowed.is_empty() {
        let listed: Vec<String> = disallowed.iter().map(|c| format!("{c:?}")).collect();
        errors.push(format!(
            "Expression contains disallowed characters: {}",
            listed.join(", ")
        ));
    }

    match parser::parse_with(source, table, limits) {
        Ok(expr) => {
            check_identifiers(&expr, available_identifiers, &mut errors);
            check_nodes(&expr, table, &mut errors);
        }
        // Already reported above, with every offending character rather than just the first.
        Err(err) if err.kind == SyntaxErrorKind::DisallowedCharacter && !disallowed.is_empty() => {}
        Err(err) => errors.push(format!("Syntax error: {err}")),
    }

    if !errors.is_empty() {
        log::debug!(
            "formula {source:?} rejected with {} error(s): {errors:?}",
            errors.len()
        );
    }
    ValidationResult::from_errors(errors)
}

fn check_identifiers<S: AsRef<str>>(expr: &Expr, available: &[S], errors: &mut Vec<String>) {
    for name in expr.identifiers() {
        if !available.iter().any(|a| a.as_ref() == name) {
            errors.push(format!("Unknown identifier '{name}'"));
        }
    }
}

fn check_nodes(expr: &Expr, table: &OperatorTable, errors: &mut Vec<String>) {
    for node in expr.walk() {
        if let Err(disallowed) = safety::check_node_with(node, table) {
            errors.push(format!("Disallowed operation: {disallowed}"));
        }
    }
}
