use crate::ast::Expr;
use crate::error::{EvalResult, SyntaxError};
use crate::eval::{Evaluator, Scope};
use crate::limits::ExprLimits;
use crate::ops::OperatorTable;
use crate::parser;
use crate::validate::{self, ValidationResult};
use crate::value::Value;

/// Entry point for parsing, validating and evaluating formulas under a set of [`ExprLimits`].
///
/// The engine is a plain value (`Copy`, `Send`, `Sync`); every call is a pure function of its
/// arguments, so one engine can serve any number of concurrent record materializations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExprEngine {
    limits: ExprLimits,
}

impl ExprEngine {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            limits: ExprLimits::new(),
        }
    }

    #[must_use]
    pub const fn with_limits(limits: ExprLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &ExprLimits {
        &self.limits
    }

    pub fn operators(&self) -> &'static OperatorTable {
        OperatorTable::standard()
    }

    pub fn parse(&self, source: &str) -> Result<Expr, SyntaxError> {
        parser::parse_with(source, self.operators(), &self.limits)
    }

    /// Parse and evaluate `source` against `scope`.
    pub fn evaluate<S: Scope + ?Sized>(&self, source: &str, scope: &S) -> EvalResult<Value> {
        let expr = self.parse(source)?;
        self.evaluate_ast(&expr, scope)
    }

    /// Evaluate an already-parsed expression.
    ///
    /// The tree does not have to come from [`ExprEngine::parse`]; nodes outside the safe subset
    /// are rejected and recursion is bounded by [`ExprLimits::max_depth`].
    pub fn evaluate_ast<S: Scope + ?Sized>(&self, expr: &Expr, scope: &S) -> EvalResult<Value> {
        // `Display` recurses over the whole tree, which may not be bounded yet.
        log::trace!("evaluating formula rooted at a {} node", expr.kind_name());
        let result = Evaluator::new(scope, self.limits.max_depth).eval(expr);
        if let Err(err) = &result {
            log::debug!("formula evaluation failed: {err}");
        }
        result
    }

    pub fn validate<S: AsRef<str>>(
        &self,
        source: &str,
        available_identifiers: &[S],
    ) -> ValidationResult {
        validate::validate_with(source, available_identifiers, self.operators(), &self.limits)
    }

    /// Parse once for repeated evaluation (e.g. one formula field across many records).
    pub fn compile(&self, source: &str) -> Result<CompiledExpr, SyntaxError> {
        let ast = self.parse(source)?;
        let identifiers = ast.identifiers().into_iter().map(str::to_string).collect();
        Ok(CompiledExpr {
            source: source.to_string(),
            ast,
            identifiers,
            engine: *self,
        })
    }
}

/// A parsed formula together with the engine settings it was parsed under.
///
/// Evaluating a `CompiledExpr` gives exactly the same result as calling
/// [`ExprEngine::evaluate`] with its source text.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledExpr {
    source: String,
    ast: Expr,
    identifiers: Vec<String>,
    engine: ExprEngine,
}

impl CompiledExpr {
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn ast(&self) -> &Expr {
        &self.ast
    }

    /// Field names the formula reads, in order of first appearance.
    pub fn identifiers(&self) -> &[String] {
        &self.identifiers
    }

    pub fn evaluate<S: Scope + ?Sized>(&self, scope: &S) -> EvalResult<Value> {
        self.engine.evaluate_ast(&self.ast, scope)
    }
}
