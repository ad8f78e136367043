use std::sync::Mutex;

use formula_expr::{validate, EmptyScope, EvalError, Expr, ExprEngine, Literal, UnaryOp};
use log::{LevelFilter, Log, Metadata, Record};

/// Formats every record, the way a real logger would, and keeps the text.
struct CapturingLogger {
    lines: Mutex<Vec<String>>,
}

impl Log for CapturingLogger {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        let line = format!("{} {}", record.level(), record.args());
        self.lines.lock().unwrap().push(line);
    }

    fn flush(&self) {}
}

static LOGGER: CapturingLogger = CapturingLogger {
    lines: Mutex::new(Vec::new()),
};

fn install_logger() {
    // Tests in this binary share the global logger; only the first install succeeds.
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(LevelFilter::Trace);
}

fn logged(needle: &str) -> bool {
    LOGGER
        .lines
        .lock()
        .unwrap()
        .iter()
        .any(|line| line.contains(needle))
}

/// Take a unary chain apart one level at a time.
fn dismantle(mut expr: Expr) {
    while let Expr::Unary { operand, .. } = expr {
        expr = *operand;
    }
}

#[test]
fn tracing_a_deep_hand_built_tree_does_not_recurse() {
    install_logger();

    let mut expr = Expr::Literal(Literal::Number(1.0));
    for _ in 0..50_000 {
        expr = Expr::Unary {
            op: UnaryOp::Not,
            operand: Box::new(expr),
        };
    }

    assert_eq!(
        ExprEngine::new().evaluate_ast(&expr, &EmptyScope),
        Err(EvalError::DepthExceeded { max: 128 })
    );
    assert!(logged("TRACE evaluating formula rooted at a Unary node"));
    assert!(logged("DEBUG formula evaluation failed"));

    dismantle(expr);
}

#[test]
fn rejected_formulas_are_logged_at_debug() {
    install_logger();

    assert!(!validate("ghost * 2", &["price"]).is_valid);
    assert!(logged("TRACE parsing formula \"ghost * 2\""));
    assert!(logged("rejected with 1 error(s)"));
}
