#![no_main]

use formula_expr::{EvalError, Value};
use libfuzzer_sys::fuzz_target;

const MAX_EVAL_EXPR_CHARS: usize = 2_048;
const MAX_INPUT_BYTES: usize = MAX_EVAL_EXPR_CHARS * 4; // max UTF-8 bytes per char

fn truncate_to_chars(s: &str, max_chars: usize) -> &str {
    let mut count = 0usize;
    for (idx, _) in s.char_indices() {
        if count == max_chars {
            return &s[..idx];
        }
        count += 1;
    }
    s
}

fn fuzz_scope(selector: u8) -> [(&'static str, Value); 5] {
    let n = f64::from(selector);
    [
        ("a", Value::from(n)),
        ("b", Value::from(n - 128.0)),
        ("s", Value::from(format!("{selector}"))),
        ("t", Value::from(selector & 1 == 0)),
        ("n", Value::Null),
    ]
}

fuzz_target!(|data: &[u8]| {
    let Some((&selector, rest)) = data.split_first() else {
        return;
    };
    let rest = if rest.len() > MAX_INPUT_BYTES {
        &rest[..MAX_INPUT_BYTES]
    } else {
        rest
    };
    let input = String::from_utf8_lossy(rest);
    let source = truncate_to_chars(&input, MAX_EVAL_EXPR_CHARS);

    let scope = fuzz_scope(selector);
    let first = formula_expr::evaluate(source, &scope);

    match &first {
        Ok(Value::Number(n)) => assert!(n.is_finite(), "{source:?} produced {n}"),
        Err(EvalError::Disallowed(reason)) => {
            panic!("parser accepted a formula the evaluator refused: {source:?}: {reason}")
        }
        _ => {}
    }

    // Evaluation is pure: same formula, same record, same outcome.
    assert_eq!(first, formula_expr::evaluate(source, &scope));
});
