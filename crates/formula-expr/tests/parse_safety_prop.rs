#![cfg(not(target_arch = "wasm32"))]

mod common;

use common::record;
use formula_expr::safety::check_node;
use formula_expr::{evaluate, parse, validate, Value};
use proptest::prelude::*;
use proptest::test_runner::{Config, RngAlgorithm, TestRng, TestRunner};

const CASES: u32 = 256;
const PARSE_SAFETY_SEED: [u8; 32] = [0x5a; 32];

fn runner() -> TestRunner {
    TestRunner::new_with_rng(
        Config {
            cases: CASES,
            failure_persistence: None,
            ..Config::default()
        },
        TestRng::from_seed(RngAlgorithm::ChaCha, &PARSE_SAFETY_SEED),
    )
}

/// Arbitrary text over the allowed character set, biased toward operator soup.
fn arb_allowed_text() -> impl Strategy<Value = String> {
    "[a-c0-9_ .<>=!&|()+*/%?:\"'-]{0,48}"
}

fn arb_leaf() -> impl Strategy<Value = String> {
    prop_oneof![
        (0u32..1000).prop_map(|n| n.to_string()),
        (0u32..100, 0u32..100).prop_map(|(int, frac)| format!("{int}.{frac:02}")),
        Just("a".to_string()),
        Just("b".to_string()),
        Just("c".to_string()),
        Just("true".to_string()),
        Just("false".to_string()),
        Just("'x'".to_string()),
        Just("\"7\"".to_string()),
    ]
}

/// Well-formed formulas over the identifiers `a`, `b` and `c`.
fn arb_formula() -> impl Strategy<Value = String> {
    const INFIX: [&str; 15] = [
        "||", "&&", "===", "!==", "==", "!=", "<", ">", "<=", ">=", "+", "-", "*", "/", "%",
    ];
    arb_leaf().prop_recursive(5, 48, 3, |inner| {
        prop_oneof![
            (inner.clone(), 0..INFIX.len(), inner.clone())
                .prop_map(|(l, op, r)| format!("{l} {} {r}", INFIX[op])),
            (prop_oneof![Just("-"), Just("+"), Just("!")], inner.clone())
                .prop_map(|(op, e)| format!("{op}{e}")),
            inner.clone().prop_map(|e| format!("({e})")),
            (inner.clone(), inner.clone(), inner)
                .prop_map(|(t, c, a)| format!("({t}) ? {c} : {a}")),
        ]
    })
}

fn check_parsed(src: &str) -> Result<(), TestCaseError> {
    let Ok(ast) = parse(src) else {
        return Ok(());
    };
    for node in ast.walk() {
        prop_assert!(
            check_node(node).is_ok(),
            "unsafe node {:?} parsed from {:?}",
            node,
            src
        );
    }
    let printed = ast.to_string();
    let reparsed = parse(&printed)
        .map_err(|e| TestCaseError::fail(format!("{printed:?} failed to re-parse: {e}")))?;
    prop_assert_eq!(reparsed, ast, "display of {:?} was {:?}", src, printed);
    Ok(())
}

#[test]
fn arbitrary_text_never_panics_and_only_yields_safe_trees() {
    runner()
        .run(&arb_allowed_text(), |src| {
            check_parsed(&src)?;
            // Validation reports rather than raises.
            let result = validate(&src, &["a", "b", "c"]);
            prop_assert_eq!(result.is_valid, result.errors.is_empty());
            Ok(())
        })
        .unwrap();
}

#[test]
fn arbitrary_unicode_never_panics() {
    runner()
        .run(&any::<String>(), |src| {
            let _ = parse(&src);
            let _ = evaluate(&src, &[("a", Value::from(1))]);
            let _ = validate(&src, &["a"]);
            Ok(())
        })
        .unwrap();
}

#[test]
fn generated_formulas_parse_validate_and_evaluate_purely() {
    let scope = record([
        ("a", Value::from(3)),
        ("b", Value::from("4")),
        ("c", Value::Null),
    ]);
    runner()
        .run(&arb_formula(), |src| {
            prop_assert!(parse(&src).is_ok(), "{:?} failed to parse", src);
            check_parsed(&src)?;

            let result = validate(&src, &["a", "b", "c"]);
            prop_assert!(result.is_valid, "{:?}: {:?}", src, result.errors);

            let first = evaluate(&src, &scope);
            let second = evaluate(&src, &scope);
            prop_assert_eq!(first, second, "{:?} evaluated differently twice", src);
            Ok(())
        })
        .unwrap();
}
