use formula_expr::{parse, BinaryOp, Expr, Literal, LogicalOp, Span, SyntaxErrorKind, UnaryOp};
use pretty_assertions::assert_eq;

fn ident(name: &str) -> Box<Expr> {
    Box::new(Expr::Identifier(name.to_string()))
}

fn num(n: f64) -> Box<Expr> {
    Box::new(Expr::Literal(Literal::Number(n)))
}

fn err_kind(src: &str) -> SyntaxErrorKind {
    match parse(src) {
        Ok(expr) => panic!("expected {src:?} to be rejected, parsed as {expr:?}"),
        Err(err) => err.kind,
    }
}

#[test]
fn builds_binary_and_logical_nodes_by_precedence() {
    assert_eq!(
        parse("a + b * 2 > 3 && !c").unwrap(),
        Expr::Logical {
            op: LogicalOp::And,
            left: Box::new(Expr::Binary {
                op: BinaryOp::Greater,
                left: Box::new(Expr::Binary {
                    op: BinaryOp::Add,
                    left: ident("a"),
                    right: Box::new(Expr::Binary {
                        op: BinaryOp::Multiply,
                        left: ident("b"),
                        right: num(2.0),
                    }),
                }),
                right: num(3.0),
            }),
            right: Box::new(Expr::Unary {
                op: UnaryOp::Not,
                operand: ident("c"),
            }),
        }
    );
}

#[test]
fn or_binds_looser_than_and() {
    assert_eq!(
        parse("a || b && c").unwrap(),
        Expr::Logical {
            op: LogicalOp::Or,
            left: ident("a"),
            right: Box::new(Expr::Logical {
                op: LogicalOp::And,
                left: ident("b"),
                right: ident("c"),
            }),
        }
    );
}

#[test]
fn conditional_is_one_right_associative_production() {
    assert_eq!(
        parse("a ? 1 : b ? 2 : 3").unwrap(),
        Expr::Conditional {
            test: ident("a"),
            consequent: num(1.0),
            alternate: Box::new(Expr::Conditional {
                test: ident("b"),
                consequent: num(2.0),
                alternate: num(3.0),
            }),
        }
    );

    // The test absorbs the whole `||` chain.
    match parse("a || b ? 1 : 2").unwrap() {
        Expr::Conditional { test, .. } => assert!(matches!(*test, Expr::Logical { .. })),
        other => panic!("expected Conditional, got {other:?}"),
    }
}

#[test]
fn literals() {
    assert_eq!(
        parse("'single'").unwrap(),
        Expr::Literal(Literal::Text("single".into()))
    );
    assert_eq!(
        parse("\"it's\"").unwrap(),
        Expr::Literal(Literal::Text("it's".into()))
    );
    assert_eq!(parse("false").unwrap(), Expr::Literal(Literal::Boolean(false)));
    assert_eq!(parse("  0.125 ").unwrap(), *num(0.125));
}

#[test]
fn rejects_member_access_and_calls_structurally() {
    assert_eq!(err_kind("a.b"), SyntaxErrorKind::PropertyAccess);
    assert_eq!(err_kind("a .b"), SyntaxErrorKind::PropertyAccess);
    assert_eq!(err_kind("(a).b"), SyntaxErrorKind::PropertyAccess);
    assert_eq!(err_kind("foo()"), SyntaxErrorKind::Call);
    assert_eq!(err_kind("foo (1)"), SyntaxErrorKind::Call);
    assert_eq!(err_kind("(a + b)(1)"), SyntaxErrorKind::Call);
    assert_eq!(err_kind("1 (2)"), SyntaxErrorKind::Call);
    assert_eq!(err_kind("a[0]"), SyntaxErrorKind::DisallowedCharacter);
    assert_eq!(err_kind("a, b"), SyntaxErrorKind::DisallowedCharacter);
    assert_eq!(err_kind("{}"), SyntaxErrorKind::DisallowedCharacter);
}

#[test]
fn call_errors_name_the_callee() {
    let err = parse("constructor()").unwrap_err();
    assert!(err.message.contains("constructor(...)"), "{}", err.message);
    assert_eq!(err.span, Span::new(11, 12));
}

#[test]
fn rejects_malformed_input() {
    let cases = [
        ("", SyntaxErrorKind::Empty),
        ("   \t", SyntaxErrorKind::Empty),
        ("(1 + 2", SyntaxErrorKind::UnbalancedParentheses),
        ("1 + 2)", SyntaxErrorKind::UnbalancedParentheses),
        (")(", SyntaxErrorKind::UnbalancedParentheses),
        ("1 +", SyntaxErrorKind::UnexpectedToken),
        ("* 2", SyntaxErrorKind::UnexpectedToken),
        ("1 2", SyntaxErrorKind::UnexpectedToken),
        ("a ? b", SyntaxErrorKind::UnexpectedToken),
        ("a : b", SyntaxErrorKind::UnexpectedToken),
        ("()", SyntaxErrorKind::UnexpectedToken),
        ("a !b", SyntaxErrorKind::UnexpectedToken),
        ("x = 1", SyntaxErrorKind::UnexpectedToken),
        ("'open", SyntaxErrorKind::UnterminatedString),
        ("1..2", SyntaxErrorKind::InvalidNumber),
        ("3px", SyntaxErrorKind::InvalidNumber),
        ("price$", SyntaxErrorKind::DisallowedCharacter),
        ("a; b", SyntaxErrorKind::DisallowedCharacter),
        ("`cmd`", SyntaxErrorKind::DisallowedCharacter),
    ];
    for (src, kind) in cases {
        assert_eq!(err_kind(src), kind, "{src:?}");
    }
}

#[test]
fn error_display_includes_span() {
    let err = parse("1 + $").unwrap_err();
    assert_eq!(err.to_string(), "disallowed character '$' (at 4..5)");
}

#[test]
fn display_is_fully_parenthesized_and_reparses() {
    let sources = [
        "a + b * 2 > 3 && !c",
        "x ? 'yes' : \"no\"",
        "-(a - -b) % 3 === 0 || flag != false",
        "\"it's\" == 'say \"hi\"'",
        "0.1 + 100000 <= .5",
    ];
    for src in sources {
        let ast = parse(src).unwrap();
        let printed = ast.to_string();
        assert_eq!(parse(&printed).unwrap(), ast, "{src} printed as {printed}");
    }

    assert_eq!(parse("a+b*2").unwrap().to_string(), "(a + (b * 2))");
}

#[test]
fn only_the_six_safe_node_kinds_are_produced() {
    let ast = parse("a ? -b : (c && d) || 'x' === e % 2").unwrap();
    let mut kinds: Vec<&str> = ast.walk().map(Expr::kind_name).collect();
    kinds.sort_unstable();
    kinds.dedup();
    assert_eq!(
        kinds,
        ["Binary", "Conditional", "Identifier", "Literal", "Logical", "Unary"]
    );
}
