#![no_main]

use formula_expr::safety::check_node;
use formula_expr::ExprLimits;
use libfuzzer_sys::fuzz_target;

/// Stay a little above the parser's own character limit so the limit path is exercised too.
const MAX_FUZZ_EXPR_CHARS: usize = ExprLimits::DEFAULT_MAX_CHARS + 256;
const MAX_INPUT_BYTES: usize = MAX_FUZZ_EXPR_CHARS * 4; // max UTF-8 bytes per char

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

fuzz_target!(|data: &[u8]| {
    let data = if data.len() > MAX_INPUT_BYTES {
        &data[..MAX_INPUT_BYTES]
    } else {
        data
    };
    let input = String::from_utf8_lossy(data);
    let source = truncate_to_chars(&input, MAX_FUZZ_EXPR_CHARS);

    let Ok(ast) = formula_expr::parse(source) else {
        return;
    };

    // Anything the parser accepts must be inside the safe grammar.
    for node in ast.walk() {
        if let Err(err) = check_node(node) {
            panic!("parser produced an unsafe node for {source:?}: {err}");
        }
    }

    let printed = ast.to_string();
    match formula_expr::parse(&printed) {
        Ok(reparsed) => assert_eq!(reparsed, ast, "display round-trip changed {source:?}"),
        // Parenthesizing can push a formula that sat right at a limit over it.
        Err(err) if err.kind == formula_expr::SyntaxErrorKind::LimitExceeded => {}
        Err(err) => panic!("{printed:?} (from {source:?}) failed to re-parse: {err}"),
    }

    let _ = formula_expr::validate(source, &["a", "b", "c"]);
});
