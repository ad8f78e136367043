//! Precedence-climbing parser for the formula grammar.
//!
//! ```text
//! expression  := logical ( "?" expression ":" expression )?
//! logical     := unary ( INFIX unary )*            (precedence from the operator table)
//! unary       := PREFIX unary | primary
//! primary     := NUMBER | STRING | "true" | "false" | IDENT | "(" expression ")"
//! ```
//!
//! Nothing may follow a primary except an infix operator, `?`, `:`, `)` or the end of input.
//! In particular `(` after an operand is a syntax error, which is what keeps calls out of the
//! language.

use crate::ast::{Expr, Literal};
use crate::error::{Span, SyntaxError, SyntaxErrorKind};
use crate::lexer::{self, Token, TokenKind};
use crate::limits::ExprLimits;
use crate::ops::{InfixOp, OperatorTable};

pub fn parse_with(
    source: &str,
    table: &OperatorTable,
    limits: &ExprLimits,
) -> Result<Expr, SyntaxError> {
    let char_len = source.chars().count();
    if char_len > limits.max_chars {
        return Err(SyntaxError::new(
            SyntaxErrorKind::LimitExceeded,
            format!(
                "expression exceeds the {}-character limit (got {char_len})",
                limits.max_chars
            ),
            Span::new(0, source.len()),
        ));
    }
    if source.trim().is_empty() {
        return Err(SyntaxError::new(
            SyntaxErrorKind::Empty,
            "expression is empty",
            Span::new(0, source.len()),
        ));
    }

    log::trace!("parsing formula {source:?}");
    let tokens = lexer::lex(source, table, limits)?;
    check_parens(&tokens, limits)?;

    let mut parser = Parser {
        tokens,
        pos: 0,
        table,
        max_depth: limits.max_depth,
        depth: 0,
    };
    let expr = parser.parse_expression()?;
    parser.expect_end()?;

    // Operands of `?:` are each bounded but the node adds a level; check the finished tree too.
    let depth = expr.depth();
    if depth > limits.max_depth {
        return Err(SyntaxError::new(
            SyntaxErrorKind::LimitExceeded,
            format!(
                "expression nesting exceeds the {}-level limit (got {depth})",
                limits.max_depth
            ),
            Span::new(0, source.len()),
        ));
    }
    Ok(expr)
}

/// Parenthesis balance and depth, checked on the flat token list before any recursion.
fn check_parens(tokens: &[Token], limits: &ExprLimits) -> Result<(), SyntaxError> {
    let mut open: Vec<Span> = Vec::new();
    for token in tokens {
        match token.kind {
            TokenKind::LParen => {
                if open.len() >= limits.max_depth {
                    return Err(SyntaxError::new(
                        SyntaxErrorKind::LimitExceeded,
                        format!(
                            "parentheses nest deeper than the {}-level limit",
                            limits.max_depth
                        ),
                        token.span,
                    ));
                }
                open.push(token.span);
            }
            TokenKind::RParen => {
                if open.pop().is_none() {
                    return Err(SyntaxError::new(
                        SyntaxErrorKind::UnbalancedParentheses,
                        "unmatched ')'",
                        token.span,
                    ));
                }
            }
            _ => {}
        }
    }
    match open.pop() {
        Some(span) => Err(SyntaxError::new(
            SyntaxErrorKind::UnbalancedParentheses,
            "unclosed '('",
            span,
        )),
        None => Ok(()),
    }
}

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    table: &'a OperatorTable,
    max_depth: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> &Token {
        // `lex` always terminates the list with `Eof` and we never advance past it.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn next(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn enter(&mut self, span: Span) -> Result<(), SyntaxError> {
        if self.depth >= self.max_depth {
            return Err(SyntaxError::new(
                SyntaxErrorKind::LimitExceeded,
                format!(
                    "expression nesting exceeds the {}-level limit",
                    self.max_depth
                ),
                span,
            ));
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn parse_expression(&mut self) -> Result<Expr, SyntaxError> {
        let test = self.parse_infix(0)?;
        if self.peek().kind != TokenKind::Question {
            return Ok(test);
        }
        let question = self.next();

        // `a ? b : c ? d : e` groups as `a ? b : (c ? d : e)`.
        self.enter(question.span)?;
        let consequent = self.parse_expression()?;
        let colon = self.next();
        if colon.kind != TokenKind::Colon {
            return Err(unexpected(&colon, "expected ':' in conditional expression"));
        }
        let alternate = self.parse_expression()?;
        self.leave();

        Ok(Expr::Conditional {
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
        })
    }

    fn parse_infix(&mut self, min_prec: u8) -> Result<Expr, SyntaxError> {
        let table = self.table;
        let mut left = self.parse_unary()?;
        // Chains are built iteratively, so the recursion guard does not see them.
        let mut left_depth = left.depth();
        loop {
            let TokenKind::Operator(symbol) = self.peek().kind else {
                break;
            };
            let Some(entry) = table.infix(symbol) else {
                break;
            };
            if entry.precedence < min_prec {
                break;
            }
            let op_token = self.next();

            self.enter(op_token.span)?;
            let right = self.parse_infix(entry.precedence + 1)?;
            self.leave();

            left_depth = 1 + left_depth.max(right.depth());
            if left_depth > self.max_depth {
                return Err(SyntaxError::new(
                    SyntaxErrorKind::LimitExceeded,
                    format!(
                        "operator chain exceeds the {}-level depth limit",
                        self.max_depth
                    ),
                    op_token.span,
                ));
            }

            left = match entry.op {
                InfixOp::Binary(op) => Expr::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                InfixOp::Logical(op) => Expr::Logical {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, SyntaxError> {
        if let TokenKind::Operator(symbol) = self.peek().kind {
            if let Some(entry) = self.table.prefix(symbol) {
                let op = entry.op;
                let op_token = self.next();
                self.enter(op_token.span)?;
                let operand = self.parse_unary()?;
                self.leave();
                return Ok(Expr::Unary {
                    op,
                    operand: Box::new(operand),
                });
            }
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr, SyntaxError> {
        let token = self.next();
        let expr = match &token.kind {
            TokenKind::Number(n) => Expr::Literal(Literal::Number(*n)),
            TokenKind::String(s) => Expr::Literal(Literal::Text(s.clone())),
            TokenKind::Boolean(b) => Expr::Literal(Literal::Boolean(*b)),
            TokenKind::Ident(name) => Expr::Identifier(name.clone()),
            TokenKind::LParen => {
                self.enter(token.span)?;
                let inner = self.parse_expression()?;
                let close = self.next();
                if close.kind != TokenKind::RParen {
                    return Err(unexpected(&close, "expected ')'"));
                }
                self.leave();
                inner
            }
            TokenKind::Eof => {
                return Err(SyntaxError::new(
                    SyntaxErrorKind::UnexpectedToken,
                    "unexpected end of expression; expected an operand",
                    token.span,
                ))
            }
            _ => return Err(unexpected(&token, "expected an operand")),
        };

        if self.peek().kind == TokenKind::LParen {
            let open = self.peek().span;
            let message = match &expr {
                Expr::Identifier(name) => {
                    format!("function calls are not allowed ('{name}(...)')")
                }
                _ => "function calls are not allowed".to_string(),
            };
            return Err(SyntaxError::new(SyntaxErrorKind::Call, message, open));
        }
        Ok(expr)
    }

    fn expect_end(&mut self) -> Result<(), SyntaxError> {
        let token = self.next();
        match token.kind {
            TokenKind::Eof => Ok(()),
            TokenKind::LParen => Err(SyntaxError::new(
                SyntaxErrorKind::Call,
                "function calls are not allowed",
                token.span,
            )),
            _ => Err(unexpected(&token, "expected an operator or end of expression")),
        }
    }
}

fn describe(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Number(n) => format!("number {n}"),
        TokenKind::String(s) => format!("string {s:?}"),
        TokenKind::Boolean(b) => format!("'{b}'"),
        TokenKind::Ident(name) => format!("identifier '{name}'"),
        TokenKind::Operator(symbol) => format!("operator '{symbol}'"),
        TokenKind::LParen => "'('".to_string(),
        TokenKind::RParen => "')'".to_string(),
        TokenKind::Question => "'?'".to_string(),
        TokenKind::Colon => "':'".to_string(),
        TokenKind::Eof => "end of expression".to_string(),
    }
}

fn unexpected(token: &Token, expected: &str) -> SyntaxError {
    SyntaxError::new(
        SyntaxErrorKind::UnexpectedToken,
        format!("unexpected {}; {expected}", describe(&token.kind)),
        token.span,
    )
}
