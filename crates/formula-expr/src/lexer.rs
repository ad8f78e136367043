use crate::error::{Span, SyntaxError, SyntaxErrorKind};
use crate::limits::ExprLimits;
use crate::ops::OperatorTable;
use crate::safety::{is_allowed_char, is_ident_part, is_ident_start};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Number(f64),
    String(String),
    Boolean(bool),
    Ident(String),
    /// A symbol from the operator table.
    Operator(&'static str),
    LParen,
    RParen,
    Question,
    Colon,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// Reject the first character outside the allow-list before any tokenization happens.
pub(crate) fn check_chars(src: &str) -> Result<(), SyntaxError> {
    match src.char_indices().find(|(_, c)| !is_allowed_char(*c)) {
        Some((idx, c)) => Err(SyntaxError::new(
            SyntaxErrorKind::DisallowedCharacter,
            format!("disallowed character {c:?}"),
            Span::new(idx, idx + c.len_utf8()),
        )),
        None => Ok(()),
    }
}

pub(crate) fn lex(
    src: &str,
    table: &OperatorTable,
    limits: &ExprLimits,
) -> Result<Vec<Token>, SyntaxError> {
    check_chars(src)?;

    let mut lexer = Lexer {
        src,
        idx: 0,
        table,
    };
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        if token.kind == TokenKind::Eof {
            tokens.push(token);
            return Ok(tokens);
        }
        if tokens.len() >= limits.max_tokens {
            return Err(SyntaxError::new(
                SyntaxErrorKind::LimitExceeded,
                format!("expression exceeds the {}-token limit", limits.max_tokens),
                token.span,
            ));
        }
        tokens.push(token);
    }
}

struct Lexer<'a> {
    src: &'a str,
    idx: usize,
    table: &'a OperatorTable,
}

impl<'a> Lexer<'a> {
    fn rest(&self) -> &'a str {
        &self.src[self.idx..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.idx += ch.len_utf8();
        Some(ch)
    }

    fn consume_while(&mut self, mut predicate: impl FnMut(char) -> bool) -> &'a str {
        let start = self.idx;
        while let Some(ch) = self.peek() {
            if !predicate(ch) {
                break;
            }
            self.idx += ch.len_utf8();
        }
        &self.src[start..self.idx]
    }

    fn token(&self, kind: TokenKind, start: usize) -> Token {
        Token {
            kind,
            span: Span::new(start, self.idx),
        }
    }

    fn next_token(&mut self) -> Result<Token, SyntaxError> {
        self.consume_while(char::is_whitespace);
        let start = self.idx;
        let Some(ch) = self.peek() else {
            return Ok(self.token(TokenKind::Eof, start));
        };

        let kind = match ch {
            '(' => {
                self.bump();
                TokenKind::LParen
            }
            ')' => {
                self.bump();
                TokenKind::RParen
            }
            '?' => {
                self.bump();
                TokenKind::Question
            }
            ':' => {
                self.bump();
                TokenKind::Colon
            }
            '"' | '\'' => self.lex_string(ch, start)?,
            c if c.is_ascii_digit() => self.lex_number(start)?,
            '.' if self.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.lex_number(start)?
            }
            '.' => {
                return Err(SyntaxError::new(
                    SyntaxErrorKind::PropertyAccess,
                    "'.' is only allowed inside numbers; property access is not supported",
                    Span::new(start, start + 1),
                ))
            }
            c if is_ident_start(c) => {
                let ident = self.consume_while(is_ident_part);
                match ident {
                    "true" => TokenKind::Boolean(true),
                    "false" => TokenKind::Boolean(false),
                    _ => TokenKind::Ident(ident.to_string()),
                }
            }
            _ => match self.table.longest_symbol_at(self.rest()) {
                Some(symbol) => {
                    self.idx += symbol.len();
                    TokenKind::Operator(symbol)
                }
                None => {
                    let message = if ch == '=' {
                        "unexpected '='; assignment is not supported (use '==' or '===')"
                            .to_string()
                    } else {
                        format!("unexpected character {ch:?}")
                    };
                    return Err(SyntaxError::new(
                        SyntaxErrorKind::UnexpectedToken,
                        message,
                        Span::new(start, start + ch.len_utf8()),
                    ));
                }
            },
        };
        Ok(self.token(kind, start))
    }

    fn lex_string(&mut self, quote: char, start: usize) -> Result<TokenKind, SyntaxError> {
        self.bump();
        let body = self.consume_while(|c| c != quote);
        if self.bump().is_none() {
            return Err(SyntaxError::new(
                SyntaxErrorKind::UnterminatedString,
                "unterminated string literal",
                Span::new(start, self.idx),
            ));
        }
        Ok(TokenKind::String(body.to_string()))
    }

    fn lex_number(&mut self, start: usize) -> Result<TokenKind, SyntaxError> {
        self.consume_while(|c| c.is_ascii_digit());
        if self.peek() == Some('.') {
            self.bump();
            if self.consume_while(|c| c.is_ascii_digit()).is_empty() {
                return Err(self.invalid_number(start, "expected digits after '.'"));
            }
        }

        match self.peek() {
            Some('.') => {
                let kind = if self.peek_nth(1).is_some_and(is_ident_start) {
                    SyntaxErrorKind::PropertyAccess
                } else {
                    SyntaxErrorKind::InvalidNumber
                };
                return Err(SyntaxError::new(
                    kind,
                    format!("unexpected '.' after number {:?}", &self.src[start..self.idx]),
                    Span::new(start, self.idx + 1),
                ));
            }
            Some(c) if is_ident_part(c) => {
                self.consume_while(is_ident_part);
                return Err(self.invalid_number(start, "numbers cannot be followed by letters"));
            }
            _ => {}
        }

        let text = &self.src[start..self.idx];
        match text.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(TokenKind::Number(n)),
            _ => Err(self.invalid_number(start, "number is out of range")),
        }
    }

    fn invalid_number(&self, start: usize, detail: &str) -> SyntaxError {
        let text = &self.src[start..self.idx];
        SyntaxError::new(
            SyntaxErrorKind::InvalidNumber,
            format!("invalid number {text:?}: {detail}"),
            Span::new(start, self.idx),
        )
    }
}
