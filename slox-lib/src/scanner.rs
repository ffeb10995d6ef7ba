//! This module handles scanning source code to produce tokens.

use crate::{
    span::Span,
    tokens::{Literal, Token, TokenKind},
};

/// A scanner to get tokens from source code.
///
/// Source code is treated as a byte stream. The language itself is
/// ASCII-oriented but string literals may contain arbitrary bytes.
pub struct Scanner<'s> {
    /// The source code.
    source: &'s str,

    /// The tokens scanned out so far.
    tokens: Vec<Token<'s>>,

    /// The offset of the start of the lexeme currently being scanned.
    start: usize,

    /// The offset of the byte currently being considered.
    current: usize,
}

impl<'s> Scanner<'s> {
    /// Scan all the tokens from the given source code.
    ///
    /// Lexical errors are reported as they are found and scanning continues, so
    /// one bad character doesn't hide later errors. The returned list always
    /// ends with exactly one EOF token.
    pub fn scan_tokens(source: &'s str) -> Vec<Token<'s>> {
        let mut scanner = Self {
            source,
            tokens: Vec::new(),
            start: 0,
            current: 0,
        };

        while !scanner.is_at_end() {
            scanner.start = scanner.current;
            scanner.scan_token();
        }

        scanner.tokens.push(Token {
            kind: TokenKind::Eof,
            lexeme: "",
            literal: None,
            span: Span {
                start: scanner.current,
                end: scanner.current,
            },
        });

        scanner.tokens
    }

    /// Are we at the end of the source code?
    #[inline]
    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    /// Get the span of the lexeme currently being scanned.
    #[inline]
    fn lexeme_span(&self) -> Span {
        Span {
            start: self.start,
            end: self.current,
        }
    }

    /// Scan a single token.
    fn scan_token(&mut self) {
        let c = self.advance();

        match c {
            b'(' => self.add_token(TokenKind::LeftParen, None),
            b')' => self.add_token(TokenKind::RightParen, None),
            b'{' => self.add_token(TokenKind::LeftBrace, None),
            b'}' => self.add_token(TokenKind::RightBrace, None),
            b',' => self.add_token(TokenKind::Comma, None),
            b'.' => self.add_token(TokenKind::Dot, None),
            b'-' => self.add_token(TokenKind::Minus, None),
            b'+' => self.add_token(TokenKind::Plus, None),
            b';' => self.add_token(TokenKind::Semicolon, None),
            b'*' => self.add_token(TokenKind::Star, None),

            b'/' => {
                if self.match_byte(b'/') {
                    // A comment runs to the end of the line
                    while self.peek() != Some(b'\n') && !self.is_at_end() {
                        self.advance();
                    }
                } else {
                    self.add_token(TokenKind::Slash, None);
                }
            }
            b'!' => {
                let kind = if self.match_byte(b'=') {
                    TokenKind::BangEqual
                } else {
                    TokenKind::Bang
                };
                self.add_token(kind, None);
            }
            b'=' => {
                let kind = if self.match_byte(b'=') {
                    TokenKind::EqualEqual
                } else {
                    TokenKind::Equal
                };
                self.add_token(kind, None);
            }
            b'<' => {
                let kind = if self.match_byte(b'=') {
                    TokenKind::LessEqual
                } else {
                    TokenKind::Less
                };
                self.add_token(kind, None);
            }
            b'>' => {
                let kind = if self.match_byte(b'=') {
                    TokenKind::GreaterEqual
                } else {
                    TokenKind::Greater
                };
                self.add_token(kind, None);
            }

            b' ' | b'\t' | b'\r' | b'\n' => {}

            b'"' => self.scan_string(),

            b'0'..=b'9' => self.scan_number(),

            c if c.is_ascii_alphabetic() || c == b'_' => self.scan_identifier_or_keyword(),

            c => self.report_error(&format!("Unexpected character '{}'.", c as char)),
        }
    }

    /// Report the given lexical error at the current lexeme.
    fn report_error(&self, message: &str) {
        crate::slox::report_static_error(self.lexeme_span(), message);
    }

    /// Return the byte pointed to by `self.current`.
    #[inline]
    fn peek(&self) -> Option<u8> {
        self.source.as_bytes().get(self.current).copied()
    }

    /// Return the byte after the one pointed to by `self.current`.
    #[inline]
    fn peek_next(&self) -> Option<u8> {
        self.source.as_bytes().get(self.current + 1).copied()
    }

    /// Consume and return the current byte.
    fn advance(&mut self) -> u8 {
        let c = self.source.as_bytes()[self.current];
        self.current += 1;
        c
    }

    /// Consume the current byte only if it is the expected one.
    fn match_byte(&mut self, expected: u8) -> bool {
        if self.peek() == Some(expected) {
            self.current += 1;
            true
        } else {
            false
        }
    }

    /// Add a token of the given kind to the internal token list.
    fn add_token(&mut self, kind: TokenKind, literal: Option<Literal<'s>>) {
        self.tokens.push(Token {
            kind,
            lexeme: &self.source[self.start..self.current],
            literal,
            span: self.lexeme_span(),
        });
    }

    /// Scan a string literal. Strings may span multiple lines and have no
    /// escape sequences.
    fn scan_string(&mut self) {
        while self.peek() != Some(b'"') && !self.is_at_end() {
            self.advance();
        }

        if self.is_at_end() {
            self.report_error("Unterminated string.");
            return;
        }

        // The closing quote
        self.advance();

        self.add_token(
            TokenKind::String,
            Some(Literal::String(
                &self.source[(self.start + 1)..(self.current - 1)],
            )),
        );
    }

    /// Scan a numeric literal. A trailing '.' with no fractional digits is not
    /// consumed, so `123.` scans as a number followed by a dot.
    fn scan_number(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }

        if self.peek() == Some(b'.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        let number = self.source[self.start..self.current]
            .parse()
            .expect("A scanned numeric lexeme is always a valid f64");
        self.add_token(TokenKind::Number, Some(Literal::Number(number)));
    }

    /// Scan an identifier or keyword.
    fn scan_identifier_or_keyword(&mut self) {
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == b'_')
        {
            self.advance();
        }

        let kind = TokenKind::keyword(&self.source[self.start..self.current])
            .unwrap_or(TokenKind::Identifier);
        self.add_token(kind, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use TokenKind::*;

    fn scan(code: &str) -> Vec<(TokenKind, &str, Option<Literal<'_>>)> {
        Scanner::scan_tokens(code)
            .into_iter()
            .map(|token| (token.kind, token.lexeme, token.literal))
            .collect()
    }

    #[test]
    fn identifiers() {
        let scanned = scan("orchid fortune _ _9 snake_case c1a55");

        assert_eq!(
            scanned,
            vec![
                (Identifier, "orchid", None),
                (Identifier, "fortune", None),
                (Identifier, "_", None),
                (Identifier, "_9", None),
                (Identifier, "snake_case", None),
                (Identifier, "c1a55", None),
                (Eof, "", None),
            ]
        );
    }

    #[test]
    fn keywords() {
        let scanned =
            scan("and class else false for fun if nil or print return super this true var while");

        assert_eq!(
            scanned,
            vec![
                (And, "and", None),
                (Class, "class", None),
                (Else, "else", None),
                (False, "false", None),
                (For, "for", None),
                (Fun, "fun", None),
                (If, "if", None),
                (Nil, "nil", None),
                (Or, "or", None),
                (Print, "print", None),
                (Return, "return", None),
                (Super, "super", None),
                (This, "this", None),
                (True, "true", None),
                (Var, "var", None),
                (While, "while", None),
                (Eof, "", None),
            ]
        );
    }

    #[test]
    fn numbers() {
        let scanned = scan("123\n123.456\n.456\n123.");

        assert_eq!(
            scanned,
            vec![
                (Number, "123", Some(Literal::Number(123.0))),
                (Number, "123.456", Some(Literal::Number(123.456))),
                (Dot, ".", None),
                (Number, "456", Some(Literal::Number(456.0))),
                (Number, "123", Some(Literal::Number(123.0))),
                (Dot, ".", None),
                (Eof, "", None),
            ]
        );
    }

    #[test]
    fn operators() {
        let scanned = scan("(){};,+-*!===<=>=!=! =<>/.");

        assert_eq!(
            scanned,
            vec![
                (LeftParen, "(", None),
                (RightParen, ")", None),
                (LeftBrace, "{", None),
                (RightBrace, "}", None),
                (Semicolon, ";", None),
                (Comma, ",", None),
                (Plus, "+", None),
                (Minus, "-", None),
                (Star, "*", None),
                (BangEqual, "!=", None),
                (EqualEqual, "==", None),
                (LessEqual, "<=", None),
                (GreaterEqual, ">=", None),
                (BangEqual, "!=", None),
                (Bang, "!", None),
                (Equal, "=", None),
                (Less, "<", None),
                (Greater, ">", None),
                (Slash, "/", None),
                (Dot, ".", None),
                (Eof, "", None),
            ]
        );
    }

    #[test]
    fn strings() {
        let scanned = scan("\"\" \"between\" \"two\nlines\"");

        assert_eq!(
            scanned,
            vec![
                (String, "\"\"", Some(Literal::String(""))),
                (String, "\"between\"", Some(Literal::String("between"))),
                (String, "\"two\nlines\"", Some(Literal::String("two\nlines"))),
                (Eof, "", None),
            ]
        );
    }

    #[test]
    fn comments_and_whitespace() {
        let scanned = scan("a // the rest is ignored ;{}\nb\t\tc\r\nd");

        assert_eq!(
            scanned,
            vec![
                (Identifier, "a", None),
                (Identifier, "b", None),
                (Identifier, "c", None),
                (Identifier, "d", None),
                (Eof, "", None),
            ]
        );
    }

    #[test]
    fn unterminated_string_produces_no_token() {
        let scanned = scan("\"never closed");
        assert_eq!(scanned, vec![(Eof, "", None)]);
    }

    #[test]
    fn eof_span_is_at_the_end() {
        let tokens = Scanner::scan_tokens("print 1;\nprint 2;\n");
        let eof = tokens.last().unwrap();
        assert_eq!(eof.kind, Eof);
        assert_eq!(eof.span.start, 18);
    }
}
