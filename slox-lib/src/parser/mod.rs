//! This module provides the recursive-descent [`Parser`].

mod exprs;
mod stmts;

use crate::{
    ast::SpanStmt,
    slox::report_token_error,
    tokens::{Token, TokenKind},
};
use std::fmt;
use thiserror::Error;

/// An error that occurred during parsing.
#[derive(Clone, Debug, PartialEq, Error)]
struct ParseError<'s> {
    /// The token that caused the error.
    token: Token<'s>,

    /// The message to show the user.
    message: String,
}

impl fmt::Display for ParseError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl ParseError<'_> {
    /// Report this error to the user.
    fn report(&self) {
        report_token_error(&self.token, &self.message);
    }
}

/// A result wrapping a [`ParseError`].
type ParseResult<'s, T, E = ParseError<'s>> = ::std::result::Result<T, E>;

/// A recursive descent parser for Slox.
///
/// It parses this grammar:
/// ```text
/// program      → declaration* EOF ;
///
/// declaration  → classDecl | funDecl | varDecl | statement ;
///
/// classDecl    → "class" IDENTIFIER ( "<" IDENTIFIER )? "{" function* "}" ;
/// funDecl      → "fun" function ;
/// function     → IDENTIFIER "(" parameters? ")" block ;
/// parameters   → IDENTIFIER ( "," IDENTIFIER )* ;
/// varDecl      → "var" IDENTIFIER ( "=" expression )? ";" ;
///
/// statement    → exprStmt | forStmt | ifStmt | printStmt | returnStmt
///              | whileStmt | block ;
/// exprStmt     → expression ";" ;
/// forStmt      → "for" "(" ( varDecl | exprStmt | ";" ) expression? ";" expression? ")" statement ;
/// ifStmt       → "if" "(" expression ")" statement ( "else" statement )? ;
/// printStmt    → "print" expression ";" ;
/// returnStmt   → "return" expression? ";" ;
/// whileStmt    → "while" "(" expression ")" statement ;
/// block        → "{" declaration* "}" ;
///
/// expression   → assignment ;
/// assignment   → ( call "." )? IDENTIFIER "=" assignment | logic_or ;
/// logic_or     → logic_and ( "or" logic_and )* ;
/// logic_and    → equality ( "and" equality )* ;
/// equality     → comparison ( ( "!=" | "==" ) comparison )* ;
/// comparison   → term ( ( ">" | ">=" | "<" | "<=" ) term )* ;
/// term         → factor ( ( "-" | "+" ) factor )* ;
/// factor       → unary ( ( "/" | "*" ) unary )* ;
/// unary        → ( "!" | "-" ) unary | call ;
/// call         → primary ( "(" arguments? ")" | "." IDENTIFIER )* ;
/// arguments    → expression ( "," expression )* ;
/// primary      → "true" | "false" | "nil" | "this" | "super" "." IDENTIFIER
///              | NUMBER | STRING | IDENTIFIER | "(" expression ")" ;
/// ```
///
/// `for` loops never reach the AST: they are desugared here into a `while`
/// loop inside a block.
pub struct Parser<'s> {
    /// The token list being parsed.
    tokens: Vec<Token<'s>>,

    /// The index of the token currently being considered.
    current: usize,

    /// The statements parsed so far.
    statements: Vec<SpanStmt>,
}

impl<'s> Parser<'s> {
    /// Parse the given list of tokens.
    ///
    /// Parse errors are reported as they are found; after one, the parser
    /// synchronizes to the next statement boundary and keeps going, so the
    /// returned statements are only meaningful if no error was reported.
    pub fn parse(tokens: Vec<Token<'s>>) -> Vec<SpanStmt> {
        let mut parser = Self {
            tokens,
            current: 0,
            statements: Vec::new(),
        };

        while !parser.is_at_end() {
            if let Some(stmt) = parser.parse_declaration() {
                parser.statements.push(stmt);
            }
        }

        parser.statements
    }

    /// Get the current token.
    #[inline]
    fn peek(&self) -> Option<&Token<'s>> {
        self.tokens.get(self.current)
    }

    /// Get the most recently consumed token.
    #[inline]
    fn previous(&self) -> Option<&Token<'s>> {
        self.tokens.get(self.current.saturating_sub(1))
    }

    /// Are we at the end of the token list?
    #[inline]
    fn is_at_end(&self) -> bool {
        self.check(TokenKind::Eof)
    }

    /// Consume and return the current token.
    fn advance(&mut self) -> Token<'s> {
        if !self.is_at_end() {
            self.current += 1;
        }
        *self.previous().unwrap()
    }

    /// Is the current token of the given kind?
    #[inline]
    fn check(&self, kind: TokenKind) -> bool {
        self.peek().is_some_and(|t| t.kind == kind)
    }

    /// If the current token is one of the given kinds, consume it.
    fn match_kinds(&mut self, kinds: impl IntoIterator<Item = TokenKind>) -> bool {
        for kind in kinds {
            if self.check(kind) {
                self.advance();
                return true;
            }
        }

        false
    }

    /// Consume a token of the given kind, or fail with the given message.
    fn consume(&mut self, kind: TokenKind, message: &str) -> ParseResult<'s, Token<'s>> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(ParseError {
                token: *self.peek().unwrap(),
                message: message.to_string(),
            })
        }
    }

    /// Discard tokens until a likely statement boundary, so that one parse
    /// error doesn't cascade into spurious errors for the rest of the file.
    fn synchronize(&mut self) {
        use TokenKind::*;

        self.advance();

        while !self.is_at_end() {
            if self.previous().is_some_and(|t| t.kind == Semicolon) {
                return;
            }

            match self.peek().map(|t| t.kind) {
                Some(Class | Fun | Var | For | If | While | Print | Return) => return,
                _ => {}
            }

            self.advance();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{pretty_printers::ParenPrinter, scanner::Scanner};

    /// Parse the code and print it back with clarifying parens.
    fn parsed(code: &str) -> String {
        ParenPrinter::print_stmts(&Parser::parse(Scanner::scan_tokens(code)))
    }

    #[test]
    fn precedence() {
        assert_eq!(parsed("print 1 + 2 * 3;"), "print (1 + (2 * 3));");
        assert_eq!(parsed("print (1 + 2) * 3;"), "print ((1 + 2) * 3);");
        assert_eq!(parsed("print 1 < 2 == true;"), "print ((1 < 2) == true);");
        assert_eq!(parsed("print -1 - -2;"), "print ((-1) - (-2));");
        assert_eq!(parsed("print a or b and c;"), "print (a or (b and c));");
    }

    #[test]
    fn call_and_property_chains() {
        assert_eq!(parsed("f(1)(2);"), "f(1)(2);");
        assert_eq!(parsed("a.b.c = 3;"), "((a).b).c = 3;");
        assert_eq!(parsed("obj.method(x, y);"), "(obj).method(x, y);");
    }

    #[test]
    fn for_loops_desugar_to_while() {
        assert_eq!(
            parsed("for (var i = 0; i < 3; i = i + 1) print i;"),
            "{\nvar i = 0;\nwhile ((i < 3)) {\nprint i;\ni = (i + 1);\n}\n}"
        );
        assert_eq!(parsed("for (;;) print 1;"), "while (true) print 1;");
    }

    #[test]
    fn class_declarations() {
        assert_eq!(
            parsed("class Pie < Dessert { init(filling) { this.filling = filling; } }"),
            "class Pie < Dessert {\ninit(filling) {\n(this).filling = filling;\n}\n}"
        );
    }

    #[test]
    fn super_calls() {
        assert_eq!(
            parsed("class B < A { m() { return super.m(); } }"),
            "class B < A {\nm() {\nreturn super.m();\n}\n}"
        );
    }

    #[test]
    fn round_trip_is_stable() {
        // Printing a parse and re-parsing the result must reach a fixed point.
        let code = "\
            fun fib(n) { if (n < 2) return n; return fib(n - 1) + fib(n - 2); }\n\
            for (var i = 0; i < 10; i = i + 1) print fib(i);\n\
            var msg = \"done\" + \"!\";\n\
            while (false) msg = nil;\n";
        let once = parsed(code);
        let twice = parsed(&once);
        assert_eq!(once, twice);
    }
}
