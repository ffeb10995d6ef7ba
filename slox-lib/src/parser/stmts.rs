//! This module lets the [`Parser`] parse statements.

use super::{ParseResult, Parser};
use crate::{
    ast::{Expr, FunctionDecl, SpanStmt, Stmt},
    slox::report_token_error,
    span::Spanned,
    tokens::TokenKind,
};
use std::{fmt, rc::Rc};

/// The kind of function declaration being parsed, for error messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FunDeclKind {
    /// A free function.
    Function,

    /// A method in a class body.
    Method,
}

impl fmt::Display for FunDeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Function => "function",
            Self::Method => "method",
        })
    }
}

impl<'s> Parser<'s> {
    /// declaration → classDecl | funDecl | varDecl | statement ;
    ///
    /// This is the synchronization point for panic-mode recovery: a parse
    /// error anywhere below is reported here, the parser skips to the next
    /// statement boundary, and `None` is returned for the bad declaration.
    pub(super) fn parse_declaration(&mut self) -> Option<SpanStmt> {
        let result = if self.match_kinds([TokenKind::Class]) {
            self.parse_class_decl()
        } else if self.match_kinds([TokenKind::Fun]) {
            self.parse_function(FunDeclKind::Function)
                .map(|decl| decl.map(|func| Stmt::FunDecl(Rc::new(func))))
        } else if self.match_kinds([TokenKind::Var]) {
            self.parse_var_decl()
        } else {
            self.parse_statement()
        };

        match result {
            Ok(stmt) => Some(stmt),
            Err(error) => {
                error.report();
                self.synchronize();
                None
            }
        }
    }

    /// function → IDENTIFIER "(" parameters? ")" block ;
    /// parameters → IDENTIFIER ( "," IDENTIFIER )* ;
    fn parse_function(&mut self, kind: FunDeclKind) -> ParseResult<'s, Spanned<FunctionDecl>> {
        let name = {
            let token = self.consume(TokenKind::Identifier, &format!("Expected {kind} name."))?;
            Spanned::new(token.span, token.lexeme.to_string())
        };
        let mut span = name.span;

        self.consume(TokenKind::LeftParen, &format!("Expected '(' after {kind} name."))?;

        let mut params: Vec<Spanned<String>> = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                if params.len() >= 255 {
                    // Report but keep parsing; this is not fatal.
                    report_token_error(
                        self.peek().unwrap(),
                        "Can't have more than 255 parameters.",
                    );
                }

                let token = self.consume(TokenKind::Identifier, "Expected parameter name.")?;
                params.push(Spanned::new(token.span, token.lexeme.to_string()));

                if !self.match_kinds([TokenKind::Comma]) {
                    break;
                }
            }
        }

        self.consume(
            TokenKind::RightParen,
            &format!("Expected ')' after {kind} parameters."),
        )?;
        self.consume(
            TokenKind::LeftBrace,
            &format!("Expected '{{' before {kind} body."),
        )?;

        let body = self.parse_block()?;
        span.extend(body.span);

        Ok(Spanned::new(
            span,
            FunctionDecl {
                name,
                params,
                body: body.item,
            },
        ))
    }

    /// classDecl → "class" IDENTIFIER ( "<" IDENTIFIER )? "{" function* "}" ;
    fn parse_class_decl(&mut self) -> ParseResult<'s, SpanStmt> {
        let mut span = self.previous().unwrap().span;

        let name = {
            let token = self.consume(TokenKind::Identifier, "Expected class name.")?;
            Spanned::new(token.span, token.lexeme.to_string())
        };

        let superclass = if self.match_kinds([TokenKind::Less]) {
            let token = self.consume(TokenKind::Identifier, "Expected superclass name.")?;
            Some(Spanned::new(token.span, token.lexeme.to_string()))
        } else {
            None
        };

        self.consume(TokenKind::LeftBrace, "Expected '{' before class body.")?;

        let mut methods = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            methods.push(Rc::new(self.parse_function(FunDeclKind::Method)?.item));
        }

        let right_brace = self.consume(TokenKind::RightBrace, "Expected '}' after class body.")?;
        span.extend(right_brace.span);

        Ok(Spanned::new(
            span,
            Stmt::ClassDecl {
                name,
                superclass,
                methods,
            },
        ))
    }

    /// varDecl → "var" IDENTIFIER ( "=" expression )? ";" ;
    fn parse_var_decl(&mut self) -> ParseResult<'s, SpanStmt> {
        let mut span = self.previous().unwrap().span;

        let name = {
            let token = self.consume(TokenKind::Identifier, "Expected variable name.")?;
            Spanned::new(token.span, token.lexeme.to_string())
        };

        let initializer = if self.match_kinds([TokenKind::Equal]) {
            Some(self.parse_expression()?)
        } else {
            None
        };

        let semicolon =
            self.consume(TokenKind::Semicolon, "Expected ';' after variable declaration.")?;
        span.extend(semicolon.span);

        Ok(Spanned::new(span, Stmt::VarDecl(name, initializer)))
    }

    /// statement → exprStmt | forStmt | ifStmt | printStmt | returnStmt | whileStmt | block ;
    fn parse_statement(&mut self) -> ParseResult<'s, SpanStmt> {
        if self.match_kinds([TokenKind::For]) {
            self.parse_for_statement()
        } else if self.match_kinds([TokenKind::If]) {
            self.parse_if_statement()
        } else if self.match_kinds([TokenKind::Print]) {
            self.parse_print_statement()
        } else if self.match_kinds([TokenKind::Return]) {
            self.parse_return_statement()
        } else if self.match_kinds([TokenKind::While]) {
            self.parse_while_statement()
        } else if self.match_kinds([TokenKind::LeftBrace]) {
            Ok(self.parse_block()?.map(Stmt::Block))
        } else {
            self.parse_expr_statement()
        }
    }

    /// exprStmt → expression ";" ;
    fn parse_expr_statement(&mut self) -> ParseResult<'s, SpanStmt> {
        let expr = self.parse_expression()?;
        let semicolon = self.consume(TokenKind::Semicolon, "Expected ';' after expression.")?;

        let span = expr.span.to(semicolon.span);
        Ok(Spanned::new(span, Stmt::Expression(expr)))
    }

    /// forStmt → "for" "(" ( varDecl | exprStmt | ";" ) expression? ";" expression? ")" statement ;
    ///
    /// The loop is desugared here: `for (I; C; U) B` becomes
    /// `{ I; while (C) { B; U; } }`, with a `true` condition when `C` is
    /// omitted, no inner block when `U` is omitted, and no outer block when
    /// `I` is omitted. The evaluator and resolver never see a `for` loop.
    fn parse_for_statement(&mut self) -> ParseResult<'s, SpanStmt> {
        let for_span = self.previous().unwrap().span;
        self.consume(TokenKind::LeftParen, "Expected '(' after 'for'.")?;

        let initializer = if self.match_kinds([TokenKind::Semicolon]) {
            None
        } else if self.match_kinds([TokenKind::Var]) {
            Some(self.parse_var_decl()?)
        } else {
            Some(self.parse_expr_statement()?)
        };

        let condition = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.consume(TokenKind::Semicolon, "Expected ';' after loop condition.")?;

        let increment = if self.check(TokenKind::RightParen) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        let close_paren = self.consume(TokenKind::RightParen, "Expected ')' after for clauses.")?;

        let mut body = self.parse_statement()?;
        let full_span = for_span.to(body.span);

        if let Some(increment) = increment {
            let increment_span = increment.span;
            let block_span = body.span.to(increment_span);
            body = Spanned::new(
                block_span,
                Stmt::Block(vec![
                    body,
                    Spanned::new(increment_span, Stmt::Expression(increment)),
                ]),
            );
        }

        let condition = condition.unwrap_or_else(|| {
            // An omitted condition is an infinite loop.
            Spanned::new(close_paren.span, Expr::Boolean(true))
        });
        body = Spanned::new(full_span, Stmt::While(condition, Box::new(body)));

        if let Some(initializer) = initializer {
            body = Spanned::new(full_span, Stmt::Block(vec![initializer, body]));
        }

        Ok(body)
    }

    /// ifStmt → "if" "(" expression ")" statement ( "else" statement )? ;
    fn parse_if_statement(&mut self) -> ParseResult<'s, SpanStmt> {
        let mut span = self.previous().unwrap().span;

        self.consume(TokenKind::LeftParen, "Expected '(' after 'if'.")?;
        let condition = self.parse_expression()?;
        self.consume(TokenKind::RightParen, "Expected ')' after if condition.")?;

        let then_branch = self.parse_statement()?;
        span.extend(then_branch.span);

        let else_branch = if self.match_kinds([TokenKind::Else]) {
            let stmt = self.parse_statement()?;
            span.extend(stmt.span);
            Some(Box::new(stmt))
        } else {
            None
        };

        Ok(Spanned::new(
            span,
            Stmt::If(condition, Box::new(then_branch), else_branch),
        ))
    }

    /// printStmt → "print" expression ";" ;
    fn parse_print_statement(&mut self) -> ParseResult<'s, SpanStmt> {
        let mut span = self.previous().unwrap().span;

        let expr = self.parse_expression()?;
        let semicolon = self.consume(TokenKind::Semicolon, "Expected ';' after value.")?;
        span.extend(semicolon.span);

        Ok(Spanned::new(span, Stmt::Print(expr)))
    }

    /// returnStmt → "return" expression? ";" ;
    fn parse_return_statement(&mut self) -> ParseResult<'s, SpanStmt> {
        let keyword_span = self.previous().unwrap().span;

        let value = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };

        let semicolon = self.consume(TokenKind::Semicolon, "Expected ';' after return value.")?;

        Ok(Spanned::new(
            keyword_span.to(semicolon.span),
            Stmt::Return(keyword_span, value),
        ))
    }

    /// whileStmt → "while" "(" expression ")" statement ;
    fn parse_while_statement(&mut self) -> ParseResult<'s, SpanStmt> {
        let mut span = self.previous().unwrap().span;

        self.consume(TokenKind::LeftParen, "Expected '(' after 'while'.")?;
        let condition = self.parse_expression()?;
        self.consume(TokenKind::RightParen, "Expected ')' after while condition.")?;

        let body = self.parse_statement()?;
        span.extend(body.span);

        Ok(Spanned::new(span, Stmt::While(condition, Box::new(body))))
    }

    /// block → "{" declaration* "}" ;
    ///
    /// Returns the statements and the span including both braces, without
    /// wrapping them in [`Stmt::Block`], since function bodies want the bare
    /// statement list.
    fn parse_block(&mut self) -> ParseResult<'s, Spanned<Vec<SpanStmt>>> {
        let mut span = self.previous().unwrap().span;
        let mut stmts = Vec::new();

        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            if let Some(stmt) = self.parse_declaration() {
                span.extend(stmt.span);
                stmts.push(stmt);
            }
        }

        let right_brace = self.consume(TokenKind::RightBrace, "Expected '}' after block.")?;
        span.extend(right_brace.span);

        Ok(Spanned::new(span, stmts))
    }
}
