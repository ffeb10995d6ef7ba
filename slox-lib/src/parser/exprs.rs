//! This module lets the [`Parser`] parse expressions.

use super::{ParseError, ParseResult, Parser};
use crate::{
    ast::{BinaryOp, Expr, LogicalOp, SpanExpr, UnaryOp},
    slox::report_token_error,
    span::Spanned,
    tokens::{Literal, TokenKind},
};

/// Map a freshly matched operator token to its [`BinaryOp`].
fn binary_op(kind: TokenKind) -> BinaryOp {
    match kind {
        TokenKind::Slash => BinaryOp::Slash,
        TokenKind::Star => BinaryOp::Star,
        TokenKind::Plus => BinaryOp::Plus,
        TokenKind::Minus => BinaryOp::Minus,
        TokenKind::Greater => BinaryOp::Greater,
        TokenKind::GreaterEqual => BinaryOp::GreaterEqual,
        TokenKind::Less => BinaryOp::Less,
        TokenKind::LessEqual => BinaryOp::LessEqual,
        TokenKind::BangEqual => BinaryOp::BangEqual,
        TokenKind::EqualEqual => BinaryOp::EqualEqual,
        _ => unreachable!("binary_op is only called with binary operator tokens"),
    }
}

impl<'s> Parser<'s> {
    /// expression → assignment ;
    pub(super) fn parse_expression(&mut self) -> ParseResult<'s, SpanExpr> {
        self.parse_assignment()
    }

    /// assignment → ( call "." )? IDENTIFIER "=" assignment | logic_or ;
    ///
    /// The left-hand side is parsed as an ordinary expression and then
    /// rewritten: a `Variable` becomes an `Assign` target and a `Get` becomes
    /// a `Set` target. Anything else is reported without raising a parse
    /// error, since the parser is in a perfectly good state to continue.
    fn parse_assignment(&mut self) -> ParseResult<'s, SpanExpr> {
        let expr = self.parse_logic_or()?;

        if self.match_kinds([TokenKind::Equal]) {
            let equals = *self.previous().unwrap();
            let value = self.parse_assignment()?;

            return Ok(match expr.item {
                Expr::Variable(name) => {
                    let name = Spanned::new(expr.span, name);
                    Spanned::new(expr.span.to(value.span), Expr::Assign(name, Box::new(value)))
                }
                Expr::Get(object, property) => Spanned::new(
                    expr.span.to(value.span),
                    Expr::Set(object, property, Box::new(value)),
                ),
                other => {
                    report_token_error(&equals, "Invalid assignment target.");
                    Spanned::new(expr.span, other)
                }
            });
        }

        Ok(expr)
    }

    /// logic_or → logic_and ( "or" logic_and )* ;
    fn parse_logic_or(&mut self) -> ParseResult<'s, SpanExpr> {
        let mut expr = self.parse_logic_and()?;

        while self.match_kinds([TokenKind::Or]) {
            let operator = Spanned::new(self.previous().unwrap().span, LogicalOp::Or);
            let right = self.parse_logic_and()?;

            let span = expr.span.to(right.span);
            expr = Spanned::new(span, Expr::Logical(Box::new(expr), operator, Box::new(right)));
        }

        Ok(expr)
    }

    /// logic_and → equality ( "and" equality )* ;
    fn parse_logic_and(&mut self) -> ParseResult<'s, SpanExpr> {
        let mut expr = self.parse_equality()?;

        while self.match_kinds([TokenKind::And]) {
            let operator = Spanned::new(self.previous().unwrap().span, LogicalOp::And);
            let right = self.parse_equality()?;

            let span = expr.span.to(right.span);
            expr = Spanned::new(span, Expr::Logical(Box::new(expr), operator, Box::new(right)));
        }

        Ok(expr)
    }

    /// equality → comparison ( ( "!=" | "==" ) comparison )* ;
    fn parse_equality(&mut self) -> ParseResult<'s, SpanExpr> {
        self.parse_binary_level(
            [TokenKind::BangEqual, TokenKind::EqualEqual],
            Self::parse_comparison,
        )
    }

    /// comparison → term ( ( ">" | ">=" | "<" | "<=" ) term )* ;
    fn parse_comparison(&mut self) -> ParseResult<'s, SpanExpr> {
        self.parse_binary_level(
            [
                TokenKind::Greater,
                TokenKind::GreaterEqual,
                TokenKind::Less,
                TokenKind::LessEqual,
            ],
            Self::parse_term,
        )
    }

    /// term → factor ( ( "-" | "+" ) factor )* ;
    fn parse_term(&mut self) -> ParseResult<'s, SpanExpr> {
        self.parse_binary_level([TokenKind::Minus, TokenKind::Plus], Self::parse_factor)
    }

    /// factor → unary ( ( "/" | "*" ) unary )* ;
    fn parse_factor(&mut self) -> ParseResult<'s, SpanExpr> {
        self.parse_binary_level([TokenKind::Slash, TokenKind::Star], Self::parse_unary)
    }

    /// Parse one left-associative level of binary operators.
    fn parse_binary_level<const N: usize>(
        &mut self,
        operators: [TokenKind; N],
        next_level: fn(&mut Self) -> ParseResult<'s, SpanExpr>,
    ) -> ParseResult<'s, SpanExpr> {
        let mut expr = next_level(self)?;

        while self.match_kinds(operators) {
            let token = self.previous().unwrap();
            let operator = Spanned::new(token.span, binary_op(token.kind));
            let right = next_level(self)?;

            let span = expr.span.to(right.span);
            expr = Spanned::new(span, Expr::Binary(Box::new(expr), operator, Box::new(right)));
        }

        Ok(expr)
    }

    /// unary → ( "!" | "-" ) unary | call ;
    fn parse_unary(&mut self) -> ParseResult<'s, SpanExpr> {
        if self.match_kinds([TokenKind::Bang, TokenKind::Minus]) {
            let token = self.previous().unwrap();
            let operator = Spanned::new(
                token.span,
                match token.kind {
                    TokenKind::Bang => UnaryOp::Bang,
                    TokenKind::Minus => UnaryOp::Minus,
                    _ => unreachable!(),
                },
            );

            let right = self.parse_unary()?;
            let span = operator.span.to(right.span);
            Ok(Spanned::new(span, Expr::Unary(operator, Box::new(right))))
        } else {
            self.parse_call()
        }
    }

    /// call → primary ( "(" arguments? ")" | "." IDENTIFIER )* ;
    fn parse_call(&mut self) -> ParseResult<'s, SpanExpr> {
        let mut expr = self.parse_primary()?;

        loop {
            if self.match_kinds([TokenKind::LeftParen]) {
                expr = self.finish_call(expr)?;
            } else if self.match_kinds([TokenKind::Dot]) {
                let token = self.consume(TokenKind::Identifier, "Expected property name after '.'.")?;
                let name = Spanned::new(token.span, token.lexeme.to_string());
                expr = Spanned::new(
                    expr.span.to(token.span),
                    Expr::Get(Box::new(expr), name),
                );
            } else {
                break;
            }
        }

        Ok(expr)
    }

    /// arguments → expression ( "," expression )* ;
    fn finish_call(&mut self, callee: SpanExpr) -> ParseResult<'s, SpanExpr> {
        let mut arguments: Vec<SpanExpr> = Vec::new();

        if !self.check(TokenKind::RightParen) {
            loop {
                if arguments.len() >= 255 {
                    // Report but keep parsing; this is not fatal.
                    report_token_error(
                        self.peek().unwrap(),
                        "Can't have more than 255 arguments.",
                    );
                }

                arguments.push(self.parse_expression()?);

                if !self.match_kinds([TokenKind::Comma]) {
                    break;
                }
            }
        }

        let close_paren = self.consume(TokenKind::RightParen, "Expected ')' after arguments.")?;

        Ok(Spanned::new(
            callee.span.to(close_paren.span),
            Expr::Call(Box::new(callee), arguments, close_paren.span),
        ))
    }

    /// primary → "true" | "false" | "nil" | "this" | "super" "." IDENTIFIER
    ///         | NUMBER | STRING | IDENTIFIER | "(" expression ")" ;
    fn parse_primary(&mut self) -> ParseResult<'s, SpanExpr> {
        use TokenKind::*;

        if self.match_kinds([True, False, Nil, This, Super, Number, String, Identifier, LeftParen])
        {
            let token = *self.previous().unwrap();
            let mut span = token.span;

            let value = match token.kind {
                True => Expr::Boolean(true),
                False => Expr::Boolean(false),
                Nil => Expr::Nil,
                This => Expr::This,
                Super => {
                    self.consume(Dot, "Expected '.' after 'super'.")?;
                    let method = self.consume(Identifier, "Expected superclass method name.")?;
                    span.extend(method.span);
                    Expr::Super(token.span, Spanned::new(method.span, method.lexeme.to_string()))
                }
                Number => {
                    let Some(Literal::Number(number)) = token.literal else {
                        unreachable!("Number tokens always carry a number literal")
                    };
                    Expr::Number(number)
                }
                String => {
                    let Some(Literal::String(string)) = token.literal else {
                        unreachable!("String tokens always carry a string literal")
                    };
                    Expr::String(string.to_string())
                }
                Identifier => Expr::Variable(token.lexeme.to_string()),
                LeftParen => {
                    let expr = self.parse_expression()?;
                    let close = self.consume(RightParen, "Expected ')' after expression.")?;
                    span.extend(close.span);
                    Expr::Grouping(Box::new(expr))
                }
                _ => unreachable!("match_kinds only consumes the kinds we listed"),
            };

            Ok(Spanned::new(span, value))
        } else {
            Err(ParseError {
                token: *self.peek().unwrap(),
                message: "Expected expression.".to_string(),
            })
        }
    }
}
