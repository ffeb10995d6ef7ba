//! This module defines the AST that the parser produces and the evaluator walks.

use crate::span::{Span, Spanned};
use std::{fmt, rc::Rc};

/// A binary operator, covering arithmetic, comparison, and equality.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum BinaryOp {
    Slash,
    Star,
    Plus,
    Minus,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    BangEqual,
    EqualEqual,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Slash => "/",
            Self::Star => "*",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Greater => ">",
            Self::GreaterEqual => ">=",
            Self::Less => "<",
            Self::LessEqual => "<=",
            Self::BangEqual => "!=",
            Self::EqualEqual => "==",
        })
    }
}

/// A short-circuiting logic operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum LogicalOp {
    And,
    Or,
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::And => "and",
            Self::Or => "or",
        })
    }
}

/// A unary operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum UnaryOp {
    Bang,
    Minus,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Bang => "!",
            Self::Minus => "-",
        })
    }
}

/// An [`Expr`] wrapped in [`Spanned`].
pub type SpanExpr = Spanned<Expr>;

/// Every kind of expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// The `nil` literal.
    Nil,

    /// A boolean literal.
    Boolean(bool),

    /// A numeric literal.
    Number(f64),

    /// A string literal.
    String(String),

    /// Parens around an expression.
    Grouping(Box<SpanExpr>),

    /// (operator, operand).
    Unary(Spanned<UnaryOp>, Box<SpanExpr>),

    /// (left, operator, right).
    Binary(Box<SpanExpr>, Spanned<BinaryOp>, Box<SpanExpr>),

    /// (left, operator, right). Unlike [`Binary`](Expr::Binary), the right
    /// operand is only evaluated when the left doesn't short-circuit.
    Logical(Box<SpanExpr>, Spanned<LogicalOp>, Box<SpanExpr>),

    /// A reference to a variable by name.
    Variable(String),

    /// (name, new value).
    Assign(Spanned<String>, Box<SpanExpr>),

    /// (callee, arguments, span of the closing paren).
    Call(Box<SpanExpr>, Vec<SpanExpr>, Span),

    /// (object, property name).
    Get(Box<SpanExpr>, Spanned<String>),

    /// (object, property name, new value).
    Set(Box<SpanExpr>, Spanned<String>, Box<SpanExpr>),

    /// The `this` keyword.
    This,

    /// (span of the `super` keyword, method name).
    Super(Span, Spanned<String>),
}

/// A [`Stmt`] wrapped in [`Spanned`].
pub type SpanStmt = Spanned<Stmt>;

/// A function or method declaration.
///
/// Shared behind an [`Rc`] so that the runtime function value can hold the
/// declaration without cloning the body.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionDecl {
    /// The name of the function.
    pub name: Spanned<String>,

    /// The parameter names.
    pub params: Vec<Spanned<String>>,

    /// The statements in the body.
    pub body: Vec<SpanStmt>,
}

/// Every kind of statement.
#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    /// An expression evaluated for its side effects.
    Expression(SpanExpr),

    /// (expression to print).
    Print(SpanExpr),

    /// (name, optional initializer).
    VarDecl(Spanned<String>, Option<SpanExpr>),

    /// A function declaration.
    FunDecl(Rc<FunctionDecl>),

    /// A class declaration.
    ClassDecl {
        /// The name of the class.
        name: Spanned<String>,

        /// The name of the superclass, if the class has one.
        superclass: Option<Spanned<String>>,

        /// The methods of the class.
        methods: Vec<Rc<FunctionDecl>>,
    },

    /// (condition, then branch, else branch).
    If(SpanExpr, Box<SpanStmt>, Option<Box<SpanStmt>>),

    /// (condition, body).
    While(SpanExpr, Box<SpanStmt>),

    /// (span of the `return` keyword, optional value).
    Return(Span, Option<SpanExpr>),

    /// A braced block of statements, run in their own scope.
    Block(Vec<SpanStmt>),
}
