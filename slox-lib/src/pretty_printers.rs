//! This module provides a canonical printer for the AST.

use crate::ast::{Expr, FunctionDecl, SpanExpr, SpanStmt, Stmt};

/// Print the AST back as source with clarifying parentheses.
///
/// The output is canonical: printing, re-parsing, and printing again yields
/// the same text, which the parser tests use as a round-trip property.
/// Groupings are printed transparently since the printer already adds the
/// parens that matter.
pub struct ParenPrinter;

impl ParenPrinter {
    /// Print the statements, one per line.
    pub fn print_stmts(stmts: &[SpanStmt]) -> String {
        stmts
            .iter()
            .map(Self::print_stmt)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Print a single statement.
    pub fn print_stmt(stmt: &SpanStmt) -> String {
        match &stmt.item {
            Stmt::Expression(expr) => format!("{};", Self::print_expr(expr)),
            Stmt::Print(expr) => format!("print {};", Self::print_expr(expr)),
            Stmt::VarDecl(name, initializer) => match initializer {
                Some(expr) => format!("var {} = {};", name.item, Self::print_expr(expr)),
                None => format!("var {};", name.item),
            },
            Stmt::FunDecl(decl) => format!("fun {}", Self::print_function(decl)),
            Stmt::ClassDecl {
                name,
                superclass,
                methods,
            } => format!(
                "class {}{} {{\n{}\n}}",
                name.item,
                superclass
                    .as_ref()
                    .map(|superclass| format!(" < {}", superclass.item))
                    .unwrap_or_default(),
                methods
                    .iter()
                    .map(|method| Self::print_function(method))
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
            Stmt::If(condition, then_branch, else_branch) => {
                let mut printed = format!(
                    "if ({}) {}",
                    Self::print_expr(condition),
                    Self::print_stmt(then_branch)
                );
                if let Some(else_branch) = else_branch {
                    printed.push_str(&format!(" else {}", Self::print_stmt(else_branch)));
                }
                printed
            }
            Stmt::While(condition, body) => format!(
                "while ({}) {}",
                Self::print_expr(condition),
                Self::print_stmt(body)
            ),
            Stmt::Return(_, value) => match value {
                Some(expr) => format!("return {};", Self::print_expr(expr)),
                None => "return;".to_string(),
            },
            Stmt::Block(stmts) => format!("{{\n{}\n}}", Self::print_stmts(stmts)),
        }
    }

    /// Print a function or method declaration without any leading keyword.
    fn print_function(decl: &FunctionDecl) -> String {
        format!(
            "{}({}) {{\n{}\n}}",
            decl.name.item,
            decl.params
                .iter()
                .map(|param| param.item.clone())
                .collect::<Vec<_>>()
                .join(", "),
            Self::print_stmts(&decl.body),
        )
    }

    /// Print a single expression.
    pub fn print_expr(expr: &SpanExpr) -> String {
        match &expr.item {
            Expr::Nil => "nil".to_string(),
            Expr::Boolean(boolean) => boolean.to_string(),
            Expr::Number(number) => number.to_string(),
            Expr::String(string) => format!("{string:?}"),
            Expr::Grouping(inner) => Self::print_expr(inner),
            Expr::Unary(operator, operand) => {
                format!("({}{})", operator.item, Self::print_expr(operand))
            }
            Expr::Binary(left, operator, right) => format!(
                "({} {} {})",
                Self::print_expr(left),
                operator.item,
                Self::print_expr(right)
            ),
            Expr::Logical(left, operator, right) => format!(
                "({} {} {})",
                Self::print_expr(left),
                operator.item,
                Self::print_expr(right)
            ),
            Expr::Variable(name) => name.clone(),
            Expr::Assign(name, value) => format!("{} = {}", name.item, Self::print_expr(value)),
            Expr::Call(callee, arguments, _) => format!(
                "{}({})",
                Self::print_expr(callee),
                arguments
                    .iter()
                    .map(Self::print_expr)
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            Expr::Get(object, name) => format!("({}).{}", Self::print_expr(object), name.item),
            Expr::Set(object, name, value) => format!(
                "({}).{} = {}",
                Self::print_expr(object),
                name.item,
                Self::print_expr(value)
            ),
            Expr::This => "this".to_string(),
            Expr::Super(_, method) => format!("super.{}", method.item),
        }
    }
}
