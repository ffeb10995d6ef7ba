//! This module provides the [`Interpreter`] trait and its result types.

use crate::{
    ast::SpanStmt,
    environment::EnvRef,
    object::{SloxObject, SpanObject},
    span::Span,
};
use std::fmt;
use thiserror::Error;

/// An error encountered by the interpreter at runtime.
#[derive(Clone, Debug, PartialEq, Error)]
pub struct RuntimeError {
    /// The error message.
    pub message: String,

    /// The span of the offending token or operator.
    pub span: Span,
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RuntimeError({:?})", self.message)
    }
}

/// Either a runtime error, or the control signal for returning from a function.
///
/// A [`Return`](ErrorOrReturn::Return) is not an error: it unwinds evaluation
/// only until the nearest enclosing function invocation consumes it, and it is
/// never shown to the user.
pub enum ErrorOrReturn {
    /// A [`RuntimeError`] to propagate all the way up.
    Error(RuntimeError),

    /// Return the given value from the current function.
    Return(SpanObject),
}

impl From<RuntimeError> for ErrorOrReturn {
    fn from(value: RuntimeError) -> Self {
        Self::Error(value)
    }
}

/// A result wrapping an [`ErrorOrReturn`].
pub type Result<T, E = ErrorOrReturn> = ::std::result::Result<T, E>;

/// The seam between the language library and a concrete evaluator.
pub trait Interpreter {
    /// Create a new interpreter with a fresh global environment.
    fn new() -> Self
    where
        Self: Sized;

    /// Get a handle to the interpreter's current environment.
    fn get_current_env(&self) -> EnvRef;

    /// Run the given statements, reporting (not returning) any error found.
    ///
    /// When the run completes cleanly and its final statement was an
    /// expression statement, that expression's value is returned so the REPL
    /// can echo it; otherwise `None`.
    ///
    /// This is the long-lived entry point: calling it repeatedly on the same
    /// interpreter keeps the globals from previous calls, which is what makes
    /// REPL state persist across lines.
    fn interpret(&mut self, stmts: &[SpanStmt]) -> Option<SloxObject>;

    /// Execute the given statements as a block.
    ///
    /// If `environment` is `Some`, run them in that environment; otherwise
    /// create a fresh one enclosing the current environment. Either way the
    /// previous environment must be restored on every exit path.
    fn execute_block(&mut self, stmts: &[SpanStmt], environment: Option<EnvRef>) -> Result<()>;
}
