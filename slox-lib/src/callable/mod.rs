//! This module provides the [`SloxCallable`] trait.

pub mod function;

use crate::{
    interpreter::{Interpreter, RuntimeError},
    object::{SloxObject, SpanObject},
    span::Span,
};
use std::fmt;

/// Anything that can be invoked with a call expression: user functions,
/// classes, and native functions.
pub trait SloxCallable: fmt::Debug {
    /// The name of this callable.
    fn name(&self) -> &str;

    /// The number of arguments this callable takes.
    fn arity(&self) -> u8;

    /// Invoke the callable.
    ///
    /// The evaluator has already checked the argument count against
    /// [`arity`](SloxCallable::arity), so implementors may assume it matches.
    /// `call_span` covers the whole call expression and is used for error
    /// spans raised from inside the callable.
    fn call(
        &self,
        interpreter: &mut dyn Interpreter,
        arguments: &[SpanObject],
        call_span: Span,
    ) -> Result<SloxObject, RuntimeError>;
}
