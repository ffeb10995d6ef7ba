//! This module provides the native functions pre-defined in the globals.

use slox_lib::{
    callable::SloxCallable,
    interpreter::{Interpreter, RuntimeError},
    object::{SloxObject, SpanObject},
    span::Span,
};
use std::{rc::Rc, time};

/// Every native function, ready to be defined in a fresh global environment.
pub fn all() -> Vec<Rc<dyn SloxCallable>> {
    vec![Rc::new(Clock), Rc::new(Pow), Rc::new(Str)]
}

/// Return the current wall-clock time as fractional seconds since the Unix
/// epoch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Clock;

impl SloxCallable for Clock {
    fn name(&self) -> &str {
        "clock"
    }

    fn arity(&self) -> u8 {
        0
    }

    fn call(
        &self,
        _interpreter: &mut dyn Interpreter,
        _arguments: &[SpanObject],
        call_span: Span,
    ) -> Result<SloxObject, RuntimeError> {
        let elapsed = time::SystemTime::now()
            .duration_since(time::UNIX_EPOCH)
            .map_err(|error| RuntimeError {
                message: format!("NATIVE FUNCTION INTERNAL ERROR: {error:?}"),
                span: call_span,
            })?;

        Ok(SloxObject::Number(elapsed.as_secs_f64()))
    }
}

/// Raise a base number to an exponent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pow;

impl SloxCallable for Pow {
    fn name(&self) -> &str {
        "pow"
    }

    fn arity(&self) -> u8 {
        2
    }

    fn call(
        &self,
        _interpreter: &mut dyn Interpreter,
        arguments: &[SpanObject],
        _call_span: Span,
    ) -> Result<SloxObject, RuntimeError> {
        let [base, exponent] = arguments else {
            unreachable!("The evaluator checks arity before calling");
        };

        let SloxObject::Number(base) = &base.item else {
            return Err(RuntimeError {
                message: format!("Expected a number but got a {}.", base.type_name()),
                span: base.span,
            });
        };
        let SloxObject::Number(exponent) = &exponent.item else {
            return Err(RuntimeError {
                message: format!("Expected a number but got a {}.", exponent.type_name()),
                span: exponent.span,
            });
        };

        Ok(SloxObject::Number(base.powf(*exponent)))
    }
}

/// Convert any value to the string `print` would show for it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Str;

impl SloxCallable for Str {
    fn name(&self) -> &str {
        "str"
    }

    fn arity(&self) -> u8 {
        1
    }

    fn call(
        &self,
        _interpreter: &mut dyn Interpreter,
        arguments: &[SpanObject],
        _call_span: Span,
    ) -> Result<SloxObject, RuntimeError> {
        let [value] = arguments else {
            unreachable!("The evaluator checks arity before calling");
        };

        Ok(SloxObject::String(value.item.print()))
    }
}
