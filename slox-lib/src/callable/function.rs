//! This module provides [`SloxFunction`], a function declared in Slox code.

use crate::{
    ast::FunctionDecl,
    callable::SloxCallable,
    environment::{EnvRef, Environment},
    interpreter::{ErrorOrReturn, Interpreter, RuntimeError},
    object::{SloxObject, SpanObject},
    span::{Span, Spanned},
};
use std::{fmt, rc::Rc};

/// A function or method declared in Slox code, closed over the environment
/// that was current at its declaration.
#[derive(Clone)]
pub struct SloxFunction {
    /// The declaration that produced this function.
    declaration: Rc<FunctionDecl>,

    /// The environment the function was declared in.
    closure: EnvRef,

    /// Is this the `init` method of a class?
    is_initializer: bool,
}

impl fmt::Debug for SloxFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The closure is skipped: method environments lead back to the class
        // and recursing through that cycle would never terminate.
        f.debug_struct("SloxFunction")
            .field("declaration", &self.declaration.name)
            .field("is_initializer", &self.is_initializer)
            .finish_non_exhaustive()
    }
}

impl SloxFunction {
    /// Create a new function value.
    pub fn new(declaration: Rc<FunctionDecl>, closure: EnvRef, is_initializer: bool) -> Self {
        Self {
            declaration,
            closure,
            is_initializer,
        }
    }

    /// Return a copy of this function with `this` bound to the given value in
    /// a fresh scope wrapped around the closure.
    pub fn bind_this(&self, this_value: SloxObject) -> Rc<SloxFunction> {
        let environment = Environment::nested(&self.closure);
        environment
            .borrow_mut()
            .define("this".to_string(), this_value);
        Rc::new(SloxFunction {
            declaration: Rc::clone(&self.declaration),
            closure: environment,
            is_initializer: self.is_initializer,
        })
    }

    /// Get the `this` binding from the closure.
    ///
    /// Only meaningful for initializers, whose closure is always the scope
    /// where `bind_this` defined `this`.
    fn bound_this(&self, span: Span) -> SloxObject {
        Environment::get_at(&self.closure, 0, &Spanned::new(span, "this".to_string()))
    }
}

impl SloxCallable for SloxFunction {
    fn name(&self) -> &str {
        &self.declaration.name.item
    }

    fn arity(&self) -> u8 {
        self.declaration
            .params
            .len()
            .try_into()
            .expect("The parser rejects more than 255 parameters")
    }

    fn call(
        &self,
        interpreter: &mut dyn Interpreter,
        arguments: &[SpanObject],
        call_span: Span,
    ) -> Result<SloxObject, RuntimeError> {
        let environment = Environment::nested(&self.closure);
        for (param, argument) in self.declaration.params.iter().zip(arguments) {
            environment
                .borrow_mut()
                .define(param.item.clone(), argument.item.clone());
        }

        match interpreter.execute_block(&self.declaration.body, Some(environment)) {
            Ok(()) => {
                if self.is_initializer {
                    Ok(self.bound_this(call_span))
                } else {
                    Ok(SloxObject::Nil)
                }
            }
            Err(ErrorOrReturn::Return(value)) => {
                // An initializer always yields the instance; the resolver has
                // already rejected `return <value>` inside one.
                if self.is_initializer {
                    Ok(self.bound_this(call_span))
                } else {
                    Ok(value.item)
                }
            }
            Err(ErrorOrReturn::Error(error)) => Err(error),
        }
    }
}
