//! This module provides [`Environment`], the chain of name→value frames.

use crate::{interpreter::RuntimeError, object::SloxObject, span::Spanned};
use std::{cell::RefCell, collections::HashMap, rc::Rc};

/// A shared handle to an [`Environment`].
pub type EnvRef = Rc<RefCell<Environment>>;

/// One frame of defined names, linked to the frame it lexically encloses.
#[derive(Clone, Debug, Default)]
pub struct Environment {
    /// The environment enclosed by this one, if any.
    pub enclosing: Option<EnvRef>,

    /// The names defined in this frame.
    values: HashMap<String, SloxObject>,
}

impl Environment {
    /// Create a new global (outermost) environment.
    pub fn global() -> EnvRef {
        Rc::new(RefCell::new(Self::default()))
    }

    /// Create a new environment enclosing the given one.
    pub fn nested(enclosing: &EnvRef) -> EnvRef {
        Rc::new(RefCell::new(Self {
            enclosing: Some(Rc::clone(enclosing)),
            values: HashMap::new(),
        }))
    }

    /// Define a name in this frame, overwriting any previous definition.
    pub fn define(&mut self, name: String, value: SloxObject) {
        self.values.insert(name, value);
    }

    /// Get the value of a name, searching the chain outwards from this frame.
    pub fn get(&self, name: &Spanned<String>) -> Result<SloxObject, RuntimeError> {
        if let Some(value) = self.values.get(&name.item) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            Err(RuntimeError {
                message: format!("Undefined variable '{}'.", name.item),
                span: name.span,
            })
        }
    }

    /// Re-assign an existing name, searching the chain outwards from this frame.
    pub fn assign(&mut self, name: &Spanned<String>, value: SloxObject) -> Result<(), RuntimeError> {
        if let Some(slot) = self.values.get_mut(&name.item) {
            *slot = value;
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            Err(RuntimeError {
                message: format!("Undefined variable '{}'.", name.item),
                span: name.span,
            })
        }
    }

    /// Get the value of a name in the frame exactly `depth` hops up the chain.
    ///
    /// The resolver guarantees the frame and the name exist, so there is no
    /// fallback search; a miss here is a resolver bug and panics.
    pub fn get_at(env: &EnvRef, depth: usize, name: &Spanned<String>) -> SloxObject {
        Self::ancestor(env, depth)
            .borrow()
            .values
            .get(&name.item)
            .unwrap_or_else(|| {
                panic!(
                    "Name '{}' was resolved to depth {depth} but is not defined there",
                    name.item
                )
            })
            .clone()
    }

    /// Re-assign a name in the frame exactly `depth` hops up the chain.
    ///
    /// Like [`get_at`](Self::get_at), a missing frame or name panics.
    pub fn assign_at(env: &EnvRef, depth: usize, name: &Spanned<String>, value: SloxObject) {
        *Self::ancestor(env, depth)
            .borrow_mut()
            .values
            .get_mut(&name.item)
            .unwrap_or_else(|| {
                panic!(
                    "Name '{}' was resolved to depth {depth} but is not defined there",
                    name.item
                )
            }) = value;
    }

    /// Walk `depth` `enclosing` links up the chain.
    fn ancestor(env: &EnvRef, depth: usize) -> EnvRef {
        let mut current = Rc::clone(env);
        for _ in 0..depth {
            let enclosing = current
                .borrow()
                .enclosing
                .as_ref()
                .map(Rc::clone)
                .unwrap_or_else(|| panic!("Resolved environment depth {depth} is too deep"));
            current = enclosing;
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Span;

    fn name(s: &str) -> Spanned<String> {
        Spanned::new(Span { start: 0, end: s.len() }, s.to_string())
    }

    #[test]
    fn get_searches_the_chain() {
        let global = Environment::global();
        global
            .borrow_mut()
            .define("a".to_string(), SloxObject::Number(1.0));

        let inner = Environment::nested(&global);
        assert_eq!(
            inner.borrow().get(&name("a")).unwrap(),
            SloxObject::Number(1.0)
        );
    }

    #[test]
    fn get_miss_is_a_runtime_error() {
        let global = Environment::global();
        let err = global.borrow().get(&name("ghost")).unwrap_err();
        assert_eq!(err.message, "Undefined variable 'ghost'.");
    }

    #[test]
    fn assign_writes_to_the_declaring_frame() {
        let global = Environment::global();
        global
            .borrow_mut()
            .define("a".to_string(), SloxObject::Number(1.0));

        let inner = Environment::nested(&global);
        inner
            .borrow_mut()
            .assign(&name("a"), SloxObject::Number(2.0))
            .unwrap();

        assert_eq!(
            global.borrow().get(&name("a")).unwrap(),
            SloxObject::Number(2.0)
        );
    }

    #[test]
    fn get_at_skips_exactly_that_many_frames() {
        let global = Environment::global();
        global
            .borrow_mut()
            .define("a".to_string(), SloxObject::String("outer".to_string()));

        let middle = Environment::nested(&global);
        middle
            .borrow_mut()
            .define("a".to_string(), SloxObject::String("middle".to_string()));

        let inner = Environment::nested(&middle);

        assert_eq!(
            Environment::get_at(&inner, 1, &name("a")),
            SloxObject::String("middle".to_string())
        );
        assert_eq!(
            Environment::get_at(&inner, 2, &name("a")),
            SloxObject::String("outer".to_string())
        );
    }

    #[test]
    fn assign_at_does_not_fall_back() {
        let global = Environment::global();
        global
            .borrow_mut()
            .define("a".to_string(), SloxObject::Number(1.0));

        let inner = Environment::nested(&global);
        inner
            .borrow_mut()
            .define("a".to_string(), SloxObject::Number(10.0));

        Environment::assign_at(&inner, 0, &name("a"), SloxObject::Number(11.0));

        assert_eq!(Environment::get_at(&inner, 0, &name("a")), SloxObject::Number(11.0));
        assert_eq!(
            Environment::get_at(&inner, 1, &name("a")),
            SloxObject::Number(1.0)
        );
    }
}
