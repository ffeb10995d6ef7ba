//! This module provides [`SloxClass`] and [`SloxInstance`].

use crate::{
    callable::{function::SloxFunction, SloxCallable},
    interpreter::{Interpreter, RuntimeError},
    object::{SloxObject, SpanObject},
    span::{Span, Spanned},
};
use std::{cell::RefCell, collections::HashMap, rc::Rc};

/// The runtime representation of a class declaration.
#[derive(Clone, Debug)]
pub struct SloxClass {
    /// The name of the class, with the span where it was declared.
    name: Spanned<String>,

    /// The class this one inherits from, if any.
    superclass: Option<Rc<SloxClass>>,

    /// The methods of the class, by name.
    methods: HashMap<String, Rc<SloxFunction>>,
}

impl SloxClass {
    /// Create a new class.
    pub fn new(
        name: Spanned<String>,
        superclass: Option<Rc<SloxClass>>,
        methods: HashMap<String, Rc<SloxFunction>>,
    ) -> Self {
        Self {
            name,
            superclass,
            methods,
        }
    }

    /// Find a method by name, searching this class first and then walking the
    /// superclass chain.
    pub fn find_method(&self, name: &str) -> Option<Rc<SloxFunction>> {
        self.methods.get(name).cloned().or_else(|| {
            self.superclass
                .as_ref()
                .and_then(|superclass| superclass.find_method(name))
        })
    }
}

impl SloxCallable for Rc<SloxClass> {
    fn name(&self) -> &str {
        &self.name.item
    }

    /// Calling a class constructs an instance, so the class's arity is its
    /// initializer's, or zero without one.
    fn arity(&self) -> u8 {
        self.find_method("init").map_or(0, |init| init.arity())
    }

    fn call(
        &self,
        interpreter: &mut dyn Interpreter,
        arguments: &[SpanObject],
        call_span: Span,
    ) -> Result<SloxObject, RuntimeError> {
        let instance = Rc::new(RefCell::new(SloxInstance::new(Rc::clone(self))));

        if let Some(initializer) = self.find_method("init") {
            initializer
                .bind_this(SloxObject::Instance(Rc::clone(&instance)))
                .call(interpreter, arguments, call_span)?;
        }

        Ok(SloxObject::Instance(instance))
    }
}

/// An instance of a class.
#[derive(Clone, Debug)]
pub struct SloxInstance {
    /// The class this instance was constructed from.
    class: Rc<SloxClass>,

    /// The fields set on this instance.
    fields: HashMap<String, SloxObject>,
}

impl SloxInstance {
    /// Create a new instance with no fields.
    pub fn new(class: Rc<SloxClass>) -> Self {
        Self {
            class,
            fields: HashMap::new(),
        }
    }

    /// The name of the class this instance was constructed from.
    pub fn class_name(&self) -> &str {
        &self.class.name.item
    }

    /// Look up a property on the instance: fields shadow methods, and a method
    /// is returned bound to this instance.
    pub fn get(
        instance: &Rc<RefCell<SloxInstance>>,
        name: &Spanned<String>,
    ) -> Result<SloxObject, RuntimeError> {
        if let Some(field) = instance.borrow().fields.get(&name.item) {
            return Ok(field.clone());
        }

        if let Some(method) = instance.borrow().class.find_method(&name.item) {
            return Ok(SloxObject::Function(
                method.bind_this(SloxObject::Instance(Rc::clone(instance))),
            ));
        }

        Err(RuntimeError {
            message: format!("Undefined property '{}'.", name.item),
            span: name.span,
        })
    }

    /// Set a field on the instance. Setting always succeeds and may create the
    /// field.
    pub fn set(&mut self, name: &str, value: SloxObject) {
        self.fields.insert(name.to_string(), value);
    }
}
