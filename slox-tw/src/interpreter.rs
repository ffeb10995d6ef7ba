//! This module provides [`TwInterpreter`], the tree-walk evaluator.

use crate::{
    native,
    resolver::{Locals, Resolver},
};
use slox_lib::{
    ast::{BinaryOp, Expr, FunctionDecl, LogicalOp, SpanExpr, SpanStmt, Stmt, UnaryOp},
    callable::{function::SloxFunction, SloxCallable},
    class::{SloxClass, SloxInstance},
    environment::{EnvRef, Environment},
    interpreter::{ErrorOrReturn, Interpreter, Result, RuntimeError},
    object::{SloxObject, SpanObject},
    slox::{report_name_error, report_runtime_error},
    span::{Span, Spanned},
};
use std::{mem, rc::Rc};
use tracing::debug;

/// A tree-walk interpreter for Slox.
///
/// Holds the global environment, the current environment, and the locals side
/// table produced by the [`Resolver`]. All three persist across calls to
/// [`interpret`](Interpreter::interpret), which is what makes state survive
/// from one REPL line to the next.
#[derive(Clone, Debug)]
pub struct TwInterpreter {
    /// The outermost environment, holding globals and native functions.
    globals: EnvRef,

    /// The environment of the scope currently being executed.
    environment: EnvRef,

    /// The resolved hop-depth of every local use site. See [`Locals`].
    locals: Locals,
}

impl Interpreter for TwInterpreter {
    fn new() -> Self {
        let globals = Environment::global();
        {
            let mut globals = globals.borrow_mut();
            for native in native::all() {
                let name = native.name().to_string();
                globals.define(name, SloxObject::NativeFunction(native));
            }
        }

        Self {
            environment: Rc::clone(&globals),
            globals,
            locals: Locals::new(),
        }
    }

    fn get_current_env(&self) -> EnvRef {
        Rc::clone(&self.environment)
    }

    fn interpret(&mut self, stmts: &[SpanStmt]) -> Option<SloxObject> {
        match Resolver::resolve(stmts) {
            Ok(locals) => {
                debug!(?locals);
                // Extend rather than replace: earlier REPL lines resolved
                // their own locals and closures from them may still run.
                self.locals.extend(locals);
            }
            Err(errors) => {
                for error in &errors {
                    report_name_error(&error.name, &error.message);
                }
                return None;
            }
        }

        // Top-level expression statements keep their value around so the REPL
        // can echo the last one.
        let mut last_value = None;
        let result = stmts.iter().try_for_each(|stmt| -> Result<()> {
            last_value = match &stmt.item {
                Stmt::Expression(expr) => Some(self.evaluate_expression(expr)?.item),
                _ => {
                    self.execute_statement(stmt)?;
                    None
                }
            };
            Ok(())
        });

        match result {
            Ok(()) => last_value,
            Err(ErrorOrReturn::Error(error)) => {
                report_runtime_error(error.span, &error.message);
                None
            }
            Err(ErrorOrReturn::Return(_)) => {
                unreachable!("The resolver rejects return statements at the top level")
            }
        }
    }

    fn execute_block(&mut self, stmts: &[SpanStmt], environment: Option<EnvRef>) -> Result<()> {
        let environment = environment.unwrap_or_else(|| Environment::nested(&self.environment));
        let previous = mem::replace(&mut self.environment, environment);

        // Capture the result so the previous environment is restored on every
        // exit path: normal completion, runtime error, and return signal.
        let result = self.execute_statements(stmts);
        self.environment = previous;
        result
    }
}

impl TwInterpreter {
    /// Execute the given statements in order.
    fn execute_statements(&mut self, stmts: &[SpanStmt]) -> Result<()> {
        for stmt in stmts {
            self.execute_statement(stmt)?;
        }
        Ok(())
    }

    /// Execute a single statement.
    fn execute_statement(&mut self, stmt: &SpanStmt) -> Result<()> {
        match &stmt.item {
            Stmt::Expression(expr) => {
                self.evaluate_expression(expr)?;
            }
            Stmt::Print(expr) => {
                let value = self.evaluate_expression(expr)?;
                println!("{}", value.item.print());
            }
            Stmt::VarDecl(name, initializer) => {
                let value = match initializer {
                    Some(expr) => self.evaluate_expression(expr)?.item,
                    None => SloxObject::Nil,
                };
                self.environment.borrow_mut().define(name.item.clone(), value);
            }
            Stmt::FunDecl(decl) => {
                let function = SloxFunction::new(
                    Rc::clone(decl),
                    Rc::clone(&self.environment),
                    false,
                );
                self.environment
                    .borrow_mut()
                    .define(decl.name.item.clone(), SloxObject::Function(Rc::new(function)));
            }
            Stmt::ClassDecl {
                name,
                superclass,
                methods,
            } => self.execute_class_decl(name, superclass.as_ref(), methods)?,
            Stmt::If(condition, then_branch, else_branch) => {
                if self.evaluate_expression(condition)?.is_truthy() {
                    self.execute_statement(then_branch)?;
                } else if let Some(else_branch) = else_branch {
                    self.execute_statement(else_branch)?;
                }
            }
            Stmt::While(condition, body) => {
                // The condition is re-evaluated before every iteration.
                while self.evaluate_expression(condition)?.is_truthy() {
                    self.execute_statement(body)?;
                }
            }
            Stmt::Return(keyword_span, value) => {
                let value = match value {
                    Some(expr) => self.evaluate_expression(expr)?,
                    None => Spanned::new(*keyword_span, SloxObject::Nil),
                };
                return Err(ErrorOrReturn::Return(value));
            }
            Stmt::Block(stmts) => self.execute_block(stmts, None)?,
        }

        Ok(())
    }

    /// Execute a class declaration.
    ///
    /// The class name is defined as `nil` first and assigned the finished
    /// class afterwards, so methods can refer to the class by name. When there
    /// is a superclass, the method closures get an extra scope holding
    /// `super`.
    fn execute_class_decl(
        &mut self,
        name: &Spanned<String>,
        superclass: Option<&Spanned<String>>,
        methods: &[Rc<FunctionDecl>],
    ) -> Result<()> {
        let superclass_value = match superclass {
            Some(superclass_name) => match self.look_up_variable(superclass_name)? {
                SloxObject::Class(class) => Some(class),
                _ => {
                    return Err(RuntimeError {
                        message: "Superclass must be a class.".to_string(),
                        span: superclass_name.span,
                    }
                    .into())
                }
            },
            None => None,
        };

        self.environment
            .borrow_mut()
            .define(name.item.clone(), SloxObject::Nil);

        let method_closure = match &superclass_value {
            Some(class) => {
                let environment = Environment::nested(&self.environment);
                environment
                    .borrow_mut()
                    .define("super".to_string(), SloxObject::Class(Rc::clone(class)));
                environment
            }
            None => Rc::clone(&self.environment),
        };

        let methods = methods
            .iter()
            .map(|method| {
                let is_initializer = method.name.item == "init";
                let function = SloxFunction::new(
                    Rc::clone(method),
                    Rc::clone(&method_closure),
                    is_initializer,
                );
                (method.name.item.clone(), Rc::new(function))
            })
            .collect();

        let class = SloxClass::new(name.clone(), superclass_value, methods);
        self.environment
            .borrow_mut()
            .assign(name, SloxObject::Class(Rc::new(class)))?;

        Ok(())
    }

    /// Evaluate a single expression.
    fn evaluate_expression(&mut self, expr: &SpanExpr) -> Result<SpanObject> {
        let value = match &expr.item {
            Expr::Nil => SloxObject::Nil,
            Expr::Boolean(boolean) => SloxObject::Boolean(*boolean),
            Expr::Number(number) => SloxObject::Number(*number),
            Expr::String(string) => SloxObject::String(string.clone()),
            Expr::Grouping(inner) => self.evaluate_expression(inner)?.item,
            Expr::Unary(operator, operand) => {
                let operand = self.evaluate_expression(operand)?;
                self.evaluate_unary(*operator, operand)?
            }
            Expr::Binary(left, operator, right) => {
                let left = self.evaluate_expression(left)?;
                let right = self.evaluate_expression(right)?;
                self.evaluate_binary(left, *operator, right)?
            }
            Expr::Logical(left, operator, right) => {
                let left = self.evaluate_expression(left)?;
                match operator.item {
                    // The operand itself is returned, not a boolean.
                    LogicalOp::Or if left.is_truthy() => left.item,
                    LogicalOp::And if !left.is_truthy() => left.item,
                    _ => self.evaluate_expression(right)?.item,
                }
            }
            Expr::Variable(name) => {
                self.look_up_variable(&Spanned::new(expr.span, name.clone()))?
            }
            Expr::Assign(name, value) => {
                let value = self.evaluate_expression(value)?.item;
                match self.locals.get(name) {
                    Some(&depth) => {
                        Environment::assign_at(&self.environment, depth, name, value.clone());
                    }
                    None => self.globals.borrow_mut().assign(name, value.clone())?,
                }
                value
            }
            Expr::Call(callee, arguments, close_paren) => {
                let callee = self.evaluate_expression(callee)?;

                let mut argument_values = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    argument_values.push(self.evaluate_expression(argument)?);
                }

                let call_span = callee.span.to(*close_paren);
                self.call_value(&callee, &argument_values, call_span)?
            }
            Expr::Get(object, name) => {
                let object = self.evaluate_expression(object)?;
                match &object.item {
                    SloxObject::Instance(instance) => SloxInstance::get(instance, name)?,
                    _ => {
                        return Err(RuntimeError {
                            message: "Only instances have properties.".to_string(),
                            span: name.span,
                        }
                        .into())
                    }
                }
            }
            Expr::Set(object, name, value) => {
                let object = self.evaluate_expression(object)?;
                let SloxObject::Instance(instance) = &object.item else {
                    return Err(RuntimeError {
                        message: "Only instances have fields.".to_string(),
                        span: name.span,
                    }
                    .into());
                };

                let value = self.evaluate_expression(value)?.item;
                instance.borrow_mut().set(&name.item, value.clone());
                value
            }
            Expr::This => self.look_up_variable(&Spanned::new(expr.span, "this".to_string()))?,
            Expr::Super(keyword_span, method) => self.evaluate_super(*keyword_span, method)?,
        };

        Ok(Spanned::new(expr.span, value))
    }

    /// Look up a variable, `this` included: use sites the resolver bound go
    /// straight to the recorded depth, everything else is a global.
    fn look_up_variable(&self, name: &Spanned<String>) -> Result<SloxObject, RuntimeError> {
        match self.locals.get(name) {
            Some(&depth) => Ok(Environment::get_at(&self.environment, depth, name)),
            None => self.globals.borrow().get(name),
        }
    }

    /// Evaluate a `super.method` expression.
    ///
    /// The environment where `this` is bound is always immediately inside the
    /// one where `super` is stored, hence the `depth - 1`.
    fn evaluate_super(
        &mut self,
        keyword_span: Span,
        method: &Spanned<String>,
    ) -> Result<SloxObject> {
        let super_key = Spanned::new(keyword_span, "super".to_string());
        let &depth = self
            .locals
            .get(&super_key)
            .unwrap_or_else(|| panic!("'super' at {keyword_span:?} was not resolved"));

        let SloxObject::Class(superclass) = Environment::get_at(&self.environment, depth, &super_key)
        else {
            panic!("'super' always resolves to a class");
        };
        let this = Environment::get_at(
            &self.environment,
            depth - 1,
            &Spanned::new(keyword_span, "this".to_string()),
        );

        let Some(method_fn) = superclass.find_method(&method.item) else {
            return Err(RuntimeError {
                message: format!("Undefined property '{}'.", method.item),
                span: method.span,
            }
            .into());
        };

        Ok(SloxObject::Function(method_fn.bind_this(this)))
    }

    /// Evaluate a unary operator application.
    fn evaluate_unary(
        &mut self,
        operator: Spanned<UnaryOp>,
        operand: SpanObject,
    ) -> Result<SloxObject> {
        Ok(match (operator.item, &operand.item) {
            (UnaryOp::Bang, value) => SloxObject::Boolean(!value.is_truthy()),
            (UnaryOp::Minus, SloxObject::Number(number)) => SloxObject::Number(-number),
            (UnaryOp::Minus, _) => {
                return Err(RuntimeError {
                    message: "Operand must be a number.".to_string(),
                    span: operator.span,
                }
                .into())
            }
        })
    }

    /// Evaluate a binary operator application.
    fn evaluate_binary(
        &mut self,
        left: SpanObject,
        operator: Spanned<BinaryOp>,
        right: SpanObject,
    ) -> Result<SloxObject> {
        use BinaryOp::*;
        use SloxObject::{Boolean, Number, String};

        let value = match (&left.item, operator.item, &right.item) {
            (Number(a), Slash, Number(b)) => Number(a / b),
            (Number(a), Star, Number(b)) => Number(a * b),
            (Number(a), Plus, Number(b)) => Number(a + b),
            (Number(a), Minus, Number(b)) => Number(a - b),
            (Number(a), Greater, Number(b)) => Boolean(a > b),
            (Number(a), GreaterEqual, Number(b)) => Boolean(a >= b),
            (Number(a), Less, Number(b)) => Boolean(a < b),
            (Number(a), LessEqual, Number(b)) => Boolean(a <= b),

            (String(a), Plus, String(b)) => String(a.clone() + b),

            (a, EqualEqual, b) => Boolean(a == b),
            (a, BangEqual, b) => Boolean(a != b),

            (_, Plus, _) => {
                return Err(RuntimeError {
                    message: "Operands must be two numbers or two strings.".to_string(),
                    span: operator.span,
                }
                .into())
            }
            _ => {
                return Err(RuntimeError {
                    message: "Operands must be numbers.".to_string(),
                    span: operator.span,
                }
                .into())
            }
        };

        Ok(value)
    }

    /// Invoke a callable value with already-evaluated arguments.
    fn call_value(
        &mut self,
        callee: &SpanObject,
        arguments: &[SpanObject],
        call_span: Span,
    ) -> Result<SloxObject> {
        let callable: &dyn SloxCallable = match &callee.item {
            SloxObject::Function(function) => function.as_ref(),
            SloxObject::NativeFunction(native) => native.as_ref(),
            SloxObject::Class(class) => class,
            _ => {
                return Err(RuntimeError {
                    message: "Can only call functions and classes.".to_string(),
                    span: call_span,
                }
                .into())
            }
        };

        if arguments.len() != callable.arity() as usize {
            return Err(RuntimeError {
                message: format!(
                    "Expected {} arguments but got {}.",
                    callable.arity(),
                    arguments.len()
                ),
                span: call_span,
            }
            .into());
        }

        Ok(callable.call(self, arguments, call_span)?)
    }
}
