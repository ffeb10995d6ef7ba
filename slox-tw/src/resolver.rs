//! This module provides the [`Resolver`], the static pass that binds each
//! variable use to the scope that declares it.

use slox_lib::{
    ast::{Expr, FunctionDecl, SpanExpr, SpanStmt, Stmt},
    span::Spanned,
};
use std::{collections::HashMap, fmt};
use thiserror::Error;

/// The side table produced by resolution: each resolved use site, keyed by its
/// name and span, mapped to the number of environment hops up to the frame
/// that declares it. Use sites with no entry refer to globals.
pub type Locals = HashMap<Spanned<String>, usize>;

/// An error found during resolution.
#[derive(Clone, Debug, PartialEq, Error)]
pub struct ResolveError {
    /// The error message.
    pub message: String,

    /// The name the error is attached to.
    pub name: Spanned<String>,
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResolveError({:?})", self.message)
    }
}

/// What kind of function body we're currently resolving. Used to reject badly
/// placed `return` statements.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FunctionType {
    /// Not in a function.
    None,

    /// In a free function.
    Function,

    /// In a method on a class.
    Method,

    /// In the `init` method of a class.
    Initializer,
}

/// What kind of class body we're currently resolving. Used to reject badly
/// placed `this` and `super`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ClassType {
    /// Not in a class.
    None,

    /// In a class without a superclass.
    Class,

    /// In a class with a superclass.
    Subclass,
}

/// The static resolution pass.
///
/// Walks the whole AST before evaluation, recording how many environment hops
/// separate every local variable use from its declaration, and rejecting the
/// scope errors the evaluator could not otherwise catch. The resolver never
/// aborts: every error is accumulated so they can all be reported at once.
#[derive(Clone, Debug)]
pub struct Resolver {
    /// The stack of local scopes currently being resolved.
    ///
    /// The global scope is not included. Each scope maps a declared name to
    /// whether its initializer has finished resolving.
    scopes: Vec<HashMap<String, bool>>,

    /// The side table being built. See [`Locals`].
    locals: Locals,

    /// The kind of function we're currently inside.
    current_function: FunctionType,

    /// The kind of class we're currently inside.
    current_class: ClassType,

    /// Every error found so far.
    errors: Vec<ResolveError>,
}

impl Resolver {
    /// Resolve the given statements.
    ///
    /// Returns the locals side table, or every error found if there were any.
    pub fn resolve(stmts: &[SpanStmt]) -> Result<Locals, Vec<ResolveError>> {
        let mut resolver = Self {
            scopes: Vec::new(),
            locals: HashMap::new(),
            current_function: FunctionType::None,
            current_class: ClassType::None,
            errors: Vec::new(),
        };

        resolver.resolve_stmts(stmts);

        if resolver.errors.is_empty() {
            Ok(resolver.locals)
        } else {
            Err(resolver.errors)
        }
    }

    /// Record an error and keep resolving.
    fn error(&mut self, name: Spanned<String>, message: &str) {
        self.errors.push(ResolveError {
            message: message.to_string(),
            name,
        });
    }

    /// Resolve a list of statements.
    fn resolve_stmts(&mut self, stmts: &[SpanStmt]) {
        for stmt in stmts {
            self.resolve_stmt(stmt);
        }
    }

    /// Resolve a single statement.
    fn resolve_stmt(&mut self, stmt: &SpanStmt) {
        match &stmt.item {
            Stmt::Expression(expr) | Stmt::Print(expr) => self.resolve_expr(expr),
            Stmt::VarDecl(name, initializer) => {
                self.declare(name);
                if let Some(initializer) = initializer {
                    self.resolve_expr(initializer);
                }
                self.define(name);
            }
            Stmt::FunDecl(decl) => {
                // Declared and defined before resolving the body, so a
                // function can recursively refer to itself.
                self.declare(&decl.name);
                self.define(&decl.name);
                self.resolve_function(decl, FunctionType::Function);
            }
            Stmt::ClassDecl {
                name,
                superclass,
                methods,
            } => self.resolve_class(name, superclass.as_ref(), methods),
            Stmt::If(condition, then_branch, else_branch) => {
                self.resolve_expr(condition);
                self.resolve_stmt(then_branch);
                if let Some(else_branch) = else_branch {
                    self.resolve_stmt(else_branch);
                }
            }
            Stmt::While(condition, body) => {
                self.resolve_expr(condition);
                self.resolve_stmt(body);
            }
            Stmt::Return(keyword_span, value) => {
                if self.current_function == FunctionType::None {
                    self.error(
                        Spanned::new(*keyword_span, "return".to_string()),
                        "Can't return from top-level code.",
                    );
                }

                if let Some(value) = value {
                    if self.current_function == FunctionType::Initializer {
                        self.error(
                            Spanned::new(*keyword_span, "return".to_string()),
                            "Can't return a value from an initializer.",
                        );
                    }
                    self.resolve_expr(value);
                }
            }
            Stmt::Block(stmts) => {
                self.begin_scope();
                self.resolve_stmts(stmts);
                self.end_scope();
            }
        }
    }

    /// Resolve a class declaration.
    fn resolve_class(
        &mut self,
        name: &Spanned<String>,
        superclass: Option<&Spanned<String>>,
        methods: &[std::rc::Rc<FunctionDecl>],
    ) {
        let enclosing_class = self.current_class;
        self.current_class = ClassType::Class;

        self.declare(name);
        self.define(name);

        if let Some(superclass) = superclass {
            if superclass.item == name.item {
                self.error(superclass.clone(), "A class can't inherit from itself.");
            }

            self.current_class = ClassType::Subclass;

            // The superclass name is an ordinary variable use.
            self.resolve_local(superclass.clone());

            // Methods of a subclass close over a scope holding `super`.
            self.begin_scope();
            self.scopes
                .last_mut()
                .unwrap()
                .insert("super".to_string(), true);
        }

        // Every method closes over a scope holding `this`.
        self.begin_scope();
        self.scopes
            .last_mut()
            .unwrap()
            .insert("this".to_string(), true);

        for method in methods {
            let function_type = if method.name.item == "init" {
                FunctionType::Initializer
            } else {
                FunctionType::Method
            };
            self.resolve_function(method, function_type);
        }

        self.end_scope();
        if superclass.is_some() {
            self.end_scope();
        }

        self.current_class = enclosing_class;
    }

    /// Resolve a single expression.
    fn resolve_expr(&mut self, expr: &SpanExpr) {
        match &expr.item {
            Expr::Nil | Expr::Boolean(_) | Expr::Number(_) | Expr::String(_) => {}
            Expr::Grouping(inner) => self.resolve_expr(inner),
            Expr::Unary(_, operand) => self.resolve_expr(operand),
            Expr::Binary(left, _, right) | Expr::Logical(left, _, right) => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }
            Expr::Variable(name) => {
                if self
                    .scopes
                    .last()
                    .is_some_and(|scope| scope.get(name) == Some(&false))
                {
                    self.error(
                        Spanned::new(expr.span, name.clone()),
                        "Can't read local variable in its own initializer.",
                    );
                }

                self.resolve_local(Spanned::new(expr.span, name.clone()));
            }
            Expr::Assign(name, value) => {
                self.resolve_expr(value);
                self.resolve_local(name.clone());
            }
            Expr::Call(callee, arguments, _) => {
                self.resolve_expr(callee);
                for argument in arguments {
                    self.resolve_expr(argument);
                }
            }
            Expr::Get(object, _) => self.resolve_expr(object),
            Expr::Set(object, _, value) => {
                self.resolve_expr(value);
                self.resolve_expr(object);
            }
            Expr::This => {
                if self.current_class == ClassType::None {
                    self.error(
                        Spanned::new(expr.span, "this".to_string()),
                        "Can't use 'this' outside of a class.",
                    );
                    return;
                }

                self.resolve_local(Spanned::new(expr.span, "this".to_string()));
            }
            Expr::Super(keyword_span, _) => {
                match self.current_class {
                    ClassType::None => {
                        self.error(
                            Spanned::new(*keyword_span, "super".to_string()),
                            "Can't use 'super' outside of a class.",
                        );
                        return;
                    }
                    ClassType::Class => {
                        self.error(
                            Spanned::new(*keyword_span, "super".to_string()),
                            "Can't use 'super' in a class with no superclass.",
                        );
                        return;
                    }
                    ClassType::Subclass => {}
                }

                self.resolve_local(Spanned::new(*keyword_span, "super".to_string()));
            }
        }
    }

    /// Begin a new local scope.
    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    /// End the innermost local scope.
    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    /// Declare a name in the innermost scope without defining it. Declaring
    /// the same name twice in one non-global scope is an error; the global
    /// scope is not tracked here and allows redeclaration.
    fn declare(&mut self, name: &Spanned<String>) {
        if let Some(scope) = self.scopes.last_mut() {
            if scope.contains_key(&name.item) {
                self.error(
                    name.clone(),
                    "Already a variable with this name in this scope.",
                );
                return;
            }
            scope.insert(name.item.clone(), false);
        }
    }

    /// Mark a declared name as fully defined.
    fn define(&mut self, name: &Spanned<String>) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.item.clone(), true);
        }
    }

    /// Bind a use site to the innermost scope declaring its name, recording
    /// the hop count in the side table. Names found in no scope are left for
    /// the evaluator to look up in the globals, which is what allows forward
    /// references between globals.
    fn resolve_local(&mut self, name: Spanned<String>) {
        for (hops, scope) in self.scopes.iter().rev().enumerate() {
            if scope.contains_key(&name.item) {
                self.locals.insert(name, hops);
                return;
            }
        }
    }

    /// Resolve a function declaration's parameters and body in a new scope.
    fn resolve_function(&mut self, decl: &FunctionDecl, function_type: FunctionType) {
        let enclosing_function = self.current_function;
        self.current_function = function_type;

        self.begin_scope();
        for param in &decl.params {
            self.declare(param);
            self.define(param);
        }
        self.resolve_stmts(&decl.body);
        self.end_scope();

        self.current_function = enclosing_function;
    }
}
