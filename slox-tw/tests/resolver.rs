//! Tests for the resolver's side table and scope rules.

use slox_lib::{parser::Parser, scanner::Scanner};
use slox_tw::resolver::{Locals, ResolveError, Resolver};

/// Scan, parse, and resolve the given code.
fn resolve(code: &str) -> Result<Locals, Vec<ResolveError>> {
    Resolver::resolve(&Parser::parse(Scanner::scan_tokens(code)))
}

/// Collect the resolved depths of every use site of the given name.
fn depths_of(locals: &Locals, name: &str) -> Vec<usize> {
    let mut depths: Vec<usize> = locals
        .iter()
        .filter(|(key, _)| key.item == name)
        .map(|(_, &depth)| depth)
        .collect();
    depths.sort_unstable();
    depths
}

/// Collect the error messages, sorted for stable comparison.
fn messages(errors: Vec<ResolveError>) -> Vec<String> {
    let mut messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
    messages.sort();
    messages
}

#[test]
fn globals_are_not_in_the_side_table() {
    let locals = resolve("var g = 1;\nprint g;\ng = 2;").unwrap();
    assert!(locals.is_empty());
}

#[test]
fn forward_references_between_globals_resolve_to_nothing() {
    // `later` is not declared yet when `early` is resolved; it has to stay a
    // global lookup so it can be defined by the time `early` runs.
    let locals = resolve("fun early() { return later(); }\nfun later() { return 1; }").unwrap();
    assert_eq!(depths_of(&locals, "later"), vec![]);
}

#[test]
fn block_locals_resolve_at_depth_zero() {
    let locals = resolve("{ var a = 1; print a; }").unwrap();
    assert_eq!(depths_of(&locals, "a"), vec![0]);
}

#[test]
fn shadowing_binds_to_the_innermost_declaration() {
    let locals = resolve("{ var a = 1; { var a = 2; print a; } }").unwrap();
    assert_eq!(depths_of(&locals, "a"), vec![0]);
}

#[test]
fn closures_capture_across_function_boundaries() {
    let locals = resolve("{ var x = 0; fun bump() { x = x + 1; } }").unwrap();
    // Both the read and the write of `x` hop over the function's own scope.
    assert_eq!(depths_of(&locals, "x"), vec![1, 1]);
}

#[test]
fn parameters_resolve_in_the_function_scope() {
    let locals = resolve("fun id(value) { return value; }").unwrap();
    assert_eq!(depths_of(&locals, "value"), vec![0]);
}

#[test]
fn this_resolves_through_the_method_scope() {
    let locals = resolve("class C { m() { return this; } }").unwrap();
    assert_eq!(depths_of(&locals, "this"), vec![1]);
}

#[test]
fn super_sits_one_scope_beyond_this() {
    let locals = resolve("class A { m() {} }\nclass B < A { m() { return super.m; } }").unwrap();
    assert_eq!(depths_of(&locals, "super"), vec![2]);
}

#[test]
fn top_level_return_is_rejected() {
    let errors = resolve("return 1;").unwrap_err();
    assert_eq!(messages(errors), vec!["Can't return from top-level code."]);
}

#[test]
fn reading_a_variable_in_its_own_initializer_is_rejected() {
    let errors = resolve("{ var a = 1; { var a = a; } }").unwrap_err();
    assert_eq!(
        messages(errors),
        vec!["Can't read local variable in its own initializer."]
    );
}

#[test]
fn redeclaring_in_the_same_local_scope_is_rejected() {
    let errors = resolve("{ var a = 1; var a = 2; }").unwrap_err();
    assert_eq!(
        messages(errors),
        vec!["Already a variable with this name in this scope."]
    );
}

#[test]
fn redeclaring_a_global_is_allowed() {
    assert!(resolve("var a = 1;\nvar a = 2;").is_ok());
}

#[test]
fn this_outside_a_class_is_rejected() {
    let errors = resolve("print this;").unwrap_err();
    assert_eq!(messages(errors), vec!["Can't use 'this' outside of a class."]);

    let errors = resolve("fun f() { return this; }").unwrap_err();
    assert_eq!(messages(errors), vec!["Can't use 'this' outside of a class."]);
}

#[test]
fn super_outside_a_class_is_rejected() {
    let errors = resolve("print super.m;").unwrap_err();
    assert_eq!(
        messages(errors),
        vec!["Can't use 'super' outside of a class."]
    );
}

#[test]
fn super_without_a_superclass_is_rejected() {
    let errors = resolve("class C { m() { return super.m; } }").unwrap_err();
    assert_eq!(
        messages(errors),
        vec!["Can't use 'super' in a class with no superclass."]
    );
}

#[test]
fn a_class_cannot_inherit_from_itself() {
    let errors = resolve("class C < C {}").unwrap_err();
    assert_eq!(messages(errors), vec!["A class can't inherit from itself."]);
}

#[test]
fn returning_a_value_from_an_initializer_is_rejected() {
    let errors = resolve("class C { init() { return 42; } }").unwrap_err();
    assert_eq!(
        messages(errors),
        vec!["Can't return a value from an initializer."]
    );
}

#[test]
fn a_bare_return_in_an_initializer_is_allowed() {
    assert!(resolve("class C { init() { return; } }").is_ok());
}

#[test]
fn errors_accumulate_instead_of_stopping_at_the_first() {
    let errors = resolve("return 1;\nprint this;\nprint super.m;").unwrap_err();
    assert_eq!(
        messages(errors),
        vec![
            "Can't return from top-level code.",
            "Can't use 'super' outside of a class.",
            "Can't use 'this' outside of a class.",
        ]
    );
}
