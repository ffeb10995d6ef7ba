//! End-to-end tests driving the evaluator through the public API.
//!
//! Programs under test store their results in globals, which are then read
//! back out of the interpreter's environment, so nothing here depends on
//! capturing stdout.

use slox_lib::{
    object::SloxObject,
    parser::Parser,
    scanner::Scanner,
    span::{Span, Spanned},
    Interpreter,
};
use slox_tw::TwInterpreter;
use std::rc::Rc;

/// Run the given code in a fresh interpreter.
fn run(code: &str) -> TwInterpreter {
    let mut interpreter = TwInterpreter::new();
    interpreter.interpret(&Parser::parse(Scanner::scan_tokens(code)));
    interpreter
}

/// Read a global variable out of the interpreter.
fn global(interpreter: &TwInterpreter, name: &str) -> Option<SloxObject> {
    let key = Spanned::new(Span { start: 0, end: 0 }, name.to_string());
    let env = interpreter.get_current_env();
    let value = env.borrow().get(&key).ok();
    value
}

/// Shorthand for asserting a global holds the given number.
fn assert_number(interpreter: &TwInterpreter, name: &str, expected: f64) {
    assert_eq!(
        global(interpreter, name),
        Some(SloxObject::Number(expected)),
        "global '{name}'"
    );
}

/// Shorthand for asserting a global holds the given string.
fn assert_string(interpreter: &TwInterpreter, name: &str, expected: &str) {
    assert_eq!(
        global(interpreter, name),
        Some(SloxObject::String(expected.to_string())),
        "global '{name}'"
    );
}

/// Shorthand for asserting a global holds the given boolean.
fn assert_boolean(interpreter: &TwInterpreter, name: &str, expected: bool) {
    assert_eq!(
        global(interpreter, name),
        Some(SloxObject::Boolean(expected)),
        "global '{name}'"
    );
}

#[test]
fn arithmetic_and_precedence() {
    let interpreter = run("var r = 1 + 2 * 3 - 8 / 4;");
    assert_number(&interpreter, "r", 5.0);
}

#[test]
fn string_concatenation() {
    let interpreter = run("var r = \"foo\" + \"bar\";");
    assert_string(&interpreter, "r", "foobar");
}

#[test]
fn comparison_and_equality() {
    let interpreter = run(
        "var lt = 1 < 2;\n\
         var ge = 1 >= 2;\n\
         var eq_nil = nil == nil;\n\
         var nil_vs_false = nil == false;\n\
         var nan = (0 / 0) == (0 / 0);\n\
         var mixed = 1 == \"1\";",
    );
    assert_boolean(&interpreter, "lt", true);
    assert_boolean(&interpreter, "ge", false);
    assert_boolean(&interpreter, "eq_nil", true);
    assert_boolean(&interpreter, "nil_vs_false", false);
    assert_boolean(&interpreter, "nan", false);
    assert_boolean(&interpreter, "mixed", false);
}

#[test]
fn logical_operators_return_their_operands() {
    let interpreter = run(
        "var a = nil or \"yes\";\n\
         var b = \"hi\" or 2;\n\
         var c = nil and 1;\n\
         var d = 1 and 2;\n\
         var e = 0 and \"zero is truthy\";",
    );
    assert_string(&interpreter, "a", "yes");
    assert_string(&interpreter, "b", "hi");
    assert_eq!(global(&interpreter, "c"), Some(SloxObject::Nil));
    assert_number(&interpreter, "d", 2.0);
    assert_string(&interpreter, "e", "zero is truthy");
}

#[test]
fn while_loops_rerun_their_condition() {
    let interpreter = run(
        "var sum = 0;\n\
         var i = 0;\n\
         while (i < 5) {\n\
           sum = sum + i;\n\
           i = i + 1;\n\
         }",
    );
    assert_number(&interpreter, "sum", 10.0);
    assert_number(&interpreter, "i", 5.0);
}

#[test]
fn for_loops_desugar_and_run() {
    let interpreter = run(
        "fun fib(n) {\n\
           if (n < 2) return n;\n\
           return fib(n - 2) + fib(n - 1);\n\
         }\n\
         var last;\n\
         for (var i = 0; i < 10; i = i + 1) last = fib(i);",
    );
    assert_number(&interpreter, "last", 34.0);
}

#[test]
fn closures_keep_their_declaring_environment_alive() {
    let interpreter = run(
        "fun makeCounter() {\n\
           var i = 0;\n\
           fun count() {\n\
             i = i + 1;\n\
             return i;\n\
           }\n\
           return count;\n\
         }\n\
         var counter = makeCounter();\n\
         var first = counter();\n\
         var second = counter();",
    );
    assert_number(&interpreter, "first", 1.0);
    assert_number(&interpreter, "second", 2.0);
}

#[test]
fn closures_capture_at_declaration_not_at_call() {
    let interpreter = run(
        "var a = \"global\";\n\
         var first;\n\
         var second;\n\
         {\n\
           fun show() {\n\
             return a;\n\
           }\n\
           first = show();\n\
           var a = \"local\";\n\
           second = show();\n\
         }",
    );
    assert_string(&interpreter, "first", "global");
    assert_string(&interpreter, "second", "global");
}

#[test]
fn functions_without_a_return_yield_nil() {
    let interpreter = run("fun noop() {}\nvar r = noop();");
    assert_eq!(global(&interpreter, "r"), Some(SloxObject::Nil));
}

#[test]
fn return_unwinds_nested_blocks() {
    let interpreter = run(
        "fun f() {\n\
           {\n\
             {\n\
               return \"early\";\n\
             }\n\
           }\n\
           return \"late\";\n\
         }\n\
         var r = f();",
    );
    assert_string(&interpreter, "r", "early");
}

#[test]
fn recursion_through_globals() {
    let interpreter = run(
        "fun even(n) {\n\
           if (n == 0) return true;\n\
           return odd(n - 1);\n\
         }\n\
         fun odd(n) {\n\
           if (n == 0) return false;\n\
           return even(n - 1);\n\
         }\n\
         var r = even(10);",
    );
    assert_boolean(&interpreter, "r", true);
}

#[test]
fn classes_construct_instances_with_fields_and_methods() {
    let interpreter = run(
        "class Counter {\n\
           init() {\n\
             this.count = 0;\n\
           }\n\
           bump() {\n\
             this.count = this.count + 1;\n\
             return this.count;\n\
           }\n\
         }\n\
         var c = Counter();\n\
         c.bump();\n\
         var n = c.bump();",
    );
    assert_number(&interpreter, "n", 2.0);
}

#[test]
fn fields_shadow_methods() {
    let interpreter = run(
        "class C {\n\
           speak() {\n\
             return \"method\";\n\
           }\n\
         }\n\
         var c = C();\n\
         var before = c.speak();\n\
         fun replacement() {\n\
           return \"field\";\n\
         }\n\
         c.speak = replacement;\n\
         var after = c.speak();",
    );
    assert_string(&interpreter, "before", "method");
    assert_string(&interpreter, "after", "field");
}

#[test]
fn methods_bind_this() {
    let interpreter = run(
        "class Person {\n\
           init(name) {\n\
             this.name = name;\n\
           }\n\
           getName() {\n\
             return this.name;\n\
           }\n\
         }\n\
         var method = Person(\"Ada\").getName;\n\
         var r = method();",
    );
    assert_string(&interpreter, "r", "Ada");
}

#[test]
fn inheritance_and_super() {
    let interpreter = run(
        "class A {\n\
           greet() {\n\
             return \"A\";\n\
           }\n\
         }\n\
         class B < A {\n\
           greet() {\n\
             return super.greet() + \"B\";\n\
           }\n\
         }\n\
         var r = B().greet();",
    );
    assert_string(&interpreter, "r", "AB");
}

#[test]
fn methods_are_inherited_when_not_overridden() {
    let interpreter = run(
        "class A {\n\
           whoami() {\n\
             return \"A\";\n\
           }\n\
         }\n\
         class B < A {}\n\
         var r = B().whoami();",
    );
    assert_string(&interpreter, "r", "A");
}

#[test]
fn initializers_always_return_the_instance() {
    let interpreter = run(
        "class Weird {\n\
           init() {\n\
             return;\n\
           }\n\
         }\n\
         var w = Weird();\n\
         var again = w.init();\n\
         var same = w == again;\n\
         var different = Weird() == Weird();",
    );
    assert_boolean(&interpreter, "same", true);
    assert_boolean(&interpreter, "different", false);
}

#[test]
fn instances_compare_by_identity() {
    let interpreter = run(
        "class Empty {}\n\
         var a = Empty();\n\
         var b = a;\n\
         var same = a == b;\n\
         var different = a == Empty();",
    );
    assert_boolean(&interpreter, "same", true);
    assert_boolean(&interpreter, "different", false);
}

#[test]
fn a_runtime_error_stops_later_statements() {
    let interpreter = run(
        "var before = \"ran\";\n\
         var oops = \"a\" - 1;\n\
         var after = \"not reached\";",
    );
    assert_string(&interpreter, "before", "ran");
    assert_eq!(global(&interpreter, "oops"), None);
    assert_eq!(global(&interpreter, "after"), None);
}

#[test]
fn an_arity_mismatch_is_a_runtime_error() {
    let interpreter = run(
        "fun two(a, b) {\n\
           return a;\n\
         }\n\
         two(1);\n\
         var after = \"not reached\";",
    );
    assert_eq!(global(&interpreter, "after"), None);
}

#[test]
fn calling_a_non_callable_is_a_runtime_error() {
    let interpreter = run("var x = 1;\nx();\nvar after = \"not reached\";");
    assert_eq!(global(&interpreter, "after"), None);
}

#[test]
fn a_resolve_error_prevents_any_evaluation() {
    let interpreter = run("var a = 1;\nreturn;\n");
    assert_eq!(global(&interpreter, "a"), None);
}

#[test]
fn the_environment_is_restored_after_errors_in_nested_blocks() {
    let mut interpreter = TwInterpreter::new();
    let before = interpreter.get_current_env();

    interpreter.interpret(&Parser::parse(Scanner::scan_tokens(
        "{ { var y = \"a\" + 1; } }",
    )));

    assert!(Rc::ptr_eq(&before, &interpreter.get_current_env()));
}

#[test]
fn the_environment_is_back_at_the_globals_after_a_normal_run() {
    let mut interpreter = TwInterpreter::new();
    let before = interpreter.get_current_env();

    interpreter.interpret(&Parser::parse(Scanner::scan_tokens(
        "fun f() { return 1; }\n{ var x = f(); { var y = x; } }",
    )));

    assert!(Rc::ptr_eq(&before, &interpreter.get_current_env()));
}

#[test]
fn interpret_returns_the_value_of_a_trailing_expression_statement() {
    let parse = |code: &str| Parser::parse(Scanner::scan_tokens(code));
    let mut interpreter = TwInterpreter::new();

    assert_eq!(
        interpreter.interpret(&parse("var a = 2;\na + 3;")),
        Some(SloxObject::Number(5.0))
    );

    // Nothing to echo when the line ends in a declaration.
    assert_eq!(interpreter.interpret(&parse("var b = 1;")), None);

    // The echo form quotes strings, unlike `print`.
    assert_eq!(
        interpreter
            .interpret(&parse("\"quo\" + \"ted\";"))
            .map(|value| value.repr()),
        Some("\"quoted\"".to_string())
    );

    // A failed line has no value.
    assert_eq!(interpreter.interpret(&parse("\"oops\" - 1;")), None);
}

#[test]
fn globals_persist_across_interpret_calls_like_a_repl() {
    let mut interpreter = TwInterpreter::new();
    interpreter.interpret(&Parser::parse(Scanner::scan_tokens("var a = 1;")));
    interpreter.interpret(&Parser::parse(Scanner::scan_tokens("var b = a + 1;")));

    assert_number(&interpreter, "b", 2.0);
}

#[test]
fn globals_may_be_redefined() {
    let interpreter = run("var a = 1;\nvar a = \"two\";");
    assert_string(&interpreter, "a", "two");
}

#[test]
fn native_clock_returns_a_positive_number() {
    let interpreter = run("var t = clock();");
    match global(&interpreter, "t") {
        Some(SloxObject::Number(seconds)) => assert!(seconds > 0.0),
        other => panic!("expected a number, got {other:?}"),
    }
}

#[test]
fn native_str_and_pow() {
    let interpreter = run(
        "var s = str(12) + \"!\";\n\
         var half = str(2.5);\n\
         var no = str(nil);\n\
         var p = pow(2, 10);",
    );
    assert_string(&interpreter, "s", "12!");
    assert_string(&interpreter, "half", "2.5");
    assert_string(&interpreter, "no", "nil");
    assert_number(&interpreter, "p", 1024.0);
}

#[test]
fn division_follows_ieee_754() {
    let interpreter = run("var inf = 1 / 0;\nvar isinf = inf > 999999999;");
    assert_boolean(&interpreter, "isinf", true);
}
