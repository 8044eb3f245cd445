mod builtins;

use std::rc::Rc;

use log::trace;

use crate::environment::{EnvRef, Environment};
use crate::object::{FunctionObj, Value};
use crate::parser::{Expression, Identifier, Statement};

/// Evaluates a fully parsed program against `env`, returning the value of
/// its last executed statement. A top-level `ReturnValue` is unwrapped into
/// its inner value — `return` at the top level simply ends evaluation.
pub fn eval_program(statements: &[Statement], env: &EnvRef) -> Value {
    let mut result = Value::Null;

    for stmt in statements {
        result = eval_statement(stmt, env);

        match result {
            Value::ReturnValue(inner) => return *inner,
            Value::Error(_) => return result,
            _ => {}
        }
    }

    result
}

/// Evaluates a block's statements in order. Unlike `eval_program`, a
/// `ReturnValue` is *not* unwrapped here — it propagates outward so an
/// inner `return` escapes every enclosing block up to the nearest function
/// call boundary.
fn eval_block(statements: &[Statement], env: &EnvRef) -> Value {
    let mut result = Value::Null;

    for stmt in statements {
        result = eval_statement(stmt, env);

        if matches!(result, Value::ReturnValue(_) | Value::Error(_)) {
            return result;
        }
    }

    result
}

fn eval_statement(stmt: &Statement, env: &EnvRef) -> Value {
    match stmt {
        Statement::Let { name, value, .. } => {
            let evaluated = eval_expression(value, env);
            if evaluated.is_error() {
                return evaluated;
            }
            env.set(name.value.clone(), evaluated);
            Value::Null
        }
        Statement::Return { value, .. } => {
            let evaluated = eval_expression(value, env);
            if evaluated.is_error() {
                return evaluated;
            }
            Value::ReturnValue(Box::new(evaluated))
        }
        Statement::Expression { expression, .. } => eval_expression(expression, env),
        Statement::Block { statements, .. } => eval_block(statements, env),
    }
}

fn eval_expression(expr: &Expression, env: &EnvRef) -> Value {
    match expr {
        Expression::IntegerLiteral { value, .. } => Value::Integer(*value),
        Expression::BooleanLiteral { value, .. } => Value::Boolean(*value),
        Expression::StringLiteral { value, .. } => Value::String(Rc::from(value.as_str())),
        Expression::Identifier(ident) => eval_identifier(ident, env),
        Expression::ArrayLiteral { elements, .. } => eval_array_literal(elements, env),
        Expression::FunctionLiteral {
            parameters, body, ..
        } => Value::Function(Rc::new(FunctionObj {
            parameters: parameters.clone(),
            body: (**body).clone(),
            env: env.clone(),
        })),
        Expression::Prefix {
            operator, right, ..
        } => {
            let right = eval_expression(right, env);
            if right.is_error() {
                return right;
            }
            eval_prefix_expression(operator, right)
        }
        Expression::Infix {
            left,
            operator,
            right,
            ..
        } => {
            let left = eval_expression(left, env);
            if left.is_error() {
                return left;
            }
            let right = eval_expression(right, env);
            if right.is_error() {
                return right;
            }
            eval_infix_expression(operator, left, right)
        }
        Expression::If {
            condition,
            consequence,
            alternative,
            ..
        } => eval_if_expression(condition, consequence, alternative.as_deref(), env),
        Expression::Call {
            function,
            arguments,
            ..
        } => eval_call_expression(function, arguments, env),
        Expression::Index { left, index, .. } => eval_index_expression(left, index, env),
    }
}

fn eval_identifier(ident: &Identifier, env: &EnvRef) -> Value {
    if let Some(value) = env.get(&ident.value) {
        return value;
    }
    if let Some(builtin) = builtins::lookup(&ident.value) {
        return builtin;
    }
    Value::error(format!("identifier not found: {}", ident.value))
}

fn eval_array_literal(elements: &[Expression], env: &EnvRef) -> Value {
    let mut values = Vec::with_capacity(elements.len());

    for element in elements {
        let value = eval_expression(element, env);
        if value.is_error() {
            return value;
        }
        values.push(value);
    }

    Value::Array(Rc::new(values))
}

fn eval_prefix_expression(operator: &str, right: Value) -> Value {
    match operator {
        "!" => Value::Boolean(!right.is_truthy()),
        "-" => match right {
            Value::Integer(v) => Value::Integer(-v),
            other => Value::error(format!("unknown operator: -{}", other.type_name())),
        },
        op => Value::error(format!("unknown operator: {op}{}", right.type_name())),
    }
}

fn eval_infix_expression(operator: &str, left: Value, right: Value) -> Value {
    trace!("eval_infix_expression: {operator}");

    match (&left, &right) {
        (Value::Integer(l), Value::Integer(r)) => eval_integer_infix(operator, *l, *r),
        (Value::String(l), Value::String(r)) if operator == "+" => {
            Value::String(Rc::from(format!("{l}{r}")))
        }
        _ if operator == "==" => Value::Boolean(values_identical(&left, &right)),
        _ if operator == "!=" => Value::Boolean(!values_identical(&left, &right)),
        _ if left.type_name() != right.type_name() => Value::error(format!(
            "type mismatch: {} {operator} {}",
            left.type_name(),
            right.type_name()
        )),
        _ => Value::error(format!(
            "unknown operator: {} {operator} {}",
            left.type_name(),
            right.type_name()
        )),
    }
}

fn eval_integer_infix(operator: &str, left: i64, right: i64) -> Value {
    match operator {
        // wrapping, not checked: a well-formed AST must never panic, and
        // this matches the host language's two's-complement int64 overflow
        "+" => Value::Integer(left.wrapping_add(right)),
        "-" => Value::Integer(left.wrapping_sub(right)),
        "*" => Value::Integer(left.wrapping_mul(right)),
        "/" => {
            if right == 0 {
                Value::error("division by zero")
            } else {
                // truncates toward zero, matching Rust's and the host's
                // native integer division
                Value::Integer(left / right)
            }
        }
        "<" => Value::Boolean(left < right),
        ">" => Value::Boolean(left > right),
        "==" => Value::Boolean(left == right),
        "!=" => Value::Boolean(left != right),
        op => Value::error(format!("unknown operator: INTEGER {op} INTEGER")),
    }
}

/// Identity comparison: booleans and null compare equal whenever their
/// underlying Rust values are equal (see DESIGN.md), everything else
/// compares equal only when it is literally the same allocation — two
/// freshly built strings/arrays/functions with identical contents are
/// *not* `==`, mirroring the reference language's behavior.
fn values_identical(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Boolean(x), Value::Boolean(y)) => x == y,
        (Value::Null, Value::Null) => true,
        (Value::String(x), Value::String(y)) => Rc::ptr_eq(x, y),
        (Value::Array(x), Value::Array(y)) => Rc::ptr_eq(x, y),
        (Value::Function(x), Value::Function(y)) => Rc::ptr_eq(x, y),
        (Value::Builtin(x), Value::Builtin(y)) => Rc::ptr_eq(x, y),
        _ => false,
    }
}

fn eval_if_expression(
    condition: &Expression,
    consequence: &Statement,
    alternative: Option<&Statement>,
    env: &EnvRef,
) -> Value {
    let condition = eval_expression(condition, env);
    if condition.is_error() {
        return condition;
    }

    if condition.is_truthy() {
        eval_statement(consequence, env)
    } else if let Some(alt) = alternative {
        eval_statement(alt, env)
    } else {
        Value::Null
    }
}

fn eval_call_expression(callee: &Expression, arguments: &[Expression], env: &EnvRef) -> Value {
    let function = eval_expression(callee, env);
    if function.is_error() {
        return function;
    }

    let mut args = Vec::with_capacity(arguments.len());
    for arg in arguments {
        let value = eval_expression(arg, env);
        if value.is_error() {
            return value;
        }
        args.push(value);
    }

    apply_function(function, &args)
}

fn apply_function(function: Value, args: &[Value]) -> Value {
    match function {
        Value::Function(func) => {
            let call_env = Environment::enclosed(func.env.clone());
            for (param, arg) in func.parameters.iter().zip(args) {
                call_env.set(param.value.clone(), arg.clone());
            }

            let evaluated = eval_statement(&func.body, &call_env);
            match evaluated {
                Value::ReturnValue(inner) => *inner,
                other => other,
            }
        }
        Value::Builtin(builtin) => (builtin.func)(args),
        other => Value::error(format!("not a function: {}", other.type_name())),
    }
}

/// Index evaluation resolves the §9 Open Question: out-of-bounds indexing
/// yields `null`, a non-array left-hand side or non-integer index is a
/// runtime `Error` — see DESIGN.md.
fn eval_index_expression(left: &Expression, index: &Expression, env: &EnvRef) -> Value {
    let left = eval_expression(left, env);
    if left.is_error() {
        return left;
    }

    let index = eval_expression(index, env);
    if index.is_error() {
        return index;
    }

    match (&left, &index) {
        (Value::Array(elements), Value::Integer(i)) => {
            if *i < 0 || *i as usize >= elements.len() {
                Value::Null
            } else {
                elements[*i as usize].clone()
            }
        }
        (Value::Array(_), other) => Value::error(format!(
            "index operator not supported: expected INTEGER, got {}",
            other.type_name()
        )),
        (other, _) => Value::error(format!("index operator not supported: {}", other.type_name())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    fn eval(input: &str) -> Value {
        let lexer = Lexer::new(input);
        let mut parser = Parser::new(lexer);
        let program = parser.parse_program();
        assert!(parser.errors().is_empty(), "parser errors: {:?}", parser.errors());
        eval_program(&program.statements, &Environment::new())
    }

    #[test]
    fn integer_arithmetic() {
        let cases = [
            ("5", 5),
            ("10", 10),
            ("-5", -5),
            ("5 + 5 + 5 + 5 - 10", 10),
            ("2 * 2 * 2 * 2 * 2", 32),
            ("-50 + 100 + -50", 0),
            ("5 * 2 + 10", 20),
            ("5 + 2 * 10", 25),
            ("20 + 2 * -10", 0),
            ("50 / 2 * 2 + 10", 60),
            ("2 * (5 + 10)", 30),
            ("3 * 3 * 3 + 10", 37),
            ("3 * (3 * 3) + 10", 37),
            ("(5 + 10 * 2 + 15 / 3) * 2 + -10", 50),
        ];

        for (input, expected) in cases {
            assert!(matches!(eval(input), Value::Integer(v) if v == expected), "input: {input}");
        }
    }

    #[test]
    fn integer_overflow_wraps_instead_of_panicking() {
        // literals themselves must stay within i64's range; the MIN side is
        // reached by negating MAX and subtracting one, same as the host.
        assert!(matches!(
            eval("9223372036854775807 + 1"),
            Value::Integer(i64::MIN)
        ));
        assert!(matches!(
            eval("(-9223372036854775807 - 1) - 1"),
            Value::Integer(i64::MAX)
        ));
        assert!(matches!(
            eval("9223372036854775807 * 2"),
            Value::Integer(-2)
        ));
    }

    #[test]
    fn boolean_and_bang_expressions() {
        let cases = [
            ("true", true),
            ("false", false),
            ("1 < 2", true),
            ("1 > 2", false),
            ("1 < 1", false),
            ("1 == 1", true),
            ("1 != 1", false),
            ("true == true", true),
            ("false == false", true),
            ("true == false", false),
            ("(1 < 2) == true", true),
            ("!true", false),
            ("!false", true),
            ("!5", false),
            ("!!true", true),
            ("!!5", true),
        ];

        for (input, expected) in cases {
            assert!(matches!(eval(input), Value::Boolean(v) if v == expected), "input: {input}");
        }
    }

    #[test]
    fn if_else_expressions() {
        assert!(matches!(eval("if (true) { 10 }"), Value::Integer(10)));
        assert!(matches!(eval("if (false) { 10 }"), Value::Null));
        assert!(matches!(eval("if (1) { 10 }"), Value::Integer(10)));
        assert!(matches!(eval("if (1 < 2) { 10 }"), Value::Integer(10)));
        assert!(matches!(eval("if (1 > 2) { 10 }"), Value::Null));
        assert!(matches!(eval("if (1 > 2) { 10 } else { 20 }"), Value::Integer(20)));
        assert!(matches!(eval("if (1 < 2) { 10 } else { 20 }"), Value::Integer(10)));
    }

    #[test]
    fn nested_return_escapes_to_function_boundary() {
        let input = "if (10 > 1) { if (10 > 1) { return 10; } return 1; }";
        assert!(matches!(eval(input), Value::Integer(10)));
    }

    #[test]
    fn error_handling() {
        let cases = [
            ("5 + true;", "type mismatch: INTEGER + BOOLEAN"),
            ("5 + true; 5;", "type mismatch: INTEGER + BOOLEAN"),
            ("-true", "unknown operator: -BOOLEAN"),
            ("true + false;", "unknown operator: BOOLEAN + BOOLEAN"),
            ("5; true + false; 5", "unknown operator: BOOLEAN + BOOLEAN"),
            (
                "if (10 > 1) { true + false; }",
                "unknown operator: BOOLEAN + BOOLEAN",
            ),
            (
                "if (10 > 1) { if (10 > 1) { return true + false; } return 1; }",
                "unknown operator: BOOLEAN + BOOLEAN",
            ),
            ("foobar", "identifier not found: foobar"),
            ("\"a\" - \"b\"", "unknown operator: STRING - STRING"),
        ];

        for (input, expected) in cases {
            match eval(input) {
                Value::Error(message) => assert_eq!(message.as_ref(), expected, "input: {input}"),
                other => panic!("expected error for {input:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn let_statements() {
        let cases = [
            ("let a = 5; a;", 5),
            ("let a = 5 * 5; a;", 25),
            ("let a = 5; let b = a; b;", 5),
            ("let a = 5; let b = a; let c = a + b + 5; c;", 15),
        ];

        for (input, expected) in cases {
            assert!(matches!(eval(input), Value::Integer(v) if v == expected), "input: {input}");
        }
    }

    #[test]
    fn closures_capture_defining_environment() {
        let input = "\
            let newAdder = fn(x) { fn(y) { x + y }; };\
            let addTwo = newAdder(2);\
            addTwo(2);";
        assert!(matches!(eval(input), Value::Integer(4)));
    }

    #[test]
    fn shadowing_does_not_perturb_outer_binding() {
        let input = "let x = 10; let f = fn() { let x = 20; x; }; f(); x;";
        assert!(matches!(eval(input), Value::Integer(10)));
    }

    #[test]
    fn string_literals_and_concatenation() {
        assert!(matches!(eval("\"Hello World!\""), Value::String(s) if s.as_ref() == "Hello World!"));
        match eval("\"hello\" + \" \" + \"world\"") {
            Value::String(s) => assert_eq!(s.as_ref(), "hello world"),
            other => panic!("expected string, got {other:?}"),
        }
    }

    #[test]
    fn builtins_len_and_arrays() {
        assert!(matches!(eval("len(\"\")"), Value::Integer(0)));
        assert!(matches!(eval("len(\"four\")"), Value::Integer(4)));
        assert!(matches!(eval("len([1,2,3]) + len(\"abc\")"), Value::Integer(6)));

        match eval("len(1)") {
            Value::Error(m) => assert_eq!(m.as_ref(), "invalid argument. got INTEGER"),
            other => panic!("expected error, got {other:?}"),
        }

        match eval("len(\"one\", \"two\")") {
            Value::Error(m) => {
                assert_eq!(m.as_ref(), "wrong number of arguments. got 2, but expected 1")
            }
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[test]
    fn array_literals_and_indexing() {
        assert!(matches!(eval("[1, 2 * 2, 3 + 3][1]"), Value::Integer(4)));
        assert!(matches!(eval("let i = 0; [1][i];"), Value::Integer(1)));
        assert!(matches!(eval("[1, 2, 3][3]"), Value::Null));
        assert!(matches!(eval("[1, 2, 3][-1]"), Value::Null));
    }

    #[test]
    fn functions_as_values() {
        assert!(matches!(eval("let identity = fn(x) { x; }; identity(5);"), Value::Integer(5)));
        assert!(matches!(
            eval("let identity = fn(x) { return x; }; identity(5);"),
            Value::Integer(5)
        ));
        assert!(matches!(eval("fn(x) { x; }(5)"), Value::Integer(5)));
    }

    #[test]
    fn empty_program_is_null() {
        assert!(matches!(eval(""), Value::Null));
    }
}
