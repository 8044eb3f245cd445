use std::rc::Rc;

use crate::object::{BuiltinFn, BuiltinObj, Value};

/// Global built-ins. Not rebindable — they live outside any `Environment`
/// and are consulted only when an identifier misses the whole chain.
pub fn lookup(name: &str) -> Option<Value> {
    let func: BuiltinFn = match name {
        "len" => len,
        "first" => first,
        "last" => last,
        "rest" => rest,
        "push" => push,
        "puts" => puts,
        _ => return None,
    };

    Some(Value::Builtin(Rc::new(BuiltinObj { name: leak_name(name), func })))
}

// Built-in names are a closed, fixed set, so interning them as `&'static
// str` via a small match avoids a per-call allocation without reaching for
// a heavier interning crate.
fn leak_name(name: &str) -> &'static str {
    match name {
        "len" => "len",
        "first" => "first",
        "last" => "last",
        "rest" => "rest",
        "push" => "push",
        "puts" => "puts",
        _ => unreachable!("lookup only calls leak_name for known builtins"),
    }
}

fn wrong_arity(got: usize, expected: usize) -> Value {
    Value::error(format!(
        "wrong number of arguments. got {got}, but expected {expected}"
    ))
}

fn len(args: &[Value]) -> Value {
    if args.len() != 1 {
        return wrong_arity(args.len(), 1);
    }

    match &args[0] {
        Value::String(s) => Value::Integer(s.chars().count() as i64),
        Value::Array(elements) => Value::Integer(elements.len() as i64),
        other => Value::error(format!("invalid argument. got {}", other.type_name())),
    }
}

fn first(args: &[Value]) -> Value {
    if args.len() != 1 {
        return wrong_arity(args.len(), 1);
    }

    match &args[0] {
        Value::Array(elements) => elements.first().cloned().unwrap_or(Value::Null),
        other => Value::error(format!(
            "invalid argument. got {}, but expected ARRAY",
            other.type_name()
        )),
    }
}

fn last(args: &[Value]) -> Value {
    if args.len() != 1 {
        return wrong_arity(args.len(), 1);
    }

    match &args[0] {
        Value::Array(elements) => elements.last().cloned().unwrap_or(Value::Null),
        other => Value::error(format!(
            "invalid argument. got {}, but expected ARRAY",
            other.type_name()
        )),
    }
}

fn rest(args: &[Value]) -> Value {
    if args.len() != 1 {
        return wrong_arity(args.len(), 1);
    }

    match &args[0] {
        Value::Array(elements) => {
            if elements.is_empty() {
                Value::Null
            } else {
                Value::Array(Rc::new(elements[1..].to_vec()))
            }
        }
        other => Value::error(format!(
            "invalid argument. got {}, but expected ARRAY",
            other.type_name()
        )),
    }
}

fn push(args: &[Value]) -> Value {
    if args.len() != 2 {
        return wrong_arity(args.len(), 2);
    }

    match &args[0] {
        Value::Array(elements) => {
            let mut new_elements = (**elements).clone();
            new_elements.push(args[1].clone());
            Value::Array(Rc::new(new_elements))
        }
        other => Value::error(format!(
            "invalid argument. got {}, but expected ARRAY",
            other.type_name()
        )),
    }
}

fn puts(args: &[Value]) -> Value {
    for arg in args {
        println!("{}", arg.inspect());
    }
    Value::Null
}
