use std::fmt;
use std::rc::Rc;

use crate::environment::EnvRef;
use crate::parser::{Identifier, Statement};

/// A runtime value. `ReturnValue` and `Error` are control-flow carriers:
/// user code never produces either directly, they only ever exist to
/// propagate unwinding through nested evaluation and are stripped at
/// well-defined boundaries (see `evaluator`).
///
/// `Boolean`/`Null` are ordinary Rust value types rather than interned
/// pointers — see DESIGN.md for why that still delivers the "singleton"
/// identity-equality the language wants.
#[derive(Debug, Clone)]
pub enum Value {
    Integer(i64),
    Boolean(bool),
    Null,
    String(Rc<str>),
    /// Arrays are reference-counted and never mutated in place — every
    /// built-in that "modifies" an array (`rest`, `push`) allocates a fresh
    /// one, so sharing the backing `Vec` behind an `Rc` is safe.
    Array(Rc<Vec<Value>>),
    Function(Rc<FunctionObj>),
    Builtin(Rc<BuiltinObj>),
    ReturnValue(Box<Value>),
    Error(Rc<str>),
}

#[derive(Debug)]
pub struct FunctionObj {
    pub parameters: Vec<Identifier>,
    pub body: Statement,
    pub env: EnvRef,
}

pub type BuiltinFn = fn(&[Value]) -> Value;

pub struct BuiltinObj {
    pub name: &'static str,
    pub func: BuiltinFn,
}

impl fmt::Debug for BuiltinObj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuiltinObj").field("name", &self.name).finish()
    }
}

impl Value {
    /// The type name used in error message templates: `INTEGER`,
    /// `BOOLEAN`, `NULL`, `RETURN_VALUE`, `ERROR`, `FUNCTION`, `STRING`,
    /// `BUILTIN`, `ARRAY`.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "INTEGER",
            Value::Boolean(_) => "BOOLEAN",
            Value::Null => "NULL",
            Value::String(_) => "STRING",
            Value::Array(_) => "ARRAY",
            Value::Function(_) => "FUNCTION",
            Value::Builtin(_) => "BUILTIN",
            Value::ReturnValue(_) => "RETURN_VALUE",
            Value::Error(_) => "ERROR",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// Every value except `false` and `null` is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Boolean(false) | Value::Null)
    }

    pub fn error(message: impl Into<String>) -> Value {
        Value::Error(Rc::from(message.into()))
    }

    /// The embedding-facing rendering described in the evaluator's §6.2
    /// contract.
    pub fn inspect(&self) -> String {
        match self {
            Value::Integer(i) => i.to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Null => "null".to_string(),
            Value::String(s) => s.to_string(),
            Value::Array(elements) => {
                let items: Vec<_> = elements.iter().map(Value::inspect).collect();
                format!("[{}]", items.join(", "))
            }
            Value::Function(func) => {
                let params: Vec<_> = func.parameters.iter().map(|p| p.value.clone()).collect();
                format!("fn({}) {{\n{}\n}}", params.join(", "), func.body)
            }
            Value::Builtin(_) => "builtin function".to_string(),
            Value::ReturnValue(inner) => inner.inspect(),
            Value::Error(message) => format!("ERROR: {message}"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inspect())
    }
}
