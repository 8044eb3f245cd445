use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::object::Value;

/// A lexical scope: a name-to-value mapping plus an optional outer scope.
///
/// Reference-counted (rather than owned, as the teacher's `Environment`
/// was) because a closure's captured environment must outlive the call
/// frame that created it, and more than one closure may extend the same
/// captured environment independently — an owning `Box` chain can't express
/// that sharing.
#[derive(Debug)]
pub struct Environment {
    store: RefCell<HashMap<String, Value>>,
    outer: Option<EnvRef>,
}

pub type EnvRef = Rc<Environment>;

impl Environment {
    pub fn new() -> EnvRef {
        Rc::new(Environment {
            store: RefCell::new(HashMap::new()),
            outer: None,
        })
    }

    /// A new environment enclosed by `outer`, as created on function
    /// activation — enclosed by the function's *captured* environment, not
    /// by the caller's, which is what delivers lexical scoping.
    pub fn enclosed(outer: EnvRef) -> EnvRef {
        Rc::new(Environment {
            store: RefCell::new(HashMap::new()),
            outer: Some(outer),
        })
    }

    /// Walks the chain outward until `name` is found.
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.store.borrow().get(name) {
            return Some(value.clone());
        }
        self.outer.as_ref()?.get(name)
    }

    /// Writes always target the innermost environment — there is no
    /// assignment operator, only fresh `let`, so shadowing an outer name
    /// never perturbs it.
    pub fn set(&self, name: impl Into<String>, value: Value) {
        self.store.borrow_mut().insert(name.into(), value);
    }
}
