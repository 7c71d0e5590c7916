//! Runtime scopes.
//!
//! An [`Environment`] is a shared handle to one scope. Every scope except the
//! global one points at its enclosing scope, and closures keep the scope they
//! were declared in alive for as long as they are reachable.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::mem;
use std::rc::Rc;

use crate::{
    error::{RuntimeError, RuntimeErrorKind},
    token::Token,
    value::Value,
};

struct Scope {
    values: HashMap<String, Value>,
    enclosing: Option<Environment>,
}

#[derive(Clone)]
pub struct Environment(Rc<RefCell<Scope>>);

impl Environment {
    /// A scope with no enclosing scope.
    pub fn new() -> Self {
        Environment(Rc::new(RefCell::new(Scope {
            values: HashMap::new(),
            enclosing: None,
        })))
    }

    pub fn with_enclosing(enclosing: &Environment) -> Self {
        Environment(Rc::new(RefCell::new(Scope {
            values: HashMap::new(),
            enclosing: Some(enclosing.clone()),
        })))
    }

    /// Insert or overwrite `name` in this scope.
    pub fn define(&self, name: &str, value: Value) {
        self.0.borrow_mut().values.insert(name.to_owned(), value);
    }

    fn enclosing(&self) -> Option<Environment> {
        self.0.borrow().enclosing.clone()
    }

    fn ancestor(&self, hops: usize) -> Option<Environment> {
        let mut environment = self.clone();
        for _ in 0..hops {
            environment = environment.enclosing()?;
        }
        Some(environment)
    }

    fn root(&self) -> Environment {
        let mut environment = self.clone();
        while let Some(enclosing) = environment.enclosing() {
            environment = enclosing;
        }
        environment
    }

    fn get_here(&self, name: &str) -> Option<Value> {
        self.0.borrow().values.get(name).cloned()
    }

    /// Read `name` from the scope exactly `hops` links up the chain.
    pub fn get_at(&self, hops: usize, name: &Token) -> Result<Value, RuntimeError> {
        self.get_name_at(hops, &name.lexeme)
            .ok_or_else(|| undefined_variable(name))
    }

    pub fn get_name_at(&self, hops: usize, name: &str) -> Option<Value> {
        self.ancestor(hops)?.get_here(name)
    }

    pub fn assign_at(&self, hops: usize, name: &Token, value: Value) -> Result<(), RuntimeError> {
        let environment = self.ancestor(hops).ok_or_else(|| undefined_variable(name))?;
        let mut scope = environment.0.borrow_mut();
        match scope.values.get_mut(&name.lexeme) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(undefined_variable(name)),
        }
    }

    /// Look `name` up directly in the global scope.
    pub fn get_global(&self, name: &Token) -> Result<Value, RuntimeError> {
        self.root()
            .get_here(&name.lexeme)
            .ok_or_else(|| undefined_variable(name))
    }

    pub fn assign_global(&self, name: &Token, value: Value) -> Result<(), RuntimeError> {
        self.root().assign_at(0, name, value)
    }

    /// Names defined directly in this scope.
    pub fn names(&self) -> Vec<String> {
        self.0.borrow().values.keys().cloned().collect()
    }

    /// Drop every value in this scope. A function defined here holds this
    /// scope as its closure, so the two keep each other alive until cleared.
    pub fn clear(&self) {
        let values = mem::take(&mut self.0.borrow_mut().values);
        drop(values);
    }

    /// Search outward from this scope by name. Only used to inspect state
    /// from outside the interpreter.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        let mut environment = Some(self.clone());
        while let Some(current) = environment {
            if let Some(value) = current.get_here(name) {
                return Some(value);
            }
            environment = current.enclosing();
        }
        None
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::new()
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scope = self.0.borrow();
        let mut names: Vec<_> = scope.values.keys().collect();
        names.sort();
        f.debug_struct("Environment")
            .field("names", &names)
            .field("enclosing", &scope.enclosing)
            .finish()
    }
}

fn undefined_variable(name: &Token) -> RuntimeError {
    RuntimeError::new(
        name,
        RuntimeErrorKind::UndefinedVariable(name.lexeme.clone()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token_type::TokenType;
    use pretty_assertions::assert_eq;

    fn name(lexeme: &str) -> Token {
        Token::new(TokenType::Identifier, lexeme, 1)
    }

    #[test]
    fn test_define_overwrites_in_scope() {
        let globals = Environment::new();
        globals.define("a", Value::Number(1.0));
        globals.define("a", Value::Number(2.0));
        assert_eq!(globals.get_at(0, &name("a")), Ok(Value::Number(2.0)));
    }

    #[test]
    fn test_hops_select_scope() {
        let globals = Environment::new();
        globals.define("a", Value::string("global"));
        let block = Environment::with_enclosing(&globals);
        block.define("a", Value::string("block"));
        let inner = Environment::with_enclosing(&block);

        assert_eq!(inner.get_at(1, &name("a")), Ok(Value::string("block")));
        assert_eq!(inner.get_at(2, &name("a")), Ok(Value::string("global")));
        assert_eq!(inner.get_global(&name("a")), Ok(Value::string("global")));
        assert!(inner.get_at(0, &name("a")).is_err());

        inner
            .assign_at(2, &name("a"), Value::Number(3.0))
            .expect("assign global");
        assert_eq!(globals.lookup("a"), Some(Value::Number(3.0)));
        assert_eq!(block.lookup("a"), Some(Value::string("block")));
    }

    #[test]
    fn test_undefined_global() {
        let globals = Environment::new();
        let error = globals
            .get_global(&name("missing"))
            .expect_err("missing global");
        assert_eq!(
            error.kind,
            RuntimeErrorKind::UndefinedVariable("missing".to_owned())
        );
        assert!(globals
            .assign_global(&name("missing"), Value::Nil)
            .is_err());
    }

    #[test]
    fn test_clear_and_names() {
        let globals = Environment::new();
        globals.define("a", Value::Nil);
        globals.define("b", Value::Nil);
        let mut names = globals.names();
        names.sort();
        assert_eq!(names, vec!["a", "b"]);

        globals.clear();
        assert!(globals.names().is_empty());
        assert_eq!(globals.lookup("a"), None);
    }

    #[test]
    fn test_shared_enclosing_scope() {
        let globals = Environment::new();
        let shared = Environment::with_enclosing(&globals);
        shared.define("count", Value::Number(0.0));
        let first = Environment::with_enclosing(&shared);
        let second = Environment::with_enclosing(&shared);

        first
            .assign_at(1, &name("count"), Value::Number(1.0))
            .expect("assign through first");
        assert_eq!(second.get_at(1, &name("count")), Ok(Value::Number(1.0)));
    }
}
