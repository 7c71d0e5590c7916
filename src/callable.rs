use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::{
    class::Class,
    environment::Environment,
    error::RuntimeError,
    instance::Instance,
    interpreter::{Flow, Interpreter},
    stmt,
    value::Value,
};

/// Anything that can appear in callee position.
#[derive(Clone, Debug)]
pub enum Callable {
    Function(Rc<Function>),
    Native(Rc<NativeFunction>),
    Class(Rc<Class>),
}

impl Callable {
    pub fn arity(&self) -> usize {
        match self {
            Callable::Function(function) => function.arity(),
            Callable::Native(native) => native.arity,
            Callable::Class(class) => class.arity(),
        }
    }

    /// Invoke with arguments whose count already matches [`Callable::arity`].
    pub fn call(
        &self,
        interpreter: &mut Interpreter,
        arguments: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        match self {
            Callable::Function(function) => function.call(interpreter, arguments),
            Callable::Native(native) => Ok((native.function)(&arguments)),
            Callable::Class(class) => {
                let instance = Value::Instance(Rc::new(RefCell::new(Instance::new(Rc::clone(
                    class,
                )))));
                if let Some(initializer) = class.find_method("init") {
                    initializer.bind(instance.clone()).call(interpreter, arguments)?;
                }
                Ok(instance)
            }
        }
    }
}

impl PartialEq for Callable {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Callable::Function(f1), Callable::Function(f2)) => Rc::ptr_eq(f1, f2),
            (Callable::Native(n1), Callable::Native(n2)) => Rc::ptr_eq(n1, n2),
            (Callable::Class(c1), Callable::Class(c2)) => Rc::ptr_eq(c1, c2),
            _ => false,
        }
    }
}

/// A user function: a declaration closed over the scope it was created in.
#[derive(Debug)]
pub struct Function {
    pub declaration: Rc<stmt::Function>,
    pub closure: Environment,
    pub is_initializer: bool,
}

impl Function {
    pub fn new(declaration: Rc<stmt::Function>, closure: Environment, is_initializer: bool) -> Self {
        Function {
            declaration,
            closure,
            is_initializer,
        }
    }

    pub fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    pub fn name(&self) -> Option<&str> {
        self.declaration.name.as_ref().map(|name| name.lexeme.as_str())
    }

    /// A copy of this method whose closure has `this` bound to `instance`.
    pub fn bind(&self, instance: Value) -> Function {
        let environment = Environment::with_enclosing(&self.closure);
        environment.define("this", instance);
        Function::new(Rc::clone(&self.declaration), environment, self.is_initializer)
    }

    pub fn call(
        &self,
        interpreter: &mut Interpreter,
        arguments: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        let environment = Environment::with_enclosing(&self.closure);
        for (param, argument) in self.declaration.params.iter().zip(arguments) {
            environment.define(&param.lexeme, argument);
        }

        let flow = interpreter.execute_block(&self.declaration.body, environment)?;

        // Initializers always hand back the instance, even on a bare `return;`.
        if self.is_initializer {
            return Ok(self.closure.get_name_at(0, "this").unwrap_or(Value::Nil));
        }
        match flow {
            Flow::Return(value) => Ok(value),
            Flow::Normal | Flow::Break => Ok(Value::Nil),
        }
    }
}

/// A function implemented by the host.
pub struct NativeFunction {
    pub name: &'static str,
    pub arity: usize,
    pub function: fn(&[Value]) -> Value,
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

/// Functions defined in the global scope before any user code runs.
pub fn natives() -> HashMap<&'static str, NativeFunction> {
    let mut natives = HashMap::new();
    natives.insert(
        "clock",
        NativeFunction {
            name: "clock",
            arity: 0,
            function: clock,
        },
    );
    natives
}

/// Seconds since the Unix epoch.
fn clock(_arguments: &[Value]) -> Value {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    Value::Number(elapsed.as_millis() as f64 / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_clock_native() {
        let natives = natives();
        let clock = natives.get("clock").expect("clock is defined");
        assert_eq!(clock.arity, 0);
        match (clock.function)(&[]) {
            Value::Number(seconds) => assert!(seconds > 0.0),
            other => panic!("clock returned {other:?}"),
        }
    }

    #[test]
    fn test_callables_compare_by_identity() {
        let native = Rc::new(NativeFunction {
            name: "clock",
            arity: 0,
            function: clock,
        });
        let same = Callable::Native(Rc::clone(&native));
        assert_eq!(Callable::Native(native), same);

        let other = Callable::Native(Rc::new(NativeFunction {
            name: "clock",
            arity: 0,
            function: clock,
        }));
        assert_ne!(same, other);
    }
}
