use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::{
    callable::Callable,
    class::Class,
    error::{RuntimeError, RuntimeErrorKind},
    token::Token,
    value::Value,
};

#[derive(Debug)]
pub struct Instance {
    pub class: Rc<Class>,
    fields: HashMap<String, Value>,
}

impl Instance {
    pub fn new(class: Rc<Class>) -> Self {
        Instance {
            class,
            fields: HashMap::new(),
        }
    }

    /// Fields shadow methods. A method found on the class comes back bound
    /// to `this`.
    pub fn get(this: &Rc<RefCell<Instance>>, name: &Token) -> Result<Value, RuntimeError> {
        let instance = this.borrow();
        if let Some(value) = instance.fields.get(&name.lexeme) {
            return Ok(value.clone());
        }
        match instance.class.find_method(&name.lexeme) {
            Some(method) => {
                let bound = method.bind(Value::Instance(Rc::clone(this)));
                Ok(Value::Callable(Callable::Function(Rc::new(bound))))
            }
            None => Err(RuntimeError::new(
                name,
                RuntimeErrorKind::UndefinedProperty(name.lexeme.clone()),
            )),
        }
    }

    pub fn set(&mut self, name: &Token, value: Value) {
        self.fields.insert(name.lexeme.clone(), value);
    }
}
