use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::{callable::Callable, instance::Instance, token::Literal};

/// A runtime value.
#[derive(Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(f64),
    Str(Rc<str>),
    Callable(Callable),
    Instance(Rc<RefCell<Instance>>),
}

impl Value {
    /// `nil` and `false` are falsy; everything else, `0` and `""` included,
    /// is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Bool(b) => *b,
            _ => true,
        }
    }

    pub fn string(s: impl Into<Rc<str>>) -> Self {
        Value::Str(s.into())
    }
}

impl From<&Literal> for Value {
    fn from(literal: &Literal) -> Self {
        match literal {
            Literal::StringLiteral(s) => Value::string(s.as_str()),
            Literal::BoolLiteral(b) => Value::Bool(*b),
            Literal::F64(f) => Value::Number(*f),
            Literal::Nil => Value::Nil,
        }
    }
}

// Values of different kinds are never equal. Callables and instances
// compare by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(b1), Value::Bool(b2)) => b1 == b2,
            (Value::Number(f1), Value::Number(f2)) => f1 == f2,
            (Value::Str(s1), Value::Str(s2)) => s1 == s2,
            (Value::Callable(c1), Value::Callable(c2)) => c1 == c2,
            (Value::Instance(i1), Value::Instance(i2)) => Rc::ptr_eq(i1, i2),
            _ => false,
        }
    }
}

// Instances can reach themselves through their fields, so Debug must not
// recurse into them.
impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "Nil"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Number(n) => write!(f, "Number({n:?})"),
            Value::Str(s) => write!(f, "Str({s:?})"),
            Value::Callable(callable) => write!(f, "Callable({callable})"),
            Value::Instance(_) => write!(f, "Instance({self})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_truthiness() {
        assert!(!Value::Nil.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Bool(true).is_truthy());
        assert!(Value::Number(0.0).is_truthy());
        assert!(Value::string("").is_truthy());
    }

    #[test]
    fn test_equality_never_crosses_kinds() {
        assert_eq!(Value::Number(1.0), Value::Number(1.0));
        assert_eq!(Value::string("a"), Value::string("a"));
        assert_ne!(Value::Nil, Value::Bool(false));
        assert_ne!(Value::Number(0.0), Value::Bool(false));
        assert_ne!(Value::string("1"), Value::Number(1.0));
        assert_ne!(Value::Number(f64::NAN), Value::Number(f64::NAN));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Nil.to_string(), "nil");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Number(7.0).to_string(), "7");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        assert_eq!(Value::Number(-0.5).to_string(), "-0.5");
        assert_eq!(Value::Number(f64::INFINITY).to_string(), "inf");
        assert_eq!(Value::string("hi").to_string(), "hi");
    }
}
