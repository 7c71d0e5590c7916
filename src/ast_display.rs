use std::fmt;

use crate::{
    callable::Callable,
    expr::*,
    token::{Literal, Token},
    value::Value,
};

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::BoolLiteral(b) => write!(f, "{b}"),
            Literal::F64(float) => write!(f, "{float}"),
            Literal::StringLiteral(s) => write!(f, "{s}"),
            Literal::Nil => write!(f, "nil"),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lexeme)
    }
}

fn parenthesize(f: &mut fmt::Formatter<'_>, name: &str, parts: &[&dyn fmt::Display]) -> fmt::Result {
    write!(f, "({name}")?;
    for part in parts {
        write!(f, " {part}")?;
    }
    write!(f, ")")
}

/// Prefix rendering used when debugging the parser, e.g. `(+ 1 (* 2 3))`.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.1 {
            ExprKind::Assign { name, value } => parenthesize(f, "=", &[name, value]),
            ExprKind::Binary {
                left,
                operator,
                right,
            }
            | ExprKind::Logical {
                left,
                operator,
                right,
            } => parenthesize(f, &operator.lexeme, &[left, right]),
            ExprKind::Call {
                callee, arguments, ..
            } => {
                write!(f, "(call {callee}")?;
                for argument in arguments {
                    write!(f, " {argument}")?;
                }
                write!(f, ")")
            }
            ExprKind::Comma { left, right } => parenthesize(f, ",", &[left, right]),
            ExprKind::Function(function) => {
                let params: Vec<&str> = function
                    .params
                    .iter()
                    .map(|param| param.lexeme.as_str())
                    .collect();
                write!(f, "(fun ({}))", params.join(" "))
            }
            ExprKind::Get { object, name } => parenthesize(f, "get", &[object, name]),
            ExprKind::Grouping { expression } => parenthesize(f, "group", &[expression]),
            ExprKind::LiteralExpr { value } => write!(f, "{value}"),
            ExprKind::Set {
                object,
                name,
                value,
            } => parenthesize(f, "set", &[object, name, value]),
            ExprKind::Super { method, .. } => parenthesize(f, "super", &[method]),
            ExprKind::Ternary {
                condition,
                then_branch,
                else_branch,
            } => parenthesize(f, "?:", &[condition, then_branch, else_branch]),
            ExprKind::This { .. } => write!(f, "this"),
            ExprKind::Unary { operator, right } => parenthesize(f, &operator.lexeme, &[right]),
            ExprKind::Variable { name } => write!(f, "{name}"),
        }
    }
}

impl fmt::Display for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Function(function) => match function.name() {
                Some(name) => write!(f, "<fn {name}>"),
                None => write!(f, "<fn>"),
            },
            Callable::Native(_) => write!(f, "<native fn>"),
            Callable::Class(class) => write!(f, "{}", class.name),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Callable(callable) => write!(f, "{callable}"),
            Value::Instance(instance) => write!(f, "{} instance", instance.borrow().class.name),
        }
    }
}
