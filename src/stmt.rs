use std::rc::Rc;

use crate::{expr::Expr, token::Token};

/// A function body shared by its declaration and every closure built from it.
#[derive(Debug, Clone)]
pub struct Function {
    /// `None` for anonymous function expressions.
    pub name: Option<Token>,
    pub params: Vec<Token>,
    pub body: Vec<Stmt>,
}

impl Function {
    pub fn display_name(&self) -> &str {
        self.name.as_ref().map_or("", |name| name.lexeme.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct VarDecl {
    pub name: Token,
    pub initializer: Option<Expr>,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Block {
        statements: Vec<Stmt>,
    },
    Break {
        keyword: Token,
    },
    Class {
        name: Token,
        superclass: Option<Expr>,
        methods: Vec<Rc<Function>>,
    },
    Expression {
        expression: Expr,
    },
    Function(Rc<Function>),
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    Print {
        expression: Expr,
    },
    Return {
        keyword: Token,
        value: Option<Expr>,
    },
    /// `var a = 1, b;` declares each variable in order.
    Var {
        variables: Vec<VarDecl>,
    },
    While {
        condition: Expr,
        body: Box<Stmt>,
    },
}

/// A parsed unit of source: its statements plus, in interactive mode, a bare
/// trailing expression whose value is handed back to the caller.
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub statements: Vec<Stmt>,
    pub trailing: Option<Expr>,
}
