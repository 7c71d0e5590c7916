use std::collections::HashMap;
use std::mem;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::{
    callable::{self, Callable, Function},
    class::Class,
    config::Config,
    environment::Environment,
    error::{RuntimeError, RuntimeErrorKind},
    expr::{Expr, ExprId, ExprKind},
    instance::Instance,
    print_handler::PrintHandler,
    resolver::Bindings,
    stack::ensure_sufficient_stack,
    stmt::{self, Program, Stmt},
    token::Token,
    token_type::TokenType,
    value::Value,
};

/// How control leaves a statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    Normal,
    Return(Value),
    Break,
}

pub struct Interpreter {
    globals: Environment,
    environment: Environment,
    locals: Bindings,
    output: PrintHandler,
    max_call_depth: usize,
    call_depth: usize,
}

impl Interpreter {
    pub fn new(config: &Config) -> Self {
        let globals = Environment::new();
        for (name, native) in callable::natives() {
            globals.define(name, Value::Callable(Callable::Native(Rc::new(native))));
        }

        Interpreter {
            environment: globals.clone(),
            globals,
            locals: HashMap::new(),
            output: config.output.clone(),
            max_call_depth: config.max_call_depth,
            call_depth: 0,
        }
    }

    pub fn globals(&self) -> &Environment {
        &self.globals
    }

    /// Merge the binding table produced by the resolver for a program that is
    /// about to run.
    pub fn resolve(&mut self, bindings: Bindings) {
        self.locals.extend(bindings);
    }

    /// Run every statement in order, stopping at the first runtime error.
    /// Returns the value of the trailing expression if there is one.
    pub fn interpret(&mut self, program: &Program) -> Result<Option<Value>, RuntimeError> {
        self.environment = self.globals.clone();
        self.call_depth = 0;

        for statement in &program.statements {
            statement.interpret(self)?;
        }
        program
            .trailing
            .as_ref()
            .map(|expr| expr.interpret(self))
            .transpose()
    }

    /// Run `statements` in `environment`, restoring the current environment
    /// afterwards whether or not they complete.
    pub fn execute_block(
        &mut self,
        statements: &[Stmt],
        environment: Environment,
    ) -> Result<Flow, RuntimeError> {
        let previous = mem::replace(&mut self.environment, environment);
        let result = self.execute_statements(statements);
        self.environment = previous;
        result
    }

    fn execute_statements(&mut self, statements: &[Stmt]) -> Result<Flow, RuntimeError> {
        for statement in statements {
            match statement.interpret(self)? {
                Flow::Normal => {}
                flow => return Ok(flow),
            }
        }
        Ok(Flow::Normal)
    }

    fn look_up_variable(&self, id: ExprId, name: &Token) -> Result<Value, RuntimeError> {
        match self.locals.get(&id) {
            Some(&hops) => self.environment.get_at(hops, name),
            None => self.globals.get_global(name),
        }
    }

    fn call(
        &mut self,
        callable: &Callable,
        arguments: Vec<Value>,
        paren: &Token,
    ) -> Result<Value, RuntimeError> {
        if arguments.len() != callable.arity() {
            return Err(RuntimeError::new(
                paren,
                RuntimeErrorKind::Arity {
                    callee: callable.to_string(),
                    expected: callable.arity(),
                    got: arguments.len(),
                },
            ));
        }
        if self.call_depth >= self.max_call_depth {
            return Err(RuntimeError::new(paren, RuntimeErrorKind::StackOverflow));
        }

        self.call_depth += 1;
        trace!(callee = %callable, depth = self.call_depth, "call");
        let result = callable.call(self, arguments);
        self.call_depth -= 1;
        result
    }

    fn declare_class(
        &mut self,
        name: &Token,
        superclass: Option<&Expr>,
        methods: &[Rc<stmt::Function>],
    ) -> Result<(), RuntimeError> {
        let superclass = match superclass {
            Some(expr) => match expr.interpret(self)? {
                Value::Callable(Callable::Class(class)) => Some(class),
                _ => {
                    let token = match &expr.1 {
                        ExprKind::Variable { name } => name,
                        _ => name,
                    };
                    return Err(RuntimeError::new(
                        token,
                        RuntimeErrorKind::SuperclassNotClass,
                    ));
                }
            },
            None => None,
        };

        self.environment.define(&name.lexeme, Value::Nil);

        let method_closure = match &superclass {
            Some(superclass) => {
                let environment = Environment::with_enclosing(&self.environment);
                environment.define(
                    "super",
                    Value::Callable(Callable::Class(Rc::clone(superclass))),
                );
                environment
            }
            None => self.environment.clone(),
        };

        let methods = methods
            .iter()
            .map(|method| {
                let method_name = method.display_name().to_owned();
                let is_initializer = method_name == "init";
                let function = Function::new(Rc::clone(method), method_closure.clone(), is_initializer);
                (method_name, Rc::new(function))
            })
            .collect();

        debug!(class = %name.lexeme, "declare class");
        let class = Class::new(name.lexeme.clone(), superclass, methods);
        self.environment
            .define(&name.lexeme, Value::Callable(Callable::Class(Rc::new(class))));
        Ok(())
    }

    fn super_method(&self, id: ExprId, keyword: &Token, method: &Token) -> Result<Value, RuntimeError> {
        let undefined_super = || {
            RuntimeError::new(
                keyword,
                RuntimeErrorKind::UndefinedVariable(keyword.lexeme.clone()),
            )
        };
        let hops = *self.locals.get(&id).ok_or_else(undefined_super)?;

        // `this` always lives in the scope just inside the one holding `super`.
        let superclass = match self.environment.get_name_at(hops, "super") {
            Some(Value::Callable(Callable::Class(class))) => class,
            _ => return Err(undefined_super()),
        };
        let instance = hops
            .checked_sub(1)
            .and_then(|hops| self.environment.get_name_at(hops, "this"))
            .unwrap_or(Value::Nil);

        match superclass.find_method(&method.lexeme) {
            Some(function) => Ok(Value::Callable(Callable::Function(Rc::new(
                function.bind(instance),
            )))),
            None => Err(RuntimeError::new(
                method,
                RuntimeErrorKind::UndefinedProperty(method.lexeme.clone()),
            )),
        }
    }
}

impl Drop for Interpreter {
    fn drop(&mut self) {
        self.globals.clear();
    }
}

trait Interpret {
    type Output;

    fn interpret(&self, interpreter: &mut Interpreter) -> Result<Self::Output, RuntimeError>;
}

impl Interpret for Stmt {
    type Output = Flow;

    fn interpret(&self, interpreter: &mut Interpreter) -> Result<Flow, RuntimeError> {
        ensure_sufficient_stack(|| -> Result<Flow, RuntimeError> {
            match self {
                Stmt::Block { statements } => {
                    let environment = Environment::with_enclosing(&interpreter.environment);
                    return interpreter.execute_block(statements, environment);
                }
                Stmt::Break { .. } => return Ok(Flow::Break),
                Stmt::Class {
                    name,
                    superclass,
                    methods,
                } => interpreter.declare_class(name, superclass.as_ref(), methods)?,
                Stmt::Expression { expression } => {
                    expression.interpret(interpreter)?;
                }
                Stmt::Function(declaration) => {
                    let function = Function::new(
                        Rc::clone(declaration),
                        interpreter.environment.clone(),
                        false,
                    );
                    interpreter.environment.define(
                        declaration.display_name(),
                        Value::Callable(Callable::Function(Rc::new(function))),
                    );
                }
                Stmt::If {
                    condition,
                    then_branch,
                    else_branch,
                } => {
                    if condition.interpret(interpreter)?.is_truthy() {
                        return then_branch.interpret(interpreter);
                    } else if let Some(else_branch) = else_branch {
                        return else_branch.interpret(interpreter);
                    }
                }
                Stmt::Print { expression } => {
                    let value = expression.interpret(interpreter)?;
                    interpreter.output.println(&value.to_string());
                }
                Stmt::Return { value, .. } => {
                    let value = match value {
                        Some(expr) => expr.interpret(interpreter)?,
                        None => Value::Nil,
                    };
                    return Ok(Flow::Return(value));
                }
                Stmt::Var { variables } => {
                    for variable in variables {
                        let value = match &variable.initializer {
                            Some(expr) => expr.interpret(interpreter)?,
                            None => Value::Nil,
                        };
                        interpreter.environment.define(&variable.name.lexeme, value);
                    }
                }
                Stmt::While { condition, body } => {
                    while condition.interpret(interpreter)?.is_truthy() {
                        match body.interpret(interpreter)? {
                            Flow::Normal => {}
                            Flow::Break => break,
                            flow @ Flow::Return(_) => return Ok(flow),
                        }
                    }
                }
            };
            Ok(Flow::Normal)
        })
    }
}

impl Interpret for Expr {
    type Output = Value;

    fn interpret(&self, interpreter: &mut Interpreter) -> Result<Value, RuntimeError> {
        ensure_sufficient_stack(|| -> Result<Value, RuntimeError> {
            match &self.1 {
                ExprKind::Assign { name, value } => {
                    let value = value.interpret(interpreter)?;
                    match interpreter.locals.get(&self.0) {
                        Some(&hops) => interpreter.environment.assign_at(hops, name, value.clone())?,
                        None => interpreter.globals.assign_global(name, value.clone())?,
                    }
                    Ok(value)
                }
                ExprKind::Binary {
                    left,
                    operator,
                    right,
                } => {
                    let left = left.interpret(interpreter)?;
                    let right = right.interpret(interpreter)?;

                    match operator.typ {
                        TokenType::Plus => match (left, right) {
                            (Value::Number(f1), Value::Number(f2)) => Ok(Value::Number(f1 + f2)),
                            (Value::Str(s1), Value::Str(s2)) => {
                                Ok(Value::string(format!("{s1}{s2}")))
                            }
                            _ => Err(RuntimeError::new(operator, RuntimeErrorKind::AddOperands)),
                        },
                        TokenType::Minus => {
                            let (left, right) = get_numeric_operands(operator, &left, &right)?;
                            Ok(Value::Number(left - right))
                        }
                        TokenType::Slash => {
                            let (left, right) = get_numeric_operands(operator, &left, &right)?;
                            Ok(Value::Number(left / right))
                        }
                        TokenType::Star => {
                            let (left, right) = get_numeric_operands(operator, &left, &right)?;
                            Ok(Value::Number(left * right))
                        }
                        TokenType::Greater => {
                            let (left, right) = get_numeric_operands(operator, &left, &right)?;
                            Ok(Value::Bool(left > right))
                        }
                        TokenType::GreaterEqual => {
                            let (left, right) = get_numeric_operands(operator, &left, &right)?;
                            Ok(Value::Bool(left >= right))
                        }
                        TokenType::Less => {
                            let (left, right) = get_numeric_operands(operator, &left, &right)?;
                            Ok(Value::Bool(left < right))
                        }
                        TokenType::LessEqual => {
                            let (left, right) = get_numeric_operands(operator, &left, &right)?;
                            Ok(Value::Bool(left <= right))
                        }
                        TokenType::BangEqual => Ok(Value::Bool(left != right)),
                        TokenType::EqualEqual => Ok(Value::Bool(left == right)),
                        _ => unreachable!("parser only builds binary expressions from binary operators"),
                    }
                }
                ExprKind::Call {
                    callee,
                    paren,
                    arguments,
                } => {
                    let callee = callee.interpret(interpreter)?;
                    let arguments = arguments
                        .iter()
                        .map(|argument| argument.interpret(interpreter))
                        .collect::<Result<Vec<_>, _>>()?;

                    match callee {
                        Value::Callable(callable) => interpreter.call(&callable, arguments, paren),
                        _ => Err(RuntimeError::new(paren, RuntimeErrorKind::NotCallable)),
                    }
                }
                ExprKind::Comma { left, right } => {
                    left.interpret(interpreter)?;
                    right.interpret(interpreter)
                }
                ExprKind::Function(declaration) => {
                    let function = Function::new(
                        Rc::clone(declaration),
                        interpreter.environment.clone(),
                        false,
                    );
                    Ok(Value::Callable(Callable::Function(Rc::new(function))))
                }
                ExprKind::Get { object, name } => match object.interpret(interpreter)? {
                    Value::Instance(instance) => Instance::get(&instance, name),
                    _ => Err(RuntimeError::new(
                        name,
                        RuntimeErrorKind::PropertyOnNonInstance,
                    )),
                },
                ExprKind::Grouping { expression } => expression.interpret(interpreter),
                ExprKind::LiteralExpr { value } => Ok(Value::from(value)),
                ExprKind::Logical {
                    left,
                    operator,
                    right,
                } => {
                    let left = left.interpret(interpreter)?;
                    let short_circuit = match operator.typ {
                        TokenType::Or => left.is_truthy(),
                        _ => !left.is_truthy(),
                    };
                    if short_circuit {
                        Ok(left)
                    } else {
                        right.interpret(interpreter)
                    }
                }
                ExprKind::Set {
                    object,
                    name,
                    value,
                } => {
                    let Value::Instance(instance) = object.interpret(interpreter)? else {
                        return Err(RuntimeError::new(
                            name,
                            RuntimeErrorKind::FieldOnNonInstance,
                        ));
                    };
                    let value = value.interpret(interpreter)?;
                    instance.borrow_mut().set(name, value.clone());
                    Ok(value)
                }
                ExprKind::Super { keyword, method } => {
                    interpreter.super_method(self.0, keyword, method)
                }
                ExprKind::Ternary {
                    condition,
                    then_branch,
                    else_branch,
                } => {
                    if condition.interpret(interpreter)?.is_truthy() {
                        then_branch.interpret(interpreter)
                    } else {
                        else_branch.interpret(interpreter)
                    }
                }
                ExprKind::This { keyword } => interpreter.look_up_variable(self.0, keyword),
                ExprKind::Unary { operator, right } => {
                    let right = right.interpret(interpreter)?;
                    match operator.typ {
                        TokenType::Bang => Ok(Value::Bool(!right.is_truthy())),
                        TokenType::Minus => match right {
                            Value::Number(value) => Ok(Value::Number(-value)),
                            _ => Err(RuntimeError::new(operator, RuntimeErrorKind::NumberOperand)),
                        },
                        _ => unreachable!("parser only builds unary expressions from '!' and '-'"),
                    }
                }
                ExprKind::Variable { name } => interpreter.look_up_variable(self.0, name),
            }
        })
    }
}

fn get_numeric_operands(
    operator: &Token,
    left: &Value,
    right: &Value,
) -> Result<(f64, f64), RuntimeError> {
    match (left, right) {
        (Value::Number(left), Value::Number(right)) => Ok((*left, *right)),
        _ => Err(RuntimeError::new(operator, RuntimeErrorKind::NumberOperands)),
    }
}
