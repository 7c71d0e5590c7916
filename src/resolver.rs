//! Static pass between parsing and execution.
//!
//! Walks the whole program once, tracking the stack of block scopes, and
//! records for every local variable reference how many scopes separate it from
//! its declaration. References that are not found in any scope are globals and
//! get no entry. Misuse the interpreter could not sensibly recover from
//! (`return` at top level, `this` outside a class, unused locals, ...) is
//! reported here so the program never starts.

use std::collections::{HashMap, HashSet};
use std::mem;

use tracing::debug;

use crate::{
    error::{Diagnostic, ResolveError},
    expr::{Expr, ExprId, ExprKind},
    stack::ensure_sufficient_stack,
    stmt::{Function, Program, Stmt},
    token::Token,
};

/// Scope distance for each resolved local reference.
pub type Bindings = HashMap<ExprId, usize>;

#[derive(Clone, Copy, PartialEq, Eq)]
enum FunctionType {
    Function,
    Initializer,
    Method,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ClassType {
    Class,
    Subclass,
}

struct Local {
    token: Token,
    defined: bool,
    used: bool,
    order: usize,
}

#[derive(Default)]
pub struct Resolver {
    scopes: Vec<HashMap<String, Local>>,
    function_stack: Vec<FunctionType>,
    class_stack: Vec<ClassType>,
    loop_depth: usize,
    /// Globals declared so far, including those from earlier runs.
    globals: HashSet<String>,
    bindings: Bindings,
    errors: Vec<Diagnostic>,
}

pub fn resolve(program: &Program) -> Result<Bindings, Vec<Diagnostic>> {
    resolve_with_globals(program, std::iter::empty())
}

/// Resolve `program` knowing that `globals` are already defined, e.g. by
/// natives or by earlier interactive lines.
pub fn resolve_with_globals<I>(program: &Program, globals: I) -> Result<Bindings, Vec<Diagnostic>>
where
    I: IntoIterator<Item = String>,
{
    let mut resolver = Resolver {
        globals: globals.into_iter().collect(),
        ..Resolver::default()
    };
    resolver.resolve_statements(&program.statements);
    if let Some(trailing) = &program.trailing {
        trailing.resolve(&mut resolver);
    }

    debug!(
        bindings = resolver.bindings.len(),
        errors = resolver.errors.len(),
        "resolved program"
    );
    if resolver.errors.is_empty() {
        Ok(resolver.bindings)
    } else {
        let mut errors = resolver.errors;
        errors.sort_by_key(|error| error.line);
        Err(errors)
    }
}

trait Resolve {
    fn resolve(&self, resolver: &mut Resolver);
}

impl Resolve for Stmt {
    fn resolve(&self, resolver: &mut Resolver) {
        ensure_sufficient_stack(|| match self {
            Stmt::Block { statements } => {
                resolver.begin_scope();
                resolver.resolve_statements(statements);
                resolver.end_scope();
            }
            Stmt::Break { keyword } => {
                if resolver.loop_depth == 0 {
                    resolver.error(keyword, ResolveError::BreakOutsideLoop);
                }
            }
            Stmt::Class {
                name,
                superclass,
                methods,
            } => {
                resolver.class_stack.push(ClassType::Class);
                resolver.declare(name);
                resolver.define(name);

                if let Some(superclass) = superclass {
                    if let ExprKind::Variable { name: parent } = &superclass.1 {
                        if parent.lexeme == name.lexeme {
                            resolver.error(parent, ResolveError::InheritFromSelf);
                        }
                    }
                    if let Some(class_type) = resolver.class_stack.last_mut() {
                        *class_type = ClassType::Subclass;
                    }
                    superclass.resolve(resolver);

                    resolver.begin_scope();
                    resolver.define_implicit("super", name);
                }

                resolver.begin_scope();
                resolver.define_implicit("this", name);
                for method in methods {
                    let kind = if method.display_name() == "init" {
                        FunctionType::Initializer
                    } else {
                        FunctionType::Method
                    };
                    resolver.resolve_function(method, kind);
                }
                resolver.end_scope();

                if superclass.is_some() {
                    resolver.end_scope();
                }
                resolver.class_stack.pop();
            }
            Stmt::Expression { expression } | Stmt::Print { expression } => {
                expression.resolve(resolver)
            }
            Stmt::Function(function) => {
                if let Some(name) = &function.name {
                    resolver.declare(name);
                    resolver.define(name);
                }
                resolver.resolve_function(function, FunctionType::Function);
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                condition.resolve(resolver);
                then_branch.resolve(resolver);
                if let Some(stmt) = else_branch {
                    stmt.resolve(resolver);
                }
            }
            Stmt::Return { keyword, value } => {
                match resolver.function_stack.last().copied() {
                    None => resolver.error(keyword, ResolveError::ReturnAtTopLevel),
                    Some(FunctionType::Initializer) if value.is_some() => {
                        resolver.error(keyword, ResolveError::ReturnFromInitializer)
                    }
                    Some(_) => {}
                }
                if let Some(expr) = value {
                    expr.resolve(resolver);
                }
            }
            Stmt::Var { variables } => {
                for variable in variables {
                    resolver.declare(&variable.name);
                    if let Some(expr) = &variable.initializer {
                        expr.resolve(resolver);
                    }
                    resolver.define(&variable.name);
                }
            }
            Stmt::While { condition, body } => {
                condition.resolve(resolver);
                resolver.loop_depth += 1;
                body.resolve(resolver);
                resolver.loop_depth -= 1;
            }
        })
    }
}

impl Resolve for Expr {
    fn resolve(&self, resolver: &mut Resolver) {
        ensure_sufficient_stack(|| match &self.1 {
            ExprKind::Assign { name, value } => {
                value.resolve(resolver);
                resolver.resolve_local(self.0, name, 0);
            }
            ExprKind::Binary { left, right, .. }
            | ExprKind::Comma { left, right }
            | ExprKind::Logical { left, right, .. } => {
                left.resolve(resolver);
                right.resolve(resolver);
            }
            ExprKind::Call {
                callee, arguments, ..
            } => {
                callee.resolve(resolver);
                for argument in arguments {
                    argument.resolve(resolver);
                }
            }
            ExprKind::Function(function) => {
                resolver.resolve_function(function, FunctionType::Function)
            }
            ExprKind::Get { object, .. } => object.resolve(resolver),
            ExprKind::Grouping { expression } => expression.resolve(resolver),
            ExprKind::LiteralExpr { .. } => {}
            ExprKind::Set { object, value, .. } => {
                value.resolve(resolver);
                object.resolve(resolver);
            }
            ExprKind::Super { keyword, .. } => {
                match resolver.class_stack.last().copied() {
                    None => resolver.error(keyword, ResolveError::SuperOutsideClass),
                    Some(ClassType::Class) => {
                        resolver.error(keyword, ResolveError::SuperWithoutSuperclass)
                    }
                    Some(ClassType::Subclass) => {}
                }
                resolver.resolve_local(self.0, keyword, 0);
            }
            ExprKind::Ternary {
                condition,
                then_branch,
                else_branch,
            } => {
                condition.resolve(resolver);
                then_branch.resolve(resolver);
                else_branch.resolve(resolver);
            }
            ExprKind::This { keyword } => {
                if resolver.class_stack.is_empty() {
                    resolver.error(keyword, ResolveError::ThisOutsideClass);
                } else {
                    resolver.resolve_local(self.0, keyword, 0);
                }
            }
            ExprKind::Unary { right, .. } => right.resolve(resolver),
            ExprKind::Variable { name } => {
                let initializing = resolver
                    .scopes
                    .last()
                    .and_then(|scope| scope.get(&name.lexeme))
                    .is_some_and(|local| !local.defined);

                if !initializing {
                    resolver.resolve_local(self.0, name, 0);
                } else if !resolver.resolve_local(self.0, name, 1)
                    && !resolver.globals.contains(&name.lexeme)
                {
                    // The initializer may read an enclosing local or a global
                    // declared earlier, never the variable being declared.
                    resolver.error(
                        name,
                        ResolveError::OwnInitializer {
                            name: name.lexeme.clone(),
                        },
                    );
                }
            }
        })
    }
}

impl Resolver {
    fn error(&mut self, token: &Token, error: ResolveError) {
        self.errors.push(Diagnostic::at(token, error));
    }

    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn end_scope(&mut self) {
        let Some(scope) = self.scopes.pop() else {
            return;
        };
        let mut unused: Vec<Local> = scope.into_values().filter(|local| !local.used).collect();
        unused.sort_by_key(|local| local.order);
        for local in unused {
            let name = local.token.lexeme.clone();
            self.error(&local.token, ResolveError::UnusedLocal { name });
        }
    }

    fn declare(&mut self, name: &Token) {
        let Some(scope) = self.scopes.last_mut() else {
            self.globals.insert(name.lexeme.clone());
            return;
        };
        if scope.contains_key(&name.lexeme) {
            self.errors.push(Diagnostic::at(
                name,
                ResolveError::AlreadyDeclared {
                    name: name.lexeme.clone(),
                },
            ));
        }
        let order = scope.len();
        scope.insert(
            name.lexeme.clone(),
            Local {
                token: name.clone(),
                defined: false,
                used: false,
                order,
            },
        );
    }

    fn define(&mut self, name: &Token) {
        if let Some(local) = self
            .scopes
            .last_mut()
            .and_then(|scope| scope.get_mut(&name.lexeme))
        {
            local.defined = true;
        }
    }

    /// `this` and `super` live in their own scopes and are never reported.
    fn define_implicit(&mut self, name: &str, class: &Token) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(
                name.to_owned(),
                Local {
                    token: class.clone(),
                    defined: true,
                    used: true,
                    order: 0,
                },
            );
        }
    }

    /// Bind `id` to the innermost scope declaring `name`, ignoring the
    /// innermost `skip` scopes. Returns false when the name is global.
    fn resolve_local(&mut self, id: ExprId, name: &Token, skip: usize) -> bool {
        for (hops, scope) in self.scopes.iter_mut().rev().enumerate().skip(skip) {
            if let Some(local) = scope.get_mut(&name.lexeme) {
                local.used = true;
                self.bindings.insert(id, hops);
                return true;
            }
        }
        false
    }

    fn resolve_function(&mut self, function: &Function, kind: FunctionType) {
        self.function_stack.push(kind);
        let enclosing_loops = mem::take(&mut self.loop_depth);

        self.begin_scope();
        for param in &function.params {
            self.declare(param);
            self.define(param);
        }
        self.resolve_statements(&function.body);
        self.end_scope();

        self.loop_depth = enclosing_loops;
        self.function_stack.pop();
    }

    fn resolve_statements(&mut self, statements: &[Stmt]) {
        for statement in statements {
            statement.resolve(self);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::Mode, parser::parse, scanner::Scanner};
    use pretty_assertions::assert_eq;

    fn parse_program(source: &str) -> Program {
        let (tokens, errors) = Scanner::new(source).scan_tokens();
        assert!(errors.is_empty(), "unexpected scan errors: {errors:?}");
        match parse(&tokens, Mode::Script) {
            Ok(program) => program,
            Err(errors) => panic!("unexpected parse errors: {errors:?}"),
        }
    }

    fn resolve_source(source: &str) -> Result<Bindings, Vec<Diagnostic>> {
        resolve(&parse_program(source))
    }

    fn messages(source: &str) -> Vec<String> {
        match resolve_source(source) {
            Ok(bindings) => panic!("expected errors, resolved {} bindings", bindings.len()),
            Err(errors) => errors.iter().map(|e| e.to_string()).collect(),
        }
    }

    #[test]
    fn test_globals_are_not_bound() {
        let bindings = match resolve_source("var a = 1; print a; a = 2;") {
            Ok(bindings) => bindings,
            Err(errors) => panic!("unexpected errors: {errors:?}"),
        };
        assert!(bindings.is_empty());
    }

    #[test]
    fn test_local_distances() {
        let bindings = match resolve_source("{ var a = 1; { print a; } print a; }") {
            Ok(bindings) => bindings,
            Err(errors) => panic!("unexpected errors: {errors:?}"),
        };
        let mut distances: Vec<usize> = bindings.values().copied().collect();
        distances.sort();
        assert_eq!(distances, vec![0, 1]);
    }

    #[test]
    fn test_unused_shadowing_local() {
        let source = "var A = \"A\";\n{\n  fun outputA() { print A; }\n  outputA();\n  var A = \"a\";\n  outputA();\n}";
        assert_eq!(
            messages(source),
            vec!["[line 5] Error at 'A': Local variable 'A' is never used."]
        );
    }

    #[test]
    fn test_unused_parameter() {
        assert_eq!(
            messages("fun f(a, b) { return a; } f(1, 2);"),
            vec!["[line 1] Error at 'b': Local variable 'b' is never used."]
        );
    }

    #[test]
    fn test_already_declared() {
        assert_eq!(
            messages("{ var a = 1; var a = 2; print a; }"),
            vec!["[line 1] Error at 'a': Already a variable named 'a' in this scope."]
        );
    }

    #[test]
    fn test_own_initializer() {
        assert_eq!(
            messages("{ var a = a; print a; }"),
            vec!["[line 1] Error at 'a': Can't read local variable 'a' in its own initializer."]
        );
        // A global declared later does not count.
        assert_eq!(
            messages("{ var a = a; print a; }\nvar a = 1;"),
            vec!["[line 1] Error at 'a': Can't read local variable 'a' in its own initializer."]
        );
        // An enclosing local or an earlier global is what the initializer reads.
        assert!(resolve_source("{ var a = 1; { var a = a; print a; } }").is_ok());
        assert!(resolve_source("var a = 1; { var a = a; print a; }").is_ok());
        assert!(resolve_source("fun a() {} { var a = a; print a; }").is_ok());
        // Globals may be redefined from themselves.
        assert!(resolve_source("var a = 1; var a = a;").is_ok());
    }

    #[test]
    fn test_initializer_reads_known_global() {
        let program = parse_program("{ var clock = clock; print clock; }");
        assert!(resolve(&program).is_err());
        assert!(resolve_with_globals(&program, ["clock".to_owned()]).is_ok());
    }

    #[test]
    fn test_multiple_variables_in_one_declaration() {
        let bindings = match resolve_source("{ var a = 1, b = a; print b; }") {
            Ok(bindings) => bindings,
            Err(errors) => panic!("unexpected errors: {errors:?}"),
        };
        assert_eq!(bindings.len(), 2);
        assert_eq!(
            messages("{ var a = 1, b = 2; print a; }"),
            vec!["[line 1] Error at 'b': Local variable 'b' is never used."]
        );
        assert_eq!(
            messages("{ var a = 1; var b = 2, a = 3; print a + b; }"),
            vec!["[line 1] Error at 'a': Already a variable named 'a' in this scope."]
        );
    }

    #[test]
    fn test_invalid_control_flow() {
        assert_eq!(
            messages("return 1;"),
            vec!["[line 1] Error at 'return': Can't return from top-level code."]
        );
        assert_eq!(
            messages("break;"),
            vec!["[line 1] Error at 'break': Can't use 'break' outside of a loop."]
        );
        assert_eq!(
            messages("while (true) { fun f() { break; } f(); }"),
            vec!["[line 1] Error at 'break': Can't use 'break' outside of a loop."]
        );
        assert!(resolve_source("while (true) { if (true) break; }").is_ok());
    }

    #[test]
    fn test_class_context_errors() {
        assert_eq!(
            messages("print this;"),
            vec!["[line 1] Error at 'this': Can't use 'this' outside of a class."]
        );
        assert_eq!(
            messages("fun f() { return super.m; } f();"),
            vec!["[line 1] Error at 'super': Can't use 'super' outside of a class."]
        );
        assert_eq!(
            messages("class A { m() { return super.m; } }"),
            vec!["[line 1] Error at 'super': Can't use 'super' in a class with no superclass."]
        );
        assert_eq!(
            messages("class A < A {}"),
            vec!["[line 1] Error at 'A': A class can't inherit from itself."]
        );
        assert_eq!(
            messages("class A { init() { return 1; } }"),
            vec!["[line 1] Error at 'return': Can't return a value from an initializer."]
        );
        assert!(resolve_source("class A { init() { return; } }").is_ok());
    }

    #[test]
    fn test_reports_every_error() {
        assert_eq!(
            messages("return;\n{ var unused = 1; }\nprint this;"),
            vec![
                "[line 1] Error at 'return': Can't return from top-level code.",
                "[line 2] Error at 'unused': Local variable 'unused' is never used.",
                "[line 3] Error at 'this': Can't use 'this' outside of a class.",
            ]
        );
    }
}
