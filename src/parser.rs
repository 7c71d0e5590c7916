use std::iter::Peekable;
use std::rc::Rc;
use std::slice::Iter;

use tracing::debug;

use crate::config::Mode;
use crate::error::{Diagnostic, SyntaxError};
use crate::expr::{Expr, ExprKind};
use crate::stack::ensure_sufficient_stack;
use crate::stmt::{Function, Program, Stmt, VarDecl};
use crate::token::{Literal, Token};
use crate::token_type::TokenType::{self, *};

const MAX_ARGUMENTS: usize = 255;

type ParseResult<T> = Result<T, Diagnostic>;

// parameters: the parser, and a series of TokenType variants separated by |
// return option of next token
macro_rules! match_types {
    ($parser:ident, $( $variant:pat_param )|* ) => {
        match $parser.tokens.peek() {
            Some(token) => {
                match token.typ {
                    $(
                        $variant
                    )|* => $parser.tokens.next(),
                    _ => None,
                }
            },
            None => None,
        }
    };
}

pub fn parse(tokens: &[Token], mode: Mode) -> Result<Program, Vec<Diagnostic>> {
    Parser::new(tokens, mode).parse()
}

pub struct Parser<'a> {
    tokens: Peekable<Iter<'a, Token>>,
    errors: Vec<Diagnostic>,
    mode: Mode,
    line_count: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token], mode: Mode) -> Self {
        let line_count = match tokens.last() {
            Some(token) => token.line,
            None => 0,
        };

        Parser {
            tokens: tokens.iter().peekable(),
            errors: Vec::new(),
            mode,
            line_count,
        }
    }

    pub fn parse(mut self) -> Result<Program, Vec<Diagnostic>> {
        let mut program = Program::default();

        while !self.is_at_end() {
            if self.mode == Mode::Interactive {
                if let Some(expr) = self.trailing_expression() {
                    program.trailing = Some(expr);
                    break;
                }
            }
            if let Some(stmt) = self.declaration() {
                program.statements.push(stmt);
            }
        }

        debug!(
            statements = program.statements.len(),
            trailing = program.trailing.is_some(),
            errors = self.errors.len(),
            "parsed tokens"
        );
        if self.errors.is_empty() {
            Ok(program)
        } else {
            Err(self.errors)
        }
    }

    // A bare expression running up to the end of input; only interactive
    // input may leave off the semicolon.
    fn trailing_expression(&mut self) -> Option<Expr> {
        let checkpoint = self.tokens.clone();
        let error_count = self.errors.len();

        if let Ok(expr) = self.expression() {
            if self.is_at_end() && self.errors.len() == error_count {
                return Some(expr);
            }
        }

        self.tokens = checkpoint;
        self.errors.truncate(error_count);
        None
    }

    fn declaration(&mut self) -> Option<Stmt> {
        let result = match self.peek_type() {
            Class => self.class_declaration(),
            Fun if self.peek_second_type() == Identifier => {
                self.tokens.next();
                self.function("function").map(Stmt::Function)
            }
            Var => self.var_declaration(),
            _ => self.statement(),
        };

        match result {
            Ok(stmt) => Some(stmt),
            Err(error) => {
                self.errors.push(error);
                self.synchronize();
                None
            }
        }
    }

    fn class_declaration(&mut self) -> ParseResult<Stmt> {
        self.tokens.next();
        let name = self.consume(Identifier, "Expect class name.")?.clone();

        let superclass = match match_types!(self, Less) {
            Some(_) => {
                let name = self.consume(Identifier, "Expect superclass name.")?.clone();
                Some(Expr::new(ExprKind::Variable { name }))
            }
            None => None,
        };

        self.consume(LeftBrace, "Expect '{' before class body.")?;
        let mut methods = Vec::new();
        while !self.check(RightBrace) && !self.is_at_end() {
            methods.push(self.function("method")?);
        }
        self.consume(RightBrace, "Expect '}' after class body.")?;

        Ok(Stmt::Class {
            name,
            superclass,
            methods,
        })
    }

    fn function(&mut self, kind: &str) -> ParseResult<Rc<Function>> {
        let name = self
            .consume(Identifier, &format!("Expect {kind} name."))?
            .clone();
        self.consume(LeftParen, &format!("Expect '(' after {kind} name."))?;
        let params = self.parameters()?;
        self.consume(LeftBrace, &format!("Expect '{{' before {kind} body."))?;
        let body = self.block()?;

        Ok(Rc::new(Function {
            name: Some(name),
            params,
            body,
        }))
    }

    // The opening parenthesis has been consumed.
    fn parameters(&mut self) -> ParseResult<Vec<Token>> {
        let mut params = Vec::new();
        if !self.check(RightParen) {
            loop {
                if params.len() >= MAX_ARGUMENTS {
                    let error = self.error_at_peek("Can't have more than 255 parameters.");
                    self.errors.push(error);
                }
                params.push(self.consume(Identifier, "Expect parameter name.")?.clone());
                if match_types!(self, Comma).is_none() {
                    break;
                }
            }
        }
        self.consume(RightParen, "Expect ')' after parameters.")?;
        Ok(params)
    }

    // Initializers stop at a comma, which starts the next declarator.
    fn var_declaration(&mut self) -> ParseResult<Stmt> {
        self.tokens.next();
        let mut variables: Vec<VarDecl> = Vec::new();

        loop {
            let name = self.consume(Identifier, "Expect variable name.")?.clone();
            let initializer = match match_types!(self, Equal) {
                Some(_) => Some(self.assignment()?),
                None => None,
            };

            if variables.iter().any(|var| var.name.lexeme == name.lexeme) {
                self.errors
                    .push(error(&name, "Reuse of same variable in declaration."));
            } else {
                variables.push(VarDecl { name, initializer });
            }

            if match_types!(self, Comma).is_none() {
                break;
            }
        }

        self.consume(Semicolon, "Expect ';' after variable declaration.")?;
        Ok(Stmt::Var { variables })
    }

    fn statement(&mut self) -> ParseResult<Stmt> {
        ensure_sufficient_stack(|| self.statement_inner())
    }

    fn statement_inner(&mut self) -> ParseResult<Stmt> {
        match self.peek_type() {
            Break => self.break_statement(),
            For => self.for_statement(),
            If => self.if_statement(),
            Print => self.print_statement(),
            Return => self.return_statement(),
            While => self.while_statement(),
            LeftBrace => {
                self.tokens.next();
                Ok(Stmt::Block {
                    statements: self.block()?,
                })
            }
            _ => self.expression_statement(),
        }
    }

    fn break_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.consume(Break, "Expect 'break'.")?.clone();
        self.consume(Semicolon, "Expect ';' after 'break'.")?;
        Ok(Stmt::Break { keyword })
    }

    // for (init; condition; increment) body
    //   => { init; while (condition) { body; increment; } }
    fn for_statement(&mut self) -> ParseResult<Stmt> {
        self.tokens.next();
        self.consume(LeftParen, "Expect '(' after 'for'.")?;

        let initializer = match self.peek_type() {
            Semicolon => {
                self.tokens.next();
                None
            }
            Var => Some(self.var_declaration()?),
            _ => Some(self.expression_statement()?),
        };

        let condition = if self.check(Semicolon) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(Semicolon, "Expect ';' after loop condition.")?;

        let increment = if self.check(RightParen) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(RightParen, "Expect ')' after for clauses.")?;

        let mut body = self.statement()?;

        if let Some(increment) = increment {
            body = Stmt::Block {
                statements: vec![
                    body,
                    Stmt::Expression {
                        expression: increment,
                    },
                ],
            };
        }

        let condition = condition.unwrap_or_else(|| {
            Expr::new(ExprKind::LiteralExpr {
                value: Literal::BoolLiteral(true),
            })
        });
        body = Stmt::While {
            condition,
            body: Box::new(body),
        };

        if let Some(initializer) = initializer {
            body = Stmt::Block {
                statements: vec![initializer, body],
            };
        }

        Ok(body)
    }

    fn if_statement(&mut self) -> ParseResult<Stmt> {
        self.tokens.next();
        self.consume(LeftParen, "Expect '(' after 'if'.")?;
        let condition = self.expression()?;
        self.consume(RightParen, "Expect ')' after if condition.")?;

        let then_branch = Box::new(self.statement()?);
        let else_branch = match match_types!(self, Else) {
            Some(_) => Some(Box::new(self.statement()?)),
            None => None,
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn print_statement(&mut self) -> ParseResult<Stmt> {
        self.tokens.next();
        let expression = self.expression()?;
        self.consume(Semicolon, "Expect ';' after value.")?;
        Ok(Stmt::Print { expression })
    }

    fn return_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.consume(Return, "Expect 'return'.")?.clone();
        let value = if self.check(Semicolon) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(Semicolon, "Expect ';' after return value.")?;
        Ok(Stmt::Return { keyword, value })
    }

    fn while_statement(&mut self) -> ParseResult<Stmt> {
        self.tokens.next();
        self.consume(LeftParen, "Expect '(' after 'while'.")?;
        let condition = self.expression()?;
        self.consume(RightParen, "Expect ')' after condition.")?;
        let body = Box::new(self.statement()?);

        Ok(Stmt::While { condition, body })
    }

    // The opening brace has been consumed.
    fn block(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut statements = Vec::new();

        while !self.check(RightBrace) && !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }

        self.consume(RightBrace, "Expect '}' after block.")?;
        Ok(statements)
    }

    fn expression_statement(&mut self) -> ParseResult<Stmt> {
        let expression = self.expression()?;
        self.consume(Semicolon, "Expect ';' after expression.")?;
        Ok(Stmt::Expression { expression })
    }

    fn expression(&mut self) -> ParseResult<Expr> {
        ensure_sufficient_stack(|| self.comma())
    }

    fn comma(&mut self) -> ParseResult<Expr> {
        let mut expr = self.assignment()?;

        while match_types!(self, Comma).is_some() {
            let right = self.assignment()?;
            expr = Expr::new(ExprKind::Comma {
                left: Box::new(expr),
                right: Box::new(right),
            });
        }

        Ok(expr)
    }

    fn assignment(&mut self) -> ParseResult<Expr> {
        let expr = self.ternary()?;

        let Some(equals) = match_types!(self, Equal) else {
            return Ok(expr);
        };
        let value = Box::new(self.assignment()?);

        match expr {
            Expr(_, ExprKind::Variable { name }) => Ok(Expr::new(ExprKind::Assign { name, value })),
            Expr(_, ExprKind::Get { object, name }) => Ok(Expr::new(ExprKind::Set {
                object,
                name,
                value,
            })),
            expr => {
                // reported, but there is no need to resynchronize
                self.errors.push(error(equals, "Invalid assignment target."));
                Ok(expr)
            }
        }
    }

    fn ternary(&mut self) -> ParseResult<Expr> {
        let condition = self.or()?;

        if match_types!(self, Question).is_none() {
            return Ok(condition);
        }

        let then_branch = self.expression()?;
        self.consume(Colon, "Expect ':' after then branch of conditional expression.")?;
        let else_branch = self.ternary()?;

        Ok(Expr::new(ExprKind::Ternary {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        }))
    }

    fn or(&mut self) -> ParseResult<Expr> {
        let mut expr = self.and()?;

        while let Some(operator) = match_types!(self, Or) {
            let operator = operator.to_owned();
            let right = self.and()?;
            expr = Expr::new(ExprKind::Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            });
        }

        Ok(expr)
    }

    fn and(&mut self) -> ParseResult<Expr> {
        let mut expr = self.equality()?;

        while let Some(operator) = match_types!(self, And) {
            let operator = operator.to_owned();
            let right = self.equality()?;
            expr = Expr::new(ExprKind::Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            });
        }

        Ok(expr)
    }

    fn equality(&mut self) -> ParseResult<Expr> {
        let mut expr = self.comparison()?;

        while let Some(operator) = match_types!(self, BangEqual | EqualEqual) {
            let operator = operator.to_owned();
            let right = self.comparison()?;
            expr = binary(expr, operator, right);
        }

        Ok(expr)
    }

    fn comparison(&mut self) -> ParseResult<Expr> {
        let mut expr = self.term()?;

        while let Some(operator) = match_types!(self, Greater | GreaterEqual | Less | LessEqual) {
            let operator = operator.to_owned();
            let right = self.term()?;
            expr = binary(expr, operator, right);
        }

        Ok(expr)
    }

    fn term(&mut self) -> ParseResult<Expr> {
        let mut expr = self.factor()?;

        while let Some(operator) = match_types!(self, Minus | Plus) {
            let operator = operator.to_owned();
            let right = self.factor()?;
            expr = binary(expr, operator, right);
        }

        Ok(expr)
    }

    fn factor(&mut self) -> ParseResult<Expr> {
        let mut expr = self.unary()?;

        while let Some(operator) = match_types!(self, Slash | Star) {
            let operator = operator.to_owned();
            let right = self.unary()?;
            expr = binary(expr, operator, right);
        }

        Ok(expr)
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        ensure_sufficient_stack(|| self.prefix())
    }

    fn prefix(&mut self) -> ParseResult<Expr> {
        if let Some(operator) = match_types!(self, Bang | Minus) {
            let operator = operator.to_owned();
            let right = self.unary()?;
            Ok(Expr::new(ExprKind::Unary {
                operator,
                right: Box::new(right),
            }))
        } else {
            self.call()
        }
    }

    fn call(&mut self) -> ParseResult<Expr> {
        let mut expr = self.primary()?;

        loop {
            if match_types!(self, LeftParen).is_some() {
                expr = self.finish_call(expr)?;
            } else if match_types!(self, Dot).is_some() {
                let name = self
                    .consume(Identifier, "Expect property name after '.'.")?
                    .clone();
                expr = Expr::new(ExprKind::Get {
                    object: Box::new(expr),
                    name,
                });
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expr) -> ParseResult<Expr> {
        let mut arguments = Vec::new();

        if !self.check(RightParen) {
            loop {
                if arguments.len() >= MAX_ARGUMENTS {
                    let error = self.error_at_peek("Can't have more than 255 arguments.");
                    self.errors.push(error);
                }
                arguments.push(self.assignment()?);
                if match_types!(self, Comma).is_none() {
                    break;
                }
            }
        }

        let paren = self.consume(RightParen, "Expect ')' after arguments.")?.clone();

        Ok(Expr::new(ExprKind::Call {
            callee: Box::new(callee),
            paren,
            arguments,
        }))
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        let typ = self.peek_type();
        let kind = match typ {
            False | True | Nil => {
                self.tokens.next();
                let value = match typ {
                    False => Literal::BoolLiteral(false),
                    True => Literal::BoolLiteral(true),
                    _ => Literal::Nil,
                };
                ExprKind::LiteralExpr { value }
            }
            Number | StringToken => ExprKind::LiteralExpr {
                value: self.consume(typ, "Expect literal.")?.literal.clone(),
            },
            Super => {
                let keyword = self.consume(Super, "Expect 'super'.")?.clone();
                self.consume(Dot, "Expect '.' after 'super'.")?;
                let method = self
                    .consume(Identifier, "Expect superclass method name.")?
                    .clone();
                ExprKind::Super { keyword, method }
            }
            This => ExprKind::This {
                keyword: self.consume(This, "Expect 'this'.")?.clone(),
            },
            Identifier => ExprKind::Variable {
                name: self.consume(Identifier, "Expect identifier.")?.clone(),
            },
            Fun => {
                self.tokens.next();
                self.consume(LeftParen, "Expect '(' after 'fun'.")?;
                let params = self.parameters()?;
                self.consume(LeftBrace, "Expect '{' before function body.")?;
                let body = self.block()?;
                ExprKind::Function(Rc::new(Function {
                    name: None,
                    params,
                    body,
                }))
            }
            LeftParen => {
                self.tokens.next();
                let expression = self.expression()?;
                self.consume(RightParen, "Expect ')' after expression.")?;
                ExprKind::Grouping {
                    expression: Box::new(expression),
                }
            }
            _ => return Err(self.error_at_peek("Expect expression.")),
        };

        Ok(Expr::new(kind))
    }

    fn synchronize(&mut self) {
        while let Some(token) = self.tokens.next() {
            if token.typ == Eof {
                return;
            }
            if token.typ == Semicolon {
                return;
            }
            match self.peek_type() {
                Break | Class | Fun | Var | For | If | While | Print | Return | Eof => return,
                _ => {}
            }
        }
    }

    fn consume(&mut self, typ: TokenType, message: &str) -> ParseResult<&'a Token> {
        if self.check(typ) {
            if let Some(token) = self.tokens.next() {
                return Ok(token);
            }
        }
        Err(self.error_at_peek(message))
    }

    fn check(&mut self, typ: TokenType) -> bool {
        self.peek_type() == typ
    }

    fn is_at_end(&mut self) -> bool {
        self.peek_type() == Eof
    }

    fn peek_type(&mut self) -> TokenType {
        self.tokens.peek().map_or(Eof, |token| token.typ)
    }

    fn peek_second_type(&self) -> TokenType {
        self.tokens.clone().nth(1).map_or(Eof, |token| token.typ)
    }

    fn error_at_peek(&mut self, message: &str) -> Diagnostic {
        match self.tokens.peek() {
            Some(token) => error(token, message),
            None => error(&generate_eof(self.line_count), message),
        }
    }
}

fn binary(left: Expr, operator: Token, right: Expr) -> Expr {
    Expr::new(ExprKind::Binary {
        left: Box::new(left),
        operator,
        right: Box::new(right),
    })
}

fn error(token: &Token, message: &str) -> Diagnostic {
    Diagnostic::at(
        token,
        SyntaxError {
            message: message.to_owned(),
        },
    )
}

fn generate_eof(line_count: usize) -> Token {
    Token::eof(line_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::Scanner;
    use pretty_assertions::assert_eq;

    fn parse_source(source: &str, mode: Mode) -> Result<Program, Vec<Diagnostic>> {
        let (tokens, errors) = Scanner::new(source).scan_tokens();
        assert!(errors.is_empty(), "unexpected scan errors: {errors:?}");
        parse(&tokens, mode)
    }

    fn parse_expr(source: &str) -> String {
        let program = match parse_source(&format!("{source};"), Mode::Script) {
            Ok(program) => program,
            Err(errors) => panic!("unexpected errors: {errors:?}"),
        };
        match &program.statements[..] {
            [Stmt::Expression { expression }] => expression.to_string(),
            other => panic!("expected one expression statement, got {other:?}"),
        }
    }

    fn messages(source: &str) -> Vec<String> {
        match parse_source(source, Mode::Script) {
            Ok(program) => panic!("expected errors, parsed {program:?}"),
            Err(errors) => errors.iter().map(|e| e.to_string()).collect(),
        }
    }

    #[test]
    fn test_precedence() {
        assert_eq!(parse_expr("1 + 2 * 3"), "(+ 1 (* 2 3))");
        assert_eq!(parse_expr("-a - -b"), "(- (- a) (- b))");
        assert_eq!(parse_expr("!(1 < 2) == false"), "(== (! (group (< 1 2))) false)");
        assert_eq!(parse_expr("a or b and c"), "(or a (and b c))");
    }

    #[test]
    fn test_comma_assignment_ternary() {
        assert_eq!(parse_expr("a = 1, b = 2"), "(, (= a 1) (= b 2))");
        assert_eq!(parse_expr("a ? b : c ? d : e"), "(?: a b (?: c d e))");
        assert_eq!(parse_expr("x = c ? 1 : 2"), "(= x (?: c 1 2))");
    }

    #[test]
    fn test_calls_and_properties() {
        assert_eq!(parse_expr("f(1, g(2))(3)"), "(call (call f 1 (call g 2)) 3)");
        assert_eq!(parse_expr("a.b.c = d"), "(set (get a b) c d)");
        assert_eq!(parse_expr("super.m(this)"), "(call (super m) this)");
        assert_eq!(parse_expr("fun (x) { return x; }"), "(fun (x))");
    }

    #[test]
    fn test_for_desugars_to_while() {
        let program = match parse_source(
            "for (var i = 0; i < 3; i = i + 1) print i;",
            Mode::Script,
        ) {
            Ok(program) => program,
            Err(errors) => panic!("unexpected errors: {errors:?}"),
        };
        let [Stmt::Block { statements }] = &program.statements[..] else {
            panic!("expected block, got {:?}", program.statements);
        };
        assert!(matches!(statements[0], Stmt::Var { .. }));
        let Stmt::While { body, .. } = &statements[1] else {
            panic!("expected while, got {:?}", statements[1]);
        };
        let Stmt::Block { statements: inner } = body.as_ref() else {
            panic!("expected block body, got {body:?}");
        };
        assert!(matches!(inner[0], Stmt::Print { .. }));
        assert!(matches!(inner[1], Stmt::Expression { .. }));
    }

    #[test]
    fn test_reports_multiple_errors() {
        assert_eq!(
            messages("var = 1;\nprint (2;\nprint 3;\n1 +;"),
            vec![
                "[line 1] Error at '=': Expect variable name.",
                "[line 2] Error at ';': Expect ')' after expression.",
                "[line 4] Error at ';': Expect expression.",
            ]
        );
    }

    #[test]
    fn test_errors_inside_blocks_recover() {
        assert_eq!(
            messages("{ print ; print 2; var; }"),
            vec![
                "[line 1] Error at ';': Expect expression.",
                "[line 1] Error at ';': Expect variable name.",
            ]
        );
    }

    #[test]
    fn test_invalid_assignment_target() {
        assert_eq!(
            messages("a + b = c;"),
            vec!["[line 1] Error at '=': Invalid assignment target."]
        );
    }

    #[test]
    fn test_missing_semicolon_at_end() {
        assert_eq!(
            messages("print 1"),
            vec!["[line 1] Error at end: Expect ';' after value."]
        );
        assert_eq!(
            messages("1 + 2"),
            vec!["[line 1] Error at end: Expect ';' after expression."]
        );
    }

    #[test]
    fn test_interactive_trailing_expression() {
        let program = match parse_source("var a = 1; a + 2", Mode::Interactive) {
            Ok(program) => program,
            Err(errors) => panic!("unexpected errors: {errors:?}"),
        };
        assert_eq!(program.statements.len(), 1);
        assert_eq!(
            program.trailing.map(|expr| expr.to_string()),
            Some("(+ a 2)".to_owned())
        );

        let program = match parse_source("print 1;", Mode::Interactive) {
            Ok(program) => program,
            Err(errors) => panic!("unexpected errors: {errors:?}"),
        };
        assert_eq!(program.statements.len(), 1);
        assert!(program.trailing.is_none());
    }

    #[test]
    fn test_multiple_variables() {
        let program = match parse_source("var a = 1, b, c = a = 2;", Mode::Script) {
            Ok(program) => program,
            Err(errors) => panic!("unexpected errors: {errors:?}"),
        };
        let [Stmt::Var { variables }] = &program.statements[..] else {
            panic!("expected one declaration, got {:?}", program.statements);
        };
        let names: Vec<_> = variables.iter().map(|var| var.name.lexeme.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert!(variables[1].initializer.is_none());
        assert_eq!(
            variables[2].initializer.as_ref().map(|expr| expr.to_string()),
            Some("(= a 2)".to_owned())
        );

        assert_eq!(
            messages("var a = 1, a = 2;"),
            vec!["[line 1] Error at 'a': Reuse of same variable in declaration."]
        );
        assert_eq!(
            messages("var a, ;"),
            vec!["[line 1] Error at ';': Expect variable name."]
        );
    }

    #[test]
    fn test_deep_nesting() {
        let depth = 3_000;
        let source = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
        let program = match parse_source(&format!("{source};"), Mode::Script) {
            Ok(program) => program,
            Err(errors) => panic!("unexpected errors: {errors:?}"),
        };
        assert_eq!(program.statements.len(), 1);
    }

    #[test]
    fn test_too_many_arguments() {
        let arguments = vec!["1"; 256].join(", ");
        assert_eq!(
            messages(&format!("f({arguments});")),
            vec!["[line 1] Error at '1': Can't have more than 255 arguments."]
        );
    }
}
