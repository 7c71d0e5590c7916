//! Error taxonomy shared by every pass of the pipeline.
//!
//! Scanning, parsing and resolution collect [`Diagnostic`]s and keep going so a
//! single run reports as many problems as possible. Evaluation stops at the
//! first [`RuntimeError`].

use std::fmt;

use thiserror::Error;

use crate::token::Token;
use crate::token_type::TokenType;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("Unexpected character '{0}'.")]
    UnexpectedCharacter(char),
    #[error("Unterminated string.")]
    UnterminatedString,
    #[error("Unterminated block comment.")]
    UnterminatedComment,
    #[error("Invalid number literal '{0}'.")]
    InvalidNumber(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct SyntaxError {
    pub message: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Already a variable named '{name}' in this scope.")]
    AlreadyDeclared { name: String },
    #[error("Can't read local variable '{name}' in its own initializer.")]
    OwnInitializer { name: String },
    #[error("Local variable '{name}' is never used.")]
    UnusedLocal { name: String },
    #[error("Can't return from top-level code.")]
    ReturnAtTopLevel,
    #[error("Can't return a value from an initializer.")]
    ReturnFromInitializer,
    #[error("Can't use 'break' outside of a loop.")]
    BreakOutsideLoop,
    #[error("Can't use 'this' outside of a class.")]
    ThisOutsideClass,
    #[error("Can't use 'super' outside of a class.")]
    SuperOutsideClass,
    #[error("Can't use 'super' in a class with no superclass.")]
    SuperWithoutSuperclass,
    #[error("A class can't inherit from itself.")]
    InheritFromSelf,
}

/// Any error that stops a program before it starts executing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// Where on a line a diagnostic points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Line,
    AtEnd,
    At(String),
}

impl Location {
    pub fn of(token: &Token) -> Self {
        match token.typ {
            TokenType::Eof => Location::AtEnd,
            _ => Location::At(token.lexeme.clone()),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Line => Ok(()),
            Location::AtEnd => write!(f, " at end"),
            Location::At(lexeme) => write!(f, " at '{lexeme}'"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: usize,
    pub location: Location,
    pub error: CompileError,
}

impl Diagnostic {
    pub fn new(line: usize, error: impl Into<CompileError>) -> Self {
        Diagnostic {
            line,
            location: Location::Line,
            error: error.into(),
        }
    }

    pub fn at(token: &Token, error: impl Into<CompileError>) -> Self {
        Diagnostic {
            line: token.line,
            location: Location::of(token),
            error: error.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[line {}] Error{}: {}", self.line, self.location, self.error)
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RuntimeErrorKind {
    #[error("Undefined variable '{0}'.")]
    UndefinedVariable(String),
    #[error("Undefined property '{0}'.")]
    UndefinedProperty(String),
    #[error("Operand must be a number.")]
    NumberOperand,
    #[error("Operands must be numbers.")]
    NumberOperands,
    #[error("Operands must be two numbers or two strings.")]
    AddOperands,
    #[error("Can only call functions and classes.")]
    NotCallable,
    #[error("{callee} expected {expected} arguments but got {got}.")]
    Arity {
        callee: String,
        expected: usize,
        got: usize,
    },
    #[error("Only instances have properties.")]
    PropertyOnNonInstance,
    #[error("Only instances have fields.")]
    FieldOnNonInstance,
    #[error("Superclass must be a class.")]
    SuperclassNotClass,
    #[error("Stack overflow.")]
    StackOverflow,
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("{kind}\n[line {line}]")]
pub struct RuntimeError {
    pub line: usize,
    pub kind: RuntimeErrorKind,
}

impl RuntimeError {
    pub fn new(token: &Token, kind: RuntimeErrorKind) -> Self {
        RuntimeError {
            line: token.line,
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_diagnostic_formats_location() {
        let token = Token::new(TokenType::Identifier, "a", 3);
        let diagnostic = Diagnostic::at(
            &token,
            ResolveError::UnusedLocal {
                name: "a".to_owned(),
            },
        );
        assert_eq!(
            diagnostic.to_string(),
            "[line 3] Error at 'a': Local variable 'a' is never used."
        );

        let diagnostic = Diagnostic::at(
            &Token::eof(7),
            SyntaxError {
                message: "Expect expression.".to_owned(),
            },
        );
        assert_eq!(diagnostic.to_string(), "[line 7] Error at end: Expect expression.");

        let diagnostic = Diagnostic::new(1, ScanError::UnterminatedComment);
        assert_eq!(diagnostic.to_string(), "[line 1] Error: Unterminated block comment.");
    }

    #[test]
    fn test_runtime_error_format() {
        let error = RuntimeError {
            line: 4,
            kind: RuntimeErrorKind::Arity {
                callee: "<fn add>".to_owned(),
                expected: 2,
                got: 1,
            },
        };
        assert_eq!(
            error.to_string(),
            "<fn add> expected 2 arguments but got 1.\n[line 4]"
        );
    }
}
