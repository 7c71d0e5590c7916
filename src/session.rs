//! Entry points that take source text through every pass.

use tracing::{debug, instrument};

use crate::{
    config::{Config, Mode},
    environment::Environment,
    error::{Diagnostic, RuntimeError},
    interpreter::Interpreter,
    parser, resolver,
    scanner::Scanner,
    value::Value,
};

/// How a run ended. The command line maps each to its own exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    CompileError,
    RuntimeError,
}

impl ExitStatus {
    pub fn code(self) -> i32 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::CompileError => 65,
            ExitStatus::RuntimeError => 70,
        }
    }
}

/// Everything a run produced besides printed output.
#[derive(Debug, Default)]
pub struct Outcome {
    /// Scan, parse, or resolution problems. When present nothing ran.
    pub diagnostics: Vec<Diagnostic>,
    pub runtime_error: Option<RuntimeError>,
    /// Value of a trailing interactive expression.
    pub value: Option<Value>,
}

impl Outcome {
    fn compile_errors(diagnostics: Vec<Diagnostic>) -> Self {
        Outcome {
            diagnostics,
            ..Outcome::default()
        }
    }

    pub fn status(&self) -> ExitStatus {
        if !self.diagnostics.is_empty() {
            ExitStatus::CompileError
        } else if self.runtime_error.is_some() {
            ExitStatus::RuntimeError
        } else {
            ExitStatus::Success
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.status().code()
    }
}

/// An interpreter whose global scope persists across runs, as at a prompt.
pub struct Session {
    interpreter: Interpreter,
}

impl Session {
    pub fn new() -> Self {
        Session::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Session {
            interpreter: Interpreter::new(&config),
        }
    }

    pub fn globals(&self) -> &Environment {
        self.interpreter.globals()
    }

    pub fn run_script(&mut self, source: &str) -> Outcome {
        self.run(source, Mode::Script)
    }

    /// Like [`Session::run_script`], except a final expression may omit its
    /// semicolon and its value is returned in [`Outcome::value`].
    pub fn run_interactive_line(&mut self, source: &str) -> Outcome {
        self.run(source, Mode::Interactive)
    }

    #[instrument(level = "debug", skip(self, source))]
    fn run(&mut self, source: &str, mode: Mode) -> Outcome {
        let (tokens, mut diagnostics) = Scanner::new(source).scan_tokens();

        // Parse even after scan errors so syntax errors are reported too.
        let program = match parser::parse(&tokens, mode) {
            Ok(program) => program,
            Err(errors) => {
                diagnostics.extend(errors);
                return Outcome::compile_errors(diagnostics);
            }
        };
        if !diagnostics.is_empty() {
            return Outcome::compile_errors(diagnostics);
        }

        let globals = self.interpreter.globals().names();
        match resolver::resolve_with_globals(&program, globals) {
            Ok(bindings) => self.interpreter.resolve(bindings),
            Err(errors) => return Outcome::compile_errors(errors),
        }

        match self.interpreter.interpret(&program) {
            Ok(value) => Outcome {
                value,
                ..Outcome::default()
            },
            Err(error) => {
                debug!(%error, "runtime error");
                Outcome {
                    runtime_error: Some(error),
                    ..Outcome::default()
                }
            }
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Session::new()
    }
}

/// Run a whole program in a fresh session that prints to stdout.
pub fn run_script(source: &str) -> Outcome {
    Session::new().run_script(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RuntimeErrorKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_exit_codes() {
        assert_eq!(ExitStatus::Success.code(), 0);
        assert_eq!(ExitStatus::CompileError.code(), 65);
        assert_eq!(ExitStatus::RuntimeError.code(), 70);
    }

    #[test]
    fn test_scan_and_parse_errors_reported_together() {
        let (config, buffer) = Config::capturing();
        let mut session = Session::with_config(config);
        let outcome = session.run_script("print 1;\n@\nprint ;");

        let messages: Vec<String> = outcome.diagnostics.iter().map(|d| d.to_string()).collect();
        assert_eq!(
            messages,
            vec![
                "[line 2] Error: Unexpected character '@'.",
                "[line 3] Error at ';': Expect expression.",
            ]
        );
        assert_eq!(outcome.status(), ExitStatus::CompileError);
        assert!(buffer.lines().is_empty());
    }

    #[test]
    fn test_session_recovers_after_runtime_error() {
        let (config, buffer) = Config::capturing();
        let mut session = Session::with_config(config);

        let outcome = session.run_interactive_line("var a = 1; { var b = 2; print b; missing; }");
        assert_eq!(outcome.status(), ExitStatus::RuntimeError);
        assert_eq!(
            outcome.runtime_error.map(|error| error.kind),
            Some(RuntimeErrorKind::UndefinedVariable("missing".to_owned()))
        );

        let outcome = session.run_interactive_line("a + 1");
        assert_eq!(outcome.status(), ExitStatus::Success);
        assert_eq!(outcome.value, Some(Value::Number(2.0)));
        assert_eq!(buffer.lines(), vec!["2"]);
    }

    #[test]
    fn test_initializer_reads_global_from_earlier_line() {
        let (config, buffer) = Config::capturing();
        let mut session = Session::with_config(config);

        assert_eq!(session.run_interactive_line("var a = 1;").status(), ExitStatus::Success);
        let outcome = session.run_interactive_line("{ var a = a + 1; print a; }");
        assert_eq!(outcome.status(), ExitStatus::Success);
        assert_eq!(buffer.lines(), vec!["2"]);
    }
}
