//! A tree-walking interpreter for a small dynamically typed scripting
//! language with closures, classes, and single inheritance.
//!
//! Source goes through four passes: [`scanner`], [`parser`], [`resolver`],
//! and [`interpreter`]. [`Session`] strings them together.

mod ast_display;
pub mod callable;
pub mod class;
pub mod config;
pub mod environment;
pub mod error;
pub mod expr;
pub mod instance;
pub mod interpreter;
pub mod parser;
pub mod print_handler;
pub mod resolver;
pub mod scanner;
pub mod session;
mod stack;
pub mod stmt;
pub mod token;
pub mod token_type;
pub mod value;

use std::sync::Once;

pub use config::{Config, Mode};
pub use error::{Diagnostic, RuntimeError};
pub use print_handler::{OutputBuffer, PrintHandler};
pub use session::{run_script, ExitStatus, Outcome, Session};
pub use value::Value;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Does nothing unless `RUST_LOG` is set, e.g. `RUST_LOG=treelox=debug` or
/// `RUST_LOG=treelox=trace` for every call.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
                .with(filter)
                .init();
        }
    });
}
