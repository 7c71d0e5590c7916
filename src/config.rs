use crate::print_handler::{OutputBuffer, PrintHandler};

/// Default limit on nested calls before a run fails with a stack overflow.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 256;

/// How a piece of source text is being run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// A whole program; every statement needs its terminator.
    #[default]
    Script,
    /// One line typed at a prompt; a bare trailing expression is allowed and
    /// its value is returned for display.
    Interactive,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub max_call_depth: usize,
    pub output: PrintHandler,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            output: PrintHandler::Stdout,
        }
    }
}

impl Config {
    pub fn with_max_call_depth(mut self, max_call_depth: usize) -> Self {
        self.max_call_depth = max_call_depth;
        self
    }

    pub fn with_output(mut self, output: PrintHandler) -> Self {
        self.output = output;
        self
    }

    /// Route `print` output into a fresh buffer and return both.
    pub fn capturing() -> (Self, OutputBuffer) {
        let buffer = OutputBuffer::new();
        let config = Config::default().with_output(PrintHandler::Buffer(buffer.clone()));
        (config, buffer)
    }
}
