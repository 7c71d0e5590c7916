//! Destination for the output of `print` statements.
//!
//! Scripts run from the command line print to stdout; tests and embedders
//! capture output in an [`OutputBuffer`] instead.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Shared, growable capture of printed lines.
#[derive(Clone, Default)]
pub struct OutputBuffer(Rc<RefCell<String>>);

impl OutputBuffer {
    pub fn new() -> Self {
        OutputBuffer::default()
    }

    /// Get all captured output.
    pub fn contents(&self) -> String {
        self.0.borrow().clone()
    }

    /// Captured output split into lines.
    pub fn lines(&self) -> Vec<String> {
        self.0.borrow().lines().map(str::to_owned).collect()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    fn push_line(&self, msg: &str) {
        let mut buffer = self.0.borrow_mut();
        buffer.push_str(msg);
        buffer.push('\n');
    }
}

impl fmt::Debug for OutputBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OutputBuffer").field(&self.0.borrow()).finish()
    }
}

#[derive(Clone, Debug, Default)]
pub enum PrintHandler {
    #[default]
    Stdout,
    Buffer(OutputBuffer),
}

impl PrintHandler {
    /// Print a line (with newline).
    pub fn println(&self, msg: &str) {
        match self {
            PrintHandler::Stdout => println!("{msg}"),
            PrintHandler::Buffer(buffer) => buffer.push_line(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_buffer_handler_captures_lines() {
        let buffer = OutputBuffer::new();
        let handler = PrintHandler::Buffer(buffer.clone());
        handler.println("one");
        handler.println("two");
        assert_eq!(buffer.contents(), "one\ntwo\n");
        assert_eq!(buffer.lines(), vec!["one", "two"]);

        buffer.clear();
        assert_eq!(buffer.contents(), "");
    }
}
