use crate::console::Console;
use crate::error::ConsoleError;
use std::cell::RefCell;
use std::io::{BufRead, Cursor, Write};
use std::rc::Rc;

/// How a line was requested from a [`ScriptedConsole`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadKind {
    Line,
    Secret,
    Key,
}

/// Memory-backed console for tests and scripted sessions.
///
/// Input is a fixed buffer consumed line by line; running out of lines reports
/// [`ConsoleError::Closed`]. Everything written, labels included, is collected
/// in a shared buffer. Secret answers are never echoed into it.
pub struct ScriptedConsole {
    input: Cursor<Vec<u8>>,
    output: Rc<RefCell<Vec<u8>>>,
    reads: Vec<ReadKind>,
}

impl ScriptedConsole {
    /// Create a console that will read from the provided buffer.
    pub fn new(input: impl Into<Vec<u8>>) -> Self {
        Self {
            input: Cursor::new(input.into()),
            output: Rc::new(RefCell::new(Vec::new())),
            reads: Vec::new(),
        }
    }

    /// One input line per entry.
    pub fn from_lines(lines: &[&str]) -> Self {
        let mut buf = String::new();
        for line in lines {
            buf.push_str(line);
            buf.push('\n');
        }
        Self::new(buf)
    }

    /// Convenience: create console and return (console, output handle).
    pub fn with_handle(input: impl Into<Vec<u8>>) -> (Self, Rc<RefCell<Vec<u8>>>) {
        let console = Self::new(input);
        let rc = Rc::clone(&console.output);
        (console, rc)
    }

    /// Everything written so far.
    pub fn output(&self) -> String {
        String::from_utf8_lossy(&self.output.borrow()).into_owned()
    }

    /// The kind of each read, in order.
    pub fn reads(&self) -> &[ReadKind] {
        &self.reads
    }

    fn next_line(&mut self, label: &str, kind: ReadKind) -> Result<String, ConsoleError> {
        self.reads.push(kind);
        write!(self.output.borrow_mut(), "{}", label)?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(ConsoleError::Closed);
        }
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }

        let echoed = if kind == ReadKind::Secret { "" } else { line.as_str() };
        writeln!(self.output.borrow_mut(), "{}", echoed)?;
        Ok(line)
    }
}

impl Console for ScriptedConsole {
    fn write_line(&mut self, line: &str) -> Result<(), ConsoleError> {
        writeln!(self.output.borrow_mut(), "{}", line)?;
        Ok(())
    }

    fn read_line(&mut self, label: &str) -> Result<String, ConsoleError> {
        self.next_line(label, ReadKind::Line)
    }

    fn read_secret(&mut self, label: &str) -> Result<String, ConsoleError> {
        self.next_line(label, ReadKind::Secret)
    }

    fn read_key(&mut self, label: &str) -> Result<String, ConsoleError> {
        self.next_line(label, ReadKind::Key)
    }
}
