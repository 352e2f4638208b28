//! Where the application writes its messages.

use std::io::Write;

/// Line-oriented output, split into normal output and errors.
pub trait Console {
    fn println_out(&mut self, line: &str);
    fn println_err(&mut self, line: &str);
}

/// Writes to the process's stdout and stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdConsole;

impl Console for StdConsole {
    fn println_out(&mut self, line: &str) {
        // Write errors, such as a closed pipe, are ignored.
        let _ = writeln!(std::io::stdout().lock(), "{}", line);
    }

    fn println_err(&mut self, line: &str) {
        let _ = writeln!(std::io::stderr().lock(), "{}", line);
    }
}

/// Keeps every line in memory.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BufferConsole {
    pub out: Vec<String>,
    pub err: Vec<String>,
}

impl BufferConsole {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Console for BufferConsole {
    fn println_out(&mut self, line: &str) {
        self.out.push(line.to_string());
    }

    fn println_err(&mut self, line: &str) {
        self.err.push(line.to_string());
    }
}

impl<C: Console + ?Sized> Console for &mut C {
    fn println_out(&mut self, line: &str) {
        (**self).println_out(line);
    }

    fn println_err(&mut self, line: &str) {
        (**self).println_err(line);
    }
}
