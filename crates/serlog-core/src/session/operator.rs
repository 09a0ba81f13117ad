//! Operator I/O
//!
//! The engine talks to the person running it through this seam so a scripted
//! double can stand in for the console in tests.

use std::io::{self, BufRead, Write};

/// Console-side collaborator of a session
pub trait Operator {
    /// Block until the operator says to begin. Not subject to any timeout.
    fn wait_for_begin(&mut self) -> io::Result<()>;

    /// Show one status line (echo records, handshake progress)
    fn status(&mut self, line: &str) -> io::Result<()>;
}

impl<O: Operator + ?Sized> Operator for &mut O {
    fn wait_for_begin(&mut self) -> io::Result<()> {
        (**self).wait_for_begin()
    }

    fn status(&mut self, line: &str) -> io::Result<()> {
        (**self).status(line)
    }
}

/// Operator on a line-based input and an output stream
pub struct ConsoleOperator<R, W> {
    input: R,
    output: W,
}

impl ConsoleOperator<io::StdinLock<'static>, io::Stdout> {
    /// Operator on the process's stdin/stdout
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsoleOperator<R, W> {
    /// Operator over arbitrary input and output
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Recover the output writer
    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> Operator for ConsoleOperator<R, W> {
    fn wait_for_begin(&mut self) -> io::Result<()> {
        writeln!(self.output, "Press enter to begin.")?;
        self.output.flush()?;
        // A closed input counts as the go-ahead
        let mut line = String::new();
        self.input.read_line(&mut line)?;
        Ok(())
    }

    fn status(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.output, "{}", line)?;
        self.output.flush()
    }
}
