#![allow(dead_code)]

use serlog_core::link::{Link, LinkError};
use serlog_core::session::Operator;
use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::time::Duration;

/// Scripted link: byte reads replay `bytes` (then time out), line reads
/// replay `lines` (then report a disconnect so no test can spin forever).
#[derive(Default)]
pub struct MockLink {
    pub bytes: VecDeque<Option<u8>>,
    pub lines: VecDeque<Result<Vec<u8>, LinkError>>,
    pub written: Vec<u8>,
    pub byte_reads: usize,
    pub line_reads: usize,
    pub fail_on_write: bool,
}

impl MockLink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue byte-read results (`None` = timeout)
    pub fn with_bytes(mut self, bytes: &[Option<u8>]) -> Self {
        self.bytes.extend(bytes.iter().copied());
        self
    }

    /// Queue lines, each sent with a CRLF terminator
    pub fn with_lines(mut self, lines: &[&str]) -> Self {
        for line in lines {
            self.lines.push_back(Ok(format!("{}\r\n", line).into_bytes()));
        }
        self
    }

    /// Queue a raw line read result
    pub fn with_raw(mut self, raw: &[u8]) -> Self {
        self.lines.push_back(Ok(raw.to_vec()));
        self
    }

    /// Queue a line-read timeout
    pub fn with_timeout(mut self) -> Self {
        self.lines.push_back(Ok(Vec::new()));
        self
    }

    /// Queue a link failure
    pub fn with_error(mut self, error: LinkError) -> Self {
        self.lines.push_back(Err(error));
        self
    }
}

impl Link for MockLink {
    fn read_byte(&mut self) -> Result<Option<u8>, LinkError> {
        self.byte_reads += 1;
        Ok(self.bytes.pop_front().flatten())
    }

    fn read_line(&mut self) -> Result<Vec<u8>, LinkError> {
        self.line_reads += 1;
        self.lines.pop_front().unwrap_or(Err(LinkError::Disconnected))
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        if self.fail_on_write {
            return Err(LinkError::Disconnected);
        }
        self.written.extend_from_slice(bytes);
        Ok(())
    }

    fn timeout(&self) -> Duration {
        Duration::from_millis(100)
    }
}

/// Operator double that records everything shown to it
#[derive(Default)]
pub struct ScriptedOperator {
    pub begin_prompts: usize,
    pub statuses: Vec<String>,
}

impl ScriptedOperator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Operator for ScriptedOperator {
    fn wait_for_begin(&mut self) -> io::Result<()> {
        self.begin_prompts += 1;
        Ok(())
    }

    fn status(&mut self, line: &str) -> io::Result<()> {
        self.statuses.push(line.to_string());
        Ok(())
    }
}

/// Byte channel replaying scripted reads, for driving a real `LinkStream`.
///
/// `None` entries time out; an exhausted script reads as a broken pipe.
#[derive(Default)]
pub struct ScriptedChannel {
    pub reads: VecDeque<Option<Vec<u8>>>,
    pub written: Vec<u8>,
}

impl ScriptedChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a chunk of received bytes
    pub fn chunk(mut self, bytes: &[u8]) -> Self {
        self.reads.push_back(Some(bytes.to_vec()));
        self
    }

    /// Queue a read timeout
    pub fn timeout(mut self) -> Self {
        self.reads.push_back(None);
        self
    }
}

impl Read for ScriptedChannel {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.reads.pop_front() {
            Some(Some(mut chunk)) => {
                let n = chunk.len().min(buf.len());
                buf[..n].copy_from_slice(&chunk[..n]);
                if n < chunk.len() {
                    self.reads.push_front(Some(chunk.split_off(n)));
                }
                Ok(n)
            }
            Some(None) => Err(io::Error::new(io::ErrorKind::TimedOut, "timed out")),
            None => Err(io::Error::new(io::ErrorKind::BrokenPipe, "script exhausted")),
        }
    }
}

impl Write for ScriptedChannel {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
