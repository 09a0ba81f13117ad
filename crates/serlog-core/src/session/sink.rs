//! Output sink
//!
//! One physical line per data record, newline-terminated, no header and no
//! escaping.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use super::SinkMode;

/// Destination for data records
pub trait RecordSink {
    /// Append one record as a line
    fn write_line(&mut self, line: &str) -> io::Result<()>;

    /// Push buffered lines to the underlying storage
    fn flush(&mut self) -> io::Result<()>;
}

/// Line-per-record sink over any writer
pub struct LineSink<W: Write> {
    writer: W,
    lines: u64,
}

/// Buffered file sink
pub type FileSink = LineSink<BufWriter<File>>;

impl<W: Write> LineSink<W> {
    /// Wrap a writer
    pub fn new(writer: W) -> Self {
        Self { writer, lines: 0 }
    }

    /// Lines written so far
    pub fn lines(&self) -> u64 {
        self.lines
    }

    /// Recover the writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl FileSink {
    /// Open `path` for writing according to `mode`
    pub fn open(path: &Path, mode: SinkMode) -> io::Result<Self> {
        let mut options = OpenOptions::new();
        match mode {
            SinkMode::Truncate => options.write(true).create(true).truncate(true),
            SinkMode::Append => options.append(true).create(true),
        };
        let file = options.open(path)?;
        tracing::debug!("opened output file {} ({:?})", path.display(), mode);
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> RecordSink for LineSink<W> {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.lines += 1;
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

impl<S: RecordSink + ?Sized> RecordSink for &mut S {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        (**self).write_line(line)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}
