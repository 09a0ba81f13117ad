use std::io::{self, Read, Write};
use std::time::{Duration, Instant};

use super::{Link, LinkError, LINE_TERMINATOR};

/// Read chunk size for line reads
const CHUNK_SIZE: usize = 256;

/// Longest unterminated line held back while waiting for its terminator
pub const MAX_LINE_LEN: usize = 4096;

/// Adapts any blocking `Read + Write` channel whose reads time out into a [`Link`].
///
/// The underlying channel must already be configured to block at most
/// `timeout` per read (serial ports are opened that way by
/// [`open_port`](super::open_port)). Timeouts surface from the channel as
/// `TimedOut`/`WouldBlock` errors or zero-length reads; both are treated as
/// "nothing this interval".
///
/// Bytes of a line whose terminator has not arrived yet stay buffered across
/// timeouts, so only complete lines are ever returned.
pub struct LinkStream<S> {
    inner: S,
    timeout: Duration,
    /// Bytes received past the last returned line
    pending: Vec<u8>,
}

enum Fill {
    Data,
    TimedOut,
}

impl<S: Read + Write> LinkStream<S> {
    /// Wrap `inner`, whose reads already time out after `timeout`
    pub fn new(inner: S, timeout: Duration) -> Self {
        Self {
            inner,
            timeout,
            pending: Vec::new(),
        }
    }

    /// Get a reference to the wrapped channel
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    /// Unwrap the channel, discarding any buffered bytes
    pub fn into_inner(self) -> S {
        self.inner
    }

    fn take_line(&mut self) -> Option<Vec<u8>> {
        let pos = self.pending.iter().position(|&b| b == LINE_TERMINATOR)?;
        Some(self.pending.drain(..=pos).collect())
    }

    fn fill(&mut self) -> Result<Fill, LinkError> {
        let mut buf = [0u8; CHUNK_SIZE];
        loop {
            match self.inner.read(&mut buf) {
                Ok(0) => return Ok(Fill::TimedOut),
                Ok(n) => {
                    tracing::trace!("link: received {} bytes", n);
                    self.pending.extend_from_slice(&buf[..n]);
                    return Ok(Fill::Data);
                }
                Err(e) if is_timeout(&e) => return Ok(Fill::TimedOut),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(map_io_error(e)),
            }
        }
    }
}

impl<S: Read + Write> Link for LinkStream<S> {
    fn read_byte(&mut self) -> Result<Option<u8>, LinkError> {
        if self.pending.is_empty() {
            if let Fill::TimedOut = self.fill()? {
                return Ok(None);
            }
        }
        if self.pending.is_empty() {
            return Ok(None);
        }
        Ok(Some(self.pending.remove(0)))
    }

    fn read_line(&mut self) -> Result<Vec<u8>, LinkError> {
        let deadline = Instant::now() + self.timeout;
        loop {
            if let Some(line) = self.take_line() {
                return Ok(line);
            }
            if self.pending.len() > MAX_LINE_LEN {
                let len = self.pending.len();
                self.pending.clear();
                return Err(LinkError::LineTooLong {
                    len,
                    limit: MAX_LINE_LEN,
                });
            }
            if let Fill::TimedOut = self.fill()? {
                if !self.pending.is_empty() {
                    tracing::trace!("link: holding {} unterminated bytes", self.pending.len());
                }
                return Ok(Vec::new());
            }
            if Instant::now() >= deadline {
                return Ok(self.take_line().unwrap_or_default());
            }
        }
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        self.inner.write_all(bytes).map_err(map_io_error)?;
        self.inner.flush().map_err(map_io_error)?;
        tracing::debug!("link: sent {:02x?}", bytes);
        Ok(())
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}

fn is_timeout(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
    )
}

fn map_io_error(e: io::Error) -> LinkError {
    match e.kind() {
        io::ErrorKind::BrokenPipe
        | io::ErrorKind::NotConnected
        | io::ErrorKind::UnexpectedEof
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::ConnectionReset => LinkError::Disconnected,
        _ => LinkError::IoError(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Channel that replays scripted reads; an exhausted script times out
    struct Scripted {
        reads: VecDeque<io::Result<Vec<u8>>>,
        written: Vec<u8>,
    }

    impl Scripted {
        fn new(reads: Vec<io::Result<Vec<u8>>>) -> Self {
            Self {
                reads: reads.into(),
                written: Vec::new(),
            }
        }
    }

    impl Read for Scripted {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.reads.pop_front() {
                Some(Ok(chunk)) => {
                    let n = chunk.len().min(buf.len());
                    buf[..n].copy_from_slice(&chunk[..n]);
                    Ok(n)
                }
                Some(Err(e)) => Err(e),
                None => Err(io::Error::new(io::ErrorKind::TimedOut, "timed out")),
            }
        }
    }

    impl Write for Scripted {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn stream(reads: Vec<io::Result<Vec<u8>>>) -> LinkStream<Scripted> {
        LinkStream::new(Scripted::new(reads), Duration::from_secs(5))
    }

    #[test]
    fn test_read_line_splits_chunks() {
        let mut link = stream(vec![Ok(b"12,3".to_vec()), Ok(b"4\r\n56\r\n".to_vec())]);
        assert_eq!(link.read_line().unwrap(), b"12,34\r\n");
        assert_eq!(link.read_line().unwrap(), b"56\r\n");
        assert!(link.read_line().unwrap().is_empty());
    }

    #[test]
    fn test_read_line_holds_partial_across_timeouts() {
        let timed_out = || Err(io::Error::new(io::ErrorKind::TimedOut, "timed out"));
        let mut link = stream(vec![
            Ok(b"12,3".to_vec()),
            timed_out(),
            Ok(b"4\r\nDO".to_vec()),
            timed_out(),
            Ok(b"NE\r\n".to_vec()),
        ]);
        assert!(link.read_line().unwrap().is_empty());
        assert_eq!(link.read_line().unwrap(), b"12,34\r\n");
        assert!(link.read_line().unwrap().is_empty());
        assert_eq!(link.read_line().unwrap(), b"DONE\r\n");
        assert!(link.read_line().unwrap().is_empty());
    }

    #[test]
    fn test_unterminated_line_over_limit_is_error() {
        let chunks = MAX_LINE_LEN / CHUNK_SIZE + 1;
        let mut link = stream((0..chunks).map(|_| Ok(vec![b'x'; CHUNK_SIZE])).collect());
        match link.read_line() {
            Err(LinkError::LineTooLong { len, limit }) => {
                assert_eq!(len, chunks * CHUNK_SIZE);
                assert_eq!(limit, MAX_LINE_LEN);
            }
            other => panic!("expected LineTooLong, got {:?}", other),
        }
    }

    #[test]
    fn test_read_byte_timeout_is_none() {
        let mut link = stream(vec![]);
        assert_eq!(link.read_byte().unwrap(), None);
    }

    #[test]
    fn test_read_byte_then_line_share_buffer() {
        let mut link = stream(vec![Ok(vec![0xFF, b'\r', b'\n', b'a', b'\n'])]);
        assert_eq!(link.read_byte().unwrap(), Some(0xFF));
        assert_eq!(link.read_line().unwrap(), b"\r\n");
        assert_eq!(link.read_line().unwrap(), b"a\n");
    }

    #[test]
    fn test_would_block_and_zero_reads_are_timeouts() {
        let mut link = stream(vec![
            Err(io::Error::new(io::ErrorKind::WouldBlock, "again")),
            Ok(Vec::new()),
        ]);
        assert!(link.read_line().unwrap().is_empty());
        assert!(link.read_line().unwrap().is_empty());
    }

    #[test]
    fn test_broken_pipe_is_disconnect() {
        let mut link = stream(vec![Err(io::Error::new(
            io::ErrorKind::BrokenPipe,
            "unplugged",
        ))]);
        assert!(matches!(link.read_line(), Err(LinkError::Disconnected)));
    }

    #[test]
    fn test_other_errors_propagate() {
        let mut link = stream(vec![Err(io::Error::new(io::ErrorKind::Other, "boom"))]);
        assert!(matches!(link.read_byte(), Err(LinkError::IoError(_))));
    }

    #[test]
    fn test_write_all_reaches_channel() {
        let mut link = stream(vec![]);
        link.write_all(&[0xFF]).unwrap();
        assert_eq!(link.get_ref().written, vec![0xFF]);
    }
}
