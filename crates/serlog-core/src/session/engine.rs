//! Session engine
//!
//! Runs one logging session over an exclusively owned link: optional
//! operator prompt and handshake, then the capture loop until `DONE`.

use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use super::handshake::{Handshake, HandshakeState, MAX_ATTEMPTS, SIGNAL_BYTE};
use super::record::{classify, decode_line, Record};
use super::{
    CancelReason, CancelToken, FileSink, Operator, RecordSink, SessionConfig, SessionError,
};
use crate::link::Link;

/// Summary of a session that reached the terminator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    /// Output file the data went to
    pub output_path: PathBuf,
    /// Data records persisted
    pub lines_written: u64,
    /// Echo records shown to the operator
    pub echo_lines: u64,
    /// Whether a handshake was performed
    pub handshake_performed: bool,
    /// Wall time from start to terminator
    pub elapsed: Duration,
}

/// Logging session over a link `L`, reporting to operator `O`
pub struct SessionEngine<L, O> {
    config: SessionConfig,
    link: L,
    operator: O,
    cancel: CancelToken,
    deadline: Option<Instant>,
}

impl<L: Link, O: Operator> SessionEngine<L, O> {
    /// Create an engine, rejecting configs it cannot run with
    pub fn new(config: SessionConfig, link: L, operator: O) -> Result<Self, SessionError> {
        config.validate()?;
        Ok(Self {
            config,
            link,
            operator,
            cancel: CancelToken::new(),
            deadline: None,
        })
    }

    /// Use an externally controlled cancel token
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// The validated session config
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Run the session, writing data records to the configured output file.
    ///
    /// The link is dropped (closed) when this returns, on every path.
    pub fn run(self) -> Result<SessionReport, SessionError> {
        self.run_with_sink(|config| FileSink::open(&config.output_path, config.sink_mode))
    }

    /// Run the session with a caller-supplied sink.
    ///
    /// `open_sink` is called only once the handshake has completed, so a
    /// failed handshake never creates output.
    pub fn run_with_sink<S, F>(mut self, open_sink: F) -> Result<SessionReport, SessionError>
    where
        S: RecordSink,
        F: FnOnce(&SessionConfig) -> io::Result<S>,
    {
        let started = Instant::now();
        self.deadline = self.config.max_duration.map(|d| started + d);
        tracing::info!(
            "session starting on {} ({} baud, timeout {:?})",
            self.config.port,
            self.config.baud_rate,
            self.config.timeout
        );

        if self.config.handshake {
            self.operator
                .wait_for_begin()
                .map_err(SessionError::Operator)?;
            self.handshake()?;
        }

        let mut sink = open_sink(&self.config).map_err(|source| SessionError::SinkOpen {
            path: self.config.output_path.clone(),
            source,
        })?;

        let mut report = SessionReport {
            output_path: self.config.output_path.clone(),
            lines_written: 0,
            echo_lines: 0,
            handshake_performed: self.config.handshake,
            elapsed: Duration::ZERO,
        };

        let captured = self.capture(&mut sink, &mut report);
        let flushed = sink.flush();
        drop(sink);

        if let Err(e) = &captured {
            tracing::warn!(
                "session aborted after {} lines: {}",
                report.lines_written,
                e
            );
        }
        captured?;
        flushed.map_err(SessionError::Sink)?;

        report.elapsed = started.elapsed();
        tracing::info!(
            "session complete: {} lines to {} in {:?}",
            report.lines_written,
            report.output_path.display(),
            report.elapsed
        );
        Ok(report)
    }

    fn check_cancel(&self) -> Result<(), SessionError> {
        if self.cancel.is_cancelled() {
            return Err(SessionError::Cancelled(CancelReason::Interrupted));
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(SessionError::Cancelled(CancelReason::DeadlineExceeded));
        }
        Ok(())
    }

    fn status(&mut self, line: &str) -> Result<(), SessionError> {
        self.operator.status(line).map_err(SessionError::Operator)
    }

    fn handshake(&mut self) -> Result<(), SessionError> {
        let mut machine = Handshake::new(self.config.handshake_policy);
        machine.start();
        self.status("Waiting for handshake initiation...")?;

        loop {
            self.check_cancel()?;
            let read = self.link.read_byte()?;
            let before = machine.attempts();

            match machine.observe(read) {
                HandshakeState::Completed => break,
                state => {
                    if let Some(byte) = read {
                        tracing::warn!("handshake: ignoring unexpected byte {:#04x}", byte);
                    }
                    let attempts = machine.attempts();
                    if attempts > before {
                        let what = match read {
                            None => "timed out".to_string(),
                            Some(byte) => format!("unexpected byte {:#04x}", byte),
                        };
                        self.status(&format!("{}, attempt {}/{}", what, attempts, MAX_ATTEMPTS))?;
                    }
                    if state == HandshakeState::Failed {
                        return Err(SessionError::HandshakeFailed {
                            attempts: MAX_ATTEMPTS,
                        });
                    }
                }
            }
        }

        self.link.write_all(&[SIGNAL_BYTE])?;
        // The device follows the acknowledgement with a bare newline
        let trailer = self.link.read_line()?;
        tracing::debug!("handshake: discarded {:?}", trailer);
        self.status("Handshake completed!")?;
        Ok(())
    }

    fn capture<S: RecordSink>(
        &mut self,
        sink: &mut S,
        report: &mut SessionReport,
    ) -> Result<(), SessionError> {
        loop {
            self.check_cancel()?;
            let raw = self.link.read_line()?;
            if raw.is_empty() {
                continue;
            }

            let text = decode_line(&raw)?;
            match classify(text) {
                Record::Terminator => {
                    tracing::debug!("terminator received");
                    return Ok(());
                }
                Record::Echo(message) => {
                    self.operator
                        .status(message)
                        .map_err(SessionError::Operator)?;
                    report.echo_lines += 1;
                }
                Record::Data(line) => {
                    sink.write_line(line).map_err(SessionError::Sink)?;
                    report.lines_written += 1;
                    if self.config.echo {
                        self.operator
                            .status(line)
                            .map_err(SessionError::Operator)?;
                    }
                }
                Record::Blank => {}
            }
        }
    }
}
