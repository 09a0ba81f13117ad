//! Session Engine
//!
//! Handshake, capture loop and record classification for one logging run.
//!
//! ```rust,ignore
//! use serlog_core::link::open_port;
//! use serlog_core::session::{ConsoleOperator, SessionConfig, SessionEngine};
//!
//! let config = SessionConfig::new("/dev/ttyACM0", "out.csv");
//! let link = open_port(&config.port, config.baud_rate, config.timeout)?;
//! let report = SessionEngine::new(config, link, ConsoleOperator::stdio())?.run()?;
//! println!("{} lines", report.lines_written);
//! ```

mod cancel;
mod config;
mod engine;
mod error;
pub mod handshake;
mod operator;
pub mod record;
mod sink;

pub use cancel::CancelToken;
pub use config::{HandshakePolicy, SessionConfig, SinkMode};
pub use engine::{SessionEngine, SessionReport};
pub use error::{CancelReason, SessionError};
pub use handshake::{Handshake, HandshakeState};
pub use operator::{ConsoleOperator, Operator};
pub use record::{classify, decode_line, DecodeError, Record};
pub use sink::{FileSink, LineSink, RecordSink};
