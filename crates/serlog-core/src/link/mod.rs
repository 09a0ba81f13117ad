//! Link Adapter
//!
//! Owns the physical byte channel to the device. Every read is bounded by the
//! link timeout and reports a timeout as an empty result rather than an error.

mod error;
pub mod serial;
mod stream;

pub use error::LinkError;
pub use serial::{list_ports, open_port, PortInfo, SerialLink};
pub use stream::{LinkStream, MAX_LINE_LEN};

use std::time::Duration;

/// Default baud rate when neither the command line nor a config file names one
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Default read timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(100);

/// Line terminator byte
pub const LINE_TERMINATOR: u8 = b'\n';

/// A half-duplex byte channel to a single device.
///
/// Closing happens on drop.
pub trait Link {
    /// Read a single byte, waiting at most [`Link::timeout`].
    ///
    /// Returns `Ok(None)` when nothing arrived in time.
    fn read_byte(&mut self) -> Result<Option<u8>, LinkError>;

    /// Read up to and including the next line terminator, waiting at most
    /// [`Link::timeout`].
    ///
    /// Returns an empty buffer on timeout. Bytes of an unfinished line are
    /// kept for the next call, never returned on their own.
    fn read_line(&mut self) -> Result<Vec<u8>, LinkError>;

    /// Write all bytes to the device.
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), LinkError>;

    /// The read timeout this link was opened with.
    fn timeout(&self) -> Duration;
}

impl<L: Link + ?Sized> Link for &mut L {
    fn read_byte(&mut self) -> Result<Option<u8>, LinkError> {
        (**self).read_byte()
    }

    fn read_line(&mut self) -> Result<Vec<u8>, LinkError> {
        (**self).read_line()
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        (**self).write_all(bytes)
    }

    fn timeout(&self) -> Duration {
        (**self).timeout()
    }
}

impl<L: Link + ?Sized> Link for Box<L> {
    fn read_byte(&mut self) -> Result<Option<u8>, LinkError> {
        (**self).read_byte()
    }

    fn read_line(&mut self) -> Result<Vec<u8>, LinkError> {
        (**self).read_line()
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        (**self).write_all(bytes)
    }

    fn timeout(&self) -> Duration {
        (**self).timeout()
    }
}
