//! Core traits for the port boundary.
//!
//! [`PortSource`] covers everything the session asks of the host: enumerate
//! device names and open a handle. [`SerialIo`] is the contract of an opened
//! handle. Both are object-safe so real hardware and mock implementations
//! can be injected interchangeably.

use crate::config::SessionConfig;
use crate::error::SessionError;

/// Enumeration and opening of host serial devices.
pub trait PortSource: Send {
    /// List the currently visible device identifiers, in host order.
    fn enumerate(&self) -> Result<Vec<String>, SessionError>;

    /// Open the named device with the given configuration.
    fn open(&self, name: &str, config: &SessionConfig) -> Result<Box<dyn SerialIo>, SessionError>;
}

/// Byte-level operations on an opened serial handle.
pub trait SerialIo: Send + std::fmt::Debug {
    /// Write bytes to the handle.
    ///
    /// Returns the number of bytes actually accepted; may be fewer than
    /// `data.len()`.
    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, SessionError>;

    /// Read bytes from the handle into the provided buffer.
    ///
    /// Returns the number of bytes actually read.
    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, SessionError>;

    /// Snapshot of the number of inbound bytes currently waiting.
    fn bytes_to_read(&self) -> Result<usize, SessionError>;

    /// Discard any unread data in the inbound driver buffer.
    fn discard_input(&mut self) -> Result<(), SessionError>;

    /// Discard any unsent data in the outbound driver buffer.
    fn discard_output(&mut self) -> Result<(), SessionError>;

    /// Set the DTR control signal.
    fn set_data_terminal_ready(&mut self, level: bool) -> Result<(), SessionError>;

    /// Set the RTS control signal.
    fn set_request_to_send(&mut self, level: bool) -> Result<(), SessionError>;

    /// The name/path this handle was opened with.
    fn name(&self) -> &str;
}
