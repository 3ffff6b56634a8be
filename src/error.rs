//! Session error types.
//!
//! Every operation on a [`SerialSession`](crate::SerialSession) has a fixed
//! failure set drawn from this enum; validation failures are surfaced
//! immediately and nothing is retried inside the crate.

use thiserror::Error;

/// Errors that can occur during serial session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Port enumeration came back empty when an open was requested.
    #[error("no serial device available")]
    NoDeviceAvailable,

    /// The requested port name is not in the freshly enumerated list.
    #[error("unknown serial port: {0}")]
    InvalidPortName(String),

    /// A caller-supplied argument is unusable (e.g. an empty send buffer).
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// Operation requires an open session but none exists.
    #[error("port is not open")]
    NotOpen,

    /// Attempted to open a session that is already open.
    #[error("port is already open")]
    AlreadyOpen,

    /// Operation on a session that has been disposed.
    #[error("session has been disposed")]
    Disposed,

    /// The configuration names a value the host driver layer cannot express.
    #[error("unsupported configuration: {0}")]
    UnsupportedConfig(String),

    /// An I/O error occurred during port operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A serialport-specific error occurred.
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),
}

impl SessionError {
    /// Create an InvalidPortName error from a port name.
    pub fn invalid_port(port_name: impl Into<String>) -> Self {
        Self::InvalidPortName(port_name.into())
    }

    /// Create an UnsupportedConfig error from a message.
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::UnsupportedConfig(message.into())
    }
}
