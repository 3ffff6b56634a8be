//! Serial session library
//!
//! A minimal, single-owner abstraction over one host serial port: enumerate
//! device names, validate and open a configuration, send bytes, receive
//! inbound byte batches through subscriber callbacks, and close or dispose
//! the handle. No protocol framing, no retry policy, no multi-port
//! multiplexing; those belong to the code built on top.
//!
//! # Modules
//!
//! - `config`: closed configuration enumerations and the session tuple
//! - `error`: the session's single error enum
//! - `port`: the host boundary (traits, native backend, mocks)
//! - `session`: the `SerialSession` state machine and receive pipeline
//! - `sink`: write-only diagnostic sinks

pub mod config;
pub mod error;
pub mod port;
pub mod session;
pub mod sink;

// Re-export commonly used types for convenience
pub use config::{BaudRate, DataBits, Parity, SessionConfig, StopBits};
pub use error::SessionError;
pub use port::{MockPort, MockSource, NativePort, NativeSource, PortSource, SerialIo};
pub use session::{ReceiveHandler, SerialSession};
pub use sink::{DiagnosticSink, MemorySink, NullSink, TracingSink};
