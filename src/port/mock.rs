//! Mock port implementations for testing.
//!
//! [`MockPort`] simulates an opened handle without hardware: incoming bytes
//! are queued by the test, written bytes are logged, and control-signal and
//! buffer-discard calls are recorded. Clones share state, so a test can keep
//! one clone while the session owns another. [`MockSource`] is the matching
//! [`PortSource`] with a scripted port-name list.
//!
//! # Example
//! ```
//! use serial_session::{MockPort, SerialIo};
//!
//! let test_side = MockPort::new("MOCK0");
//! let mut session_side = test_side.clone();
//!
//! test_side.push_incoming(b"ping");
//! assert_eq!(session_side.bytes_to_read().unwrap(), 4);
//!
//! let mut buffer = [0u8; 8];
//! let n = session_side.read_bytes(&mut buffer).unwrap();
//! assert_eq!(&buffer[..n], b"ping");
//!
//! session_side.write_bytes(b"pong").unwrap();
//! assert_eq!(test_side.write_log(), vec![b"pong".to_vec()]);
//! ```

use super::traits::{PortSource, SerialIo};
use crate::config::SessionConfig;
use crate::error::SessionError;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct MockPortState {
    /// Bytes waiting to be read by the session.
    incoming: VecDeque<u8>,
    /// Every write, one entry per call.
    write_log: Vec<Vec<u8>>,
    input_discards: u32,
    output_discards: u32,
    /// Last level written to each control signal, if any.
    dtr: Option<bool>,
    rts: Option<bool>,
    fail_writes: bool,
}

/// Shared-state mock serial handle.
#[derive(Clone)]
pub struct MockPort {
    name: String,
    state: Arc<Mutex<MockPortState>>,
}

impl MockPort {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(MockPortState::default())),
        }
    }

    /// Queue bytes for the session to read, as one arrived batch.
    pub fn push_incoming(&self, data: &[u8]) {
        self.state.lock().incoming.extend(data);
    }

    /// Number of queued inbound bytes not yet read.
    pub fn pending_incoming(&self) -> usize {
        self.state.lock().incoming.len()
    }

    /// Copy of all writes, in call order.
    pub fn write_log(&self) -> Vec<Vec<u8>> {
        self.state.lock().write_log.clone()
    }

    /// How many times the inbound buffer was discarded.
    pub fn input_discards(&self) -> u32 {
        self.state.lock().input_discards
    }

    /// How many times the outbound buffer was discarded.
    pub fn output_discards(&self) -> u32 {
        self.state.lock().output_discards
    }

    /// Last DTR level written, if any.
    pub fn dtr(&self) -> Option<bool> {
        self.state.lock().dtr
    }

    /// Last RTS level written, if any.
    pub fn rts(&self) -> Option<bool> {
        self.state.lock().rts
    }

    /// Make subsequent writes fail with a broken-pipe I/O error.
    pub fn fail_writes(&self, fail: bool) {
        self.state.lock().fail_writes = fail;
    }

    /// A handle with the given name sharing this port's state.
    fn with_name(&self, name: &str) -> Self {
        Self {
            name: name.to_string(),
            state: Arc::clone(&self.state),
        }
    }
}

impl SerialIo for MockPort {
    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, SessionError> {
        let mut state = self.state.lock();
        if state.fail_writes {
            return Err(SessionError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "mock write failure",
            )));
        }
        state.write_log.push(data.to_vec());
        Ok(data.len())
    }

    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, SessionError> {
        let mut state = self.state.lock();
        let mut read = 0;
        for slot in buffer.iter_mut() {
            match state.incoming.pop_front() {
                Some(byte) => {
                    *slot = byte;
                    read += 1;
                }
                None => break,
            }
        }
        Ok(read)
    }

    fn bytes_to_read(&self) -> Result<usize, SessionError> {
        Ok(self.state.lock().incoming.len())
    }

    fn discard_input(&mut self) -> Result<(), SessionError> {
        let mut state = self.state.lock();
        state.incoming.clear();
        state.input_discards += 1;
        Ok(())
    }

    fn discard_output(&mut self) -> Result<(), SessionError> {
        self.state.lock().output_discards += 1;
        Ok(())
    }

    fn set_data_terminal_ready(&mut self, level: bool) -> Result<(), SessionError> {
        self.state.lock().dtr = Some(level);
        Ok(())
    }

    fn set_request_to_send(&mut self, level: bool) -> Result<(), SessionError> {
        self.state.lock().rts = Some(level);
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for MockPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockPort")
            .field("name", &self.name)
            .field("pending_incoming", &self.pending_incoming())
            .finish()
    }
}

/// Scripted [`PortSource`] for tests.
///
/// Enumerates a fixed (but replaceable) name list and opens handles that
/// share one [`MockPort`]'s state.
#[derive(Clone)]
pub struct MockSource {
    ports: Arc<Mutex<Vec<String>>>,
    port: MockPort,
    opened: Arc<AtomicUsize>,
    enumeration_fails: Arc<AtomicBool>,
}

impl MockSource {
    pub fn new(ports: &[&str], port: MockPort) -> Self {
        Self {
            ports: Arc::new(Mutex::new(ports.iter().map(|p| p.to_string()).collect())),
            port,
            opened: Arc::new(AtomicUsize::new(0)),
            enumeration_fails: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A source that enumerates no devices at all.
    pub fn without_devices() -> Self {
        Self::new(&[], MockPort::new("unreachable"))
    }

    /// Replace the scripted port-name list.
    pub fn set_ports(&self, ports: &[&str]) {
        *self.ports.lock() = ports.iter().map(|p| p.to_string()).collect();
    }

    /// Make `enumerate` fail until reset.
    pub fn set_enumeration_error(&self, fail: bool) {
        self.enumeration_fails.store(fail, Ordering::Relaxed);
    }

    /// How many times `open` has been called.
    pub fn open_count(&self) -> usize {
        self.opened.load(Ordering::Relaxed)
    }
}

impl PortSource for MockSource {
    fn enumerate(&self) -> Result<Vec<String>, SessionError> {
        if self.enumeration_fails.load(Ordering::Relaxed) {
            return Err(SessionError::Serial(serialport::Error::new(
                serialport::ErrorKind::Unknown,
                "mock enumeration failure",
            )));
        }
        Ok(self.ports.lock().clone())
    }

    fn open(&self, name: &str, _config: &SessionConfig) -> Result<Box<dyn SerialIo>, SessionError> {
        self.opened.fetch_add(1, Ordering::Relaxed);
        Ok(Box::new(self.port.with_name(name)))
    }
}

impl std::fmt::Debug for MockSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSource")
            .field("ports", &*self.ports.lock())
            .field("open_count", &self.open_count())
            .finish()
    }
}
