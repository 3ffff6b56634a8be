//! The serial session state machine.
//!
//! A [`SerialSession`] owns at most one serial handle at a time. It validates
//! a requested port name against a freshly enumerated list, opens the handle
//! with DTR and RTS asserted, forwards inbound byte batches to registered
//! subscribers from a dedicated receive thread, and tears everything down on
//! close or dispose. All recovery policy (reopening, reconnect loops) belongs
//! to the caller.

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::port::{NativeSource, PortSource, SerialIo};
use crate::sink::{DiagnosticSink, TracingSink};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::debug;

/// Registered receive callback. Invoked once per inbound batch, on the
/// receive thread.
pub type ReceiveHandler = Box<dyn Fn(&[u8]) + Send>;

type LinkSlot = Arc<Mutex<Option<Box<dyn SerialIo>>>>;
type Subscribers = Arc<Mutex<Vec<ReceiveHandler>>>;

/// How often the receive thread samples the driver for waiting bytes. This
/// stands in for the OS data-available notification; delivery order and
/// batch boundaries follow whatever the driver reports at each sample.
const RECEIVE_POLL_INTERVAL: Duration = Duration::from_millis(5);

struct ReceiveThread {
    stop: Arc<AtomicBool>,
    handle: thread::JoinHandle<()>,
}

/// A session over one host serial port.
///
/// The session is a single logical owner: `open`/`close`/`dispose` take
/// `&mut self`, while `send` and `subscribe` synchronize internally and may
/// be called concurrently with the receive pipeline.
///
/// # Example
/// ```no_run
/// use serial_session::{SerialSession, SessionConfig};
///
/// let mut session = SerialSession::new();
/// session.subscribe(|bytes| println!("got {} bytes", bytes.len()))?;
/// session.open(None, SessionConfig::default())?;
/// session.send(b"AT\r\n")?;
/// session.close()?;
/// # Ok::<(), serial_session::SessionError>(())
/// ```
pub struct SerialSession {
    source: Box<dyn PortSource>,
    sink: Arc<dyn DiagnosticSink>,
    ports: Vec<String>,
    port_name: Option<String>,
    config: SessionConfig,
    link: LinkSlot,
    subscribers: Subscribers,
    reader: Option<ReceiveThread>,
    disposed: bool,
}

impl SerialSession {
    /// Session over the host serial subsystem, diagnostics to `tracing`.
    pub fn new() -> Self {
        Self::with_parts(Box::new(NativeSource), Arc::new(TracingSink))
    }

    /// Session with an injected port source and diagnostic sink.
    pub fn with_parts(source: Box<dyn PortSource>, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            source,
            sink,
            ports: Vec::new(),
            port_name: None,
            config: SessionConfig::default(),
            link: Arc::new(Mutex::new(None)),
            subscribers: Arc::new(Mutex::new(Vec::new())),
            reader: None,
            disposed: false,
        }
    }

    /// Replace the cached port list with a fresh host enumeration.
    ///
    /// An empty result is valid and means "no devices available". An
    /// enumeration failure is emitted to the sink and also yields an empty
    /// list; this operation itself never fails.
    pub fn refresh_ports(&mut self) -> &[String] {
        match self.source.enumerate() {
            Ok(list) => self.ports = list,
            Err(e) => {
                self.sink.emit(&format!("refresh_ports: {e}"));
                self.ports.clear();
            }
        }
        &self.ports
    }

    /// The port list as of the last refresh.
    pub fn available_ports(&self) -> &[String] {
        &self.ports
    }

    /// Whether a handle is currently held.
    pub fn is_open(&self) -> bool {
        self.link.lock().is_some()
    }

    /// Whether the session has been disposed (and not reopened since).
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Name of the most recently opened port, retained across close.
    pub fn port_name(&self) -> Option<&str> {
        self.port_name.as_deref()
    }

    /// Configuration of the most recent open, retained across close.
    pub fn config(&self) -> SessionConfig {
        self.config
    }

    /// Register a receive callback.
    ///
    /// Any number of subscribers is permitted; each inbound batch is
    /// delivered to all of them in registration order.
    pub fn subscribe<F>(&self, handler: F) -> Result<(), SessionError>
    where
        F: Fn(&[u8]) + Send + 'static,
    {
        if self.disposed {
            return self.report("subscribe", SessionError::Disposed);
        }
        self.subscribers.lock().push(Box::new(handler));
        Ok(())
    }

    /// Open a port and start the receive pipeline.
    ///
    /// The port list is refreshed first; `port_name` of `None` selects the
    /// first entry. On success DTR and RTS are asserted and inbound bytes
    /// begin flowing to subscribers.
    ///
    /// Fails with [`SessionError::AlreadyOpen`] while open (close first to
    /// reconfigure), [`SessionError::NoDeviceAvailable`] when the refreshed
    /// list is empty, and [`SessionError::InvalidPortName`] when a supplied
    /// name is absent from that list. Opening a disposed session revives it.
    pub fn open(
        &mut self,
        port_name: Option<&str>,
        config: SessionConfig,
    ) -> Result<(), SessionError> {
        if self.is_open() {
            return self.report("open", SessionError::AlreadyOpen);
        }

        self.refresh_ports();
        if self.ports.is_empty() {
            return self.report("open", SessionError::NoDeviceAvailable);
        }

        let name = match port_name {
            Some(requested) => {
                if !self.ports.iter().any(|p| p == requested) {
                    return self.report("open", SessionError::invalid_port(requested));
                }
                requested.to_string()
            }
            None => self.ports[0].clone(),
        };

        if let Err(e) = config.ensure_supported() {
            return self.report("open", e);
        }

        let mut io = match self.source.open(&name, &config) {
            Ok(io) => io,
            Err(e) => return self.report("open", e),
        };
        if let Err(e) = io.set_data_terminal_ready(true) {
            return self.report("open", e);
        }
        if let Err(e) = io.set_request_to_send(true) {
            return self.report("open", e);
        }

        *self.link.lock() = Some(io);
        if let Err(e) = self.attach_receive_thread() {
            self.link.lock().take();
            return self.report("open", e);
        }

        self.disposed = false;
        self.port_name = Some(name);
        self.config = config;
        debug!(port = ?self.port_name, "session opened");
        Ok(())
    }

    /// Write the full buffer to the open port, then discard the outbound
    /// driver buffer.
    ///
    /// The discard bounds driver-side buffer lifetime; it intentionally does
    /// not guarantee delivery past the point of driver acceptance.
    pub fn send(&self, data: &[u8]) -> Result<(), SessionError> {
        if self.disposed {
            return self.report("send", SessionError::Disposed);
        }
        if data.is_empty() {
            return self.report("send", SessionError::InvalidArgument("empty send buffer"));
        }

        let result = {
            let mut guard = self.link.lock();
            match guard.as_mut() {
                Some(io) => write_all_then_flush(io.as_mut(), data),
                None => Err(SessionError::NotOpen),
            }
        };
        match result {
            Ok(()) => Ok(()),
            Err(e) => self.report("send", e),
        }
    }

    /// Stop the receive pipeline and release the handle.
    ///
    /// `port_name` and `config` remain readable for the caller; a later
    /// `open` still re-resolves the port against a fresh enumeration.
    pub fn close(&mut self) -> Result<(), SessionError> {
        if self.disposed {
            return self.report("close", SessionError::Disposed);
        }
        if !self.is_open() {
            return self.report("close", SessionError::NotOpen);
        }
        self.detach_handle();
        debug!(port = ?self.port_name, "session closed");
        Ok(())
    }

    /// Tear the session down, releasing the handle if one is held.
    ///
    /// Idempotent and infallible; the "not open" condition is swallowed
    /// rather than surfaced. Afterwards `send`/`close`/`subscribe` fail with
    /// [`SessionError::Disposed`] until a new `open` revives the session.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.detach_handle();
        self.subscribers.lock().clear();
        self.disposed = true;
        debug!("session disposed");
    }

    /// Stop and join the receive thread, then drop the handle. The join is
    /// skipped when called from the receive thread itself (a subscriber
    /// closing the session from its callback).
    fn detach_handle(&mut self) {
        if let Some(rx) = self.reader.take() {
            rx.stop.store(true, Ordering::Release);
            drop(self.link.lock().take());
            if thread::current().id() != rx.handle.thread().id() {
                let _ = rx.handle.join();
            }
        } else {
            drop(self.link.lock().take());
        }
    }

    fn attach_receive_thread(&mut self) -> Result<(), SessionError> {
        let stop = Arc::new(AtomicBool::new(false));
        let link = Arc::clone(&self.link);
        let subscribers = Arc::clone(&self.subscribers);
        let sink = Arc::clone(&self.sink);
        let thread_stop = Arc::clone(&stop);

        let handle = thread::Builder::new()
            .name("serial-session-rx".into())
            .spawn(move || receive_loop(link, subscribers, sink, thread_stop))?;

        self.reader = Some(ReceiveThread { stop, handle });
        Ok(())
    }

    /// Emit the failure to the diagnostic sink, then raise it.
    fn report<T>(&self, operation: &str, err: SessionError) -> Result<T, SessionError> {
        self.sink.emit(&format!("{operation}: {err}"));
        Err(err)
    }
}

impl Default for SerialSession {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SerialSession {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for SerialSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialSession")
            .field("port_name", &self.port_name)
            .field("is_open", &self.is_open())
            .field("disposed", &self.disposed)
            .field("available_ports", &self.ports.len())
            .finish()
    }
}

fn write_all_then_flush(io: &mut dyn SerialIo, data: &[u8]) -> Result<(), SessionError> {
    let mut written = 0;
    while written < data.len() {
        match io.write_bytes(&data[written..])? {
            0 => {
                return Err(SessionError::Io(std::io::Error::from(
                    std::io::ErrorKind::WriteZero,
                )))
            }
            n => written += n,
        }
    }
    io.discard_output()
}

/// Receive pipeline body.
///
/// Samples the driver's waiting-byte count; on a non-zero snapshot reads up
/// to that many bytes, discards the inbound driver buffer, releases the
/// handle guard, and broadcasts the batch. Bytes arriving after the snapshot
/// wait for the next sample, so one batch never maps 1:1 to an
/// application-level message. A poll or read failure is emitted to the sink
/// and ends the pipeline.
fn receive_loop(
    link: LinkSlot,
    subscribers: Subscribers,
    sink: Arc<dyn DiagnosticSink>,
    stop: Arc<AtomicBool>,
) {
    while !stop.load(Ordering::Acquire) {
        let batch = {
            let mut guard = link.lock();
            let Some(io) = guard.as_mut() else { break };
            match drain_available(io.as_mut()) {
                Ok(batch) => batch,
                Err(e) => {
                    sink.emit(&format!("receive: {e}"));
                    break;
                }
            }
        };

        match batch {
            Some(bytes) if !bytes.is_empty() => {
                let handlers = subscribers.lock();
                for handler in handlers.iter() {
                    handler(&bytes);
                }
            }
            _ => thread::sleep(RECEIVE_POLL_INTERVAL),
        }
    }
}

fn drain_available(io: &mut dyn SerialIo) -> Result<Option<Vec<u8>>, SessionError> {
    let pending = io.bytes_to_read()?;
    if pending == 0 {
        return Ok(None);
    }
    let mut batch = vec![0u8; pending];
    let read = io.read_bytes(&mut batch)?;
    batch.truncate(read);
    io.discard_input()?;
    Ok(Some(batch))
}
