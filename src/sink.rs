//! Diagnostic sinks.
//!
//! A [`DiagnosticSink`] is a write-only destination for human-readable
//! failure and status text, independent of the error values returned to the
//! caller. Every failure path in the session emits an operation-prefixed
//! line to its sink before the error is raised, so a failure is observable
//! even when the caller drops the error on the floor.

use parking_lot::Mutex;
use tracing::warn;

/// Write-only destination for diagnostic text.
pub trait DiagnosticSink: Send + Sync {
    /// Deliver one human-readable diagnostic line.
    fn emit(&self, message: &str);
}

/// Default sink; routes diagnostics through `tracing` at warn level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&self, message: &str) {
        warn!(target: "serial_session", "{message}");
    }
}

/// Sink that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn emit(&self, _message: &str) {}
}

/// Sink that retains every line in memory, for inspection in tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    messages: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything emitted so far, in emission order.
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }

    /// True if any emitted line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.messages.lock().iter().any(|m| m.contains(needle))
    }
}

impl DiagnosticSink for MemorySink {
    fn emit(&self, message: &str) {
        self.messages.lock().push(message.to_string());
    }
}
