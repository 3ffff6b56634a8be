//! Host serial port implementation.
//!
//! Wraps the `serialport` crate behind [`PortSource`] and [`SerialIo`] so
//! the session never talks to the OS directly.

use super::traits::{PortSource, SerialIo};
use crate::config::SessionConfig;
use crate::error::SessionError;
use std::io::{Read, Write};
use std::time::Duration;

/// Driver-level read timeout. The receive pipeline only reads after the
/// driver has reported bytes waiting, so this never paces delivery; it
/// bounds a read that races a device disappearing.
const NATIVE_READ_TIMEOUT: Duration = Duration::from_millis(100);

/// [`PortSource`] backed by the host's serial subsystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeSource;

impl PortSource for NativeSource {
    fn enumerate(&self) -> Result<Vec<String>, SessionError> {
        let ports = serialport::available_ports()?;
        Ok(ports.into_iter().map(|p| p.port_name).collect())
    }

    fn open(&self, name: &str, config: &SessionConfig) -> Result<Box<dyn SerialIo>, SessionError> {
        Ok(Box::new(NativePort::open(name, config)?))
    }
}

/// An opened host serial handle.
pub struct NativePort {
    port: Box<dyn serialport::SerialPort>,
    name: String,
}

impl NativePort {
    /// Open a host serial port with the given configuration.
    ///
    /// # Example
    /// ```no_run
    /// use serial_session::{NativePort, SessionConfig};
    ///
    /// let port = NativePort::open("/dev/ttyUSB0", &SessionConfig::default())?;
    /// # Ok::<(), serial_session::SessionError>(())
    /// ```
    pub fn open(name: &str, config: &SessionConfig) -> Result<Self, SessionError> {
        let port = serialport::new(name, config.baud_rate.value())
            .data_bits(config.data_bits.into())
            .parity(config.parity.try_into()?)
            .stop_bits(config.stop_bits.try_into()?)
            .flow_control(serialport::FlowControl::None)
            .timeout(NATIVE_READ_TIMEOUT)
            .open()
            .map_err(|e| match e.kind() {
                serialport::ErrorKind::NoDevice => SessionError::invalid_port(name),
                serialport::ErrorKind::InvalidInput => SessionError::unsupported(e.to_string()),
                _ => SessionError::Serial(e),
            })?;

        Ok(Self {
            port,
            name: name.to_string(),
        })
    }
}

impl SerialIo for NativePort {
    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, SessionError> {
        self.port.write(data).map_err(SessionError::Io)
    }

    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, SessionError> {
        self.port.read(buffer).map_err(SessionError::Io)
    }

    fn bytes_to_read(&self) -> Result<usize, SessionError> {
        Ok(self.port.bytes_to_read()? as usize)
    }

    fn discard_input(&mut self) -> Result<(), SessionError> {
        Ok(self.port.clear(serialport::ClearBuffer::Input)?)
    }

    fn discard_output(&mut self) -> Result<(), SessionError> {
        Ok(self.port.clear(serialport::ClearBuffer::Output)?)
    }

    fn set_data_terminal_ready(&mut self, level: bool) -> Result<(), SessionError> {
        Ok(self.port.write_data_terminal_ready(level)?)
    }

    fn set_request_to_send(&mut self, level: bool) -> Result<(), SessionError> {
        Ok(self.port.write_request_to_send(level)?)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for NativePort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativePort")
            .field("name", &self.name)
            .field("baud_rate", &self.port.baud_rate())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_nonexistent_port_fails() {
        let result = NativePort::open("/dev/nonexistent_port_12345", &SessionConfig::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_open_rejects_unsupported_parity_before_os_call() {
        let config = SessionConfig {
            parity: crate::config::Parity::Space,
            ..Default::default()
        };
        let result = NativePort::open("/dev/nonexistent_port_12345", &config);
        assert!(matches!(result, Err(SessionError::UnsupportedConfig(_))));
    }
}
