//! Lifecycle tests for `SerialSession`: open/close/dispose transitions,
//! name validation, and the fixed failure set of each operation.
//!
//! Everything runs against `MockSource`/`MockPort`; no hardware required.

use serial_session::{
    BaudRate, MemorySink, MockPort, MockSource, Parity, SerialSession, SessionConfig, SessionError,
    StopBits,
};
use std::sync::Arc;

/// Session wired to a scripted source; the returned port and sink stay
/// shared with the session for inspection.
fn mock_session(ports: &[&str]) -> (SerialSession, MockPort, MockSource, Arc<MemorySink>) {
    let port = MockPort::new("mock");
    let sink = Arc::new(MemorySink::new());
    let source = MockSource::new(ports, port.clone());
    let session = SerialSession::with_parts(Box::new(source.clone()), sink.clone());
    (session, port, source, sink)
}

// ============================================================================
// Closed-state failures
// ============================================================================

#[test]
fn send_on_closed_session_fails_not_open() {
    let (session, _, _, sink) = mock_session(&["COM3"]);

    let result = session.send(&[0x01, 0x02]);
    assert!(matches!(result, Err(SessionError::NotOpen)));
    assert!(sink.contains("send: port is not open"));
}

#[test]
fn close_on_closed_session_fails_not_open() {
    let (mut session, _, _, _) = mock_session(&["COM3"]);
    assert!(matches!(session.close(), Err(SessionError::NotOpen)));
}

// ============================================================================
// Open validation
// ============================================================================

#[test]
fn open_with_no_devices_fails_even_with_explicit_name() {
    let (mut session, _, _, sink) = mock_session(&[]);

    let result = session.open(Some("COM3"), SessionConfig::default());
    assert!(matches!(result, Err(SessionError::NoDeviceAvailable)));
    assert!(!session.is_open());
    assert!(sink.contains("open: no serial device available"));
}

#[test]
fn open_with_unknown_name_fails_and_stays_closed() {
    let (mut session, _, source, sink) = mock_session(&["COM3", "COM5"]);

    let result = session.open(Some("COM9"), SessionConfig::default());
    match result {
        Err(SessionError::InvalidPortName(name)) => assert_eq!(name, "COM9"),
        other => panic!("expected InvalidPortName, got {other:?}"),
    }
    assert!(!session.is_open());
    assert_eq!(source.open_count(), 0);
    assert!(sink.contains("open: unknown serial port: COM9"));
}

#[test]
fn open_without_name_selects_first_enumerated_port() {
    let (mut session, _, _, _) = mock_session(&["COM3", "COM5"]);

    session.open(None, SessionConfig::default()).unwrap();
    assert!(session.is_open());
    assert_eq!(session.port_name(), Some("COM3"));
    assert_eq!(session.available_ports().to_vec(), vec!["COM3", "COM5"]);
}

#[test]
fn open_while_open_fails_already_open() {
    let (mut session, _, source, _) = mock_session(&["COM3"]);
    session.open(None, SessionConfig::default()).unwrap();

    let result = session.open(None, SessionConfig::default());
    assert!(matches!(result, Err(SessionError::AlreadyOpen)));
    assert!(session.is_open());
    assert_eq!(source.open_count(), 1);
}

#[test]
fn open_rejects_unsupported_config_before_touching_the_source() {
    let (mut session, _, source, _) = mock_session(&["COM3"]);

    let config = SessionConfig {
        parity: Parity::Mark,
        ..Default::default()
    };
    assert!(matches!(
        session.open(None, config),
        Err(SessionError::UnsupportedConfig(_))
    ));

    let config = SessionConfig {
        stop_bits: StopBits::OnePointFive,
        ..Default::default()
    };
    assert!(matches!(
        session.open(None, config),
        Err(SessionError::UnsupportedConfig(_))
    ));

    assert_eq!(source.open_count(), 0);
    assert!(!session.is_open());
}

#[test]
fn open_asserts_dtr_and_rts() {
    let (mut session, port, _, _) = mock_session(&["COM3"]);
    assert_eq!(port.dtr(), None);

    session.open(None, SessionConfig::default()).unwrap();
    assert_eq!(port.dtr(), Some(true));
    assert_eq!(port.rts(), Some(true));
}

// ============================================================================
// Close and reopen
// ============================================================================

#[test]
fn close_transitions_back_and_second_close_fails() {
    let (mut session, _, _, _) = mock_session(&["COM3"]);
    session.open(None, SessionConfig::default()).unwrap();
    assert!(session.is_open());

    session.close().unwrap();
    assert!(!session.is_open());

    assert!(matches!(session.close(), Err(SessionError::NotOpen)));
}

#[test]
fn name_and_config_are_retained_across_close() {
    let (mut session, _, _, _) = mock_session(&["COM3"]);
    let config = SessionConfig {
        baud_rate: BaudRate::B9600,
        ..Default::default()
    };
    session.open(Some("COM3"), config).unwrap();
    session.close().unwrap();

    assert_eq!(session.port_name(), Some("COM3"));
    assert_eq!(session.config().baud_rate, BaudRate::B9600);
}

#[test]
fn refresh_replaces_the_list_wholesale() {
    let (mut session, _, source, _) = mock_session(&["COM3"]);
    assert_eq!(session.refresh_ports().to_vec(), vec!["COM3"]);

    source.set_ports(&["COM7", "COM8"]);
    assert_eq!(session.refresh_ports().to_vec(), vec!["COM7", "COM8"]);
}

#[test]
fn refresh_failure_yields_empty_list_and_diagnostic() {
    let (mut session, _, source, sink) = mock_session(&["COM3"]);
    session.refresh_ports();
    assert!(!session.available_ports().is_empty());

    source.set_enumeration_error(true);
    assert!(session.refresh_ports().is_empty());
    assert!(sink.contains("refresh_ports:"));
}

// ============================================================================
// Send
// ============================================================================

#[test]
fn send_empty_buffer_fails_invalid_argument_even_when_open() {
    let (mut session, _, _, sink) = mock_session(&["COM3"]);
    session.open(None, SessionConfig::default()).unwrap();

    let result = session.send(&[]);
    assert!(matches!(result, Err(SessionError::InvalidArgument(_))));
    assert!(sink.contains("send: invalid argument"));
}

#[test]
fn send_writes_full_buffer_then_discards_outbound() {
    let (mut session, port, _, _) = mock_session(&["COM3"]);
    session.open(None, SessionConfig::default()).unwrap();

    session.send(&[0x01, 0x02, 0x03]).unwrap();
    assert_eq!(port.write_log(), vec![vec![0x01, 0x02, 0x03]]);
    assert_eq!(port.output_discards(), 1);
}

#[test]
fn send_surfaces_write_failures() {
    let (mut session, port, _, sink) = mock_session(&["COM3"]);
    session.open(None, SessionConfig::default()).unwrap();

    port.fail_writes(true);
    assert!(matches!(session.send(b"x"), Err(SessionError::Io(_))));
    assert!(sink.contains("send: I/O error"));
}

// ============================================================================
// Dispose
// ============================================================================

#[test]
fn dispose_twice_is_idempotent() {
    let (mut session, _, _, _) = mock_session(&["COM3"]);
    session.open(None, SessionConfig::default()).unwrap();

    session.dispose();
    assert!(!session.is_open());
    session.dispose();
    assert!(session.is_disposed());
}

#[test]
fn dispose_on_closed_session_swallows_not_open() {
    let (mut session, _, _, _) = mock_session(&["COM3"]);
    session.dispose();
    assert!(session.is_disposed());
}

#[test]
fn operations_on_disposed_session_fail_disposed() {
    let (mut session, _, _, _) = mock_session(&["COM3"]);
    session.open(None, SessionConfig::default()).unwrap();
    session.dispose();

    assert!(matches!(session.send(b"x"), Err(SessionError::Disposed)));
    assert!(matches!(session.close(), Err(SessionError::Disposed)));
    assert!(matches!(
        session.subscribe(|_| {}),
        Err(SessionError::Disposed)
    ));
}

#[test]
fn open_revives_a_disposed_session() {
    let (mut session, _, _, _) = mock_session(&["COM3"]);
    session.open(None, SessionConfig::default()).unwrap();
    session.dispose();

    session.open(None, SessionConfig::default()).unwrap();
    assert!(session.is_open());
    assert!(!session.is_disposed());
    session.send(b"alive").unwrap();
}
