//! End-to-end tests for the controller over a mock transport.
//!
//! These exercise the full stack below the UI: mode dispatch, planning,
//! wire encoding, failure propagation, and settings persistence.

use bandstep::transport::MockTransport;
use bandstep::{Cell, Controller, Error, LinkConfig, Mode, Selection, Settings};
use std::path::PathBuf;
use std::time::Duration;

fn fast_config() -> LinkConfig {
    LinkConfig {
        baud_rate: 9600,
        response_timeout: Duration::from_millis(20),
        inter_command_delay: Duration::from_millis(0),
    }
}

fn scratch_settings(name: &str) -> PathBuf {
    let path = std::env::temp_dir()
        .join(format!("bandstep-it-{}", std::process::id()))
        .join(name);
    let _ = std::fs::remove_file(&path);
    path
}

fn wired_controller(name: &str) -> (Controller, MockTransport, PathBuf) {
    let path = scratch_settings(name);
    let mut controller = Controller::new(fast_config(), path.clone());
    let mock = MockTransport::new();
    controller.link_mut().set_port(Some("mock".to_string()));
    controller
        .link_mut()
        .attach_transport(Box::new(mock.clone()));
    (controller, mock, path)
}

#[test]
fn full_navigation_commits_and_persists() {
    let (mut controller, mock, path) = wired_controller("full-nav.json");
    mock.inject_read(b"ok\nok\nok\nok\nok\n");

    let target = Cell::new(3, 2).unwrap();
    let selection = controller.select_cell(target).unwrap();
    assert_eq!(selection, Selection::Navigated(target));

    // Band first (2 forward), then channels (3 forward)
    assert_eq!(mock.get_written(), b"22222");

    // The committed label survives a reload from disk
    let reloaded = Settings::load(&path);
    assert_eq!(reloaded.active_cell, target);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn sequence_aborts_at_first_silent_command() {
    let (mut controller, mock, path) = wired_controller("abort.json");
    // 4-step plan: (0,0) -> (4,0) forward; device answers the first two
    mock.inject_read(b"ok\nok\n");

    let err = controller.navigate_to(Cell::new(4, 0).unwrap()).unwrap_err();
    match err {
        Error::CommandFailed { index, .. } => assert_eq!(index, 2),
        other => panic!("expected CommandFailed, got {other:?}"),
    }
    // The third command was written, the fourth never was
    assert_eq!(mock.get_written(), b"222");
    // Nothing was committed
    assert_eq!(controller.active_cell(), Cell::new(0, 0).unwrap());
    assert_eq!(Settings::load(&path).active_cell, Cell::new(0, 0).unwrap());

    let _ = std::fs::remove_file(&path);
}

#[test]
fn resynchronize_after_failure_with_pick() {
    let (mut controller, mock, path) = wired_controller("resync.json");
    mock.inject_read(b"ok\n");

    assert!(controller.navigate_to(Cell::new(3, 0).unwrap()).is_err());

    // Operator reads the hardware dial and relabels without motion
    controller.set_mode(Mode::ArmedForPick);
    let written_before = mock.get_written().len();
    controller.select_cell(Cell::new(1, 0).unwrap()).unwrap();
    assert_eq!(mock.get_written().len(), written_before);
    assert_eq!(controller.active_cell(), Cell::new(1, 0).unwrap());

    // Back to Idle, navigation plans from the corrected label
    controller.set_mode(Mode::Idle);
    mock.inject_read(b"ok\nok\n");
    controller.select_cell(Cell::new(3, 0).unwrap()).unwrap();
    let written = mock.get_written();
    // Two more forward row steps after the earlier two writes
    assert_eq!(&written[written_before..], b"22");

    let _ = std::fs::remove_file(&path);
}

#[test]
fn mode_round_trip_matches_contract() {
    let (mut controller, mock, path) = wired_controller("modes.json");

    // EditingTable: selection is a prompt, not motion
    controller.set_mode(Mode::EditingTable);
    let cell = Cell::new(0, 4).unwrap();
    let selection = controller.select_cell(cell).unwrap();
    assert_eq!(
        selection,
        Selection::EditPrompt {
            band: "LOWRACE".to_string(),
            channel: 1,
            current_mhz: 5362,
        }
    );
    controller.edit_frequency("LOWRACE", 0, 5400).unwrap();
    assert_eq!(controller.mode(), Mode::EditingTable);
    assert!(mock.get_written().is_empty());

    // The edit is on disk
    let reloaded = Settings::load(&path);
    assert_eq!(reloaded.frequencies.frequency(cell), 5400);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn port_reconfiguration_drops_the_session() {
    let (mut controller, mock, path) = wired_controller("reconfig.json");
    mock.inject_read(b"ok\n");
    controller.navigate_to(Cell::new(1, 0).unwrap()).unwrap();
    assert!(controller.link_mut().is_connected());

    controller.set_port(Some("/dev/ttyUSB9".to_string())).unwrap();
    assert!(!controller.link_mut().is_connected());
    assert_eq!(controller.port(), Some("/dev/ttyUSB9"));
    assert_eq!(Settings::load(&path).arduino_port.as_deref(), Some("/dev/ttyUSB9"));

    let _ = std::fs::remove_file(&path);
}

#[test]
fn cancellation_between_commands() {
    let (mut controller, mock, path) = wired_controller("cancel.json");
    controller.cancel_handle().store(true, std::sync::atomic::Ordering::Relaxed);

    let err = controller.navigate_to(Cell::new(2, 0).unwrap()).unwrap_err();
    assert!(matches!(err, Error::Cancelled { index: 0 }));
    assert!(mock.get_written().is_empty());
    assert_eq!(controller.active_cell(), Cell::new(0, 0).unwrap());

    let _ = std::fs::remove_file(&path);
}
