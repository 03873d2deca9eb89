//! Selector controller: interaction modes, operations, persistence.
//!
//! Owns the single source of truth for the active cell and the frequency
//! table, drives the device link, and persists the settings blob after
//! every committed state change. Single-threaded and blocking; callers
//! issue one request at a time.

use crate::error::{Error, Result};
use crate::grid::{Cell, FrequencyTable, BAND_COUNT, CHANNEL_COUNT};
use crate::link::{DeviceLink, LinkConfig};
use crate::navigator;
use crate::settings::Settings;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Caller-driven interaction mode.
///
/// Modes are mutually exclusive, entered and left explicitly, and never
/// expire on their own. A successful pick or edit leaves the mode
/// unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Cell selection navigates the hardware
    #[default]
    Idle,
    /// Cell selection relabels the active cell without moving the hardware
    ArmedForPick,
    /// Cell selection targets a frequency value for editing
    EditingTable,
}

/// Outcome of a mode-dispatched cell selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Hardware was driven to the cell and the label committed
    Navigated(Cell),
    /// Active cell relabelled; no hardware motion
    Picked(Cell),
    /// Editing mode: the caller should prompt for a value and call
    /// [`Controller::edit_frequency`]
    EditPrompt {
        band: String,
        /// 1-based channel number as the operator sees it
        channel: usize,
        current_mhz: u16,
    },
}

/// Controller for one selector device.
pub struct Controller {
    settings: Settings,
    settings_path: PathBuf,
    link: DeviceLink,
    mode: Mode,
}

impl Controller {
    /// Load persisted state from `settings_path` and build a controller.
    ///
    /// The persisted port, if any, is handed to the link; no serial session
    /// is opened until the first navigation or an explicit [`connect`].
    ///
    /// [`connect`]: Controller::connect
    pub fn new(link_config: LinkConfig, settings_path: PathBuf) -> Self {
        let settings = Settings::load(&settings_path);
        let mut link = DeviceLink::new(link_config);
        link.set_port(settings.arduino_port.clone());
        Controller {
            settings,
            settings_path,
            link,
            mode: Mode::Idle,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Enter or leave an interaction mode explicitly.
    pub fn set_mode(&mut self, mode: Mode) {
        if mode != self.mode {
            log::info!("Mode: {:?} -> {:?}", self.mode, mode);
        }
        self.mode = mode;
    }

    /// Cell believed to be selected on the hardware.
    pub fn active_cell(&self) -> Cell {
        self.settings.active_cell
    }

    pub fn frequencies(&self) -> &FrequencyTable {
        &self.settings.frequencies
    }

    /// Configured serial port, if any.
    pub fn port(&self) -> Option<&str> {
        self.link.port()
    }

    /// Direct link access for tests and simulators.
    pub fn link_mut(&mut self) -> &mut DeviceLink {
        &mut self.link
    }

    /// Flag for cancelling an in-flight navigation between commands.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        self.link.cancel_handle()
    }

    /// Dispatch a cell selection according to the current mode.
    ///
    /// `Idle` navigates the hardware, `ArmedForPick` relabels the active
    /// cell, and `EditingTable` returns the targeted value so the caller
    /// can prompt for a replacement.
    pub fn select_cell(&mut self, cell: Cell) -> Result<Selection> {
        match self.mode {
            Mode::Idle => {
                self.navigate_to(cell)?;
                Ok(Selection::Navigated(cell))
            }
            Mode::ArmedForPick => {
                self.pick_active(cell)?;
                Ok(Selection::Picked(cell))
            }
            Mode::EditingTable => {
                // band index is in range because the cell is
                let band = self.settings.frequencies.band(cell.col).map(|b| b.name.clone());
                let band = band.ok_or(Error::CellOutOfRange {
                    row: cell.row,
                    col: cell.col,
                })?;
                Ok(Selection::EditPrompt {
                    band,
                    channel: cell.row + 1,
                    current_mhz: self.settings.frequencies.frequency(cell),
                })
            }
        }
    }

    /// Drive the hardware from the active cell to `target` and commit the
    /// new label on full success.
    ///
    /// On [`Error::CommandFailed`] the in-memory active cell is left
    /// untouched but must be treated as unverified; re-synchronize with
    /// [`pick_active`] once the physical position is known.
    ///
    /// [`pick_active`]: Controller::pick_active
    pub fn navigate_to(&mut self, target: Cell) -> Result<()> {
        let current = self.settings.active_cell;
        let commands = navigator::plan(current, target, CHANNEL_COUNT, BAND_COUNT);
        if commands.is_empty() {
            log::debug!("Already on {}", target);
            return Ok(());
        }
        log::info!(
            "Navigating {} -> {} ({} steps)",
            current,
            target,
            commands.len()
        );
        self.link.execute(&commands)?;
        self.settings.active_cell = target;
        self.persist();
        log::info!("Selector on {}", target);
        Ok(())
    }

    /// Relabel the active cell without driving the hardware.
    pub fn pick_active(&mut self, cell: Cell) -> Result<()> {
        self.settings.active_cell = cell;
        self.persist();
        log::info!("Active cell relabelled to {}", cell);
        Ok(())
    }

    /// Overwrite one frequency value. No navigation is triggered.
    ///
    /// `row` is the 0-based channel index; `band` matches by name,
    /// case-insensitively.
    pub fn edit_frequency(&mut self, band: &str, row: usize, mhz: u16) -> Result<()> {
        let col = self
            .settings
            .frequencies
            .band_index(band)
            .ok_or_else(|| Error::UnknownBand(band.to_string()))?;
        let cell = Cell::new(row, col)?;
        self.settings.frequencies.set_frequency(cell, mhz);
        self.persist();
        log::info!("{} channel {} set to {} MHz", band, row + 1, mhz);
        Ok(())
    }

    /// Reconfigure the serial port, dropping any open session.
    pub fn set_port(&mut self, device_id: Option<String>) -> Result<()> {
        self.link.set_port(device_id.clone());
        self.settings.arduino_port = device_id;
        self.persist();
        Ok(())
    }

    /// Open the serial session eagerly and re-home the channel label.
    ///
    /// The selector hardware powers up on the first channel of whichever
    /// band it is physically on, so after a connect the active cell is
    /// relabelled to row 0 of its current column.
    pub fn connect(&mut self) -> Result<()> {
        self.link.connect()?;
        let col = self.settings.active_cell.col;
        self.settings.active_cell = Cell::new(0, col)?;
        self.persist();
        log::info!("Connected; active cell re-homed to {}", self.settings.active_cell);
        Ok(())
    }

    /// Persist after a committed mutation; failure is logged, never fatal.
    ///
    /// The in-memory state stays authoritative when the disk is unhappy.
    fn persist(&self) {
        if let Err(e) = self.settings.store(&self.settings_path) {
            log::error!("Failed to persist settings: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;
    use std::time::Duration;

    fn test_config() -> LinkConfig {
        LinkConfig {
            baud_rate: 9600,
            response_timeout: Duration::from_millis(20),
            inter_command_delay: Duration::from_millis(0),
        }
    }

    fn scratch_settings(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("bandstep-ctl-{}", std::process::id()))
            .join(name)
    }

    fn controller_with_mock(name: &str) -> (Controller, MockTransport) {
        let mut controller = Controller::new(test_config(), scratch_settings(name));
        let mock = MockTransport::new();
        controller.link_mut().set_port(Some("mock".to_string()));
        controller.link_mut().attach_transport(Box::new(mock.clone()));
        (controller, mock)
    }

    #[test]
    fn pick_does_no_device_io() {
        let path = scratch_settings("pick.json");
        let mut controller = Controller::new(test_config(), path.clone());
        // No port, no transport: navigation would fail, picking must not
        controller.set_mode(Mode::ArmedForPick);
        let result = controller.select_cell(Cell::new(4, 3).unwrap()).unwrap();
        assert_eq!(result, Selection::Picked(Cell::new(4, 3).unwrap()));
        assert_eq!(controller.active_cell(), Cell::new(4, 3).unwrap());
        // Mode does not auto-expire
        assert_eq!(controller.mode(), Mode::ArmedForPick);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn idle_selection_navigates_and_commits() {
        let (mut controller, mock) = controller_with_mock("navigate.json");
        mock.inject_read(b"ok\nok\nok\nok\nok\n");

        let target = Cell::new(3, 2).unwrap();
        let result = controller.select_cell(target).unwrap();
        assert_eq!(result, Selection::Navigated(target));
        assert_eq!(controller.active_cell(), target);
        // Two column steps forward, three row steps forward
        assert_eq!(mock.get_written(), b"22222");
    }

    #[test]
    fn failed_navigation_leaves_label_untouched() {
        let (mut controller, mock) = controller_with_mock("failed-nav.json");
        // Acknowledge only the first step of five
        mock.inject_read(b"ok\n");

        let before = controller.active_cell();
        let err = controller.navigate_to(Cell::new(3, 2).unwrap()).unwrap_err();
        assert!(matches!(err, Error::CommandFailed { index: 1, .. }));
        assert_eq!(controller.active_cell(), before);
    }

    #[test]
    fn navigation_to_current_cell_is_silent() {
        let path = scratch_settings("noop.json");
        let mut controller = Controller::new(test_config(), path);
        // No port configured, but an empty plan never reaches the link
        let current = controller.active_cell();
        controller.navigate_to(current).unwrap();
    }

    #[test]
    fn navigation_without_port_is_rejected() {
        let path = scratch_settings("noport.json");
        let mut controller = Controller::new(test_config(), path);
        let err = controller.navigate_to(Cell::new(1, 1).unwrap()).unwrap_err();
        assert!(matches!(err, Error::NoPortConfigured));
    }

    #[test]
    fn edit_mode_prompts_then_edits() {
        let (mut controller, _mock) = controller_with_mock("edit.json");
        controller.set_mode(Mode::EditingTable);

        let cell = Cell::new(2, 1).unwrap();
        let selection = controller.select_cell(cell).unwrap();
        assert_eq!(
            selection,
            Selection::EditPrompt {
                band: "BAND B".to_string(),
                channel: 3,
                current_mhz: 5771,
            }
        );

        controller.edit_frequency("band b", 2, 5800).unwrap();
        assert_eq!(controller.frequencies().frequency(cell), 5800);
        // Editing neither navigates nor changes mode
        assert_eq!(controller.mode(), Mode::EditingTable);
    }

    #[test]
    fn edit_unknown_band_is_rejected() {
        let (mut controller, _mock) = controller_with_mock("edit-bad.json");
        let err = controller.edit_frequency("BAND Q", 0, 5000).unwrap_err();
        assert!(matches!(err, Error::UnknownBand(_)));
    }

    #[test]
    fn connect_rehomes_channel_label() {
        let (mut controller, mock) = controller_with_mock("connect.json");
        controller.pick_active(Cell::new(5, 3).unwrap()).unwrap();

        controller.connect().unwrap();
        assert_eq!(controller.active_cell(), Cell::new(0, 3).unwrap());
        // Re-homing is a relabel, not a navigation
        assert!(mock.get_written().is_empty());
    }

    #[test]
    fn state_survives_a_restart() {
        let path = scratch_settings("restart.json");
        {
            let mut controller = Controller::new(test_config(), path.clone());
            controller.pick_active(Cell::new(6, 4).unwrap()).unwrap();
            controller.edit_frequency("BAND X", 0, 4991).unwrap();
            controller.set_port(Some("/dev/ttyUSB7".to_string())).unwrap();
        }
        let controller = Controller::new(test_config(), path.clone());
        assert_eq!(controller.active_cell(), Cell::new(6, 4).unwrap());
        assert_eq!(
            controller
                .frequencies()
                .frequency(Cell::new(0, 5).unwrap()),
            4991
        );
        assert_eq!(controller.port(), Some("/dev/ttyUSB7"));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn persistence_failure_keeps_memory_state() {
        // A directory path that cannot be created (parent is a file)
        let parent = scratch_settings("blocker");
        std::fs::create_dir_all(parent.parent().unwrap()).unwrap();
        std::fs::write(&parent, b"file, not dir").unwrap();
        let path = parent.join("settings.json");

        let mut controller = Controller::new(test_config(), path);
        controller.pick_active(Cell::new(2, 2).unwrap()).unwrap();
        assert_eq!(controller.active_cell(), Cell::new(2, 2).unwrap());

        let _ = std::fs::remove_file(&parent);
    }
}
