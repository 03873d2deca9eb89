//! Persisted application state: port, active cell, frequency table.
//!
//! A small JSON blob rewritten after every committed state change. Reads
//! are forgiving: a missing file or a malformed field falls back to its
//! default, field by field, so the application always starts with a usable
//! table. Writes go through a sibling temp file and an atomic rename so a
//! crash mid-write cannot corrupt the previous blob.

use crate::error::{Error, Result};
use crate::grid::{Cell, FrequencyTable};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Persisted selector state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Serial port of the selector hardware, if one has been chosen
    pub arduino_port: Option<String>,
    /// Cell believed to be selected on the hardware
    pub active_cell: Cell,
    /// Band/channel frequency table
    pub frequencies: FrequencyTable,
}

impl Settings {
    /// Load settings from `path`.
    ///
    /// Never fails: a missing file yields defaults, unreadable or malformed
    /// content degrades field by field with a logged warning.
    pub fn load(path: &Path) -> Self {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No settings file at {}, using defaults", path.display());
                return Self::default();
            }
            Err(e) => {
                log::warn!("Failed to read settings {}: {}", path.display(), e);
                return Self::default();
            }
        };
        let value: Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Settings file {} is not valid JSON: {}", path.display(), e);
                return Self::default();
            }
        };
        Self::from_value(value)
    }

    /// Field-wise extraction; each malformed field degrades to its default.
    fn from_value(value: Value) -> Self {
        let mut settings = Self::default();
        let Value::Object(mut fields) = value else {
            log::warn!("Settings root is not an object, using defaults");
            return settings;
        };

        if let Some(port) = fields.remove("arduino_port") {
            match serde_json::from_value(port) {
                Ok(port) => settings.arduino_port = port,
                Err(e) => log::warn!("Ignoring malformed arduino_port: {}", e),
            }
        }
        if let Some(cell) = fields.remove("active_cell") {
            match serde_json::from_value(cell) {
                Ok(cell) => settings.active_cell = cell,
                Err(e) => log::warn!("Ignoring malformed active_cell: {}", e),
            }
        }
        if let Some(frequencies) = fields.remove("frequencies") {
            match serde_json::from_value(frequencies) {
                Ok(frequencies) => settings.frequencies = frequencies,
                Err(e) => log::warn!("Ignoring malformed frequencies: {}", e),
            }
        }
        settings
    }

    /// Atomically replace the blob at `path`.
    pub fn store(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(Error::Persistence)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| Error::Persistence(e.into()))?;
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, json).map_err(Error::Persistence)?;
        fs::rename(&tmp, path).map_err(Error::Persistence)?;
        log::debug!("Settings written to {}", path.display());
        Ok(())
    }

    /// Default per-user settings location.
    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("bandstep")
            .join("settings.json")
    }
}
