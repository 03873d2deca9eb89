//! Bandstep - serial driver for a stepped band/channel selector
//!
//! Drives a motorized 6x8 band/channel selector over a serial link. A pure
//! planner turns "current cell, target cell" into the minimal step sequence
//! on the wraparound grid, and a device link plays that sequence against
//! the hardware one acknowledged command at a time. The controller on top
//! owns the active-cell label, the frequency table, the interaction modes,
//! and settings persistence.

pub mod controller;
pub mod error;
pub mod grid;
pub mod link;
pub mod navigator;
pub mod ports;
pub mod settings;
pub mod transport;

// Re-export commonly used types
pub use controller::{Controller, Mode, Selection};
pub use error::{Error, Result};
pub use grid::{Cell, FrequencyTable, BAND_COUNT, CHANNEL_COUNT};
pub use link::{DeviceLink, LinkConfig};
pub use settings::Settings;
