//! Band/channel grid model and the frequency table.
//!
//! The selector hardware is a fixed 6x8 grid: six bands mapped to columns,
//! eight channels per band mapped to rows. Both axes wrap around.

use crate::error::{Error, Result};
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Number of bands (grid columns)
pub const BAND_COUNT: usize = 6;

/// Channels per band (grid rows)
pub const CHANNEL_COUNT: usize = 8;

/// A position on the selector grid: channel row, band column.
///
/// Persisted as a `[row, col]` pair; construction through [`Cell::new`]
/// rejects out-of-range coordinates so downstream code never sees them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "(usize, usize)", into = "(usize, usize)")]
pub struct Cell {
    /// Channel index, `0..CHANNEL_COUNT`
    pub row: usize,
    /// Band index, `0..BAND_COUNT`
    pub col: usize,
}

impl Cell {
    /// Create a cell, rejecting coordinates outside the fixed grid.
    pub fn new(row: usize, col: usize) -> Result<Self> {
        if row >= CHANNEL_COUNT || col >= BAND_COUNT {
            return Err(Error::CellOutOfRange { row, col });
        }
        Ok(Cell { row, col })
    }
}

impl TryFrom<(usize, usize)> for Cell {
    type Error = Error;

    fn try_from((row, col): (usize, usize)) -> Result<Self> {
        Cell::new(row, col)
    }
}

impl From<Cell> for (usize, usize) {
    fn from(cell: Cell) -> Self {
        (cell.row, cell.col)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 1-based, the way the operator reads the panel
        write!(f, "band {} channel {}", self.col + 1, self.row + 1)
    }
}

/// One band: display name plus its eight channel frequencies in MHz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Band {
    pub name: String,
    pub channels: [u16; CHANNEL_COUNT],
}

/// The frequency table: six bands in column order, eight channels each.
///
/// Band order is the physical column order on the selector, so the
/// table is a sequence, not a hash map. It serializes
/// as a JSON map (`name -> frequencies`) to keep the settings blob format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    bands: Vec<Band>,
}

impl FrequencyTable {
    /// Band at a column, if the column is in range.
    pub fn band(&self, col: usize) -> Option<&Band> {
        self.bands.get(col)
    }

    /// All bands in column order.
    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    /// Column index for a band name (case-insensitive).
    pub fn band_index(&self, name: &str) -> Option<usize> {
        self.bands
            .iter()
            .position(|b| b.name.eq_ignore_ascii_case(name))
    }

    /// Frequency in MHz at a cell.
    pub fn frequency(&self, cell: Cell) -> u16 {
        self.bands[cell.col].channels[cell.row]
    }

    /// Overwrite the frequency at a cell.
    pub fn set_frequency(&mut self, cell: Cell, mhz: u16) {
        self.bands[cell.col].channels[cell.row] = mhz;
    }
}

impl Default for FrequencyTable {
    /// The stock 5.8 GHz table the selector ships with.
    fn default() -> Self {
        fn band(name: &str, channels: [u16; CHANNEL_COUNT]) -> Band {
            Band {
                name: name.to_string(),
                channels,
            }
        }
        FrequencyTable {
            bands: vec![
                band("BAND A", [5865, 5845, 5825, 5805, 5785, 5765, 5745, 5725]),
                band("BAND B", [5733, 5752, 5771, 5790, 5809, 5828, 5847, 5866]),
                band("BAND E", [5705, 5685, 5665, 5645, 5885, 5905, 5925, 5945]),
                band("BAND F", [5740, 5760, 5780, 5800, 5820, 5840, 5860, 5880]),
                band("LOWRACE", [5362, 5399, 5436, 5473, 5510, 5547, 5584, 5621]),
                band("BAND X", [4990, 5020, 5050, 5080, 5110, 5140, 5170, 5200]),
            ],
        }
    }
}

impl Serialize for FrequencyTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.bands.len()))?;
        for band in &self.bands {
            map.serialize_entry(&band.name, &band.channels[..])?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FrequencyTable {
    fn deserialize<D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = FrequencyTable;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(
                    f,
                    "a map of {BAND_COUNT} bands to {CHANNEL_COUNT} frequencies each"
                )
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<FrequencyTable, A::Error> {
                let mut bands = Vec::with_capacity(BAND_COUNT);
                while let Some((name, channels)) =
                    access.next_entry::<String, Vec<u16>>()?
                {
                    let channels: [u16; CHANNEL_COUNT] =
                        channels.try_into().map_err(|v: Vec<u16>| {
                            de::Error::invalid_length(v.len(), &self)
                        })?;
                    bands.push(Band { name, channels });
                }
                if bands.len() != BAND_COUNT {
                    return Err(de::Error::invalid_length(bands.len(), &self));
                }
                Ok(FrequencyTable { bands })
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}
