//! Error types for bandstep

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Bandstep error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No serial port has been configured yet
    #[error("no serial port configured; select a port before navigating")]
    NoPortConfigured,

    /// Opening the serial port failed
    #[error("failed to open serial port {port}: {source}")]
    ConnectionFailed {
        /// Port identifier that was being opened
        port: String,
        #[source]
        source: serialport::Error,
    },

    /// A step command failed mid-sequence; the selector position is unverified
    #[error("step command {index} failed, selector position is unverified: {source}")]
    CommandFailed {
        /// Zero-based index of the failed command in the sequence
        index: usize,
        #[source]
        source: std::io::Error,
    },

    /// Navigation cancelled between commands
    #[error("navigation cancelled before command {index}")]
    Cancelled {
        /// Zero-based index of the command that was about to be sent
        index: usize,
    },

    /// Cell outside the fixed band/channel grid
    #[error("cell out of range: channel index {row}, band index {col}")]
    CellOutOfRange { row: usize, col: usize },

    /// Band name not present in the frequency table
    #[error("unknown band: {0}")]
    UnknownBand(String),

    /// Settings blob could not be written
    #[error("failed to persist settings: {0}")]
    Persistence(#[source] std::io::Error),

    /// Serial port error
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),
}
