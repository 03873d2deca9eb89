//! Transport layer for serial I/O abstraction

use std::io;

mod mock;
mod serial;

pub use mock::MockTransport;
pub use serial::SerialTransport;

/// Transport trait for device communication
///
/// Errors are plain `std::io::Error` so a read timeout
/// (`io::ErrorKind::TimedOut`) travels unchanged into the link's
/// per-command failure reporting.
pub trait Transport: Send {
    /// Read data into buffer, returns number of bytes read (0 when nothing
    /// arrived within the transport's own read timeout)
    fn read(&mut self, buffer: &mut [u8]) -> io::Result<usize>;

    /// Write data from buffer, returns number of bytes written
    fn write(&mut self, data: &[u8]) -> io::Result<usize>;

    /// Flush any pending writes (blocking until complete)
    fn flush(&mut self) -> io::Result<()>;
}
