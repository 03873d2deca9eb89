//! Device link: plays planned step sequences against the selector hardware.
//!
//! Strictly one command at a time: write the step's wire code, flush, block
//! for the device's newline-terminated acknowledgement, pause for the
//! device's processing latency, then send the next. The first failure
//! aborts the remainder of the sequence; steps already sent are not rolled
//! back, so on failure the caller must treat the selector position as
//! unverified and re-synchronize.

use crate::error::{Error, Result};
use crate::navigator::{Command, Direction};
use crate::transport::{SerialTransport, Transport};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Bound on a single blocking read; the response deadline spans many of these.
const READ_POLL: Duration = Duration::from_millis(5);

/// Timing parameters for the device link.
#[derive(Debug, Clone)]
pub struct LinkConfig {
    /// Serial baud rate of the selector firmware
    pub baud_rate: u32,
    /// Deadline for one command acknowledgement
    pub response_timeout: Duration,
    /// Pause after each acknowledgement before the next command
    pub inter_command_delay: Duration,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            baud_rate: 9600,
            response_timeout: Duration::from_secs(3),
            inter_command_delay: Duration::from_millis(100),
        }
    }
}

/// Wire encoding: one ASCII digit per step, `2` = forward, `1` = backward.
///
/// The axis is not on the wire; the firmware applies column steps and row
/// steps by sequence position (band first, then channels).
const fn wire_code(command: Command) -> &'static [u8] {
    match command.direction {
        Direction::Forward => b"2",
        Direction::Backward => b"1",
    }
}

/// Owns the serial session and executes step sequences synchronously.
///
/// At most one session is live at a time; reconfiguring the port drops any
/// open session before a new one may be opened.
pub struct DeviceLink {
    config: LinkConfig,
    port_id: Option<String>,
    transport: Option<Box<dyn Transport>>,
    cancel: Arc<AtomicBool>,
}

impl DeviceLink {
    pub fn new(config: LinkConfig) -> Self {
        DeviceLink {
            config,
            port_id: None,
            transport: None,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Configured port identifier, if any.
    pub fn port(&self) -> Option<&str> {
        self.port_id.as_deref()
    }

    /// Whether a serial session is currently open.
    pub fn is_connected(&self) -> bool {
        self.transport.is_some()
    }

    /// Configure the serial port, dropping any open session.
    pub fn set_port(&mut self, port_id: Option<String>) {
        if self.transport.take().is_some() {
            log::info!("Closing serial session (port reconfigured)");
        }
        self.port_id = port_id;
    }

    /// Replace the transport directly, bypassing the serial open.
    ///
    /// Used by tests and simulators; a port identifier must still be
    /// configured for `execute` to proceed.
    pub fn attach_transport(&mut self, transport: Box<dyn Transport>) {
        self.transport = Some(transport);
    }

    /// Flag for requesting cancellation; honored between commands only,
    /// never mid-transaction. Consumed when it fires.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Ensure a live session, opening one lazily from the configured port.
    pub fn connect(&mut self) -> Result<()> {
        if self.transport.is_some() {
            return Ok(());
        }
        let port = self.port_id.as_deref().ok_or(Error::NoPortConfigured)?;
        let transport =
            SerialTransport::open(port, self.config.baud_rate, READ_POLL).map_err(|source| {
                Error::ConnectionFailed {
                    port: port.to_string(),
                    source,
                }
            })?;
        self.transport = Some(Box::new(transport));
        Ok(())
    }

    /// Execute a planned step sequence, strictly in order.
    ///
    /// Stops at the first failure with the index of the failed command;
    /// no command after a failed one is written.
    pub fn execute(&mut self, commands: &[Command]) -> Result<()> {
        if self.port_id.is_none() {
            return Err(Error::NoPortConfigured);
        }
        self.connect()?;

        for (index, command) in commands.iter().copied().enumerate() {
            if self.cancel.swap(false, Ordering::Relaxed) {
                log::warn!("Navigation cancelled before command {}", index);
                return Err(Error::Cancelled { index });
            }
            if let Err(source) = self.transact(command) {
                log::error!("Command {} ({:?}) failed: {}", index, command, source);
                return Err(Error::CommandFailed { index, source });
            }
            std::thread::sleep(self.config.inter_command_delay);
        }
        Ok(())
    }

    /// Send one step and wait for the device's acknowledgement line.
    fn transact(&mut self, command: Command) -> io::Result<()> {
        let transport = self
            .transport
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "no open session"))?;

        let code = wire_code(command);
        let mut written = 0;
        while written < code.len() {
            let n = transport.write(&code[written..])?;
            if n == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "serial write stalled",
                ));
            }
            written += n;
        }
        transport.flush()?;

        let response = read_line(transport.as_mut(), self.config.response_timeout)?;
        log::debug!(
            "Sent {:?} {:?}, device replied {:?}",
            command.axis,
            command.direction,
            response.trim()
        );
        Ok(())
    }
}

/// Read one newline-terminated response line within `timeout`.
///
/// Reply content is diagnostic only; any completed line counts as success,
/// a missed deadline is a timeout.
fn read_line(transport: &mut dyn Transport, timeout: Duration) -> io::Result<String> {
    let deadline = Instant::now() + timeout;
    let mut line = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        let n = transport.read(&mut byte)?;
        if n == 0 {
            if Instant::now() >= deadline {
                return Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    "no response from selector",
                ));
            }
            std::thread::sleep(READ_POLL);
            continue;
        }
        if byte[0] == b'\n' {
            return Ok(String::from_utf8_lossy(&line).into_owned());
        }
        line.push(byte[0]);
    }
}
