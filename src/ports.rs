//! Serial port discovery for the port-selection UI.

use crate::error::Result;
use serialport::SerialPortType;

/// One selectable serial port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
    /// OS device identifier, e.g. `/dev/ttyUSB0` or `COM3`
    pub device_id: String,
    /// Human-readable description for display
    pub description: String,
}

/// List the serial ports present on the system.
pub fn list() -> Result<Vec<PortInfo>> {
    let ports = serialport::available_ports()?;
    Ok(ports
        .into_iter()
        .map(|port| {
            let description = match port.port_type {
                SerialPortType::UsbPort(usb) => usb
                    .product
                    .unwrap_or_else(|| "USB serial device".to_string()),
                SerialPortType::BluetoothPort => "Bluetooth serial port".to_string(),
                SerialPortType::PciPort => "PCI serial port".to_string(),
                SerialPortType::Unknown => "Serial port".to_string(),
            };
            PortInfo {
                device_id: port.port_name,
                description,
            }
        })
        .collect())
}
