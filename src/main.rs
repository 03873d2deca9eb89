//! Bandstep CLI - drive the channel selector from the command line.
//!
//! The command line is the "caller" of the core: it turns arguments into
//! controller operations and prints the outcome. Band and channel are
//! 1-based here, the way the operator reads the selector panel; bands may
//! also be addressed by name.

use bandstep::{Cell, Controller, LinkConfig, Settings, CHANNEL_COUNT};
use std::path::PathBuf;
use std::process::ExitCode;

const USAGE: &str = "\
bandstep - serial band/channel selector

Usage: bandstep [--settings <path>] <command>

Commands:
  ports                        list serial ports
  status                       show the table, active cell and port
  port <device>                select the selector's serial port
  connect                      open the link and re-home the channel label
  nav <band> <channel>         drive the selector to a cell
  pick <band> <channel>        relabel the active cell (no motion)
  edit <band> <channel> <mhz>  overwrite one frequency value

<band> is a 1-based column number or a band name (e.g. \"BAND A\").";

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let settings_path = match take_settings_flag(&mut args) {
        Ok(Some(path)) => path,
        Ok(None) => Settings::default_path(),
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::FAILURE;
        }
    };

    match run(&args, settings_path) {
        Ok(message) => {
            println!("{message}");
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

/// Pull `--settings <path>` (or `-s <path>`) out of the argument list.
fn take_settings_flag(args: &mut Vec<String>) -> Result<Option<PathBuf>, String> {
    for i in 0..args.len() {
        if args[i] == "--settings" || args[i] == "-s" {
            if i + 1 >= args.len() {
                return Err(format!("{} requires a path\n\n{USAGE}", args[i]));
            }
            args.remove(i);
            return Ok(Some(PathBuf::from(args.remove(i))));
        }
    }
    Ok(None)
}

fn run(args: &[String], settings_path: PathBuf) -> Result<String, String> {
    let Some(command) = args.first() else {
        return Err(USAGE.to_string());
    };

    match command.as_str() {
        "ports" => list_ports(),
        _ => {
            let mut controller = Controller::new(LinkConfig::default(), settings_path);
            match (command.as_str(), &args[1..]) {
                ("status", []) => Ok(render_status(&controller)),
                ("port", [device]) => {
                    controller
                        .set_port(Some(device.clone()))
                        .map_err(|e| e.to_string())?;
                    Ok(format!("Selector port set to {device}"))
                }
                ("connect", []) => {
                    controller.connect().map_err(|e| e.to_string())?;
                    Ok(format!("Connected; active cell is {}", controller.active_cell()))
                }
                ("nav", [band, channel]) => {
                    let cell = parse_cell(&controller, band, channel)?;
                    controller.navigate_to(cell).map_err(|e| e.to_string())?;
                    let mhz = controller.frequencies().frequency(cell);
                    Ok(format!("Selector on {cell} ({mhz} MHz)"))
                }
                ("pick", [band, channel]) => {
                    let cell = parse_cell(&controller, band, channel)?;
                    controller.pick_active(cell).map_err(|e| e.to_string())?;
                    Ok(format!("Active cell relabelled to {cell}"))
                }
                ("edit", [band, channel, mhz]) => {
                    let cell = parse_cell(&controller, band, channel)?;
                    let mhz: u16 = mhz
                        .parse()
                        .map_err(|_| format!("not a frequency in MHz: {mhz}"))?;
                    let band_name = controller
                        .frequencies()
                        .band(cell.col)
                        .map(|b| b.name.clone())
                        .unwrap_or_default();
                    controller
                        .edit_frequency(&band_name, cell.row, mhz)
                        .map_err(|e| e.to_string())?;
                    Ok(format!("{band_name} channel {} set to {mhz} MHz", cell.row + 1))
                }
                _ => Err(format!("unrecognized arguments\n\n{USAGE}")),
            }
        }
    }
}

fn list_ports() -> Result<String, String> {
    let ports = bandstep::ports::list().map_err(|e| e.to_string())?;
    if ports.is_empty() {
        return Ok("No serial ports found".to_string());
    }
    let mut out = String::new();
    for port in ports {
        out.push_str(&format!("{} - {}\n", port.device_id, port.description));
    }
    out.pop();
    Ok(out)
}

/// Resolve a band argument (1-based column number or band name) and a
/// 1-based channel number into a grid cell.
fn parse_cell(controller: &Controller, band: &str, channel: &str) -> Result<Cell, String> {
    let table = controller.frequencies();
    let col = match band.parse::<usize>() {
        Ok(number) if number >= 1 => number - 1,
        _ => table
            .band_index(band)
            .ok_or_else(|| format!("unknown band: {band}"))?,
    };
    let row = match channel.parse::<usize>() {
        Ok(number) if (1..=CHANNEL_COUNT).contains(&number) => number - 1,
        _ => return Err(format!("channel must be 1..{CHANNEL_COUNT}, got {channel}")),
    };
    Cell::new(row, col).map_err(|e| e.to_string())
}

fn render_status(controller: &Controller) -> String {
    let table = controller.frequencies();
    let active = controller.active_cell();

    let mut out = String::new();
    out.push_str("ch ");
    for band in table.bands() {
        out.push_str(&format!("{:>9}", band.name));
    }
    out.push('\n');
    for row in 0..CHANNEL_COUNT {
        out.push_str(&format!("{:>2} ", row + 1));
        for (col, band) in table.bands().iter().enumerate() {
            let marker = if active.row == row && active.col == col {
                '*'
            } else {
                ' '
            };
            out.push_str(&format!("{:>8}{}", band.channels[row], marker));
        }
        out.push('\n');
    }
    match controller.port() {
        Some(port) => out.push_str(&format!("port: {port}")),
        None => out.push_str("port: not configured (run `bandstep port <device>`)"),
    }
    out
}
