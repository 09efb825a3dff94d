//! Output formatting: plain, JSON, YAML.
//!
//! Structured formats go through serde. Plain output is a human-oriented
//! line per item, colored when stdout is a terminal.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde::Serialize;

use sensi_core::{DeviceList, ThermostatEvent};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render any serializable value; `plain_fn` handles the plain format.
pub fn render<T: Serialize + ?Sized>(
    format: &OutputFormat,
    data: &T,
    plain_fn: impl FnOnce(&T) -> String,
) -> Result<String, CliError> {
    Ok(match format {
        OutputFormat::Plain => plain_fn(data),
        OutputFormat::Json => serde_json::to_string_pretty(data)?,
        OutputFormat::JsonCompact => serde_json::to_string(data)?,
        OutputFormat::Yaml => serde_yaml::to_string(data)?,
    })
}

/// The thermostat listing.
pub fn render_thermostats(
    format: &OutputFormat,
    devices: &DeviceList,
    color: bool,
) -> Result<String, CliError> {
    render(format, devices, |list| {
        list.iter()
            .map(|t| {
                let name = t.device_name.as_deref().unwrap_or("-");
                if color {
                    format!("{}  {}", t.icd.cyan(), name.bold())
                } else {
                    format!("{}  {name}", t.icd)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    })
}

/// One streamed event. YAML events are separated as documents.
pub fn render_event(
    format: &OutputFormat,
    event: &ThermostatEvent,
    color: bool,
) -> Result<String, CliError> {
    match format {
        OutputFormat::Yaml => Ok(format!("---\n{}", serde_yaml::to_string(event)?.trim_end())),
        _ => render(format, event, |e| plain_event(e, color)),
    }
}

fn plain_event(event: &ThermostatEvent, color: bool) -> String {
    let time = chrono::Local::now().format("%H:%M:%S");
    let name = event.name();
    let name = if color {
        name.green().to_string()
    } else {
        name.to_owned()
    };
    format!("[{time}] {name} {}", event_summary(event))
}

/// Short human description of an event's payload.
pub fn event_summary(event: &ThermostatEvent) -> String {
    match event {
        ThermostatEvent::Online(m) | ThermostatEvent::Update(m) | ThermostatEvent::Offline(m) => {
            let mut keys: Vec<&str> = m.fields.keys().map(String::as_str).collect();
            keys.sort_unstable();
            if keys.is_empty() {
                m.device_id.clone()
            } else {
                format!("{} [{}]", m.device_id, keys.join(", "))
            }
        }
        ThermostatEvent::RunningModeChanged(c) | ThermostatEvent::SystemModeChanged(c) => {
            format!("{} -> {}", c.old_mode, c.new_mode)
        }
        ThermostatEvent::CoolSetpointChanged(c) | ThermostatEvent::HeatSetpointChanged(c) => {
            let hold = if c.is_temporary_hold {
                " (temporary hold)"
            } else {
                ""
            };
            format!("{}°F -> {}°F{hold}", c.old_setpoint, c.new_setpoint)
        }
        ThermostatEvent::PollingStopped(reason) => reason.to_string(),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
    let _ = stdout.flush();
}
