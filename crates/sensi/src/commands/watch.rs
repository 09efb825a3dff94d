//! `sensi watch`: stream one thermostat's events until Ctrl-C.

use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use sensi_core::{DeviceList, RealtimeClient, ThermostatEvent};

use crate::cli::{GlobalOpts, WatchArgs};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    client: &RealtimeClient,
    args: WatchArgs,
    default_thermostat: Option<String>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let devices = client.connect().await?;

    let target = args.thermostat.or(default_thermostat);
    let (device_id, label) = match pick_thermostat(&devices, target.as_deref()) {
        Ok(picked) => picked,
        Err(e) => {
            client.disconnect().await;
            return Err(e);
        }
    };

    let mut events = client.events();
    if let Err(e) = client.subscribe(&device_id).await {
        client.disconnect().await;
        return Err(e.into());
    }

    if !global.quiet {
        eprintln!("Watching {label} ({device_id}). Press Ctrl-C to stop.");
    }

    let color = output::should_color(&global.color);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let result = loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                debug!("interrupted");
                break Ok(());
            }
            received = events.recv() => match received {
                Ok(event) => {
                    match output::render_event(&global.output, &event, color) {
                        Ok(out) => output::print_output(&out, global.quiet),
                        Err(e) => break Err(e),
                    }
                    if let ThermostatEvent::PollingStopped(reason) = &*event {
                        break Err(CliError::PollingStopped { reason: reason.to_string() });
                    }
                }
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "output fell behind, events dropped"),
                Err(RecvError::Closed) => break Ok(()),
            }
        }
    };

    client.disconnect().await;
    result
}

/// Resolve the thermostat to watch: by ICD or display name, else the first listed.
fn pick_thermostat(devices: &DeviceList, key: Option<&str>) -> Result<(String, String), CliError> {
    let thermostat = match key {
        Some(key) => devices.find(key).ok_or_else(|| CliError::NotFound {
            resource_type: "thermostat".into(),
            identifier: key.into(),
            list_command: "thermostats".into(),
        })?,
        None => devices.first().ok_or_else(|| CliError::NotFound {
            resource_type: "thermostat".into(),
            identifier: "(any)".into(),
            list_command: "thermostats".into(),
        })?,
    };

    let label = thermostat
        .device_name
        .clone()
        .unwrap_or_else(|| "thermostat".into());
    Ok((thermostat.icd.clone(), label))
}
