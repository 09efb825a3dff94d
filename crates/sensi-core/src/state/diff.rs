use crate::event::{ModeChange, SetpointChange, ThermostatEvent};
use crate::state::view::ThermostatView;

/// Change events between the pre-merge snapshot and an update payload.
///
/// A path produces an event only when both sides carry it and the values
/// differ. Order: running mode, cool setpoint, heat setpoint, system mode.
pub fn diff(old: &ThermostatView, update: &ThermostatView) -> Vec<ThermostatEvent> {
    let mut events = Vec::new();
    let is_temporary_hold = update.is_temporary_hold();

    if let Some(change) = mode_change(old.running_mode(), update.running_mode()) {
        events.push(ThermostatEvent::RunningModeChanged(change));
    }
    if let Some(change) =
        setpoint_change(old.cool_setpoint(), update.cool_setpoint(), is_temporary_hold)
    {
        events.push(ThermostatEvent::CoolSetpointChanged(change));
    }
    if let Some(change) =
        setpoint_change(old.heat_setpoint(), update.heat_setpoint(), is_temporary_hold)
    {
        events.push(ThermostatEvent::HeatSetpointChanged(change));
    }
    if let Some(change) = mode_change(old.system_mode(), update.system_mode()) {
        events.push(ThermostatEvent::SystemModeChanged(change));
    }

    events
}

fn mode_change(old: Option<&str>, new: Option<&str>) -> Option<ModeChange> {
    match (old, new) {
        (Some(old), Some(new)) if old != new => Some(ModeChange {
            old_mode: old.to_owned(),
            new_mode: new.to_owned(),
        }),
        _ => None,
    }
}

#[allow(clippy::float_cmp)]
fn setpoint_change(
    old: Option<f64>,
    new: Option<f64>,
    is_temporary_hold: bool,
) -> Option<SetpointChange> {
    match (old, new) {
        (Some(old), Some(new)) if old != new => Some(SetpointChange {
            old_setpoint: old,
            new_setpoint: new,
            is_temporary_hold,
        }),
        _ => None,
    }
}
