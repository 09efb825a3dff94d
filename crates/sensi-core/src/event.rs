// ── Thermostat events ──
//
// Everything the realtime client publishes. Each variant has a stable
// camelCase wire name and serializes as `{"event": <name>, "data": ...}`.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};
use strum::IntoStaticStr;

/// An event published on [`RealtimeClient::events`](crate::RealtimeClient::events).
#[derive(Debug, Clone, PartialEq, Serialize, IntoStaticStr)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ThermostatEvent {
    /// Full state announced by the device; merged into the snapshot.
    Online(DeviceMessage),
    /// Partial state change; merged into the snapshot.
    Update(DeviceMessage),
    /// Device went offline. Not merged.
    Offline(DeviceMessage),
    RunningModeChanged(ModeChange),
    CoolSetpointChanged(SetpointChange),
    HeatSetpointChanged(SetpointChange),
    SystemModeChanged(ModeChange),
    /// The poll loop ended on its own and will not resume.
    PollingStopped(StopReason),
}

impl ThermostatEvent {
    /// Stable wire name, e.g. `"coolSetpointChanged"`.
    pub fn name(&self) -> &'static str {
        self.into()
    }

    /// The device message carried by `online`, `update`, and `offline`.
    pub fn device_message(&self) -> Option<&DeviceMessage> {
        match self {
            Self::Online(m) | Self::Update(m) | Self::Offline(m) => Some(m),
            _ => None,
        }
    }
}

/// Payload of `online` / `update` / `offline`: the hub payload plus
/// the device id and receipt timestamp.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceMessage {
    #[serde(rename = "ICD")]
    pub device_id: String,
    /// Milliseconds since the epoch.
    #[serde(rename = "Timestamp")]
    pub timestamp: i64,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl DeviceMessage {
    pub fn new(device_id: String, timestamp: i64, mut fields: Map<String, Value>) -> Self {
        fields.remove("ICD");
        fields.remove("Timestamp");
        Self {
            device_id,
            timestamp,
            fields,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeChange {
    pub old_mode: String,
    pub new_mode: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetpointChange {
    pub old_setpoint: f64,
    pub new_setpoint: f64,
    /// The update put the thermostat in a temporary (non-scheduled) hold.
    pub is_temporary_hold: bool,
}

/// Why the poll loop stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "camelCase")]
pub enum StopReason {
    /// More consecutive poll failures than the retry limit allows.
    #[serde(rename_all = "camelCase")]
    RetriesExhausted { attempts: u32 },
    /// Re-authorization or resubscription was rejected.
    #[serde(rename_all = "camelCase")]
    RecoveryFailed { message: String },
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RetriesExhausted { attempts } => {
                write!(f, "gave up after {attempts} consecutive poll failures")
            }
            Self::RecoveryFailed { message } => write!(f, "recovery failed: {message}"),
        }
    }
}
