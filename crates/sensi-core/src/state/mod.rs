// ── State merge & diff engine ──
//
// Holds the running snapshot for one thermostat. Online and update
// payloads are deep-merged into it; update payloads are first compared
// against the pre-merge snapshot to derive typed change events.

mod diff;
mod merge;
mod view;

pub use diff::diff;
pub use merge::deep_merge;
pub use view::ThermostatView;

use serde_json::{Map, Value};
use tracing::debug;

use crate::event::{DeviceMessage, ThermostatEvent};
use crate::message::{IncomingMessage, Method};

/// Snapshot owner and event deriver. Starts from an empty object.
#[derive(Debug, Clone)]
pub struct StateEngine {
    snapshot: Value,
}

impl StateEngine {
    pub fn new() -> Self {
        Self {
            snapshot: Value::Object(Map::new()),
        }
    }

    /// The deep union of every online/update payload seen so far.
    pub fn snapshot(&self) -> &Value {
        &self.snapshot
    }

    /// Apply one thermostat message and return the events it produces, in
    /// emission order.
    pub fn process(&mut self, message: IncomingMessage) -> Vec<ThermostatEvent> {
        let stamped = message.stamped_payload();
        let device_message =
            DeviceMessage::new(message.device_id.clone(), message.timestamp, message.payload);

        match message.method {
            Method::Online => {
                deep_merge(&mut self.snapshot, Value::Object(stamped));
                vec![ThermostatEvent::Online(device_message)]
            }
            Method::Update => {
                let update = Value::Object(stamped);
                let mut events = diff(
                    &ThermostatView::from_value(&self.snapshot),
                    &ThermostatView::from_value(&update),
                );
                deep_merge(&mut self.snapshot, update);
                events.push(ThermostatEvent::Update(device_message));
                events
            }
            Method::Offline => vec![ThermostatEvent::Offline(device_message)],
            Method::Other(method) => {
                debug!(%method, device_id = %message.device_id, "ignoring unknown thermostat method");
                Vec::new()
            }
        }
    }
}

impl Default for StateEngine {
    fn default() -> Self {
        Self::new()
    }
}
