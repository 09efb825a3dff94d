// Parsing of raw hub messages into typed thermostat messages.

use serde_json::{Map, Value};
use strum::{Display, EnumString};

use sensi_api::models::{HUB_NAME, HubMessage};

/// Thermostat hub method.
#[derive(Debug, Clone, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Method {
    Online,
    Update,
    Offline,
    #[strum(default)]
    Other(String),
}

/// A message from the thermostat hub: `{H, M, A: [deviceId, payload]}`.
#[derive(Debug, Clone, PartialEq)]
pub struct IncomingMessage {
    pub method: Method,
    pub device_id: String,
    pub payload: Map<String, Value>,
    /// Receipt time, milliseconds since the epoch.
    pub timestamp: i64,
}

/// A hub message that doesn't belong to the thermostat hub.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("message from unknown hub {hub:?}")]
pub struct UnknownHub {
    pub hub: String,
    pub method: String,
}

impl IncomingMessage {
    /// Parse a raw hub message received at `timestamp`.
    ///
    /// A missing device id becomes `""`; a missing or non-object payload
    /// becomes `{}`.
    pub fn from_hub(message: HubMessage, timestamp: i64) -> Result<Self, UnknownHub> {
        if message.hub != HUB_NAME {
            return Err(UnknownHub {
                hub: message.hub,
                method: message.method,
            });
        }

        let mut args = message.args.into_iter();
        let device_id = match args.next() {
            Some(Value::String(id)) => id,
            _ => String::new(),
        };
        let payload = match args.next() {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        };
        let method = message
            .method
            .parse()
            .unwrap_or_else(|_| Method::Other(message.method.clone()));

        Ok(Self {
            method,
            device_id,
            payload,
            timestamp,
        })
    }

    /// Payload plus `ICD` and `Timestamp`: the object that is merged and emitted.
    pub fn stamped_payload(&self) -> Map<String, Value> {
        let mut fields = self.payload.clone();
        fields.insert("ICD".into(), Value::String(self.device_id.clone()));
        fields.insert("Timestamp".into(), Value::from(self.timestamp));
        fields
    }
}
