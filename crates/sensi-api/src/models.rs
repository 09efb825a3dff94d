// Wire types for the Sensi REST and realtime (SignalR long-polling) endpoints.
//
// Field names follow the service's PascalCase / single-letter keys via
// `#[serde(rename)]`; everything not modelled is kept in `extra` maps so
// nothing the service sends is silently dropped.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The one realtime hub this client talks to.
pub const HUB_NAME: &str = "thermostat-v1";

/// SignalR transport name used on every realtime request.
pub const TRANSPORT: &str = "longPolling";

/// `connectionData` query value: the hub list, JSON-encoded.
pub const CONNECTION_DATA: &str = r#"[{"name": "thermostat-v1"}]"#;

// ── REST ─────────────────────────────────────────────────────────────

/// One entry of `GET /api/thermostats`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thermostat {
    /// Device identifier used to subscribe (`ICD`).
    #[serde(rename = "ICD")]
    pub icd: String,

    /// User-assigned display name.
    #[serde(rename = "DeviceName", default, skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,

    /// All remaining fields the service sends.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Realtime handshake ───────────────────────────────────────────────

/// `GET /realtime/negotiate` response.
#[derive(Debug, Clone, Deserialize)]
pub struct NegotiateResponse {
    #[serde(rename = "ConnectionToken")]
    pub connection_token: String,

    #[serde(rename = "ConnectionId", default)]
    pub connection_id: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `GET /realtime/connect` response. Only the initial cursor matters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConnectResponse {
    #[serde(rename = "C", default)]
    pub message_id: Option<String>,
}

// ── Realtime messaging ───────────────────────────────────────────────

/// `GET /realtime/poll` response: `{C, G, M:[...]}`, every key optional.
///
/// An empty object is a legitimate keep-alive answer. `M` entries stay raw:
/// the transport also carries non-hub entries (e.g. `{"I":"0"}`), and one
/// of those must not cost the cursor of the whole batch.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PollResponse {
    /// Next message cursor.
    #[serde(rename = "C", default)]
    pub message_id: Option<String>,

    /// Current groups token.
    #[serde(rename = "G", default)]
    pub groups_token: Option<String>,

    /// Raw message entries, in delivery order. See [`HubMessage::from_entry`].
    #[serde(rename = "M", default)]
    pub messages: Vec<Value>,
}

/// A hub method invocation pushed by the server: `{H, M, A}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HubMessage {
    /// Hub name, e.g. `"thermostat-v1"`.
    #[serde(rename = "H")]
    pub hub: String,

    /// Method name: `"online"`, `"update"`, `"offline"`.
    #[serde(rename = "M")]
    pub method: String,

    /// Arguments. For thermostat messages: `[deviceId, payload]`.
    #[serde(rename = "A", default)]
    pub args: Vec<Value>,
}

impl HubMessage {
    /// Read one `M` entry as a hub message. `None` for anything else.
    pub fn from_entry(entry: Value) -> Option<Self> {
        serde_json::from_value(entry).ok()
    }
}

/// A client → hub invocation sent through `/realtime/send`.
#[derive(Debug, Clone, Serialize)]
pub struct HubInvocation<'a> {
    #[serde(rename = "H")]
    pub hub: &'a str,
    #[serde(rename = "M")]
    pub method: &'a str,
    #[serde(rename = "A")]
    pub args: Vec<&'a str>,
    #[serde(rename = "I")]
    pub invocation_id: u32,
}

impl<'a> HubInvocation<'a> {
    /// The `Subscribe` call for a single thermostat.
    pub fn subscribe(device_id: &'a str) -> Self {
        Self {
            hub: HUB_NAME,
            method: "Subscribe",
            args: vec![device_id],
            invocation_id: 0,
        }
    }
}
