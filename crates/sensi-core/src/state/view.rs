// Typed read-only view over the handful of snapshot paths that drive
// change events. Every level is optional, and each path stands alone: a
// level or leaf of an unexpected JSON type reads as absent for that path
// only, never for its siblings.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ThermostatView {
    #[serde(default, deserialize_with = "lenient_object")]
    pub operational_status: Option<OperationalStatus>,
    #[serde(default, deserialize_with = "lenient_object")]
    pub environment_controls: Option<EnvironmentControls>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OperationalStatus {
    #[serde(default, deserialize_with = "lenient_object")]
    pub running: Option<Running>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Running {
    #[serde(default, deserialize_with = "lenient_string")]
    pub mode: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EnvironmentControls {
    #[serde(default, deserialize_with = "lenient_object")]
    pub cool_setpoint: Option<Setpoint>,
    #[serde(default, deserialize_with = "lenient_object")]
    pub heat_setpoint: Option<Setpoint>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub system_mode: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub hold_mode: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Setpoint {
    #[serde(rename = "F", default, deserialize_with = "lenient_f64")]
    pub fahrenheit: Option<f64>,
}

impl ThermostatView {
    /// Read the view out of a snapshot or payload.
    pub fn from_value(value: &Value) -> Self {
        Self::deserialize(value).unwrap_or_else(|e| {
            debug!(error = %e, "state has unexpected shape, treating as empty");
            Self::default()
        })
    }

    pub fn running_mode(&self) -> Option<&str> {
        self.operational_status.as_ref()?.running.as_ref()?.mode.as_deref()
    }

    pub fn cool_setpoint(&self) -> Option<f64> {
        self.environment_controls.as_ref()?.cool_setpoint.as_ref()?.fahrenheit
    }

    pub fn heat_setpoint(&self) -> Option<f64> {
        self.environment_controls.as_ref()?.heat_setpoint.as_ref()?.fahrenheit
    }

    pub fn system_mode(&self) -> Option<&str> {
        self.environment_controls.as_ref()?.system_mode.as_deref()
    }

    pub fn is_temporary_hold(&self) -> bool {
        self.environment_controls
            .as_ref()
            .and_then(|c| c.hold_mode.as_deref())
            == Some("Temporary")
    }
}

fn lenient_object<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(de)? {
        object @ Value::Object(_) => serde_json::from_value(object).ok(),
        _ => None,
    })
}

fn lenient_string<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(de)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

fn lenient_f64<'de, D: Deserializer<'de>>(de: D) -> Result<Option<f64>, D::Error> {
    Ok(Value::deserialize(de)?.as_f64())
}
