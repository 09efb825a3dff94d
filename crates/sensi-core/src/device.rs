// The account's thermostats as returned by the negotiation step.

use serde::{Deserialize, Serialize};

use sensi_api::models::Thermostat;

/// Ordered list of the account's thermostats.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceList(Vec<Thermostat>);

impl DeviceList {
    pub fn new(thermostats: Vec<Thermostat>) -> Self {
        Self(thermostats)
    }

    /// Device identifiers (`ICD`), in listing order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|t| t.icd.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Thermostat> {
        self.0.iter()
    }

    pub fn first(&self) -> Option<&Thermostat> {
        self.0.first()
    }

    /// Look a thermostat up by identifier or, failing that, display name.
    pub fn find(&self, key: &str) -> Option<&Thermostat> {
        self.0
            .iter()
            .find(|t| t.icd == key)
            .or_else(|| self.0.iter().find(|t| t.device_name.as_deref() == Some(key)))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a DeviceList {
    type Item = &'a Thermostat;
    type IntoIter = std::slice::Iter<'a, Thermostat>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
