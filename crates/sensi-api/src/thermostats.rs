// Thermostat listing
//
// `GET /api/thermostats` returns every device on the account. The `ICD`
// field of each entry is what the realtime hub subscribes to.

use reqwest::StatusCode;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::Thermostat;

impl ApiClient {
    /// List the account's thermostats.
    ///
    /// Requires a prior successful [`authorize`](Self::authorize); the
    /// session cookie is what identifies the account.
    pub async fn list_thermostats(&self) -> Result<Vec<Thermostat>, Error> {
        let url = self.endpoint("/api/thermostats")?;
        debug!("GET {}", url);

        let resp = self.http().get(url).send().await?;

        if resp.status() != StatusCode::OK {
            let message =
                Self::failure_message(resp, "Failed to retrieve thermostat listing").await;
            return Err(Error::DeviceList { message });
        }

        let thermostats: Vec<Thermostat> = Self::decode(resp).await?;
        debug!(count = thermostats.len(), "thermostats listed");
        Ok(thermostats)
    }
}
