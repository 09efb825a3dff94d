// Account authorization
//
// Cookie-based session login. `/api/authorize` sets the session cookie in
// the client's jar; every later REST and realtime request rides on it.

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;

/// Account credentials for the Sensi cloud service.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: SecretString) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }
}

impl ApiClient {
    /// Authenticate with username/password.
    ///
    /// `POST /api/authorize` with `{"UserName", "Password"}`. On success the
    /// session cookie is stored in the client's jar. A non-200 answer yields
    /// [`Error::Authorization`] carrying the server's `Message` when present.
    pub async fn authorize(&self, credentials: &Credentials) -> Result<(), Error> {
        let url = self.endpoint("/api/authorize")?;

        debug!(username = %credentials.username, "authorizing at {}", url);

        let body = json!({
            "UserName": credentials.username,
            "Password": credentials.password.expose_secret(),
        });

        let resp = self
            .http()
            .post(url)
            .header("X-Requested-With", "XMLHttpRequest")
            .json(&body)
            .send()
            .await
            .map_err(Error::Transport)?;

        if resp.status() != StatusCode::OK {
            let message = Self::failure_message(resp, "Authorization failure").await;
            return Err(Error::Authorization { message });
        }

        debug!("authorization successful");
        Ok(())
    }
}
