// Sensi HTTP client
//
// Wraps `reqwest::Client` with Sensi-specific URL construction, status
// checking, and error-body extraction. Endpoint groups (auth, thermostats,
// realtime) are implemented as inherent methods in separate files to keep
// this module focused on transport mechanics.

use std::sync::Arc;

use reqwest::StatusCode;
use reqwest::cookie::{CookieStore, Jar};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Default production endpoint.
pub const DEFAULT_BASE_URL: &str = "https://bus-serv.sensicomfort.com";

/// Sensi error bodies look like `{"Message": "..."}`.
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(rename = "Message")]
    message: Option<String>,
}

/// Raw HTTP client for the Sensi cloud service.
///
/// Every request goes through one `reqwest::Client` so the session cookie
/// set by `/api/authorize` rides along on the realtime endpoints.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    cookie_jar: Option<Arc<Jar>>,
}

impl ApiClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// If the config doesn't already include a cookie jar, one is created
    /// automatically -- the realtime hub rejects cookie-less sessions.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let config = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };
        let cookie_jar = config.cookie_jar.clone();
        let http = config.build_client()?;
        Ok(Self {
            http,
            base_url,
            cookie_jar,
        })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    ///
    /// The caller is responsible for cookie persistence and default headers.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            cookie_jar: None,
        }
    }

    /// The underlying HTTP client.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// The service base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Current `Cookie` header value for the base URL, if any cookies are held.
    pub fn cookie_header(&self) -> Option<String> {
        let jar = self.cookie_jar.as_ref()?;
        let cookies = jar.cookies(&self.base_url)?;
        cookies.to_str().ok().map(String::from)
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL for an absolute service path such as `/api/authorize`.
    ///
    /// Any path prefix on the base URL is preserved.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    // ── Response helpers ─────────────────────────────────────────────

    /// Decode a 200 response body as JSON.
    pub(crate) async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let body = resp.text().await.map_err(Error::Transport)?;
        serde_json::from_str(&body).map_err(|e| {
            let preview = &body[..floor_char_boundary(&body, 200)];
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })
    }

    /// Consume a failed response and produce a human-readable message.
    ///
    /// Prefers the server-supplied `Message` field; falls back to
    /// `"{fallback} ({status})"`.
    pub(crate) async fn failure_message(resp: reqwest::Response, fallback: &str) -> String {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        server_message(&body).unwrap_or_else(|| generic_message(fallback, status))
    }
}

/// Extract a non-empty `Message` from an error body.
fn server_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.is_empty())
}

fn generic_message(fallback: &str, status: StatusCode) -> String {
    format!("{fallback} ({})", status.as_u16())
}

/// Largest char boundary at or below `max` (stable stand-in for `str::floor_char_boundary`).
fn floor_char_boundary(s: &str, max: usize) -> usize {
    if max >= s.len() {
        return s.len();
    }
    (0..=max).rev().find(|&i| s.is_char_boundary(i)).unwrap_or(0)
}
