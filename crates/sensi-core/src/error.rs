// ── Core error types ──
//
// User-facing errors from sensi-core. Consumers never see raw HTTP
// details; the `From<sensi_api::Error>` impl translates transport-layer
// errors into the negotiation-step taxonomy.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Negotiation ──────────────────────────────────────────────────
    #[error("Authorization failed: {message}")]
    AuthorizationFailed { message: String },

    #[error("Could not list thermostats: {message}")]
    DeviceListFailed { message: String },

    #[error("Realtime negotiation failed: {message}")]
    NegotiationFailed { message: String },

    #[error("Realtime connection failed: {message}")]
    ConnectionFailed { message: String },

    #[error("Subscription to {device_id} failed: {message}")]
    SubscriptionFailed { device_id: String, message: String },

    // ── Lifecycle ────────────────────────────────────────────────────
    #[error("Not connected -- call connect() first")]
    NotConnected,

    #[error("Already subscribed to {device_id}")]
    AlreadySubscribed { device_id: String },

    // ── Transport ────────────────────────────────────────────────────
    #[error("Cannot reach {url}: {reason}")]
    Transport { url: String, reason: String },

    #[error("Request timed out")]
    Timeout,

    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal ─────────────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sensi_api::Error> for CoreError {
    fn from(err: sensi_api::Error) -> Self {
        use sensi_api::Error as Api;

        match err {
            Api::Authorization { message } | Api::AuthorizationRequired { message, .. } => {
                CoreError::AuthorizationFailed { message }
            }
            Api::DeviceList { message } => CoreError::DeviceListFailed { message },
            Api::Negotiation { message } => CoreError::NegotiationFailed { message },
            Api::Connection { message } => CoreError::ConnectionFailed { message },
            Api::Subscription { device_id, message } => {
                CoreError::SubscriptionFailed { device_id, message }
            }
            Api::SubscriptionExpired { message } => CoreError::Api {
                message,
                status: Some(500),
            },
            Api::UnexpectedStatus { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            Api::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::Transport {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            Api::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            Api::Tls(reason) => CoreError::Transport {
                url: String::new(),
                reason: format!("TLS error: {reason}"),
            },
            Api::Deserialization { message, .. } => CoreError::Api {
                message: format!("Unexpected response: {message}"),
                status: None,
            },
        }
    }
}

impl CoreError {
    /// Whether this error means the credentials were rejected.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::AuthorizationFailed { .. })
    }
}
