use thiserror::Error;

/// Top-level error type for the `sensi-api` crate.
///
/// Covers every failure mode of the REST and realtime surfaces:
/// the four negotiation steps, subscription, long-poll classification,
/// transport, and decoding. `sensi-core` maps these into user-facing errors
/// and into the poll loop's recovery classes.
#[derive(Debug, Error)]
pub enum Error {
    // ── Negotiation ─────────────────────────────────────────────────
    /// `POST /api/authorize` was rejected (bad credentials, locked account, ...).
    #[error("Authorization failed: {message}")]
    Authorization { message: String },

    /// `GET /api/thermostats` returned a non-200 status.
    #[error("Thermostat listing failed: {message}")]
    DeviceList { message: String },

    /// `GET /realtime/negotiate` returned a non-200 status.
    #[error("Realtime negotiation failed: {message}")]
    Negotiation { message: String },

    /// `GET /realtime/connect` returned a non-200 status.
    #[error("Realtime connection failed: {message}")]
    Connection { message: String },

    /// `POST /realtime/send` (Subscribe) returned a non-200 status.
    #[error("Subscription failed: {message}")]
    Subscription { device_id: String, message: String },

    // ── Long-poll classification ────────────────────────────────────
    /// Poll answered 401/403: the session cookie is no longer accepted.
    #[error("Authorization required: {message}")]
    AuthorizationRequired { status: u16, message: String },

    /// Poll answered 500: the hub subscription has lapsed server-side.
    #[error("Subscription expired: {message}")]
    SubscriptionExpired { message: String },

    /// Any other non-200 status from a realtime endpoint.
    #[error("Unexpected HTTP {status}: {message}")]
    UnexpectedStatus { status: u16, message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, ...)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS configuration or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if re-running authorization might resolve this error.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::AuthorizationRequired { .. })
    }

    /// The HTTP status behind this error, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::AuthorizationRequired { status, .. } | Self::UnexpectedStatus { status, .. } => {
                Some(*status)
            }
            Self::SubscriptionExpired { .. } => Some(500),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
