// ── Runtime connection configuration ──
//
// Describes where and as whom to connect, plus recovery tuning.
// The CLI builds a `ClientConfig` and hands it in; core never reads files.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use sensi_api::Credentials;
use url::Url;

/// Consecutive poll failures tolerated before the loop gives up.
pub const DEFAULT_RETRY_LIMIT: u32 = 5;

/// Per-request timeout; must outlast the server-held long poll.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification. Only for debugging proxies.
    DangerAcceptInvalid,
}

/// Configuration for one realtime client instance.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Service base URL (e.g. `https://bus-serv.sensicomfort.com`).
    pub url: Url,
    /// Account credentials, reused by re-authorization recovery.
    pub credentials: Credentials,
    pub tls: TlsVerification,
    pub timeout: Duration,
    /// Poll failures allowed in a row; the loop stops once the counter exceeds it.
    pub retry_limit: u32,
}

impl ClientConfig {
    /// Config with default TLS, timeout, and retry limit.
    pub fn new(url: Url, username: impl Into<String>, password: SecretString) -> Self {
        Self {
            url,
            credentials: Credentials::new(username, password),
            tls: TlsVerification::default(),
            timeout: DEFAULT_TIMEOUT,
            retry_limit: DEFAULT_RETRY_LIMIT,
        }
    }
}
