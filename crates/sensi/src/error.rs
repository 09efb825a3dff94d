//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use sensi_config::ConfigError;
use sensi_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the Sensi service at {url}")]
    #[diagnostic(
        code(sensi::connection_failed),
        help(
            "Check your network connection and the profile's base_url.\n\
             Behind an intercepting proxy? Try --insecure (-k) or set ca_cert."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Realtime session setup failed: {message}")]
    #[diagnostic(
        code(sensi::realtime_failed),
        help("The service refused the realtime connection. Retry in a moment; use -vv for request logs.")
    )]
    RealtimeFailed { message: String },

    #[error("Polling stopped: {reason}")]
    #[diagnostic(
        code(sensi::polling_stopped),
        help("Raise --retry-limit to tolerate longer outages.")
    )]
    PollingStopped { reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(sensi::timeout),
        help("Increase --timeout; it must outlast the server's long poll (about 110s).")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authorization failed: {message}")]
    #[diagnostic(
        code(sensi::auth_failed),
        help(
            "Verify the account username and password.\n\
             Store a password with: sensi config set-password --profile <name>"
        )
    )]
    AuthFailed { message: String },

    #[error("No {what} configured for profile '{profile}'")]
    #[diagnostic(
        code(sensi::no_credentials),
        help(
            "Set it in the profile, pass --username, export SENSI_PASSWORD,\n\
             or run: sensi config set-password --profile {profile}"
        )
    )]
    NoCredentials { profile: String, what: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(sensi::not_found),
        help("Run: sensi {list_command} to see what's available")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("API error: {message}")]
    #[diagnostic(code(sensi::api_error))]
    ApiError { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(sensi::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(sensi::profile_not_found),
        help("Available profiles: {available}")
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No account configured")]
    #[diagnostic(
        code(sensi::no_config),
        help(
            "Create a profile in {path}\n\
             or pass --username and export SENSI_PASSWORD."
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(sensi::config))]
    Config(ConfigError),

    #[error("Keyring error: {reason}")]
    #[diagnostic(
        code(sensi::keyring),
        help("No usable system keyring? Use password_env or SENSI_PASSWORD instead.")
    )]
    Keyring { reason: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML serialization failed: {0}")]
    Toml(#[from] toml::ser::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. }
            | Self::RealtimeFailed { .. }
            | Self::PollingStopped { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout => exit_code::TIMEOUT,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::AuthorizationFailed { message } => CliError::AuthFailed { message },

            CoreError::DeviceListFailed { message } => CliError::ApiError { message },

            CoreError::NegotiationFailed { message } | CoreError::ConnectionFailed { message } => {
                CliError::RealtimeFailed { message }
            }

            CoreError::SubscriptionFailed { device_id, message } => CliError::RealtimeFailed {
                message: format!("{device_id}: {message}"),
            },

            CoreError::Transport { url, reason } => CliError::ConnectionFailed { url, reason },

            CoreError::Timeout => CliError::Timeout,

            CoreError::Api { message, .. } | CoreError::Internal(message) => {
                CliError::ApiError { message }
            }

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            other @ (CoreError::NotConnected | CoreError::AlreadySubscribed { .. }) => {
                CliError::ApiError {
                    message: other.to_string(),
                }
            }
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoUsername { profile } => CliError::NoCredentials {
                profile,
                what: "username".into(),
            },
            ConfigError::NoPassword { profile } => CliError::NoCredentials {
                profile,
                what: "password".into(),
            },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::Keyring(reason) => CliError::Keyring { reason },
            ConfigError::ProfileNotFound { name } => CliError::ProfileNotFound {
                name,
                available: String::new(),
            },
            other => CliError::Config(other),
        }
    }
}
