//! CLI configuration: thin wrapper around `sensi_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--url, --username, --insecure, --timeout, --retry-limit).

use std::time::Duration;

use sensi_core::{ClientConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use sensi_config::{Config, Profile, config_path, load_config, load_config_or_default};

/// A fully resolved connection target.
#[derive(Debug)]
pub struct Resolved {
    pub profile_name: String,
    pub client: ClientConfig,
    /// Default thermostat for `watch`, from the profile.
    pub thermostat: Option<String>,
}

/// Redacted copy of a config, safe to print.
pub fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    for profile in cfg.profiles.values_mut() {
        if profile.password.is_some() {
            profile.password = Some("********".into());
        }
    }
    cfg
}

/// Build the `ClientConfig` from the config file, active profile, and flags.
///
/// Flags win over the profile, the profile wins over `[defaults]`. Without
/// a matching profile, `--username` alone is enough to proceed.
pub fn resolve(global: &GlobalOpts, cfg: &Config) -> Result<Resolved, CliError> {
    let profile_name = cfg.active_profile_name(global.profile.as_deref());

    let mut profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        None if global.profile.is_some() => {
            let mut available: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
            available.sort_unstable();
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            });
        }
        None if global.username.is_some() => Profile::default(),
        None => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
    };

    // Flag overrides
    if let Some(ref url) = global.url {
        profile.base_url = Some(url.clone());
    }
    if let Some(ref username) = global.username {
        profile.username = Some(username.clone());
    }

    let url = sensi_config::profile_url(&profile)?;
    let username = sensi_config::resolve_username(&profile, &profile_name)?;
    let password = sensi_config::resolve_password(&profile, &profile_name)?;

    let mut client = ClientConfig::new(url, username, password);
    client.tls = if global.insecure {
        TlsVerification::DangerAcceptInvalid
    } else {
        sensi_config::profile_tls(&profile)
    };
    client.timeout = Duration::from_secs(
        global
            .timeout
            .or(profile.timeout)
            .unwrap_or(cfg.defaults.timeout),
    );
    client.retry_limit = global
        .retry_limit
        .or(profile.retry_limit)
        .unwrap_or(cfg.defaults.retry_limit);

    Ok(Resolved {
        profile_name,
        client,
        thermostat: profile.thermostat,
    })
}
