//! Config subcommand handlers.

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let cfg = config::redacted(&config::load_config_or_default());
            let out = output::render(&global.output, &cfg, |c| {
                toml::to_string_pretty(c).unwrap_or_else(|e| format!("# unrenderable: {e}"))
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::SetPassword => {
            let cfg = config::load_config_or_default();
            let profile_name = cfg.active_profile_name(global.profile.as_deref());

            let password =
                rpassword::prompt_password(format!("Password for profile '{profile_name}': "))?;
            if password.is_empty() {
                return Err(CliError::Validation {
                    field: "password".into(),
                    reason: "password cannot be empty".into(),
                });
            }

            sensi_config::store_password(&profile_name, &password)?;
            if !global.quiet {
                eprintln!("✓ Password for '{profile_name}' stored in the system keyring");
            }
            Ok(())
        }
    }
}
