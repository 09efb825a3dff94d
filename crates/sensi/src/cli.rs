//! Clap derive structures for the `sensi` CLI.
//!
//! Defines the command tree, global flags, and shared value enums.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// sensi -- live view of Sensi thermostats from the command line
#[derive(Debug, Parser)]
#[command(
    name = "sensi",
    version,
    about = "List Sensi thermostats and watch their state change live",
    long_about = "Connects to the Sensi cloud service, lists the thermostats on your\n\
        account, and streams realtime events (online, update, setpoint and\n\
        mode changes) for one of them.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Account profile to use
    #[arg(long, short = 'p', env = "SENSI_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Service base URL (overrides profile)
    #[arg(long, env = "SENSI_URL", global = true)]
    pub url: Option<String>,

    /// Account username (overrides profile)
    #[arg(long, short = 'u', env = "SENSI_USERNAME", global = true)]
    pub username: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "SENSI_OUTPUT",
        default_value = "plain",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip TLS certificate verification
    #[arg(long, short = 'k', env = "SENSI_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (must outlast the long poll)
    #[arg(long, env = "SENSI_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Consecutive poll failures tolerated before giving up
    #[arg(long, env = "SENSI_RETRY_LIMIT", global = true)]
    pub retry_limit: Option<u32>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable lines (default)
    Plain,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON (one event per line)
    JsonCompact,
    /// YAML
    Yaml,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the thermostats on the account
    #[command(alias = "ls")]
    Thermostats,

    /// Stream realtime events for one thermostat until Ctrl-C
    Watch(WatchArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Thermostat ICD or display name (default: profile's thermostat, then the first listed)
    pub thermostat: Option<String>,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration (passwords redacted)
    Show,
    /// Print the config file path
    Path,
    /// Store the active profile's password in the system keyring
    SetPassword,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
