//! Command handlers.

pub mod config_cmd;
pub mod thermostats;
pub mod watch;
