// sensi-core: realtime session management and state tracking on top of sensi-api.
//
// `RealtimeClient` negotiates the session, subscribes to one thermostat,
// and runs the long-poll loop with targeted recovery. Each hub message is
// folded into a state snapshot and turned into `ThermostatEvent`s.

pub mod config;
pub mod controller;
pub mod device;
pub mod emitter;
pub mod error;
pub mod event;
pub mod message;
pub mod poll;
pub mod session;
pub mod state;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ClientConfig, DEFAULT_RETRY_LIMIT, DEFAULT_TIMEOUT, TlsVerification};
pub use controller::{ConnectionState, RealtimeClient};
pub use device::DeviceList;
pub use emitter::EventEmitter;
pub use error::CoreError;
pub use event::{DeviceMessage, ModeChange, SetpointChange, StopReason, ThermostatEvent};
pub use message::{IncomingMessage, Method};
pub use poll::{PollExit, PollFailure};
pub use session::{RetryState, Session};
pub use state::StateEngine;

pub use sensi_api::DEFAULT_BASE_URL;
pub use sensi_api::models::Thermostat;
