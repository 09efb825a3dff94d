// ── Realtime client ──
//
// Full lifecycle for one Sensi realtime connection: the four-step
// negotiation, a single thermostat subscription, the background poll
// loop, and the abort on disconnect. State changes are observable via a
// `watch` channel; thermostat events via a `broadcast` channel.

use std::sync::Arc;

use tokio::sync::{Mutex, broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use sensi_api::transport::{TlsMode, TransportConfig};
use sensi_api::ApiClient;

use crate::config::{ClientConfig, TlsVerification};
use crate::device::DeviceList;
use crate::error::CoreError;
use crate::event::ThermostatEvent;
use crate::emitter::EventEmitter;
use crate::poll::{PollExit, PollLoop};
use crate::session::Session;

// ── ConnectionState ──────────────────────────────────────────────

/// Connection state observable by consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    /// Negotiated; no subscription yet.
    Connected,
    /// Subscribed and polling normally.
    Subscribed,
    /// The last poll failed; `attempt` consecutive failures so far.
    Recovering { attempt: u32 },
    /// Negotiation failed or the poll loop gave up.
    Failed,
}

// ── Shared state ─────────────────────────────────────────────────

/// Everything the client and its poll task both need.
pub(crate) struct Shared {
    pub(crate) api: ApiClient,
    pub(crate) config: ClientConfig,
    pub(crate) events: EventEmitter,
    state: watch::Sender<ConnectionState>,
}

impl Shared {
    pub(crate) fn set_state(&self, state: ConnectionState) {
        self.state.send_replace(state);
    }
}

enum Phase {
    Idle,
    Connected(Session),
    Polling(ActivePoll),
}

struct ActivePoll {
    device_id: String,
    connection_token: String,
    connected: CancellationToken,
    task: JoinHandle<PollExit>,
}

// ── RealtimeClient ───────────────────────────────────────────────

/// Realtime client for one Sensi account and one subscribed thermostat.
///
/// Cheaply cloneable. Usage: [`connect`](Self::connect), then
/// [`subscribe`](Self::subscribe), then consume [`events`](Self::events)
/// until [`disconnect`](Self::disconnect).
#[derive(Clone)]
pub struct RealtimeClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    shared: Arc<Shared>,
    phase: Mutex<Phase>,
}

impl RealtimeClient {
    /// Build a client. Does not touch the network.
    pub fn new(config: ClientConfig) -> Result<Self, CoreError> {
        let api = ApiClient::new(config.url.clone(), &build_transport(&config))?;
        let (state, _) = watch::channel(ConnectionState::Disconnected);

        Ok(Self {
            inner: Arc::new(ClientInner {
                shared: Arc::new(Shared {
                    api,
                    config,
                    events: EventEmitter::new(),
                    state,
                }),
                phase: Mutex::new(Phase::Idle),
            }),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.shared.config
    }

    /// Subscribe to thermostat events.
    pub fn events(&self) -> broadcast::Receiver<Arc<ThermostatEvent>> {
        self.inner.shared.events.subscribe()
    }

    /// Observe connection state changes.
    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.shared.state.subscribe()
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Authorize, list thermostats, negotiate, and connect.
    ///
    /// Each step requires the previous one; the first failure aborts the
    /// sequence and leaves the client unconnected. An existing session is
    /// torn down first.
    pub async fn connect(&self) -> Result<DeviceList, CoreError> {
        self.disconnect().await;

        let shared = &self.inner.shared;
        shared.set_state(ConnectionState::Connecting);

        match negotiate(shared).await {
            Ok((session, devices)) => {
                *self.inner.phase.lock().await = Phase::Connected(session);
                shared.set_state(ConnectionState::Connected);
                info!(thermostats = devices.len(), "connected");
                Ok(devices)
            }
            Err(e) => {
                shared.set_state(ConnectionState::Failed);
                Err(e)
            }
        }
    }

    /// Subscribe to one thermostat and start polling for its events.
    ///
    /// Requires a prior [`connect`](Self::connect). Only one subscription
    /// per client.
    pub async fn subscribe(&self, device_id: &str) -> Result<(), CoreError> {
        let shared = &self.inner.shared;
        let mut phase = self.inner.phase.lock().await;

        let connection_token = match &*phase {
            Phase::Idle => return Err(CoreError::NotConnected),
            Phase::Polling(active) => {
                return Err(CoreError::AlreadySubscribed {
                    device_id: active.device_id.clone(),
                });
            }
            Phase::Connected(session) => session.connection_token().to_owned(),
        };

        debug!(device_id, "subscribing");
        shared.api.subscribe(&connection_token, device_id).await?;

        let Phase::Connected(session) = std::mem::replace(&mut *phase, Phase::Idle) else {
            return Err(CoreError::Internal("session vanished during subscribe".into()));
        };

        let connected = session.connected();
        shared.set_state(ConnectionState::Subscribed);
        let poll = PollLoop::new(Arc::clone(shared), device_id.to_owned(), session);
        let task = tokio::spawn(poll.run());

        *phase = Phase::Polling(ActivePoll {
            device_id: device_id.to_owned(),
            connection_token,
            connected,
            task,
        });
        info!(device_id, "subscribed");
        Ok(())
    }

    /// Stop polling and release the server-side connection.
    ///
    /// Abort failures are logged, never returned. No-op when not connected.
    pub async fn disconnect(&self) {
        let mut phase = self.inner.phase.lock().await;

        match std::mem::replace(&mut *phase, Phase::Idle) {
            Phase::Idle => return,
            Phase::Connected(session) => {
                session.disconnect();
                self.abort(session.connection_token()).await;
            }
            Phase::Polling(active) => {
                active.connected.cancel();
                self.abort(&active.connection_token).await;
                match active.task.await {
                    Ok(exit) => debug!(?exit, "poll task finished"),
                    Err(e) => warn!(error = %e, "poll task ended abnormally"),
                }
            }
        }

        self.inner
            .shared
            .set_state(ConnectionState::Disconnected);
        info!("disconnected");
    }

    async fn abort(&self, connection_token: &str) {
        if let Err(e) = self.inner.shared.api.abort(connection_token).await {
            warn!(error = %e, "abort failed (non-fatal)");
        }
    }
}

/// The four negotiation steps, in order.
async fn negotiate(shared: &Shared) -> Result<(Session, DeviceList), CoreError> {
    let api = &shared.api;

    debug!("authorizing");
    api.authorize(&shared.config.credentials).await?;

    debug!("retrieving thermostat listing");
    let devices = DeviceList::new(api.list_thermostats().await?);

    debug!("negotiating");
    let connection_token = api.negotiate().await?;

    debug!("connecting");
    let cursor = api.connect(&connection_token).await?;

    Ok((Session::new(connection_token, cursor), devices))
}

fn build_transport(config: &ClientConfig) -> TransportConfig {
    TransportConfig {
        tls: tls_to_transport(&config.tls),
        timeout: config.timeout,
        cookie_jar: None, // ApiClient::new adds one automatically
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}
