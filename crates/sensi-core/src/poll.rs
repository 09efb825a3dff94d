// ── Long-poll loop ──
//
// Owns the session, retry counter, and state engine for one subscribed
// thermostat. Runs on its own task until cancelled, until the retry
// budget is spent, or until a recovery step is rejected.
//
// Recovery patches only what broke: a 401/403 re-runs authorize, a 500
// re-runs subscribe, anything else just polls again. The message cursor
// and groups token survive every recovery path.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info, warn};

use sensi_api::models::HubMessage;

use crate::controller::{ConnectionState, Shared};
use crate::event::{StopReason, ThermostatEvent};
use crate::message::IncomingMessage;
use crate::session::{RetryState, Session};
use crate::state::StateEngine;

/// Recovery class of a failed poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollFailure {
    /// 401 / 403: re-authorize.
    AuthorizationRequired,
    /// 500: resubscribe.
    SubscriptionExpired,
    /// Anything else: poll again.
    Unknown,
}

impl From<&sensi_api::Error> for PollFailure {
    fn from(err: &sensi_api::Error) -> Self {
        match err {
            sensi_api::Error::AuthorizationRequired { .. } => Self::AuthorizationRequired,
            sensi_api::Error::SubscriptionExpired { .. } => Self::SubscriptionExpired,
            _ => Self::Unknown,
        }
    }
}

/// How the loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollExit {
    /// The session was disconnected.
    Cancelled,
    RetriesExhausted { attempts: u32 },
    RecoveryFailed { message: String },
}

impl PollExit {
    fn stop_reason(&self) -> Option<StopReason> {
        match self {
            Self::Cancelled => None,
            Self::RetriesExhausted { attempts } => Some(StopReason::RetriesExhausted {
                attempts: *attempts,
            }),
            Self::RecoveryFailed { message } => Some(StopReason::RecoveryFailed {
                message: message.clone(),
            }),
        }
    }
}

pub(crate) struct PollLoop {
    shared: Arc<Shared>,
    device_id: String,
    session: Session,
    retry: RetryState,
    engine: StateEngine,
}

impl PollLoop {
    pub(crate) fn new(shared: Arc<Shared>, device_id: String, session: Session) -> Self {
        let retry = RetryState::new(shared.config.retry_limit);
        Self {
            shared,
            device_id,
            session,
            retry,
            engine: StateEngine::new(),
        }
    }

    pub(crate) async fn run(mut self) -> PollExit {
        info!(device_id = %self.device_id, "polling started");

        let exit = loop {
            if !self.session.is_connected() {
                break PollExit::Cancelled;
            }

            let err = match self.poll_once().await {
                Ok(()) => {
                    self.retry.reset();
                    self.shared.set_state(ConnectionState::Subscribed);
                    continue;
                }
                Err(err) => err,
            };

            if !self.session.is_connected() {
                break PollExit::Cancelled;
            }

            let failure = PollFailure::from(&err);
            let attempt = self.retry.record_failure();
            warn!(
                attempt,
                limit = self.retry.limit(),
                ?failure,
                status = ?err.status(),
                error = %err,
                "poll failed"
            );

            if self.retry.is_exhausted() {
                break PollExit::RetriesExhausted { attempts: attempt };
            }

            self.shared.set_state(ConnectionState::Recovering { attempt });
            if let Err(e) = self.recover(failure).await {
                error!(?failure, error = %e, "recovery failed");
                break PollExit::RecoveryFailed {
                    message: e.to_string(),
                };
            }
        };

        self.finish(&exit);
        exit
    }

    async fn poll_once(&mut self) -> Result<(), sensi_api::Error> {
        let response = self
            .shared
            .api
            .poll(
                self.session.connection_token(),
                self.session.groups_token(),
                self.session.message_cursor(),
            )
            .await?;

        self.session
            .advance(response.message_id, response.groups_token);
        debug!(
            cursor = ?self.session.message_cursor(),
            messages = response.messages.len(),
            "poll ok"
        );

        for entry in response.messages {
            self.dispatch(entry);
        }
        Ok(())
    }

    fn dispatch(&mut self, entry: Value) {
        let Some(message) = HubMessage::from_entry(entry) else {
            debug!("skipping non-hub poll entry");
            return;
        };
        let timestamp = chrono::Utc::now().timestamp_millis();
        match IncomingMessage::from_hub(message, timestamp) {
            Ok(incoming) => {
                for event in self.engine.process(incoming) {
                    self.shared.events.emit(event);
                }
            }
            Err(unknown) => {
                warn!(hub = %unknown.hub, method = %unknown.method, "dropping message from unknown hub");
            }
        }
    }

    async fn recover(&self, failure: PollFailure) -> Result<(), sensi_api::Error> {
        match failure {
            PollFailure::AuthorizationRequired => {
                info!("session rejected, re-authorizing");
                self.shared
                    .api
                    .authorize(&self.shared.config.credentials)
                    .await?;
                info!("re-authorization successful, resuming polling");
            }
            PollFailure::SubscriptionExpired => {
                info!(device_id = %self.device_id, "subscription lapsed, resubscribing");
                self.shared
                    .api
                    .subscribe(self.session.connection_token(), &self.device_id)
                    .await?;
                info!("resubscription successful, resuming polling");
            }
            PollFailure::Unknown => {}
        }
        Ok(())
    }

    fn finish(&self, exit: &PollExit) {
        match exit.stop_reason() {
            None => debug!("polling cancelled"),
            Some(reason) => {
                error!(device_id = %self.device_id, %reason, "polling stopped");
                self.shared.set_state(ConnectionState::Failed);
                self.shared
                    .events
                    .emit(ThermostatEvent::PollingStopped(reason));
            }
        }
    }
}
