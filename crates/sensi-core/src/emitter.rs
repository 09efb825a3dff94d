// Fan-out of thermostat events to any number of subscribers.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::trace;

use crate::event::ThermostatEvent;

const EVENT_CHANNEL_SIZE: usize = 256;

/// Broadcast publisher for [`ThermostatEvent`]s.
///
/// Slow receivers lag and skip events rather than block the poll loop.
#[derive(Debug, Clone)]
pub struct EventEmitter {
    tx: broadcast::Sender<Arc<ThermostatEvent>>,
}

impl EventEmitter {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_SIZE);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<ThermostatEvent>> {
        self.tx.subscribe()
    }

    /// Publish one event. Having no receivers is not an error.
    pub fn emit(&self, event: ThermostatEvent) {
        trace!(event = event.name(), "emit");
        let _ = self.tx.send(Arc::new(event));
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        Self::new()
    }
}
