//! Notifications published on a [`crate::GraphDatabase`].

use std::fmt;
use tokio::sync::broadcast;

/// Wire name of [`DatabaseEvent::ServicesLoaded`]
pub const SERVICES_LOADED: &str = "services.loaded";

/// Wire name of [`DatabaseEvent::ServicesFailed`]
pub const SERVICES_FAILED: &str = "services.failed";

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DatabaseEvent {
    /// Service discovery finished and every known proxy got its descriptor
    ServicesLoaded,

    /// Service discovery could not fetch the definition from `url`
    ServicesFailed { url: String },
}

impl DatabaseEvent {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::ServicesLoaded => SERVICES_LOADED,
            Self::ServicesFailed { .. } => SERVICES_FAILED,
        }
    }
}

impl fmt::Display for DatabaseEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Typed wrapper over a tokio broadcast channel
///
/// Receivers that fall more than the channel capacity behind see
/// `RecvError::Lagged` and skip to the oldest retained event.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<DatabaseEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self { sender }
    }

    /// Deliver `event` to every current subscriber
    pub fn publish(&self, event: DatabaseEvent) {
        tracing::debug!(event = event.name(), "publishing database event");
        // No subscribers is fine
        _ = self.sender.send(event);
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DatabaseEvent> {
        self.sender.subscribe()
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
