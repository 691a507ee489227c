//! Operator notifications and re-fetch signals.
//!
//! Publishing never blocks the issuing flow: the console (or a test) subscribes and
//! renders notices, list views subscribe and refresh.

use tokio::sync::broadcast;

use crate::models::ResourceKind;

const CHANNEL_CAPACITY: usize = 64;

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Error,
}

/// Event published by the client, forms and delete flows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminEvent {
    /// Something the operator should see.
    Notice { level: Level, message: String },
    /// A mutation of this kind succeeded; lists of it are stale.
    Refetch(ResourceKind),
}

/// Broadcast channel shared by everything that reports to the operator.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<AdminEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AdminEvent> {
        self.tx.subscribe()
    }

    pub fn publish(&self, event: AdminEvent) {
        // No subscribers is fine
        let _ = self.tx.send(event);
    }

    pub fn info(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!("{}", message);
        self.publish(AdminEvent::Notice {
            level: Level::Info,
            message,
        });
    }

    pub fn error(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::error!("{}", message);
        self.publish(AdminEvent::Notice {
            level: Level::Error,
            message,
        });
    }

    pub fn refetch(&self, kind: ResourceKind) {
        tracing::debug!("Requesting re-fetch of {} list", kind);
        self.publish(AdminEvent::Refetch(kind));
    }
}

/// Drain every event already queued on `rx` without waiting.
pub fn drain(rx: &mut broadcast::Receiver<AdminEvent>) -> Vec<AdminEvent> {
    let mut events = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(event) => events.push(event),
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                tracing::warn!("Dropped {} notifications", skipped);
            }
            Err(_) => break,
        }
    }
    events
}
