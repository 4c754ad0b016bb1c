//! Message consumption: decode, dispatch, forward, count.

use super::handler::{NewRequestCommand, NotificationHandler};
use super::notification::Notification;
use crate::error::Result;
use crate::orchestrator::{InMemoryRequestStore, RequestStore};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Receives new-request commands.
pub trait RequestSink: Send + Sync {
    fn submit(&self, command: NewRequestCommand) -> Result<()>;
}

impl RequestSink for InMemoryRequestStore {
    fn submit(&self, command: NewRequestCommand) -> Result<()> {
        self.create(command.request.to_resource()?)?;
        Ok(())
    }
}

/// Acknowledgement decision for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Ack,
    /// Reject with a reason; the transport may redeliver
    Nack(String),
}

/// Point-in-time counter snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IntakeMetrics {
    pub received: u64,
    pub processed: u64,
}

/// Consumes raw messages and forwards resulting commands to a sink.
pub struct NotificationConsumer {
    handler: NotificationHandler,
    sink: Arc<dyn RequestSink>,
    received: AtomicU64,
    processed: AtomicU64,
}

impl NotificationConsumer {
    pub fn new(handler: NotificationHandler, sink: Arc<dyn RequestSink>) -> Self {
        Self {
            handler,
            sink,
            received: AtomicU64::new(0),
            processed: AtomicU64::new(0),
        }
    }

    /// Process one message with its transport `type` property.
    pub fn process(&self, message_type: Option<&str>, payload: &str) -> Delivery {
        self.received.fetch_add(1, Ordering::Relaxed);
        tracing::debug!("Received message of type {:?}", message_type);

        let notification = match Notification::decode(message_type, payload) {
            Ok(Some(notification)) => notification,
            Ok(None) => {
                tracing::warn!(
                    "Received a message of unsupported type {:?}, ignoring it",
                    message_type
                );
                return Delivery::Ack;
            }
            Err(e) => {
                tracing::error!("Unable to deserialize {:?} message: {}", message_type, e);
                return Delivery::Nack(e.to_string());
            }
        };

        if let Some(command) = self.handler.handle(&notification) {
            let name = command.request.name.clone();
            if let Err(e) = self.sink.submit(command) {
                tracing::error!("Unable to create request '{}': {}", name, e);
                return Delivery::Nack(e.to_string());
            }
            tracing::info!("Request created: {}", name);
        }

        self.processed.fetch_add(1, Ordering::Relaxed);
        Delivery::Ack
    }

    #[must_use]
    pub fn metrics(&self) -> IntakeMetrics {
        IntakeMetrics {
            received: self.received.load(Ordering::Relaxed),
            processed: self.processed.load(Ordering::Relaxed),
        }
    }
}
