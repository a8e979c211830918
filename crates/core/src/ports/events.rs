//! Channel-backed event publisher.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{EventPublisher, StoreError};
use crate::workflow::DomainEvent;

/// Forwards domain events to an unbounded `mpsc` channel.
///
/// The receiving half belongs to whatever dispatcher fans events out to
/// listeners.
#[derive(Debug, Clone)]
pub struct ChannelPublisher {
    sender: mpsc::UnboundedSender<DomainEvent>,
}

impl ChannelPublisher {
    /// Creates a publisher and the receiver its events arrive on.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<DomainEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl EventPublisher for ChannelPublisher {
    async fn publish(&self, event: DomainEvent) -> Result<(), StoreError> {
        self.sender
            .send(event)
            .map_err(|_| StoreError::Unavailable("event channel closed".to_string()))
    }
}
