//! In-process broadcast channel.
//!
//! Several gateways in one process that share a broker behave like separate
//! processes sharing an external broker.

use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc};

use crate::domain::{BrokerError, BrokerMessage, BrokerReceiver, MessageBroker, topic_matches};

/// Default number of payloads buffered per subscriber before it lags
pub const DEFAULT_BROKER_CAPACITY: usize = 1024;

/// Broker backed by a tokio broadcast channel.
pub struct InMemoryBroker {
    sender: broadcast::Sender<BrokerMessage>,
}

impl InMemoryBroker {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BROKER_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }
}

impl Default for InMemoryBroker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageBroker for InMemoryBroker {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), BrokerError> {
        let message = BrokerMessage {
            topic: topic.to_string(),
            payload,
        };
        // Publishing with no subscribers is not an error, same as Redis PUBLISH.
        let receivers = self.sender.send(message).unwrap_or(0);
        tracing::trace!(topic = %topic, receivers, "Published to in-memory broker");
        Ok(())
    }

    async fn subscribe(&self, pattern: &str) -> Result<BrokerReceiver, BrokerError> {
        let mut source = self.sender.subscribe();
        let (tx, rx) = mpsc::unbounded_channel();
        let pattern = pattern.to_string();

        tokio::spawn(async move {
            loop {
                match source.recv().await {
                    Ok(message) => {
                        if !topic_matches(&pattern, &message.topic) {
                            continue;
                        }
                        if tx.send(message).is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(
                            pattern = %pattern,
                            skipped,
                            "In-memory broker subscriber lagged, payloads dropped"
                        );
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            tracing::debug!(pattern = %pattern, "In-memory broker subscription ended");
        });

        Ok(rx)
    }
}
