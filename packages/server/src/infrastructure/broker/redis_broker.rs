//! Redis `PUBLISH` / `PSUBSCRIBE` broadcast channel for multi-process deployments.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use redis::{
    AsyncCommands, Client,
    aio::{ConnectionManager, ConnectionManagerConfig, PubSub},
};
use tokio::sync::mpsc;

use crate::domain::{BrokerError, BrokerMessage, BrokerReceiver, MessageBroker};

const PUBLISH_RETRIES: usize = 3;
const RESUBSCRIBE_INITIAL_DELAY: Duration = Duration::from_millis(100);
const RESUBSCRIBE_MAX_DELAY: Duration = Duration::from_secs(10);

/// Doubling delay between resubscribe attempts, capped at a maximum.
#[derive(Debug, Clone)]
pub struct ReconnectBackoff {
    initial: Duration,
    max: Duration,
    current: Duration,
}

impl ReconnectBackoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max,
            current: initial,
        }
    }

    /// Delay before the next attempt.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(self.max);
        delay
    }

    /// Start over after a successful attempt.
    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}

impl Default for ReconnectBackoff {
    fn default() -> Self {
        Self::new(RESUBSCRIBE_INITIAL_DELAY, RESUBSCRIBE_MAX_DELAY)
    }
}

/// Broker backed by Redis pub/sub.
///
/// Publishing goes through a `ConnectionManager`, which reconnects on its
/// own. Every subscription owns a dedicated pub/sub connection that is
/// reopened with backoff whenever its stream ends.
pub struct RedisBroker {
    client: Client,
    publisher: ConnectionManager,
}

impl RedisBroker {
    /// Connect to `url` (e.g. `redis://127.0.0.1:6379`).
    pub async fn connect(url: &str) -> Result<Self, BrokerError> {
        let client = Client::open(url).map_err(|e| BrokerError::Connection(e.to_string()))?;
        let config = ConnectionManagerConfig::new().set_number_of_retries(PUBLISH_RETRIES);
        let publisher = client
            .get_connection_manager_with_config(config)
            .await
            .map_err(|e| BrokerError::Connection(e.to_string()))?;
        tracing::info!(url = %url, "Connected to Redis broker");
        Ok(Self { client, publisher })
    }
}

async fn open_pubsub(client: &Client, pattern: &str) -> Result<PubSub, redis::RedisError> {
    let mut pubsub = client.get_async_pubsub().await?;
    pubsub.psubscribe(pattern).await?;
    Ok(pubsub)
}

/// Forward pub/sub messages to `tx` until the receiver is dropped,
/// resubscribing whenever the Redis stream ends.
async fn forward_with_resubscribe(
    client: Client,
    pattern: String,
    mut pubsub: PubSub,
    tx: mpsc::UnboundedSender<BrokerMessage>,
) {
    let mut backoff = ReconnectBackoff::default();

    loop {
        let mut stream = pubsub.into_on_message();
        while let Some(msg) = stream.next().await {
            let message = BrokerMessage {
                topic: msg.get_channel_name().to_string(),
                payload: msg.get_payload_bytes().to_vec(),
            };
            if tx.send(message).is_err() {
                return;
            }
        }
        drop(stream);
        tracing::warn!(pattern = %pattern, "Redis subscription stream ended, resubscribing");

        pubsub = loop {
            if tx.is_closed() {
                return;
            }
            tokio::time::sleep(backoff.next_delay()).await;
            match open_pubsub(&client, &pattern).await {
                Ok(pubsub) => {
                    backoff.reset();
                    tracing::info!(pattern = %pattern, "Resubscribed to Redis");
                    break pubsub;
                }
                Err(e) => {
                    tracing::warn!(pattern = %pattern, error = %e, "Redis resubscribe failed");
                }
            }
        };
    }
}

#[async_trait]
impl MessageBroker for RedisBroker {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), BrokerError> {
        let mut conn = self.publisher.clone();
        let receivers: i64 = conn
            .publish(topic, payload)
            .await
            .map_err(|e| BrokerError::Publish {
                topic: topic.to_string(),
                reason: e.to_string(),
            })?;
        tracing::trace!(topic = %topic, receivers, "Published to Redis");
        Ok(())
    }

    async fn subscribe(&self, pattern: &str) -> Result<BrokerReceiver, BrokerError> {
        let pubsub = open_pubsub(&self.client, pattern)
            .await
            .map_err(|e| BrokerError::Subscribe {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })?;

        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(forward_with_resubscribe(
            self.client.clone(),
            pattern.to_string(),
            pubsub,
            tx,
        ));

        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_up_to_max() {
        // テスト項目: 再購読の待ち時間は倍々に増え、上限で止まる
        // given (前提条件):
        let mut backoff =
            ReconnectBackoff::new(Duration::from_millis(100), Duration::from_millis(500));

        // when (操作):
        let delays: Vec<Duration> = (0..5).map(|_| backoff.next_delay()).collect();

        // then (期待する結果):
        assert_eq!(
            delays,
            vec![
                Duration::from_millis(100),
                Duration::from_millis(200),
                Duration::from_millis(400),
                Duration::from_millis(500),
                Duration::from_millis(500),
            ]
        );
    }

    #[test]
    fn test_backoff_reset_after_success() {
        // テスト項目: 再購読に成功すると待ち時間は初期値に戻る
        // given (前提条件):
        let mut backoff = ReconnectBackoff::default();
        backoff.next_delay();
        backoff.next_delay();

        // when (操作):
        backoff.reset();

        // then (期待する結果):
        assert_eq!(backoff.next_delay(), RESUBSCRIBE_INITIAL_DELAY);
    }

    #[tokio::test]
    async fn test_connect_rejects_malformed_url() {
        // テスト項目: 不正な URL では接続エラーを返す
        // when (操作):
        let result = RedisBroker::connect("not a redis url").await;

        // then (期待する結果):
        assert!(matches!(result, Err(BrokerError::Connection(_))));
    }
}
