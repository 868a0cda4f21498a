//! Cross-process broadcast channel.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{entity::EnrichedChatMessage, error::BrokerError, value_object::ProjectId};

/// A payload received from the broadcast channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerMessage {
    /// Concrete topic the payload was published to
    pub topic: String,
    pub payload: Vec<u8>,
}

/// Stream of payloads matching a subscription pattern
pub type BrokerReceiver = mpsc::UnboundedReceiver<BrokerMessage>;

/// Publish/subscribe broker shared by every gateway process.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageBroker: Send + Sync {
    /// Publish `payload` to `topic`.
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), BrokerError>;

    /// Receive every payload published to a topic matching `pattern`.
    ///
    /// Patterns are literal topics or a prefix followed by `*`.
    async fn subscribe(&self, pattern: &str) -> Result<BrokerReceiver, BrokerError>;
}

/// Encodes a chat message into the payload delivered to subscribers.
#[cfg_attr(test, mockall::automock)]
pub trait ChatPayloadEncoder: Send + Sync {
    fn encode(&self, message: &EnrichedChatMessage) -> Result<Vec<u8>, BrokerError>;
}

/// Topic naming for project chat streams: `<namespace>:<project_id>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTopic {
    namespace: String,
}

impl ChatTopic {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Topic carrying the chat stream of `project_id`
    pub fn topic(&self, project_id: &ProjectId) -> String {
        format!("{}:{}", self.namespace, project_id)
    }

    /// Pattern matching every project topic of this namespace
    pub fn pattern(&self) -> String {
        format!("{}:*", self.namespace)
    }

    /// Recover the project from a topic of this namespace
    pub fn project_of(&self, topic: &str) -> Option<ProjectId> {
        let rest = topic.strip_prefix(self.namespace.as_str())?;
        let project = rest.strip_prefix(':')?;
        ProjectId::new(project.to_string()).ok()
    }
}

/// Glob match supporting a single trailing `*`.
pub fn topic_matches(pattern: &str, topic: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => topic.starts_with(prefix),
        None => pattern == topic,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_topic_round_trip() {
        // テスト項目: プロジェクト ID からトピックを作り、トピックから同じ ID を取り出せる
        // given (前提条件):
        let topics = ChatTopic::new("project-chat");
        let project = ProjectId::new("p1".to_string()).unwrap();

        // when (操作):
        let topic = topics.topic(&project);

        // then (期待する結果):
        assert_eq!(topic, "project-chat:p1");
        assert_eq!(topics.project_of(&topic), Some(project));
    }

    #[test]
    fn test_chat_topic_rejects_foreign_namespace() {
        // テスト項目: 別の名前空間や空のプロジェクトのトピックは解釈しない
        let topics = ChatTopic::new("project-chat");
        assert_eq!(topics.project_of("other:p1"), None);
        assert_eq!(topics.project_of("project-chatx:p1"), None);
        assert_eq!(topics.project_of("project-chat:"), None);
    }

    #[test]
    fn test_topic_matches() {
        // テスト項目: 末尾 * のパターンは前方一致、それ以外は完全一致
        assert!(topic_matches("project-chat:*", "project-chat:p1"));
        assert!(!topic_matches("project-chat:*", "presence:p1"));
        assert!(topic_matches("project-chat:p1", "project-chat:p1"));
        assert!(!topic_matches("project-chat:p1", "project-chat:p2"));
    }

    #[test]
    fn test_pattern_matches_every_project_topic() {
        // テスト項目: 名前空間のパターンは全てのプロジェクトトピックに一致する
        let topics = ChatTopic::new("ns");
        let project = ProjectId::new("abc".to_string()).unwrap();
        assert!(topic_matches(&topics.pattern(), &topics.topic(&project)));
    }
}
