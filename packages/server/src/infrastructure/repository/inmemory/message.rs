//! InMemory Message Repository 実装
//!
//! ドメイン層が定義する MessageRepository trait の具体的な実装。
//! Vec をインメモリ DB として使用し、送信者の表示情報は IdentityDirectory から結合します。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    ChatMessage, EnrichedChatMessage, Identity, IdentityDirectory, MessageRepository, ProjectId,
    RepositoryError, SenderDisplay, Timestamp,
};

#[derive(Default)]
struct Store {
    messages: Vec<ChatMessage>,
    /// 最後に保存したタイムスタンプ（プロジェクトごと）
    last_timestamp: HashMap<ProjectId, Timestamp>,
}

/// インメモリ Message Repository 実装
pub struct InMemoryMessageRepository {
    store: Mutex<Store>,
    directory: Arc<dyn IdentityDirectory>,
}

impl InMemoryMessageRepository {
    /// 新しい InMemoryMessageRepository を作成
    pub fn new(directory: Arc<dyn IdentityDirectory>) -> Self {
        Self {
            store: Mutex::new(Store::default()),
            directory,
        }
    }

    /// 保存済みメッセージの総数
    pub async fn count(&self) -> usize {
        self.store.lock().await.messages.len()
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn create_message(
        &self,
        mut message: ChatMessage,
    ) -> Result<ChatMessage, RepositoryError> {
        let mut store = self.store.lock().await;

        let last = store
            .last_timestamp
            .entry(message.project_id.clone())
            .or_insert(message.timestamp);
        message.timestamp = message.timestamp.max(*last);
        *last = message.timestamp;

        store.messages.push(message.clone());
        Ok(message)
    }

    async fn populate_sender_display(
        &self,
        message: &ChatMessage,
    ) -> Result<EnrichedChatMessage, RepositoryError> {
        let display = match &message.sender {
            Identity::Staff(id) => self
                .directory
                .find_staff_by_id(id)
                .await?
                .map(|user| SenderDisplay::from(&user)),
            Identity::Client(id) => self
                .directory
                .find_client_user_by_id(id)
                .await?
                .map(|user| SenderDisplay::from(&user)),
        }
        .ok_or_else(|| RepositoryError::SenderNotFound(message.sender.to_string()))?;

        Ok(EnrichedChatMessage::new(message.clone(), display))
    }

    async fn list_by_project(
        &self,
        project_id: &ProjectId,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        let store = self.store.lock().await;
        Ok(store
            .messages
            .iter()
            .filter(|m| &m.project_id == project_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{ClientUserId, MessageIdFactory, MessageText, StaffId},
        infrastructure::repository::InMemoryIdentityDirectory,
    };

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - メッセージの保存と取得
    // - タイムスタンプがプロジェクト内で減少しないこと
    // - 送信者の表示情報の結合（スタッフ / クライアント / 不明）
    // ========================================

    fn create_test_repository() -> InMemoryMessageRepository {
        let directory = InMemoryIdentityDirectory::from_json(
            r#"{
                "staff": [{"id": "staff-1", "name": "Alice"}],
                "clientUsers": [{"id": "client-7", "name": "Bob", "organization": {"id": "o1", "name": "Acme"}}]
            }"#,
        )
        .unwrap();
        InMemoryMessageRepository::new(Arc::new(directory))
    }

    fn message(project: &str, sender: Identity, text: &str, timestamp: i64) -> ChatMessage {
        ChatMessage::new(
            MessageIdFactory::generate().unwrap(),
            ProjectId::new(project.to_string()).unwrap(),
            sender,
            MessageText::new(text.to_string()).unwrap(),
            Timestamp::new(timestamp),
        )
    }

    fn staff() -> Identity {
        Identity::Staff(StaffId::new("staff-1".to_string()).unwrap())
    }

    fn client() -> Identity {
        Identity::Client(ClientUserId::new("client-7".to_string()).unwrap())
    }

    #[tokio::test]
    async fn test_create_and_list_by_project() {
        // テスト項目: 保存したメッセージをプロジェクトごとに作成順で取得できる
        // given (前提条件):
        let repo = create_test_repository();

        // when (操作):
        repo.create_message(message("p1", staff(), "first", 1000))
            .await
            .unwrap();
        repo.create_message(message("p2", client(), "other", 1500))
            .await
            .unwrap();
        repo.create_message(message("p1", client(), "second", 2000))
            .await
            .unwrap();

        // then (期待する結果):
        let p1 = repo
            .list_by_project(&ProjectId::new("p1".to_string()).unwrap())
            .await
            .unwrap();
        assert_eq!(p1.len(), 2);
        assert_eq!(p1[0].text.as_str(), "first");
        assert_eq!(p1[1].text.as_str(), "second");
        assert_eq!(repo.count().await, 3);
    }

    #[tokio::test]
    async fn test_create_message_never_moves_timestamp_backwards() {
        // テスト項目: 時計が戻っても同じプロジェクト内のタイムスタンプは減少しない
        // given (前提条件):
        let repo = create_test_repository();
        repo.create_message(message("p1", staff(), "a", 5000))
            .await
            .unwrap();

        // when (操作):
        let stored = repo
            .create_message(message("p1", staff(), "b", 4000))
            .await
            .unwrap();
        let other_project = repo
            .create_message(message("p2", staff(), "c", 4000))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(stored.timestamp, Timestamp::new(5000));
        assert_eq!(other_project.timestamp, Timestamp::new(4000));
    }

    #[tokio::test]
    async fn test_populate_staff_sender() {
        // テスト項目: スタッフの送信者には名前が結合される
        // given (前提条件):
        let repo = create_test_repository();
        let stored = repo
            .create_message(message("p1", staff(), "hello", 1000))
            .await
            .unwrap();

        // when (操作):
        let enriched = repo.populate_sender_display(&stored).await.unwrap();

        // then (期待する結果):
        assert_eq!(enriched.sender.name(), "Alice");
        assert_eq!(enriched.identity(), staff());
    }

    #[tokio::test]
    async fn test_populate_client_sender_with_organization() {
        // テスト項目: クライアントの送信者には名前と組織名が結合される
        // given (前提条件):
        let repo = create_test_repository();
        let stored = repo
            .create_message(message("p1", client(), "hi", 1000))
            .await
            .unwrap();

        // when (操作):
        let enriched = repo.populate_sender_display(&stored).await.unwrap();

        // then (期待する結果):
        assert_eq!(
            enriched.sender,
            SenderDisplay::Client {
                id: ClientUserId::new("client-7".to_string()).unwrap(),
                name: "Bob".to_string(),
                organization_name: Some("Acme".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn test_populate_unknown_sender_fails() {
        // テスト項目: ディレクトリに存在しない送信者は SenderNotFound エラーになる
        // given (前提条件):
        let repo = create_test_repository();
        let ghost = Identity::Staff(StaffId::new("ghost".to_string()).unwrap());
        let stored = repo
            .create_message(message("p1", ghost, "boo", 1000))
            .await
            .unwrap();

        // when (操作):
        let result = repo.populate_sender_display(&stored).await;

        // then (期待する結果):
        assert_eq!(
            result.unwrap_err(),
            RepositoryError::SenderNotFound("staff:ghost".to_string())
        );
    }
}
