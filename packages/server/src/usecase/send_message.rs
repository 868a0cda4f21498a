//! UseCase: メッセージ送信処理（リレー）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - 保存 → 表示情報の結合 → ブロードキャストチャンネルへの発行
//!
//! ### なぜこのテストが必要か
//! - 1フレームにつき1件だけ保存されることを保証
//! - どの段階で失敗しても、以降の段階が実行されないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：スタッフ / クライアントからの送信
//! - 異常系：保存失敗（発行しない）、結合失敗、エンコード失敗、発行失敗（保存は残る）

use std::sync::Arc;

use crate::domain::{
    ChatMessage, ChatPayloadEncoder, ChatTopic, EnrichedChatMessage, Identity, MessageBroker,
    MessageIdFactory, MessageRepository, MessageText, ProjectId, Timestamp,
};

use super::error::SendMessageError;

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn MessageRepository>,
    broker: Arc<dyn MessageBroker>,
    encoder: Arc<dyn ChatPayloadEncoder>,
    topics: ChatTopic,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
    pub fn new(
        repository: Arc<dyn MessageRepository>,
        broker: Arc<dyn MessageBroker>,
        encoder: Arc<dyn ChatPayloadEncoder>,
        topics: ChatTopic,
    ) -> Self {
        Self {
            repository,
            broker,
            encoder,
            topics,
        }
    }

    /// メッセージ送信を実行
    ///
    /// # Arguments
    ///
    /// * `sender` - 送信者（接続のアイデンティティ）
    /// * `project_id` - 送信先プロジェクト
    /// * `text` - メッセージ本文
    ///
    /// # Returns
    ///
    /// * `Ok(EnrichedChatMessage)` - 発行したメッセージ
    /// * `Err(SendMessageError)` - 失敗した段階
    pub async fn execute(
        &self,
        sender: Identity,
        project_id: ProjectId,
        text: MessageText,
    ) -> Result<EnrichedChatMessage, SendMessageError> {
        let id = MessageIdFactory::generate()
            .map_err(|e| SendMessageError::Internal(e.to_string()))?;
        let message = ChatMessage::new(id, project_id, sender, text, Timestamp::now());

        // 1. 保存
        let stored = self
            .repository
            .create_message(message)
            .await
            .map_err(SendMessageError::Persistence)?;

        // 2. 送信者の表示情報を結合
        let enriched = self
            .repository
            .populate_sender_display(&stored)
            .await
            .map_err(SendMessageError::Enrichment)?;

        // 3. プロジェクトのトピックに発行
        let payload = self
            .encoder
            .encode(&enriched)
            .map_err(|e| SendMessageError::Internal(e.to_string()))?;
        let topic = self.topics.topic(&enriched.project_id);
        self.broker
            .publish(&topic, payload)
            .await
            .map_err(SendMessageError::Publish)?;

        tracing::info!(
            message_id = %enriched.id,
            project_id = %enriched.project_id,
            sender = %enriched.identity(),
            "Published chat message"
        );

        Ok(enriched)
    }
}
