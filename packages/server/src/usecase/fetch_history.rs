//! UseCase: プロジェクトのメッセージ履歴取得
//!
//! ライブ配信に失敗したメッセージも、保存されていればここから取得できる。
//!
//! ### どのような状況を想定しているか
//! - 正常系：タイムスタンプ順に表示情報付きで返す
//! - エッジケース：送信者がディレクトリから消えたメッセージは読み飛ばす
//! - 異常系：リポジトリ障害

use std::sync::Arc;

use crate::domain::{EnrichedChatMessage, MessageRepository, ProjectId};

use super::error::HistoryError;

/// 履歴取得のユースケース
pub struct FetchHistoryUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn MessageRepository>,
}

impl FetchHistoryUseCase {
    /// 新しい FetchHistoryUseCase を作成
    pub fn new(repository: Arc<dyn MessageRepository>) -> Self {
        Self { repository }
    }

    /// 履歴取得を実行
    pub async fn execute(
        &self,
        project_id: &ProjectId,
    ) -> Result<Vec<EnrichedChatMessage>, HistoryError> {
        let mut messages = self.repository.list_by_project(project_id).await?;
        messages.sort_by_key(|m| m.timestamp);

        let mut history = Vec::with_capacity(messages.len());
        for message in &messages {
            match self.repository.populate_sender_display(message).await {
                Ok(enriched) => history.push(enriched),
                Err(e) => {
                    tracing::warn!(
                        message_id = %message.id,
                        project_id = %project_id,
                        error = %e,
                        "Skipping history entry without sender display"
                    );
                }
            }
        }

        Ok(history)
    }
}
