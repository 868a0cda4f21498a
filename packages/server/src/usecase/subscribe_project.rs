//! UseCase: プロジェクト購読処理

use std::sync::Arc;

use crate::domain::{ConnectionHandle, ConnectionRegistry, ProjectId, SubscriptionTable};

use super::error::SubscribeError;

/// プロジェクト購読のユースケース
pub struct SubscribeProjectUseCase {
    registry: Arc<ConnectionRegistry>,
    subscriptions: Arc<SubscriptionTable>,
}

impl SubscribeProjectUseCase {
    /// 新しい SubscribeProjectUseCase を作成
    pub fn new(registry: Arc<ConnectionRegistry>, subscriptions: Arc<SubscriptionTable>) -> Self {
        Self {
            registry,
            subscriptions,
        }
    }

    /// 購読を実行
    ///
    /// レジストリの現在のエントリである接続からの購読のみ受け付ける。
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - 新規に購読した
    /// * `Ok(false)` - すでに購読済み
    /// * `Err(SubscribeError)` - 接続が置き換え済み・切断済み
    pub async fn execute(
        &self,
        connection: &ConnectionHandle,
        project_id: ProjectId,
    ) -> Result<bool, SubscribeError> {
        let identity = connection.identity();
        // 現在のエントリの確認と購読の追加は1つのロック内で行う
        let added = self
            .registry
            .subscribe_if_current(connection, project_id.clone(), &self.subscriptions)
            .await
            .ok_or_else(|| SubscribeError::NotRegistered(connection.id().to_string()))?;
        tracing::info!(
            identity = %identity,
            project_id = %project_id,
            newly_added = added,
            "Subscribed to project"
        );
        Ok(added)
    }
}
