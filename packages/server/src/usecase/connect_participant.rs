//! UseCase: 参加者接続処理
//!
//! ### 何をテストしているか
//! - ConnectParticipantUseCase::execute() メソッド
//! - レジストリへの登録と、同じアイデンティティの古い接続の置き換え
//!
//! ### どのような状況を想定しているか
//! - 正常系：新規接続の登録
//! - エッジケース：同じアイデンティティの再接続（古い接続は閉じ、購読はリセット）

use std::sync::Arc;

use crate::domain::{
    CloseReason, ConnectionHandle, ConnectionId, ConnectionRegistry, SubscriptionTable,
};

/// 参加者接続のユースケース
pub struct ConnectParticipantUseCase {
    registry: Arc<ConnectionRegistry>,
    subscriptions: Arc<SubscriptionTable>,
}

impl ConnectParticipantUseCase {
    /// 新しい ConnectParticipantUseCase を作成
    pub fn new(registry: Arc<ConnectionRegistry>, subscriptions: Arc<SubscriptionTable>) -> Self {
        Self {
            registry,
            subscriptions,
        }
    }

    /// 参加者接続を実行
    ///
    /// # Returns
    ///
    /// 置き換えられた古い接続の ID（あれば）
    pub async fn execute(&self, handle: ConnectionHandle) -> Option<ConnectionId> {
        let identity = handle.identity().clone();

        // 1. レジストリに登録し、置き換えた古い接続の購読を同じロック内で破棄
        let (previous, purged) = self
            .registry
            .register_replacing(handle, &self.subscriptions)
            .await?;

        // 2. 古いソケットを閉じる
        if !previous.close(CloseReason::Superseded) {
            tracing::debug!(
                identity = %identity,
                connection_id = %previous.id(),
                "Superseded connection was already closing"
            );
        }
        tracing::info!(
            identity = %identity,
            connection_id = %previous.id(),
            purged_projects = purged,
            "Superseded previous connection"
        );

        Some(previous.id().clone())
    }
}
