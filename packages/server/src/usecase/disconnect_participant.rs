//! UseCase: 参加者切断処理
//!
//! ### 何をテストしているか
//! - DisconnectParticipantUseCase::execute() メソッド
//! - レジストリからの削除と、全プロジェクトの購読解除
//!
//! ### どのような状況を想定しているか
//! - 正常系：現在の接続の切断（エントリと購読が消える）
//! - エッジケース：置き換え済みの古い接続の切断（新しい接続には影響しない）

use std::sync::Arc;

use crate::domain::{ConnectionId, ConnectionRegistry, Identity, SubscriptionTable};

/// 切断処理の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisconnectOutcome {
    /// レジストリのエントリを削除したか
    pub removed: bool,
    /// 購読を解除したプロジェクト数
    pub purged_projects: usize,
}

/// 参加者切断のユースケース
pub struct DisconnectParticipantUseCase {
    registry: Arc<ConnectionRegistry>,
    subscriptions: Arc<SubscriptionTable>,
}

impl DisconnectParticipantUseCase {
    /// 新しい DisconnectParticipantUseCase を作成
    pub fn new(registry: Arc<ConnectionRegistry>, subscriptions: Arc<SubscriptionTable>) -> Self {
        Self {
            registry,
            subscriptions,
        }
    }

    /// 参加者切断を実行
    ///
    /// 置き換え済みの接続では何もしない（購読は置き換え時に破棄済み）。
    pub async fn execute(
        &self,
        identity: &Identity,
        connection_id: &ConnectionId,
    ) -> DisconnectOutcome {
        // レジストリからの削除（現在のエントリの場合のみ）と購読解除を1つのロック内で行う
        match self
            .registry
            .remove_and_unsubscribe(identity, connection_id, &self.subscriptions)
            .await
        {
            Some(purged_projects) => DisconnectOutcome {
                removed: true,
                purged_projects,
            },
            None => DisconnectOutcome {
                removed: false,
                purged_projects: 0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        ConnectionHandle, ConnectionIdFactory, OutboundSignal, ProjectId, StaffId, Timestamp,
    };
    use tokio::sync::mpsc;

    fn staff(id: &str) -> Identity {
        Identity::Staff(StaffId::new(id.to_string()).unwrap())
    }

    fn create_handle(
        identity: Identity,
    ) -> (ConnectionHandle, mpsc::UnboundedReceiver<OutboundSignal>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = ConnectionHandle::new(
            ConnectionIdFactory::generate().unwrap(),
            identity,
            Timestamp::new(0),
            tx,
        );
        (handle, rx)
    }

    #[tokio::test]
    async fn test_disconnect_removes_entry_and_subscriptions() {
        // テスト項目: 切断するとレジストリのエントリと全ての購読が削除される
        // given (前提条件):
        let registry = Arc::new(ConnectionRegistry::new());
        let subscriptions = Arc::new(SubscriptionTable::new());
        let usecase = DisconnectParticipantUseCase::new(registry.clone(), subscriptions.clone());
        let (handle, _rx) = create_handle(staff("staff-1"));
        registry.register(handle.clone()).await;
        for p in ["p1", "p2", "p3"] {
            subscriptions
                .subscribe(ProjectId::new(p.to_string()).unwrap(), staff("staff-1"))
                .await;
        }

        // when (操作):
        let outcome = usecase.execute(&staff("staff-1"), handle.id()).await;

        // then (期待する結果):
        assert_eq!(
            outcome,
            DisconnectOutcome {
                removed: true,
                purged_projects: 3
            }
        );
        assert!(registry.is_empty().await);
        assert_eq!(subscriptions.project_count().await, 0);
    }

    #[tokio::test]
    async fn test_disconnect_superseded_connection_keeps_successor() {
        // テスト項目: 置き換え済みの古い接続の切断は、新しい接続のエントリと購読を残す
        // given (前提条件):
        let registry = Arc::new(ConnectionRegistry::new());
        let subscriptions = Arc::new(SubscriptionTable::new());
        let usecase = DisconnectParticipantUseCase::new(registry.clone(), subscriptions.clone());
        let (old, _rx1) = create_handle(staff("staff-2"));
        let (new, _rx2) = create_handle(staff("staff-2"));
        registry.register(old.clone()).await;
        registry.register(new.clone()).await;
        subscriptions
            .subscribe(ProjectId::new("p1".to_string()).unwrap(), staff("staff-2"))
            .await;

        // when (操作):
        let outcome = usecase.execute(&staff("staff-2"), old.id()).await;

        // then (期待する結果):
        assert!(!outcome.removed);
        assert!(registry.is_current(&staff("staff-2"), new.id()).await);
        assert_eq!(subscriptions.projects_of(&staff("staff-2")).await.len(), 1);
    }
}
