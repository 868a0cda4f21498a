//! UseCase: ブロードキャストチャンネルから受信したメッセージの配信処理
//!
//! ### 何をテストしているか
//! - DeliverMessageUseCase::execute() メソッド
//! - このプロセスの購読テーブルにいるアイデンティティだけに配信されること
//!
//! ### どのような状況を想定しているか
//! - 正常系：購読者への配信（送信者自身も購読していれば受け取る）
//! - エッジケース：購読者がレジストリにいない、別の名前空間のトピック、UTF-8 でないペイロード

use std::sync::Arc;

use crate::domain::{
    BrokerMessage, BrokerReceiver, ChatTopic, ConnectionRegistry, SubscriptionTable,
};

/// メッセージ配信のユースケース
pub struct DeliverMessageUseCase {
    registry: Arc<ConnectionRegistry>,
    subscriptions: Arc<SubscriptionTable>,
    topics: ChatTopic,
}

impl DeliverMessageUseCase {
    /// 新しい DeliverMessageUseCase を作成
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        subscriptions: Arc<SubscriptionTable>,
        topics: ChatTopic,
    ) -> Self {
        Self {
            registry,
            subscriptions,
            topics,
        }
    }

    /// 配信を実行
    ///
    /// ペイロードは受信したまま（再エンコードせず）各ソケットに書き込む。
    ///
    /// # Returns
    ///
    /// 配信した接続数
    pub async fn execute(&self, message: &BrokerMessage) -> usize {
        let Some(project_id) = self.topics.project_of(&message.topic) else {
            tracing::warn!(topic = %message.topic, "Dropping payload on unexpected topic");
            return 0;
        };
        let frame = match std::str::from_utf8(&message.payload) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(topic = %message.topic, error = %e, "Dropping non UTF-8 payload");
                return 0;
            }
        };

        let mut delivered = 0;
        for identity in self.subscriptions.subscribers(&project_id).await {
            match self.registry.lookup(&identity).await {
                Some(handle) if handle.send_frame(frame) => delivered += 1,
                Some(_) => {
                    tracing::debug!(identity = %identity, "Subscriber connection is closing");
                }
                None => {
                    tracing::warn!(
                        identity = %identity,
                        project_id = %project_id,
                        "Subscriber has no registered connection"
                    );
                }
            }
        }

        tracing::debug!(project_id = %project_id, delivered, "Delivered chat message");
        delivered
    }

    /// ブロードキャストチャンネルが閉じるまで、受信したメッセージを順番に配信する
    pub async fn run(self, mut receiver: BrokerReceiver) {
        while let Some(message) = receiver.recv().await {
            self.execute(&message).await;
        }
        tracing::warn!(
            namespace = %self.topics.namespace(),
            "Broadcast channel closed, live delivery stopped"
        );
    }
}
