//! UseCase: 接続の生存確認
//!
//! 一定間隔ごとに全ての接続を確認する。前回の確認以降に応答のない接続は
//! 終了させ、それ以外は生存フラグをクリアしてpingを送る。
//! 応答のない接続は最大で1間隔分だけ残る。

use std::{sync::Arc, time::Duration};

use tokio::time::{MissedTickBehavior, interval};

use crate::domain::ConnectionRegistry;

/// Default ping interval
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// 1回の確認の結果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LivenessReport {
    /// pingを送った接続数
    pub pinged: usize,
    /// 終了させた接続数
    pub terminated: usize,
}

/// 生存確認のユースケース
pub struct LivenessMonitor {
    registry: Arc<ConnectionRegistry>,
    period: Duration,
}

impl LivenessMonitor {
    /// 新しい LivenessMonitor を作成
    pub fn new(registry: Arc<ConnectionRegistry>, period: Duration) -> Self {
        Self { registry, period }
    }

    /// 全ての接続を1回確認する
    pub async fn tick(&self) -> LivenessReport {
        let mut report = LivenessReport::default();

        for handle in self.registry.snapshot().await {
            if handle.take_alive() {
                handle.ping();
                report.pinged += 1;
            } else {
                tracing::info!(
                    identity = %handle.identity(),
                    connection_id = %handle.id(),
                    "Connection unresponsive, terminating"
                );
                // The connection task runs the regular disconnect cleanup on exit.
                handle.terminate();
                report.terminated += 1;
            }
        }

        report
    }

    /// 一定間隔で tick を実行し続ける
    pub async fn run(self) {
        let mut timer = interval(self.period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // Skip the first immediate tick
        timer.tick().await;

        loop {
            timer.tick().await;
            let report = self.tick().await;
            if report.terminated > 0 {
                tracing::debug!(
                    pinged = report.pinged,
                    terminated = report.terminated,
                    "Liveness sweep finished"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        ClientUserId, ConnectionHandle, ConnectionIdFactory, Identity, OutboundSignal, Shutdown,
        Timestamp,
    };
    use tokio::sync::mpsc;

    async fn connect(
        registry: &ConnectionRegistry,
        id: &str,
    ) -> (ConnectionHandle, mpsc::UnboundedReceiver<OutboundSignal>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = ConnectionHandle::new(
            ConnectionIdFactory::generate().unwrap(),
            Identity::Client(ClientUserId::new(id.to_string()).unwrap()),
            Timestamp::new(0),
            tx,
        );
        registry.register(handle.clone()).await;
        (handle, rx)
    }

    #[tokio::test]
    async fn test_first_tick_pings_every_connection() {
        // テスト項目: 最初の確認では全ての接続にpingが送られ、生存フラグがクリアされる
        // given (前提条件):
        let registry = Arc::new(ConnectionRegistry::new());
        let monitor = LivenessMonitor::new(registry.clone(), Duration::from_secs(30));
        let (handle, mut rx) = connect(&registry, "client-7").await;

        // when (操作):
        let report = monitor.tick().await;

        // then (期待する結果):
        assert_eq!(
            report,
            LivenessReport {
                pinged: 1,
                terminated: 0
            }
        );
        assert_eq!(rx.try_recv().unwrap(), OutboundSignal::Ping);
        assert!(!handle.is_alive());
    }

    #[tokio::test]
    async fn test_unresponsive_connection_is_terminated_on_next_tick() {
        // テスト項目: 1間隔の間に応答がなかった接続は次の確認で終了させられる
        // given (前提条件):
        let registry = Arc::new(ConnectionRegistry::new());
        let monitor = LivenessMonitor::new(registry.clone(), Duration::from_secs(30));
        let (handle, mut rx) = connect(&registry, "client-7").await;
        monitor.tick().await;
        assert_eq!(rx.try_recv().unwrap(), OutboundSignal::Ping);

        // when (操作):
        let report = monitor.tick().await;

        // then (期待する結果):
        assert_eq!(report.terminated, 1);
        assert_eq!(handle.shutdown_requested(), Some(Shutdown::Terminate));
    }

    #[tokio::test]
    async fn test_terminate_is_not_delayed_by_outbound_backlog() {
        // テスト項目: 送信キューに大量のフレームが溜まった接続でも、終了要求は即座に届く
        // given (前提条件): 読み取りをやめたクライアント宛てにフレームが溜まっている
        let registry = Arc::new(ConnectionRegistry::new());
        let monitor = LivenessMonitor::new(registry.clone(), Duration::from_secs(30));
        let (handle, _rx) = connect(&registry, "client-7").await;
        let payload = "x".repeat(64 * 1024);
        for _ in 0..800 {
            handle.send_frame(payload.clone());
        }
        monitor.tick().await;

        // when (操作):
        let report = monitor.tick().await;

        // then (期待する結果):
        assert_eq!(report.terminated, 1);
        let requested =
            tokio::time::timeout(Duration::from_millis(100), handle.wait_for_shutdown()).await;
        assert_eq!(requested.ok(), Some(Shutdown::Terminate));
    }

    #[tokio::test]
    async fn test_responsive_connection_survives() {
        // テスト項目: pingに応答した接続は終了させられない
        // given (前提条件):
        let registry = Arc::new(ConnectionRegistry::new());
        let monitor = LivenessMonitor::new(registry.clone(), Duration::from_secs(30));
        let (handle, mut rx) = connect(&registry, "client-7").await;

        // when (操作): 確認ごとに応答する
        for _ in 0..3 {
            monitor.tick().await;
            handle.mark_alive();
        }

        // then (期待する結果):
        for _ in 0..3 {
            assert_eq!(rx.try_recv().unwrap(), OutboundSignal::Ping);
        }
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_terminates_silent_connection_after_one_interval() {
        // テスト項目: run は応答のない接続を2回目の確認で終了させる
        // given (前提条件):
        let registry = Arc::new(ConnectionRegistry::new());
        let monitor = LivenessMonitor::new(registry.clone(), Duration::from_secs(30));
        let (handle, mut rx) = connect(&registry, "client-7").await;
        let task = tokio::spawn(monitor.run());

        // when (操作):
        tokio::time::sleep(Duration::from_secs(61)).await;

        // then (期待する結果):
        assert_eq!(rx.recv().await.unwrap(), OutboundSignal::Ping);
        assert_eq!(handle.shutdown_requested(), Some(Shutdown::Terminate));
        task.abort();
    }
}
