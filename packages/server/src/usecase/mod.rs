//! UseCase 層
//!
//! ビジネスロジックを実装するレイヤー。
//! UI 層から呼び出され、Domain 層を操作します。

pub mod authenticate;
pub mod connect_participant;
pub mod deliver_message;
pub mod disconnect_participant;
pub mod error;
pub mod fetch_history;
pub mod monitor_liveness;
pub mod send_message;
pub mod subscribe_project;

pub use authenticate::AuthenticateUseCase;
pub use connect_participant::ConnectParticipantUseCase;
pub use deliver_message::DeliverMessageUseCase;
pub use disconnect_participant::{DisconnectOutcome, DisconnectParticipantUseCase};
pub use error::{AuthError, HistoryError, SendMessageError, SubscribeError};
pub use fetch_history::FetchHistoryUseCase;
pub use monitor_liveness::{DEFAULT_HEARTBEAT_INTERVAL, LivenessMonitor, LivenessReport};
pub use send_message::SendMessageUseCase;
pub use subscribe_project::SubscribeProjectUseCase;
