//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::{BrokerError, CloseReason, RepositoryError};

/// 認証エラー（接続を即座に閉じる）
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Token missing")]
    MissingToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Token invalid: {0}")]
    InvalidToken(String),

    #[error("Subject '{0}' is neither a staff user nor a client user")]
    UnknownSubject(String),

    #[error("Identity lookup failed: {0}")]
    Directory(#[from] RepositoryError),
}

impl AuthError {
    /// 接続を閉じる際のクローズ理由
    pub fn close_reason(&self) -> CloseReason {
        match self {
            AuthError::MissingToken => CloseReason::TokenMissing,
            AuthError::TokenExpired => CloseReason::TokenExpired,
            AuthError::InvalidToken(_) => CloseReason::TokenInvalid,
            AuthError::UnknownSubject(_) => CloseReason::UnknownSubject,
            AuthError::Directory(_) => CloseReason::AuthUnavailable,
        }
    }
}

/// プロジェクト購読エラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscribeError {
    /// 接続がレジストリの現在のエントリではない（置き換え済み・切断済み）
    #[error("Connection {0} is not the registered connection of its identity")]
    NotRegistered(String),
}

/// メッセージ送信エラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SendMessageError {
    /// 保存に失敗（配信もされない）
    #[error("Failed to persist message: {0}")]
    Persistence(RepositoryError),

    /// 保存済みだが表示情報の結合に失敗（配信されない）
    #[error("Failed to populate sender display: {0}")]
    Enrichment(RepositoryError),

    /// 保存済みだが発行に失敗（履歴からのみ取得可能）
    #[error("Failed to publish message: {0}")]
    Publish(BrokerError),

    /// ID 生成やフレームのエンコードの失敗
    #[error("Internal error: {0}")]
    Internal(String),
}

/// 履歴取得エラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HistoryError {
    #[error("Failed to load project history: {0}")]
    Repository(#[from] RepositoryError),
}
