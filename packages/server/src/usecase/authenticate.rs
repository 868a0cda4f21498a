//! UseCase: 接続時の認証処理
//!
//! ### 何をテストしているか
//! - AuthenticateUseCase::execute() メソッド
//! - トークン検証と、スタッフ → クライアントの優先順位でのアイデンティティ解決
//!
//! ### どのような状況を想定しているか
//! - 正常系：スタッフ / クライアントとして解決される
//! - 異常系：トークンなし、期限切れ、不正、主体が見つからない、ディレクトリ障害

use std::sync::Arc;

use crate::domain::{
    ClientUserId, Identity, IdentityDirectory, StaffId, TokenError, TokenVerifier,
};

use super::error::AuthError;

/// 認証のユースケース
pub struct AuthenticateUseCase {
    verifier: Arc<dyn TokenVerifier>,
    directory: Arc<dyn IdentityDirectory>,
}

impl AuthenticateUseCase {
    /// 新しい AuthenticateUseCase を作成
    pub fn new(verifier: Arc<dyn TokenVerifier>, directory: Arc<dyn IdentityDirectory>) -> Self {
        Self {
            verifier,
            directory,
        }
    }

    /// 認証を実行
    ///
    /// # Arguments
    ///
    /// * `token` - 接続 URL の `token` クエリパラメータ
    ///
    /// # Returns
    ///
    /// * `Ok(Identity)` - スタッフまたはクライアントのどちらか一方
    /// * `Err(AuthError)` - 認証失敗（接続は閉じる）
    pub async fn execute(&self, token: Option<&str>) -> Result<Identity, AuthError> {
        // 1. トークンの存在確認
        let token = token
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)?;

        // 2. 署名と有効期限の検証
        let claims = self.verifier.verify(token).map_err(|e| match e {
            TokenError::Expired => AuthError::TokenExpired,
            TokenError::Invalid(reason) => AuthError::InvalidToken(reason),
        })?;
        let subject = claims.subject;

        // 3. スタッフ → クライアントの順で解決
        if let Ok(staff_id) = StaffId::new(subject.clone())
            && let Some(staff) = self.directory.find_staff_by_id(&staff_id).await?
        {
            return Ok(Identity::Staff(staff.id));
        }

        if let Ok(client_id) = ClientUserId::new(subject.clone())
            && let Some(client) = self.directory.find_client_user_by_id(&client_id).await?
        {
            return Ok(Identity::Client(client.id));
        }

        Err(AuthError::UnknownSubject(subject))
    }
}
