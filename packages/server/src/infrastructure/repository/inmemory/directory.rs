//! InMemory Identity Directory 実装
//!
//! スタッフとクライアントユーザーを HashMap に保持する IdentityDirectory の実装。
//! 起動時に JSON のシードファイルから読み込めます。

use std::{collections::HashMap, path::Path};

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::{
    ClientUser, ClientUserId, IdentityDirectory, RepositoryError, StaffId, StaffUser,
};

/// Errors raised while loading a directory seed
#[derive(Debug, Error)]
pub enum DirectoryLoadError {
    #[error("Failed to read directory file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid directory JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Seed file layout
///
/// ```json
/// {
///   "staff": [{"id": "staff-1", "name": "Alice"}],
///   "clientUsers": [
///     {"id": "client-7", "name": "Bob", "organization": {"id": "org-1", "name": "Acme"}}
///   ]
/// }
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectorySeed {
    #[serde(default)]
    pub staff: Vec<StaffUser>,
    #[serde(default)]
    pub client_users: Vec<ClientUser>,
}

/// インメモリ Identity Directory 実装
#[derive(Debug, Default)]
pub struct InMemoryIdentityDirectory {
    staff: HashMap<StaffId, StaffUser>,
    client_users: HashMap<ClientUserId, ClientUser>,
}

impl InMemoryIdentityDirectory {
    /// 空の InMemoryIdentityDirectory を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// シードから作成
    pub fn from_seed(seed: DirectorySeed) -> Self {
        let mut directory = Self::new();
        for user in seed.staff {
            directory.insert_staff(user);
        }
        for user in seed.client_users {
            directory.insert_client_user(user);
        }
        directory
    }

    /// JSON 文字列から作成
    pub fn from_json(json: &str) -> Result<Self, DirectoryLoadError> {
        let seed: DirectorySeed = serde_json::from_str(json)?;
        Ok(Self::from_seed(seed))
    }

    /// JSON ファイルから作成
    pub fn from_json_file(path: &Path) -> Result<Self, DirectoryLoadError> {
        let json = std::fs::read_to_string(path).map_err(|source| DirectoryLoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn insert_staff(&mut self, user: StaffUser) {
        self.staff.insert(user.id.clone(), user);
    }

    pub fn insert_client_user(&mut self, user: ClientUser) {
        self.client_users.insert(user.id.clone(), user);
    }

    /// 登録済みユーザー数（スタッフ, クライアント）
    pub fn counts(&self) -> (usize, usize) {
        (self.staff.len(), self.client_users.len())
    }
}

#[async_trait]
impl IdentityDirectory for InMemoryIdentityDirectory {
    async fn find_staff_by_id(&self, id: &StaffId) -> Result<Option<StaffUser>, RepositoryError> {
        Ok(self.staff.get(id).cloned())
    }

    async fn find_client_user_by_id(
        &self,
        id: &ClientUserId,
    ) -> Result<Option<ClientUser>, RepositoryError> {
        Ok(self.client_users.get(id).cloned())
    }
}
