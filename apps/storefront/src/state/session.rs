//! # Session State
//!
//! Login information persisted next to the cart.
//!
//! ```text
//! zhisheng_user_info   {"token": "…", "nickname": "…", …}   ← check_login reads this
//! zhisheng_auth_token  "…"                                   ← raw API token
//! ```
//!
//! A user is logged in when the stored user info carries a non-empty
//! `token`. Every other field is kept as-is for page scripts.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use zhisheng_storage::{KeyValueStore, Storage, StorageResult};

/// Stored user profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Every other profile field, untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserInfo {
    pub fn with_token(token: impl Into<String>) -> Self {
        UserInfo {
            token: Some(token.into()),
            extra: Map::new(),
        }
    }

    pub fn has_token(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// A profile field other than `token`.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }
}

/// Login session over shared storage.
#[derive(Debug, Clone)]
pub struct Session<S> {
    storage: Storage<S>,
    user_key: String,
    token_key: String,
}

impl<S: KeyValueStore> Session<S> {
    pub fn new(
        storage: Storage<S>,
        user_key: impl Into<String>,
        token_key: impl Into<String>,
    ) -> Self {
        Session {
            storage,
            user_key: user_key.into(),
            token_key: token_key.into(),
        }
    }

    /// The stored profile; `None` when absent or not an object.
    pub fn user_info(&self) -> StorageResult<Option<UserInfo>> {
        self.storage.get_as(&self.user_key)
    }

    pub fn is_logged_in(&self) -> StorageResult<bool> {
        Ok(self.user_info()?.is_some_and(|user| user.has_token()))
    }

    pub fn save_user_info(&self, user: &UserInfo) -> StorageResult<()> {
        self.storage.set(&self.user_key, user)?;
        info!(logged_in = user.has_token(), "User info saved");
        Ok(())
    }

    pub fn auth_token(&self) -> StorageResult<Option<String>> {
        self.storage.get_as(&self.token_key)
    }

    pub fn set_auth_token(&self, token: &str) -> StorageResult<()> {
        self.storage.set(&self.token_key, token)?;
        debug!("Auth token stored");
        Ok(())
    }

    /// Forgets the profile and token. The cart is kept.
    pub fn logout(&self) -> StorageResult<()> {
        self.storage.remove(&self.user_key)?;
        self.storage.remove(&self.token_key)?;
        info!("Session cleared");
        Ok(())
    }
}
