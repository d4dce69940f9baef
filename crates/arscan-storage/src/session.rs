// SPDX-FileCopyrightText: 2026 Arscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Signed-in session state and app settings.
//!
//! Keys: `authToken`, `user` (JSON) and `setting_{name}` (JSON).

use std::sync::Arc;

use arscan_core::{ArscanError, CacheStore, User};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

pub const AUTH_TOKEN_KEY: &str = "authToken";
pub const USER_KEY: &str = "user";
const SETTING_PREFIX: &str = "setting_";

fn serialize<T: Serialize>(value: &T) -> Result<String, ArscanError> {
    serde_json::to_string(value).map_err(|e| ArscanError::Storage {
        source: Box::new(e),
    })
}

/// Session and settings accessor over any [`CacheStore`].
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn CacheStore>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    pub async fn set_auth_token(&self, token: &str) -> Result<(), ArscanError> {
        self.store.set(AUTH_TOKEN_KEY, token).await
    }

    pub async fn auth_token(&self) -> Result<Option<String>, ArscanError> {
        self.store.get(AUTH_TOKEN_KEY).await
    }

    pub async fn remove_auth_token(&self) -> Result<(), ArscanError> {
        self.store.remove(AUTH_TOKEN_KEY).await
    }

    pub async fn set_user(&self, user: &User) -> Result<(), ArscanError> {
        self.store.set(USER_KEY, &serialize(user)?).await
    }

    /// The stored user. A corrupt entry reads as absent.
    pub async fn user(&self) -> Result<Option<User>, ArscanError> {
        let Some(raw) = self.store.get(USER_KEY).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                warn!(error = %e, "stored user is corrupt, ignoring");
                Ok(None)
            }
        }
    }

    pub async fn remove_user(&self) -> Result<(), ArscanError> {
        self.store.remove(USER_KEY).await
    }

    pub async fn set_setting<T: Serialize + Sync>(
        &self,
        name: &str,
        value: &T,
    ) -> Result<(), ArscanError> {
        self.store
            .set(&format!("{SETTING_PREFIX}{name}"), &serialize(value)?)
            .await
    }

    /// A stored setting, or `None` when absent or unparseable.
    pub async fn setting<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, ArscanError> {
        let Some(raw) = self.store.get(&format!("{SETTING_PREFIX}{name}")).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(setting = name, error = %e, "error parsing setting");
                Ok(None)
            }
        }
    }

    pub async fn remove_setting(&self, name: &str) -> Result<(), ArscanError> {
        self.store.remove(&format!("{SETTING_PREFIX}{name}")).await
    }

    /// Forget the signed-in user (logout). Cached markers and settings stay.
    pub async fn clear_all(&self) -> Result<(), ArscanError> {
        self.store
            .remove_many(&[AUTH_TOKEN_KEY.to_string(), USER_KEY.to_string()])
            .await
    }
}
