//! Signed-in user persistence and the stand-in authentication service.
//!
//! The current user survives restarts through the host's key-value storage,
//! which only deals in opaque strings. [`AuthSession`] serializes the user
//! to JSON under [`USER_STORAGE_KEY`].

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::app_response::AppResponse;
use crate::models::User;

pub const USER_STORAGE_KEY: &str = "user";

/// String key-value storage provided by the device.
pub trait KeyValueStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, AppResponse>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), AppResponse>;
    fn remove_item(&self, key: &str) -> Result<(), AppResponse>;
}

#[derive(Debug, Default)]
pub struct MemoryKeyValueStorage {
    items: Mutex<HashMap<String, String>>,
}

impl KeyValueStorage for MemoryKeyValueStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, AppResponse> {
        let items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), AppResponse> {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), AppResponse> {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        items.remove(key);
        Ok(())
    }
}

#[derive(Debug)]
pub struct AuthSession<S: KeyValueStorage> {
    storage: S,
    user: Option<User>,
}

impl<S: KeyValueStorage> AuthSession<S> {
    pub fn new(storage: S) -> Self {
        Self { storage, user: None }
    }

    /// Restores the stored user, if any. A malformed record leaves the session signed out.
    pub fn load(&mut self) -> Result<Option<&User>, AppResponse> {
        let Some(json) = self.storage.get_item(USER_STORAGE_KEY)? else {
            return Ok(None);
        };

        match serde_json::from_str::<User>(&json) {
            Ok(user) => {
                info!("Restored session for {}", user.id);
                self.user = Some(user);
                Ok(self.user.as_ref())
            }
            Err(e) => {
                warn!("Error loading user: {e}");
                self.user = None;
                Err(AppResponse::from(e))
            }
        }
    }

    /// Signs `user` in and persists it. The in-memory session is updated even
    /// when persisting fails.
    pub fn login(&mut self, user: User) -> Result<(), AppResponse> {
        let json = serde_json::to_string(&user)?;
        self.user = Some(user);
        self.storage.set_item(USER_STORAGE_KEY, &json).inspect_err(|e| {
            warn!("Error saving user: {e}");
        })
    }

    pub fn logout(&mut self) -> Result<(), AppResponse> {
        self.user = None;
        self.storage.remove_item(USER_STORAGE_KEY).inspect_err(|e| {
            warn!("Error logging out: {e}");
        })
    }

    pub fn current_user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub uid: String,
    pub email: String,
}

/// Authentication stand-in: every sign-in succeeds as `user1`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockAuth;

impl MockAuth {
    pub const USER_ID: &'static str = "user1";

    pub fn sign_in_with_email_and_password(&self, email: &str, _password: &str) -> Result<AuthUser, AppResponse> {
        if email.trim().is_empty() {
            return Err(AppResponse::BadRequest("Email is required".to_string()));
        }
        info!("Sign in: {email}");
        Ok(AuthUser {
            uid: Self::USER_ID.to_string(),
            email: email.to_string(),
        })
    }

    pub fn sign_out(&self) {
        info!("Sign out");
    }
}
