//! External store seams for tokens and permissions.
//!
//! The pipeline treats persistence as an opaque collaborator: these
//! traits are its whole contract. [`InMemoryStore`] backs the demo
//! binary and tests; a deployment plugs its own persistence in.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::SystemTime;

use async_trait::async_trait;
use thiserror::Error;

use crate::identity::principal::{PermissionSet, User};
use crate::identity::token::TokenScope;

/// Failure surfaced by an external store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Resolves plaintext tokens to their owners.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Return the user owning a live, non-expired token of the given
    /// scope, or `None` when no such token exists.
    async fn resolve(&self, scope: TokenScope, plaintext: &str) -> Result<Option<User>, StoreError>;
}

/// Source of a user's granted capabilities.
#[async_trait]
pub trait PermissionStore: Send + Sync {
    async fn all_for(&self, user_id: i64) -> Result<PermissionSet, StoreError>;
}

struct TokenEntry {
    user: User,
    expiry: SystemTime,
}

/// In-memory token and permission store.
#[derive(Default)]
pub struct InMemoryStore {
    tokens: Mutex<HashMap<(TokenScope, String), TokenEntry>>,
    permissions: Mutex<HashMap<i64, Vec<String>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a token for a user, valid until `expiry`.
    pub fn insert_token(&self, scope: TokenScope, plaintext: &str, user: User, expiry: SystemTime) {
        let mut tokens = self.tokens.lock().expect("token store mutex poisoned");
        tokens.insert((scope, plaintext.to_string()), TokenEntry { user, expiry });
    }

    /// Grant a capability to a user.
    pub fn grant(&self, user_id: i64, permission: &str) {
        let mut permissions = self.permissions.lock().expect("permission store mutex poisoned");
        permissions.entry(user_id).or_default().push(permission.to_string());
    }
}

#[async_trait]
impl TokenStore for InMemoryStore {
    async fn resolve(&self, scope: TokenScope, plaintext: &str) -> Result<Option<User>, StoreError> {
        let tokens = self.tokens.lock().expect("token store mutex poisoned");
        Ok(tokens
            .get(&(scope, plaintext.to_string()))
            .filter(|entry| entry.expiry > SystemTime::now())
            .map(|entry| entry.user.clone()))
    }
}

#[async_trait]
impl PermissionStore for InMemoryStore {
    async fn all_for(&self, user_id: i64) -> Result<PermissionSet, StoreError> {
        let permissions = self.permissions.lock().expect("permission store mutex poisoned");
        Ok(permissions
            .get(&user_id)
            .into_iter()
            .flatten()
            .cloned()
            .collect())
    }
}
