//! Signed-in state.
//!
//! The [`Session`] is an explicit value handed to whatever needs it. Only the
//! bearer token is persisted, through a [`TokenStore`].

use std::sync::Arc;

use common::User;

use crate::error::Result;
use crate::kv::KeyValueStore;

const TOKEN_KEY: &str = "token";

/// Where the bearer token survives restarts.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<String>>;
    fn save(&self, token: &str) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// Keeps the token under the `token` key of a [`KeyValueStore`].
pub struct KvTokenStore {
    store: Arc<dyn KeyValueStore>,
}

impl KvTokenStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

impl TokenStore for KvTokenStore {
    fn load(&self) -> Result<Option<String>> {
        self.store.get(TOKEN_KEY)
    }

    fn save(&self, token: &str) -> Result<()> {
        self.store.set(TOKEN_KEY, token)
    }

    fn clear(&self) -> Result<()> {
        self.store.remove(TOKEN_KEY)
    }
}

pub struct Session {
    tokens: Box<dyn TokenStore>,
    token: Option<String>,
    user: Option<User>,
}

impl Session {
    /// Picks up a token saved by an earlier run. The user stays unknown until
    /// [`Session::set_user`] is called with the profile fetched for it.
    pub fn restore(tokens: Box<dyn TokenStore>) -> Result<Self> {
        let token = tokens.load()?;
        Ok(Self {
            tokens,
            token,
            user: None,
        })
    }

    pub fn sign_in(&mut self, user: User, token: String) -> Result<()> {
        self.tokens.save(&token)?;
        self.token = Some(token);
        self.user = Some(user);
        Ok(())
    }

    pub fn set_user(&mut self, user: User) {
        self.user = Some(user);
    }

    pub fn sign_out(&mut self) -> Result<()> {
        self.token = None;
        self.user = None;
        self.tokens.clear()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.token.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.role.is_admin())
    }
}
