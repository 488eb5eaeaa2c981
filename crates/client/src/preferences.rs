//! Selected store and interface language.

use std::sync::Arc;

use common::{Language, StoreId};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::kv::{KeyValueStore, load_json, save_json};

const PREFERENCES_KEY: &str = "preferences";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub store: StoreId,
    pub language: Language,
}

/// [`Preferences`] mirrored to a [`KeyValueStore`] on every change.
pub struct PreferenceStore {
    store: Arc<dyn KeyValueStore>,
    current: Preferences,
}

impl PreferenceStore {
    pub fn load(store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let current = load_json(store.as_ref(), PREFERENCES_KEY)?.unwrap_or_default();
        Ok(Self { store, current })
    }

    pub fn get(&self) -> Preferences {
        self.current
    }

    pub fn set_store(&mut self, store: StoreId) -> Result<()> {
        self.current.store = store;
        save_json(self.store.as_ref(), PREFERENCES_KEY, &self.current)
    }

    pub fn set_language(&mut self, language: Language) -> Result<()> {
        self.current.language = language;
        save_json(self.store.as_ref(), PREFERENCES_KEY, &self.current)
    }
}
