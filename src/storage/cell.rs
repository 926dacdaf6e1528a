use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::LocalStore;

/// A value mirrored into a [`LocalStore`] entry.
///
/// Reads are served from memory. Writes update memory first and then persist on
/// a best-effort basis; persistence failures are logged, never returned.
#[derive(Debug)]
pub struct PersistedCell<T> {
    store: Arc<LocalStore>,
    key: String,
    value: T,
}

impl<T> PersistedCell<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(store: Arc<LocalStore>, key: impl Into<String>, default: T) -> Self {
        let key = key.into();
        let value = store.get(&key, default);
        Self { store, key, value }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn set(&mut self, value: T) {
        self.value = value;
        if let Err(e) = self.store.set(&self.key, &self.value) {
            tracing::warn!("Failed to persist '{}': {}", self.key, e);
        }
    }

    /// Forget the persisted entry and fall back to `default`
    pub fn reset(&mut self, default: T) {
        self.value = default;
        if let Err(e) = self.store.remove(&self.key) {
            tracing::warn!("Failed to remove '{}': {}", self.key, e);
        }
    }
}
