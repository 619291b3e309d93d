//! In-memory reference implementation of [`PreferenceStore`].
//!
//! Deterministic and test-friendly. Nothing survives a restart; production
//! hosts should use the SQLite backend.

use crate::traits::PreferenceStore;
use crate::{Preference, StorageError, StorageResult};
use async_trait::async_trait;
use defaultserver_types::{PlayerId, ServerName};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory preference store.
#[derive(Debug, Default)]
pub struct InMemoryPreferenceStore {
    preferences: RwLock<HashMap<PlayerId, ServerName>>,
}

impl InMemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored preferences.
    pub fn len(&self) -> usize {
        self.preferences.read().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl PreferenceStore for InMemoryPreferenceStore {
    async fn init_schema(&self) -> StorageResult<()> {
        Ok(())
    }

    async fn get_preference(&self, player_id: &PlayerId) -> StorageResult<Option<ServerName>> {
        let guard = self
            .preferences
            .read()
            .map_err(|_| StorageError::Backend("preferences lock poisoned".to_string()))?;
        Ok(guard.get(player_id).cloned())
    }

    async fn upsert_preference(&self, preference: Preference) -> StorageResult<()> {
        let mut guard = self
            .preferences
            .write()
            .map_err(|_| StorageError::Backend("preferences lock poisoned".to_string()))?;
        guard.insert(preference.player_id, preference.server);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
