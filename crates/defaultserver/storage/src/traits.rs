use crate::{Preference, StorageResult};
use async_trait::async_trait;
use defaultserver_types::{PlayerId, ServerName};

/// Storage interface for player default server preferences.
///
/// Every call is a self-contained unit of work. Implementations must be
/// safe to call concurrently; concurrent writes for the same player resolve
/// last-write-wins.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Ensure the backing structure exists. Safe to call repeatedly.
    async fn init_schema(&self) -> StorageResult<()>;

    /// Read the stored server for a player, if any.
    async fn get_preference(&self, player_id: &PlayerId) -> StorageResult<Option<ServerName>>;

    /// Insert or fully replace the preference for `preference.player_id`.
    async fn upsert_preference(&self, preference: Preference) -> StorageResult<()>;

    /// Backend label used in logs.
    fn backend_name(&self) -> &'static str;
}
