//! Immutable policy snapshots.

use crate::config::PolicyConfig;
use chrono::{DateTime, Utc};
use defaultserver_types::ServerName;
use serde_yaml::Value;
use std::collections::BTreeMap;

/// How a snapshot came to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotOrigin {
    /// Placeholder before the first load.
    Initial,

    /// Successfully loaded from a source.
    Loaded { source: String },

    /// Loading failed; the snapshot is empty.
    FailSafe { source: String, reason: String },
}

/// One loaded view of the policy. Never mutated after construction.
#[derive(Debug, Clone)]
pub struct PolicySnapshot {
    allowed_servers: Vec<ServerName>,
    properties: BTreeMap<String, Value>,
    loaded_at: DateTime<Utc>,
    origin: SnapshotOrigin,
}

impl PolicySnapshot {
    /// Empty snapshot published before anything is loaded.
    pub fn initial() -> Self {
        Self::empty_with(SnapshotOrigin::Initial)
    }

    /// Empty snapshot published when `source` could not be loaded.
    pub fn fail_safe(source: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::empty_with(SnapshotOrigin::FailSafe {
            source: source.into(),
            reason: reason.into(),
        })
    }

    pub fn from_config(config: PolicyConfig, source: impl Into<String>) -> Self {
        Self {
            allowed_servers: config.deduplicated_servers(),
            properties: config.extra,
            loaded_at: Utc::now(),
            origin: SnapshotOrigin::Loaded {
                source: source.into(),
            },
        }
    }

    fn empty_with(origin: SnapshotOrigin) -> Self {
        Self {
            allowed_servers: Vec::new(),
            properties: BTreeMap::new(),
            loaded_at: Utc::now(),
            origin,
        }
    }

    /// Allowed servers in document order, without duplicates.
    pub fn allowed_servers(&self) -> &[ServerName] {
        &self.allowed_servers
    }

    pub fn is_allowed(&self, server: &str) -> bool {
        self.allowed_servers.iter().any(|allowed| allowed == server)
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    pub fn properties(&self) -> &BTreeMap<String, Value> {
        &self.properties
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn origin(&self) -> &SnapshotOrigin {
        &self.origin
    }

    pub fn is_fail_safe(&self) -> bool {
        matches!(self.origin, SnapshotOrigin::FailSafe { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fail_safe_snapshot_allows_nothing() {
        let snapshot = PolicySnapshot::fail_safe("config.yml", "boom");
        assert!(snapshot.allowed_servers().is_empty());
        assert!(snapshot.properties().is_empty());
        assert!(!snapshot.is_allowed("lobby"));
        assert!(!snapshot.is_allowed(""));
        assert!(snapshot.is_fail_safe());
    }

    #[test]
    fn membership_is_exact() {
        let config =
            PolicyConfig::from_yaml_str("allowed-servers: [lobby, Survival]\n", "test").unwrap();
        let snapshot = PolicySnapshot::from_config(config, "test");

        assert!(snapshot.is_allowed("lobby"));
        assert!(snapshot.is_allowed("Survival"));
        assert!(!snapshot.is_allowed("survival"));
        assert!(!snapshot.is_allowed("lobby "));
        assert_eq!(
            snapshot.origin(),
            &SnapshotOrigin::Loaded {
                source: "test".to_string()
            }
        );
    }
}
