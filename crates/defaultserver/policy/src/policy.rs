//! Live routing policy with atomic snapshot replacement.
//!
//! Readers load the current [`PolicySnapshot`] without locking; reloads are
//! serialized and publish a fully built snapshot in a single store.

use crate::snapshot::PolicySnapshot;
use crate::source::PolicySource;
use crate::{ConfigError, ConfigResult};
use arc_swap::ArcSwap;
use defaultserver_types::ServerName;
use serde::de::DeserializeOwned;
use serde_yaml::Value;
use std::sync::{Arc, Mutex};
use tracing::{error, info};

/// Outcome of a reload.
#[derive(Debug)]
pub struct ReloadReport {
    /// The snapshot that is now live.
    pub snapshot: Arc<PolicySnapshot>,

    /// Why loading failed, when the live snapshot is the fail-safe one.
    pub error: Option<ConfigError>,
}

impl ReloadReport {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Current allow-list and properties.
pub struct RoutingPolicy {
    current: ArcSwap<PolicySnapshot>,
    reload_lock: Mutex<()>,
}

impl RoutingPolicy {
    pub fn new(snapshot: PolicySnapshot) -> Self {
        Self {
            current: ArcSwap::from_pointee(snapshot),
            reload_lock: Mutex::new(()),
        }
    }

    /// Policy that allows nothing until the first reload.
    pub fn empty() -> Self {
        Self::new(PolicySnapshot::initial())
    }

    /// Build a policy and load its first snapshot synchronously.
    pub fn load(source: &dyn PolicySource) -> (Self, ReloadReport) {
        let policy = Self::empty();
        let report = policy.reload(source);
        (policy, report)
    }

    /// The live snapshot.
    pub fn current(&self) -> Arc<PolicySnapshot> {
        self.current.load_full()
    }

    /// Load `source` and publish the result.
    ///
    /// On failure an empty snapshot is published, not the previous one.
    pub fn reload(&self, source: &dyn PolicySource) -> ReloadReport {
        let _writer = self
            .reload_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let origin = source.describe();
        let (snapshot, error) = match source.load() {
            Ok(config) => (PolicySnapshot::from_config(config, origin.clone()), None),
            Err(e) => (PolicySnapshot::fail_safe(origin.clone(), e.to_string()), Some(e)),
        };

        let snapshot = Arc::new(snapshot);
        self.current.store(Arc::clone(&snapshot));

        match &error {
            None => info!(
                source = %origin,
                allowed_servers = ?snapshot.allowed_servers(),
                "policy loaded"
            ),
            Some(e) => error!(
                source = %origin,
                error = %e,
                "policy load failed, no servers are allowed until the next successful reload"
            ),
        }

        ReloadReport { snapshot, error }
    }

    pub fn is_allowed(&self, server: &str) -> bool {
        self.current.load().is_allowed(server)
    }

    /// Copy of the current allow-list.
    pub fn allowed_servers(&self) -> Vec<ServerName> {
        self.current.load().allowed_servers().to_vec()
    }

    pub fn property(&self, key: &str) -> Option<Value> {
        self.current.load().property(key).cloned()
    }

    pub fn property_or(&self, key: &str, default: Value) -> Value {
        self.property(key).unwrap_or(default)
    }

    /// Typed view of a property.
    pub fn property_as<T: DeserializeOwned>(&self, key: &str) -> ConfigResult<Option<T>> {
        match self.property(key) {
            None => Ok(None),
            Some(value) => serde_yaml::from_value(value).map(Some).map_err(|e| {
                ConfigError::PropertyType {
                    key: key.to_string(),
                    message: e.to_string(),
                }
            }),
        }
    }
}

impl Default for RoutingPolicy {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Debug for RoutingPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoutingPolicy")
            .field("current", &self.current.load_full())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::InlinePolicySource;
    use crate::SnapshotOrigin;
    use std::thread;

    fn inline(doc: &str) -> InlinePolicySource {
        InlinePolicySource::new(doc)
    }

    #[test]
    fn empty_policy_allows_nothing() {
        let policy = RoutingPolicy::empty();
        assert!(!policy.is_allowed("lobby"));
        assert!(policy.allowed_servers().is_empty());
        assert_eq!(policy.current().origin(), &SnapshotOrigin::Initial);
    }

    #[test]
    fn reload_replaces_allow_list() {
        let (policy, report) = RoutingPolicy::load(&inline("allowed-servers: [lobby, survival]"));
        assert!(report.is_ok());
        assert!(policy.is_allowed("survival"));

        policy.reload(&inline("allowed-servers: [lobby]"));
        assert!(policy.is_allowed("lobby"));
        assert!(!policy.is_allowed("survival"));
    }

    #[test]
    fn allow_list_entries_are_matched_verbatim() {
        let (policy, report) =
            RoutingPolicy::load(&inline("allowed-servers: [\"lobby \", lobby, \" hub\"]"));
        assert!(report.is_ok());

        assert!(policy.is_allowed("lobby "));
        assert!(policy.is_allowed("lobby"));
        assert!(policy.is_allowed(" hub"));
        assert!(!policy.is_allowed("hub"));
        let names: Vec<String> = policy
            .allowed_servers()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(names, vec!["lobby ", "lobby", " hub"]);

        let report = policy.reload(&inline("allowed-servers: [\"   \"]"));
        assert!(matches!(report.error, Some(ConfigError::Parse { .. })));
        assert!(policy.allowed_servers().is_empty());
    }

    #[test]
    fn failed_reload_publishes_empty_snapshot() {
        let (policy, _) = RoutingPolicy::load(&inline("allowed-servers: [lobby]\nmotd: hi"));
        assert!(policy.is_allowed("lobby"));

        let report = policy.reload(&inline("allowed-servers: [lobby"));

        assert!(matches!(report.error, Some(ConfigError::Parse { .. })));
        assert!(report.snapshot.is_fail_safe());
        assert!(policy.allowed_servers().is_empty());
        assert!(policy.property("motd").is_none());
        for name in ["lobby", "survival", "", "anything"] {
            assert!(!policy.is_allowed(name));
        }
    }

    #[test]
    fn snapshots_held_by_readers_are_unaffected_by_reload() {
        let (policy, _) = RoutingPolicy::load(&inline("allowed-servers: [lobby]"));
        let held = policy.current();

        policy.reload(&inline("allowed-servers: [creative]"));

        assert!(held.is_allowed("lobby"));
        assert!(!policy.is_allowed("lobby"));
    }

    #[test]
    fn properties_and_defaults() {
        let (policy, _) = RoutingPolicy::load(&inline(
            "allowed-servers: [lobby]\nmotd: welcome\nmax-players: 40\n",
        ));

        assert_eq!(
            policy.property("motd"),
            Some(Value::String("welcome".to_string()))
        );
        assert_eq!(
            policy.property_or("missing", Value::Bool(true)),
            Value::Bool(true)
        );
        assert_eq!(policy.property_as::<u32>("max-players").unwrap(), Some(40));
        assert_eq!(policy.property_as::<u32>("missing").unwrap(), None);
        assert!(matches!(
            policy.property_as::<u32>("motd"),
            Err(ConfigError::PropertyType { .. })
        ));
    }

    #[test]
    fn readers_never_observe_partial_snapshots() {
        let policy = Arc::new(RoutingPolicy::empty());
        let full = "allowed-servers: [a, b, c, d]";
        let other = "allowed-servers: [w, x, y, z]";
        policy.reload(&inline(full));

        let writer = {
            let policy = Arc::clone(&policy);
            thread::spawn(move || {
                for i in 0..200 {
                    let doc = if i % 2 == 0 { other } else { full };
                    policy.reload(&inline(doc));
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let policy = Arc::clone(&policy);
                thread::spawn(move || {
                    for _ in 0..500 {
                        let snapshot = policy.current();
                        let names: Vec<&str> = snapshot
                            .allowed_servers()
                            .iter()
                            .map(|s| s.as_str())
                            .collect();
                        assert!(
                            names == ["a", "b", "c", "d"] || names == ["w", "x", "y", "z"],
                            "torn snapshot: {names:?}"
                        );
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
    }
}
