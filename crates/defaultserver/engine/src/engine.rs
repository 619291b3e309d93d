//! Routing decisions.

use defaultserver_policy::RoutingPolicy;
use defaultserver_storage::{Preference, PreferenceStore, StorageError};
use defaultserver_types::{PlayerId, ServerName};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// A preference request that was stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accepted {
    pub player_id: PlayerId,
    pub server: ServerName,
}

/// Why a preference request was not stored.
#[derive(Debug, Error)]
pub enum Rejected {
    /// The server is not on the current allow-list. The store is untouched.
    #[error("server '{requested}' is not allowed")]
    NotAllowed { requested: String },

    /// The write failed; whether it took effect is unknown.
    #[error("preference not confirmed: {0}")]
    NotConfirmed(#[source] StorageError),
}

/// Combines stored preferences with the live allow-list.
pub struct RoutingDecisionEngine {
    store: Arc<dyn PreferenceStore>,
    policy: Arc<RoutingPolicy>,
}

impl RoutingDecisionEngine {
    pub fn new(store: Arc<dyn PreferenceStore>, policy: Arc<RoutingPolicy>) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> &Arc<RoutingPolicy> {
        &self.policy
    }

    /// Where `player_id` should go right now, or `None` for no opinion.
    ///
    /// A stored server that is no longer allowed is ignored but left in the
    /// store. Read failures are logged and treated as no preference.
    #[instrument(skip(self, player_id), fields(player_id = %player_id))]
    pub async fn decide_destination(&self, player_id: &PlayerId) -> Option<ServerName> {
        let stored = match self.store.get_preference(player_id).await {
            Ok(stored) => stored?,
            Err(e) => {
                warn!(
                    backend = self.store.backend_name(),
                    error = %e,
                    "preference lookup failed, leaving routing to the proxy"
                );
                return None;
            }
        };

        if self.policy.is_allowed(stored.as_str()) {
            debug!(server = %stored, "routing to stored default server");
            Some(stored)
        } else {
            debug!(server = %stored, "stored default server is no longer allowed");
            None
        }
    }

    /// Record `server` as the default for `player_id` if it is allowed.
    #[instrument(skip(self, player_id), fields(player_id = %player_id))]
    pub async fn request_set_preference(
        &self,
        player_id: &PlayerId,
        server: &str,
    ) -> Result<Accepted, Rejected> {
        let not_allowed = || Rejected::NotAllowed {
            requested: server.to_string(),
        };

        if !self.policy.is_allowed(server) {
            debug!(server, "rejected default server request");
            return Err(not_allowed());
        }
        let server = ServerName::new(server).map_err(|_| not_allowed())?;

        self.store
            .upsert_preference(Preference::new(*player_id, server.clone()))
            .await
            .map_err(|e| {
                warn!(
                    backend = self.store.backend_name(),
                    error = %e,
                    "failed to store default server"
                );
                Rejected::NotConfirmed(e)
            })?;

        info!(server = %server, "default server updated");
        Ok(Accepted {
            player_id: *player_id,
            server,
        })
    }

    /// Servers a player may choose, in configured order.
    pub fn suggest_destinations(&self) -> Vec<ServerName> {
        self.policy.allowed_servers()
    }
}

impl std::fmt::Debug for RoutingDecisionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoutingDecisionEngine")
            .field("backend", &self.store.backend_name())
            .field("policy", &self.policy)
            .finish()
    }
}
