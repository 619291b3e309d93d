//! Proxy connection lifecycle hooks.
//!
//! The proxy owns the connection. These hooks only fill in the placement
//! slot it hands over, and only with servers the proxy actually knows.

use crate::engine::RoutingDecisionEngine;
use defaultserver_types::{PlayerId, ServerName};
use std::collections::BTreeSet;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Servers registered on the proxy.
pub trait ServerDirectory: Send + Sync {
    fn contains(&self, server: &ServerName) -> bool;
}

impl<F> ServerDirectory for F
where
    F: Fn(&ServerName) -> bool + Send + Sync,
{
    fn contains(&self, server: &ServerName) -> bool {
        self(server)
    }
}

/// Mutable set of registered servers.
#[derive(Debug, Default)]
pub struct RegisteredServers {
    servers: RwLock<BTreeSet<ServerName>>,
}

impl RegisteredServers {
    pub fn new(servers: impl IntoIterator<Item = ServerName>) -> Self {
        Self {
            servers: RwLock::new(servers.into_iter().collect()),
        }
    }

    pub fn register(&self, server: ServerName) {
        let mut guard = self
            .servers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.insert(server);
    }

    pub fn unregister(&self, server: &ServerName) -> bool {
        let mut guard = self
            .servers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.remove(server)
    }
}

impl ServerDirectory for RegisteredServers {
    fn contains(&self, server: &ServerName) -> bool {
        self.servers
            .read()
            .map(|guard| guard.contains(server))
            .unwrap_or(false)
    }
}

/// Initial placement slot for a connecting player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChooseInitialServer {
    pub player_id: PlayerId,
    /// The proxy's choice; hooks may replace it.
    pub initial_server: Option<ServerName>,
}

impl ChooseInitialServer {
    pub fn new(player_id: PlayerId, initial_server: Option<ServerName>) -> Self {
        Self {
            player_id,
            initial_server,
        }
    }
}

/// Fire-and-forget request to move a player after login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionRequest {
    pub player_id: PlayerId,
    pub target: ServerName,
}

/// Routes players to their default server on connect.
pub struct ConnectionHooks {
    engine: Arc<RoutingDecisionEngine>,
    directory: Arc<dyn ServerDirectory>,
}

impl ConnectionHooks {
    pub fn new(engine: Arc<RoutingDecisionEngine>, directory: Arc<dyn ServerDirectory>) -> Self {
        Self { engine, directory }
    }

    async fn resolve(&self, player_id: &PlayerId) -> Option<ServerName> {
        let server = self.engine.decide_destination(player_id).await?;
        if self.directory.contains(&server) {
            Some(server)
        } else {
            debug!(player_id = %player_id, server = %server, "default server is not registered on the proxy");
            None
        }
    }

    /// Replace the proxy's initial server with the player's default, if any.
    pub async fn on_choose_initial_server(&self, event: &mut ChooseInitialServer) {
        if let Some(server) = self.resolve(&event.player_id).await {
            event.initial_server = Some(server);
        }
    }

    /// Connection request towards the player's default after login, if any.
    pub async fn on_post_login(&self, player_id: &PlayerId) -> Option<ConnectionRequest> {
        self.resolve(player_id)
            .await
            .map(|target| ConnectionRequest {
                player_id: *player_id,
                target,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use defaultserver_policy::{InlinePolicySource, RoutingPolicy};
    use defaultserver_storage::memory::InMemoryPreferenceStore;

    fn name(s: &str) -> ServerName {
        ServerName::new(s).unwrap()
    }

    async fn hooks_with_default(
        server: &str,
        registered: &[&str],
    ) -> (ConnectionHooks, PlayerId) {
        let (policy, _) =
            RoutingPolicy::load(&InlinePolicySource::new("allowed-servers: [lobby, survival]"));
        let engine = Arc::new(RoutingDecisionEngine::new(
            Arc::new(InMemoryPreferenceStore::new()),
            Arc::new(policy),
        ));
        let player = PlayerId::generate();
        engine.request_set_preference(&player, server).await.unwrap();

        let directory = RegisteredServers::new(registered.iter().map(|s| name(s)));
        (ConnectionHooks::new(engine, Arc::new(directory)), player)
    }

    #[tokio::test]
    async fn initial_server_is_replaced_by_default() {
        let (hooks, player) = hooks_with_default("survival", &["lobby", "survival"]).await;
        let mut event = ChooseInitialServer::new(player, Some(name("lobby")));

        hooks.on_choose_initial_server(&mut event).await;

        assert_eq!(event.initial_server, Some(name("survival")));
    }

    #[tokio::test]
    async fn no_opinion_leaves_proxy_choice() {
        let (hooks, _) = hooks_with_default("survival", &["lobby", "survival"]).await;
        let mut event = ChooseInitialServer::new(PlayerId::generate(), Some(name("lobby")));

        hooks.on_choose_initial_server(&mut event).await;

        assert_eq!(event.initial_server, Some(name("lobby")));
    }

    #[tokio::test]
    async fn unregistered_default_is_ignored() {
        let (hooks, player) = hooks_with_default("survival", &["lobby"]).await;
        let mut event = ChooseInitialServer::new(player, None);

        hooks.on_choose_initial_server(&mut event).await;
        assert_eq!(event.initial_server, None);
        assert_eq!(hooks.on_post_login(&player).await, None);
    }

    #[tokio::test]
    async fn post_login_requests_connection() {
        let (hooks, player) = hooks_with_default("lobby", &["lobby"]).await;
        assert_eq!(
            hooks.on_post_login(&player).await,
            Some(ConnectionRequest {
                player_id: player,
                target: name("lobby"),
            })
        );
    }

    #[test]
    fn closures_act_as_directories() {
        let any = |_: &ServerName| true;
        assert!(ServerDirectory::contains(&any, &name("whatever")));

        let registered = RegisteredServers::default();
        registered.register(name("hub"));
        assert!(registered.contains(&name("hub")));
        assert!(registered.unregister(&name("hub")));
        assert!(!registered.contains(&name("hub")));
    }
}
