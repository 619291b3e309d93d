//! Wiring of store, policy, engine, hooks and commands.

use crate::config::AppConfig;
use crate::error::AppResult;
use defaultserver_engine::{
    ConnectionHooks, DefaultServerCommand, RegisteredServers, ReloadCommand,
    RoutingDecisionEngine, ServerDirectory,
};
use defaultserver_policy::{FilePolicySource, PolicySource, RoutingPolicy};
use defaultserver_storage::sqlite::SqlitePreferenceStore;
use defaultserver_types::ServerName;
use std::sync::Arc;
use tracing::{info, warn};

/// Everything a running host holds for its lifetime.
pub struct App {
    store: Arc<SqlitePreferenceStore>,
    pub policy: Arc<RoutingPolicy>,
    pub engine: Arc<RoutingDecisionEngine>,
    pub hooks: ConnectionHooks,
    pub default_server: DefaultServerCommand,
    pub reload: ReloadCommand,
}

impl App {
    /// Open the store, load the first policy snapshot and wire everything.
    pub async fn bootstrap(config: &AppConfig) -> AppResult<Self> {
        let store = Arc::new(SqlitePreferenceStore::connect(config.sqlite()).await?);

        let source: Arc<dyn PolicySource> = Arc::new(FilePolicySource::new(config.policy_path()));
        let (policy, report) = RoutingPolicy::load(source.as_ref());
        if report.is_ok() {
            info!(
                allowed_servers = ?report.snapshot.allowed_servers(),
                "default server routing enabled"
            );
        } else {
            warn!("starting with an empty allow-list");
        }
        let policy = Arc::new(policy);

        let engine = Arc::new(RoutingDecisionEngine::new(store.clone(), policy.clone()));
        let hooks = ConnectionHooks::new(engine.clone(), directory(&config.proxy.registered_servers)?);

        Ok(Self {
            store,
            default_server: DefaultServerCommand::new(engine.clone()),
            reload: ReloadCommand::new(policy.clone(), source),
            policy,
            engine,
            hooks,
        })
    }

    /// Close the database pool.
    pub async fn shutdown(&self) {
        self.store.close().await;
    }
}

fn directory(registered: &[String]) -> AppResult<Arc<dyn ServerDirectory>> {
    if registered.is_empty() {
        return Ok(Arc::new(|_: &ServerName| true));
    }
    let servers = registered
        .iter()
        .map(|name| ServerName::new(name.as_str()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Arc::new(RegisteredServers::new(servers)))
}
