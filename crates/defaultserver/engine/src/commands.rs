//! Player and operator commands.
//!
//! Parsing and reply text live here; the proxy's command layer only forwards
//! the sender and raw arguments.

use crate::engine::{Rejected, RoutingDecisionEngine};
use defaultserver_policy::{PolicySource, RoutingPolicy};
use defaultserver_types::{PlayerId, ServerName};
use std::fmt;
use std::sync::Arc;

/// Who issued a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandSource {
    Player(PlayerId),
    Console,
}

/// Text sent back to the command source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReply(String);

impl CommandReply {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn text(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommandReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `/defaultserver <server>`
pub struct DefaultServerCommand {
    engine: Arc<RoutingDecisionEngine>,
}

impl DefaultServerCommand {
    pub const NAME: &'static str = "defaultserver";

    pub fn new(engine: Arc<RoutingDecisionEngine>) -> Self {
        Self { engine }
    }

    pub async fn execute(&self, source: &CommandSource, args: &[&str]) -> CommandReply {
        let CommandSource::Player(player_id) = source else {
            return CommandReply::new("This command can only be used by players.");
        };

        let [server] = args else {
            return CommandReply::new(format!("Usage: /{} <server>", Self::NAME));
        };

        match self.engine.request_set_preference(player_id, server).await {
            Ok(accepted) => CommandReply::new(format!(
                "Your default server has been set to {}",
                accepted.server
            )),
            Err(Rejected::NotAllowed { requested }) => {
                CommandReply::new(format!("The server '{requested}' is not allowed."))
            }
            Err(Rejected::NotConfirmed(_)) => CommandReply::new(
                "Could not save your default server, please try again later.",
            ),
        }
    }

    /// Completion candidates: the current allow-list.
    pub fn suggest(&self) -> Vec<ServerName> {
        self.engine.suggest_destinations()
    }
}

/// `/reloadserver`
pub struct ReloadCommand {
    policy: Arc<RoutingPolicy>,
    source: Arc<dyn PolicySource>,
}

impl ReloadCommand {
    pub const NAME: &'static str = "reloadserver";

    pub fn new(policy: Arc<RoutingPolicy>, source: Arc<dyn PolicySource>) -> Self {
        Self { policy, source }
    }

    pub fn execute(&self) -> CommandReply {
        let report = self.policy.reload(self.source.as_ref());
        match report.error {
            None => CommandReply::new(format!(
                "Configuration reloaded, {} allowed server(s).",
                report.snapshot.allowed_servers().len()
            )),
            Some(e) => CommandReply::new(format!(
                "Configuration could not be loaded, no servers are allowed: {e}"
            )),
        }
    }
}
