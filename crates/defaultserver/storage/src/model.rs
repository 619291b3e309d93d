use defaultserver_types::{PlayerId, ServerName};

/// A stored preference: the server a player last asked to join by default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preference {
    pub player_id: PlayerId,
    pub server: ServerName,
}

impl Preference {
    pub fn new(player_id: PlayerId, server: ServerName) -> Self {
        Self { player_id, server }
    }
}
