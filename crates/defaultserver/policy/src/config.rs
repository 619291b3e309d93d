//! Typed policy document.

use crate::{ConfigError, ConfigResult};
use defaultserver_types::ServerName;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Document key holding the allow-list.
pub const ALLOWED_SERVERS_KEY: &str = "allowed-servers";

/// Parsed policy document.
///
/// `allowed-servers` is the only recognized key. Everything else is kept
/// verbatim in `extra` and exposed as snapshot properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PolicyConfig {
    /// Servers players may choose, in document order.
    #[serde(default)]
    pub allowed_servers: Vec<ServerName>,

    /// Unrecognized keys.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl PolicyConfig {
    /// Parse a YAML document. An empty or comment-only document is an empty
    /// config.
    pub fn from_yaml_str(text: &str, origin: &str) -> ConfigResult<Self> {
        let parse_err = |e: serde_yaml::Error| ConfigError::Parse {
            origin: origin.to_string(),
            message: e.to_string(),
        };

        let value: serde_yaml::Value = serde_yaml::from_str(text).map_err(parse_err)?;
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_yaml::from_value(value).map_err(parse_err)
    }

    /// Allow-list with duplicates removed, first occurrence wins.
    pub fn deduplicated_servers(&self) -> Vec<ServerName> {
        let mut seen = std::collections::HashSet::new();
        self.allowed_servers
            .iter()
            .filter(|name| seen.insert(name.as_str()))
            .cloned()
            .collect()
    }
}
