//! Identity and destination newtypes.

use crate::{TypesError, TypesResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier of a connecting player.
///
/// Rendered as the canonical hyphenated UUID form, which is also the
/// persisted key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(Uuid);

impl PlayerId {
    /// Generate a fresh random identity.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl FromStr for PlayerId {
    type Err = TypesError;

    fn from_str(s: &str) -> TypesResult<Self> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|e| TypesError::InvalidPlayerId {
                input: s.to_string(),
                reason: e.to_string(),
            })
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Name of a routable backend server.
///
/// Never empty or all whitespace. Kept verbatim, surrounding whitespace
/// included, and compared exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ServerName(String);

impl ServerName {
    pub fn new(name: impl Into<String>) -> TypesResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(TypesError::InvalidServerName(
                "server name must not be empty".to_string(),
            ));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ServerName {
    type Error = TypesError;

    fn try_from(value: String) -> TypesResult<Self> {
        Self::new(value)
    }
}

impl FromStr for ServerName {
    type Err = TypesError;

    fn from_str(s: &str) -> TypesResult<Self> {
        Self::new(s)
    }
}

impl From<ServerName> for String {
    fn from(name: ServerName) -> Self {
        name.0
    }
}

impl AsRef<str> for ServerName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for ServerName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ServerName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for ServerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
