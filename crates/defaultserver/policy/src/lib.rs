//! # Default Server Policy
//!
//! Holds the allow-list of servers players may pick as their default, plus
//! any other named properties from the policy document.
//!
//! ## Key Components
//!
//! - [`PolicyConfig`]: typed policy document (`allowed-servers` plus open
//!   extension keys)
//! - [`PolicySource`]: where a document comes from ([`FilePolicySource`],
//!   [`InlinePolicySource`])
//! - [`PolicySnapshot`]: immutable view of one loaded document
//! - [`RoutingPolicy`]: the live snapshot, replaced atomically on reload
//!
//! ## Reload semantics
//!
//! A reload always publishes a complete new snapshot. When the source cannot
//! be read or parsed the published snapshot is empty, so no server is
//! allowed until a later reload succeeds:
//!
//! ```rust
//! use defaultserver_policy::{InlinePolicySource, RoutingPolicy};
//!
//! let policy = RoutingPolicy::empty();
//! policy.reload(&InlinePolicySource::new("allowed-servers: [lobby]"));
//! assert!(policy.is_allowed("lobby"));
//!
//! let report = policy.reload(&InlinePolicySource::new("allowed-servers: {"));
//! assert!(report.error.is_some());
//! assert!(!policy.is_allowed("lobby"));
//! ```

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]
#![warn(rust_2018_idioms)]

pub mod config;
pub mod error;
pub mod policy;
pub mod snapshot;
pub mod source;

pub use config::{PolicyConfig, ALLOWED_SERVERS_KEY};
pub use error::{ConfigError, ConfigResult};
pub use policy::{ReloadReport, RoutingPolicy};
pub use snapshot::{PolicySnapshot, SnapshotOrigin};
pub use source::{FilePolicySource, InlinePolicySource, PolicySource, BUNDLED_DEFAULT, POLICY_FILE_NAME};
