//! # Default Server Engine
//!
//! Decides where a connecting player should be routed, and records new
//! default server requests after checking them against the allow-list.
//!
//! ## Key Components
//!
//! - [`RoutingDecisionEngine`]: combines the preference store and the live
//!   policy
//! - [`ConnectionHooks`]: adapts decisions to the proxy's initial placement
//!   and post-login events
//! - [`DefaultServerCommand`], [`ReloadCommand`]: player and operator
//!   commands with their reply text
//!
//! Failures never escape into the connection path: a store read error means
//! "no opinion" and the proxy keeps its own default.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]
#![warn(rust_2018_idioms)]

pub mod commands;
pub mod engine;
pub mod hooks;

pub use commands::{CommandReply, CommandSource, DefaultServerCommand, ReloadCommand};
pub use engine::{Accepted, Rejected, RoutingDecisionEngine};
pub use hooks::{
    ChooseInitialServer, ConnectionHooks, ConnectionRequest, RegisteredServers, ServerDirectory,
};
