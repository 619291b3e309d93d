//! Shared types for per-player default server routing.
//!
//! - [`PlayerId`]: opaque identity of a connecting player, used only as a
//!   lookup key
//! - [`ServerName`]: name of a backend server a player may be routed to

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]
#![warn(rust_2018_idioms)]

mod error;
mod ids;

pub use error::{TypesError, TypesResult};
pub use ids::{PlayerId, ServerName};
