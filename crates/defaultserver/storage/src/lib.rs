//! Durable storage of per-player default server preferences.
//!
//! One preference per player: a later write for the same player fully
//! replaces the earlier one. The store records what was last requested, it
//! does not check the value against any allow-list.
//!
//! Backends:
//! - [`sqlite::SqlitePreferenceStore`]: embedded single-file database, the
//!   production backend
//! - [`memory::InMemoryPreferenceStore`]: process-local map for tests and
//!   ephemeral hosts

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]
#![warn(rust_2018_idioms)]

mod error;
pub mod memory;
mod model;
#[cfg(feature = "sqlite")]
pub mod sqlite;
mod traits;

pub use error::{StorageError, StorageResult};
pub use model::Preference;
pub use traits::PreferenceStore;
