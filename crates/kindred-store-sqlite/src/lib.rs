//! SQLite backend for the Kindred swipe ledger.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread pool without blocking the async runtime. The single connection
//! thread also serialises writes, so the record-decision-then-resolve-match
//! sequence in [`SqliteStore`] is atomic with respect to racing swipes.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
