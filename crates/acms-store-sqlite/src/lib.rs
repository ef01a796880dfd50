//! SQLite backend for the ACMS complaint store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Tracking IDs are assigned here, under a
//! `UNIQUE` constraint, with a fresh draw on every conflict.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::{DEFAULT_MAX_TRACKING_ATTEMPTS, SqliteStore};

#[cfg(test)]
mod tests;
