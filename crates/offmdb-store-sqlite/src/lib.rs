//! SQLite backend for the offline title catalog.
//!
//! Wraps [`tokio_rusqlite`] so all database access, including the long
//! ingest loops, runs on a dedicated thread without blocking the async
//! runtime.

mod encode;
mod ingest;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
