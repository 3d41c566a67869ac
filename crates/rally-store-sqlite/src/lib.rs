//! SQLite backend for Rally.
//!
//! Documents of every kind share one table and are stored as JSON bodies,
//! which keeps the backend agnostic of individual document shapes.
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
