//! SQLite backend for the CAUSW platform.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Because every call is serialised on
//! that thread, and locker transitions additionally run inside a
//! transaction, the compare-and-set contract of
//! [`LockerPort::commit_transition`](causw_core::store::LockerPort::commit_transition)
//! holds without further locking.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
