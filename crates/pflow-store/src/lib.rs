//! Durable session storage for the project-flow client.
//!
//! This crate owns the authenticated-session value and keeps it mirrored to
//! durable storage so that a restarted client resumes in the same
//! authorization state.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐   ┌──────────────────┐   ┌──────────────────┐
//! │   AuthGateway    │   │ RequestPipeline  │   │   RouteGuard     │
//! └────────┬─────────┘   └────────┬─────────┘   └────────┬─────────┘
//!          │ set / clear          │ token / clear        │ read
//!          └──────────────┬───────┴──────────────────────┘
//!                ┌────────▼─────────┐
//!                │   SessionStore   │  in-memory Session + generation
//!                └────────┬─────────┘
//!                         │ SessionStorage (trait)
//!             ┌───────────┴────────────┐
//!    ┌────────▼─────────┐     ┌────────▼─────────┐
//!    │   RocksStorage   │     │  MemoryStorage   │
//!    └──────────────────┘     └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use pflow_core::{roles, Role, User};
//! use pflow_store::{RocksStorage, SessionStore};
//!
//! let storage = Arc::new(RocksStorage::open("/tmp/pflow-session").unwrap());
//! let store = SessionStore::load(storage);
//!
//! let user = User {
//!     role: Some(Role::new(roles::ADMIN, "Administrator")),
//!     ..User::default()
//! };
//! store.set("abc", user).unwrap();
//! assert!(store.has_role(&[roles::ADMIN]));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod keys;
pub mod memory;
pub mod rocks;
pub mod session;

pub use error::{Result, StoreError};
pub use memory::MemoryStorage;
pub use rocks::RocksStorage;
pub use session::SessionStore;

/// Narrow durable key/value interface behind [`SessionStore`].
///
/// Implementations must apply each batch atomically: after a crash either
/// every entry of a batch is visible or none is.
pub trait SessionStorage: Send + Sync {
    /// Read a single value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write every entry in one atomic batch.
    ///
    /// # Errors
    ///
    /// Returns an error if the batch could not be made durable.
    fn put_batch(&self, entries: &[(&str, &str)]) -> Result<()>;

    /// Remove every key in one atomic batch. Removing an absent key is not
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the batch could not be made durable.
    fn remove_batch(&self, keys: &[&str]) -> Result<()>;
}
