//! # Remote Store Adapter
//!
//! Optional mirror of the local store in a remote document database. Every
//! adapter exposes the same logical operations as the local store but never
//! returns errors:
//!
//! - reads return `Some(items)` when the remote answered (possibly with zero
//!   items) and `None` when it is unconfigured, disconnected or the query
//!   failed. `None` tells the coordinator to fall back to the local store.
//! - writes return `true` on success and `false` on any failure.
//!
//! ## Connection Lifecycle
//!
//! ```text
//! Disconnected ──connect()──▶ Connecting ──ok──▶ Connected
//!      ▲                          │                  │
//!      └──────────failed──────────┘                  │
//!      └──────────disconnect() / connect() ──────────┘
//! ```
//!
//! At most one connection is live: `connect` closes the previous one before
//! opening another. There is no reconnect loop. A connection that drops is
//! only noticed when the next operation fails.
//!
//! ## Implementations
//!
//! - [`mongo::MongoRemote`]: the production MongoDB mirror.
//! - [`offline::OfflineRemote`]: never connects. For builds or tests with no
//!   remote at all.
//! - [`memory::InMemoryRemote`]: a fake with a switchable network, for tests.

use crate::model::{Folder, Note};
use async_trait::async_trait;
use std::time::Duration;

pub mod memory;
pub mod mongo;
pub mod offline;

/// Bound on server selection and on opening the connection.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
pub const NOTES_COLLECTION: &str = "notes";
pub const FOLDERS_COLLECTION: &str = "folders";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Replace any current connection with a new one to `uri`. Ensures the
    /// `notes` and `folders` collections exist and seeds `folders` with the
    /// root folder if it is empty. Returns whether the connection is live.
    async fn connect(&self, uri: &str) -> bool;

    /// Drop the current connection, if any.
    async fn disconnect(&self);

    fn state(&self) -> ConnectionState;

    fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    async fn get_notes(&self) -> Option<Vec<Note>>;

    /// Upsert keyed by `note.id`.
    async fn upsert_note(&self, note: &Note) -> bool;

    async fn delete_note(&self, id: &str) -> bool;

    async fn get_folders(&self) -> Option<Vec<Folder>>;

    /// Clear the remote folder collection, then insert `folders`. Not
    /// transactional: a failure in between leaves the remote collection empty.
    async fn replace_folders(&self, folders: &[Folder]) -> bool;
}
