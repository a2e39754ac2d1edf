//! # Local Store
//!
//! Durable, always-available persistence for notes and folders. The local
//! store is the source of truth whenever the remote mirror is absent or
//! unreachable, and its write result is what the coordinator reports as
//! overall success.
//!
//! ## Implementations
//!
//! - [`fs::FileStore`]: production store, one JSON file per note.
//! - [`memory::InMemoryStore`]: for exercising coordinator and cache logic
//!   without touching the filesystem. Can simulate write failures.
//!
//! ## Storage Layout
//!
//! ```text
//! rainy-data/
//! ├── folders.json        # Whole folder collection (JSON array)
//! ├── settings.json       # Remote connection string
//! └── notes/
//!     └── {id}.json       # One pretty-printed note per file
//! ```
//!
//! ## Failure Semantics
//!
//! - `list_folders` never fails: unreadable or corrupt manifests degrade to
//!   the default root folder.
//! - `list_notes` skips individual corrupt note files and keeps going. Only a
//!   failure to enumerate the notes directory itself is an error.
//! - `delete_note` of an id that does not exist succeeds.
//! - Writes are atomic: readers see the old file or the new one, never a
//!   partial write.

use crate::config::Settings;
use crate::error::Result;
use crate::model::{Folder, Note};
use async_trait::async_trait;

pub mod fs;
pub mod memory;

/// Abstract interface for the local durable store.
#[async_trait]
pub trait LocalStore: Send + Sync {
    /// Create the storage area and seed the folder manifest with the root
    /// folder if it does not exist yet. Safe to call on every startup.
    async fn initialize(&self) -> Result<()>;

    /// All folders, or the default root folder if the manifest can't be read.
    async fn list_folders(&self) -> Vec<Folder>;

    /// Overwrite the whole folder collection.
    async fn replace_folders(&self, folders: &[Folder]) -> Result<()>;

    /// All notes that could be parsed.
    async fn list_notes(&self) -> Result<Vec<Note>>;

    /// Create or overwrite the note keyed by `note.id`.
    async fn upsert_note(&self, note: &Note) -> Result<()>;

    /// Remove the note keyed by `id`. Absence is not an error.
    async fn delete_note(&self, id: &str) -> Result<()>;

    async fn read_settings(&self) -> Result<Settings>;

    async fn write_settings(&self, settings: &Settings) -> Result<()>;
}
