//! # Persistence Coordinator
//!
//! The single storage contract the presentation layer talks to. It combines a
//! [`LocalStore`] and a [`RemoteStore`] under a fixed policy:
//!
//! ## Reads
//!
//! The remote is asked first. If it answers, its answer is returned as-is,
//! even when empty: the remote is authoritative whenever it is reachable. If
//! it is absent (unconfigured, disconnected or failing) the local store
//! answers instead. The local store degrades to defaults on its own, so a read
//! never fails.
//!
//! ## Writes
//!
//! 1. The remote write is attempted and allowed to finish, success or not.
//! 2. The local write always runs afterwards.
//! 3. The local result decides `success`; the remote result is only reported
//!    as `synced`.
//!
//! Every write reported as successful is therefore on disk, with or without
//! a network. Writes to the same note id are serialized; writes to different
//! notes run concurrently. Folder replaces are whole-collection and
//! last-writer-wins.
//!
//! ## Generic Over Stores
//!
//! `Coordinator<L, R>` is generic over both stores:
//! - Production: `Coordinator<FileStore, MongoRemote>`
//! - Testing: `Coordinator<InMemoryStore, InMemoryRemote>`, or
//!   `OfflineRemote` for the no-remote case.

use crate::config::Settings;
use crate::error::{RainyError, Result};
use crate::model::{validate_note_id, Folder, Note};
use crate::remote::RemoteStore;
use crate::store::LocalStore;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, info, warn};

/// Result of a write as reported to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteOutcome {
    /// The local durable copy was written.
    pub success: bool,
    /// The remote mirror accepted the write too.
    pub synced: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WriteOutcome {
    fn from_local(local: Result<()>, synced: bool) -> Self {
        match local {
            Ok(()) => Self {
                success: true,
                synced,
                error: None,
            },
            Err(e) => {
                warn!(error = %e, synced, "local write failed");
                Self {
                    success: false,
                    synced,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    fn rejected(error: RainyError) -> Self {
        Self {
            success: false,
            synced: false,
            error: Some(error.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsView {
    pub remote_uri: String,
    pub is_connected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteUriOutcome {
    /// The new URI was persisted.
    pub success: bool,
    /// Connectivity right after applying the new URI.
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

type NoteLock = Arc<tokio::sync::Mutex<()>>;
type NoteLocks = Mutex<HashMap<String, NoteLock>>;

/// Exclusive hold on one note id. Dropping it releases the id and removes the
/// map entry once nobody else holds or waits for it.
struct NoteLockGuard<'a> {
    locks: &'a NoteLocks,
    id: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for NoteLockGuard<'_> {
    fn drop(&mut self) {
        let mut locks = self.locks.lock().unwrap_or_else(|p| p.into_inner());
        self.guard.take();
        if locks
            .get(&self.id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.id);
        }
    }
}

pub struct Coordinator<L: LocalStore, R: RemoteStore> {
    local: L,
    remote: R,
    note_locks: NoteLocks,
}

impl<L: LocalStore, R: RemoteStore> Coordinator<L, R> {
    pub fn new(local: L, remote: R) -> Self {
        Self {
            local,
            remote,
            note_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn local(&self) -> &L {
        &self.local
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Prepare the local store. Must succeed before anything else is called.
    pub async fn initialize(&self) -> Result<()> {
        self.local.initialize().await
    }

    /// Connect using the URI saved in settings, if there is one.
    pub async fn connect_saved_remote(&self) -> bool {
        match self.load_settings().await.remote_uri() {
            Some(uri) => self.remote.connect(uri).await,
            None => false,
        }
    }

    async fn load_settings(&self) -> Settings {
        self.local.read_settings().await.unwrap_or_else(|e| {
            warn!(error = %e, "settings unreadable, assuming no remote");
            Settings::default()
        })
    }

    async fn lock_note(&self, id: &str) -> NoteLockGuard<'_> {
        let lock = {
            let mut locks = self.note_locks.lock().unwrap_or_else(|p| p.into_inner());
            locks.entry(id.to_string()).or_default().clone()
        };
        let guard = lock.lock_owned().await;
        NoteLockGuard {
            locks: &self.note_locks,
            id: id.to_string(),
            guard: Some(guard),
        }
    }

    pub async fn get_folders(&self) -> Vec<Folder> {
        if let Some(folders) = self.remote.get_folders().await {
            debug!(count = folders.len(), "folders served by remote");
            return folders;
        }
        self.local.list_folders().await
    }

    pub async fn get_notes(&self) -> Vec<Note> {
        if let Some(notes) = self.remote.get_notes().await {
            debug!(count = notes.len(), "notes served by remote");
            return notes;
        }
        self.local.list_notes().await.unwrap_or_else(|e| {
            warn!(error = %e, "local notes unreadable, returning none");
            Vec::new()
        })
    }

    pub async fn save_folders(&self, folders: &[Folder]) -> WriteOutcome {
        let synced = self.remote.replace_folders(folders).await;
        let local = self.local.replace_folders(folders).await;
        WriteOutcome::from_local(local, synced)
    }

    pub async fn save_note(&self, note: &Note) -> WriteOutcome {
        if let Err(e) = validate_note_id(&note.id) {
            return WriteOutcome::rejected(e);
        }
        let _guard = self.lock_note(&note.id).await;

        let synced = self.remote.upsert_note(note).await;
        let local = self.local.upsert_note(note).await;
        WriteOutcome::from_local(local, synced)
    }

    pub async fn delete_note(&self, id: &str) -> WriteOutcome {
        if let Err(e) = validate_note_id(id) {
            return WriteOutcome::rejected(e);
        }
        let _guard = self.lock_note(id).await;

        let synced = self.remote.delete_note(id).await;
        let local = self.local.delete_note(id).await;
        WriteOutcome::from_local(local, synced)
    }

    pub async fn get_settings(&self) -> SettingsView {
        SettingsView {
            remote_uri: self.load_settings().await.mongo_db_uri,
            is_connected: self.remote.is_connected(),
        }
    }

    /// Persist a new connection string, then reconnect with it (or disconnect
    /// if it is blank) before returning.
    pub async fn save_remote_uri(&self, uri: &str) -> RemoteUriOutcome {
        let uri = uri.trim();
        let mut settings = self.load_settings().await;
        settings.mongo_db_uri = uri.to_string();

        if let Err(e) = self.local.write_settings(&settings).await {
            warn!(error = %e, "failed to save settings");
            return RemoteUriOutcome {
                success: false,
                connected: self.remote.is_connected(),
                error: Some(e.to_string()),
            };
        }

        let connected = if uri.is_empty() {
            self.remote.disconnect().await;
            info!("remote store cleared");
            false
        } else {
            self.remote.connect(uri).await
        };
        RemoteUriOutcome {
            success: true,
            connected,
            error: None,
        }
    }

    pub fn get_connection_status(&self) -> bool {
        self.remote.is_connected()
    }
}
