use super::LocalStore;
use crate::config::Settings;
use crate::error::{RainyError, Result};
use crate::model::{default_folders, validate_note_id, Folder, Note};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// In-memory local store for tests.
///
/// Starts uninitialized, like an empty data directory: `list_folders` returns
/// the default folders until `initialize` or `replace_folders` runs.
#[derive(Default)]
pub struct InMemoryStore {
    folders: Mutex<Option<Vec<Folder>>>,
    notes: Mutex<BTreeMap<String, Note>>,
    settings: Mutex<Settings>,
    simulate_write_error: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail, as a full or read-only disk would.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.store(simulate, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<()> {
        if self.simulate_write_error.load(Ordering::SeqCst) {
            return Err(RainyError::Store("Simulated write error".to_string()));
        }
        Ok(())
    }

    fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
        mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl LocalStore for InMemoryStore {
    async fn initialize(&self) -> Result<()> {
        let mut folders = Self::lock(&self.folders);
        if folders.is_none() {
            *folders = Some(default_folders());
        }
        Ok(())
    }

    async fn list_folders(&self) -> Vec<Folder> {
        Self::lock(&self.folders)
            .clone()
            .unwrap_or_else(default_folders)
    }

    async fn replace_folders(&self, folders: &[Folder]) -> Result<()> {
        self.check_writable()?;
        *Self::lock(&self.folders) = Some(folders.to_vec());
        Ok(())
    }

    async fn list_notes(&self) -> Result<Vec<Note>> {
        Ok(Self::lock(&self.notes).values().cloned().collect())
    }

    async fn upsert_note(&self, note: &Note) -> Result<()> {
        validate_note_id(&note.id)?;
        self.check_writable()?;
        Self::lock(&self.notes).insert(note.id.clone(), note.clone());
        Ok(())
    }

    async fn delete_note(&self, id: &str) -> Result<()> {
        validate_note_id(id)?;
        self.check_writable()?;
        Self::lock(&self.notes).remove(id);
        Ok(())
    }

    async fn read_settings(&self) -> Result<Settings> {
        Ok(Self::lock(&self.settings).clone())
    }

    async fn write_settings(&self, settings: &Settings) -> Result<()> {
        self.check_writable()?;
        *Self::lock(&self.settings) = settings.clone();
        Ok(())
    }
}
