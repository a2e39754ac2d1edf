use super::LocalStore;
use crate::config::Settings;
use crate::error::{RainyError, Result};
use crate::model::{default_folders, validate_note_id, Folder, Note};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

const FOLDERS_FILENAME: &str = "folders.json";
const NOTES_DIRNAME: &str = "notes";
const NOTE_EXT: &str = "json";

/// File-backed local store rooted at a data directory.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn folders_path(&self) -> PathBuf {
        self.root.join(FOLDERS_FILENAME)
    }

    pub fn notes_dir(&self) -> PathBuf {
        self.root.join(NOTES_DIRNAME)
    }

    pub fn note_path(&self, id: &str) -> Result<PathBuf> {
        validate_note_id(id)?;
        Ok(self.notes_dir().join(format!("{}.{}", id, NOTE_EXT)))
    }

    async fn read_folders(&self) -> Result<Vec<Folder>> {
        let content = fs::read_to_string(self.folders_path())
            .await
            .map_err(RainyError::Io)?;
        let folders: Vec<Folder> =
            serde_json::from_str(&content).map_err(RainyError::Serialization)?;
        Ok(folders)
    }

    async fn read_note(path: &Path) -> Result<Note> {
        let content = fs::read_to_string(path).await.map_err(RainyError::Io)?;
        let note: Note = serde_json::from_str(&content).map_err(RainyError::Serialization)?;
        Ok(note)
    }
}

fn is_note_file(path: &Path) -> bool {
    let hidden = path
        .file_name()
        .and_then(|n| n.to_str())
        .map_or(true, |n| n.starts_with('.'));
    !hidden && path.extension().and_then(|e| e.to_str()) == Some(NOTE_EXT)
}

async fn ensure_dir(path: &Path) -> Result<()> {
    if !fs::try_exists(path).await.unwrap_or(false) {
        fs::create_dir_all(path).await.map_err(RainyError::Io)?;
    }
    Ok(())
}

/// Write to a hidden temp file next to `target`, then rename over it.
pub(crate) async fn write_atomic(target: &Path, content: String) -> Result<()> {
    let dir = target
        .parent()
        .ok_or_else(|| RainyError::Store(format!("No parent for {}", target.display())))?;
    ensure_dir(dir).await?;

    let tmp_path = dir.join(format!(".write-{}.tmp", Uuid::new_v4()));
    fs::write(&tmp_path, content).await.map_err(RainyError::Io)?;
    if let Err(e) = fs::rename(&tmp_path, target).await {
        if let Err(cleanup) = fs::remove_file(&tmp_path).await {
            warn!(path = %tmp_path.display(), error = %cleanup, "failed to remove temp file");
        }
        return Err(RainyError::Io(e));
    }
    Ok(())
}

#[async_trait]
impl LocalStore for FileStore {
    async fn initialize(&self) -> Result<()> {
        ensure_dir(&self.root).await?;
        ensure_dir(&self.notes_dir()).await?;

        let folders_path = self.folders_path();
        if !fs::try_exists(&folders_path).await.map_err(RainyError::Io)? {
            debug!(path = %folders_path.display(), "seeding folder manifest");
            let content = serde_json::to_string_pretty(&default_folders())
                .map_err(RainyError::Serialization)?;
            write_atomic(&folders_path, content).await?;
        }
        Ok(())
    }

    async fn list_folders(&self) -> Vec<Folder> {
        match self.read_folders().await {
            Ok(folders) => folders,
            Err(e) => {
                warn!(error = %e, "folder manifest unreadable, using default folders");
                default_folders()
            }
        }
    }

    async fn replace_folders(&self, folders: &[Folder]) -> Result<()> {
        let content = serde_json::to_string_pretty(folders).map_err(RainyError::Serialization)?;
        write_atomic(&self.folders_path(), content).await?;
        debug!(count = folders.len(), "replaced local folders");
        Ok(())
    }

    async fn list_notes(&self) -> Result<Vec<Note>> {
        let dir = self.notes_dir();
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(RainyError::Io(e)),
        };

        let mut notes = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(RainyError::Io)? {
            let path = entry.path();
            if !is_note_file(&path) {
                continue;
            }
            match Self::read_note(&path).await {
                Ok(note) => notes.push(note),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable note file");
                }
            }
        }
        Ok(notes)
    }

    async fn upsert_note(&self, note: &Note) -> Result<()> {
        let path = self.note_path(&note.id)?;
        let content = serde_json::to_string_pretty(note).map_err(RainyError::Serialization)?;
        write_atomic(&path, content).await?;
        debug!(id = %note.id, "wrote local note");
        Ok(())
    }

    async fn delete_note(&self, id: &str) -> Result<()> {
        let path = self.note_path(id)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(id, "deleted local note");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(RainyError::Io(e)),
        }
    }

    async fn read_settings(&self) -> Result<Settings> {
        Settings::load(&self.root).await
    }

    async fn write_settings(&self, settings: &Settings) -> Result<()> {
        settings.save(&self.root).await
    }
}
