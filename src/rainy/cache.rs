//! # Application State Cache
//!
//! In-memory mirror of notes and folders for the presentation layer. Loaded
//! once with a combined read of both collections, then kept current by
//! applying each write locally after the coordinator reports success. A failed
//! write leaves the cache exactly as it was, so there is never anything to
//! roll back.

use crate::coordinator::{Coordinator, WriteOutcome};
use crate::error::{RainyError, Result};
use crate::folders;
use crate::model::{Folder, Note};
use crate::remote::RemoteStore;
use crate::store::LocalStore;
use std::sync::Arc;

/// Partial edit of a note. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct NoteUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub folder_id: Option<String>,
}

pub struct Workspace<L: LocalStore, R: RemoteStore> {
    coordinator: Arc<Coordinator<L, R>>,
    notes: Vec<Note>,
    folders: Vec<Folder>,
}

impl<L: LocalStore, R: RemoteStore> Workspace<L, R> {
    /// Fetch folders and notes concurrently and cache both.
    pub async fn load(coordinator: Arc<Coordinator<L, R>>) -> Self {
        let (folders, notes) = tokio::join!(coordinator.get_folders(), coordinator.get_notes());
        Self {
            coordinator,
            notes,
            folders,
        }
    }

    pub fn coordinator(&self) -> &Arc<Coordinator<L, R>> {
        &self.coordinator
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn folders(&self) -> &[Folder] {
        &self.folders
    }

    pub fn note(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    pub fn folder(&self, id: &str) -> Option<&Folder> {
        self.folders.iter().find(|f| f.id == id)
    }

    /// Notes filed under `folder_id`, most recently updated first.
    pub fn notes_in_folder(&self, folder_id: &str) -> Vec<&Note> {
        let mut notes: Vec<&Note> = self
            .notes
            .iter()
            .filter(|n| n.folder_id == folder_id)
            .collect();
        notes.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        notes
    }

    pub async fn save_note(&mut self, note: Note) -> WriteOutcome {
        let outcome = self.coordinator.save_note(&note).await;
        if outcome.success {
            match self.notes.iter_mut().find(|n| n.id == note.id) {
                Some(existing) => *existing = note,
                None => self.notes.push(note),
            }
        }
        outcome
    }

    pub async fn delete_note(&mut self, id: &str) -> WriteOutcome {
        let outcome = self.coordinator.delete_note(id).await;
        if outcome.success {
            self.notes.retain(|n| n.id != id);
        }
        outcome
    }

    pub async fn save_folders(&mut self, folders: Vec<Folder>) -> WriteOutcome {
        let outcome = self.coordinator.save_folders(&folders).await;
        if outcome.success {
            self.folders = folders;
        }
        outcome
    }

    /// Create an empty "Untitled Note" in `folder_id`, optionally pre-filled.
    pub async fn create_note(
        &mut self,
        folder_id: &str,
        title: Option<String>,
        content: Option<String>,
    ) -> (Note, WriteOutcome) {
        let mut note = Note::new(folder_id);
        if let Some(title) = title {
            note = note.with_title(title);
        }
        if let Some(content) = content {
            note = note.with_content(content);
        }
        let outcome = self.save_note(note.clone()).await;
        (note, outcome)
    }

    /// Apply `update` to a cached note and save it with a fresh `updated_at`.
    pub async fn update_note(&mut self, id: &str, update: NoteUpdate) -> Result<(Note, WriteOutcome)> {
        let mut note = self
            .note(id)
            .cloned()
            .ok_or_else(|| RainyError::NoteNotFound(id.to_string()))?;
        if let Some(title) = update.title {
            note.title = title;
        }
        if let Some(content) = update.content {
            note.content = content;
        }
        if let Some(folder_id) = update.folder_id {
            note.folder_id = folder_id;
        }
        note.touch();
        let outcome = self.save_note(note.clone()).await;
        Ok((note, outcome))
    }

    pub async fn create_folder(
        &mut self,
        name: Option<&str>,
        parent: Option<&str>,
    ) -> Result<(Folder, WriteOutcome)> {
        let (updated, folder) = folders::add(&self.folders, name, parent)?;
        let outcome = self.save_folders(updated).await;
        Ok((folder, outcome))
    }

    pub async fn rename_folder(&mut self, id: &str, name: &str) -> Result<WriteOutcome> {
        let updated = folders::rename(&self.folders, id, name)?;
        Ok(self.save_folders(updated).await)
    }

    /// Delete a folder and its descendants. Notes filed under them are kept.
    pub async fn delete_folder(&mut self, id: &str) -> Result<WriteOutcome> {
        let updated = folders::delete_subtree(&self.folders, id)?;
        Ok(self.save_folders(updated).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ROOT_FOLDER_ID;
    use crate::remote::offline::OfflineRemote;
    use crate::store::memory::InMemoryStore;

    async fn workspace() -> Workspace<InMemoryStore, OfflineRemote> {
        let coordinator = Arc::new(Coordinator::new(InMemoryStore::new(), OfflineRemote));
        coordinator.initialize().await.unwrap();
        Workspace::load(coordinator).await
    }

    #[tokio::test]
    async fn fresh_workspace_has_root_only() {
        let ws = workspace().await;
        assert_eq!(ws.folders(), &[Folder::root()]);
        assert!(ws.notes().is_empty());
    }

    #[tokio::test]
    async fn save_replaces_or_appends_by_id() {
        let mut ws = workspace().await;
        let (note, outcome) = ws.create_note(ROOT_FOLDER_ID, None, None).await;
        assert!(outcome.success);
        assert!(!outcome.synced);

        let update = NoteUpdate {
            title: Some("Groceries".into()),
            ..Default::default()
        };
        let (updated, _) = ws.update_note(&note.id, update).await.unwrap();
        assert_eq!(ws.notes().len(), 1);
        assert_eq!(ws.notes()[0].title, "Groceries");
        assert_eq!(updated.created_at, note.created_at);
        assert!(updated.updated_at >= note.updated_at);
    }

    #[tokio::test]
    async fn failed_write_leaves_cache_unchanged() {
        let mut ws = workspace().await;
        let (note, _) = ws.create_note(ROOT_FOLDER_ID, Some("Keep".into()), None).await;

        ws.coordinator().local().set_simulate_write_error(true);
        let (_, outcome) = ws.create_note(ROOT_FOLDER_ID, None, None).await;
        assert!(!outcome.success);
        assert!(!ws.delete_note(&note.id).await.success);
        assert!(ws.delete_folder(ROOT_FOLDER_ID).await.is_err());
        let (_, outcome) = ws.create_folder(Some("Nope"), None).await.unwrap();
        assert!(!outcome.success);

        assert_eq!(ws.notes().len(), 1);
        assert_eq!(ws.folders().len(), 1);
    }

    #[tokio::test]
    async fn delete_filters_by_id() {
        let mut ws = workspace().await;
        let (a, _) = ws.create_note(ROOT_FOLDER_ID, Some("A".into()), None).await;
        let (b, _) = ws.create_note(ROOT_FOLDER_ID, Some("B".into()), None).await;
        assert!(ws.delete_note(&a.id).await.success);
        assert_eq!(ws.notes().len(), 1);
        assert_eq!(ws.notes()[0].id, b.id);
    }

    #[tokio::test]
    async fn notes_in_folder_sorted_newest_first() {
        let mut ws = workspace().await;
        let (older, _) = ws.create_note(ROOT_FOLDER_ID, Some("older".into()), None).await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        ws.create_note(ROOT_FOLDER_ID, Some("newer".into()), None).await;
        ws.create_note("elsewhere", Some("other".into()), None).await;

        let titles: Vec<&str> = ws
            .notes_in_folder(ROOT_FOLDER_ID)
            .iter()
            .map(|n| n.title.as_str())
            .collect();
        assert_eq!(titles, vec!["newer", "older"]);

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        ws.update_note(&older.id, NoteUpdate::default()).await.unwrap();
        assert_eq!(ws.notes_in_folder(ROOT_FOLDER_ID)[0].id, older.id);
    }

    #[tokio::test]
    async fn update_unknown_note_fails() {
        let mut ws = workspace().await;
        assert!(matches!(
            ws.update_note("missing", NoteUpdate::default()).await,
            Err(RainyError::NoteNotFound(_))
        ));
    }
}
