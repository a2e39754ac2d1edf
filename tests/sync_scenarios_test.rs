use futures::future::join_all;
use rainy::cache::Workspace;
use rainy::coordinator::Coordinator;
use rainy::model::{Folder, Note, ROOT_FOLDER_ID};
use rainy::remote::memory::InMemoryRemote;
use rainy::remote::offline::OfflineRemote;
use rainy::remote::RemoteStore;
use rainy::store::fs::FileStore;
use rainy::store::LocalStore;
use std::sync::Arc;
use tempfile::TempDir;

fn ids(notes: &[Note]) -> Vec<String> {
    let mut ids: Vec<String> = notes.iter().map(|n| n.id.clone()).collect();
    ids.sort();
    ids
}

async fn on_disk(dir: &TempDir) -> Arc<Coordinator<FileStore, InMemoryRemote>> {
    let coordinator = Coordinator::new(FileStore::new(dir.path()), InMemoryRemote::new());
    coordinator.initialize().await.unwrap();
    Arc::new(coordinator)
}

#[tokio::test]
async fn test_fresh_install_without_remote() {
    let dir = TempDir::new().unwrap();
    let coordinator = Coordinator::new(FileStore::new(dir.path()), OfflineRemote);
    coordinator.initialize().await.unwrap();

    assert_eq!(coordinator.get_folders().await, vec![Folder::root()]);
    assert!(coordinator.get_notes().await.is_empty());
    assert!(!coordinator.get_connection_status());

    let note = Note::new(ROOT_FOLDER_ID);
    assert_eq!(note.title, "Untitled Note");
    assert!(note.images.is_empty());
    let outcome = coordinator.save_note(&note).await;
    assert!(outcome.success);
    assert!(!outcome.synced);
    assert!(dir.path().join("notes").join(format!("{}.json", note.id)).exists());
    assert_eq!(coordinator.get_notes().await, vec![note]);
}

#[tokio::test]
async fn test_configuring_remote_mirrors_writes() {
    let dir = TempDir::new().unwrap();
    let coordinator = on_disk(&dir).await;

    let outcome = coordinator.save_remote_uri("mem://cluster").await;
    assert!(outcome.success);
    assert!(outcome.connected);
    let settings = coordinator.get_settings().await;
    assert_eq!(settings.remote_uri, "mem://cluster");
    assert!(settings.is_connected);

    let note = Note::new(ROOT_FOLDER_ID).with_title("Shared");
    let outcome = coordinator.save_note(&note).await;
    assert!(outcome.success);
    assert!(outcome.synced);
    assert_eq!(coordinator.remote().stored_notes(), vec![note.clone()]);
    assert_eq!(coordinator.local().list_notes().await.unwrap(), vec![note]);
}

#[tokio::test]
async fn test_dropped_connection_still_saves_locally() {
    let dir = TempDir::new().unwrap();
    let coordinator = on_disk(&dir).await;
    assert!(coordinator.save_remote_uri("mem://cluster").await.connected);

    let before = Note::new(ROOT_FOLDER_ID).with_title("before");
    assert!(coordinator.save_note(&before).await.synced);

    coordinator.remote().set_reachable(false);
    let after = Note::new(ROOT_FOLDER_ID).with_title("after");
    let outcome = coordinator.save_note(&after).await;
    assert!(outcome.success);
    assert!(!outcome.synced);

    // The remote cannot answer, so reads fall back to the local copy.
    let notes = coordinator.get_notes().await;
    assert_eq!(ids(&notes), ids(&[before.clone(), after.clone()]));

    // The remote never saw the offline write; nothing replays it.
    coordinator.remote().set_reachable(true);
    assert_eq!(coordinator.get_notes().await, vec![before]);
}

#[tokio::test]
async fn test_connected_read_is_remote_even_when_empty() {
    let dir = TempDir::new().unwrap();
    let coordinator = on_disk(&dir).await;
    coordinator
        .local()
        .upsert_note(&Note::new(ROOT_FOLDER_ID))
        .await
        .unwrap();
    assert!(coordinator.save_remote_uri("mem://cluster").await.connected);

    assert_eq!(
        coordinator.get_notes().await,
        coordinator.remote().get_notes().await.unwrap()
    );
    assert!(coordinator.get_notes().await.is_empty());
}

#[tokio::test]
async fn test_disconnected_read_equals_local_read() {
    let dir = TempDir::new().unwrap();
    let coordinator = on_disk(&dir).await;
    let note = Note::new(ROOT_FOLDER_ID);
    coordinator.save_note(&note).await;

    assert_eq!(
        coordinator.get_notes().await,
        coordinator.local().list_notes().await.unwrap()
    );
    assert_eq!(
        coordinator.get_folders().await,
        coordinator.local().list_folders().await
    );
}

#[tokio::test]
async fn test_cascade_folder_delete_keeps_notes() {
    let dir = TempDir::new().unwrap();
    let coordinator = on_disk(&dir).await;
    let mut ws = Workspace::load(coordinator.clone()).await;

    let (work, outcome) = ws.create_folder(Some("Work"), None).await.unwrap();
    assert!(outcome.success);
    let (projects, _) = ws
        .create_folder(Some("Projects"), Some(work.id.as_str()))
        .await
        .unwrap();
    let (roadmaps, _) = ws
        .create_folder(Some("Roadmaps"), Some(projects.id.as_str()))
        .await
        .unwrap();
    let (note, _) = ws
        .create_note(&roadmaps.id, Some("Q3".into()), None)
        .await;
    assert_eq!(ws.folders().len(), 4);

    let outcome = ws.delete_folder(&work.id).await.unwrap();
    assert!(outcome.success);
    assert_eq!(ws.folders(), &[Folder::root()]);
    assert_eq!(coordinator.get_folders().await, vec![Folder::root()]);

    let stored = coordinator.get_notes().await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, note.id);
    assert_eq!(stored[0].folder_id, roadmaps.id);
    assert!(ws.notes_in_folder(ROOT_FOLDER_ID).is_empty());
}

#[tokio::test]
async fn test_concurrent_saves_of_different_notes() {
    let dir = TempDir::new().unwrap();
    let coordinator = on_disk(&dir).await;
    assert!(coordinator.save_remote_uri("mem://cluster").await.connected);

    let notes: Vec<Note> = (0..16)
        .map(|i| Note::new(ROOT_FOLDER_ID).with_title(format!("note {}", i)))
        .collect();
    let outcomes = join_all(notes.iter().map(|n| coordinator.save_note(n))).await;
    assert!(outcomes.iter().all(|o| o.success && o.synced));

    assert_eq!(ids(&coordinator.local().list_notes().await.unwrap()), ids(&notes));
    assert_eq!(ids(&coordinator.remote().stored_notes()), ids(&notes));
}

#[tokio::test]
async fn test_concurrent_saves_of_one_note_leave_one_version() {
    let dir = TempDir::new().unwrap();
    let coordinator = on_disk(&dir).await;
    assert!(coordinator.save_remote_uri("mem://cluster").await.connected);

    let base = Note::new(ROOT_FOLDER_ID);
    let versions: Vec<Note> = (0..8)
        .map(|i| base.clone().with_content(format!("<p>{}</p>", i)))
        .collect();
    join_all(versions.iter().map(|n| coordinator.save_note(n))).await;

    let local = coordinator.local().list_notes().await.unwrap();
    let remote = coordinator.remote().stored_notes();
    assert_eq!(local.len(), 1);
    assert_eq!(local, remote);
    assert!(versions.contains(&local[0]));
}

#[tokio::test]
async fn test_interrupted_remote_folder_replace_is_authoritative() {
    let dir = TempDir::new().unwrap();
    let coordinator = on_disk(&dir).await;
    assert!(coordinator.save_remote_uri("mem://cluster").await.connected);

    coordinator.remote().set_fail_folder_insert(true);
    let folders = vec![Folder::root(), Folder::new("Work", None)];
    let outcome = coordinator.save_folders(&folders).await;
    assert!(outcome.success);
    assert!(!outcome.synced);

    assert_eq!(coordinator.local().list_folders().await, folders);
    assert!(coordinator.get_folders().await.is_empty());
}

#[tokio::test]
async fn test_restart_reconnects_with_saved_uri() {
    let dir = TempDir::new().unwrap();
    {
        let coordinator = on_disk(&dir).await;
        assert!(coordinator.save_remote_uri("mem://cluster").await.connected);
    }

    let coordinator = on_disk(&dir).await;
    assert!(!coordinator.get_connection_status());
    assert!(coordinator.connect_saved_remote().await);
    assert!(coordinator.get_connection_status());
}

#[tokio::test]
async fn test_unreachable_uri_is_still_saved() {
    let dir = TempDir::new().unwrap();
    let coordinator = on_disk(&dir).await;

    let outcome = coordinator.save_remote_uri("mongodb://nowhere.invalid").await;
    assert!(outcome.success);
    assert!(!outcome.connected);
    assert_eq!(
        coordinator.get_settings().await.remote_uri,
        "mongodb://nowhere.invalid"
    );
    assert!(coordinator.save_note(&Note::new(ROOT_FOLDER_ID)).await.success);
}

#[tokio::test]
async fn test_reconnect_holds_one_connection() {
    let dir = TempDir::new().unwrap();
    let coordinator = on_disk(&dir).await;
    for uri in ["mem://a", "mem://b", "mem://c"] {
        assert!(coordinator.save_remote_uri(uri).await.connected);
    }
    assert_eq!(coordinator.remote().max_live_connections(), 1);
}
