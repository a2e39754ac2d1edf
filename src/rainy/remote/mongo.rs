use super::{ConnectionState, RemoteStore, CONNECT_TIMEOUT, FOLDERS_COLLECTION, NOTES_COLLECTION};
use crate::model::{Folder, Note};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{self, doc, Document};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, Database};
use serde::de::DeserializeOwned;
use std::sync::Mutex as StateLock;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub const DEFAULT_DATABASE: &str = "rainy";

/// An open client plus the database handle derived from it. Replaced as a
/// whole on every reconnect.
struct Session {
    client: Client,
    db: Database,
}

/// MongoDB mirror of the local store.
pub struct MongoRemote {
    database: String,
    session: Mutex<Option<Session>>,
    state: StateLock<ConnectionState>,
}

impl Default for MongoRemote {
    fn default() -> Self {
        Self::new(DEFAULT_DATABASE)
    }
}

impl MongoRemote {
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            session: Mutex::new(None),
            state: StateLock::new(ConnectionState::Disconnected),
        }
    }

    fn set_state(&self, state: ConnectionState) {
        *self.state.lock().unwrap_or_else(|p| p.into_inner()) = state;
    }

    async fn open(&self, uri: &str) -> mongodb::error::Result<Session> {
        let mut options = ClientOptions::parse(uri).await?;
        options.server_selection_timeout = Some(CONNECT_TIMEOUT);
        options.connect_timeout = Some(CONNECT_TIMEOUT);

        let client = Client::with_options(options)?;
        let db = client.database(&self.database);
        if let Err(e) = ensure_collections(&db).await {
            client.shutdown().await;
            return Err(e);
        }
        Ok(Session { client, db })
    }

    /// Handle to the live database, or `None` when not connected.
    async fn live_db(&self) -> Option<Database> {
        if !self.is_connected() {
            return None;
        }
        self.session.lock().await.as_ref().map(|s| s.db.clone())
    }
}

/// Create the two collections if missing and seed the root folder into an
/// empty folder collection.
async fn ensure_collections(db: &Database) -> mongodb::error::Result<()> {
    let existing = db.list_collection_names().await?;
    for name in [NOTES_COLLECTION, FOLDERS_COLLECTION] {
        if !existing.iter().any(|n| n == name) {
            debug!(collection = name, "creating remote collection");
            db.create_collection(name).await?;
        }
    }

    let folders: Collection<Folder> = db.collection(FOLDERS_COLLECTION);
    if folders.count_documents(doc! {}).await? == 0 {
        folders.insert_one(Folder::root()).await?;
    }
    Ok(())
}

async fn fetch_all<T: DeserializeOwned>(
    db: &Database,
    collection: &str,
) -> mongodb::error::Result<Vec<T>> {
    let cursor = db.collection::<Document>(collection).find(doc! {}).await?;
    let documents: Vec<Document> = cursor.try_collect().await?;
    Ok(decode_all(collection, documents))
}

/// Decode each document on its own, skipping the ones that don't fit `T`.
/// Unknown fields such as the store's own `_id` are dropped by serde.
fn decode_all<T: DeserializeOwned>(collection: &str, documents: Vec<Document>) -> Vec<T> {
    documents
        .into_iter()
        .filter_map(|document| {
            let id = document.get_str("id").unwrap_or("<missing>").to_string();
            match bson::from_document(document) {
                Ok(item) => Some(item),
                Err(e) => {
                    warn!(collection, id = %id, error = %e, "skipping malformed remote document");
                    None
                }
            }
        })
        .collect()
}

/// Log a failed remote operation and collapse the result to an `Option`.
fn report<T>(operation: &str, result: mongodb::error::Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(operation, error = %e, "remote operation failed");
            None
        }
    }
}

#[async_trait]
impl RemoteStore for MongoRemote {
    async fn connect(&self, uri: &str) -> bool {
        let mut session = self.session.lock().await;
        if let Some(previous) = session.take() {
            info!("closing previous remote connection");
            previous.client.shutdown().await;
        }

        if uri.trim().is_empty() {
            self.set_state(ConnectionState::Disconnected);
            return false;
        }

        self.set_state(ConnectionState::Connecting);
        match self.open(uri.trim()).await {
            Ok(opened) => {
                *session = Some(opened);
                self.set_state(ConnectionState::Connected);
                info!(database = %self.database, "connected to remote store");
                true
            }
            Err(e) => {
                self.set_state(ConnectionState::Disconnected);
                warn!(error = %e, "remote connection failed");
                false
            }
        }
    }

    async fn disconnect(&self) {
        let mut session = self.session.lock().await;
        if let Some(previous) = session.take() {
            previous.client.shutdown().await;
            info!("disconnected from remote store");
        }
        self.set_state(ConnectionState::Disconnected);
    }

    fn state(&self) -> ConnectionState {
        *self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    async fn get_notes(&self) -> Option<Vec<Note>> {
        let db = self.live_db().await?;
        report("get_notes", fetch_all::<Note>(&db, NOTES_COLLECTION).await)
    }

    async fn upsert_note(&self, note: &Note) -> bool {
        let Some(db) = self.live_db().await else {
            return false;
        };
        let fields = match bson::to_document(note) {
            Ok(fields) => fields,
            Err(e) => {
                warn!(id = %note.id, error = %e, "note not representable as a document");
                return false;
            }
        };
        let result = db
            .collection::<Document>(NOTES_COLLECTION)
            .update_one(doc! { "id": note.id.as_str() }, doc! { "$set": fields })
            .upsert(true)
            .await;
        report("upsert_note", result).is_some()
    }

    async fn delete_note(&self, id: &str) -> bool {
        let Some(db) = self.live_db().await else {
            return false;
        };
        let result = db
            .collection::<Document>(NOTES_COLLECTION)
            .delete_one(doc! { "id": id })
            .await;
        report("delete_note", result).is_some()
    }

    async fn get_folders(&self) -> Option<Vec<Folder>> {
        let db = self.live_db().await?;
        report("get_folders", fetch_all::<Folder>(&db, FOLDERS_COLLECTION).await)
    }

    async fn replace_folders(&self, folders: &[Folder]) -> bool {
        let Some(db) = self.live_db().await else {
            return false;
        };
        let collection = db.collection::<Folder>(FOLDERS_COLLECTION);
        if report("clear_folders", collection.delete_many(doc! {}).await).is_none() {
            return false;
        }
        if folders.is_empty() {
            return true;
        }
        report("insert_folders", collection.insert_many(folders).await).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ROOT_FOLDER_ID;

    #[tokio::test]
    async fn malformed_uri_fails_without_raising() {
        let remote = MongoRemote::default();
        assert!(!remote.connect("definitely not a uri").await);
        assert_eq!(remote.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn empty_uri_never_connects() {
        let remote = MongoRemote::default();
        assert!(!remote.connect("   ").await);
        assert!(!remote.is_connected());
    }

    #[tokio::test]
    async fn disconnected_reads_are_absent() {
        let remote = MongoRemote::default();
        assert_eq!(remote.get_notes().await, None);
        assert_eq!(remote.get_folders().await, None);
    }

    #[tokio::test]
    async fn disconnected_writes_fail() {
        let remote = MongoRemote::default();
        assert!(!remote.upsert_note(&Note::new(ROOT_FOLDER_ID)).await);
        assert!(!remote.delete_note("n1").await);
        assert!(!remote.replace_folders(&[Folder::root()]).await);
    }

    #[test]
    fn malformed_documents_are_skipped() {
        let good = Note::new(ROOT_FOLDER_ID).with_title("kept");
        let mut stored = bson::to_document(&good).unwrap();
        stored.insert("_id", bson::oid::ObjectId::new());
        let documents = vec![
            doc! { "id": "no-timestamps", "folderId": ROOT_FOLDER_ID },
            stored,
            doc! { "id": "bad-date", "folderId": ROOT_FOLDER_ID, "createdAt": 42, "updatedAt": 42 },
        ];

        let notes: Vec<Note> = decode_all(NOTES_COLLECTION, documents);
        assert_eq!(notes, vec![good]);
    }

    #[test]
    fn all_malformed_is_an_empty_answer() {
        let folders: Vec<Folder> = decode_all(FOLDERS_COLLECTION, vec![doc! { "name": 3 }]);
        assert!(folders.is_empty());
    }

    #[tokio::test]
    async fn disconnect_is_idempotent() {
        let remote = MongoRemote::default();
        remote.disconnect().await;
        remote.disconnect().await;
        assert_eq!(remote.state(), ConnectionState::Disconnected);
    }
}
