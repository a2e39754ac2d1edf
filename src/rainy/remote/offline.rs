use super::{ConnectionState, RemoteStore};
use crate::model::{Folder, Note};
use async_trait::async_trait;
use tracing::debug;

/// Remote stand-in for environments without a remote store. Every connect
/// attempt fails, every read is absent and every write reports "not synced".
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineRemote;

#[async_trait]
impl RemoteStore for OfflineRemote {
    async fn connect(&self, _uri: &str) -> bool {
        debug!("remote store disabled, ignoring connect");
        false
    }

    async fn disconnect(&self) {}

    fn state(&self) -> ConnectionState {
        ConnectionState::Disconnected
    }

    async fn get_notes(&self) -> Option<Vec<Note>> {
        None
    }

    async fn upsert_note(&self, _note: &Note) -> bool {
        false
    }

    async fn delete_note(&self, _id: &str) -> bool {
        false
    }

    async fn get_folders(&self) -> Option<Vec<Folder>> {
        None
    }

    async fn replace_folders(&self, _folders: &[Folder]) -> bool {
        false
    }
}
