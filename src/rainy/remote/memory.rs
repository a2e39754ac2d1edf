use super::{ConnectionState, RemoteStore};
use crate::model::{Folder, Note};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

/// URIs accepted by [`InMemoryRemote::connect`].
pub const MEMORY_URI_SCHEME: &str = "mem://";

/// In-process fake of a remote document store.
///
/// The network can be switched off with [`set_reachable`](Self::set_reachable)
/// to simulate a dropped connection: the adapter stays `Connected` but every
/// operation fails, which is exactly how a real dropped connection looks.
pub struct InMemoryRemote {
    state: Mutex<ConnectionState>,
    notes: Mutex<BTreeMap<String, Note>>,
    folders: Mutex<Vec<Folder>>,
    reachable: AtomicBool,
    fail_folder_insert: AtomicBool,
    live_connections: AtomicUsize,
    max_live_connections: AtomicUsize,
    connect_attempts: AtomicUsize,
}

impl Default for InMemoryRemote {
    fn default() -> Self {
        Self {
            state: Mutex::new(ConnectionState::Disconnected),
            notes: Mutex::new(BTreeMap::new()),
            folders: Mutex::new(Vec::new()),
            reachable: AtomicBool::new(true),
            fail_folder_insert: AtomicBool::new(false),
            live_connections: AtomicUsize::new(0),
            max_live_connections: AtomicUsize::new(0),
            connect_attempts: AtomicUsize::new(0),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl InMemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    /// Make `replace_folders` fail after clearing, as a crash mid-replace would.
    pub fn set_fail_folder_insert(&self, fail: bool) {
        self.fail_folder_insert.store(fail, Ordering::SeqCst);
    }

    pub fn insert_note(&self, note: Note) {
        lock(&self.notes).insert(note.id.clone(), note);
    }

    pub fn stored_notes(&self) -> Vec<Note> {
        lock(&self.notes).values().cloned().collect()
    }

    pub fn stored_folders(&self) -> Vec<Folder> {
        lock(&self.folders).clone()
    }

    pub fn connect_attempts(&self) -> usize {
        self.connect_attempts.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneously open connections ever observed.
    pub fn max_live_connections(&self) -> usize {
        self.max_live_connections.load(Ordering::SeqCst)
    }

    fn available(&self) -> bool {
        self.is_connected() && self.reachable.load(Ordering::SeqCst)
    }

    fn close(&self) {
        let mut state = lock(&self.state);
        if *state == ConnectionState::Connected {
            self.live_connections.fetch_sub(1, Ordering::SeqCst);
        }
        *state = ConnectionState::Disconnected;
    }
}

#[async_trait]
impl RemoteStore for InMemoryRemote {
    async fn connect(&self, uri: &str) -> bool {
        self.connect_attempts.fetch_add(1, Ordering::SeqCst);
        self.close();
        *lock(&self.state) = ConnectionState::Connecting;

        if !self.reachable.load(Ordering::SeqCst) || !uri.starts_with(MEMORY_URI_SCHEME) {
            *lock(&self.state) = ConnectionState::Disconnected;
            return false;
        }

        {
            let mut folders = lock(&self.folders);
            if folders.is_empty() {
                folders.push(Folder::root());
            }
        }
        let live = self.live_connections.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_live_connections.fetch_max(live, Ordering::SeqCst);
        *lock(&self.state) = ConnectionState::Connected;
        true
    }

    async fn disconnect(&self) {
        self.close();
    }

    fn state(&self) -> ConnectionState {
        *lock(&self.state)
    }

    async fn get_notes(&self) -> Option<Vec<Note>> {
        self.available().then(|| self.stored_notes())
    }

    async fn upsert_note(&self, note: &Note) -> bool {
        if !self.available() {
            return false;
        }
        self.insert_note(note.clone());
        true
    }

    async fn delete_note(&self, id: &str) -> bool {
        if !self.available() {
            return false;
        }
        lock(&self.notes).remove(id);
        true
    }

    async fn get_folders(&self) -> Option<Vec<Folder>> {
        self.available().then(|| self.stored_folders())
    }

    async fn replace_folders(&self, folders: &[Folder]) -> bool {
        if !self.available() {
            return false;
        }
        let mut stored = lock(&self.folders);
        stored.clear();
        if self.fail_folder_insert.load(Ordering::SeqCst) {
            return false;
        }
        stored.extend_from_slice(folders);
        true
    }
}
