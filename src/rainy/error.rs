use thiserror::Error;

/// Failures of the local durable store and of cache-level operations.
///
/// Remote store failures never show up here: the remote adapters swallow them
/// and report `None`/`false` instead.
#[derive(Error, Debug)]
pub enum RainyError {
    #[error("Note not found: {0}")]
    NoteNotFound(String),

    #[error("Folder not found: {0}")]
    FolderNotFound(String),

    #[error("Folder cannot be deleted: {0}")]
    ProtectedFolder(String),

    #[error("Invalid note id: {0:?}")]
    InvalidNoteId(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, RainyError>;
