use crate::error::{RainyError, Result};
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

/// Id of the always-present top-level folder.
pub const ROOT_FOLDER_ID: &str = "root";
pub const ROOT_FOLDER_NAME: &str = "Notes";
pub const DEFAULT_NOTE_TITLE: &str = "Untitled Note";
pub const DEFAULT_FOLDER_NAME: &str = "New Folder";

fn default_title() -> String {
    DEFAULT_NOTE_TITLE.to_string()
}

/// Current time at millisecond precision, which is what every persisted
/// timestamp carries.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// ISO-8601 in UTC with exactly three fraction digits, so stored timestamps
/// sort the same as strings and as instants.
fn serialize_timestamp<S: Serializer>(
    ts: &DateTime<Utc>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// A single note. Serialized with camelCase keys so files written by older
/// versions of the app load unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    #[serde(default = "default_title")]
    pub title: String,
    /// Rich-text markup produced by the editor. Never interpreted here.
    #[serde(default)]
    pub content: String,
    pub folder_id: String,
    /// Legacy attachment list. Nothing writes to it anymore, but it is kept
    /// so old records round-trip.
    #[serde(default)]
    pub images: Vec<serde_json::Value>,
    #[serde(serialize_with = "serialize_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "serialize_timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// A fresh, empty note in `folder_id` with a time-ordered id.
    pub fn new(folder_id: impl Into<String>) -> Self {
        let now = now();
        Self {
            id: Uuid::now_v7().to_string(),
            title: default_title(),
            content: String::new(),
            folder_id: folder_id.into(),
            images: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Bumps `updated_at`. `created_at` is never touched after creation.
    pub fn touch(&mut self) {
        let now = now();
        // Clock skew must not make a note look older than when it was created.
        self.updated_at = if now < self.created_at {
            self.created_at
        } else {
            now
        };
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.touch();
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.touch();
    }
}

/// Note ids double as file names in the local store, so they must be a
/// single, non-hidden path component.
pub fn validate_note_id(id: &str) -> Result<()> {
    let valid = !id.is_empty()
        && !id.starts_with('.')
        && !id.contains(['/', '\\', '\0'])
        && id.len() <= 200;
    if valid {
        Ok(())
    } else {
        Err(RainyError::InvalidNoteId(id.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: String,
    pub name: String,
    /// `None` for top-level folders. Always serialized, as `null`.
    #[serde(default)]
    pub parent_id: Option<String>,
}

impl Folder {
    pub fn root() -> Self {
        Self {
            id: ROOT_FOLDER_ID.to_string(),
            name: ROOT_FOLDER_NAME.to_string(),
            parent_id: None,
        }
    }

    pub fn new(name: impl Into<String>, parent_id: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            parent_id,
        }
    }

    pub fn is_root(&self) -> bool {
        self.id == ROOT_FOLDER_ID
    }
}

/// Folder set of a fresh install: the root folder and nothing else.
pub fn default_folders() -> Vec<Folder> {
    vec![Folder::root()]
}
