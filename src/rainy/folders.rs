//! Folder-tree operations.
//!
//! The folder collection is always persisted as a whole, so every operation
//! here is a pure function from one folder set to the next. Callers hand the
//! result to `save_folders`.
//!
//! Deleting a folder removes its whole subtree (transitive closure over
//! `parent_id`) but never touches notes: a note whose folder disappears keeps
//! its stale `folder_id` and simply stops showing up in folder listings.

use crate::error::{RainyError, Result};
use crate::model::{Folder, DEFAULT_FOLDER_NAME, ROOT_FOLDER_ID};
use std::collections::HashSet;

/// Direct children of `parent` (`None` for top-level folders), in stored order.
pub fn children<'a>(folders: &'a [Folder], parent: Option<&str>) -> Vec<&'a Folder> {
    folders
        .iter()
        .filter(|f| f.parent_id.as_deref() == parent)
        .collect()
}

/// Ids of `id` and every folder below it.
///
/// Tolerates cycles in `parent_id` links, which can only come from a
/// hand-edited manifest.
pub fn subtree_ids(folders: &[Folder], id: &str) -> HashSet<String> {
    let mut found = HashSet::new();
    let mut pending = vec![id.to_string()];
    while let Some(current) = pending.pop() {
        if !found.insert(current.clone()) {
            continue;
        }
        for child in children(folders, Some(current.as_str())) {
            pending.push(child.id.clone());
        }
    }
    found
}

/// Appends a new folder named "New Folder" (or `name`) under `parent`.
pub fn add(
    folders: &[Folder],
    name: Option<&str>,
    parent: Option<&str>,
) -> Result<(Vec<Folder>, Folder)> {
    if let Some(parent_id) = parent {
        if !folders.iter().any(|f| f.id == parent_id) {
            return Err(RainyError::FolderNotFound(parent_id.to_string()));
        }
    }
    let folder = Folder::new(
        name.unwrap_or(DEFAULT_FOLDER_NAME),
        parent.map(str::to_string),
    );
    let mut updated = folders.to_vec();
    updated.push(folder.clone());
    Ok((updated, folder))
}

pub fn rename(folders: &[Folder], id: &str, name: &str) -> Result<Vec<Folder>> {
    if !folders.iter().any(|f| f.id == id) {
        return Err(RainyError::FolderNotFound(id.to_string()));
    }
    Ok(folders
        .iter()
        .map(|f| {
            if f.id == id {
                Folder {
                    name: name.to_string(),
                    ..f.clone()
                }
            } else {
                f.clone()
            }
        })
        .collect())
}

/// Removes `id` and all of its descendants. The root folder is protected.
pub fn delete_subtree(folders: &[Folder], id: &str) -> Result<Vec<Folder>> {
    if id == ROOT_FOLDER_ID {
        return Err(RainyError::ProtectedFolder(id.to_string()));
    }
    if !folders.iter().any(|f| f.id == id) {
        return Err(RainyError::FolderNotFound(id.to_string()));
    }
    let doomed = subtree_ids(folders, id);
    Ok(folders
        .iter()
        .filter(|f| !doomed.contains(&f.id))
        .cloned()
        .collect())
}

/// Depth-first walk from the top-level folders, yielding `(depth, folder)`.
///
/// Folders whose parent does not exist are unreachable and are skipped, the
/// same way the sidebar never renders them.
pub fn walk(folders: &[Folder]) -> Vec<(usize, &Folder)> {
    let mut out = Vec::with_capacity(folders.len());
    let mut seen = HashSet::new();
    let mut stack: Vec<(usize, &Folder)> = children(folders, None)
        .into_iter()
        .rev()
        .map(|f| (0, f))
        .collect();
    while let Some((depth, folder)) = stack.pop() {
        if !seen.insert(folder.id.as_str()) {
            continue;
        }
        out.push((depth, folder));
        for child in children(folders, Some(folder.id.as_str())).into_iter().rev() {
            stack.push((depth + 1, child));
        }
    }
    out
}
