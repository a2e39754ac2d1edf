//! # Rainy Architecture
//!
//! Rainy is the persistence and synchronization core of a desktop notes app:
//! a folder tree, notes filed under folders, and an editor that auto-saves.
//! Everything here is UI-agnostic. The bundled CLI is one client of the same
//! contract a desktop shell would use.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Presentation (main.rs CLI, or a desktop shell)             │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Application State Cache (cache.rs)                         │
//! │  - Last-known notes/folders, updated after each success     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Persistence Coordinator (coordinator.rs)                   │
//! │  - Remote-first reads, remote-then-local writes             │
//! │  - Local write decides success; remote result is `synced`   │
//! └─────────────────────────────────────────────────────────────┘
//!                 │                              │
//!                 ▼                              ▼
//! ┌───────────────────────────────┐ ┌───────────────────────────┐
//! │  Local Store (store/)         │ │  Remote Adapter (remote/) │
//! │  - JSON files, always there   │ │  - Optional MongoDB       │
//! │  - Source of truth offline    │ │  - Never raises           │
//! └───────────────────────────────┘ └───────────────────────────┘
//! ```
//!
//! ## Consistency Policy
//!
//! - The remote is authoritative for reads whenever it answers, even with an
//!   empty collection. "Absent" (`None`) and "empty" are different answers.
//! - No merge, no CRDTs, no reconciliation. Last writer wins per note id in
//!   each store, and for the folder collection as a whole.
//! - Deletes are physical and immediate in both stores.
//!
//! ## Module Overview
//!
//! - [`model`]: `Note`, `Folder`, id rules and defaults
//! - [`folders`]: folder-tree operations (add, rename, cascading delete)
//! - [`store`]: local store trait, file and in-memory implementations
//! - [`remote`]: remote adapter trait, MongoDB, offline and in-memory adapters
//! - [`coordinator`]: the storage contract presented to the UI
//! - [`cache`]: in-memory application state
//! - [`config`]: settings file and data directory resolution
//! - [`error`]: error types

pub mod cache;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod folders;
pub mod model;
pub mod remote;
pub mod store;
