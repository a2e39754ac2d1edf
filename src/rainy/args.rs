use clap::{Parser, Subcommand};
use rainy::model::ROOT_FOLDER_ID;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "rainy", version)]
#[command(about = "Local-first notes with an optional MongoDB mirror", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Data directory (defaults to $RAINY_DATA_DIR, then the platform data dir)
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Skip connecting to the saved remote store
    #[arg(long, global = true)]
    pub offline: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the folder tree
    Folders,

    /// Add, rename or delete folders
    Folder {
        #[command(subcommand)]
        action: FolderAction,
    },

    /// List notes in a folder, newest first
    #[command(alias = "ls")]
    Notes {
        /// Folder id (or unique id prefix)
        #[arg(short, long, default_value = ROOT_FOLDER_ID)]
        folder: String,

        /// List notes from every folder, including orphaned ones
        #[arg(long)]
        all: bool,
    },

    /// Create a note
    #[command(alias = "n")]
    New {
        /// Title of the note
        title: Option<String>,

        /// Initial content
        #[arg(short, long)]
        content: Option<String>,

        /// Folder to file the note under
        #[arg(short, long, default_value = ROOT_FOLDER_ID)]
        folder: String,
    },

    /// Print a note
    #[command(alias = "v")]
    Show {
        /// Note id (or unique id prefix)
        id: String,
    },

    /// Change a note's title, content or folder
    #[command(alias = "e")]
    Edit {
        /// Note id (or unique id prefix)
        id: String,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        content: Option<String>,

        /// Move the note to another folder
        #[arg(short, long)]
        folder: Option<String>,
    },

    /// Delete a note
    #[command(alias = "rm")]
    Delete {
        /// Note id (or unique id prefix)
        id: String,
    },

    /// Configure the remote store
    Remote {
        #[command(subcommand)]
        action: RemoteAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum FolderAction {
    /// Create a folder
    Add {
        /// Folder name (defaults to "New Folder")
        name: Option<String>,

        /// Parent folder id; top level if omitted
        #[arg(short, long)]
        parent: Option<String>,
    },

    /// Rename a folder
    Rename { id: String, name: String },

    /// Delete a folder and all folders below it (notes are kept)
    #[command(alias = "rm")]
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum RemoteAction {
    /// Save a connection string and connect to it
    Set { uri: String },

    /// Forget the connection string and disconnect
    Clear,

    /// Show the configured remote and whether it is reachable
    Status,
}
