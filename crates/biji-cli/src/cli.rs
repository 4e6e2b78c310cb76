use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "biji")]
#[command(about = "Keep named notes and sync them through a relay")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Optional path to the local note document
    #[arg(long, global = true, value_name = "PATH")]
    pub data_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new note
    #[command(alias = "add")]
    New {
        /// Unique note name
        name: String,
        /// Note content (read from stdin when piped)
        content: Vec<String>,
    },
    /// List notes, most recently modified first
    List {
        /// Number of notes to show
        #[arg(short, long)]
        limit: Option<usize>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a note
    View {
        /// Note name
        name: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Rename a note
    Rename {
        /// Current note name
        name: String,
        /// New note name
        new_name: String,
    },
    /// Replace the content of a note (opens $EDITOR when no content is given)
    Edit {
        /// Note name
        name: String,
        /// New content
        content: Vec<String>,
    },
    /// Delete notes
    #[command(alias = "rm")]
    Delete {
        /// Note names
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Mark a note as done
    Done {
        /// Note name
        name: String,
    },
    /// Mark a note as not done
    Undone {
        /// Note name
        name: String,
    },
    /// Exchange notes with a sync relay
    Sync {
        #[command(subcommand)]
        command: SyncCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Subcommand)]
pub enum SyncCommands {
    /// Register a new relay account and remember its sync code
    Register {
        /// Relay base URL (e.g. <http://127.0.0.1:4204>)
        #[arg(long, value_name = "URL")]
        server: Option<String>,
        /// Replace an existing sync code
        #[arg(long)]
        force: bool,
    },
    /// Link this device to an existing account
    Link {
        /// Sync code shown by `biji sync register` on another device
        code: String,
        /// Relay base URL
        #[arg(long, value_name = "URL")]
        server: Option<String>,
    },
    /// Upload local notes and merge the relay's result
    Push,
    /// Download the relay's notes and merge them locally
    Pull,
    /// Show the current sync settings
    Status,
}
