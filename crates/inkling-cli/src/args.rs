use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cli::{
    AddVersionArgs, DraftCommands, ProjectCommands, RefineArgs, TranscribeArgs,
};

/// Turn raw notes into polished writing
///
/// Inkling sends a raw note to a generative model, which rewrites it in
/// several styles. Keep the versions you like as a project, generate more
/// versions later, and edit them in place. Drafts hold notes you are not
/// ready to refine yet. The `serve` command exposes the same operations to
/// AI assistants over the Model Context Protocol.
#[derive(Parser)]
#[command(version, about, name = "ink")]
pub struct Args {
    /// Path to the SQLite database file. Defaults to
    /// $XDG_DATA_HOME/inkling/inkling.db
    #[arg(long, global = true)]
    pub database_file: Option<PathBuf>,

    /// Path to the JSON configuration file. Defaults to
    /// $XDG_CONFIG_HOME/inkling/config.json
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands for the Inkling CLI
#[derive(Subcommand)]
pub enum Commands {
    /// Manage saved projects and their versions
    #[command(alias = "p")]
    Project {
        #[command(subcommand)]
        command: ProjectCommands,
    },
    /// Manage drafts
    #[command(alias = "d")]
    Draft {
        #[command(subcommand)]
        command: DraftCommands,
    },
    /// Rewrite a note in several styles
    #[command(alias = "r")]
    Refine(RefineArgs),
    /// Generate one more version for a saved project
    #[command(alias = "a")]
    AddVersion(AddVersionArgs),
    /// Transcribe an audio recording into a note
    #[command(alias = "t")]
    Transcribe(TranscribeArgs),
    /// Start the MCP server
    Serve,
}
