//! Command definitions and their execution.
//!
//! Each subcommand has a clap `Args` wrapper that converts into the
//! interface-agnostic parameter type from `inkling_core::params`:
//!
//! ```text
//! User Input → CLI Args (clap) → Core Params → handlers / reconcile
//! ```
//!
//! The wrappers own everything CLI-specific (positional arguments, short
//! flags, help text); the core types stay free of clap.

use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Subcommand};
use inkling_core::{
    display::{DeleteResult, Drafts, OperationStatus, Projects, SaveResult},
    drafts, handlers,
    params::*,
    reconcile, Config, GeminiClient, GenerationClient, GenerationManager, ProjectStore,
    SqliteStore, Task, TaskId, TaskStatus,
};
use log::{debug, info};
use tokio_util::sync::CancellationToken;

use crate::renderer::TerminalRenderer;

// ============================================================================
// CLI Argument Wrappers
// ============================================================================

/// Show details of a specific project
///
/// Displays the project's original note and every version with its style,
/// tags and full text.
#[derive(Args)]
pub struct ShowProjectArgs {
    #[arg(help = "Unique identifier of the project to show")]
    pub id: String,
}

impl From<ShowProjectArgs> for Id {
    fn from(val: ShowProjectArgs) -> Self {
        Id { id: val.id }
    }
}

/// Save versions as a project
///
/// Reads a JSON document with `originalNote`, `versions` and an optional
/// `projectId`, the same shape the `save_project` MCP tool accepts.
/// Temporary version IDs are replaced with permanent ones.
#[derive(Args)]
pub struct SaveProjectArgs {
    #[arg(help = "Path to the JSON file describing the project")]
    pub file: PathBuf,
}

/// Delete a project permanently
#[derive(Args)]
pub struct DeleteProjectArgs {
    #[arg(help = "Unique identifier of the project to delete")]
    pub id: String,
}

impl From<DeleteProjectArgs> for Id {
    fn from(val: DeleteProjectArgs) -> Self {
        Id { id: val.id }
    }
}

/// Edit a version's title or content
///
/// Empty values leave the field unchanged; at least one field must change.
#[derive(Args)]
pub struct UpdateVersionArgs {
    #[arg(help = "Unique identifier of the project owning the version")]
    pub project_id: String,
    #[arg(help = "Unique identifier of the version to edit")]
    pub version_id: String,
    #[arg(short, long, help = "New title for the version")]
    pub title: Option<String>,
    #[arg(short, long, help = "New body text for the version")]
    pub content: Option<String>,
}

impl From<UpdateVersionArgs> for UpdateVersion {
    fn from(val: UpdateVersionArgs) -> Self {
        UpdateVersion {
            project_id: val.project_id,
            version_id: val.version_id,
            title: val.title,
            content: val.content,
        }
    }
}

/// Remove one version from a project
///
/// The last remaining version cannot be removed; delete the project instead.
#[derive(Args)]
pub struct RemoveVersionArgs {
    #[arg(help = "Unique identifier of the project owning the version")]
    pub project_id: String,
    #[arg(help = "Unique identifier of the version to remove")]
    pub version_id: String,
}

impl From<RemoveVersionArgs> for RemoveVersion {
    fn from(val: RemoveVersionArgs) -> Self {
        RemoveVersion {
            project_id: val.project_id,
            version_id: val.version_id,
        }
    }
}

#[derive(Subcommand)]
pub enum ProjectCommands {
    /// List all projects, most recently updated first
    #[command(aliases = ["l", "ls"])]
    List,
    /// Show details of a specific project
    #[command(alias = "s")]
    Show(ShowProjectArgs),
    /// Save versions from a JSON file as a project
    Save(SaveProjectArgs),
    /// Delete a project permanently
    #[command(aliases = ["d", "rm"])]
    Delete(DeleteProjectArgs),
    /// Edit a version's title or content
    #[command(alias = "u")]
    UpdateVersion(UpdateVersionArgs),
    /// Remove one version from a project
    RemoveVersion(RemoveVersionArgs),
}

/// Save a draft
///
/// Nothing is stored when the text is blank or identical to the most recent
/// draft.
#[derive(Args)]
pub struct SaveDraftArgs {
    #[arg(help = "Text of the draft")]
    pub text: String,
}

impl From<SaveDraftArgs> for SaveDraft {
    fn from(val: SaveDraftArgs) -> Self {
        SaveDraft { text: val.text }
    }
}

/// Delete a draft
#[derive(Args)]
pub struct DeleteDraftArgs {
    #[arg(help = "Unique identifier of the draft to delete")]
    pub id: String,
}

impl From<DeleteDraftArgs> for Id {
    fn from(val: DeleteDraftArgs) -> Self {
        Id { id: val.id }
    }
}

#[derive(Subcommand)]
pub enum DraftCommands {
    /// List drafts, newest first
    #[command(aliases = ["l", "ls"])]
    List,
    /// Save a draft
    #[command(alias = "s")]
    Save(SaveDraftArgs),
    /// Delete a draft
    #[command(aliases = ["d", "rm"])]
    Delete(DeleteDraftArgs),
}

/// Rewrite a note in several styles
///
/// Waits for the model and prints every version. With --save the versions
/// are stored as a new project. Press Ctrl-C to cancel the request.
#[derive(Args)]
pub struct RefineArgs {
    #[arg(help = "The raw note to rewrite")]
    pub note: String,
    #[arg(short, long, help = "Save all generated versions as a new project")]
    pub save: bool,
}

impl From<&RefineArgs> for RefineNote {
    fn from(val: &RefineArgs) -> Self {
        RefineNote {
            note: val.note.clone(),
        }
    }
}

/// Generate one more version for a saved project
///
/// The new version is appended to the project as soon as the model answers.
#[derive(Args)]
pub struct AddVersionArgs {
    #[arg(help = "Unique identifier of the project that receives the version")]
    pub project_id: String,
    #[arg(
        short,
        long,
        help = "Note to generate from; defaults to the project's original note"
    )]
    pub note: Option<String>,
}

impl From<AddVersionArgs> for AddVersion {
    fn from(val: AddVersionArgs) -> Self {
        AddVersion {
            project_id: val.project_id,
            note: val.note,
        }
    }
}

/// Transcribe an audio recording into a note
#[derive(Args)]
pub struct TranscribeArgs {
    #[arg(help = "Path to the audio file")]
    pub file: PathBuf,
    #[arg(
        short,
        long,
        help = "MIME type of the recording; guessed from the file extension when omitted"
    )]
    pub mime_type: Option<String>,
    #[arg(short, long, help = "Also save the transcription as a draft")]
    pub draft: bool,
}

impl TranscribeArgs {
    fn resolved_mime_type(&self) -> String {
        if let Some(mime_type) = &self.mime_type {
            return mime_type.clone();
        }
        let extension = self
            .file
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("mp3") => "audio/mpeg",
            Some("wav") => "audio/wav",
            Some("m4a" | "mp4") => "audio/mp4",
            Some("ogg" | "oga") => "audio/ogg",
            Some("flac") => "audio/flac",
            _ => "audio/webm",
        }
        .to_string()
    }
}

// ============================================================================
// Command Execution
// ============================================================================

/// Executes parsed commands against the store and, for generation commands,
/// the model.
pub struct Cli {
    store: Arc<SqliteStore>,
    config: Config,
    renderer: TerminalRenderer,
}

impl Cli {
    pub fn new(store: Arc<SqliteStore>, config: Config, renderer: TerminalRenderer) -> Self {
        Self {
            store,
            config,
            renderer,
        }
    }

    pub async fn handle_project_command(&self, command: ProjectCommands) -> Result<()> {
        match command {
            ProjectCommands::List => self.list_projects().await,
            ProjectCommands::Show(args) => self.show_project(&args.into()).await,
            ProjectCommands::Save(args) => self.save_project(args).await,
            ProjectCommands::Delete(args) => self.delete_project(&args.into()).await,
            ProjectCommands::UpdateVersion(args) => self.update_version(&args.into()).await,
            ProjectCommands::RemoveVersion(args) => self.remove_version(&args.into()).await,
        }
    }

    pub async fn handle_draft_command(&self, command: DraftCommands) -> Result<()> {
        match command {
            DraftCommands::List => {
                let drafts = self
                    .store
                    .list_drafts()
                    .await
                    .context("Failed to list drafts")?;
                self.renderer.render(&Drafts(drafts).to_string())
            }
            DraftCommands::Save(args) => {
                let saved = handlers::handle_save_draft(self.store.as_ref(), &args.into())
                    .await
                    .context("Failed to save draft")?;
                let output = match saved {
                    Some(draft) => SaveResult::new(draft).to_string(),
                    None => OperationStatus::success(
                        "Draft unchanged, nothing saved (blank or same as the latest draft)",
                    )
                    .to_string(),
                };
                self.renderer.render(&output)
            }
            DraftCommands::Delete(args) => {
                let params: Id = args.into();
                let deleted = handlers::handle_delete_draft(self.store.as_ref(), &params)
                    .await
                    .context("Failed to delete draft")?
                    .ok_or_else(|| anyhow!("Draft with ID {} not found", params.id))?;
                self.renderer.render(&DeleteResult::new(deleted).to_string())
            }
        }
    }

    pub async fn list_projects(&self) -> Result<()> {
        let projects = self
            .store
            .list_projects()
            .await
            .context("Failed to list projects")?;
        let output = if projects.is_empty() {
            Projects(projects).to_string()
        } else {
            format!("# Projects\n\n{}", Projects(projects))
        };
        self.renderer.render(&output)
    }

    async fn show_project(&self, params: &Id) -> Result<()> {
        let project = handlers::handle_show_project(self.store.as_ref(), params)
            .await
            .context("Failed to get project")?
            .ok_or_else(|| anyhow!("Project with ID {} not found", params.id))?;
        self.renderer.render(&project.to_string())
    }

    async fn save_project(&self, args: SaveProjectArgs) -> Result<()> {
        let raw = tokio::fs::read_to_string(&args.file)
            .await
            .with_context(|| format!("Failed to read {}", args.file.display()))?;
        let params: SaveProject = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid project file {}", args.file.display()))?;

        let project = reconcile::save_project_with_versions(self.store.as_ref(), &params)
            .await
            .context("Failed to save project")?;
        self.renderer.render(&SaveResult::new(project).to_string())
    }

    async fn delete_project(&self, params: &Id) -> Result<()> {
        let deleted = handlers::handle_delete_project(self.store.as_ref(), params)
            .await
            .context("Failed to delete project")?
            .ok_or_else(|| anyhow!("Project with ID {} not found", params.id))?;
        self.renderer.render(&DeleteResult::new(deleted).to_string())
    }

    async fn update_version(&self, params: &UpdateVersion) -> Result<()> {
        let version = handlers::handle_update_version(self.store.as_ref(), params)
            .await
            .context("Failed to update version")?;
        self.renderer.render(&SaveResult::new(version).to_string())
    }

    async fn remove_version(&self, params: &RemoveVersion) -> Result<()> {
        let project = reconcile::remove_version(self.store.as_ref(), params)
            .await
            .context("Failed to remove version")?;
        let status = OperationStatus::success(format!(
            "Removed version {} from project {} ({} left)",
            params.version_id,
            project.id,
            project.versions.len()
        ));
        self.renderer.render(&status.to_string())
    }

    pub async fn refine(&self, args: RefineArgs) -> Result<()> {
        let manager = self.manager()?;
        let id = handlers::handle_refine_note(&manager, &RefineNote::from(&args))
            .context("Failed to start refinement")?;
        let task = wait_for(&manager, &id).await?;

        match (&task.status, &task.output) {
            (TaskStatus::Completed, Some(output)) if args.save => {
                let params = SaveProject {
                    original_note: args.note.trim().to_string(),
                    versions: output.versions().to_vec(),
                    project_id: None,
                };
                let project = reconcile::save_project_with_versions(self.store.as_ref(), &params)
                    .await
                    .context("Failed to save project")?;
                self.renderer.render(&SaveResult::new(project).to_string())
            }
            _ => self.render_task(&task),
        }
    }

    pub async fn add_version(&self, args: AddVersionArgs) -> Result<()> {
        let manager = self.manager()?;
        let id = handlers::handle_add_version(&manager, &args.into())
            .await
            .context("Failed to start version generation")?;
        let task = wait_for(&manager, &id).await?;
        self.render_task(&task)
    }

    pub async fn transcribe(&self, args: TranscribeArgs) -> Result<()> {
        let client = GeminiClient::new(&self.config).context("Model client unavailable")?;
        let audio = tokio::fs::read(&args.file)
            .await
            .with_context(|| format!("Failed to read {}", args.file.display()))?;
        let mime_type = args.resolved_mime_type();
        debug!("Transcribing {} ({mime_type})", args.file.display());

        let cancel = CancellationToken::new();
        let text = tokio::select! {
            text = client.transcribe(&audio, &mime_type, &cancel) => {
                text.context("Transcription failed")?
            }
            _ = tokio::signal::ctrl_c() => {
                cancel.cancel();
                bail!("Transcription cancelled");
            }
        };

        self.renderer.render(&format!("{text}\n"))?;
        if args.draft {
            if let Some(draft) = drafts::autosave(self.store.as_ref(), &text)
                .await
                .context("Failed to save draft")?
            {
                self.renderer.render(&SaveResult::new(draft).to_string())?;
            }
        }
        Ok(())
    }

    fn manager(&self) -> Result<GenerationManager> {
        let client = GeminiClient::new(&self.config).context("Model client unavailable")?;
        info!("Using model {}", client.model());
        Ok(GenerationManager::new(
            Arc::new(client),
            self.store.clone(),
        ))
    }

    fn render_task(&self, task: &Task) -> Result<()> {
        self.renderer.render(&task.to_string())?;
        match task.status {
            TaskStatus::Completed | TaskStatus::Running => Ok(()),
            TaskStatus::Aborted => bail!("Task {} was cancelled", task.id),
            TaskStatus::Error => bail!(
                "Task {} failed: {}",
                task.id,
                task.error.as_deref().unwrap_or("unknown error")
            ),
        }
    }
}

/// Waits for a task to settle, cancelling it on Ctrl-C.
///
/// A task that is already saving its result cannot be cancelled; it is
/// waited for instead.
async fn wait_for(manager: &GenerationManager, id: &TaskId) -> Result<Task> {
    let cancelled = tokio::select! {
        task = manager.settled(id) => {
            return task.ok_or_else(|| anyhow!("Task {id} disappeared"));
        }
        _ = tokio::signal::ctrl_c() => manager.cancel(id),
    };
    if !cancelled {
        info!("Task {id} is saving its result, waiting for it to finish");
    }
    manager
        .settled(id)
        .await
        .ok_or_else(|| anyhow!("Task {id} disappeared"))
}
