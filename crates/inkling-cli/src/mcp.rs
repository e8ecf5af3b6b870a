//! MCP server for Inkling
//!
//! Exposes the note studio to AI assistants over the Model Context Protocol.
//! The server hosts one long-lived [`GenerationManager`], so generation tools
//! return a task ID immediately and the assistant polls with `show_task`.

use std::{future::Future, sync::Arc};

use anyhow::Result;
use inkling_core::{
    display::{DeleteResult, Drafts, OperationStatus, Projects, SaveResult, Tasks},
    handlers, params as core, reconcile, Config, GeminiClient, GenerationManager, InklingError,
    ProjectStore, SqliteStore, TaskId,
};
use log::{debug, error, info, warn};
use rmcp::{
    handler::server::{router::tool::ToolRouter, tool::Parameters},
    model::{
        CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    tool, tool_handler, tool_router, ErrorData, ServerHandler,
};
use schemars::JsonSchema;
use serde::Deserialize;
use tokio::signal::unix::{signal, SignalKind};

/// Generic MCP wrapper for core parameter types
///
/// `#[serde(transparent)]` passes deserialization straight through to the
/// wrapped type, and the schema is the wrapped type's schema.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct McpParams<T>(T)
where
    T: JsonSchema;

impl<T> JsonSchema for McpParams<T>
where
    T: JsonSchema,
{
    fn schema_name() -> std::borrow::Cow<'static, str> {
        T::schema_name()
    }

    fn json_schema(g: &mut schemars::SchemaGenerator) -> schemars::Schema {
        T::json_schema(g)
    }
}

impl<T> AsRef<T> for McpParams<T>
where
    T: JsonSchema,
{
    fn as_ref(&self) -> &T {
        &self.0
    }
}

pub type Id = McpParams<core::Id>;
pub type RefineNote = McpParams<core::RefineNote>;
pub type AddVersion = McpParams<core::AddVersion>;
pub type SaveProject = McpParams<core::SaveProject>;
pub type UpdateVersion = McpParams<core::UpdateVersion>;
pub type RemoveVersion = McpParams<core::RemoveVersion>;
pub type SaveDraft = McpParams<core::SaveDraft>;

pub type McpResult = Result<CallToolResult, ErrorData>;

fn to_mcp_error(message: &str, error: &InklingError) -> ErrorData {
    ErrorData::internal_error(format!("{message}: {error}"), None)
}

fn text(output: impl ToString) -> McpResult {
    Ok(CallToolResult::success(vec![Content::text(
        output.to_string(),
    )]))
}

/// MCP server for Inkling
#[derive(Clone)]
pub struct InklingMcpServer {
    store: Arc<SqliteStore>,
    /// `None` when no API key is configured; store tools keep working.
    manager: Option<GenerationManager>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl InklingMcpServer {
    pub fn new(store: Arc<SqliteStore>, config: &Config) -> Self {
        let manager = match GeminiClient::new(config) {
            Ok(client) => Some(GenerationManager::new(Arc::new(client), store.clone())),
            Err(e) => {
                warn!("Generation tools disabled: {e}");
                None
            }
        };
        Self {
            store,
            manager,
            tool_router: Self::tool_router(),
        }
    }

    fn manager(&self) -> Result<&GenerationManager, ErrorData> {
        self.manager.as_ref().ok_or_else(|| {
            ErrorData::internal_error(
                "No model API key configured. Set GEMINI_API_KEY or gemini.apiKey in the config file.",
                None,
            )
        })
    }

    #[tool(
        name = "refine_note",
        description = "Rewrite a raw note in several styles (detailed, story, analysis, minimalist). Returns a task ID immediately; poll show_task until the task is completed, then pass its versions to save_project to keep them."
    )]
    async fn refine_note(&self, Parameters(params): Parameters<RefineNote>) -> McpResult {
        debug!("refine_note: {params:?}");

        let id = handlers::handle_refine_note(self.manager()?, params.as_ref())
            .map_err(|e| to_mcp_error("Failed to start refinement", &e))?;
        text(OperationStatus::success(format!(
            "Started task {id}. Use show_task to follow it."
        )))
    }

    #[tool(
        name = "add_version",
        description = "Generate one more version for a saved project. The note defaults to the project's original note. Returns a task ID; the version is added to the project automatically when the task completes."
    )]
    async fn add_version(&self, Parameters(params): Parameters<AddVersion>) -> McpResult {
        debug!("add_version: {params:?}");

        let id = handlers::handle_add_version(self.manager()?, params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to start version generation", &e))?;
        text(OperationStatus::success(format!(
            "Started task {id} for project {}. Use show_task to follow it.",
            params.as_ref().project_id
        )))
    }

    #[tool(
        name = "cancel_task",
        description = "Cancel a running generation task. The task is marked aborted at once and its result, if any arrives later, is discarded."
    )]
    async fn cancel_task(&self, Parameters(params): Parameters<Id>) -> McpResult {
        debug!("cancel_task: {params:?}");

        let id = TaskId::from(params.as_ref().id.as_str());
        let status = if self.manager()?.cancel(&id) {
            OperationStatus::success(format!("Task {id} cancelled"))
        } else {
            OperationStatus::failure(format!("Task {id} is not running or is saving its result"))
        };
        text(status)
    }

    #[tool(
        name = "list_tasks",
        description = "List generation tasks started during this session with their status."
    )]
    async fn list_tasks(&self) -> McpResult {
        let snapshot = self.manager()?.tasks();
        text(Tasks(snapshot.tasks()))
    }

    #[tool(
        name = "show_task",
        description = "Show one generation task. Completed tasks include the generated versions; failed tasks include the reason."
    )]
    async fn show_task(&self, Parameters(params): Parameters<Id>) -> McpResult {
        debug!("show_task: {params:?}");

        let id = TaskId::from(params.as_ref().id.as_str());
        let task = self
            .manager()?
            .task(&id)
            .ok_or_else(|| ErrorData::internal_error(format!("Task {id} not found"), None))?;
        text(task)
    }

    #[tool(
        name = "save_project",
        description = "Save versions as a project. Provide originalNote and the versions (at least one), usually the output of a completed refine_note task. Temporary version IDs are replaced. Pass projectId to overwrite an existing project."
    )]
    async fn save_project(&self, Parameters(params): Parameters<SaveProject>) -> McpResult {
        debug!("save_project: {params:?}");

        let project = reconcile::save_project_with_versions(self.store.as_ref(), params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to save project", &e))?;
        text(SaveResult::new(project))
    }

    #[tool(
        name = "list_projects",
        description = "List saved projects, most recently updated first, with their IDs and version counts."
    )]
    async fn list_projects(&self) -> McpResult {
        let projects = self
            .store
            .list_projects()
            .await
            .map_err(|e| to_mcp_error("Failed to list projects", &e))?;
        text(Projects(projects))
    }

    #[tool(
        name = "show_project",
        description = "Show a saved project with its original note and the full text of every version."
    )]
    async fn show_project(&self, Parameters(params): Parameters<Id>) -> McpResult {
        debug!("show_project: {params:?}");

        let project = handlers::handle_show_project(self.store.as_ref(), params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to get project", &e))?
            .ok_or_else(|| {
                ErrorData::internal_error(
                    format!("Project with ID {} not found", params.as_ref().id),
                    None,
                )
            })?;
        text(project)
    }

    #[tool(
        name = "delete_project",
        description = "Permanently delete a project and all its versions. This cannot be undone."
    )]
    async fn delete_project(&self, Parameters(params): Parameters<Id>) -> McpResult {
        debug!("delete_project: {params:?}");

        let project = handlers::handle_delete_project(self.store.as_ref(), params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to delete project", &e))?
            .ok_or_else(|| {
                ErrorData::internal_error(
                    format!("Project with ID {} not found", params.as_ref().id),
                    None,
                )
            })?;
        text(DeleteResult::new(project))
    }

    #[tool(
        name = "update_version",
        description = "Edit the title or content of a saved version. Omitted or empty fields are left unchanged."
    )]
    async fn update_version(&self, Parameters(params): Parameters<UpdateVersion>) -> McpResult {
        debug!("update_version: {params:?}");

        let version = handlers::handle_update_version(self.store.as_ref(), params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to update version", &e))?;
        text(SaveResult::new(version))
    }

    #[tool(
        name = "remove_version",
        description = "Remove one version from a saved project. The last version of a project cannot be removed; delete the project instead."
    )]
    async fn remove_version(&self, Parameters(params): Parameters<RemoveVersion>) -> McpResult {
        debug!("remove_version: {params:?}");

        let project = reconcile::remove_version(self.store.as_ref(), params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to remove version", &e))?;
        text(OperationStatus::success(format!(
            "Removed version {} from project {} ({} left)",
            params.as_ref().version_id,
            project.id,
            project.versions.len()
        )))
    }

    #[tool(name = "list_drafts", description = "List drafts, newest first.")]
    async fn list_drafts(&self) -> McpResult {
        let drafts = self
            .store
            .list_drafts()
            .await
            .map_err(|e| to_mcp_error("Failed to list drafts", &e))?;
        text(Drafts(drafts))
    }

    #[tool(
        name = "save_draft",
        description = "Save a note as a draft. Blank text and text identical to the latest draft are not saved again."
    )]
    async fn save_draft(&self, Parameters(params): Parameters<SaveDraft>) -> McpResult {
        debug!("save_draft: {params:?}");

        let saved = handlers::handle_save_draft(self.store.as_ref(), params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to save draft", &e))?;
        match saved {
            Some(draft) => text(SaveResult::new(draft)),
            None => text(OperationStatus::success(
                "Draft unchanged, nothing saved (blank or same as the latest draft)",
            )),
        }
    }

    #[tool(name = "delete_draft", description = "Delete a draft by ID.")]
    async fn delete_draft(&self, Parameters(params): Parameters<Id>) -> McpResult {
        debug!("delete_draft: {params:?}");

        let draft = handlers::handle_delete_draft(self.store.as_ref(), params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to delete draft", &e))?
            .ok_or_else(|| {
                ErrorData::internal_error(
                    format!("Draft with ID {} not found", params.as_ref().id),
                    None,
                )
            })?;
        text(DeleteResult::new(draft))
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for InklingMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "inkling".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            instructions: Some(r#"Inkling turns raw notes into polished writing with a generative model.

## Core Concepts
- **Versions**: one rewrite of a note in a style (detailed, story, analysis, minimalist, standard)
- **Projects**: a saved note with the versions kept from it
- **Tasks**: background generation requests with status running, completed, error or aborted
- **Drafts**: notes saved for later

## Workflow
1. `refine_note` with the raw note; it returns a task ID
2. `show_task` until the task is completed
3. `save_project` with the note and the versions you want to keep
4. `add_version` later to generate one more version into the project

Use `cancel_task` to stop a generation you no longer need."#.to_string()),
        }
    }
}

/// Run the MCP server with stdio transport
pub async fn run_stdio_server(server: InklingMcpServer) -> Result<()> {
    use rmcp::{transport::stdio, ServiceExt};

    info!("Starting Inkling MCP server on stdio");
    debug!(
        "Server created with {} tools",
        server.tool_router.list_all().len()
    );

    let service = server.serve(stdio()).await.inspect_err(|e| {
        error!("serving error: {e:?}");
    })?;

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        result = service.waiting() => {
            match result {
                Ok(_) => info!("MCP server stopped normally"),
                Err(e) => error!("MCP server error: {e:?}"),
            }
        }
        _ = sigint.recv() => {
            info!("Received SIGINT, shutting down gracefully...");
        }
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down gracefully...");
        }
    }

    info!("MCP server shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use inkling_core::StoreBuilder;
    use tempfile::TempDir;

    use super::*;

    async fn create_server(api_key: Option<&str>) -> (TempDir, InklingMcpServer) {
        let temp_dir = TempDir::new().expect("Failed to create temporary directory");
        let store = StoreBuilder::new()
            .with_database_path(Some(temp_dir.path().join("mcp.db")))
            .build()
            .await
            .expect("Failed to create store");
        let config = Config::default().with_api_key_override(api_key.map(str::to_string));
        (temp_dir, InklingMcpServer::new(Arc::new(store), &config))
    }

    fn output_text(result: &CallToolResult) -> String {
        result
            .content
            .iter()
            .filter_map(|content| content.as_text().map(|t| t.text.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_tools_are_registered() {
        let (_temp_dir, server) = create_server(None).await;
        let names: Vec<String> = server
            .tool_router
            .list_all()
            .into_iter()
            .map(|tool| tool.name.to_string())
            .collect();

        for expected in [
            "refine_note",
            "add_version",
            "cancel_task",
            "list_tasks",
            "show_task",
            "save_project",
            "list_projects",
            "show_project",
            "delete_project",
            "update_version",
            "remove_version",
            "list_drafts",
            "save_draft",
            "delete_draft",
        ] {
            assert!(names.iter().any(|n| n == expected), "missing tool {expected}");
        }
    }

    #[tokio::test]
    async fn test_generation_tools_need_api_key() {
        let (_temp_dir, server) = create_server(None).await;

        let err = server.list_tasks().await.unwrap_err();
        assert!(err.message.contains("API key"));
    }

    #[tokio::test]
    async fn test_cancel_unknown_task_reports_failure() {
        let (_temp_dir, server) = create_server(Some("test-key")).await;

        let result = server
            .cancel_task(Parameters(McpParams(core::Id {
                id: "refine-missing".to_string(),
            })))
            .await
            .unwrap();
        assert!(output_text(&result).starts_with("Error:"));
    }

    #[tokio::test]
    async fn test_draft_tools_round_trip() {
        let (_temp_dir, server) = create_server(None).await;

        let saved = server
            .save_draft(Parameters(McpParams(core::SaveDraft {
                text: "an idea".to_string(),
            })))
            .await
            .unwrap();
        assert!(output_text(&saved).contains("Saved draft with ID:"));

        let unchanged = server
            .save_draft(Parameters(McpParams(core::SaveDraft {
                text: "an idea".to_string(),
            })))
            .await
            .unwrap();
        assert!(output_text(&unchanged).contains("nothing saved"));

        let listed = server.list_drafts().await.unwrap();
        assert!(output_text(&listed).contains("an idea"));
    }

    #[tokio::test]
    async fn test_show_missing_project_is_error() {
        let (_temp_dir, server) = create_server(None).await;

        let err = server
            .show_project(Parameters(McpParams(core::Id {
                id: "project-1".to_string(),
            })))
            .await
            .unwrap_err();
        assert!(err.message.contains("project-1"));
    }
}
