//! Shared workflows used by every interface.
//!
//! The CLI and the MCP server both go through these functions so that a
//! command behaves the same wherever it is issued. They return domain
//! objects; formatting is left to the caller.
//!
//! ```text
//! Interface → Handler → GenerationManager / ProjectStore → Models
//! ```
//!
//! Query handlers return `Option` for missing resources and leave the
//! "not found" wording to the interface. Command handlers return the
//! resource they touched.

use log::debug;

use crate::{
    drafts,
    error::{InklingError, Result},
    manager::GenerationManager,
    models::{ContentVersion, Draft, StudioProject, TaskId},
    params::{AddVersion, Id, RefineNote, SaveDraft, UpdateVersion},
    store::ProjectStore,
};

/// Validates the note and starts a bulk refinement task.
///
/// # Examples
///
/// ```rust,no_run
/// # use inkling_core::{handlers::handle_refine_note, params::RefineNote, GenerationManager};
/// # fn example(manager: &GenerationManager) -> inkling_core::Result<()> {
/// let params = RefineNote { note: "rain on the window".to_string() };
/// let task_id = handle_refine_note(manager, &params)?;
/// println!("started {task_id}");
/// # Ok(())
/// # }
/// ```
pub fn handle_refine_note(manager: &GenerationManager, params: &RefineNote) -> Result<TaskId> {
    let note = params.validate()?;
    Ok(manager.start_bulk_task(note))
}

/// Starts generating one more version for a stored project.
///
/// The project must exist when the task starts. The note defaults to the
/// project's original note when the caller gives none or a blank one.
pub async fn handle_add_version(
    manager: &GenerationManager,
    params: &AddVersion,
) -> Result<TaskId> {
    let project = manager
        .store()
        .get_project(&params.project_id)
        .await?
        .ok_or_else(|| InklingError::ProjectNotFound {
            id: params.project_id.clone(),
        })?;

    let note = params
        .note
        .as_deref()
        .map(str::trim)
        .filter(|note| !note.is_empty())
        .unwrap_or(project.original_note.as_str());
    if note.trim().is_empty() {
        return Err(InklingError::invalid_input("note")
            .with_reason("Project has no original note, provide one"));
    }

    debug!("Adding a version to project {}", project.id);
    Ok(manager.start_single_addition_task(note, &project.id))
}

/// Fetches one project by ID.
pub async fn handle_show_project(
    store: &dyn ProjectStore,
    params: &Id,
) -> Result<Option<StudioProject>> {
    store.get_project(&params.id).await
}

/// Deletes a project, returning what was removed.
pub async fn handle_delete_project(
    store: &dyn ProjectStore,
    params: &Id,
) -> Result<Option<StudioProject>> {
    let Some(project) = store.get_project(&params.id).await? else {
        return Ok(None);
    };
    store.delete_project(&project.id).await?;
    Ok(Some(project))
}

/// Edits a stored version's title or content and returns the new version.
pub async fn handle_update_version(
    store: &dyn ProjectStore,
    params: &UpdateVersion,
) -> Result<ContentVersion> {
    let update = params.validate()?;
    store
        .update_version_fields(&params.project_id, &params.version_id, &update)
        .await?;

    store
        .get_project(&params.project_id)
        .await?
        .and_then(|project| project.version(&params.version_id).cloned())
        .ok_or_else(|| InklingError::VersionNotFound {
            project_id: params.project_id.clone(),
            version_id: params.version_id.clone(),
        })
}

/// Saves a draft unless it is blank or repeats the latest one.
pub async fn handle_save_draft(store: &dyn ProjectStore, params: &SaveDraft) -> Result<Option<Draft>> {
    drafts::autosave(store, &params.text).await
}

/// Deletes a draft, returning what was removed.
pub async fn handle_delete_draft(store: &dyn ProjectStore, params: &Id) -> Result<Option<Draft>> {
    let Some(draft) = store
        .list_drafts()
        .await?
        .into_iter()
        .find(|draft| draft.id == params.id)
    else {
        return Ok(None);
    };
    store.delete_draft(&draft.id).await?;
    Ok(Some(draft))
}
