//! Parameter structures for inkling operations
//!
//! These structures are shared by every interface (CLI, MCP) and carry no
//! framework-specific derives beyond serde. JSON schema support is enabled
//! with the `schema` feature for interfaces that need it.
//!
//! ## Parameter Wrapper Pattern
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │   CLI Args      │    │   MCP Params    │    │  Core Params    │
//! │  (clap derives) │───▶│ (serde derives) │───▶│ (minimal deps)  │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! The CLI defines `clap::Args` wrappers that convert into these types with
//! `From`; the MCP server deserializes them directly.

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    error::{InklingError, Result},
    models::{ContentVersion, VersionUpdate},
};

/// Parameters for operations addressing a project, draft or task by ID.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct Id {
    /// The ID of the resource to operate on
    pub id: String,
}

/// Parameters for starting a bulk refinement of a raw note.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct RefineNote {
    /// The raw note to rewrite in several styles
    pub note: String,
}

impl RefineNote {
    /// Rejects blank notes.
    pub fn validate(&self) -> Result<&str> {
        non_blank("note", &self.note)
    }
}

/// Parameters for generating one more version into an existing project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct AddVersion {
    /// ID of the project that receives the version
    pub project_id: String,
    /// Note the version is generated from. Defaults to the project's
    /// original note when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Parameters for persisting a set of versions as a project ("save all").
///
/// Versions whose ID starts with `temp-` receive permanent IDs; the
/// project's title, tags and main image are taken from the first version.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct SaveProject {
    /// The note the versions were generated from
    pub original_note: String,
    /// Versions to store, in display order (at least one)
    pub versions: Vec<ContentVersion>,
    /// Existing project to overwrite; a new project is created when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
}

/// Parameters for editing a stored version in place.
///
/// Empty strings are treated as "leave unchanged".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct UpdateVersion {
    /// ID of the project owning the version
    pub project_id: String,
    /// ID of the version to edit
    pub version_id: String,
    /// New title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New body text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl UpdateVersion {
    /// Extracts the field update, rejecting requests that change nothing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use inkling_core::params::UpdateVersion;
    ///
    /// let params = UpdateVersion {
    ///     project_id: "project-1".to_string(),
    ///     version_id: "v-1".to_string(),
    ///     title: Some("New title".to_string()),
    ///     content: Some(String::new()),
    /// };
    /// let update = params.validate()?;
    /// assert_eq!(update.title(), Some("New title"));
    /// assert_eq!(update.content(), None);
    /// # Ok::<(), inkling_core::InklingError>(())
    /// ```
    pub fn validate(&self) -> Result<VersionUpdate> {
        let update = VersionUpdate {
            title: self.title.clone(),
            content: self.content.clone(),
        };
        if update.is_empty() {
            return Err(InklingError::invalid_input("title")
                .with_reason("Provide a non-empty title or content to update"));
        }
        Ok(update)
    }
}

/// Parameters for removing one version from a stored project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct RemoveVersion {
    /// ID of the project owning the version
    pub project_id: String,
    /// ID of the version to remove
    pub version_id: String,
}

/// Parameters for saving a draft.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct SaveDraft {
    /// Draft text
    pub text: String,
}

fn non_blank<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(InklingError::invalid_input(field).with_reason("must not be empty"));
    }
    Ok(trimmed)
}
