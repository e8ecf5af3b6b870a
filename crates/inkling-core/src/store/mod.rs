//! Async persistence seam for projects and drafts.
//!
//! The generation manager and the reconciliation logic only ever talk to a
//! [`ProjectStore`]. [`SqliteStore`] is the production implementation; tests
//! substitute their own.
//!
//! ```rust,no_run
//! use inkling_core::{ProjectStore, StoreBuilder};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = StoreBuilder::new()
//!     .with_database_path(Some("inkling.db"))
//!     .build()
//!     .await?;
//!
//! for project in store.list_projects().await? {
//!     println!("{}", project.title);
//! }
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use jiff::Timestamp;

use crate::{
    error::Result,
    models::{ContentVersion, Draft, StudioProject, VersionUpdate},
};

pub mod builder;
pub mod sqlite;

#[cfg(test)]
pub(crate) mod memory;
#[cfg(test)]
mod tests;

pub use builder::StoreBuilder;
pub use sqlite::SqliteStore;

/// Durable storage for projects and drafts.
///
/// `upsert_project` writes a whole aggregate, making the stored version set
/// equal to the payload's. `append_versions` and `remove_version` each touch
/// only the versions they name, so concurrent writers to one project never
/// undo each other.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// All projects, most recently modified first.
    async fn list_projects(&self) -> Result<Vec<StudioProject>>;

    /// One project by id.
    async fn get_project(&self, id: &str) -> Result<Option<StudioProject>> {
        Ok(self
            .list_projects()
            .await?
            .into_iter()
            .find(|project| project.id == id))
    }

    /// Inserts or replaces a project and its version set.
    async fn upsert_project(&self, project: &StudioProject) -> Result<()>;

    /// Atomically appends the versions whose id the project does not hold
    /// yet and sets its timestamp.
    ///
    /// Returns the project as stored afterwards, or `None`, writing
    /// nothing, when the project does not exist.
    async fn append_versions(
        &self,
        project_id: &str,
        versions: &[ContentVersion],
        timestamp: Timestamp,
    ) -> Result<Option<StudioProject>>;

    /// Atomically deletes one version of a project and sets its timestamp.
    /// Returns the project as stored afterwards.
    ///
    /// # Errors
    ///
    /// `ProjectNotFound` or `VersionNotFound` for unknown ids, and
    /// `InvalidInput` when the version is the project's last one.
    async fn remove_version(
        &self,
        project_id: &str,
        version_id: &str,
        timestamp: Timestamp,
    ) -> Result<StudioProject>;

    /// Deletes a project. Returns whether it existed.
    async fn delete_project(&self, id: &str) -> Result<bool>;

    /// Edits the title and/or content of one stored version.
    async fn update_version_fields(
        &self,
        project_id: &str,
        version_id: &str,
        update: &VersionUpdate,
    ) -> Result<()>;

    /// All drafts, newest first.
    async fn list_drafts(&self) -> Result<Vec<Draft>>;

    /// Inserts or replaces a draft.
    async fn upsert_draft(&self, draft: &Draft) -> Result<()>;

    /// Deletes a draft. Returns whether it existed.
    async fn delete_draft(&self, id: &str) -> Result<bool>;
}
