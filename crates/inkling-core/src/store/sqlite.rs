//! SQLite-backed [`ProjectStore`].

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use jiff::Timestamp;
use log::info;
use tokio::task;

use super::ProjectStore;
use crate::{
    db::Database,
    error::{InklingError, Result},
    models::{ContentVersion, Draft, StudioProject, VersionUpdate},
};

/// Project store over a SQLite file.
///
/// Each operation opens its own connection on the blocking thread pool, so
/// the store is cheap to share and never holds a connection across awaits.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db_path: PathBuf,
}

impl SqliteStore {
    /// Creates a store for an already initialized database file.
    pub(crate) fn new(db_path: PathBuf) -> Self {
        Self { db_path }
    }

    /// Path of the backing database file.
    pub fn database_path(&self) -> &Path {
        &self.db_path
    }

    async fn with_db<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Database) -> Result<T> + Send + 'static,
    {
        let db_path = self.db_path.clone();
        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            op(&mut db)
        })
        .await
        .map_err(|e| InklingError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }
}

#[async_trait]
impl ProjectStore for SqliteStore {
    async fn list_projects(&self) -> Result<Vec<StudioProject>> {
        self.with_db(|db| db.list_projects()).await
    }

    async fn get_project(&self, id: &str) -> Result<Option<StudioProject>> {
        let id = id.to_string();
        self.with_db(move |db| db.get_project(&id)).await
    }

    async fn upsert_project(&self, project: &StudioProject) -> Result<()> {
        let project = project.clone();
        let (id, title, count) = (project.id.clone(), project.title.clone(), project.versions.len());
        self.with_db(move |db| db.upsert_project(&project)).await?;
        info!("SAVE_PROJECT id={id} title={title:?} versions={count}");
        Ok(())
    }

    async fn append_versions(
        &self,
        project_id: &str,
        versions: &[ContentVersion],
        timestamp: Timestamp,
    ) -> Result<Option<StudioProject>> {
        let (id, versions) = (project_id.to_string(), versions.to_vec());
        let log_id = id.clone();
        let appended = self
            .with_db(move |db| match db.append_versions(&id, &versions, timestamp)? {
                Some(added) => Ok(db.get_project(&id)?.map(|project| (added, project))),
                None => Ok(None),
            })
            .await?;

        match appended {
            Some((added, project)) => {
                info!(
                    "APPEND_VERSIONS id={log_id} added={added} versions={}",
                    project.versions.len()
                );
                Ok(Some(project))
            }
            None => Ok(None),
        }
    }

    async fn remove_version(
        &self,
        project_id: &str,
        version_id: &str,
        timestamp: Timestamp,
    ) -> Result<StudioProject> {
        let (id, version_id) = (project_id.to_string(), version_id.to_string());
        self.with_db(move |db| {
            db.remove_version(&id, &version_id, timestamp)?;
            db.get_project(&id)?
                .ok_or(InklingError::ProjectNotFound { id })
        })
        .await
    }

    async fn delete_project(&self, id: &str) -> Result<bool> {
        let id = id.to_string();
        self.with_db(move |db| db.delete_project(&id)).await
    }

    async fn update_version_fields(
        &self,
        project_id: &str,
        version_id: &str,
        update: &VersionUpdate,
    ) -> Result<()> {
        let (project_id, version_id, update) =
            (project_id.to_string(), version_id.to_string(), update.clone());
        self.with_db(move |db| db.update_version_fields(&project_id, &version_id, &update))
            .await
    }

    async fn list_drafts(&self) -> Result<Vec<Draft>> {
        self.with_db(|db| db.list_drafts()).await
    }

    async fn upsert_draft(&self, draft: &Draft) -> Result<()> {
        let draft = draft.clone();
        let id = draft.id.clone();
        self.with_db(move |db| db.upsert_draft(&draft)).await?;
        info!("SAVE_DRAFT id={id}");
        Ok(())
    }

    async fn delete_draft(&self, id: &str) -> Result<bool> {
        let id = id.to_string();
        self.with_db(move |db| db.delete_draft(&id)).await
    }
}
