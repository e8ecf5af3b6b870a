//! Project and version CRUD operations and queries.

use std::collections::{HashMap, HashSet};

use jiff::Timestamp;
use rusqlite::{params, types::Type, Row, TransactionBehavior};

use crate::{
    error::{DatabaseResultExt, InklingError, Result},
    models::{ContentVersion, StudioProject, VersionStyle, VersionUpdate},
};

const UPSERT_PROJECT_SQL: &str = "INSERT INTO projects (id, title, original_note, tags, timestamp, main_image_url) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
     ON CONFLICT(id) DO UPDATE SET title = excluded.title, original_note = excluded.original_note, \
     tags = excluded.tags, timestamp = excluded.timestamp, main_image_url = excluded.main_image_url";
const UPSERT_VERSION_SQL: &str = "INSERT INTO versions (id, project_id, position, title, content, description, tags, image_url, type, is_recommended) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10) \
     ON CONFLICT(id) DO UPDATE SET project_id = excluded.project_id, position = excluded.position, \
     title = excluded.title, content = excluded.content, description = excluded.description, \
     tags = excluded.tags, image_url = excluded.image_url, type = excluded.type, \
     is_recommended = excluded.is_recommended";
const APPEND_VERSION_SQL: &str = "INSERT INTO versions (id, project_id, position, title, content, description, tags, image_url, type, is_recommended) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10) \
     ON CONFLICT(id) DO NOTHING";
const TOUCH_PROJECT_SQL: &str = "UPDATE projects SET timestamp = ?1 WHERE id = ?2";
const NEXT_POSITION_SQL: &str = "SELECT COALESCE(MAX(position), -1) + 1 FROM versions WHERE project_id = ?1";
const PROJECT_EXISTS_SQL: &str = "SELECT EXISTS(SELECT 1 FROM projects WHERE id = ?1)";
const COUNT_PROJECT_VERSIONS_SQL: &str = "SELECT COUNT(*), COALESCE(SUM(id = ?2), 0) FROM versions WHERE project_id = ?1";
const SELECT_VERSION_IDS_SQL: &str = "SELECT id FROM versions WHERE project_id = ?1";
const DELETE_VERSION_SQL: &str = "DELETE FROM versions WHERE id = ?1 AND project_id = ?2";
const SELECT_PROJECTS_SQL: &str = "SELECT id, title, original_note, tags, timestamp, main_image_url FROM projects ORDER BY timestamp DESC, id";
const SELECT_PROJECT_SQL: &str = "SELECT id, title, original_note, tags, timestamp, main_image_url FROM projects WHERE id = ?1";
const SELECT_ALL_VERSIONS_SQL: &str = "SELECT id, project_id, title, content, description, tags, image_url, type, is_recommended FROM versions ORDER BY project_id, position";
const SELECT_PROJECT_VERSIONS_SQL: &str = "SELECT id, project_id, title, content, description, tags, image_url, type, is_recommended FROM versions WHERE project_id = ?1 ORDER BY position";
const DELETE_PROJECT_VERSIONS_SQL: &str = "DELETE FROM versions WHERE project_id = ?1";
const DELETE_PROJECT_SQL: &str = "DELETE FROM projects WHERE id = ?1";
const UPDATE_VERSION_FIELDS_SQL: &str = "UPDATE versions SET title = COALESCE(?1, title), content = COALESCE(?2, content) WHERE id = ?3 AND project_id = ?4";

impl super::Database {
    /// Inserts or replaces a project as a whole aggregate.
    ///
    /// Stored versions of the project that are absent from `project.versions`
    /// are deleted; the rest are upserted in payload order.
    pub fn upsert_project(&mut self, project: &StudioProject) -> Result<()> {
        let tags = serde_json::to_string(&project.tags)?;

        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        tx.execute(
            UPSERT_PROJECT_SQL,
            params![
                project.id,
                project.title,
                project.original_note,
                tags,
                project.timestamp.as_millisecond(),
                project.main_image_url,
            ],
        )
        .db_context("Failed to upsert project")?;

        let payload_ids: HashSet<&str> = project.versions.iter().map(|v| v.id.as_str()).collect();
        let stored_ids: Vec<String> = {
            let mut stmt = tx
                .prepare(SELECT_VERSION_IDS_SQL)
                .db_context("Failed to prepare version id query")?;
            let ids = stmt
                .query_map(params![project.id], |row| row.get(0))
                .db_context("Failed to query version ids")?
                .collect::<std::result::Result<Vec<String>, _>>()
                .db_context("Failed to read version ids")?;
            ids
        };
        for stale in stored_ids.iter().filter(|id| !payload_ids.contains(id.as_str())) {
            tx.execute(DELETE_VERSION_SQL, params![stale, project.id])
                .db_context("Failed to delete removed version")?;
        }

        for (position, version) in project.versions.iter().enumerate() {
            let version_tags = serde_json::to_string(&version.tags)?;
            tx.execute(
                UPSERT_VERSION_SQL,
                params![
                    version.id,
                    project.id,
                    position as i64,
                    version.title,
                    version.content,
                    version.description,
                    version_tags,
                    version.image_url,
                    version.style.as_str(),
                    version.is_recommended,
                ],
            )
            .db_context("Failed to upsert version")?;
        }

        tx.commit().db_context("Failed to commit transaction")?;
        Ok(())
    }

    /// Appends versions to an existing project without touching the ones
    /// already stored.
    ///
    /// Versions whose id is already taken are skipped. The existence check,
    /// the inserts and the timestamp update share one immediate transaction,
    /// so concurrent appends never lose each other's versions and a project
    /// deleted in the meantime is not recreated. Returns the number of
    /// versions added, or `None` when the project does not exist.
    pub fn append_versions(
        &mut self,
        project_id: &str,
        versions: &[ContentVersion],
        timestamp: Timestamp,
    ) -> Result<Option<usize>> {
        let tx = self
            .connection
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .db_context("Failed to begin transaction")?;

        let touched = tx
            .execute(
                TOUCH_PROJECT_SQL,
                params![timestamp.as_millisecond(), project_id],
            )
            .db_context("Failed to update project timestamp")?;
        if touched == 0 {
            return Ok(None);
        }

        let mut position: i64 = tx
            .query_row(NEXT_POSITION_SQL, params![project_id], |row| row.get(0))
            .db_context("Failed to read version positions")?;
        let mut added = 0;
        for version in versions {
            let version_tags = serde_json::to_string(&version.tags)?;
            let inserted = tx
                .execute(
                    APPEND_VERSION_SQL,
                    params![
                        version.id,
                        project_id,
                        position,
                        version.title,
                        version.content,
                        version.description,
                        version_tags,
                        version.image_url,
                        version.style.as_str(),
                        version.is_recommended,
                    ],
                )
                .db_context("Failed to append version")?;
            if inserted > 0 {
                position += 1;
                added += 1;
            }
        }

        tx.commit().db_context("Failed to commit transaction")?;
        Ok(Some(added))
    }

    /// Deletes one version of a project and sets the project's timestamp.
    ///
    /// A project always keeps at least one version, so removing the last
    /// one is rejected. Other versions are left alone, including ones
    /// appended since the caller last read the project.
    pub fn remove_version(
        &mut self,
        project_id: &str,
        version_id: &str,
        timestamp: Timestamp,
    ) -> Result<()> {
        let tx = self
            .connection
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .db_context("Failed to begin transaction")?;

        let exists: bool = tx
            .query_row(PROJECT_EXISTS_SQL, params![project_id], |row| row.get(0))
            .db_context("Failed to query project")?;
        if !exists {
            return Err(InklingError::ProjectNotFound {
                id: project_id.to_string(),
            });
        }

        let (total, matching): (i64, i64) = tx
            .query_row(
                COUNT_PROJECT_VERSIONS_SQL,
                params![project_id, version_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .db_context("Failed to count versions")?;
        if matching == 0 {
            return Err(InklingError::VersionNotFound {
                project_id: project_id.to_string(),
                version_id: version_id.to_string(),
            });
        }
        if total == 1 {
            return Err(InklingError::invalid_input("version_id")
                .with_reason("Cannot remove the only version of a project"));
        }

        tx.execute(DELETE_VERSION_SQL, params![version_id, project_id])
            .db_context("Failed to delete version")?;
        tx.execute(
            TOUCH_PROJECT_SQL,
            params![timestamp.as_millisecond(), project_id],
        )
        .db_context("Failed to update project timestamp")?;

        tx.commit().db_context("Failed to commit transaction")?;
        Ok(())
    }

    /// Lists all projects, most recently modified first, with their versions.
    pub fn list_projects(&self) -> Result<Vec<StudioProject>> {
        let mut stmt = self
            .connection
            .prepare(SELECT_ALL_VERSIONS_SQL)
            .db_context("Failed to prepare versions query")?;
        let mut versions_by_project: HashMap<String, Vec<ContentVersion>> = HashMap::new();
        let rows = stmt
            .query_map([], version_from_row)
            .db_context("Failed to query versions")?;
        for row in rows {
            let (project_id, version) = row.db_context("Failed to read version")?;
            versions_by_project.entry(project_id).or_default().push(version);
        }

        let mut stmt = self
            .connection
            .prepare(SELECT_PROJECTS_SQL)
            .db_context("Failed to prepare projects query")?;
        let projects = stmt
            .query_map([], project_from_row)
            .db_context("Failed to query projects")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .db_context("Failed to read projects")?;

        Ok(projects
            .into_iter()
            .map(|mut project| {
                project.versions = versions_by_project.remove(&project.id).unwrap_or_default();
                project
            })
            .collect())
    }

    /// Retrieves a project with its versions.
    pub fn get_project(&self, id: &str) -> Result<Option<StudioProject>> {
        let mut stmt = self
            .connection
            .prepare(SELECT_PROJECT_SQL)
            .db_context("Failed to prepare project query")?;
        let mut rows = stmt
            .query_map(params![id], project_from_row)
            .db_context("Failed to query project")?;
        let Some(project) = rows.next() else {
            return Ok(None);
        };
        let mut project = project.db_context("Failed to read project")?;

        let mut stmt = self
            .connection
            .prepare(SELECT_PROJECT_VERSIONS_SQL)
            .db_context("Failed to prepare versions query")?;
        project.versions = stmt
            .query_map(params![id], version_from_row)
            .db_context("Failed to query versions")?
            .map(|row| row.map(|(_, version)| version))
            .collect::<std::result::Result<Vec<_>, _>>()
            .db_context("Failed to read versions")?;

        Ok(Some(project))
    }

    /// Permanently deletes a project and its versions. Returns whether a
    /// project was removed.
    pub fn delete_project(&mut self, id: &str) -> Result<bool> {
        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;

        tx.execute(DELETE_PROJECT_VERSIONS_SQL, params![id])
            .db_context("Failed to delete project versions")?;
        let deleted = tx
            .execute(DELETE_PROJECT_SQL, params![id])
            .db_context("Failed to delete project")?;

        tx.commit().db_context("Failed to commit transaction")?;
        Ok(deleted > 0)
    }

    /// Updates the title and/or content of a single stored version.
    pub fn update_version_fields(
        &self,
        project_id: &str,
        version_id: &str,
        update: &VersionUpdate,
    ) -> Result<()> {
        let changed = self
            .connection
            .execute(
                UPDATE_VERSION_FIELDS_SQL,
                params![update.title(), update.content(), version_id, project_id],
            )
            .db_context("Failed to update version")?;

        if changed == 0 {
            return Err(InklingError::VersionNotFound {
                project_id: project_id.to_string(),
                version_id: version_id.to_string(),
            });
        }
        Ok(())
    }
}

fn project_from_row(row: &Row<'_>) -> rusqlite::Result<StudioProject> {
    Ok(StudioProject {
        id: row.get(0)?,
        title: row.get(1)?,
        original_note: row.get(2)?,
        tags: tags_from_column(row, 3)?,
        timestamp: timestamp_from_column(row, 4)?,
        main_image_url: row.get(5)?,
        versions: Vec::new(),
    })
}

fn version_from_row(row: &Row<'_>) -> rusqlite::Result<(String, ContentVersion)> {
    let style_str: String = row.get(7)?;
    let style = style_str.parse::<VersionStyle>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            7,
            Type::Text,
            Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, e)),
        )
    })?;

    let version = ContentVersion {
        id: row.get(0)?,
        title: row.get(2)?,
        content: row.get(3)?,
        description: row.get(4)?,
        tags: tags_from_column(row, 5)?,
        image_url: row.get(6)?,
        style,
        is_recommended: row.get(8)?,
    };
    Ok((row.get(1)?, version))
}

fn tags_from_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Vec<String>> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(super) fn timestamp_from_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Timestamp> {
    let millis: i64 = row.get(idx)?;
    Timestamp::from_millisecond(millis)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Integer, Box::new(e)))
}
