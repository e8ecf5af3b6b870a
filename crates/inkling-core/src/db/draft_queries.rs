//! Draft CRUD operations and queries.

use rusqlite::params;

use super::project_queries::timestamp_from_column;
use crate::{
    error::{DatabaseResultExt, Result},
    models::Draft,
};

const UPSERT_DRAFT_SQL: &str = "INSERT INTO drafts (id, text, timestamp) VALUES (?1, ?2, ?3) \
     ON CONFLICT(id) DO UPDATE SET text = excluded.text, timestamp = excluded.timestamp";
const SELECT_DRAFTS_SQL: &str = "SELECT id, text, timestamp FROM drafts ORDER BY timestamp DESC, id DESC";
const DELETE_DRAFT_SQL: &str = "DELETE FROM drafts WHERE id = ?1";

impl super::Database {
    /// Inserts or replaces a draft.
    pub fn upsert_draft(&self, draft: &Draft) -> Result<()> {
        self.connection
            .execute(
                UPSERT_DRAFT_SQL,
                params![draft.id, draft.text, draft.timestamp.as_millisecond()],
            )
            .db_context("Failed to upsert draft")?;
        Ok(())
    }

    /// Lists drafts, newest first.
    pub fn list_drafts(&self) -> Result<Vec<Draft>> {
        let mut stmt = self
            .connection
            .prepare(SELECT_DRAFTS_SQL)
            .db_context("Failed to prepare drafts query")?;
        let drafts = stmt
            .query_map([], |row| {
                Ok(Draft {
                    id: row.get(0)?,
                    text: row.get(1)?,
                    timestamp: timestamp_from_column(row, 2)?,
                })
            })
            .db_context("Failed to query drafts")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .db_context("Failed to read drafts")?;
        Ok(drafts)
    }

    /// Deletes a draft. Returns whether a draft was removed.
    pub fn delete_draft(&self, id: &str) -> Result<bool> {
        let deleted = self
            .connection
            .execute(DELETE_DRAFT_SQL, params![id])
            .db_context("Failed to delete draft")?;
        Ok(deleted > 0)
    }
}
