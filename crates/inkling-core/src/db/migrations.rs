//! Database schema initialization and migrations.

use crate::error::{DatabaseResultExt, Result};

impl super::Database {
    /// Initializes the database schema using the embedded SQL file.
    pub(super) fn initialize_schema(&self) -> Result<()> {
        self.connection
            .execute("PRAGMA foreign_keys = ON", [])
            .db_context("Failed to enable foreign keys")?;

        // Concurrent writers (CLI next to a running MCP server) wait instead
        // of failing immediately.
        self.connection
            .busy_timeout(std::time::Duration::from_secs(5))
            .db_context("Failed to set busy timeout")?;

        let schema_sql = include_str!("../../assets/schema.sql");
        self.connection
            .execute_batch(schema_sql)
            .db_context("Failed to initialize database schema")?;

        self.apply_migrations()?;

        Ok(())
    }

    /// Apply database migrations for existing databases
    fn apply_migrations(&self) -> Result<()> {
        // Databases created before versions kept their order lack `position`
        let has_position_column: bool = self
            .connection
            .query_row(
                "SELECT COUNT(*) FROM pragma_table_info('versions') WHERE name = 'position'",
                [],
                |row| row.get(0),
            )
            .map(|count: i64| count > 0)
            .unwrap_or(false);

        if !has_position_column {
            self.connection
                .execute(
                    "ALTER TABLE versions ADD COLUMN position INTEGER NOT NULL DEFAULT 0",
                    [],
                )
                .db_context("Failed to add position column to versions table")?;
        }

        self.connection
            .execute(
                "CREATE INDEX IF NOT EXISTS idx_versions_project ON versions(project_id, position)",
                [],
            )
            .db_context("Failed to create versions index")?;

        Ok(())
    }
}
