//! Builder for creating and configuring SqliteStore instances.

use std::path::{Path, PathBuf};

use tokio::task;

use super::SqliteStore;
use crate::{
    db::Database,
    error::{InklingError, Result},
};

/// Builder for creating and configuring [`SqliteStore`] instances.
#[derive(Debug, Clone, Default)]
pub struct StoreBuilder {
    database_path: Option<PathBuf>,
}

impl StoreBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a custom database file path.
    ///
    /// If not specified, uses the XDG Base Directory specification:
    /// `$XDG_DATA_HOME/inkling/inkling.db` or `~/.local/share/inkling/inkling.db`
    pub fn with_database_path<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        if let Some(path) = path {
            self.database_path = Some(path.as_ref().to_path_buf());
        }
        self
    }

    /// Builds the store, creating the database file and schema if needed.
    ///
    /// # Errors
    ///
    /// Returns `InklingError::FileSystem` if the parent directory cannot be
    /// created and `InklingError::Database` if schema initialization fails.
    pub async fn build(self) -> Result<SqliteStore> {
        let db_path = match self.database_path {
            Some(path) => path,
            None => Self::default_database_path()?,
        };

        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| InklingError::FileSystem {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let db_path_clone = db_path.clone();
        task::spawn_blocking(move || {
            let _db = Database::new(&db_path_clone)?;
            Ok::<(), InklingError>(())
        })
        .await
        .map_err(|e| InklingError::Configuration {
            message: format!("Task join error: {e}"),
        })??;

        Ok(SqliteStore::new(db_path))
    }

    /// Returns the default database path following the XDG Base Directory
    /// specification.
    fn default_database_path() -> Result<PathBuf> {
        xdg::BaseDirectories::with_prefix("inkling")
            .place_data_file("inkling.db")
            .map_err(|e| InklingError::XdgDirectory(e.to_string()))
    }
}
