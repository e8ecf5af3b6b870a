//! Error types for the inkling library.

use std::path::PathBuf;

use thiserror::Error;

/// Comprehensive error type for all inkling operations.
#[derive(Error, Debug)]
pub enum InklingError {
    /// Database connection or query errors
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: rusqlite::Error,
    },
    /// Project not found for the given ID
    #[error("Project with ID {id} not found")]
    ProjectNotFound { id: String },
    /// Version not found inside the given project
    #[error("Version {version_id} not found in project {project_id}")]
    VersionNotFound {
        project_id: String,
        version_id: String,
    },
    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// XDG directory specification errors
    #[error("XDG directory error: {0}")]
    XdgDirectory(String),
    /// Invalid input validation errors
    #[error("Invalid input for field '{field}': {reason}")]
    InvalidInput { field: String, reason: String },
    /// Serialization/deserialization errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
    /// The model call failed or returned output that could not be used
    #[error("Generation failed: {message}")]
    Generation { message: String },
    /// Transport-level failures talking to the model endpoint
    #[error("HTTP error: {source}")]
    Http {
        #[from]
        source: reqwest::Error,
    },
    /// The operation observed its own cancellation
    #[error("Operation was cancelled")]
    Cancelled,
}

/// Builder for creating database errors with optional context.
pub struct DatabaseErrorBuilder {
    message: String,
}

impl DatabaseErrorBuilder {
    /// Create a new database error builder with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Build the error with the given source.
    pub fn with_source(self, source: rusqlite::Error) -> InklingError {
        InklingError::Database {
            message: self.message,
            source,
        }
    }
}

/// Builder for creating input validation errors.
pub struct InvalidInputBuilder {
    field: String,
}

impl InvalidInputBuilder {
    /// Create a new invalid input error builder for a field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Build the error with the given reason.
    pub fn with_reason(self, reason: impl Into<String>) -> InklingError {
        InklingError::InvalidInput {
            field: self.field,
            reason: reason.into(),
        }
    }
}

impl InklingError {
    /// Creates a builder for database errors.
    pub fn database(message: impl Into<String>) -> DatabaseErrorBuilder {
        DatabaseErrorBuilder::new(message)
    }

    /// Creates a builder for input validation errors.
    pub fn invalid_input(field: impl Into<String>) -> InvalidInputBuilder {
        InvalidInputBuilder::new(field)
    }

    /// Creates a generation error from any displayable reason.
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation {
            message: message.into(),
        }
    }

    /// Whether this error was caused by cancellation rather than a real
    /// failure.
    ///
    /// Aborted requests from `reqwest` do not carry a distinguished kind, so
    /// only the explicit [`InklingError::Cancelled`] variant counts.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Specialized extension trait for database-related Results.
pub trait DatabaseResultExt<T> {
    /// Map database errors with a message.
    fn db_context(self, message: &str) -> Result<T>;
}

impl<T> DatabaseResultExt<T> for std::result::Result<T, rusqlite::Error> {
    fn db_context(self, message: &str) -> Result<T> {
        self.map_err(|e| InklingError::database(message).with_source(e))
    }
}

/// Result type alias for inkling operations
pub type Result<T> = std::result::Result<T, InklingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancelled_is_cancellation() {
        assert!(InklingError::Cancelled.is_cancellation());
        assert!(!InklingError::generation("boom").is_cancellation());
    }

    #[test]
    fn test_invalid_input_builder() {
        let err = InklingError::invalid_input("versions").with_reason("must not be empty");
        assert_eq!(
            err.to_string(),
            "Invalid input for field 'versions': must not be empty"
        );
    }

    #[test]
    fn test_db_context_wraps_source() {
        let result: std::result::Result<(), rusqlite::Error> =
            Err(rusqlite::Error::QueryReturnedNoRows);
        let err = result.db_context("Failed to query").unwrap_err();
        assert!(matches!(err, InklingError::Database { .. }));
        assert!(err.to_string().contains("Failed to query"));
    }
}
