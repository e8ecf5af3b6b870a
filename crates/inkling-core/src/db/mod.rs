//! Database operations and SQLite management for projects and drafts.
//!
//! This module provides the low-level, synchronous persistence layer. Async
//! callers go through [`crate::store::SqliteStore`], which runs these
//! operations on the blocking thread pool.

use std::path::Path;

use rusqlite::Connection;

use crate::error::{DatabaseResultExt, Result};

pub mod draft_queries;
pub mod migrations;
pub mod project_queries;

/// Database connection and operations handler.
pub struct Database {
    connection: Connection,
}

impl Database {
    /// Creates a new database connection and initializes the schema.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection = Connection::open(path).db_context("Failed to open database connection")?;

        let db = Self { connection };
        db.initialize_schema()?;
        Ok(db)
    }
}
