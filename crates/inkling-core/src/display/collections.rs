//! Collection wrapper types for displaying groups of domain objects.
//!
//! This module provides wrapper types that format collections of domain objects
//! with consistent structure and empty collection handling.

use std::fmt;

use super::datetime::LocalDateTime;
use crate::models::{Draft, StudioProject, Task};

/// Newtype wrapper for displaying a project list as compact summaries.
///
/// # Examples
///
/// ```rust
/// use inkling_core::{display::Projects, models::StudioProject};
/// use jiff::Timestamp;
///
/// let project = StudioProject {
///     id: "project-1".to_string(),
///     title: "Coffee notes".to_string(),
///     original_note: "coffee".to_string(),
///     versions: vec![],
///     tags: vec!["coffee".to_string()],
///     timestamp: Timestamp::now(),
///     main_image_url: None,
/// };
///
/// let output = Projects(vec![project]).to_string();
/// assert!(output.contains("Coffee notes"));
/// ```
pub struct Projects(pub Vec<StudioProject>);

impl Projects {
    /// Check if the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the number of projects in the collection.
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for Projects {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No projects found.");
        }
        for project in &self.0 {
            writeln!(f, "## {} ({} versions)", project.title, project.versions.len())?;
            writeln!(f)?;
            writeln!(f, "- ID: {}", project.id)?;
            if !project.tags.is_empty() {
                writeln!(f, "- Tags: {}", project.tags.join(", "))?;
            }
            writeln!(f, "- Updated: {}", LocalDateTime(&project.timestamp))?;
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Newtype wrapper for displaying drafts, newest first.
pub struct Drafts(pub Vec<Draft>);

impl Drafts {
    /// Check if the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the number of drafts in the collection.
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for Drafts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No drafts found.");
        }
        for draft in &self.0 {
            write!(f, "{draft}")?;
        }
        Ok(())
    }
}

/// Borrowing wrapper for displaying a task snapshot.
pub struct Tasks<'a>(pub &'a [Task]);

impl fmt::Display for Tasks<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No generation tasks.");
        }
        for task in self.0 {
            writeln!(f, "- {} {} ({})", task.status.with_icon(), task.id, task.kind.as_str())?;
        }
        Ok(())
    }
}
