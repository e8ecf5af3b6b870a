//! Result wrapper types for displaying operation outcomes.

use std::fmt;

use crate::models::{ContentVersion, Draft, StudioProject};

/// Wrapper type for displaying the result of save operations.
///
/// ```rust
/// use inkling_core::{display::SaveResult, models::Draft};
///
/// let output = SaveResult::new(Draft::new("remember the milk")).to_string();
/// assert!(output.contains("Saved draft"));
/// ```
pub struct SaveResult<T> {
    pub resource: T,
}

impl<T> SaveResult<T> {
    /// Create a new SaveResult wrapper.
    pub fn new(resource: T) -> Self {
        Self { resource }
    }
}

impl fmt::Display for SaveResult<StudioProject> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Saved project with ID: {} ({} versions)",
            self.resource.id,
            self.resource.versions.len()
        )?;
        writeln!(f)?;
        write!(f, "{}", self.resource)
    }
}

impl fmt::Display for SaveResult<Draft> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Saved draft with ID: {}", self.resource.id)?;
        writeln!(f)?;
        write!(f, "{}", self.resource)
    }
}

impl fmt::Display for SaveResult<ContentVersion> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Updated version with ID: {}", self.resource.id)?;
        writeln!(f)?;
        write!(f, "{}", self.resource)
    }
}

/// Wrapper type for displaying the result of delete operations.
pub struct DeleteResult<T> {
    pub resource: T,
}

impl<T> DeleteResult<T> {
    /// Create a new DeleteResult wrapper.
    pub fn new(resource: T) -> Self {
        Self { resource }
    }
}

impl fmt::Display for DeleteResult<StudioProject> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Deleted project '{}' (ID: {})",
            self.resource.title, self.resource.id
        )
    }
}

impl fmt::Display for DeleteResult<Draft> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Deleted draft (ID: {})", self.resource.id)
    }
}
