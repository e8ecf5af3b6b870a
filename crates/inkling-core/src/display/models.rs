//! Display implementations for domain models.
//!
//! All output is markdown so the same text renders in the terminal and in
//! MCP tool results.

use std::fmt;

use super::datetime::LocalDateTime;
use crate::models::{ContentVersion, Draft, StudioProject, Task, TaskOutput, TaskStatus, VersionStyle};

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for VersionStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for ContentVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.is_recommended == Some(true) {
            " ★"
        } else {
            ""
        };
        writeln!(f, "### {} ({}){marker}", self.title, self.style)?;
        writeln!(f)?;
        writeln!(f, "- ID: {}", self.id)?;
        if !self.tags.is_empty() {
            writeln!(f, "- Tags: {}", self.tags.join(", "))?;
        }
        if !self.description.is_empty() {
            writeln!(f, "- Summary: {}", self.description)?;
        }
        writeln!(f)?;
        writeln!(f, "{}", self.content)?;
        writeln!(f)
    }
}

impl fmt::Display for StudioProject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}", self.title)?;
        writeln!(f)?;

        writeln!(f, "- ID: {}", self.id)?;
        if !self.tags.is_empty() {
            writeln!(f, "- Tags: {}", self.tags.join(", "))?;
        }
        writeln!(f, "- Updated: {}", LocalDateTime(&self.timestamp))?;

        writeln!(f)?;
        writeln!(f, "> {}", self.original_note.replace('\n', "\n> "))?;

        if self.versions.is_empty() {
            writeln!(f, "\nNo versions in this project.")?;
        } else {
            writeln!(f, "\n## Versions ({})", self.versions.len())?;
            writeln!(f)?;
            for version in &self.versions {
                write!(f, "{version}")?;
            }
        }

        Ok(())
    }
}

impl fmt::Display for Draft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## Draft {} ({})", self.id, LocalDateTime(&self.timestamp))?;
        writeln!(f)?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## {} ({})", self.id, self.status.with_icon())?;
        writeln!(f)?;
        writeln!(f, "- Kind: {}", self.kind.as_str())?;
        if let Some(project_id) = self.kind.project_id() {
            writeln!(f, "- Project: {project_id}")?;
        }
        writeln!(f, "- Started: {}", LocalDateTime(&self.created_at))?;
        if self.is_terminal() {
            writeln!(f, "- Finished: {}", LocalDateTime(&self.updated_at))?;
        }
        if let Some(error) = &self.error {
            writeln!(f, "- Error: {error}")?;
        }
        if let Some(error) = &self.persistence_error {
            writeln!(f, "- Not saved: {error}")?;
        }

        match &self.output {
            Some(TaskOutput::Versions(versions)) => {
                writeln!(f)?;
                for version in versions {
                    write!(f, "{version}")?;
                }
            }
            Some(TaskOutput::Version(version)) => {
                writeln!(f)?;
                write!(f, "{version}")?;
            }
            None => {}
        }

        Ok(())
    }
}
