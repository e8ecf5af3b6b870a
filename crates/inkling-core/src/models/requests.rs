//! Request types for partial updates.

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Partial edit of a stored version. Empty strings are treated as absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct VersionUpdate {
    /// New title
    pub title: Option<String>,

    /// New body text
    pub content: Option<String>,
}

impl VersionUpdate {
    /// Title to write, if any.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.is_empty())
    }

    /// Content to write, if any.
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref().filter(|c| !c.is_empty())
    }

    /// Whether the update would change nothing.
    pub fn is_empty(&self) -> bool {
        self.title().is_none() && self.content().is_none()
    }
}
