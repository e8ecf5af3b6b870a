//! Studio project model definition.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::ContentVersion;

/// A persisted note together with its generated versions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StudioProject {
    /// Unique identifier for the project
    pub id: String,

    /// Title, taken from the first version when saved
    pub title: String,

    /// The raw note the versions were generated from
    pub original_note: String,

    /// Versions in display order, unique by id
    #[serde(default)]
    pub versions: Vec<ContentVersion>,

    /// Topic tags
    #[serde(default)]
    pub tags: Vec<String>,

    /// Last modification time (UTC)
    pub timestamp: Timestamp,

    /// Representative illustration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_image_url: Option<String>,
}

impl StudioProject {
    /// Looks up a version by id.
    pub fn version(&self, version_id: &str) -> Option<&ContentVersion> {
        self.versions.iter().find(|v| v.id == version_id)
    }

    /// Whether a version with this id is already part of the project.
    pub fn contains_version(&self, version_id: &str) -> bool {
        self.version(version_id).is_some()
    }
}
