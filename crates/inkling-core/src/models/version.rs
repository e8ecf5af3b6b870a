//! Content version model and id helpers.

use jiff::Timestamp;
use rand::{distributions::Alphanumeric, Rng};
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::VersionStyle;

/// Prefix marking a version id that has not been persisted yet.
pub const TEMP_ID_PREFIX: &str = "temp-";

/// One generated rewrite of a note.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct ContentVersion {
    /// Unique identifier; `temp-` prefixed until persisted
    pub id: String,

    /// Title of the rewrite
    pub title: String,

    /// Full body text
    pub content: String,

    /// One-line summary
    #[serde(default)]
    pub description: String,

    /// Topic tags
    #[serde(default)]
    pub tags: Vec<String>,

    /// Illustrative image reference
    #[serde(default)]
    pub image_url: String,

    /// Writing style
    #[serde(rename = "type", default)]
    pub style: VersionStyle,

    /// Whether the version is highlighted as the recommended one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_recommended: Option<bool>,
}

impl ContentVersion {
    /// Whether the id still carries the not-yet-persisted marker.
    pub fn has_temporary_id(&self) -> bool {
        self.id.starts_with(TEMP_ID_PREFIX)
    }
}

/// Mints a permanent version id: `v-<millis>-<9 random base36 chars>`.
pub fn permanent_version_id() -> String {
    format!("v-{}-{}", Timestamp::now().as_millisecond(), random_suffix())
}

/// Nine random lowercase base36 characters, appended to time-based ids so
/// two ids minted in the same millisecond still differ.
pub(crate) fn random_suffix() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .map(|b| char::from(b.to_ascii_lowercase()))
        .take(9)
        .collect()
}

/// Temporary id for the `index`th version of a batch.
pub fn temporary_version_id(index: usize) -> String {
    format!("{TEMP_ID_PREFIX}v-{index}-{}", Timestamp::now().as_millisecond())
}

/// Placeholder illustration derived from the style and a seed.
pub fn placeholder_image_url(style: VersionStyle, seed: impl std::fmt::Display) -> String {
    format!("https://picsum.photos/seed/{}{seed}/800/400", style.as_str())
}
