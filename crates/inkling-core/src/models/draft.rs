//! Draft model definition.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::version::random_suffix;

/// An autosaved snapshot of free-text input.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Draft {
    /// Unique identifier: `<creation millis>-<random suffix>`
    pub id: String,

    /// The captured text
    pub text: String,

    /// When the snapshot was taken (UTC)
    pub timestamp: Timestamp,
}

impl Draft {
    /// Creates a draft stamped with the current time.
    pub fn new(text: impl Into<String>) -> Self {
        let timestamp = Timestamp::now();
        Self {
            id: format!("{}-{}", timestamp.as_millisecond(), random_suffix()),
            text: text.into(),
            timestamp,
        }
    }
}
