//! Status and style enumerations for tasks and versions.

use std::str::FromStr;

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a generation task.
///
/// `Running` is the only non-terminal state. Once a task leaves it, the
/// status never changes again.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// The model call is in flight
    Running,

    /// The model call succeeded and the output is attached
    Completed,

    /// The model call failed or returned nothing usable
    Error,

    /// The task was cancelled by its owner
    Aborted,
}

impl TaskStatus {
    /// Whether the status is final.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskStatus::Running)
    }

    /// Stable lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Running => "running",
            TaskStatus::Completed => "completed",
            TaskStatus::Error => "error",
            TaskStatus::Aborted => "aborted",
        }
    }

    /// Get status with consistent icon formatting for display.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use inkling_core::models::TaskStatus;
    ///
    /// assert_eq!(TaskStatus::Completed.with_icon(), "✓ Completed");
    /// assert_eq!(TaskStatus::Running.with_icon(), "➤ Running");
    /// ```
    pub fn with_icon(&self) -> &'static str {
        match self {
            TaskStatus::Running => "➤ Running",
            TaskStatus::Completed => "✓ Completed",
            TaskStatus::Error => "✗ Error",
            TaskStatus::Aborted => "○ Aborted",
        }
    }
}

/// Writing style of a generated version.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum VersionStyle {
    /// Plain rewrite, also used for hand-written versions
    #[default]
    Standard,

    /// In-depth explanation
    Detailed,

    /// Narrative retelling
    Story,

    /// Multi-angle analysis
    Analysis,

    /// Condensed summary
    Minimalist,
}

impl VersionStyle {
    /// Styles the model may be asked to produce.
    pub const GENERATED: [VersionStyle; 4] = [
        VersionStyle::Detailed,
        VersionStyle::Story,
        VersionStyle::Analysis,
        VersionStyle::Minimalist,
    ];

    /// Convert to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionStyle::Standard => "standard",
            VersionStyle::Detailed => "detailed",
            VersionStyle::Story => "story",
            VersionStyle::Analysis => "analysis",
            VersionStyle::Minimalist => "minimalist",
        }
    }
}

impl FromStr for VersionStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "standard" => Ok(VersionStyle::Standard),
            "detailed" => Ok(VersionStyle::Detailed),
            "story" => Ok(VersionStyle::Story),
            "analysis" => Ok(VersionStyle::Analysis),
            "minimalist" => Ok(VersionStyle::Minimalist),
            _ => Err(format!("Invalid version style: {s}")),
        }
    }
}
