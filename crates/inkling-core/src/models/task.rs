//! Generation task model.

use std::fmt;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ContentVersion, TaskStatus};

/// Opaque task identifier, unique for the life of the process.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Mints a fresh id with a kind-specific prefix.
    pub(crate) fn generate(kind: &TaskKind) -> Self {
        let prefix = match kind {
            TaskKind::BulkRefine => "refine",
            TaskKind::SingleAddition { .. } => "single",
        };
        Self(format!("{prefix}-{}", Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a task produces, and for whom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskKind {
    /// A batch of styled rewrites of a raw note
    BulkRefine,

    /// One extra version appended to an existing project
    SingleAddition { project_id: String },
}

impl TaskKind {
    /// The project a single-addition task writes into.
    pub fn project_id(&self) -> Option<&str> {
        match self {
            TaskKind::BulkRefine => None,
            TaskKind::SingleAddition { project_id } => Some(project_id),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::BulkRefine => "bulk-refine",
            TaskKind::SingleAddition { .. } => "single-addition",
        }
    }
}

/// Result payload of a completed task. The variant always matches the
/// task's kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum TaskOutput {
    /// Output of a bulk-refine task
    Versions(Vec<ContentVersion>),

    /// Output of a single-addition task
    Version(ContentVersion),
}

impl TaskOutput {
    /// All versions carried by the payload.
    pub fn versions(&self) -> &[ContentVersion] {
        match self {
            TaskOutput::Versions(versions) => versions,
            TaskOutput::Version(version) => std::slice::from_ref(version),
        }
    }
}

/// One tracked generation request.
///
/// Tasks are published to subscribers as immutable snapshots; only the
/// generation manager creates or transitions them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    pub id: TaskId,

    /// What the task generates
    pub kind: TaskKind,

    /// Current lifecycle state
    pub status: TaskStatus,

    /// Present if and only if `status` is `Completed`
    pub output: Option<TaskOutput>,

    /// Failure reason when `status` is `Error`
    pub error: Option<String>,

    /// Store write failure after a successful single-addition generation
    pub persistence_error: Option<String>,

    /// When the task was registered
    pub created_at: Timestamp,

    /// When the status last changed
    pub updated_at: Timestamp,
}

impl Task {
    pub(crate) fn running(kind: TaskKind) -> Self {
        let now = Timestamp::now();
        Self {
            id: TaskId::generate(&kind),
            kind,
            status: TaskStatus::Running,
            output: None,
            error: None,
            persistence_error: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
