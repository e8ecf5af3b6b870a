//! Published views of the task registry.

use std::{
    fmt,
    sync::{Arc, Weak},
};

use super::{registry, Inner};
use crate::models::{Task, TaskId};

/// Immutable view of every task at one registry revision.
///
/// Cloning is cheap; all subscribers of a notification share the same task
/// slice.
#[derive(Debug, Clone)]
pub struct TaskSnapshot {
    revision: u64,
    tasks: Arc<[Task]>,
}

impl TaskSnapshot {
    pub(super) fn new(revision: u64, tasks: Vec<Task>) -> Self {
        Self {
            revision,
            tasks: tasks.into(),
        }
    }

    /// Monotonic revision number. Higher revisions are newer.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Tasks in registration order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| &task.id == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.tasks.iter()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl<'a> IntoIterator for &'a TaskSnapshot {
    type Item = &'a Task;
    type IntoIter = std::slice::Iter<'a, Task>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Handle to a registered listener.
///
/// Dropping the handle unsubscribes. A listener may drop its own handle
/// from inside its callback; it receives no further snapshots afterwards.
#[must_use = "dropping a Subscription unsubscribes the listener"]
pub struct Subscription {
    id: u64,
    inner: Weak<Inner>,
}

impl Subscription {
    pub(super) fn new(id: u64, inner: &Arc<Inner>) -> Self {
        Self {
            id,
            inner: Arc::downgrade(inner),
        }
    }

    /// Stops delivery to this listener.
    pub fn unsubscribe(self) {}
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            // The listener may own other subscriptions; drop it unlocked.
            let listener = registry::lock(&inner.registry).remove_subscriber(self.id);
            drop(listener);
        }
    }
}
