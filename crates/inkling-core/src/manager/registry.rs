//! Task registry and notification queue.
//!
//! Every state change bumps the revision and enqueues a snapshot while the
//! registry lock is held. Whichever caller then finds no dispatch in
//! progress drains the queue with the lock released, calling subscribers in
//! registration order. Listeners can therefore re-enter the manager freely;
//! their own changes are queued and delivered after the current snapshot.

use std::{
    collections::{BTreeMap, HashMap, VecDeque},
    panic::{catch_unwind, AssertUnwindSafe},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use jiff::Timestamp;
use log::error;
use tokio_util::sync::CancellationToken;

use super::TaskSnapshot;
use crate::models::{Task, TaskId};

pub(super) type Listener = Arc<dyn Fn(&TaskSnapshot) + Send + Sync>;

pub(super) struct Entry {
    pub(super) task: Task,
    pub(super) token: CancellationToken,
    /// Set once the task's result is being written to the store. Such a
    /// task can no longer be cancelled.
    persisting: bool,
}

struct Subscriber {
    /// Revision of the snapshot delivered on subscription.
    since: u64,
    listener: Listener,
}

struct Notice {
    snapshot: TaskSnapshot,
    /// Initial snapshots go to one subscriber only.
    target: Option<u64>,
}

#[derive(Default)]
pub(super) struct Registry {
    entries: Vec<Entry>,
    index: HashMap<TaskId, usize>,
    revision: u64,
    next_subscriber: u64,
    subscribers: BTreeMap<u64, Subscriber>,
    queue: VecDeque<Notice>,
    dispatching: bool,
}

impl Registry {
    pub(super) fn insert(&mut self, task: Task, token: CancellationToken) {
        self.index.insert(task.id.clone(), self.entries.len());
        self.entries.push(Entry {
            task,
            token,
            persisting: false,
        });
        self.publish();
    }

    pub(super) fn task(&self, id: &TaskId) -> Option<&Task> {
        self.index.get(id).map(|&idx| &self.entries[idx].task)
    }

    /// Marks a running task as saving its result. Returns `false`, changing
    /// nothing, when the task is unknown or already terminal.
    pub(super) fn begin_persist(&mut self, id: &TaskId) -> bool {
        let Some(&idx) = self.index.get(id) else {
            return false;
        };
        let entry = &mut self.entries[idx];
        if entry.task.is_terminal() {
            return false;
        }
        entry.persisting = true;
        true
    }

    pub(super) fn is_persisting(&self, id: &TaskId) -> bool {
        self.index
            .get(id)
            .is_some_and(|&idx| self.entries[idx].persisting)
    }

    /// Applies a terminal transition to a running task and publishes it.
    ///
    /// Returns `false`, changing nothing, when the task is unknown or
    /// already terminal.
    pub(super) fn finish(&mut self, id: &TaskId, apply: impl FnOnce(&mut Entry)) -> bool {
        let Some(&idx) = self.index.get(id) else {
            return false;
        };
        let entry = &mut self.entries[idx];
        if entry.task.is_terminal() {
            return false;
        }
        apply(entry);
        entry.task.updated_at = Timestamp::now();
        self.publish();
        true
    }

    pub(super) fn snapshot(&self) -> TaskSnapshot {
        TaskSnapshot::new(
            self.revision,
            self.entries.iter().map(|e| e.task.clone()).collect(),
        )
    }

    pub(super) fn add_subscriber(&mut self, listener: Listener) -> u64 {
        let id = self.next_subscriber;
        self.next_subscriber += 1;

        let snapshot = self.snapshot();
        self.subscribers.insert(
            id,
            Subscriber {
                since: snapshot.revision(),
                listener,
            },
        );
        self.queue.push_back(Notice {
            snapshot,
            target: Some(id),
        });
        id
    }

    /// Removes a subscriber and hands back its listener, which the caller
    /// must drop after releasing the lock.
    pub(super) fn remove_subscriber(&mut self, id: u64) -> Option<Listener> {
        self.subscribers.remove(&id).map(|subscriber| subscriber.listener)
    }

    pub(super) fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    fn publish(&mut self) {
        self.revision += 1;
        let snapshot = self.snapshot();
        self.queue.push_back(Notice {
            snapshot,
            target: None,
        });
    }

    fn recipients(&self, notice: &Notice) -> Vec<(u64, Listener)> {
        self.subscribers
            .iter()
            .filter(|(id, subscriber)| match notice.target {
                Some(target) => target == **id,
                None => notice.snapshot.revision() > subscriber.since,
            })
            .map(|(id, subscriber)| (*id, Arc::clone(&subscriber.listener)))
            .collect()
    }
}

pub(super) fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Delivers queued snapshots unless another caller is already doing so.
pub(super) fn dispatch(registry: &Mutex<Registry>) {
    {
        let mut reg = lock(registry);
        if reg.dispatching || reg.queue.is_empty() {
            return;
        }
        reg.dispatching = true;
    }

    loop {
        let (notice, recipients) = {
            let mut reg = lock(registry);
            let Some(notice) = reg.queue.pop_front() else {
                reg.dispatching = false;
                return;
            };
            let recipients = reg.recipients(&notice);
            (notice, recipients)
        };

        for (id, listener) in recipients {
            // Unsubscribed by an earlier listener of the same round.
            if !lock(registry).subscribers.contains_key(&id) {
                continue;
            }
            if catch_unwind(AssertUnwindSafe(|| listener(&notice.snapshot))).is_err() {
                error!(
                    "Task listener {id} panicked on revision {}",
                    notice.snapshot.revision()
                );
            }
        }
    }
}
