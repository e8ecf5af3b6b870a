//! Generation task manager.
//!
//! [`GenerationManager`] owns the registry of generation tasks. Starting a
//! task registers it as running, notifies subscribers and spawns the model
//! call on the Tokio runtime; the call's outcome settles the task exactly
//! once. Interfaces observe progress by subscribing, never by polling.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use inkling_core::{Config, GeminiClient, GenerationManager, StoreBuilder};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = StoreBuilder::new().build().await?;
//! let client = GeminiClient::new(&Config::load(None)?)?;
//! let manager = GenerationManager::new(Arc::new(client), Arc::new(store));
//!
//! let _subscription = manager.subscribe(|snapshot| {
//!     for task in snapshot {
//!         println!("{} {}", task.id, task.status);
//!     }
//! });
//!
//! let id = manager.start_bulk_task("coffee makes me think of rain");
//! if let Some(task) = manager.settled(&id).await {
//!     println!("{task}");
//! }
//! # Ok(())
//! # }
//! ```

use std::{
    collections::HashSet,
    fmt,
    sync::{Arc, Mutex},
};

use log::{debug, error, info};
use tokio::{sync::oneshot, task::JoinError};
use tokio_util::sync::CancellationToken;

use crate::{
    ai::{until_cancelled, GenerationClient},
    error::{InklingError, Result},
    models::{ContentVersion, Task, TaskId, TaskKind, TaskOutput, TaskStatus},
    reconcile,
    store::ProjectStore,
};

mod registry;
mod snapshot;


use registry::Registry;
pub use snapshot::{Subscription, TaskSnapshot};

pub(crate) struct Inner {
    registry: Mutex<Registry>,
    client: Arc<dyn GenerationClient>,
    store: Arc<dyn ProjectStore>,
}

/// How a model call ended.
enum Outcome {
    Completed(TaskOutput),
    Failed(String),
    Aborted,
}

impl Outcome {
    fn from_error(error: InklingError) -> Self {
        if error.is_cancellation() {
            Outcome::Aborted
        } else {
            Outcome::Failed(error.to_string())
        }
    }
}

/// Registry of generation tasks with publish/subscribe notification and
/// cancellation.
///
/// The manager is a cheap handle; clones share the same registry. Tasks are
/// kept for the life of the registry and their ids are never reused.
#[derive(Clone)]
pub struct GenerationManager {
    inner: Arc<Inner>,
}

impl GenerationManager {
    pub fn new(client: Arc<dyn GenerationClient>, store: Arc<dyn ProjectStore>) -> Self {
        Self {
            inner: Arc::new(Inner {
                registry: Mutex::new(Registry::default()),
                client,
                store,
            }),
        }
    }

    /// The model client tasks are run against.
    pub fn client(&self) -> &Arc<dyn GenerationClient> {
        &self.inner.client
    }

    /// The store single-addition results are merged into.
    pub fn store(&self) -> &Arc<dyn ProjectStore> {
        &self.inner.store
    }

    /// Registers a listener for task snapshots.
    ///
    /// The listener first receives the current snapshot, then a new one
    /// after every change, always in increasing revision order. The initial
    /// snapshot is delivered before this call returns unless another thread
    /// is delivering notifications at that moment, in which case that thread
    /// delivers it ahead of any newer snapshot.
    ///
    /// Listeners run outside the registry lock and may call back into the
    /// manager.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&TaskSnapshot) + Send + Sync + 'static,
    {
        let id = registry::lock(&self.inner.registry).add_subscriber(Arc::new(listener));
        debug!("Registered task listener {id}");
        registry::dispatch(&self.inner.registry);
        Subscription::new(id, &self.inner)
    }

    /// Registers a listener that is told about each terminal task exactly
    /// once, including tasks that were already terminal when it subscribed.
    pub fn subscribe_completions<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Task) + Send + Sync + 'static,
    {
        let reported: Mutex<HashSet<TaskId>> = Mutex::new(HashSet::new());
        self.subscribe(move |snapshot| {
            let fresh: Vec<&Task> = {
                let mut reported = reported
                    .lock()
                    .unwrap_or_else(std::sync::PoisonError::into_inner);
                snapshot
                    .iter()
                    .filter(|task| task.is_terminal() && reported.insert(task.id.clone()))
                    .collect()
            };
            for task in fresh {
                listener(task);
            }
        })
    }

    /// Starts rewriting `raw_note` into several styled versions.
    ///
    /// Returns as soon as the task is registered; the result arrives through
    /// notifications. An empty model result settles the task as `Error`.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn start_bulk_task(&self, raw_note: impl Into<String>) -> TaskId {
        let raw_note = raw_note.into();
        let (id, token) = self.register(TaskKind::BulkRefine);

        let manager = self.clone();
        let task_id = id.clone();
        tokio::spawn(async move {
            let client = Arc::clone(&manager.inner.client);
            let call_token = token.clone();
            let generation = tokio::spawn(async move {
                until_cancelled(&call_token, client.generate_batch(&raw_note, &call_token)).await
            });

            let outcome = match joined(generation.await) {
                Ok(versions) if versions.is_empty() => {
                    Outcome::Failed("Model returned no versions".to_string())
                }
                Ok(versions) => Outcome::Completed(TaskOutput::Versions(versions)),
                Err(e) => Outcome::from_error(e),
            };
            manager.settle(&task_id, outcome, None);
        });

        id
    }

    /// Starts generating one more version of `core_note` for a stored
    /// project.
    ///
    /// On success the version is merged into the project before the task
    /// completes. A task cancelled before its result arrives never touches
    /// the store; once the merge has begun the task can no longer be
    /// cancelled. A failed store write leaves the task `Completed` with
    /// [`Task::persistence_error`] set.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn start_single_addition_task(
        &self,
        core_note: impl Into<String>,
        project_id: impl Into<String>,
    ) -> TaskId {
        let core_note = core_note.into();
        let project_id = project_id.into();
        let (id, token) = self.register(TaskKind::SingleAddition {
            project_id: project_id.clone(),
        });

        let manager = self.clone();
        let task_id = id.clone();
        tokio::spawn(async move {
            let client = Arc::clone(&manager.inner.client);
            let call_token = token.clone();
            let generation = tokio::spawn(async move {
                until_cancelled(&call_token, client.generate_one(&core_note, &call_token)).await
            });

            let (outcome, persistence_error) = match joined(generation.await) {
                Ok(Some(version)) => {
                    if !registry::lock(&manager.inner.registry).begin_persist(&task_id) {
                        debug!("Task {task_id} ended before its version arrived, not saving");
                        return;
                    }
                    let persistence_error = manager
                        .persist_single(&task_id, &version, &project_id)
                        .await;
                    (
                        Outcome::Completed(TaskOutput::Version(version)),
                        persistence_error,
                    )
                }
                Ok(None) => (Outcome::Failed("Model returned no version".to_string()), None),
                Err(e) => (Outcome::from_error(e), None),
            };
            manager.settle(&task_id, outcome, persistence_error);
        });

        id
    }

    /// Cancels a running task.
    ///
    /// The task is `Aborted` as soon as this returns, whatever its model
    /// call does afterwards. Returns `false` for unknown or finished tasks,
    /// and for tasks already saving their result to a project.
    pub fn cancel(&self, id: &TaskId) -> bool {
        let mut reg = registry::lock(&self.inner.registry);
        if reg.is_persisting(id) {
            drop(reg);
            debug!("Task {id} is saving its result, not cancelling");
            return false;
        }
        let cancelled = reg.finish(id, |entry| {
            entry.token.cancel();
            entry.task.status = TaskStatus::Aborted;
        });
        drop(reg);
        if cancelled {
            info!("Cancelled task {id}");
            registry::dispatch(&self.inner.registry);
        }
        cancelled
    }

    /// Snapshot of every task.
    pub fn tasks(&self) -> TaskSnapshot {
        registry::lock(&self.inner.registry).snapshot()
    }

    /// One task by id.
    pub fn task(&self, id: &TaskId) -> Option<Task> {
        registry::lock(&self.inner.registry).task(id).cloned()
    }

    /// Waits until a task reaches a terminal state.
    ///
    /// Resolves immediately for tasks that are already terminal, and with
    /// `None` for unknown ids.
    pub async fn settled(&self, id: &TaskId) -> Option<Task> {
        self.task(id)?;

        let (tx, rx) = oneshot::channel();
        let sender = Mutex::new(Some(tx));
        let watched = id.clone();
        let subscription = self.subscribe(move |snapshot| {
            let Some(task) = snapshot.get(&watched).filter(|task| task.is_terminal()) else {
                return;
            };
            let sender = sender
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .take();
            if let Some(sender) = sender {
                let _ = sender.send(task.clone());
            }
        });

        let task = rx.await.ok();
        drop(subscription);
        task
    }

    /// Number of registered listeners.
    pub fn subscriber_count(&self) -> usize {
        registry::lock(&self.inner.registry).subscriber_count()
    }

    fn register(&self, kind: TaskKind) -> (TaskId, CancellationToken) {
        let task = Task::running(kind);
        let id = task.id.clone();
        let token = CancellationToken::new();
        info!("Started {} task {id}", task.kind.as_str());

        registry::lock(&self.inner.registry).insert(task, token.clone());
        registry::dispatch(&self.inner.registry);
        (id, token)
    }

    /// Moves a running task to its terminal state. Returns `false` when the
    /// task had already settled, typically because it was cancelled.
    fn settle(&self, id: &TaskId, outcome: Outcome, persistence_error: Option<String>) -> bool {
        let settled = registry::lock(&self.inner.registry).finish(id, |entry| {
            let task = &mut entry.task;
            match outcome {
                Outcome::Completed(output) => {
                    task.status = TaskStatus::Completed;
                    task.output = Some(output);
                    task.persistence_error = persistence_error;
                }
                Outcome::Failed(message) => {
                    task.status = TaskStatus::Error;
                    task.error = Some(message);
                }
                Outcome::Aborted => task.status = TaskStatus::Aborted,
            }
        });

        if settled {
            if let Some(task) = self.task(id) {
                match &task.error {
                    Some(reason) => info!("Task {id} settled as {}: {reason}", task.status),
                    None => info!("Task {id} settled as {}", task.status),
                }
            }
            registry::dispatch(&self.inner.registry);
        } else {
            debug!("Ignoring late outcome for settled task {id}");
        }
        settled
    }

    async fn persist_single(
        &self,
        id: &TaskId,
        version: &ContentVersion,
        project_id: &str,
    ) -> Option<String> {
        let merged = reconcile::merge_versions_into_project(
            self.inner.store.as_ref(),
            vec![version.clone()],
            project_id,
        )
        .await;

        match merged {
            Ok(_) => None,
            Err(e) => {
                error!(
                    "Task {id}: generated version {} could not be saved to project {project_id}: {e}",
                    version.id
                );
                Some(e.to_string())
            }
        }
    }
}

impl fmt::Debug for GenerationManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = registry::lock(&self.inner.registry);
        f.debug_struct("GenerationManager")
            .field("tasks", &registry.snapshot().len())
            .field("subscribers", &registry.subscriber_count())
            .finish()
    }
}

/// Flattens a generation join result. A panicking model call counts as a
/// failed generation.
fn joined<T>(result: std::result::Result<Result<T>, JoinError>) -> Result<T> {
    result.unwrap_or_else(|e| Err(InklingError::generation(format!("Generation task failed: {e}"))))
}
