//! In-memory [`ProjectStore`] for unit tests.

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use jiff::Timestamp;
use tokio::sync::{oneshot, Barrier};

use super::ProjectStore;
use crate::{
    error::{InklingError, Result},
    models::{ContentVersion, Draft, StudioProject, VersionUpdate},
};

/// A paused append: signals `entered`, then waits for `release`.
type Hold = (oneshot::Sender<()>, oneshot::Receiver<()>);

#[derive(Default)]
pub(crate) struct MemoryStore {
    projects: Mutex<Vec<StudioProject>>,
    drafts: Mutex<Vec<Draft>>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
    rendezvous: Option<Arc<Barrier>>,
    hold: Mutex<Option<Hold>>,
}

impl MemoryStore {
    pub(crate) fn with_projects(projects: Vec<StudioProject>) -> Self {
        Self {
            projects: Mutex::new(projects),
            ..Self::default()
        }
    }

    /// Makes every subsequent write fail with a database error.
    pub(crate) fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    /// Makes every project listing and append wait at `barrier` first, so
    /// concurrent writers all read before any of them writes.
    pub(crate) fn with_rendezvous(mut self, barrier: Arc<Barrier>) -> Self {
        self.rendezvous = Some(barrier);
        self
    }

    /// Pauses the next append until the returned sender fires. The receiver
    /// resolves once the append is waiting.
    pub(crate) fn hold_next_append(&self) -> (oneshot::Receiver<()>, oneshot::Sender<()>) {
        let (entered_tx, entered_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel();
        *self.hold.lock().unwrap() = Some((entered_tx, release_rx));
        (entered_rx, release_tx)
    }

    /// Number of project writes that reached the data.
    pub(crate) fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub(crate) fn project(&self, id: &str) -> Option<StudioProject> {
        self.projects
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(InklingError::database("Store is read-only")
                .with_source(rusqlite::Error::InvalidQuery));
        }
        Ok(())
    }
}

#[async_trait]
impl ProjectStore for MemoryStore {
    async fn list_projects(&self) -> Result<Vec<StudioProject>> {
        if let Some(barrier) = &self.rendezvous {
            barrier.wait().await;
        }
        let mut projects = self.projects.lock().unwrap().clone();
        projects.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(projects)
    }

    async fn upsert_project(&self, project: &StudioProject) -> Result<()> {
        self.check_writable()?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut projects = self.projects.lock().unwrap();
        match projects.iter_mut().find(|p| p.id == project.id) {
            Some(existing) => *existing = project.clone(),
            None => projects.push(project.clone()),
        }
        Ok(())
    }

    async fn append_versions(
        &self,
        project_id: &str,
        versions: &[ContentVersion],
        timestamp: Timestamp,
    ) -> Result<Option<StudioProject>> {
        if let Some(barrier) = &self.rendezvous {
            barrier.wait().await;
        }
        let hold = self.hold.lock().unwrap().take();
        if let Some((entered, release)) = hold {
            let _ = entered.send(());
            let _ = release.await;
        }

        self.check_writable()?;
        let mut projects = self.projects.lock().unwrap();
        let Some(project) = projects.iter_mut().find(|p| p.id == project_id) else {
            return Ok(None);
        };
        self.writes.fetch_add(1, Ordering::SeqCst);
        for version in versions {
            if !project.contains_version(&version.id) {
                project.versions.push(version.clone());
            }
        }
        project.timestamp = timestamp;
        Ok(Some(project.clone()))
    }

    async fn remove_version(
        &self,
        project_id: &str,
        version_id: &str,
        timestamp: Timestamp,
    ) -> Result<StudioProject> {
        self.check_writable()?;
        let mut projects = self.projects.lock().unwrap();
        let project = projects
            .iter_mut()
            .find(|p| p.id == project_id)
            .ok_or_else(|| InklingError::ProjectNotFound {
                id: project_id.to_string(),
            })?;
        if !project.contains_version(version_id) {
            return Err(InklingError::VersionNotFound {
                project_id: project_id.to_string(),
                version_id: version_id.to_string(),
            });
        }
        if project.versions.len() == 1 {
            return Err(InklingError::invalid_input("version_id")
                .with_reason("Cannot remove the only version of a project"));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        project.versions.retain(|v| v.id != version_id);
        project.timestamp = timestamp;
        Ok(project.clone())
    }

    async fn delete_project(&self, id: &str) -> Result<bool> {
        self.check_writable()?;
        let mut projects = self.projects.lock().unwrap();
        let before = projects.len();
        projects.retain(|p| p.id != id);
        Ok(projects.len() != before)
    }

    async fn update_version_fields(
        &self,
        project_id: &str,
        version_id: &str,
        update: &VersionUpdate,
    ) -> Result<()> {
        self.check_writable()?;
        let mut projects = self.projects.lock().unwrap();
        let version = projects
            .iter_mut()
            .filter(|p| p.id == project_id)
            .flat_map(|p| p.versions.iter_mut())
            .find(|v| v.id == version_id)
            .ok_or_else(|| InklingError::VersionNotFound {
                project_id: project_id.to_string(),
                version_id: version_id.to_string(),
            })?;
        if let Some(title) = update.title() {
            version.title = title.to_string();
        }
        if let Some(content) = update.content() {
            version.content = content.to_string();
        }
        Ok(())
    }

    async fn list_drafts(&self) -> Result<Vec<Draft>> {
        let mut drafts = self.drafts.lock().unwrap().clone();
        drafts.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        Ok(drafts)
    }

    async fn upsert_draft(&self, draft: &Draft) -> Result<()> {
        self.check_writable()?;
        let mut drafts = self.drafts.lock().unwrap();
        drafts.retain(|d| d.id != draft.id);
        drafts.push(draft.clone());
        Ok(())
    }

    async fn delete_draft(&self, id: &str) -> Result<bool> {
        self.check_writable()?;
        let mut drafts = self.drafts.lock().unwrap();
        let before = drafts.len();
        drafts.retain(|d| d.id != id);
        Ok(drafts.len() != before)
    }
}
