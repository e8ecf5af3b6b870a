//! Reconciling generated versions with stored projects.
//!
//! Merges and removals go through targeted store operations
//! ([`ProjectStore::append_versions`], [`ProjectStore::remove_version`]) so
//! concurrent writers to one project keep each other's versions. Saving
//! writes the whole aggregate with [`ProjectStore::upsert_project`].

use jiff::Timestamp;
use log::{debug, warn};

use crate::{
    error::{InklingError, Result},
    models::{permanent_version_id, ContentVersion, StudioProject},
    params::{RemoveVersion, SaveProject},
    store::ProjectStore,
};

/// Appends `new_versions` to a stored project.
///
/// Versions whose id is already present (in the project or earlier in
/// `new_versions`) are skipped, so repeating a merge is harmless. Returns
/// the updated project, or `None` when the project no longer exists, in
/// which case nothing is written.
pub async fn merge_versions_into_project(
    store: &dyn ProjectStore,
    new_versions: Vec<ContentVersion>,
    project_id: &str,
) -> Result<Option<StudioProject>> {
    let Some(project) = store
        .append_versions(project_id, &new_versions, Timestamp::now())
        .await?
    else {
        warn!("Project {project_id} disappeared before its versions were merged");
        return Ok(None);
    };

    debug!(
        "Merged version(s) into project {project_id}, now {} in total",
        project.versions.len()
    );
    Ok(Some(project))
}

/// Persists a set of versions as a project, minting permanent ids for
/// temporary ones.
///
/// The project id is `params.project_id` or a fresh `project-<millis>` id.
/// Title, tags and main image come from the first version.
///
/// # Errors
///
/// Returns `InklingError::InvalidInput` for an empty version list and
/// propagates store failures.
pub async fn save_project_with_versions(
    store: &dyn ProjectStore,
    params: &SaveProject,
) -> Result<StudioProject> {
    let Some(first) = params.versions.first() else {
        return Err(InklingError::invalid_input("versions")
            .with_reason("A project needs at least one version"));
    };

    let timestamp = Timestamp::now();
    let project = StudioProject {
        id: params
            .project_id
            .clone()
            .unwrap_or_else(|| format!("project-{}", timestamp.as_millisecond())),
        title: first.title.clone(),
        original_note: params.original_note.clone(),
        tags: first.tags.clone(),
        main_image_url: Some(first.image_url.clone()).filter(|url| !url.is_empty()),
        versions: assign_permanent_ids(params.versions.clone()),
        timestamp,
    };

    store.upsert_project(&project).await?;
    Ok(project)
}

/// Replaces every `temp-` id with a fresh permanent id. Other ids are kept.
pub fn assign_permanent_ids(versions: Vec<ContentVersion>) -> Vec<ContentVersion> {
    versions
        .into_iter()
        .map(|mut version| {
            if version.has_temporary_id() {
                version.id = permanent_version_id();
            }
            version
        })
        .collect()
}

/// Removes one version from a stored project.
///
/// A project always keeps at least one version; removing the last one is
/// rejected, delete the project instead. Versions merged concurrently are
/// kept.
pub async fn remove_version(
    store: &dyn ProjectStore,
    params: &RemoveVersion,
) -> Result<StudioProject> {
    let project = store
        .remove_version(&params.project_id, &params.version_id, Timestamp::now())
        .await?;
    debug!(
        "Removed version {} from project {}, {} left",
        params.version_id,
        params.project_id,
        project.versions.len()
    );
    Ok(project)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::sync::Barrier;

    use super::*;
    use crate::{models::VersionStyle, store::memory::MemoryStore};

    fn version(id: &str) -> ContentVersion {
        ContentVersion {
            id: id.to_string(),
            title: format!("Title {id}"),
            content: format!("Content {id}"),
            description: String::new(),
            tags: vec![format!("tag-{id}")],
            image_url: format!("https://picsum.photos/seed/{id}/800/400"),
            style: VersionStyle::Story,
            is_recommended: None,
        }
    }

    fn project(id: &str, versions: &[&str]) -> StudioProject {
        StudioProject {
            id: id.to_string(),
            title: "Existing".to_string(),
            original_note: "note".to_string(),
            versions: versions.iter().map(|v| version(v)).collect(),
            tags: vec![],
            timestamp: Timestamp::from_millisecond(1_000).unwrap(),
            main_image_url: None,
        }
    }

    fn ids(project: &StudioProject) -> Vec<&str> {
        project.versions.iter().map(|v| v.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_merge_appends_and_touches_timestamp() {
        let store = MemoryStore::with_projects(vec![project("p1", &["v1", "v2"])]);

        let merged = merge_versions_into_project(&store, vec![version("v3")], "p1")
            .await
            .unwrap()
            .expect("project exists");

        assert_eq!(ids(&merged), vec!["v1", "v2", "v3"]);
        assert!(merged.timestamp > Timestamp::from_millisecond(1_000).unwrap());
        assert_eq!(store.project("p1").unwrap(), merged);
    }

    #[tokio::test]
    async fn test_merge_is_idempotent() {
        let store = MemoryStore::with_projects(vec![project("p1", &["v1"])]);

        merge_versions_into_project(&store, vec![version("v2")], "p1")
            .await
            .unwrap();
        let merged = merge_versions_into_project(&store, vec![version("v2")], "p1")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(ids(&merged), vec!["v1", "v2"]);
    }

    #[tokio::test]
    async fn test_merge_never_overwrites_existing_version() {
        let store = MemoryStore::with_projects(vec![project("p1", &["v1"])]);
        let mut replacement = version("v1");
        replacement.title = "Changed".to_string();

        let merged = merge_versions_into_project(&store, vec![replacement], "p1")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(merged.versions[0].title, "Title v1");
    }

    #[tokio::test]
    async fn test_merge_drops_duplicates_within_batch() {
        let store = MemoryStore::with_projects(vec![project("p1", &["v1"])]);

        let merged = merge_versions_into_project(&store, vec![version("v2"), version("v2")], "p1")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(ids(&merged), vec!["v1", "v2"]);
    }

    #[tokio::test]
    async fn test_merge_into_missing_project_is_noop() {
        let store = MemoryStore::default();

        let merged = merge_versions_into_project(&store, vec![version("v1")], "gone")
            .await
            .unwrap();

        assert!(merged.is_none());
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_merges_keep_both_versions() {
        let store = Arc::new(
            MemoryStore::with_projects(vec![project("p", &["v1"])])
                .with_rendezvous(Arc::new(Barrier::new(2))),
        );

        let (first, second) = tokio::join!(
            merge_versions_into_project(store.as_ref(), vec![version("vA")], "p"),
            merge_versions_into_project(store.as_ref(), vec![version("vB")], "p"),
        );
        first.unwrap().expect("project exists");
        second.unwrap().expect("project exists");

        let stored = store.project("p").unwrap();
        let mut stored_ids = ids(&stored);
        stored_ids.sort_unstable();
        assert_eq!(stored_ids, vec!["v1", "vA", "vB"]);
    }

    #[tokio::test]
    async fn test_merge_after_concurrent_delete_does_not_recreate_project() {
        let store = Arc::new(MemoryStore::with_projects(vec![project("p", &["v1"])]));
        let (entered, release) = store.hold_next_append();

        let merging = {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                merge_versions_into_project(store.as_ref(), vec![version("v2")], "p").await
            })
        };
        entered.await.unwrap();
        assert!(store.delete_project("p").await.unwrap());
        release.send(()).unwrap();

        assert!(merging.await.unwrap().unwrap().is_none());
        assert!(store.project("p").is_none());
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_save_assigns_permanent_ids_and_derives_fields() {
        let store = MemoryStore::default();
        let params = SaveProject {
            original_note: "raw".to_string(),
            versions: vec![version("temp-v-0-1"), version("v-kept")],
            project_id: None,
        };

        let saved = save_project_with_versions(&store, &params).await.unwrap();

        assert!(saved.id.starts_with("project-"));
        assert_eq!(saved.title, "Title temp-v-0-1");
        assert_eq!(saved.tags, vec!["tag-temp-v-0-1".to_string()]);
        assert_eq!(
            saved.main_image_url.as_deref(),
            Some("https://picsum.photos/seed/temp-v-0-1/800/400")
        );
        assert!(saved.versions[0].id.starts_with("v-"));
        assert!(!saved.versions[0].has_temporary_id());
        assert_eq!(saved.versions[1].id, "v-kept");
        assert_eq!(store.project(&saved.id).unwrap(), saved);
    }

    #[tokio::test]
    async fn test_save_overwrites_existing_project() {
        let store = MemoryStore::with_projects(vec![project("p1", &["v1", "v2"])]);
        let params = SaveProject {
            original_note: "raw".to_string(),
            versions: vec![version("v2")],
            project_id: Some("p1".to_string()),
        };

        let saved = save_project_with_versions(&store, &params).await.unwrap();

        assert_eq!(saved.id, "p1");
        assert_eq!(ids(&store.project("p1").unwrap()), vec!["v2"]);
    }

    #[tokio::test]
    async fn test_save_empty_versions_is_rejected() {
        let store = MemoryStore::default();
        let err = save_project_with_versions(&store, &SaveProject::default())
            .await
            .unwrap_err();
        assert!(matches!(err, InklingError::InvalidInput { .. }));
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_save_propagates_store_failure() {
        let store = MemoryStore::default();
        store.fail_writes();
        let params = SaveProject {
            original_note: "raw".to_string(),
            versions: vec![version("temp-v-0-1")],
            project_id: None,
        };

        let err = save_project_with_versions(&store, &params).await.unwrap_err();
        assert!(matches!(err, InklingError::Database { .. }));
    }

    #[test]
    fn test_assign_permanent_ids_are_unique() {
        let versions = assign_permanent_ids(vec![version("temp-a"), version("temp-b")]);
        assert_ne!(versions[0].id, versions[1].id);
        assert!(versions.iter().all(|v| v.id.starts_with("v-")));
    }

    #[tokio::test]
    async fn test_remove_version() {
        let store = MemoryStore::with_projects(vec![project("p1", &["v1", "v2"])]);
        let params = RemoveVersion {
            project_id: "p1".to_string(),
            version_id: "v1".to_string(),
        };

        let updated = remove_version(&store, &params).await.unwrap();
        assert_eq!(ids(&updated), vec!["v2"]);

        let params = RemoveVersion {
            project_id: "p1".to_string(),
            version_id: "v2".to_string(),
        };
        let err = remove_version(&store, &params).await.unwrap_err();
        assert!(matches!(err, InklingError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn test_remove_version_errors() {
        let store = MemoryStore::with_projects(vec![project("p1", &["v1", "v2"])]);

        let missing_project = RemoveVersion {
            project_id: "nope".to_string(),
            version_id: "v1".to_string(),
        };
        assert!(matches!(
            remove_version(&store, &missing_project).await,
            Err(InklingError::ProjectNotFound { .. })
        ));

        let missing_version = RemoveVersion {
            project_id: "p1".to_string(),
            version_id: "v9".to_string(),
        };
        assert!(matches!(
            remove_version(&store, &missing_version).await,
            Err(InklingError::VersionNotFound { .. })
        ));
    }
}
