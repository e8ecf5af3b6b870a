//! Tests for the SQLite store.

use jiff::Timestamp;
use tempfile::TempDir;

use super::*;
use crate::{
    error::InklingError,
    models::{ContentVersion, VersionStyle},
};

async fn create_test_store() -> (TempDir, SqliteStore) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let store = StoreBuilder::new()
        .with_database_path(Some(&db_path))
        .build()
        .await
        .expect("Failed to create store");
    (temp_dir, store)
}

fn version(id: &str, title: &str) -> ContentVersion {
    ContentVersion {
        id: id.to_string(),
        title: title.to_string(),
        content: format!("{title} body"),
        description: format!("{title} summary"),
        tags: vec!["notes".to_string()],
        image_url: format!("https://picsum.photos/seed/{id}/800/400"),
        style: VersionStyle::Detailed,
        is_recommended: None,
    }
}

fn project(id: &str, millis: i64, versions: Vec<ContentVersion>) -> StudioProject {
    StudioProject {
        id: id.to_string(),
        title: format!("Project {id}"),
        original_note: "a raw note".to_string(),
        versions,
        tags: vec!["notes".to_string(), "ideas".to_string()],
        timestamp: Timestamp::from_millisecond(millis).unwrap(),
        main_image_url: Some("https://picsum.photos/seed/main/800/400".to_string()),
    }
}

#[tokio::test]
async fn test_upsert_and_list_project_round_trip() {
    let (_temp_dir, store) = create_test_store().await;
    let saved = project("p1", 1_700_000_000_000, vec![version("v1", "One"), version("v2", "Two")]);

    store.upsert_project(&saved).await.expect("Failed to save project");

    let projects = store.list_projects().await.expect("Failed to list projects");
    assert_eq!(projects, vec![saved]);
}

#[tokio::test]
async fn test_list_projects_newest_first() {
    let (_temp_dir, store) = create_test_store().await;
    store
        .upsert_project(&project("old", 1_600_000_000_000, vec![]))
        .await
        .unwrap();
    store
        .upsert_project(&project("new", 1_700_000_000_000, vec![]))
        .await
        .unwrap();

    let ids: Vec<String> = store
        .list_projects()
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(ids, vec!["new".to_string(), "old".to_string()]);
}

#[tokio::test]
async fn test_upsert_project_removes_versions_missing_from_payload() {
    let (_temp_dir, store) = create_test_store().await;
    let mut saved = project("p1", 1_700_000_000_000, vec![version("v1", "One"), version("v2", "Two")]);
    store.upsert_project(&saved).await.unwrap();

    saved.versions.remove(0);
    store.upsert_project(&saved).await.unwrap();

    let loaded = store.get_project("p1").await.unwrap().expect("project exists");
    let ids: Vec<&str> = loaded.versions.iter().map(|v| v.id.as_str()).collect();
    assert_eq!(ids, vec!["v2"]);
}

#[tokio::test]
async fn test_upsert_project_keeps_payload_order() {
    let (_temp_dir, store) = create_test_store().await;
    let mut saved = project("p1", 1_700_000_000_000, vec![version("b", "B"), version("a", "A")]);
    store.upsert_project(&saved).await.unwrap();

    saved.versions.push(version("c", "C"));
    store.upsert_project(&saved).await.unwrap();

    let loaded = store.get_project("p1").await.unwrap().unwrap();
    let ids: Vec<&str> = loaded.versions.iter().map(|v| v.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "a", "c"]);
}

#[tokio::test]
async fn test_get_missing_project_is_none() {
    let (_temp_dir, store) = create_test_store().await;
    assert!(store.get_project("nope").await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_project_removes_versions() {
    let (_temp_dir, store) = create_test_store().await;
    store
        .upsert_project(&project("p1", 1_700_000_000_000, vec![version("v1", "One")]))
        .await
        .unwrap();

    assert!(store.delete_project("p1").await.unwrap());
    assert!(!store.delete_project("p1").await.unwrap());
    assert!(store.list_projects().await.unwrap().is_empty());

    // The version id is free again for another project.
    store
        .upsert_project(&project("p2", 1_700_000_000_000, vec![version("v1", "One")]))
        .await
        .unwrap();
    assert_eq!(store.get_project("p2").await.unwrap().unwrap().versions.len(), 1);
}

#[tokio::test]
async fn test_update_version_fields_only_touches_given_fields() {
    let (_temp_dir, store) = create_test_store().await;
    store
        .upsert_project(&project("p1", 1_700_000_000_000, vec![version("v1", "One")]))
        .await
        .unwrap();

    store
        .update_version_fields(
            "p1",
            "v1",
            &VersionUpdate {
                title: Some("Renamed".to_string()),
                content: Some(String::new()),
            },
        )
        .await
        .expect("Failed to update version");

    let loaded = store.get_project("p1").await.unwrap().unwrap();
    assert_eq!(loaded.versions[0].title, "Renamed");
    assert_eq!(loaded.versions[0].content, "One body");
}

#[tokio::test]
async fn test_update_unknown_version_is_not_found() {
    let (_temp_dir, store) = create_test_store().await;
    store
        .upsert_project(&project("p1", 1_700_000_000_000, vec![version("v1", "One")]))
        .await
        .unwrap();

    let err = store
        .update_version_fields(
            "p1",
            "v9",
            &VersionUpdate {
                title: Some("x".to_string()),
                content: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, InklingError::VersionNotFound { .. }));
}

#[tokio::test]
async fn test_append_versions_skips_taken_ids() {
    let (_temp_dir, store) = create_test_store().await;
    let stored = project(
        "p1",
        1_600_000_000_000,
        vec![version("v1", "One"), version("v2", "Two")],
    );
    store.upsert_project(&stored).await.unwrap();
    let touched = Timestamp::from_millisecond(1_700_000_000_000).unwrap();

    let appended = store
        .append_versions(
            "p1",
            &[version("v3", "Three"), version("v1", "Changed"), version("v3", "Again")],
            touched,
        )
        .await
        .unwrap()
        .expect("project exists");

    let ids: Vec<&str> = appended.versions.iter().map(|v| v.id.as_str()).collect();
    assert_eq!(ids, vec!["v1", "v2", "v3"]);
    assert_eq!(appended.versions[0].title, "One");
    assert_eq!(appended.versions[2].title, "Three");
    assert_eq!(appended.timestamp, touched);
    assert_eq!(store.get_project("p1").await.unwrap(), Some(appended));
}

#[tokio::test]
async fn test_append_to_missing_project_writes_nothing() {
    let (_temp_dir, store) = create_test_store().await;

    let appended = store
        .append_versions("gone", &[version("v1", "One")], Timestamp::now())
        .await
        .unwrap();

    assert!(appended.is_none());
    assert!(store.list_projects().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_append_after_delete_does_not_recreate_project() {
    let (_temp_dir, store) = create_test_store().await;
    store
        .upsert_project(&project("p1", 1_600_000_000_000, vec![version("v1", "One")]))
        .await
        .unwrap();
    assert!(store.delete_project("p1").await.unwrap());

    let appended = store
        .append_versions("p1", &[version("v2", "Two")], Timestamp::now())
        .await
        .unwrap();

    assert!(appended.is_none());
    assert_eq!(store.get_project("p1").await.unwrap(), None);
}

#[tokio::test]
async fn test_append_never_takes_a_version_from_another_project() {
    let (_temp_dir, store) = create_test_store().await;
    store
        .upsert_project(&project("p1", 1_600_000_000_000, vec![version("v1", "One")]))
        .await
        .unwrap();
    store
        .upsert_project(&project("p2", 1_600_000_000_000, vec![version("v2", "Two")]))
        .await
        .unwrap();

    let appended = store
        .append_versions("p2", &[version("v1", "Stolen")], Timestamp::now())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(appended.versions.len(), 1);
    let owner = store.get_project("p1").await.unwrap().unwrap();
    assert_eq!(owner.versions[0].title, "One");
}

#[tokio::test]
async fn test_concurrent_appends_keep_every_version() {
    let (_temp_dir, store) = create_test_store().await;
    store
        .upsert_project(&project("p1", 1_600_000_000_000, vec![version("v1", "One")]))
        .await
        .unwrap();

    let mut appends = tokio::task::JoinSet::new();
    for idx in 0..8 {
        let store = store.clone();
        appends.spawn(async move {
            let added = version(&format!("v-new-{idx}"), "New");
            store.append_versions("p1", &[added], Timestamp::now()).await
        });
    }
    while let Some(result) = appends.join_next().await {
        assert!(result.unwrap().unwrap().is_some());
    }

    let stored = store.get_project("p1").await.unwrap().unwrap();
    assert_eq!(stored.versions.len(), 9);
    assert_eq!(stored.versions[0].id, "v1");
    for idx in 0..8 {
        assert!(stored.contains_version(&format!("v-new-{idx}")));
    }
}

#[tokio::test]
async fn test_remove_version_keeps_versions_appended_since_read() {
    let (_temp_dir, store) = create_test_store().await;
    let stored = project(
        "p1",
        1_600_000_000_000,
        vec![version("v1", "One"), version("v2", "Two")],
    );
    store.upsert_project(&stored).await.unwrap();
    let read = store.get_project("p1").await.unwrap().unwrap();
    store
        .append_versions("p1", &[version("v3", "Three")], Timestamp::now())
        .await
        .unwrap();

    let updated = store
        .remove_version(&read.id, &read.versions[0].id, Timestamp::now())
        .await
        .unwrap();

    let ids: Vec<&str> = updated.versions.iter().map(|v| v.id.as_str()).collect();
    assert_eq!(ids, vec!["v2", "v3"]);
    assert!(updated.timestamp > read.timestamp);
}

#[tokio::test]
async fn test_remove_version_rejections() {
    let (_temp_dir, store) = create_test_store().await;
    store
        .upsert_project(&project("p1", 1_600_000_000_000, vec![version("v1", "One")]))
        .await
        .unwrap();

    let err = store
        .remove_version("p1", "v1", Timestamp::now())
        .await
        .unwrap_err();
    assert!(matches!(err, InklingError::InvalidInput { .. }));

    let err = store
        .remove_version("p1", "v9", Timestamp::now())
        .await
        .unwrap_err();
    assert!(matches!(err, InklingError::VersionNotFound { .. }));

    let err = store
        .remove_version("gone", "v1", Timestamp::now())
        .await
        .unwrap_err();
    assert!(matches!(err, InklingError::ProjectNotFound { .. }));

    let kept = store.get_project("p1").await.unwrap().unwrap();
    assert_eq!(kept.versions.len(), 1);
    assert_eq!(kept.timestamp, Timestamp::from_millisecond(1_600_000_000_000).unwrap());
}

#[tokio::test]
async fn test_drafts_round_trip_newest_first() {
    let (_temp_dir, store) = create_test_store().await;
    let older = Draft {
        id: "1".to_string(),
        text: "first thought".to_string(),
        timestamp: Timestamp::from_millisecond(1_000).unwrap(),
    };
    let newer = Draft {
        id: "2".to_string(),
        text: "second thought".to_string(),
        timestamp: Timestamp::from_millisecond(2_000).unwrap(),
    };
    store.upsert_draft(&older).await.unwrap();
    store.upsert_draft(&newer).await.unwrap();

    assert_eq!(store.list_drafts().await.unwrap(), vec![newer, older]);

    assert!(store.delete_draft("2").await.unwrap());
    assert!(!store.delete_draft("2").await.unwrap());
    assert_eq!(store.list_drafts().await.unwrap().len(), 1);
}
