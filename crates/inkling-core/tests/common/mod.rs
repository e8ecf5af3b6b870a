#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use inkling_core::{
    ai::GeneratedVersion, ContentVersion, GenerationClient, Result, SqliteStore, StoreBuilder,
    VersionStyle,
};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

/// Helper function to create a store over a temporary database
pub async fn create_test_store() -> (TempDir, Arc<SqliteStore>) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let store = StoreBuilder::new()
        .with_database_path(Some(&db_path))
        .build()
        .await
        .expect("Failed to create store");
    (temp_dir, Arc::new(store))
}

/// Model output the way the API returns it, before tagging.
pub fn generated(title: &str, style: VersionStyle) -> GeneratedVersion {
    GeneratedVersion {
        title: title.to_string(),
        content: format!("{title} in full"),
        tags: vec!["notes".to_string()],
        description: format!("{title} in brief"),
        style,
    }
}

/// Client that answers immediately with canned model output.
pub struct CannedClient {
    pub batch: Vec<GeneratedVersion>,
    pub single: Option<GeneratedVersion>,
}

impl CannedClient {
    pub fn four_styles() -> Self {
        Self {
            batch: VersionStyle::GENERATED
                .iter()
                .map(|style| generated(&format!("{style} take"), *style))
                .collect(),
            single: Some(generated("Extra take", VersionStyle::Story)),
        }
    }
}

#[async_trait]
impl GenerationClient for CannedClient {
    async fn generate_batch(
        &self,
        _raw_note: &str,
        _cancel: &CancellationToken,
    ) -> Result<Vec<ContentVersion>> {
        Ok(inkling_core::ai::tag_batch(self.batch.clone()))
    }

    async fn generate_one(
        &self,
        _context_note: &str,
        _cancel: &CancellationToken,
    ) -> Result<Option<ContentVersion>> {
        Ok(self.single.clone().map(GeneratedVersion::into_single_version))
    }

    async fn transcribe(
        &self,
        audio: &[u8],
        _mime_type: &str,
        _cancel: &CancellationToken,
    ) -> Result<String> {
        Ok(String::from_utf8_lossy(audio).into_owned())
    }
}
