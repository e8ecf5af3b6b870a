//! Generative model access.
//!
//! [`GenerationClient`] is the seam between the generation manager and the
//! model provider. [`GeminiClient`] talks to the Gemini REST API; tests
//! substitute their own implementations.
//!
//! Implementations return versions already tagged for their destination:
//! batch results carry temporary ids (they are not persisted until the user
//! saves them) while single results carry permanent ids, because they are
//! merged straight into a stored project.

use std::future::Future;

use async_trait::async_trait;
use jiff::Timestamp;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::{
    error::{InklingError, Result},
    models::{
        placeholder_image_url, temporary_version_id, version::random_suffix, ContentVersion,
        VersionStyle,
    },
};

mod gemini;

pub use gemini::GeminiClient;

/// Client for the generative model.
///
/// Every call takes the owning task's cancellation token. Implementations
/// should stop work and return [`InklingError::Cancelled`] once the token
/// fires; callers also race the call against the token, so honoring it is
/// about releasing resources promptly rather than correctness.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Produces several styled rewrites of a raw note, tagged with
    /// temporary ids and placeholder images.
    async fn generate_batch(
        &self,
        raw_note: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<ContentVersion>>;

    /// Produces one extra rewrite of a note, tagged with a permanent id.
    /// `None` means the model returned nothing.
    async fn generate_one(
        &self,
        context_note: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<ContentVersion>>;

    /// Converts recorded speech to text.
    async fn transcribe(
        &self,
        audio: &[u8],
        mime_type: &str,
        cancel: &CancellationToken,
    ) -> Result<String>;
}

/// A version as the model returns it, before ids and images are assigned.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct GeneratedVersion {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub style: VersionStyle,
}

impl GeneratedVersion {
    /// Tags the `index`th version of a batch with a temporary id and an
    /// image seeded by style and index.
    pub fn into_batch_version(self, index: usize) -> ContentVersion {
        let image_url = placeholder_image_url(self.style, index);
        self.into_version(temporary_version_id(index), image_url)
    }

    /// Tags a single version with a `v-<style>-<millis>-<suffix>` id.
    pub fn into_single_version(self) -> ContentVersion {
        let millis = Timestamp::now().as_millisecond();
        let id = format!("v-{}-{millis}-{}", self.style.as_str(), random_suffix());
        let image_url = placeholder_image_url(self.style, millis);
        self.into_version(id, image_url)
    }

    fn into_version(self, id: String, image_url: String) -> ContentVersion {
        ContentVersion {
            id,
            title: self.title,
            content: self.content,
            description: self.description,
            tags: self.tags,
            image_url,
            style: self.style,
            is_recommended: None,
        }
    }
}

/// Tags a whole batch in model order.
pub fn tag_batch(generated: Vec<GeneratedVersion>) -> Vec<ContentVersion> {
    generated
        .into_iter()
        .enumerate()
        .map(|(index, version)| version.into_batch_version(index))
        .collect()
}

/// Runs `fut` until it finishes or `cancel` fires, whichever is first.
///
/// A fired token always yields [`InklingError::Cancelled`], even if the
/// future would have completed on the same poll.
pub async fn until_cancelled<T, F>(cancel: &CancellationToken, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(InklingError::Cancelled),
        result = fut => result,
    }
}
