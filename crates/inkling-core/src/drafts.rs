//! Draft autosave.

use log::debug;

use crate::{error::Result, models::Draft, store::ProjectStore};

/// Saves `text` as a new draft unless it is blank or identical to the most
/// recent draft.
///
/// Returns the stored draft, or `None` when the save was skipped.
pub async fn autosave(store: &dyn ProjectStore, text: &str) -> Result<Option<Draft>> {
    if text.trim().is_empty() {
        debug!("Skipping autosave of blank text");
        return Ok(None);
    }

    let latest = store.list_drafts().await?.into_iter().next();
    if latest.is_some_and(|draft| draft.text == text) {
        debug!("Skipping autosave, text unchanged since the last draft");
        return Ok(None);
    }

    let draft = Draft::new(text);
    store.upsert_draft(&draft).await?;
    Ok(Some(draft))
}
