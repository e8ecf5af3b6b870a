//! Core library for the Inkling note studio.
//!
//! A raw note goes in; a generative model rewrites it in several styles
//! ("versions"); the user keeps the versions they like as a project. This
//! crate holds everything except the user interface:
//!
//! - [`manager`]: the [`GenerationManager`], which runs model calls as
//!   tracked background tasks with publish/subscribe notification and
//!   cancellation
//! - [`reconcile`]: merging generated versions into stored projects
//! - [`store`]: the [`ProjectStore`] persistence seam and its SQLite
//!   implementation
//! - [`ai`]: the [`GenerationClient`] model seam and the Gemini client
//! - [`drafts`]: draft autosave
//! - [`handlers`]: workflows shared by the CLI and the MCP server
//!
//! # Display Architecture
//!
//! Models implement [`std::fmt::Display`] as markdown, and the wrappers in
//! [`display`] format collections and operation results. The CLI renders the
//! markdown in the terminal; the MCP server returns it as text.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use inkling_core::{
//!     params::SaveProject, reconcile, Config, GeminiClient, GenerationManager, StoreBuilder,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(
//!     StoreBuilder::new()
//!         .with_database_path(Some("inkling.db"))
//!         .build()
//!         .await?,
//! );
//! let client = Arc::new(GeminiClient::new(&Config::load(None)?)?);
//! let manager = GenerationManager::new(client, store.clone());
//!
//! let id = manager.start_bulk_task("rain on the window, coffee going cold");
//! let task = manager.settled(&id).await.expect("task exists");
//!
//! if let Some(output) = task.output {
//!     let params = SaveProject {
//!         original_note: "rain on the window, coffee going cold".to_string(),
//!         versions: output.versions().to_vec(),
//!         project_id: None,
//!     };
//!     let project = reconcile::save_project_with_versions(store.as_ref(), &params).await?;
//!     println!("{project}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod ai;
pub mod config;
pub mod db;
pub mod display;
pub mod drafts;
pub mod error;
pub mod handlers;
pub mod manager;
pub mod models;
pub mod params;
pub mod reconcile;
pub mod store;

// Re-export commonly used types
pub use ai::{GeminiClient, GenerationClient};
pub use config::Config;
pub use db::Database;
pub use display::{DeleteResult, Drafts, LocalDateTime, OperationStatus, Projects, SaveResult, Tasks};
pub use error::{InklingError, Result};
pub use manager::{GenerationManager, Subscription, TaskSnapshot};
pub use models::{
    ContentVersion, Draft, StudioProject, Task, TaskId, TaskKind, TaskOutput, TaskStatus,
    VersionStyle, VersionUpdate,
};
pub use params::{AddVersion, Id, RefineNote, RemoveVersion, SaveDraft, SaveProject, UpdateVersion};
pub use store::{ProjectStore, SqliteStore, StoreBuilder};
