//! Data models for projects, versions, drafts and generation tasks.
//!
//! Display implementations for these models live in
//! [`crate::display::models`] so that the data structures stay free of
//! presentation logic.
//!
//! # Examples
//!
//! ```rust
//! use inkling_core::models::{ContentVersion, StudioProject, VersionStyle};
//! use jiff::Timestamp;
//!
//! let version = ContentVersion {
//!     id: "temp-v-0-1700000000000".to_string(),
//!     title: "Morning pages".to_string(),
//!     content: "A short story about coffee.".to_string(),
//!     description: "Narrative take".to_string(),
//!     tags: vec!["coffee".to_string()],
//!     image_url: String::new(),
//!     style: VersionStyle::Story,
//!     is_recommended: None,
//! };
//! assert!(version.has_temporary_id());
//!
//! let project = StudioProject {
//!     id: "project-1".to_string(),
//!     title: version.title.clone(),
//!     original_note: "coffee thoughts".to_string(),
//!     versions: vec![version],
//!     tags: vec![],
//!     timestamp: Timestamp::now(),
//!     main_image_url: None,
//! };
//! println!("{}", project);
//! ```

pub mod draft;
pub mod project;
pub mod requests;
pub mod status;
pub mod task;
pub mod version;


pub use draft::Draft;
pub use project::StudioProject;
pub use requests::VersionUpdate;
pub use status::{TaskStatus, VersionStyle};
pub use task::{Task, TaskId, TaskKind, TaskOutput};
pub use version::{
    permanent_version_id, placeholder_image_url, temporary_version_id, ContentVersion,
    TEMP_ID_PREFIX,
};
