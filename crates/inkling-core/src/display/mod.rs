//! Display formatting functions and result types.
//!
//! Domain models implement [`std::fmt::Display`] directly (see [`models`]);
//! collections and operation outcomes are wrapped in newtypes so that the
//! same data can be formatted differently depending on context. Every
//! formatter produces markdown, rendered by the CLI through termimad and
//! returned verbatim by the MCP server.
//!
//! - [`collections`]: collection wrappers (Projects, Drafts, Tasks)
//! - [`results`]: operation results (SaveResult, DeleteResult)
//! - [`status`]: confirmation messages (OperationStatus)
//! - [`datetime`]: date/time formatting
//! - [`models`]: Display implementations for domain models

pub mod collections;
pub mod datetime;
pub mod models;
pub mod results;
pub mod status;

pub use collections::{Drafts, Projects, Tasks};
pub use datetime::LocalDateTime;
pub use results::{DeleteResult, SaveResult};
pub use status::OperationStatus;
