//! Demo record types
//!
//! Users and posts are the auditable records the CLI manages. Both are
//! persisted as JSON and every mutation of them is audited.

pub mod ids;
pub mod post;
pub mod user;

pub use ids::{AuditId, PostId, UserId};
pub use post::{Post, PostValidationError};
pub use user::{User, UserValidationError};
