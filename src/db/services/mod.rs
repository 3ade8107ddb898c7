//! The `services` module provides a high-level API for interacting with the
//! database. It encapsulates the query logic and ownership scoping, so the
//! HTTP handlers can work with domain models without knowing about the
//! underlying schema.
//!
//! Every list/retrieve/update/delete in this module filters by the owning
//! user id. Acting on another user's row is indistinguishable from the row
//! not existing.

pub mod ingredient_service;
pub mod recipe_service;
pub mod tag_service;
pub mod user_service;

pub use ingredient_service::*;
pub use recipe_service::*;
pub use tag_service::*;
pub use user_service::*;
