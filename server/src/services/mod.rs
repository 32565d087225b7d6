//! Service layer
//!
//! Orchestrates repositories and the catalog engine: cross-entity
//! validation (tag-name resolution, category labels), slug maintenance,
//! password hashing and wishlist handling.

pub mod item_service;
pub mod user_service;

pub use item_service::ItemService;
pub use user_service::{Registration, UserService};
