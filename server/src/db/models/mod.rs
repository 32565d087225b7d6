//! Database Models

// Catalog domain
pub mod item;
pub mod tag;

// Accounts
pub mod user;

// Re-exports
pub use item::{Category, Discount, DiscountType, Item, ItemCreate, ItemId, ItemUpdate};
pub use tag::{Tag, TagCreate, TagId, TagUpdate};
pub use user::{User, UserCreate, UserId, UserView};
