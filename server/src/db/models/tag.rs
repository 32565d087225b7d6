//! Tag Model

use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;
use validator::Validate;

pub type TagId = Thing;

/// Tag model matching the SurrealDB schema
///
/// Tags are referenced from items; no back-reference is maintained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub id: Option<TagId>,
    pub name: String,
    /// Epoch milliseconds
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

/// Tag creation payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TagCreate {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
}

/// Tag update payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct TagUpdate {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
}
