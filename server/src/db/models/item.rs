//! Item Model

use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;
use validator::Validate;

pub type ItemId = Thing;

/// The closed set of item categories
///
/// Category counts in query responses are seeded from this list, so every
/// category is always reported even when no item carries it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "medicine")]
    Medicine,
    #[serde(rename = "berries")]
    Berries,
    #[serde(rename = "food")]
    Food,
    #[serde(rename = "pokéballs")]
    Pokeballs,
    #[serde(rename = "evolution")]
    Evolution,
    #[serde(rename = "vitamins")]
    Vitamins,
    #[serde(rename = "tm/hm")]
    TmHm,
    #[serde(rename = "mega stones")]
    MegaStones,
}

impl Category {
    /// All categories, in display order
    pub const ALL: [Category; 8] = [
        Category::Medicine,
        Category::Berries,
        Category::Food,
        Category::Pokeballs,
        Category::Evolution,
        Category::Vitamins,
        Category::TmHm,
        Category::MegaStones,
    ];

    /// The stored label of this category
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Medicine => "medicine",
            Category::Berries => "berries",
            Category::Food => "food",
            Category::Pokeballs => "pokéballs",
            Category::Evolution => "evolution",
            Category::Vitamins => "vitamins",
            Category::TmHm => "tm/hm",
            Category::MegaStones => "mega stones",
        }
    }

    /// Parse a stored label back into a category
    ///
    /// Labels must match exactly; anything else is a validation error at
    /// the write path.
    pub fn from_label(label: &str) -> Option<Category> {
        Category::ALL.iter().copied().find(|c| c.as_str() == label)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discount type enum
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    #[default]
    Percentage,
    Absolute,
}

/// Embedded discount on an item
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Discount {
    #[serde(default)]
    pub amount: f64,
    #[serde(default, rename = "type")]
    pub kind: DiscountType,
}

impl Discount {
    /// Normalize a client-supplied discount for storage
    ///
    /// Amounts are stored as absolute values even when a negative input
    /// is supplied.
    pub fn normalized(self) -> Discount {
        Discount {
            amount: self.amount.abs(),
            kind: self.kind,
        }
    }
}

/// Item model matching the SurrealDB schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: Option<ItemId>,
    pub name: String,
    pub category: Category,
    pub price: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub photo_url: String,
    /// Record links to tag
    #[serde(default)]
    pub tags: Vec<Thing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<Discount>,
    #[serde(default)]
    pub is_new_item: bool,
    /// Derived from `name`; regenerated on rename
    pub slug: String,
    /// Epoch milliseconds
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

/// Item creation payload
///
/// `category` arrives as a label and is validated against the closed enum;
/// `tags` arrives as tag names and is resolved to references (unknown names
/// are rejected, tags are never auto-created).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ItemCreate {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub category: String,
    #[validate(range(min = 0.0))]
    pub price: f64,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub description: String,
    #[serde(default)]
    #[validate(length(max = 2048))]
    pub photo_url: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub discount: Option<Discount>,
    #[serde(default)]
    pub is_new_item: bool,
}

/// Item update payload (partial; only supplied fields change)
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ItemUpdate {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub category: Option<String>,
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(length(max = 2048))]
    pub photo_url: Option<String>,
    /// Full replacement of the tag list when supplied
    pub tags: Option<Vec<String>>,
    pub discount: Option<Discount>,
    pub is_new_item: Option<bool>,
}
