//! Item query engine
//!
//! Turns raw query parameters into a paginated, filtered, sorted and
//! discount-aware page over the item collection:
//!
//! - [`filter`] compiles the raw parameters into WHERE fragments
//! - [`sort`] compiles the sort key/direction and the in-memory comparator
//! - [`engine`] selects the execution strategy, runs the store round-trips
//!   and assembles the page envelope

pub mod engine;
pub mod filter;
pub mod sort;

pub use engine::Catalog;
pub use filter::CompiledFilter;
pub use sort::SortSpec;

use crate::db::models::{Category, DiscountType};
use crate::db::repository::ItemWithTags;
use crate::pricing;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Items per page when the caller does not say otherwise
pub const DEFAULT_PAGE_SIZE: u32 = 16;

// =============================================================================
// Query parameters
// =============================================================================

/// Raw item query parameters, as an HTTP layer would deserialize them
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ItemQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// Conjunctive multi-field substring search
    pub search: Option<String>,
    /// Comma-separated category substrings, OR'ed
    pub cat: Option<String>,
    /// Comma-separated tag-name substrings, OR'ed
    pub tag: Option<String>,
    #[serde(rename = "minPrice")]
    pub min_price: Option<f64>,
    #[serde(rename = "maxPrice")]
    pub max_price: Option<f64>,
    /// Inclusive bounds on the computed discounted price; presence of
    /// either switches retrieval to the aggregation strategy
    #[serde(rename = "minDiscountedPrice")]
    pub min_discounted_price: Option<f64>,
    #[serde(rename = "maxDiscountedPrice")]
    pub max_discounted_price: Option<f64>,
    pub sort: Option<SortKey>,
    pub order: Option<SortOrder>,
}

/// Sort key enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Name,
    Price,
}

/// Sort direction
///
/// Deserializes from the accepted variants `asc`/`desc`,
/// `ascending`/`descending`, and `1`/`-1` (string or number).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// The SurrealQL direction keyword
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" | "1" => Ok(SortOrder::Asc),
            "desc" | "descending" | "-1" => Ok(SortOrder::Desc),
            other => Err(format!("invalid sort order: {other}")),
        }
    }
}

impl<'de> Deserialize<'de> for SortOrder {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct OrderVisitor;

        impl serde::de::Visitor<'_> for OrderVisitor {
            type Value = SortOrder;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("asc/desc, ascending/descending, 1 or -1")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                v.parse().map_err(E::custom)
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                match v {
                    1 => Ok(SortOrder::Asc),
                    -1 => Ok(SortOrder::Desc),
                    other => Err(E::custom(format!("invalid sort order: {other}"))),
                }
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                self.visit_i64(v as i64)
            }
        }

        deserializer.deserialize_any(OrderVisitor)
    }
}

// =============================================================================
// Page envelope
// =============================================================================

/// Min/max of the computed discounted price across the filtered set
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl Default for PriceRange {
    fn default() -> Self {
        Self { min: 0.0, max: 0.0 }
    }
}

/// Pagination metadata for a result page
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Total matching items
    pub count: u64,
    /// Total pages at the requested limit
    pub pages: u32,
    /// Current page (1-based)
    pub page: u32,
    pub prev: Option<String>,
    pub next: Option<String>,
    pub first: Option<String>,
    pub last: Option<String>,
    /// Per-category totals; every fixed category is present, zero-filled
    #[serde(rename = "categorieCount")]
    pub category_count: BTreeMap<String, u64>,
    pub price_range: PriceRange,
}

/// Discount sub-object in the response shape, augmented with the
/// computed price; present even for undiscounted items
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountView {
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: DiscountType,
    pub discounted_price: f64,
    pub has_discount: bool,
}

/// Item in the response shape: tag references flattened to names,
/// discount augmented with the computed price
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub price: f64,
    pub description: String,
    pub photo_url: String,
    pub tags: Vec<String>,
    pub discount: DiscountView,
    pub is_new_item: bool,
    pub slug: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<&ItemWithTags> for ItemView {
    fn from(item: &ItemWithTags) -> Self {
        let discounted = pricing::discounted_price(item.price, item.discount.as_ref());
        Self {
            id: item.id.as_ref().map(|t| t.to_string()).unwrap_or_default(),
            name: item.name.clone(),
            category: item.category,
            price: item.price,
            description: item.description.clone(),
            photo_url: item.photo_url.clone(),
            tags: item.tags.iter().map(|t| t.name.clone()).collect(),
            discount: DiscountView {
                amount: item.discount.map(|d| d.amount).unwrap_or(0.0),
                kind: item.discount.map(|d| d.kind).unwrap_or_default(),
                discounted_price: discounted,
                has_discount: discounted != item.price,
            },
            is_new_item: item.is_new_item,
            slug: item.slug.clone(),
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

/// The full page envelope returned by [`Catalog::get_items`]
#[derive(Debug, Clone, Serialize)]
pub struct ItemPage {
    pub info: PageInfo,
    pub items: Vec<ItemView>,
}
