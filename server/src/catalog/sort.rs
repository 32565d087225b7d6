//! Sort compilation
//!
//! Compiles the `sort`/`order` parameters into a store-native ORDER BY
//! fragment plus, for price sorting, an in-memory comparator keyed on the
//! discounted price. Ranking by discount-adjusted price cannot be
//! expressed as a store-level sort on a stored field, so the direct
//! retrieval path re-orders the fetched page with the comparator, while
//! the aggregation path orders on the computed field in-store.

use super::{SortKey, SortOrder};

/// Output of the sort compiler
#[derive(Debug, Clone, Copy)]
pub struct SortSpec {
    pub key: Option<SortKey>,
    pub order: SortOrder,
}

impl SortSpec {
    /// Compile from raw parameters; direction defaults to ascending
    pub fn compile(sort: Option<SortKey>, order: Option<SortOrder>) -> Self {
        Self {
            key: sort,
            order: order.unwrap_or_default(),
        }
    }

    /// The ` ORDER BY ...` suffix, or empty when no sort was requested.
    ///
    /// `price_field` is `price` on the direct path and the computed
    /// effective-price field on the aggregation path.
    pub fn order_clause(&self, price_field: &str) -> String {
        match self.key {
            None => String::new(),
            Some(SortKey::Name) => format!(" ORDER BY name {}", self.order.as_sql()),
            Some(SortKey::Price) => {
                format!(" ORDER BY {price_field} {}", self.order.as_sql())
            }
        }
    }

    /// Whether the fetched page must be re-ordered in memory
    pub fn needs_post_sort(&self) -> bool {
        self.key == Some(SortKey::Price)
    }

    /// Stable in-place re-sort by the discounted price of each element.
    ///
    /// Stability keeps pagination deterministic across requests with
    /// identical parameters: ties keep their retrieval order.
    pub fn post_sort<T>(&self, items: &mut [T], price_of: impl Fn(&T) -> f64) {
        match self.order {
            SortOrder::Asc => items.sort_by(|a, b| price_of(a).total_cmp(&price_of(b))),
            SortOrder::Desc => items.sort_by(|a, b| price_of(b).total_cmp(&price_of(a))),
        }
    }
}
