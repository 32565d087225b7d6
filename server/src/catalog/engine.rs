//! Query execution
//!
//! The pagination orchestrator: compiles the filters, selects one of two
//! retrieval strategies, runs the store round-trips and assembles the
//! page envelope.
//!
//! - `Direct`: filtered count + filtered/sorted/paginated find with tag
//!   references resolved in-query. When price sorting was requested, the
//!   fetched page is re-ordered in memory by discounted price.
//! - `Aggregated`: selected when discounted-price bounds are present.
//!   The discounted price is materialized as a computed field inside a
//!   subquery, matched against the bounds and sorted in-store. This path
//!   returns plain rows, so tags are attached with a second lookup and
//!   merged back by id.

use super::filter::{BindValue, CompiledFilter};
use super::sort::SortSpec;
use super::{DEFAULT_PAGE_SIZE, ItemPage, ItemQuery, ItemView, PageInfo, PriceRange};
use crate::common::{AppError, AppResult};
use crate::db::models::{Category, Item};
use crate::db::repository::{ItemWithTags, TagRepository};
use crate::pricing::{self, EFFECTIVE_PRICE_EXPR};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, HashMap};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use surrealdb::sql::Thing;

/// Retrieval strategy, selected by the active filters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    Direct,
    Aggregated,
}

#[derive(Debug, Deserialize)]
struct CountRow {
    count: u64,
}

#[derive(Debug, Deserialize)]
struct CategoryCountRow {
    category: String,
    count: u64,
}

#[derive(Debug, Deserialize)]
struct PriceRangeRow {
    min: Option<f64>,
    max: Option<f64>,
}

/// Item query engine over the embedded store
#[derive(Clone)]
pub struct Catalog {
    db: Surreal<Db>,
    tags: TagRepository,
}

impl Catalog {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            tags: TagRepository::new(db.clone()),
            db,
        }
    }

    /// Execute an item query and assemble the page envelope.
    ///
    /// `page_link` maps a page number to the URL the presentation layer
    /// wants in the `prev`/`next`/`first`/`last` slots.
    pub async fn get_items<F>(&self, query: &ItemQuery, page_link: F) -> AppResult<ItemPage>
    where
        F: Fn(u32) -> String,
    {
        let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).max(1);
        let page = query.page.unwrap_or(1).max(1);
        let skip = (page as u64 - 1) * limit as u64;

        // Tag names are needed by the filter compiler; fetch once
        let all_tags = self.tags.find_all().await?;
        let filter = CompiledFilter::compile(query, &all_tags);
        let sort = SortSpec::compile(query.sort, query.order);

        // Price range over the filtered set, independent of pagination
        let price_range = self.price_range(&filter).await?;

        let strategy = if filter.has_discount_bounds() {
            Strategy::Aggregated
        } else {
            Strategy::Direct
        };
        tracing::debug!(?strategy, page, limit, "executing item query");

        let (count, items) = match strategy {
            Strategy::Direct => self.run_direct(&filter, &sort, limit, page, skip).await?,
            Strategy::Aggregated => self.run_aggregated(&filter, &sort, limit, page, skip).await?,
        };

        let pages = count.div_ceil(limit as u64) as u32;
        let category_count = self.category_counts(&filter).await?;

        let info = PageInfo {
            count,
            pages,
            page,
            prev: (page > 1).then(|| page_link(page - 1)),
            next: (page < pages).then(|| page_link(page + 1)),
            first: (page > 1).then(|| page_link(1)),
            last: (page < pages).then(|| page_link(pages)),
            category_count,
            price_range,
        };

        Ok(ItemPage {
            info,
            items: items.iter().map(ItemView::from).collect(),
        })
    }

    // =========================================================================
    // Strategies
    // =========================================================================

    async fn run_direct(
        &self,
        filter: &CompiledFilter,
        sort: &SortSpec,
        limit: u32,
        page: u32,
        skip: u64,
    ) -> AppResult<(u64, Vec<ItemWithTags>)> {
        let count_sql = format!("SELECT count() FROM item{} GROUP ALL", filter.where_clause());
        let count = take_count(&self.db, &count_sql, filter, &[])
            .await
            .map_err(db_err)?;

        check_page_bounds(page, skip, count)?;
        if count == 0 {
            return Ok((0, Vec::new()));
        }

        let sql = format!(
            "SELECT * FROM item{}{} LIMIT {limit} START {skip} FETCH tags",
            filter.where_clause(),
            sort.order_clause("price"),
        );
        let mut items: Vec<ItemWithTags> = run_query(&self.db, &sql, filter, &[])
            .await
            .map_err(db_err)?;

        // Discount-aware ordering applies to the fetched page only on this
        // path; the aggregation path orders on the computed field in-store
        if sort.needs_post_sort() {
            sort.post_sort(&mut items, |item| {
                pricing::discounted_price(item.price, item.discount.as_ref())
            });
        }

        Ok((count, items))
    }

    async fn run_aggregated(
        &self,
        filter: &CompiledFilter,
        sort: &SortSpec,
        limit: u32,
        page: u32,
        skip: u64,
    ) -> AppResult<(u64, Vec<ItemWithTags>)> {
        let inner = format!(
            "SELECT *, {EFFECTIVE_PRICE_EXPR} AS effective_price FROM item{}",
            filter.where_clause()
        );

        let mut range = Vec::new();
        let mut extra: Vec<(&'static str, f64)> = Vec::new();
        if let Some(min) = filter.min_discounted {
            range.push("effective_price >= $min_discounted");
            extra.push(("min_discounted", min));
        }
        if let Some(max) = filter.max_discounted {
            range.push("effective_price <= $max_discounted");
            extra.push(("max_discounted", max));
        }
        let range_clause = format!(" WHERE {}", range.join(" AND "));

        let count_sql = format!("SELECT count() FROM ({inner}){range_clause} GROUP ALL");
        let count = take_count(&self.db, &count_sql, filter, &extra)
            .await
            .map_err(aggregation_err)?;

        check_page_bounds(page, skip, count)?;
        if count == 0 {
            return Ok((0, Vec::new()));
        }

        let sql = format!(
            "SELECT * FROM ({inner}){range_clause}{} LIMIT {limit} START {skip}",
            sort.order_clause("effective_price"),
        );
        let rows: Vec<Item> = run_query(&self.db, &sql, filter, &extra)
            .await
            .map_err(aggregation_err)?;

        // Attach tags with a second lookup, merged back by id in page order
        let ids: Vec<Thing> = rows.iter().filter_map(|row| row.id.clone()).collect();
        let mut by_id: HashMap<String, ItemWithTags> = HashMap::new();
        if !ids.is_empty() {
            let fetched: Vec<ItemWithTags> = {
                let mut response = self
                    .db
                    .query("SELECT * FROM item WHERE id IN $ids FETCH tags")
                    .bind(("ids", ids))
                    .await
                    .map_err(db_err)?;
                response.take(0).map_err(db_err)?
            };
            for item in fetched {
                if let Some(id) = &item.id {
                    by_id.insert(id.to_string(), item);
                }
            }
        }

        let items = rows
            .into_iter()
            .map(|row| {
                let key = row.id.as_ref().map(|id| id.to_string());
                match key.and_then(|k| by_id.remove(&k)) {
                    Some(item) => item,
                    None => ItemWithTags::from_item(row),
                }
            })
            .collect();

        Ok((count, items))
    }

    // =========================================================================
    // Aggregations
    // =========================================================================

    /// Min/max discounted price across the filtered set; `{0, 0}` when the
    /// set is empty
    async fn price_range(&self, filter: &CompiledFilter) -> AppResult<PriceRange> {
        let inner = format!(
            "SELECT {EFFECTIVE_PRICE_EXPR} AS effective_price FROM item{}",
            filter.where_clause()
        );
        let sql = format!(
            "SELECT math::min(effective_price) AS min, math::max(effective_price) AS max \
             FROM ({inner}) GROUP ALL"
        );
        let rows: Vec<PriceRangeRow> = run_query(&self.db, &sql, filter, &[])
            .await
            .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .next()
            .map(|row| PriceRange {
                min: row.min.unwrap_or(0.0),
                max: row.max.unwrap_or(0.0),
            })
            .unwrap_or_default())
    }

    /// Per-category totals using the category-less filter, seeded from the
    /// closed category list so every key is present
    async fn category_counts(&self, filter: &CompiledFilter) -> AppResult<BTreeMap<String, u64>> {
        let sql = format!(
            "SELECT category, count() AS count FROM item{} GROUP BY category",
            filter.where_without_category()
        );
        let rows: Vec<CategoryCountRow> = run_query(&self.db, &sql, filter, &[])
            .await
            .map_err(db_err)?;

        let mut counts: BTreeMap<String, u64> = Category::ALL
            .iter()
            .map(|category| (category.as_str().to_string(), 0))
            .collect();
        for row in rows {
            if let Some(slot) = counts.get_mut(&row.category) {
                *slot = row.count;
            }
        }
        Ok(counts)
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Run a statement with the filter's binds (plus extras), taking the
/// first result set
async fn run_query<T: DeserializeOwned>(
    db: &Surreal<Db>,
    sql: &str,
    filter: &CompiledFilter,
    extra: &[(&'static str, f64)],
) -> Result<Vec<T>, surrealdb::Error> {
    let mut query = db.query(sql);
    for (name, value) in filter.binds() {
        query = match value {
            BindValue::Str(s) => query.bind((name.clone(), s.clone())),
            BindValue::Num(n) => query.bind((name.clone(), *n)),
            BindValue::Things(ids) => query.bind((name.clone(), ids.clone())),
        };
    }
    for (name, value) in extra {
        query = query.bind((*name, *value));
    }

    let mut response = query.await?;
    response.take(0)
}

async fn take_count(
    db: &Surreal<Db>,
    sql: &str,
    filter: &CompiledFilter,
    extra: &[(&'static str, f64)],
) -> Result<u64, surrealdb::Error> {
    let rows: Vec<CountRow> = run_query(db, sql, filter, extra).await?;
    Ok(rows.first().map(|row| row.count).unwrap_or(0))
}

/// A page beyond the available range is a client-facing not-found
fn check_page_bounds(page: u32, skip: u64, count: u64) -> AppResult<()> {
    if page > 1 && skip >= count {
        return Err(AppError::NotFound(format!("Page {page} not found")));
    }
    Ok(())
}

fn db_err(e: surrealdb::Error) -> AppError {
    AppError::Database(e.to_string())
}

/// Failures inside the discounted-price pipeline surface as a generic
/// validation error; the store error is logged, never returned
fn aggregation_err(e: surrealdb::Error) -> AppError {
    tracing::warn!(error = %e, "discounted price aggregation failed");
    AppError::Validation("error processing discounted price filter".to_string())
}
