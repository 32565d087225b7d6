//! Filter compilation
//!
//! Compiles raw query parameters into conjunctive SurrealQL WHERE
//! fragments plus the owned bind values they reference. Two variants are
//! produced: the full filter, and the same filter without its category
//! constraint — the latter drives per-category counts, so that selecting
//! one category does not suppress the sibling counts.
//!
//! Tag-name matching happens against the tag list fetched once per
//! request; the compiler itself is pure and never touches the store.

use super::ItemQuery;
use crate::db::models::Tag;
use surrealdb::sql::Thing;

/// Owned bind value referenced by a compiled clause
#[derive(Debug, Clone)]
pub enum BindValue {
    Str(String),
    Num(f64),
    Things(Vec<Thing>),
}

/// Output of the filter compiler
#[derive(Debug, Clone, Default)]
pub struct CompiledFilter {
    /// Conjunctive fragments for every dimension except category
    clauses: Vec<String>,
    /// The category fragment, kept separate for the category-count query
    category_clause: Option<String>,
    binds: Vec<(String, BindValue)>,
    /// Inclusive bounds on the computed discounted price; presence of
    /// either selects the aggregation strategy
    pub min_discounted: Option<f64>,
    pub max_discounted: Option<f64>,
}

impl CompiledFilter {
    /// Compile the raw parameters against the current tag list
    pub fn compile(query: &ItemQuery, tags: &[Tag]) -> Self {
        let mut filter = CompiledFilter {
            min_discounted: query.min_discounted_price,
            max_discounted: query.max_discounted_price,
            ..Default::default()
        };

        // search: whitespace tokens AND'ed; each token must match at least
        // one of name/category/description/tag-name
        if let Some(search) = &query.search {
            for (i, token) in search.split_whitespace().enumerate() {
                let token = token.to_lowercase();
                let param = format!("search_{i}");
                let mut parts = vec![
                    format!("string::contains(string::lowercase(name), ${param})"),
                    format!("string::contains(string::lowercase(category), ${param})"),
                    format!("string::contains(string::lowercase(description), ${param})"),
                ];

                let matched = matching_tag_ids(tags, std::slice::from_ref(&token));
                if !matched.is_empty() {
                    let tag_param = format!("search_tags_{i}");
                    parts.push(format!("tags CONTAINSANY ${tag_param}"));
                    filter.binds.push((tag_param, BindValue::Things(matched)));
                }

                filter.clauses.push(format!("({})", parts.join(" OR ")));
                filter.binds.push((param, BindValue::Str(token)));
            }
        }

        // cat: comma tokens OR'ed as case-insensitive category substrings
        if let Some(cat) = &query.cat {
            let mut parts = Vec::new();
            for (i, token) in comma_tokens(cat).enumerate() {
                let param = format!("cat_{i}");
                parts.push(format!(
                    "string::contains(string::lowercase(category), ${param})"
                ));
                filter.binds.push((param, BindValue::Str(token)));
            }
            if !parts.is_empty() {
                filter.category_clause = Some(format!("({})", parts.join(" OR ")));
            }
        }

        // tag: comma tokens OR'ed as tag-name substrings, resolved to the
        // matching tag ids up front; no match compiles to an empty id list,
        // which matches nothing
        if let Some(tag) = &query.tag {
            let tokens: Vec<String> = comma_tokens(tag).collect();
            if !tokens.is_empty() {
                let matched = matching_tag_ids(tags, &tokens);
                filter.clauses.push("tags CONTAINSANY $tag_ids".to_string());
                filter
                    .binds
                    .push(("tag_ids".to_string(), BindValue::Things(matched)));
            }
        }

        // price: inclusive bounds on the stored base price
        if let Some(min) = query.min_price {
            filter.clauses.push("price >= $min_price".to_string());
            filter.binds.push(("min_price".to_string(), BindValue::Num(min)));
        }
        if let Some(max) = query.max_price {
            filter.clauses.push("price <= $max_price".to_string());
            filter.binds.push(("max_price".to_string(), BindValue::Num(max)));
        }

        filter
    }

    /// Whether a discounted-price bound was supplied
    pub fn has_discount_bounds(&self) -> bool {
        self.min_discounted.is_some() || self.max_discounted.is_some()
    }

    /// The full conjunctive filter, as a ` WHERE ...` suffix (or empty)
    pub fn where_clause(&self) -> String {
        let mut all: Vec<&str> = self.clauses.iter().map(String::as_str).collect();
        if let Some(cat) = &self.category_clause {
            all.push(cat.as_str());
        }
        compose(&all)
    }

    /// The same filter with the category constraint removed
    pub fn where_without_category(&self) -> String {
        let all: Vec<&str> = self.clauses.iter().map(String::as_str).collect();
        compose(&all)
    }

    /// The bind values referenced by the compiled clauses
    pub fn binds(&self) -> &[(String, BindValue)] {
        &self.binds
    }
}

fn compose(clauses: &[&str]) -> String {
    if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    }
}

fn comma_tokens(raw: &str) -> impl Iterator<Item = String> + '_ {
    raw.split(',')
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
}

/// Ids of the tags whose name contains any of the (lowercased) tokens
fn matching_tag_ids(tags: &[Tag], tokens: &[String]) -> Vec<Thing> {
    tags.iter()
        .filter(|tag| {
            let name = tag.name.to_lowercase();
            tokens.iter().any(|token| name.contains(token.as_str()))
        })
        .filter_map(|tag| tag.id.clone())
        .collect()
}
