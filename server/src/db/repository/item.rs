//! Item Repository

use super::{BaseRepository, RepoError, RepoResult, make_thing, strip_table_prefix};
use crate::db::models::{Category, Discount, Item, ItemId, Tag};
use serde::Deserialize;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use surrealdb::sql::Thing;

const ITEM_TABLE: &str = "item";

/// Item row with its tag references resolved (for FETCH queries)
#[derive(Debug, Clone, Deserialize)]
pub struct ItemWithTags {
    pub id: Option<ItemId>,
    pub name: String,
    pub category: Category,
    pub price: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub photo_url: String,
    /// Tags are fetched as full Tag objects
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub discount: Option<Discount>,
    #[serde(default)]
    pub is_new_item: bool,
    pub slug: String,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

impl ItemWithTags {
    /// Wrap a plain row whose tag links could not be resolved
    pub fn from_item(item: Item) -> Self {
        Self {
            id: item.id,
            name: item.name,
            category: item.category,
            price: item.price,
            description: item.description,
            photo_url: item.photo_url,
            tags: Vec::new(),
            discount: item.discount,
            is_new_item: item.is_new_item,
            slug: item.slug,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

/// Resolved partial update; only Some fields are written.
///
/// Tag names and the category label have already been resolved/validated
/// by the service layer, and `slug` tracks `name`.
#[derive(Debug, Clone, Default)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub category: Option<Category>,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub photo_url: Option<String>,
    /// Full replacement of the tag list
    pub tags: Option<Vec<Thing>>,
    pub discount: Option<Discount>,
    pub is_new_item: Option<bool>,
    pub updated_at: i64,
}

// =============================================================================
// Item Repository
// =============================================================================

#[derive(Clone)]
pub struct ItemRepository {
    base: BaseRepository,
}

impl ItemRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find item by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Item>> {
        let pure_id = strip_table_prefix(ITEM_TABLE, id);
        let item: Option<Item> = self.base.db().select((ITEM_TABLE, pure_id)).await?;
        Ok(item)
    }

    /// Find item by id with tags fetched
    pub async fn find_by_id_with_tags(&self, id: &str) -> RepoResult<Option<ItemWithTags>> {
        let item_thing = make_thing(ITEM_TABLE, id);
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM item WHERE id = $id FETCH tags")
            .bind(("id", item_thing))
            .await?;
        let items: Vec<ItemWithTags> = result.take(0)?;
        Ok(items.into_iter().next())
    }

    /// Find item by exact name
    pub async fn find_by_name(&self, name: &str) -> RepoResult<Option<Item>> {
        let name_owned = name.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM item WHERE name = $name LIMIT 1")
            .bind(("name", name_owned))
            .await?;
        let items: Vec<Item> = result.take(0)?;
        Ok(items.into_iter().next())
    }

    /// Create a new item
    pub async fn create(&self, item: Item) -> RepoResult<Item> {
        // Check duplicate name
        if self.find_by_name(&item.name).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Item '{}' already exists",
                item.name
            )));
        }

        let created: Option<Item> = self.base.db().create(ITEM_TABLE).content(item).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create item".to_string()))
    }

    /// Apply a partial update
    pub async fn update(&self, id: &str, patch: ItemPatch) -> RepoResult<Item> {
        let pure_id = strip_table_prefix(ITEM_TABLE, id);
        let existing = self
            .find_by_id(pure_id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Item {} not found", id)))?;

        // Check duplicate name if changing
        if let Some(ref new_name) = patch.name
            && new_name != &existing.name
            && self.find_by_name(new_name).await?.is_some()
        {
            return Err(RepoError::Duplicate(format!(
                "Item '{}' already exists",
                new_name
            )));
        }

        let thing = make_thing(ITEM_TABLE, pure_id);

        // Build dynamic SET clauses with proper type bindings
        let mut set_parts: Vec<&str> = vec!["updated_at = $updated_at"];

        if patch.name.is_some() {
            set_parts.push("name = $name");
        }
        if patch.slug.is_some() {
            set_parts.push("slug = $slug");
        }
        if patch.category.is_some() {
            set_parts.push("category = $category");
        }
        if patch.price.is_some() {
            set_parts.push("price = $price");
        }
        if patch.description.is_some() {
            set_parts.push("description = $description");
        }
        if patch.photo_url.is_some() {
            set_parts.push("photo_url = $photo_url");
        }
        if patch.tags.is_some() {
            set_parts.push("tags = $tags");
        }
        if patch.discount.is_some() {
            set_parts.push("discount = $discount");
        }
        if patch.is_new_item.is_some() {
            set_parts.push("is_new_item = $is_new_item");
        }

        let query_str = format!("UPDATE $thing SET {} RETURN AFTER", set_parts.join(", "));
        tracing::debug!(query = %query_str, id = %id, "ItemRepository::update");

        let mut query = self
            .base
            .db()
            .query(&query_str)
            .bind(("thing", thing))
            .bind(("updated_at", patch.updated_at));

        if let Some(v) = patch.name {
            query = query.bind(("name", v));
        }
        if let Some(v) = patch.slug {
            query = query.bind(("slug", v));
        }
        if let Some(v) = patch.category {
            query = query.bind(("category", v));
        }
        if let Some(v) = patch.price {
            query = query.bind(("price", v));
        }
        if let Some(v) = patch.description {
            query = query.bind(("description", v));
        }
        if let Some(v) = patch.photo_url {
            query = query.bind(("photo_url", v));
        }
        if let Some(v) = patch.tags {
            query = query.bind(("tags", v)); // Vec<Thing>
        }
        if let Some(v) = patch.discount {
            // embedded object, bound as a JSON value
            query = query.bind(("discount", serde_json::to_value(v).unwrap_or_default()));
        }
        if let Some(v) = patch.is_new_item {
            query = query.bind(("is_new_item", v));
        }

        let mut result = query.await?;
        let items: Vec<Item> = result.take(0)?;

        items
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Item {} not found", id)))
    }

    /// Hard delete an item (also drops it from user wishlists)
    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        let pure_id = strip_table_prefix(ITEM_TABLE, id);
        let thing = make_thing(ITEM_TABLE, pure_id);

        // Remove dangling wishlist references first
        self.base
            .db()
            .query("UPDATE user SET wishlist -= $item WHERE wishlist CONTAINS $item")
            .bind(("item", thing))
            .await?;

        let result: Option<Item> = self.base.db().delete((ITEM_TABLE, pure_id)).await?;
        if result.is_none() {
            return Err(RepoError::NotFound(format!("Item {} not found", id)));
        }
        Ok(())
    }
}
