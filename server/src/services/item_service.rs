//! Item Service
//!
//! The admin write path for items plus the read-side entry points. Tag
//! names are resolved to references here (unknown names are rejected,
//! tags are never auto-created), category labels are validated against
//! the closed enum, and the slug tracks the name.

use crate::catalog::{Catalog, ItemPage, ItemQuery, ItemView};
use crate::common::{AppError, AppResult};
use crate::db::models::{Category, Discount, Item, ItemCreate, ItemUpdate};
use crate::db::repository::{ItemPatch, ItemRepository, TagRepository, now_millis};
use crate::utils::slugify;
use std::collections::HashMap;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use surrealdb::sql::Thing;
use validator::Validate;

#[derive(Clone)]
pub struct ItemService {
    items: ItemRepository,
    tags: TagRepository,
    catalog: Catalog,
}

impl ItemService {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            items: ItemRepository::new(db.clone()),
            tags: TagRepository::new(db.clone()),
            catalog: Catalog::new(db),
        }
    }

    /// Paginated, filtered, sorted item listing
    pub async fn list<F>(&self, query: &ItemQuery, page_link: F) -> AppResult<ItemPage>
    where
        F: Fn(u32) -> String,
    {
        self.catalog.get_items(query, page_link).await
    }

    /// Single item in the response shape
    pub async fn get(&self, id: &str) -> AppResult<ItemView> {
        let item = self
            .items
            .find_by_id_with_tags(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Item {id} not found")))?;
        Ok(ItemView::from(&item))
    }

    /// Create an item
    pub async fn create(&self, data: ItemCreate) -> AppResult<ItemView> {
        data.validate()?;

        let category = Category::from_label(&data.category)
            .ok_or_else(|| AppError::Validation(format!("Unknown category '{}'", data.category)))?;
        let tags = self.resolve_tags(&data.tags).await?;

        let now = now_millis();
        let item = Item {
            id: None,
            slug: slugify(&data.name),
            name: data.name,
            category,
            price: data.price,
            description: data.description,
            photo_url: data.photo_url,
            tags,
            discount: data.discount.map(Discount::normalized),
            is_new_item: data.is_new_item,
            created_at: now,
            updated_at: now,
        };

        let created = self.items.create(item).await?;
        let id = created
            .id
            .as_ref()
            .map(|t| t.to_string())
            .ok_or_else(|| AppError::Internal("Created item has no id".to_string()))?;

        tracing::info!(item = %id, "item created");
        self.get(&id).await
    }

    /// Partial update; a supplied tag list fully replaces the old one and
    /// a name change regenerates the slug
    pub async fn update(&self, id: &str, data: ItemUpdate) -> AppResult<ItemView> {
        data.validate()?;

        let category = match &data.category {
            Some(label) => Some(Category::from_label(label).ok_or_else(|| {
                AppError::Validation(format!("Unknown category '{label}'"))
            })?),
            None => None,
        };
        let tags = match &data.tags {
            Some(names) => Some(self.resolve_tags(names).await?),
            None => None,
        };

        let patch = ItemPatch {
            slug: data.name.as_deref().map(slugify),
            name: data.name,
            category,
            price: data.price,
            description: data.description,
            photo_url: data.photo_url,
            tags,
            discount: data.discount.map(Discount::normalized),
            is_new_item: data.is_new_item,
            updated_at: now_millis(),
        };

        self.items.update(id, patch).await?;
        self.get(id).await
    }

    /// Hard delete by id
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.items.delete(id).await?;
        tracing::info!(item = %id, "item deleted");
        Ok(())
    }

    /// Resolve tag names to references, preserving the supplied order
    async fn resolve_tags(&self, names: &[String]) -> AppResult<Vec<Thing>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let found = self.tags.find_by_names(names).await?;
        let known: HashMap<&str, Thing> = found
            .iter()
            .filter_map(|tag| tag.id.clone().map(|id| (tag.name.as_str(), id)))
            .collect();

        let missing: Vec<&str> = names
            .iter()
            .map(String::as_str)
            .filter(|name| !known.contains_key(*name))
            .collect();
        if !missing.is_empty() {
            return Err(AppError::Validation(format!(
                "Unknown tags: {}",
                missing.join(", ")
            )));
        }

        Ok(names
            .iter()
            .filter_map(|name| known.get(name.as_str()).cloned())
            .collect())
    }
}
