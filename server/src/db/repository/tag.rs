//! Tag Repository

use super::{BaseRepository, RepoError, RepoResult, make_thing, now_millis, strip_table_prefix};
use crate::db::models::{Tag, TagCreate, TagUpdate};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TAG_TABLE: &str = "tag";

#[derive(Clone)]
pub struct TagRepository {
    base: BaseRepository,
}

impl TagRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all tags ordered by name
    pub async fn find_all(&self) -> RepoResult<Vec<Tag>> {
        let tags: Vec<Tag> = self
            .base
            .db()
            .query("SELECT * FROM tag ORDER BY name")
            .await?
            .take(0)?;
        Ok(tags)
    }

    /// Find tag by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Tag>> {
        let pure_id = strip_table_prefix(TAG_TABLE, id);
        let tag: Option<Tag> = self.base.db().select((TAG_TABLE, pure_id)).await?;
        Ok(tag)
    }

    /// Find tag by exact name
    pub async fn find_by_name(&self, name: &str) -> RepoResult<Option<Tag>> {
        let name_owned = name.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM tag WHERE name = $name LIMIT 1")
            .bind(("name", name_owned))
            .await?;
        let tags: Vec<Tag> = result.take(0)?;
        Ok(tags.into_iter().next())
    }

    /// Find every tag whose name appears in `names` (exact matches)
    pub async fn find_by_names(&self, names: &[String]) -> RepoResult<Vec<Tag>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        let names_owned = names.to_vec();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM tag WHERE name IN $names")
            .bind(("names", names_owned))
            .await?;
        let tags: Vec<Tag> = result.take(0)?;
        Ok(tags)
    }

    /// Create a new tag
    pub async fn create(&self, data: TagCreate) -> RepoResult<Tag> {
        // Check duplicate name
        if self.find_by_name(&data.name).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Tag '{}' already exists",
                data.name
            )));
        }

        let now = now_millis();
        let tag = Tag {
            id: None,
            name: data.name,
            created_at: now,
            updated_at: now,
        };

        let created: Option<Tag> = self.base.db().create(TAG_TABLE).content(tag).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create tag".to_string()))
    }

    /// Rename a tag
    pub async fn update(&self, id: &str, data: TagUpdate) -> RepoResult<Tag> {
        let pure_id = strip_table_prefix(TAG_TABLE, id);
        let existing = self
            .find_by_id(pure_id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Tag {} not found", id)))?;

        // Check duplicate name if changing
        if let Some(ref new_name) = data.name
            && new_name != &existing.name
            && self.find_by_name(new_name).await?.is_some()
        {
            return Err(RepoError::Duplicate(format!(
                "Tag '{}' already exists",
                new_name
            )));
        }

        let Some(new_name) = data.name else {
            return Ok(existing);
        };

        let thing = make_thing(TAG_TABLE, pure_id);
        let mut result = self
            .base
            .db()
            .query("UPDATE $thing SET name = $name, updated_at = $updated_at RETURN AFTER")
            .bind(("thing", thing))
            .bind(("name", new_name))
            .bind(("updated_at", now_millis()))
            .await?;
        let tags: Vec<Tag> = result.take(0)?;

        tags.into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Tag {} not found", id)))
    }

    /// Hard delete a tag (also drops its references from items)
    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        let pure_id = strip_table_prefix(TAG_TABLE, id);
        let thing = make_thing(TAG_TABLE, pure_id);

        // Remove dangling item references first
        self.base
            .db()
            .query("UPDATE item SET tags -= $tag WHERE tags CONTAINS $tag")
            .bind(("tag", thing))
            .await?;

        let result: Option<Tag> = self.base.db().delete((TAG_TABLE, pure_id)).await?;
        if result.is_none() {
            return Err(RepoError::NotFound(format!("Tag {} not found", id)));
        }
        Ok(())
    }
}
