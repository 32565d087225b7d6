//! User Repository

use super::{BaseRepository, RepoError, RepoResult, make_thing, now_millis, strip_table_prefix};
use crate::db::models::{Category, Discount, User, UserId};
use crate::db::repository::item::ItemWithTags;
use serde::Deserialize;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use surrealdb::sql::Thing;

const USER_TABLE: &str = "user";

/// User row with its wishlist items (and their tags) resolved
#[derive(Debug, Clone, Deserialize)]
pub struct UserWithWishlist {
    pub id: Option<UserId>,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub wishlist: Vec<WishlistItem>,
}

/// Wishlist entry as fetched through `FETCH wishlist, wishlist.tags`
#[derive(Debug, Clone, Deserialize)]
pub struct WishlistItem {
    pub id: Option<Thing>,
    pub name: String,
    pub category: Category,
    pub price: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub photo_url: String,
    #[serde(default)]
    pub tags: Vec<crate::db::models::Tag>,
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

impl From<WishlistItem> for ItemWithTags {
    fn from(item: WishlistItem) -> Self {
        ItemWithTags {
            id: item.id,
            name: item.name,
            category: item.category,
            price: item.price,
            description: item.description,
            photo_url: item.photo_url,
            tags: item.tags,
            discount: item.discount,
            is_new_item: item.is_new_item,
            slug: item.slug,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

// =============================================================================
// User Repository
// =============================================================================

#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find user by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<User>> {
        let pure_id = strip_table_prefix(USER_TABLE, id);
        let user: Option<User> = self.base.db().select((USER_TABLE, pure_id)).await?;
        Ok(user)
    }

    /// Find user by email
    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let email_owned = email.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM user WHERE email = $email LIMIT 1")
            .bind(("email", email_owned))
            .await?;
        let users: Vec<User> = result.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Create a new user
    pub async fn create(&self, user: User) -> RepoResult<User> {
        // Check duplicate email
        if self.find_by_email(&user.email).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "User '{}' already exists",
                user.email
            )));
        }

        let created: Option<User> = self.base.db().create(USER_TABLE).content(user).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create user".to_string()))
    }

    /// Redeem a verification token; clears it and flags the user verified
    pub async fn verify_by_token(&self, token: &str) -> RepoResult<Option<User>> {
        let token_owned = token.to_string();
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE user SET is_verified = true, verify_token = NONE, \
                 updated_at = $updated_at WHERE verify_token = $token RETURN AFTER",
            )
            .bind(("token", token_owned))
            .bind(("updated_at", now_millis()))
            .await?;
        let users: Vec<User> = result.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Find user with wishlist items (and their tags) resolved
    pub async fn find_with_wishlist(&self, id: &str) -> RepoResult<Option<UserWithWishlist>> {
        let user_thing = make_thing(USER_TABLE, id);
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM user WHERE id = $id FETCH wishlist, wishlist.tags")
            .bind(("id", user_thing))
            .await?;
        let users: Vec<UserWithWishlist> = result.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Append an item to the wishlist
    pub async fn wishlist_add(&self, user_id: &str, item: Thing) -> RepoResult<User> {
        let user_thing = make_thing(USER_TABLE, user_id);
        let mut result = self
            .base
            .db()
            .query("UPDATE $thing SET wishlist += $item, updated_at = $updated_at RETURN AFTER")
            .bind(("thing", user_thing))
            .bind(("item", item))
            .bind(("updated_at", now_millis()))
            .await?;
        let users: Vec<User> = result.take(0)?;
        users
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("User {} not found", user_id)))
    }

    /// Remove an item from the wishlist
    pub async fn wishlist_remove(&self, user_id: &str, item: Thing) -> RepoResult<User> {
        let user_thing = make_thing(USER_TABLE, user_id);
        let mut result = self
            .base
            .db()
            .query("UPDATE $thing SET wishlist -= $item, updated_at = $updated_at RETURN AFTER")
            .bind(("thing", user_thing))
            .bind(("item", item))
            .bind(("updated_at", now_millis()))
            .await?;
        let users: Vec<User> = result.take(0)?;
        users
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("User {} not found", user_id)))
    }
}
