//! User Service
//!
//! Registration, credential checks, email-token verification and the
//! wishlist. Session issuance and email delivery belong to the outer
//! layers; this service only manages the stored state they act on.

use crate::catalog::ItemView;
use crate::common::{AppError, AppResult};
use crate::db::models::{User, UserCreate, UserView};
use crate::db::repository::{ItemRepository, ItemWithTags, UserRepository, now_millis};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use validator::Validate;

/// Result of a successful registration
///
/// The verification token is handed to the email collaborator; it is
/// never part of the user response shape.
#[derive(Debug, Clone)]
pub struct Registration {
    pub user: UserView,
    pub verify_token: String,
}

#[derive(Clone)]
pub struct UserService {
    users: UserRepository,
    items: ItemRepository,
}

impl UserService {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            users: UserRepository::new(db.clone()),
            items: ItemRepository::new(db),
        }
    }

    /// Register a new user with a hashed password and a fresh
    /// verification token
    pub async fn register(&self, data: UserCreate) -> AppResult<Registration> {
        data.validate()?;

        let password_hash = User::hash_password(&data.password)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))?;
        let token = uuid::Uuid::new_v4().to_string();

        let now = now_millis();
        let user = User {
            id: None,
            username: data.username,
            email: data.email,
            password_hash,
            is_verified: false,
            verify_token: Some(token.clone()),
            wishlist: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        let created = self.users.create(user).await?;
        tracing::info!(email = %created.email, "user registered");

        Ok(Registration {
            user: UserView::from(&created),
            verify_token: token,
        })
    }

    /// Redeem a verification token
    pub async fn verify_email(&self, token: &str) -> AppResult<UserView> {
        let user = self
            .users
            .verify_by_token(token)
            .await?
            .ok_or_else(|| AppError::NotFound("Verification token not found".to_string()))?;
        Ok(UserView::from(&user))
    }

    /// Check credentials; the outer layer turns this into a session
    pub async fn authenticate(&self, email: &str, password: &str) -> AppResult<UserView> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::Validation("Invalid credentials".to_string()))?;

        let valid = user
            .verify_password(password)
            .map_err(|e| AppError::Internal(format!("Failed to verify password: {e}")))?;
        if !valid {
            return Err(AppError::Validation("Invalid credentials".to_string()));
        }

        Ok(UserView::from(&user))
    }

    /// Add an item to the wishlist (idempotent)
    pub async fn wishlist_add(&self, user_id: &str, item_id: &str) -> AppResult<()> {
        let item = self
            .items
            .find_by_id(item_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Item {item_id} not found")))?;
        let item_thing = item
            .id
            .ok_or_else(|| AppError::Internal("Stored item has no id".to_string()))?;

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))?;
        if user.wishlist.contains(&item_thing) {
            return Ok(());
        }

        self.users.wishlist_add(user_id, item_thing).await?;
        Ok(())
    }

    /// Remove an item from the wishlist
    pub async fn wishlist_remove(&self, user_id: &str, item_id: &str) -> AppResult<()> {
        let item_thing = crate::db::repository::make_thing("item", item_id);
        self.users.wishlist_remove(user_id, item_thing).await?;
        Ok(())
    }

    /// The wishlist in the item response shape
    pub async fn wishlist(&self, user_id: &str) -> AppResult<Vec<ItemView>> {
        let user = self
            .users
            .find_with_wishlist(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))?;

        Ok(user
            .wishlist
            .into_iter()
            .map(|entry| ItemView::from(&ItemWithTags::from(entry)))
            .collect())
    }
}
