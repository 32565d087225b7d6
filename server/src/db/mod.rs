//! Database Module
//!
//! Embedded SurrealDB storage (RocksDB engine), schema definition,
//! models and repositories.

pub mod models;
pub mod repository;

use crate::common::AppError;
use std::path::Path;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, RocksDb};

/// Schema applied on startup; every statement is idempotent.
///
/// Tables stay schemaless (the discount sub-object is optional), with
/// unique indexes backing the global uniqueness rules.
const SCHEMA: &[&str] = &[
    "DEFINE TABLE IF NOT EXISTS item SCHEMALESS",
    "DEFINE INDEX IF NOT EXISTS item_name ON item FIELDS name UNIQUE",
    "DEFINE INDEX IF NOT EXISTS item_slug ON item FIELDS slug UNIQUE",
    "DEFINE TABLE IF NOT EXISTS tag SCHEMALESS",
    "DEFINE INDEX IF NOT EXISTS tag_name ON tag FIELDS name UNIQUE",
    "DEFINE TABLE IF NOT EXISTS user SCHEMALESS",
    "DEFINE INDEX IF NOT EXISTS user_email ON user FIELDS email UNIQUE",
];

/// Database service — owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct Database {
    db: Surreal<Db>,
}

impl Database {
    /// Open (or create) the embedded database at `path` and apply the schema
    pub async fn connect(path: &Path) -> Result<Self, AppError> {
        let db = Surreal::new::<RocksDb>(path)
            .await
            .map_err(|e| AppError::Database(format!("Failed to open database: {e}")))?;

        db.use_ns("pokemart")
            .use_db("catalog")
            .await
            .map_err(|e| AppError::Database(format!("Failed to select namespace: {e}")))?;

        let database = Self { db };
        database.define_schema().await?;

        tracing::info!(path = %path.display(), "Database connection established");
        Ok(database)
    }

    async fn define_schema(&self) -> Result<(), AppError> {
        for stmt in SCHEMA {
            self.db
                .query(*stmt)
                .await
                .map_err(|e| AppError::Database(format!("Failed to apply schema: {e}")))?
                .check()
                .map_err(|e| AppError::Database(format!("Failed to apply schema: {e}")))?;
        }
        tracing::info!("Database schema applied");
        Ok(())
    }

    /// Cloneable handle for repositories and the catalog engine
    pub fn client(&self) -> Surreal<Db> {
        self.db.clone()
    }
}
