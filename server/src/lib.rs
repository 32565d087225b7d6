//! PokéMart Server - catalog backend core
//!
//! # Module structure
//!
//! ```text
//! server/src/
//! ├── core/          # Configuration
//! ├── common/        # Errors, logging
//! ├── db/            # Embedded SurrealDB storage (models + repositories)
//! ├── pricing/       # Discounted-price formula (single source of truth)
//! ├── catalog/       # Item query engine (filter/sort/paginate)
//! ├── services/      # Item and user lifecycle orchestration
//! └── utils/         # Slug generation and helpers
//! ```

pub mod catalog;
pub mod common;
pub mod core;
pub mod db;
pub mod pricing;
pub mod services;
pub mod utils;

// Re-export public types
pub use catalog::{Catalog, ItemPage, ItemQuery, ItemView, PageInfo, PriceRange, SortKey, SortOrder};
pub use common::{AppError, AppResult};
pub use core::Config;
pub use db::Database;
pub use services::{ItemService, UserService};

// Re-export logger functions
pub use common::logger::{init_logger, init_logger_with_file};
