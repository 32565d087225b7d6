//! Unified Result Types
//!
//! Provides type aliases for commonly used Result types across the application

use crate::common::AppError;

/// Application-level Result type
///
/// Used in services and the catalog query engine
pub type AppResult<T> = Result<T, AppError>;
