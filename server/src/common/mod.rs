//! Common utilities and shared infrastructure
//!
//! - Error handling
//! - Result types
//! - Logging setup

pub mod error;
pub mod logger;
pub mod result;

// Re-export commonly used items
pub use error::AppError;
pub use logger::{init_logger, init_logger_with_file};
pub use result::AppResult;
