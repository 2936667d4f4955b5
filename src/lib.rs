pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod validation;

pub use error::{MergeError, Result};
pub use services::dialect::{create_dialect, DatabaseType, PaginationDialect};
pub use services::merge::{MergedResult, QueryResult, ResultMerger};
pub use services::pagination::{PaginationContext, PaginationContextEngine, PaginationKind};
pub use services::MergeService;
pub use validation::StatementExtractor;
