// Pagination Context Engines
//
// Turn dialect-specific pagination syntax (LIMIT, ROWNUM predicates, TOP)
// into one normalized PaginationContext.

pub mod context;
pub mod engine;
pub mod limit;
pub mod row_number;
pub mod top;

pub use context::PaginationContext;
pub use engine::{PaginationContextEngine, PaginationKind, ResolvedPagination};
pub use limit::LimitPaginationContextEngine;
pub use row_number::RowNumberPaginationContextEngine;
pub use top::TopPaginationContextEngine;
