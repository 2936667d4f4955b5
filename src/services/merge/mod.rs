// Result Merging
//
// Base cursors over shard results, pagination decorators and the merger
// composing them.

pub mod decorator;
pub mod iterator;
pub mod merger;
pub mod result;

pub use decorator::{
    LimitDecoratorMergedResult, PaginationDecorator, RowNumberDecoratorMergedResult,
    TopAndRowNumberDecoratorMergedResult,
};
pub use iterator::IteratorMergedResult;
pub use merger::{MergedStatement, ResultMerger};
pub use result::{MemoryQueryResult, MergedResult, QueryResult};
