// Result Merger
//
// Composes the merged cursor handed to the statement execution layer: the
// base cursor over all shard results, wrapped in the pagination decorator
// matching the statement. The statement is assumed valid and already bound.

use serde_json::Value;
use std::sync::Arc;

use super::decorator::PaginationDecorator;
use super::iterator::IteratorMergedResult;
use super::result::{MergedResult, QueryResult};
use crate::error::Result;
use crate::models::SelectStatementContext;
use crate::services::dialect::PaginationDialect;
use crate::services::pagination::{PaginationContextEngine, PaginationKind, ResolvedPagination};

/// Merged cursor together with the pagination it applies
pub struct MergedStatement {
    pub result: Box<dyn MergedResult>,
    pub pagination: ResolvedPagination,
    /// Decorator wrapping the base cursor, if any
    pub decorator: Option<PaginationKind>,
}

pub struct ResultMerger {
    dialect: Arc<dyn PaginationDialect>,
    decorate_single_shard: bool,
}

impl ResultMerger {
    pub fn new(dialect: Arc<dyn PaginationDialect>) -> Self {
        Self {
            dialect,
            decorate_single_shard: false,
        }
    }

    /// Paginate here even when the statement was routed to a single shard
    ///
    /// A single shard already ran the pagination of the statement, so by default its
    /// result is passed through untouched.
    pub fn with_single_shard_decoration(mut self, enabled: bool) -> Self {
        self.decorate_single_shard = enabled;
        self
    }

    pub fn merge(
        &self,
        query_results: Vec<Box<dyn QueryResult>>,
        statement: &SelectStatementContext,
        parameters: &[Value],
    ) -> Result<Box<dyn MergedResult>> {
        Ok(self.merge_statement(query_results, statement, parameters)?.result)
    }

    pub fn merge_statement(
        &self,
        query_results: Vec<Box<dyn QueryResult>>,
        statement: &SelectStatementContext,
        parameters: &[Value],
    ) -> Result<MergedStatement> {
        let shard_count = query_results.len();
        let base: Box<dyn MergedResult> = Box::new(IteratorMergedResult::new(query_results));

        let pagination = PaginationContextEngine::new(self.dialect.clone())
            .create_pagination(statement, parameters)?;

        let decorator = match pagination.kind {
            Some(kind) if pagination.has_pagination() => {
                if shard_count == 1 && !self.decorate_single_shard {
                    None
                } else {
                    Some(kind)
                }
            }
            _ => None,
        };

        tracing::debug!(
            "Merging {} shard results for {}: offset={} row_count={:?} decorator={:?}",
            shard_count,
            self.dialect.database_type().as_str(),
            pagination.context.actual_offset(),
            pagination.context.actual_row_count(),
            decorator
        );

        let result: Box<dyn MergedResult> = match decorator {
            Some(kind) => Box::new(PaginationDecorator::new(kind, base, pagination.context.clone())),
            None => base,
        };

        Ok(MergedStatement {
            result,
            pagination,
            decorator,
        })
    }
}
