// Pagination Context Engine
//
// Picks the pagination strategy of a statement from its shape and the
// capabilities of its dialect, then delegates to the matching engine.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use super::context::PaginationContext;
use super::limit::LimitPaginationContextEngine;
use super::row_number::RowNumberPaginationContextEngine;
use super::top::TopPaginationContextEngine;
use crate::error::Result;
use crate::models::{BinaryOperationExpression, SelectStatementContext};
use crate::services::dialect::{PaginationDialect, PaginationFeature};

/// Strategy that produced a pagination context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaginationKind {
    Limit,
    RowNumber,
    TopAndRowNumber,
}

/// Pagination of one statement execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPagination {
    /// `None` when the statement carries no recognized pagination syntax
    pub kind: Option<PaginationKind>,
    pub context: PaginationContext,
}

impl ResolvedPagination {
    fn none() -> Self {
        Self {
            kind: None,
            context: PaginationContext::empty(),
        }
    }

    pub fn has_pagination(&self) -> bool {
        self.kind.is_some() && self.context.has_pagination()
    }
}

pub struct PaginationContextEngine {
    dialect: Arc<dyn PaginationDialect>,
}

impl PaginationContextEngine {
    pub fn new(dialect: Arc<dyn PaginationDialect>) -> Self {
        Self { dialect }
    }

    pub fn create_pagination(
        &self,
        statement: &SelectStatementContext,
        parameters: &[Value],
    ) -> Result<ResolvedPagination> {
        let supports = |feature| self.dialect.supports_feature(feature);

        if let Some(limit) = statement.limit.as_ref().filter(|_| supports(PaginationFeature::LimitClause)) {
            let context = LimitPaginationContextEngine.create_pagination_context(limit, parameters)?;
            return Ok(ResolvedPagination {
                kind: Some(PaginationKind::Limit),
                context,
            });
        }

        if let Some(top) = statement.top.as_ref().filter(|_| supports(PaginationFeature::TopProjection)) {
            let predicates: &[BinaryOperationExpression] = if supports(PaginationFeature::RowNumberPredicate) {
                &statement.where_predicates
            } else {
                &[]
            };
            let context =
                TopPaginationContextEngine.create_pagination_context(top, predicates, parameters)?;
            return Ok(ResolvedPagination {
                kind: Some(PaginationKind::TopAndRowNumber),
                context,
            });
        }

        if statement.where_predicates.is_empty() || !supports(PaginationFeature::RowNumberPredicate) {
            return Ok(ResolvedPagination::none());
        }

        let Some(column) = self.dialect.row_number_column() else {
            return Ok(ResolvedPagination::none());
        };

        let context = RowNumberPaginationContextEngine::new(column).create_pagination_context(
            &statement.where_predicates,
            &statement.projections,
            parameters,
        )?;

        Ok(ResolvedPagination {
            kind: Some(PaginationKind::RowNumber),
            context,
        })
    }
}
