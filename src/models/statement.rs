// Select Statement Context
//
// The pagination-relevant view of a parsed SELECT statement, as consumed by
// the pagination context engines.

use serde::{Deserialize, Serialize};

use super::segment::{BinaryOperationExpression, LimitSegment, TopProjectionSegment};

/// One item of a select list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Projection {
    /// Expression text; function calls are recorded by name (`ROW_NUMBER`)
    pub expression: String,
    pub alias: Option<String>,
}

impl Projection {
    pub fn new(expression: impl Into<String>, alias: Option<&str>) -> Self {
        Self {
            expression: expression.into(),
            alias: alias.map(str::to_string),
        }
    }
}

/// Projections of the statement and of its derived-table subqueries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionsContext {
    pub projections: Vec<Projection>,
}

impl ProjectionsContext {
    pub fn new(projections: Vec<Projection>) -> Self {
        Self { projections }
    }

    /// Find the alias given to the projection of `expression`
    pub fn find_alias(&self, expression: &str) -> Option<&str> {
        self.projections
            .iter()
            .find(|p| p.expression.eq_ignore_ascii_case(expression))
            .and_then(|p| p.alias.as_deref())
    }
}

/// Pagination segments of one SELECT statement
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectStatementContext {
    pub limit: Option<LimitSegment>,
    pub top: Option<TopProjectionSegment>,
    /// `WHERE` predicates of the outer statement, flattened on `AND`
    pub where_predicates: Vec<BinaryOperationExpression>,
    pub projections: ProjectionsContext,
}

impl SelectStatementContext {
    pub fn with_limit(limit: LimitSegment) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn with_top(top: TopProjectionSegment, where_predicates: Vec<BinaryOperationExpression>) -> Self {
        Self {
            top: Some(top),
            where_predicates,
            ..Self::default()
        }
    }

    pub fn with_row_number(
        where_predicates: Vec<BinaryOperationExpression>,
        projections: ProjectionsContext,
    ) -> Self {
        Self {
            where_predicates,
            projections,
            ..Self::default()
        }
    }
}
