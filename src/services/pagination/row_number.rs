// Row-Number Pagination Context Engine
//
// Oracle style pagination: a subquery projects `ROWNUM` under an alias and
// the outer WHERE bounds that alias.
//
//   SELECT * FROM (SELECT ROWNUM AS rownum_, t.* FROM t_order t)
//   WHERE rownum_ > 10 AND rownum_ <= 20

use serde_json::Value;

use super::context::PaginationContext;
use crate::error::Result;
use crate::models::{
    BinaryOperationExpression, ComparisonOperator, ExpressionSegment, ProjectionsContext,
    RowNumberValueSegment,
};

pub struct RowNumberPaginationContextEngine {
    row_number_column: String,
}

impl RowNumberPaginationContextEngine {
    pub fn new(row_number_column: impl Into<String>) -> Self {
        Self {
            row_number_column: row_number_column.into(),
        }
    }

    pub fn create_pagination_context(
        &self,
        where_predicates: &[BinaryOperationExpression],
        projections: &ProjectionsContext,
        parameters: &[Value],
    ) -> Result<PaginationContext> {
        let Some(alias) = projections.find_alias(&self.row_number_column) else {
            return Ok(PaginationContext::empty());
        };

        let mut offset = None;
        let mut row_count = None;

        for predicate in where_predicates {
            let Some((operator, operand)) = predicate
                .oriented_to(alias)
                .or_else(|| predicate.oriented_to(&self.row_number_column))
            else {
                continue;
            };

            if offset.is_none() {
                offset = offset_bound(operator, operand);
            }
            if row_count.is_none() {
                row_count = row_count_bound(operator, operand);
            }
        }

        if offset.is_none() && row_count.is_none() {
            tracing::debug!("No usable {} predicate on alias {}", self.row_number_column, alias);
            return Ok(PaginationContext::empty());
        }

        PaginationContext::with_row_number_bounds(offset, row_count, parameters)
    }
}

/// Offset bound of a `column > value` or `column >= value` comparison
pub(super) fn offset_bound(
    operator: ComparisonOperator,
    operand: &ExpressionSegment,
) -> Option<RowNumberValueSegment> {
    let bound_opened = match operator {
        ComparisonOperator::Gt => false,
        ComparisonOperator::GtEq => true,
        _ => return None,
    };
    bound_value(operand, bound_opened)
}

/// Row count bound of a `column < value` or `column <= value` comparison
fn row_count_bound(
    operator: ComparisonOperator,
    operand: &ExpressionSegment,
) -> Option<RowNumberValueSegment> {
    let bound_opened = match operator {
        ComparisonOperator::Lt => false,
        ComparisonOperator::LtEq => true,
        _ => return None,
    };
    bound_value(operand, bound_opened)
}

fn bound_value(operand: &ExpressionSegment, bound_opened: bool) -> Option<RowNumberValueSegment> {
    match operand.as_pagination_value() {
        Some(value) => Some(RowNumberValueSegment::new(value, bound_opened)),
        None => {
            tracing::warn!("Ignoring row-number bound that is not a literal or parameter: {:?}", operand);
            None
        }
    }
}
