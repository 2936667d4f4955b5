// TOP Pagination Context Engine
//
// SQL Server style pagination: `TOP n` caps the last row number and a
// `ROW_NUMBER()` alias compared in the outer WHERE gives the offset.
//
//   SELECT * FROM (SELECT TOP (20) ROW_NUMBER() OVER (ORDER BY id) AS row_id, *
//                  FROM t_order) AS t
//   WHERE t.row_id > 10

use serde_json::Value;

use super::context::PaginationContext;
use super::row_number::offset_bound;
use crate::error::Result;
use crate::models::{BinaryOperationExpression, TopProjectionSegment};

pub struct TopPaginationContextEngine;

impl TopPaginationContextEngine {
    pub fn create_pagination_context(
        &self,
        top: &TopProjectionSegment,
        where_predicates: &[BinaryOperationExpression],
        parameters: &[Value],
    ) -> Result<PaginationContext> {
        let offset = top.alias.as_deref().and_then(|alias| {
            where_predicates.iter().find_map(|predicate| {
                let (operator, operand) = predicate.oriented_to(alias)?;
                offset_bound(operator, operand)
            })
        });

        PaginationContext::with_top(offset, top.top, parameters)
    }
}
