// LIMIT Pagination Context Engine
//
// MySQL / PostgreSQL / SQL92 style `LIMIT offset, count`, including
// `LIMIT count OFFSET offset` and `OFFSET .. FETCH NEXT ..`.

use serde_json::Value;

use super::context::PaginationContext;
use crate::error::Result;
use crate::models::LimitSegment;

pub struct LimitPaginationContextEngine;

impl LimitPaginationContextEngine {
    pub fn create_pagination_context(
        &self,
        limit: &LimitSegment,
        parameters: &[Value],
    ) -> Result<PaginationContext> {
        PaginationContext::new(limit.offset, limit.row_count, parameters)
    }
}
