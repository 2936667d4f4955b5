use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::services::dialect::DatabaseType;
use crate::services::pagination::{PaginationKind, ResolvedPagination};

/// Rows returned by one shard for the rewritten statement
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShardRows {
    #[serde(default)]
    pub rows: Vec<Vec<Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeRequest {
    /// Falls back to `merge.default_database_type` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_type: Option<DatabaseType>,
    pub sql: String,
    #[serde(default)]
    pub parameters: Vec<Value>,
    #[serde(default)]
    pub shards: Vec<ShardRows>,
}

/// Pagination applied to a merge, as reported to the caller
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaginationSummary {
    pub kind: Option<PaginationKind>,
    pub offset: i64,
    pub row_count: Option<i64>,
    /// Window each shard has to return so the merged stream can be paginated
    pub revised_offset: i64,
    pub revised_row_count: Option<i64>,
}

impl From<&ResolvedPagination> for PaginationSummary {
    fn from(pagination: &ResolvedPagination) -> Self {
        Self {
            kind: pagination.kind,
            offset: pagination.context.actual_offset(),
            row_count: pagination.context.actual_row_count(),
            revised_offset: pagination.context.revised_offset(),
            revised_row_count: pagination.context.revised_row_count(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeResponse {
    pub id: String,
    pub database_type: DatabaseType,
    pub rows: Vec<Vec<Value>>,
    pub row_count: usize,
    pub pagination: PaginationSummary,
    /// Decorator wrapping the merged cursor; absent when rows were passed through
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decorator: Option<PaginationKind>,
    pub execution_time_ms: u64,
    pub merged_at: DateTime<Utc>,
}

impl MergeResponse {
    pub fn new(
        database_type: DatabaseType,
        rows: Vec<Vec<Value>>,
        pagination: PaginationSummary,
        decorator: Option<PaginationKind>,
        execution_time_ms: u64,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            database_type,
            row_count: rows.len(),
            rows,
            pagination,
            decorator,
            execution_time_ms,
            merged_at: Utc::now(),
        }
    }
}
