use serde_json::Value;
use std::time::Instant;

use crate::config::MergeConfig;
use crate::error::{MergeError, Result};
use crate::models::{MergeRequest, MergeResponse, PaginationSummary};
use crate::services::dialect::{create_dialect, DatabaseType};
use crate::services::merge::{MemoryQueryResult, MergedResult, QueryResult, ResultMerger};
use crate::validation::StatementExtractor;

/// Merges shard row sets submitted over the API
pub struct MergeService {
    default_database_type: DatabaseType,
    max_rows: usize,
    decorate_single_shard: bool,
}

impl MergeService {
    pub fn new(config: &MergeConfig) -> Result<Self> {
        Ok(Self {
            default_database_type: config.database_type()?,
            max_rows: config.max_rows,
            decorate_single_shard: config.decorate_single_shard,
        })
    }

    /// Extract the pagination of `request.sql`, merge the shard rows and
    /// materialize the paginated result
    pub fn merge(&self, request: MergeRequest) -> Result<MergeResponse> {
        let start_time = Instant::now();
        let database_type = request.database_type.unwrap_or(self.default_database_type);

        let statement = StatementExtractor::new(database_type).extract(&request.sql)?;

        let query_results: Vec<Box<dyn QueryResult>> = request
            .shards
            .into_iter()
            .map(|shard| Box::new(MemoryQueryResult::new(shard.rows)) as Box<dyn QueryResult>)
            .collect();
        let shard_count = query_results.len();

        let merged = ResultMerger::new(create_dialect(database_type))
            .with_single_shard_decoration(self.decorate_single_shard)
            .merge_statement(query_results, &statement, &request.parameters)?;

        let mut result = merged.result;
        let rows = self.drain(result.as_mut())?;

        let execution_time_ms = start_time.elapsed().as_millis() as u64;

        tracing::info!(
            "Merged {} shards into {} rows for {} in {}ms",
            shard_count,
            rows.len(),
            database_type.as_str(),
            execution_time_ms
        );

        Ok(MergeResponse::new(
            database_type,
            rows,
            PaginationSummary::from(&merged.pagination),
            merged.decorator,
            execution_time_ms,
        ))
    }

    fn drain(&self, result: &mut dyn MergedResult) -> Result<Vec<Vec<Value>>> {
        let column_count = result.column_count();
        let mut rows = Vec::new();

        while result.next()? {
            if rows.len() == self.max_rows {
                return Err(MergeError::RowLimitExceeded { limit: self.max_rows });
            }
            let row = (0..column_count)
                .map(|index| result.value(index))
                .collect::<Result<Vec<_>>>()?;
            rows.push(row);
        }

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ShardRows;
    use crate::services::pagination::PaginationKind;
    use serde_json::json;

    fn config(max_rows: usize) -> MergeConfig {
        MergeConfig {
            default_database_type: "mysql".to_string(),
            max_rows,
            decorate_single_shard: false,
        }
    }

    fn request(sql: &str, parameters: Vec<Value>) -> MergeRequest {
        MergeRequest {
            database_type: None,
            sql: sql.to_string(),
            parameters,
            shards: (0..3)
                .map(|shard| ShardRows {
                    rows: (0..3).map(|i| vec![json!(shard * 3 + i)]).collect(),
                })
                .collect(),
        }
    }

    fn first_column(response: &MergeResponse) -> Vec<Value> {
        response.rows.iter().map(|row| row[0].clone()).collect()
    }

    #[test]
    fn test_merge_with_limit() {
        let service = MergeService::new(&config(100)).unwrap();
        let response = service
            .merge(request("SELECT id FROM t_order LIMIT 2, 3", vec![]))
            .unwrap();

        assert_eq!(first_column(&response), vec![json!(2), json!(3), json!(4)]);
        assert_eq!(response.decorator, Some(PaginationKind::Limit));
        assert_eq!(response.pagination.offset, 2);
        assert_eq!(response.pagination.row_count, Some(3));
        assert_eq!(response.pagination.revised_row_count, Some(5));
    }

    #[test]
    fn test_merge_with_parameters() {
        let service = MergeService::new(&config(100)).unwrap();
        let response = service
            .merge(request("SELECT id FROM t_order LIMIT ? OFFSET ?", vec![json!(2), json!(6)]))
            .unwrap();

        assert_eq!(first_column(&response), vec![json!(6), json!(7)]);
    }

    #[test]
    fn test_merge_without_pagination() {
        let service = MergeService::new(&config(100)).unwrap();
        let response = service.merge(request("SELECT id FROM t_order", vec![])).unwrap();

        assert_eq!(response.row_count, 9);
        assert_eq!(response.decorator, None);
        assert_eq!(response.pagination.kind, None);
    }

    #[test]
    fn test_merge_oracle_row_number() {
        let service = MergeService::new(&config(100)).unwrap();
        let mut request = request(
            "SELECT * FROM (SELECT ROWNUM AS rownum_, id FROM t_order) t \
             WHERE t.rownum_ > 1 AND t.rownum_ <= 4",
            vec![],
        );
        request.database_type = Some(DatabaseType::Oracle);

        let response = service.merge(request).unwrap();

        assert_eq!(response.decorator, Some(PaginationKind::RowNumber));
        assert_eq!(first_column(&response), vec![json!(1), json!(2), json!(3)]);
    }

    #[test]
    fn test_top_is_not_applied_for_limit_dialect() {
        let service = MergeService::new(&config(100)).unwrap();
        let response = service.merge(request("SELECT TOP 2 id FROM t_order", vec![])).unwrap();

        assert_eq!(response.row_count, 9);
        assert_eq!(response.decorator, None);
        assert_eq!(response.pagination.kind, None);
    }

    #[test]
    fn test_row_limit_exceeded() {
        let service = MergeService::new(&config(4)).unwrap();
        let result = service.merge(request("SELECT id FROM t_order", vec![]));

        assert!(matches!(result, Err(MergeError::RowLimitExceeded { limit: 4 })));
    }

    #[test]
    fn test_row_limit_applies_after_pagination() {
        let service = MergeService::new(&config(4)).unwrap();
        let response = service
            .merge(request("SELECT id FROM t_order LIMIT 4", vec![]))
            .unwrap();

        assert_eq!(response.row_count, 4);
    }

    #[test]
    fn test_rejects_non_select() {
        let service = MergeService::new(&config(100)).unwrap();
        let result = service.merge(request("UPDATE t_order SET id = 1", vec![]));

        assert!(matches!(result, Err(MergeError::UnsupportedStatement(_))));
    }
}
