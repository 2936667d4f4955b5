// Iterator Merged Result
//
// Concatenates shard results in routing order: every row of the first shard,
// then every row of the second, and so on.

use serde_json::Value;

use super::result::{MergedResult, QueryResult};
use crate::error::{MergeError, Result};

pub struct IteratorMergedResult {
    remaining: std::vec::IntoIter<Box<dyn QueryResult>>,
    current: Option<Box<dyn QueryResult>>,
    column_count: usize,
}

impl IteratorMergedResult {
    pub fn new(query_results: Vec<Box<dyn QueryResult>>) -> Self {
        let column_count = query_results
            .iter()
            .map(|r| r.column_count())
            .max()
            .unwrap_or(0);
        let mut remaining = query_results.into_iter();
        let current = remaining.next();

        Self {
            remaining,
            current,
            column_count,
        }
    }
}

impl MergedResult for IteratorMergedResult {
    fn next(&mut self) -> Result<bool> {
        while let Some(current) = self.current.as_mut() {
            if current.next()? {
                return Ok(true);
            }
            self.current = self.remaining.next();
        }
        Ok(false)
    }

    fn value(&self, column_index: usize) -> Result<Value> {
        self.current
            .as_ref()
            .ok_or(MergeError::NoCurrentRow)?
            .value(column_index)
    }

    fn was_null(&self) -> bool {
        self.current.as_ref().is_some_and(|c| c.was_null())
    }

    fn column_count(&self) -> usize {
        self.column_count
    }
}
