// Result Cursors
//
// Forward-only, pull-based row streams: the per-shard QueryResult produced by
// the execution layer and the MergedResult handed back to it.

use serde_json::Value;
use std::cell::Cell;

use crate::error::{MergeError, Result};

/// Result cursor of one shard
pub trait QueryResult: Send {
    /// Advance to the next row; `false` once exhausted
    fn next(&mut self) -> Result<bool>;

    /// Value of a column of the current row (0-based)
    fn value(&self, column_index: usize) -> Result<Value>;

    /// Whether the last value read was SQL NULL
    fn was_null(&self) -> bool;

    fn column_count(&self) -> usize;
}

/// Logical cursor over the results of all shards
pub trait MergedResult: Send {
    fn next(&mut self) -> Result<bool>;

    fn value(&self, column_index: usize) -> Result<Value>;

    fn was_null(&self) -> bool;

    fn column_count(&self) -> usize;
}

/// Shard result already materialized in memory
#[derive(Debug)]
pub struct MemoryQueryResult {
    rows: Vec<Vec<Value>>,
    column_count: usize,
    /// Index of the current row plus one; 0 before the first `next()`
    position: usize,
    last_was_null: Cell<bool>,
}

impl MemoryQueryResult {
    pub fn new(rows: Vec<Vec<Value>>) -> Self {
        let column_count = rows.first().map(Vec::len).unwrap_or(0);
        Self {
            rows,
            column_count,
            position: 0,
            last_was_null: Cell::new(false),
        }
    }

    fn current_row(&self) -> Result<&[Value]> {
        match self.position {
            0 => Err(MergeError::NoCurrentRow),
            p => self.rows.get(p - 1).map(Vec::as_slice).ok_or(MergeError::NoCurrentRow),
        }
    }
}

impl QueryResult for MemoryQueryResult {
    fn next(&mut self) -> Result<bool> {
        if self.position < self.rows.len() {
            self.position += 1;
            Ok(true)
        } else {
            self.position = self.rows.len() + 1;
            Ok(false)
        }
    }

    fn value(&self, column_index: usize) -> Result<Value> {
        let row = self.current_row()?;
        let value = row
            .get(column_index)
            .cloned()
            .ok_or(MergeError::ColumnIndexOutOfRange {
                index: column_index,
                len: row.len(),
            })?;
        self.last_was_null.set(value.is_null());
        Ok(value)
    }

    fn was_null(&self) -> bool {
        self.last_was_null.get()
    }

    fn column_count(&self) -> usize {
        self.column_count
    }
}
