// Pagination Context
//
// Normalized (offset, row count) pair of one statement execution. Literal and
// parameter-marker bounds are resolved here, once; nothing downstream looks at
// where a bound came from.

use serde::Serialize;
use serde_json::Value;

use crate::error::{MergeError, Result};
use crate::models::{PaginationValueSegment, RowNumberValueSegment};

/// Resolved pagination of one statement execution
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PaginationContext {
    offset_segment: Option<PaginationValueSegment>,
    row_count_segment: Option<PaginationValueSegment>,
    actual_offset: i64,
    /// `None` when no row count bound was given
    actual_row_count: Option<i64>,
}

impl PaginationContext {
    /// Context of a statement without pagination
    pub fn empty() -> Self {
        Self::default()
    }

    /// Context of plain `LIMIT`-style bounds
    pub fn new(
        offset_segment: Option<PaginationValueSegment>,
        row_count_segment: Option<PaginationValueSegment>,
        parameters: &[Value],
    ) -> Result<Self> {
        Self::build(
            offset_segment.map(|s| (s, 0)),
            row_count_segment.map(|s| (s, 0)),
            parameters,
        )
    }

    /// Context of row-number comparison bounds
    ///
    /// `ROWNUM > n` skips `n` rows and `ROWNUM >= n` skips `n - 1`;
    /// `ROWNUM <= n` ends the page at row `n` and `ROWNUM < n` at row `n - 1`.
    pub fn with_row_number_bounds(
        offset_segment: Option<RowNumberValueSegment>,
        row_count_segment: Option<RowNumberValueSegment>,
        parameters: &[Value],
    ) -> Result<Self> {
        Self::build(
            offset_segment.map(|s| (s.value, if s.bound_opened { -1 } else { 0 })),
            row_count_segment.map(|s| (s.value, if s.bound_opened { 0 } else { -1 })),
            parameters,
        )
    }

    /// Context of a `TOP n` projection with an optional row-number offset predicate
    pub fn with_top(
        offset_segment: Option<RowNumberValueSegment>,
        top_segment: Option<PaginationValueSegment>,
        parameters: &[Value],
    ) -> Result<Self> {
        Self::build(
            offset_segment.map(|s| (s.value, if s.bound_opened { -1 } else { 0 })),
            top_segment.map(|s| (s, 0)),
            parameters,
        )
    }

    fn build(
        offset: Option<(PaginationValueSegment, i64)>,
        row_count: Option<(PaginationValueSegment, i64)>,
        parameters: &[Value],
    ) -> Result<Self> {
        let actual_offset = match offset {
            Some((segment, adjust)) => resolve(&segment, parameters)?.saturating_add(adjust).max(0),
            None => 0,
        };
        let actual_row_count = match row_count {
            Some((segment, adjust)) => Some(resolve(&segment, parameters)?.saturating_add(adjust).max(0)),
            None => None,
        };

        Ok(Self {
            offset_segment: offset.map(|(segment, _)| segment),
            row_count_segment: row_count.map(|(segment, _)| segment),
            actual_offset,
            actual_row_count,
        })
    }

    pub fn has_pagination(&self) -> bool {
        self.offset_segment.is_some() || self.row_count_segment.is_some()
    }

    pub fn offset_segment(&self) -> Option<&PaginationValueSegment> {
        self.offset_segment.as_ref()
    }

    pub fn row_count_segment(&self) -> Option<&PaginationValueSegment> {
        self.row_count_segment.as_ref()
    }

    pub fn actual_offset(&self) -> i64 {
        self.actual_offset
    }

    pub fn actual_row_count(&self) -> Option<i64> {
        self.actual_row_count
    }

    /// Offset each shard must be queried with; shards always start from the first row
    pub fn revised_offset(&self) -> i64 {
        0
    }

    /// Row count each shard must return so that the merged stream still
    /// contains the whole `LIMIT`-style page
    pub fn revised_row_count(&self) -> Option<i64> {
        self.actual_row_count
            .map(|row_count| self.actual_offset.saturating_add(row_count))
    }
}

/// Resolve a bound against the positional parameter list
///
/// A statement executed without any bound parameters resolves every marker to 0.
pub fn resolve(segment: &PaginationValueSegment, parameters: &[Value]) -> Result<i64> {
    match segment {
        PaginationValueSegment::NumberLiteral { value, .. } => Ok(*value),
        PaginationValueSegment::ParameterMarker { parameter_index, .. } => {
            if parameters.is_empty() {
                return Ok(0);
            }
            let value = parameters
                .get(*parameter_index)
                .ok_or(MergeError::ParameterIndexOutOfRange {
                    index: *parameter_index,
                    len: parameters.len(),
                })?;
            parameter_as_i64(*parameter_index, value)
        }
    }
}

fn parameter_as_i64(index: usize, value: &Value) -> Result<i64> {
    let invalid = || MergeError::InvalidParameter {
        index,
        value: value.to_string(),
    };

    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|v| i64::try_from(v).unwrap_or(i64::MAX)))
            .ok_or_else(invalid),
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}
