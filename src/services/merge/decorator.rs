// Pagination Decorators
//
// Wrap a merged result and apply the statement's pagination to it: skip the
// offset rows, then return rows until the page is full. Each decorator owns
// the cursor it wraps and is exhausted for good once `next()` returns false.

use serde_json::Value;

use super::result::MergedResult;
use crate::error::{MergeError, Result};
use crate::services::pagination::{PaginationContext, PaginationKind};

/// Skip/take counters shared by all decorators
#[derive(Debug, Default)]
struct PageWindow {
    skipped: i64,
    returned: i64,
    exhausted: bool,
}

impl PageWindow {
    /// Advance `merged` within a window of `offset` skipped rows and at most
    /// `take` returned rows (`None` for no cap)
    fn next(&mut self, merged: &mut dyn MergedResult, offset: i64, take: Option<i64>) -> Result<bool> {
        if self.exhausted {
            return Ok(false);
        }

        while self.skipped < offset {
            if !merged.next()? {
                self.exhausted = true;
                return Ok(false);
            }
            self.skipped += 1;
        }

        if take.is_some_and(|take| self.returned >= take) {
            self.exhausted = true;
            return Ok(false);
        }

        if !merged.next()? {
            self.exhausted = true;
            return Ok(false);
        }
        self.returned += 1;
        Ok(true)
    }
}

/// `LIMIT offset, count`: skip `offset` rows, return at most `count`
pub struct LimitDecoratorMergedResult {
    merged: Box<dyn MergedResult>,
    pagination: PaginationContext,
    window: PageWindow,
}

impl LimitDecoratorMergedResult {
    pub fn new(merged: Box<dyn MergedResult>, pagination: PaginationContext) -> Self {
        Self {
            merged,
            pagination,
            window: PageWindow::default(),
        }
    }

    pub fn next(&mut self) -> Result<bool> {
        self.window.next(
            self.merged.as_mut(),
            self.pagination.actual_offset(),
            self.pagination.actual_row_count(),
        )
    }
}

/// Oracle `ROWNUM` bounds: rows `offset + 1 ..= end`, where the row count
/// of the context is the last row number of the page
pub struct RowNumberDecoratorMergedResult {
    merged: Box<dyn MergedResult>,
    pagination: PaginationContext,
    window: PageWindow,
}

impl RowNumberDecoratorMergedResult {
    pub fn new(merged: Box<dyn MergedResult>, pagination: PaginationContext) -> Self {
        Self {
            merged,
            pagination,
            window: PageWindow::default(),
        }
    }

    pub fn next(&mut self) -> Result<bool> {
        if !self.pagination.has_pagination() {
            return self.window.next(self.merged.as_mut(), 0, None);
        }
        let offset = self.pagination.actual_offset();
        self.window
            .next(self.merged.as_mut(), offset, rows_until(offset, &self.pagination))
    }
}

/// SQL Server `TOP n` with a `ROW_NUMBER()` offset
///
/// The offset of the context already accounts for the bound of the row-number
/// predicate: `row_id >= 2` skips one row less than `row_id > 2`. `TOP n`
/// is the last row number of the page.
pub struct TopAndRowNumberDecoratorMergedResult {
    merged: Box<dyn MergedResult>,
    pagination: PaginationContext,
    window: PageWindow,
}

impl TopAndRowNumberDecoratorMergedResult {
    pub fn new(merged: Box<dyn MergedResult>, pagination: PaginationContext) -> Self {
        Self {
            merged,
            pagination,
            window: PageWindow::default(),
        }
    }

    pub fn next(&mut self) -> Result<bool> {
        let offset = self.pagination.actual_offset();
        self.window
            .next(self.merged.as_mut(), offset, rows_until(offset, &self.pagination))
    }
}

/// Rows left between the offset and the last row number of the page
fn rows_until(offset: i64, pagination: &PaginationContext) -> Option<i64> {
    pagination
        .actual_row_count()
        .map(|end| end.saturating_sub(offset).max(0))
}

/// The closed family of pagination decorators
pub enum PaginationDecorator {
    Limit(LimitDecoratorMergedResult),
    RowNumber(RowNumberDecoratorMergedResult),
    TopAndRowNumber(TopAndRowNumberDecoratorMergedResult),
}

impl PaginationDecorator {
    pub fn new(kind: PaginationKind, merged: Box<dyn MergedResult>, pagination: PaginationContext) -> Self {
        match kind {
            PaginationKind::Limit => Self::Limit(LimitDecoratorMergedResult::new(merged, pagination)),
            PaginationKind::RowNumber => {
                Self::RowNumber(RowNumberDecoratorMergedResult::new(merged, pagination))
            }
            PaginationKind::TopAndRowNumber => {
                Self::TopAndRowNumber(TopAndRowNumberDecoratorMergedResult::new(merged, pagination))
            }
        }
    }

    fn window(&self) -> &PageWindow {
        match self {
            Self::Limit(d) => &d.window,
            Self::RowNumber(d) => &d.window,
            Self::TopAndRowNumber(d) => &d.window,
        }
    }

    fn merged(&self) -> &dyn MergedResult {
        match self {
            Self::Limit(d) => d.merged.as_ref(),
            Self::RowNumber(d) => d.merged.as_ref(),
            Self::TopAndRowNumber(d) => d.merged.as_ref(),
        }
    }
}

impl MergedResult for PaginationDecorator {
    fn next(&mut self) -> Result<bool> {
        match self {
            Self::Limit(d) => d.next(),
            Self::RowNumber(d) => d.next(),
            Self::TopAndRowNumber(d) => d.next(),
        }
    }

    fn value(&self, column_index: usize) -> Result<Value> {
        if self.window().exhausted {
            return Err(MergeError::NoCurrentRow);
        }
        self.merged().value(column_index)
    }

    fn was_null(&self) -> bool {
        !self.window().exhausted && self.merged().was_null()
    }

    fn column_count(&self) -> usize {
        self.merged().column_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PaginationValueSegment, RowNumberValueSegment};
    use crate::services::merge::iterator::IteratorMergedResult;
    use crate::services::merge::result::{MemoryQueryResult, QueryResult};
    use serde_json::json;

    /// Four shards with two rows each, valued 0..8 in stream order
    fn eight_rows() -> Box<dyn MergedResult> {
        stream(8, 2)
    }

    fn stream(len: i64, per_shard: i64) -> Box<dyn MergedResult> {
        let shards = (0..len)
            .collect::<Vec<_>>()
            .chunks(per_shard.max(1) as usize)
            .map(|chunk| {
                Box::new(MemoryQueryResult::new(chunk.iter().map(|v| vec![json!(v)]).collect()))
                    as Box<dyn QueryResult>
            })
            .collect();
        Box::new(IteratorMergedResult::new(shards))
    }

    fn literal(value: i64) -> PaginationValueSegment {
        PaginationValueSegment::literal(value, 0, 0)
    }

    fn parameter(index: usize) -> PaginationValueSegment {
        PaginationValueSegment::parameter(index, 0, 0)
    }

    fn limit(offset: Option<i64>, row_count: Option<i64>) -> PaginationContext {
        PaginationContext::new(offset.map(literal), row_count.map(literal), &[]).unwrap()
    }

    fn drain(decorator: &mut PaginationDecorator) -> Vec<Value> {
        let mut values = Vec::new();
        while decorator.next().unwrap() {
            values.push(decorator.value(0).unwrap());
        }
        values
    }

    #[test]
    fn test_limit_row_counts() {
        for len in [0i64, 1, 5, 8] {
            for offset in [0i64, 1, 3, 8, 10] {
                for row_count in [0i64, 1, 2, 7, 100] {
                    let mut decorator = PaginationDecorator::new(
                        PaginationKind::Limit,
                        stream(len, 2),
                        limit(Some(offset), Some(row_count)),
                    );
                    let expected = if offset <= len { row_count.min(len - offset).max(0) } else { 0 };
                    assert_eq!(
                        drain(&mut decorator).len() as i64,
                        expected,
                        "len={len} offset={offset} row_count={row_count}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_limit_returns_rows_after_offset() {
        let mut decorator =
            PaginationDecorator::new(PaginationKind::Limit, eight_rows(), limit(Some(2), Some(3)));
        assert_eq!(drain(&mut decorator), vec![json!(2), json!(3), json!(4)]);
    }

    #[test]
    fn test_limit_unbounded_row_count() {
        let mut decorator =
            PaginationDecorator::new(PaginationKind::Limit, eight_rows(), limit(Some(5), None));
        assert_eq!(drain(&mut decorator), vec![json!(5), json!(6), json!(7)]);
    }

    #[test]
    fn test_skip_all() {
        let mut decorator =
            PaginationDecorator::new(PaginationKind::Limit, eight_rows(), limit(Some(8), Some(2)));
        assert!(!decorator.next().unwrap());
    }

    #[test]
    fn test_skip_all_with_max_offset() {
        let mut decorator = PaginationDecorator::new(
            PaginationKind::Limit,
            eight_rows(),
            limit(Some(i32::MAX as i64), None),
        );
        assert!(!decorator.next().unwrap());
    }

    #[test]
    fn test_exhaustion_is_idempotent() {
        for kind in [PaginationKind::Limit, PaginationKind::RowNumber, PaginationKind::TopAndRowNumber] {
            let mut decorator = PaginationDecorator::new(kind, eight_rows(), limit(Some(1), Some(3)));
            while decorator.next().unwrap() {}
            for _ in 0..3 {
                assert!(!decorator.next().unwrap());
            }
        }
    }

    #[test]
    fn test_no_current_row_once_page_is_full() {
        let mut decorator =
            PaginationDecorator::new(PaginationKind::Limit, eight_rows(), limit(Some(1), Some(2)));

        assert_eq!(drain(&mut decorator), vec![json!(1), json!(2)]);
        assert!(matches!(decorator.value(0), Err(MergeError::NoCurrentRow)));
        assert!(!decorator.was_null());
    }

    #[test]
    fn test_parameters_page_like_literals() {
        let parameters = [json!(3), json!(4)];
        let cases = [
            (
                PaginationKind::Limit,
                limit(Some(3), Some(4)),
                PaginationContext::new(Some(parameter(0)), Some(parameter(1)), &parameters).unwrap(),
            ),
            (
                PaginationKind::RowNumber,
                PaginationContext::with_row_number_bounds(
                    Some(RowNumberValueSegment::new(literal(3), false)),
                    Some(RowNumberValueSegment::new(literal(4), true)),
                    &[],
                )
                .unwrap(),
                PaginationContext::with_row_number_bounds(
                    Some(RowNumberValueSegment::new(parameter(0), false)),
                    Some(RowNumberValueSegment::new(parameter(1), true)),
                    &parameters,
                )
                .unwrap(),
            ),
            (
                PaginationKind::TopAndRowNumber,
                PaginationContext::with_top(
                    Some(RowNumberValueSegment::new(literal(3), true)),
                    Some(literal(4)),
                    &[],
                )
                .unwrap(),
                PaginationContext::with_top(
                    Some(RowNumberValueSegment::new(parameter(0), true)),
                    Some(parameter(1)),
                    &parameters,
                )
                .unwrap(),
            ),
        ];

        for (kind, literals, markers) in cases {
            let mut from_literals = PaginationDecorator::new(kind, eight_rows(), literals);
            let mut from_markers = PaginationDecorator::new(kind, eight_rows(), markers);

            let expected = drain(&mut from_literals);
            assert!(!expected.is_empty(), "{:?}", kind);
            assert_eq!(drain(&mut from_markers), expected, "{:?}", kind);
        }
    }

    #[test]
    fn test_row_number_page() {
        // ROWNUM > 2 AND ROWNUM <= 5
        let context = PaginationContext::with_row_number_bounds(
            Some(RowNumberValueSegment::new(literal(2), false)),
            Some(RowNumberValueSegment::new(literal(5), true)),
            &[],
        )
        .unwrap();

        let mut decorator = PaginationDecorator::new(PaginationKind::RowNumber, eight_rows(), context);
        assert_eq!(drain(&mut decorator), vec![json!(2), json!(3), json!(4)]);
    }

    #[test]
    fn test_row_number_end_before_offset() {
        // ROWNUM > 5 AND ROWNUM < 3
        let context = PaginationContext::with_row_number_bounds(
            Some(RowNumberValueSegment::new(literal(5), false)),
            Some(RowNumberValueSegment::new(literal(3), false)),
            &[],
        )
        .unwrap();

        let mut decorator = PaginationDecorator::new(PaginationKind::RowNumber, eight_rows(), context);
        assert!(!decorator.next().unwrap());
    }

    #[test]
    fn test_row_number_without_pagination_is_passthrough() {
        let mut decorator =
            PaginationDecorator::new(PaginationKind::RowNumber, eight_rows(), PaginationContext::empty());
        assert_eq!(drain(&mut decorator).len(), 8);
    }

    #[test]
    fn test_top_and_row_number_closed_offset() {
        let context = PaginationContext::with_top(
            Some(RowNumberValueSegment::new(literal(2), false)),
            Some(literal(4)),
            &[],
        )
        .unwrap();

        let mut decorator =
            PaginationDecorator::new(PaginationKind::TopAndRowNumber, eight_rows(), context);
        assert_eq!(drain(&mut decorator), vec![json!(2), json!(3)]);
    }

    #[test]
    fn test_top_and_row_number_opened_offset() {
        let context = PaginationContext::with_top(
            Some(RowNumberValueSegment::new(literal(2), true)),
            Some(literal(4)),
            &[],
        )
        .unwrap();

        let mut decorator =
            PaginationDecorator::new(PaginationKind::TopAndRowNumber, eight_rows(), context);
        assert_eq!(drain(&mut decorator), vec![json!(1), json!(2), json!(3)]);
    }

    #[test]
    fn test_top_without_offset() {
        let context = PaginationContext::with_top(None, Some(literal(3)), &[]).unwrap();
        let mut decorator =
            PaginationDecorator::new(PaginationKind::TopAndRowNumber, eight_rows(), context);
        assert_eq!(drain(&mut decorator).len(), 3);
    }

    struct FailingMergedResult;

    impl MergedResult for FailingMergedResult {
        fn next(&mut self) -> Result<bool> {
            Err(MergeError::ColumnIndexOutOfRange { index: 3, len: 1 })
        }

        fn value(&self, _column_index: usize) -> Result<Value> {
            Err(MergeError::NoCurrentRow)
        }

        fn was_null(&self) -> bool {
            false
        }

        fn column_count(&self) -> usize {
            1
        }
    }

    #[test]
    fn test_cursor_errors_propagate() {
        let mut decorator = PaginationDecorator::new(
            PaginationKind::Limit,
            Box::new(FailingMergedResult),
            limit(Some(1), Some(1)),
        );
        assert!(matches!(decorator.next(), Err(MergeError::ColumnIndexOutOfRange { index: 3, .. })));
    }
}
