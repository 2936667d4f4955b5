// Pagination Segment Models
//
// The parts of a SELECT statement that carry pagination, as they appeared in
// the source SQL. Start and stop indexes are character offsets into the SQL text.

use serde::{Deserialize, Serialize};

/// One pagination bound: either a literal number or a reference to a bound parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaginationValueSegment {
    NumberLiteral {
        value: i64,
        start_index: usize,
        stop_index: usize,
    },
    ParameterMarker {
        parameter_index: usize,
        start_index: usize,
        stop_index: usize,
    },
}

impl PaginationValueSegment {
    pub fn literal(value: i64, start_index: usize, stop_index: usize) -> Self {
        Self::NumberLiteral {
            value,
            start_index,
            stop_index,
        }
    }

    pub fn parameter(parameter_index: usize, start_index: usize, stop_index: usize) -> Self {
        Self::ParameterMarker {
            parameter_index,
            start_index,
            stop_index,
        }
    }

    pub fn start_index(&self) -> usize {
        match self {
            Self::NumberLiteral { start_index, .. } | Self::ParameterMarker { start_index, .. } => {
                *start_index
            }
        }
    }

    pub fn stop_index(&self) -> usize {
        match self {
            Self::NumberLiteral { stop_index, .. } | Self::ParameterMarker { stop_index, .. } => {
                *stop_index
            }
        }
    }
}

/// A pagination bound taken from a row-number comparison
///
/// `bound_opened` is set when the boundary row itself belongs to the page,
/// i.e. the comparison was `>=` or `<=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowNumberValueSegment {
    pub value: PaginationValueSegment,
    pub bound_opened: bool,
}

impl RowNumberValueSegment {
    pub fn new(value: PaginationValueSegment, bound_opened: bool) -> Self {
        Self {
            value,
            bound_opened,
        }
    }
}

/// `LIMIT offset, count` and its equivalents (`LIMIT count OFFSET offset`,
/// `OFFSET .. FETCH NEXT ..`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitSegment {
    pub start_index: usize,
    pub stop_index: usize,
    pub offset: Option<PaginationValueSegment>,
    pub row_count: Option<PaginationValueSegment>,
}

impl LimitSegment {
    pub fn new(
        start_index: usize,
        stop_index: usize,
        offset: Option<PaginationValueSegment>,
        row_count: Option<PaginationValueSegment>,
    ) -> Self {
        Self {
            start_index,
            stop_index,
            offset,
            row_count,
        }
    }
}

/// SQL Server `TOP n` projection
///
/// `alias` names the `ROW_NUMBER()` column projected next to the TOP clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopProjectionSegment {
    pub start_index: usize,
    pub stop_index: usize,
    pub top: Option<PaginationValueSegment>,
    pub alias: Option<String>,
}

impl TopProjectionSegment {
    pub fn new(
        start_index: usize,
        stop_index: usize,
        top: Option<PaginationValueSegment>,
        alias: Option<String>,
    ) -> Self {
        Self {
            start_index,
            stop_index,
            top,
            alias,
        }
    }
}

/// Operand of a predicate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExpressionSegment {
    Column {
        owner: Option<String>,
        name: String,
    },
    NumberLiteral {
        value: i64,
        start_index: usize,
        stop_index: usize,
    },
    ParameterMarker {
        parameter_index: usize,
        start_index: usize,
        stop_index: usize,
    },
    /// Any expression the pagination engines do not look into
    Other { text: String },
}

impl ExpressionSegment {
    pub fn column(name: impl Into<String>) -> Self {
        Self::Column {
            owner: None,
            name: name.into(),
        }
    }

    pub fn literal(value: i64) -> Self {
        Self::NumberLiteral {
            value,
            start_index: 0,
            stop_index: 0,
        }
    }

    pub fn parameter(parameter_index: usize) -> Self {
        Self::ParameterMarker {
            parameter_index,
            start_index: 0,
            stop_index: 0,
        }
    }

    /// Whether this operand is a column named `name`, ignoring case and owner
    pub fn is_column_named(&self, name: &str) -> bool {
        matches!(self, Self::Column { name: column, .. } if column.eq_ignore_ascii_case(name))
    }

    /// The pagination value carried by a literal or parameter operand
    pub fn as_pagination_value(&self) -> Option<PaginationValueSegment> {
        match self {
            Self::NumberLiteral {
                value,
                start_index,
                stop_index,
            } => Some(PaginationValueSegment::literal(*value, *start_index, *stop_index)),
            Self::ParameterMarker {
                parameter_index,
                start_index,
                stop_index,
            } => Some(PaginationValueSegment::parameter(
                *parameter_index,
                *start_index,
                *stop_index,
            )),
            Self::Column { .. } | Self::Other { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonOperator {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "<>")]
    NotEq,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    LtEq,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    GtEq,
}

impl ComparisonOperator {
    /// The operator seen from the other side: `a < b` is `b > a`
    pub fn mirrored(self) -> Self {
        match self {
            Self::Lt => Self::Gt,
            Self::LtEq => Self::GtEq,
            Self::Gt => Self::Lt,
            Self::GtEq => Self::LtEq,
            other => other,
        }
    }
}

/// A binary comparison from a `WHERE` clause flattened on `AND`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryOperationExpression {
    pub left: ExpressionSegment,
    pub operator: ComparisonOperator,
    pub right: ExpressionSegment,
}

impl BinaryOperationExpression {
    pub fn new(left: ExpressionSegment, operator: ComparisonOperator, right: ExpressionSegment) -> Self {
        Self {
            left,
            operator,
            right,
        }
    }

    /// Normalize so that the `column` operand sits on the left
    ///
    /// Returns `None` when neither side references the column.
    pub fn oriented_to(&self, column: &str) -> Option<(ComparisonOperator, &ExpressionSegment)> {
        if self.left.is_column_named(column) {
            Some((self.operator, &self.right))
        } else if self.right.is_column_named(column) {
            Some((self.operator.mirrored(), &self.left))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_match_ignores_case_and_owner() {
        let column = ExpressionSegment::Column {
            owner: Some("t".to_string()),
            name: "RowNum_".to_string(),
        };
        assert!(column.is_column_named("rownum_"));
        assert!(!column.is_column_named("row_id"));
        assert!(!ExpressionSegment::literal(1).is_column_named("rownum_"));
    }

    #[test]
    fn test_oriented_to_mirrors_right_hand_column() {
        let predicate = BinaryOperationExpression::new(
            ExpressionSegment::literal(100),
            ComparisonOperator::Gt,
            ExpressionSegment::column("ROWNUM"),
        );

        let (operator, value) = predicate.oriented_to("rownum").unwrap();
        assert_eq!(operator, ComparisonOperator::Lt);
        assert_eq!(value, &ExpressionSegment::literal(100));

        assert!(predicate.oriented_to("row_id").is_none());
    }

    #[test]
    fn test_pagination_value_from_operand() {
        let param = ExpressionSegment::ParameterMarker {
            parameter_index: 2,
            start_index: 10,
            stop_index: 10,
        };
        assert_eq!(
            param.as_pagination_value(),
            Some(PaginationValueSegment::parameter(2, 10, 10))
        );
        assert!(ExpressionSegment::column("id").as_pagination_value().is_none());
    }
}
