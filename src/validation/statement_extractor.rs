// Statement Extractor
//
// Parses a SELECT statement with sqlparser and extracts the pagination
// segments the merge engine consumes: LIMIT / OFFSET / FETCH, TOP, the
// flattened WHERE predicates and the projections exposing row-number aliases.

use sqlparser::ast::{
    BinaryOperator, Expr, LimitClause, Query, Select, SelectItem, SetExpr, Statement, TableFactor,
    TopQuantity, UnaryOperator, Value,
};
use sqlparser::dialect::{Dialect, GenericDialect, MsSqlDialect, MySqlDialect, PostgreSqlDialect};
use sqlparser::keywords::Keyword;
use sqlparser::parser::Parser;
use sqlparser::tokenizer::{Location, Span, Token, Tokenizer};

use crate::error::{MergeError, Result};
use crate::models::{
    BinaryOperationExpression, ComparisonOperator, ExpressionSegment, LimitSegment,
    PaginationValueSegment, Projection, SelectStatementContext,
    TopProjectionSegment,
};
use crate::services::dialect::DatabaseType;

/// Extracts pagination segments from SQL text of one database type
pub struct StatementExtractor {
    database_type: DatabaseType,
}

impl StatementExtractor {
    pub fn new(database_type: DatabaseType) -> Self {
        Self { database_type }
    }

    fn dialect(&self) -> Box<dyn Dialect> {
        match self.database_type {
            DatabaseType::MySQL => Box::new(MySqlDialect {}),
            DatabaseType::PostgreSQL | DatabaseType::OpenGauss => Box::new(PostgreSqlDialect {}),
            DatabaseType::SQLServer => Box::new(MsSqlDialect {}),
            DatabaseType::Oracle => Box::new(GenericDialect {}),
        }
    }

    /// Parse `sql`, ensure it is a single SELECT and extract its pagination segments
    pub fn extract(&self, sql: &str) -> Result<SelectStatementContext> {
        let dialect = self.dialect();

        let statements = Parser::parse_sql(dialect.as_ref(), sql)
            .map_err(|e| MergeError::InvalidSql(format!("SQL parsing error: {}", e)))?;

        let query = match statements.as_slice() {
            [] => return Err(MergeError::InvalidSql("Empty SQL query".to_string())),
            [Statement::Query(query)] => query,
            [_] => {
                return Err(MergeError::UnsupportedStatement(
                    "Only SELECT queries can be merged".to_string(),
                ))
            }
            _ => {
                return Err(MergeError::InvalidSql(format!(
                    "Expected a single statement, found {}",
                    statements.len()
                )))
            }
        };

        let source = SourceText::new(dialect.as_ref(), sql)?;

        let mut context = SelectStatementContext {
            limit: source.limit_segment(query),
            ..SelectStatementContext::default()
        };

        if let Some(select) = outer_select(query) {
            if let Some(selection) = &select.selection {
                source.collect_predicates(selection, &mut context.where_predicates);
            }
            collect_projections(select, &mut context.projections.projections);
            context.top = source.top_segment(select);
        }

        tracing::debug!(
            "Extracted pagination segments: limit={} top={} predicates={}",
            context.limit.is_some(),
            context.top.is_some(),
            context.where_predicates.len()
        );

        Ok(context)
    }
}

fn outer_select(query: &Query) -> Option<&Select> {
    match query.body.as_ref() {
        SetExpr::Select(select) => Some(select),
        SetExpr::Query(inner) => outer_select(inner),
        _ => None,
    }
}

/// Selects of the derived tables in the FROM clause
fn derived_selects(select: &Select) -> impl Iterator<Item = &Select> {
    select.from.iter().filter_map(|table| match &table.relation {
        TableFactor::Derived { subquery, .. } => outer_select(subquery),
        _ => None,
    })
}

fn collect_projections(select: &Select, projections: &mut Vec<Projection>) {
    for item in &select.projection {
        match item {
            SelectItem::UnnamedExpr(expr) => projections.push(Projection::new(projection_text(expr), None)),
            SelectItem::ExprWithAlias { expr, alias } => {
                projections.push(Projection::new(projection_text(expr), Some(&alias.value)))
            }
            other => projections.push(Projection::new(other.to_string(), None)),
        }
    }
    for derived in derived_selects(select) {
        collect_projections(derived, projections);
    }
}

fn projection_text(expr: &Expr) -> String {
    match expr {
        Expr::Identifier(ident) => ident.value.clone(),
        Expr::Function(function) => function.name.to_string(),
        other => other.to_string(),
    }
}

/// Alias of the `ROW_NUMBER()` projection of a select
fn row_number_alias(select: &Select) -> Option<String> {
    select.projection.iter().find_map(|item| match item {
        SelectItem::ExprWithAlias {
            expr: Expr::Function(function),
            alias,
        } if function.name.to_string().eq_ignore_ascii_case("ROW_NUMBER") => Some(alias.value.clone()),
        _ => None,
    })
}

fn comparison_operator(op: &BinaryOperator) -> Option<ComparisonOperator> {
    match op {
        BinaryOperator::Eq => Some(ComparisonOperator::Eq),
        BinaryOperator::NotEq => Some(ComparisonOperator::NotEq),
        BinaryOperator::Lt => Some(ComparisonOperator::Lt),
        BinaryOperator::LtEq => Some(ComparisonOperator::LtEq),
        BinaryOperator::Gt => Some(ComparisonOperator::Gt),
        BinaryOperator::GtEq => Some(ComparisonOperator::GtEq),
        _ => None,
    }
}

/// SQL text with the token positions needed to index segments
struct SourceText {
    /// Character offset of the first character of each line
    line_starts: Vec<usize>,
    /// Positions of positional `?` placeholders, in text order
    positional_placeholders: Vec<(u64, u64)>,
    /// Each `TOP` keyword with the span of the number following it, in text order
    top_constants: Vec<(Location, Option<Span>)>,
}

impl SourceText {
    fn new(dialect: &dyn Dialect, sql: &str) -> Result<Self> {
        let tokens = Tokenizer::new(dialect, sql)
            .tokenize_with_location()
            .map_err(|e| MergeError::InvalidSql(format!("SQL tokenizing error: {}", e)))?;

        let positional_placeholders = tokens
            .iter()
            .filter(|t| matches!(&t.token, Token::Placeholder(p) if p == "?"))
            .map(|t| (t.span.start.line, t.span.start.column))
            .collect();

        let top_constants = tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| matches!(&t.token, Token::Word(w) if w.keyword == Keyword::TOP))
            .map(|(top, t)| {
                let number = tokens[top + 1..]
                    .iter()
                    .find(|t| !matches!(t.token, Token::Whitespace(_)))
                    .filter(|t| matches!(t.token, Token::Number(..)))
                    .map(|t| t.span);
                (t.span.start, number)
            })
            .collect();

        let mut line_starts = vec![0];
        for (offset, ch) in sql.chars().enumerate() {
            if ch == '\n' {
                line_starts.push(offset + 1);
            }
        }

        Ok(Self {
            line_starts,
            positional_placeholders,
            top_constants,
        })
    }

    /// Character offset of a 1-based line/column location
    fn offset(&self, location: Location) -> usize {
        let line = (location.line.max(1) - 1) as usize;
        let line_start = self.line_starts.get(line).copied().unwrap_or(0);
        line_start + (location.column.max(1) - 1) as usize
    }

    /// Start and inclusive stop index of a span
    fn indexes(&self, span: Span) -> (usize, usize) {
        let start = self.offset(span.start);
        let end = self.offset(span.end);
        (start, end.saturating_sub(1).max(start))
    }

    /// `?` counts positionally, `$n` and `:n` are 1-based; named markers have no index
    fn parameter_index(&self, placeholder: &str, span: Span) -> Option<usize> {
        if placeholder == "?" {
            let position = (span.start.line, span.start.column);
            return Some(
                self.positional_placeholders
                    .iter()
                    .filter(|p| **p < position)
                    .count(),
            );
        }
        placeholder
            .strip_prefix('$')
            .or_else(|| placeholder.strip_prefix(':'))
            .and_then(|number| number.parse::<usize>().ok())
            .and_then(|n| n.checked_sub(1))
    }

    /// Span of the `TOP n` constant belonging to the select that starts at `select_start`
    fn top_constant(&self, select_start: Location) -> Option<Span> {
        let start = (select_start.line, select_start.column);
        self.top_constants
            .iter()
            .find(|(top, _)| (top.line, top.column) > start)
            .and_then(|(_, number)| *number)
    }

    fn expression(&self, expr: &Expr) -> ExpressionSegment {
        match expr {
            Expr::Identifier(ident) => ExpressionSegment::Column {
                owner: None,
                name: ident.value.clone(),
            },
            Expr::CompoundIdentifier(idents) if !idents.is_empty() => {
                let name = idents[idents.len() - 1].value.clone();
                let owner = idents.len().checked_sub(2).map(|i| idents[i].value.clone());
                ExpressionSegment::Column { owner, name }
            }
            Expr::Nested(inner) => self.expression(inner),
            Expr::Value(value) => {
                let (start_index, stop_index) = self.indexes(value.span);
                match &value.value {
                    Value::Number(text, _) => match text.parse::<i64>() {
                        Ok(value) => ExpressionSegment::NumberLiteral {
                            value,
                            start_index,
                            stop_index,
                        },
                        Err(_) => ExpressionSegment::Other { text: text.clone() },
                    },
                    Value::Placeholder(placeholder) => match self.parameter_index(placeholder, value.span) {
                        Some(parameter_index) => ExpressionSegment::ParameterMarker {
                            parameter_index,
                            start_index,
                            stop_index,
                        },
                        None => ExpressionSegment::Other {
                            text: placeholder.clone(),
                        },
                    },
                    other => ExpressionSegment::Other {
                        text: other.to_string(),
                    },
                }
            }
            Expr::UnaryOp {
                op: UnaryOperator::Minus,
                expr: inner,
            } => match self.expression(inner) {
                ExpressionSegment::NumberLiteral {
                    value,
                    start_index,
                    stop_index,
                } => ExpressionSegment::NumberLiteral {
                    value: -value,
                    start_index: start_index.saturating_sub(1),
                    stop_index,
                },
                _ => ExpressionSegment::Other {
                    text: expr.to_string(),
                },
            },
            other => ExpressionSegment::Other {
                text: other.to_string(),
            },
        }
    }

    fn pagination_value(&self, expr: &Expr) -> Option<PaginationValueSegment> {
        self.expression(expr).as_pagination_value()
    }

    fn collect_predicates(&self, expr: &Expr, predicates: &mut Vec<BinaryOperationExpression>) {
        match expr {
            Expr::Nested(inner) => self.collect_predicates(inner, predicates),
            Expr::BinaryOp {
                left,
                op: BinaryOperator::And,
                right,
            } => {
                self.collect_predicates(left, predicates);
                self.collect_predicates(right, predicates);
            }
            Expr::BinaryOp { left, op, right } => {
                if let Some(operator) = comparison_operator(op) {
                    predicates.push(BinaryOperationExpression::new(
                        self.expression(left),
                        operator,
                        self.expression(right),
                    ));
                }
            }
            _ => {}
        }
    }

    fn limit_segment(&self, query: &Query) -> Option<LimitSegment> {
        let (offset, limit) = match &query.limit_clause {
            Some(LimitClause::LimitOffset { limit, offset, .. }) => {
                (offset.as_ref().map(|o| &o.value), limit.as_ref())
            }
            Some(LimitClause::OffsetCommaLimit { offset, limit }) => (Some(offset), Some(limit)),
            None => (None, None),
        };
        let fetch = query.fetch.as_ref().and_then(|f| f.quantity.as_ref());

        if offset.is_none() && limit.is_none() && fetch.is_none() {
            return None;
        }

        let offset = offset.and_then(|e| self.pagination_value(e));
        let row_count = limit.or(fetch).and_then(|e| self.pagination_value(e));

        let bounds = [offset, row_count];
        let start_index = bounds.iter().flatten().map(|s| s.start_index()).min().unwrap_or(0);
        let stop_index = bounds.iter().flatten().map(|s| s.stop_index()).max().unwrap_or(0);

        Some(LimitSegment::new(start_index, stop_index, offset, row_count))
    }

    /// TOP projection of the select or of one of its derived tables
    fn top_segment(&self, select: &Select) -> Option<TopProjectionSegment> {
        if let Some(top) = &select.top {
            let value = match &top.quantity {
                Some(TopQuantity::Expr(expr)) => self.pagination_value(expr),
                Some(TopQuantity::Constant(constant)) => {
                    let (start_index, stop_index) = self
                        .top_constant(select.select_token.0.span.start)
                        .map(|s| self.indexes(s)).unwrap_or((0, 0));
                    let value = i64::try_from(*constant).unwrap_or(i64::MAX);
                    Some(PaginationValueSegment::literal(value, start_index, stop_index))
                }
                None => None,
            };
            let start_index = value.map(|v| v.start_index()).unwrap_or(0);
            let stop_index = value.map(|v| v.stop_index()).unwrap_or(0);
            return Some(TopProjectionSegment::new(
                start_index,
                stop_index,
                value,
                row_number_alias(select),
            ));
        }

        derived_selects(select).find_map(|derived| self.top_segment(derived))
    }
}
