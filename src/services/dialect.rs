// Pagination Dialects
//
// Describes how each supported database expresses pagination, and which
// row-number pseudo-column (if any) it exposes to WHERE predicates.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{MergeError, Result};

/// Database types whose result sets can be merged
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    MySQL,
    PostgreSQL,
    /// openGauss speaks the PostgreSQL pagination dialect
    OpenGauss,
    Oracle,
    SQLServer,
}

impl DatabaseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatabaseType::MySQL => "mysql",
            DatabaseType::PostgreSQL => "postgresql",
            DatabaseType::OpenGauss => "opengauss",
            DatabaseType::Oracle => "oracle",
            DatabaseType::SQLServer => "sqlserver",
        }
    }

    pub fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(DatabaseType::MySQL),
            "postgresql" | "postgres" | "pg" => Ok(DatabaseType::PostgreSQL),
            "opengauss" => Ok(DatabaseType::OpenGauss),
            "oracle" => Ok(DatabaseType::Oracle),
            "sqlserver" | "mssql" => Ok(DatabaseType::SQLServer),
            _ => Err(MergeError::UnsupportedDatabaseType(s.to_string())),
        }
    }
}

/// Pagination syntaxes a dialect may support
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationFeature {
    /// `LIMIT`, `OFFSET`, `FETCH NEXT`
    LimitClause,
    /// `SELECT TOP n`
    TopProjection,
    /// Row-number pseudo-column compared in `WHERE`
    RowNumberPredicate,
}

/// Pagination capabilities of a database dialect
pub trait PaginationDialect: Send + Sync {
    fn database_type(&self) -> DatabaseType;

    fn supports_feature(&self, feature: PaginationFeature) -> bool;

    /// Name of the pseudo-column used for row-number pagination
    fn row_number_column(&self) -> Option<&str> {
        None
    }
}

/// MySQL, PostgreSQL and openGauss: `LIMIT` only
pub struct LimitDialect {
    database_type: DatabaseType,
}

impl LimitDialect {
    pub fn new(database_type: DatabaseType) -> Self {
        Self { database_type }
    }
}

impl PaginationDialect for LimitDialect {
    fn database_type(&self) -> DatabaseType {
        self.database_type
    }

    fn supports_feature(&self, feature: PaginationFeature) -> bool {
        matches!(feature, PaginationFeature::LimitClause)
    }
}

/// Oracle: `ROWNUM` pushed into `WHERE`, plus 12c `OFFSET .. FETCH`
pub struct OracleDialect;

impl PaginationDialect for OracleDialect {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::Oracle
    }

    fn supports_feature(&self, feature: PaginationFeature) -> bool {
        match feature {
            PaginationFeature::LimitClause => true,
            PaginationFeature::TopProjection => false,
            PaginationFeature::RowNumberPredicate => true,
        }
    }

    fn row_number_column(&self) -> Option<&str> {
        Some("ROWNUM")
    }
}

/// SQL Server: `TOP n` with a `ROW_NUMBER()` column, plus `OFFSET .. FETCH`
pub struct SQLServerDialect;

impl PaginationDialect for SQLServerDialect {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::SQLServer
    }

    fn supports_feature(&self, _feature: PaginationFeature) -> bool {
        true
    }

    fn row_number_column(&self) -> Option<&str> {
        Some("ROW_NUMBER")
    }
}

/// Factory function to create the pagination dialect of a database type
pub fn create_dialect(database_type: DatabaseType) -> Arc<dyn PaginationDialect> {
    match database_type {
        DatabaseType::MySQL | DatabaseType::PostgreSQL | DatabaseType::OpenGauss => {
            Arc::new(LimitDialect::new(database_type))
        }
        DatabaseType::Oracle => Arc::new(OracleDialect),
        DatabaseType::SQLServer => Arc::new(SQLServerDialect),
    }
}
