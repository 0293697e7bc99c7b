//! Request types for the metadata extraction API.

use serde::{Deserialize, Serialize};

/// A request to extract table/column metadata from SQL.
///
/// This is the main entry point for the extraction API. It accepts SQL code
/// along with dialect and naming context used when the SQL itself does not
/// name its target (bare SELECT statements, unqualified tables).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ExtractRequest {
    /// The SQL code to analyze (UTF-8 string, multi-statement supported)
    pub sql: String,

    /// SQL dialect
    #[serde(default)]
    pub dialect: Dialect,

    /// Schema applied to target tables that are unqualified in the SQL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_schema: Option<String>,

    /// Table name used for bare SELECT statements (file stem or user-provided)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_table: Option<String>,

    /// Optional source name (file path) attached to diagnostics
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_name: Option<String>,
}

/// SQL dialect for parsing.
///
/// The variant set mirrors the dialect names accepted on the command line.
/// Several entries have no dedicated grammar in `sqlparser` and map to their
/// closest syntactic family instead (e.g. Presto-descended engines parse with
/// the generic grammar, Doris and StarRocks with the MySQL one).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Generic,
    Athena,
    Bigquery,
    Clickhouse,
    Databricks,
    Doris,
    Drill,
    Duckdb,
    Hive,
    Materialize,
    Mysql,
    Oracle,
    Postgres,
    Presto,
    Prql,
    Redshift,
    Risingwave,
    Snowflake,
    Spark,
    Spark2,
    Sqlite,
    Starrocks,
    Tableau,
    Teradata,
    Trino,
    Tsql,
}

impl Dialect {
    pub fn to_sqlparser_dialect(&self) -> Box<dyn sqlparser::dialect::Dialect> {
        use sqlparser::dialect::{
            BigQueryDialect, ClickHouseDialect, DatabricksDialect, DuckDbDialect, GenericDialect,
            HiveDialect, MsSqlDialect, MySqlDialect, PostgreSqlDialect, RedshiftSqlDialect,
            SQLiteDialect, SnowflakeDialect,
        };
        match self {
            Self::Bigquery => Box::new(BigQueryDialect {}),
            Self::Clickhouse => Box::new(ClickHouseDialect {}),
            Self::Databricks | Self::Spark | Self::Spark2 => Box::new(DatabricksDialect {}),
            Self::Doris | Self::Starrocks | Self::Mysql => Box::new(MySqlDialect {}),
            Self::Duckdb => Box::new(DuckDbDialect {}),
            Self::Hive => Box::new(HiveDialect {}),
            Self::Materialize | Self::Risingwave | Self::Postgres => Box::new(PostgreSqlDialect {}),
            Self::Redshift => Box::new(RedshiftSqlDialect {}),
            Self::Snowflake => Box::new(SnowflakeDialect {}),
            Self::Sqlite => Box::new(SQLiteDialect {}),
            Self::Tsql => Box::new(MsSqlDialect {}),
            Self::Generic
            | Self::Athena
            | Self::Drill
            | Self::Oracle
            | Self::Presto
            | Self::Prql
            | Self::Tableau
            | Self::Teradata
            | Self::Trino => Box::new(GenericDialect {}),
        }
    }

    /// True when this dialect parses with the generic grammar, which is the
    /// precondition for the Postgres-syntax parse fallback.
    pub(crate) fn uses_generic_grammar(&self) -> bool {
        matches!(
            self,
            Self::Generic
                | Self::Athena
                | Self::Drill
                | Self::Oracle
                | Self::Presto
                | Self::Prql
                | Self::Tableau
                | Self::Teradata
                | Self::Trino
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let request = ExtractRequest {
            sql: "SELECT * FROM users".to_string(),
            dialect: Dialect::Postgres,
            default_schema: None,
            target_table: Some("users_report".to_string()),
            source_name: None,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"dialect\":\"postgres\""));

        let deserialized: ExtractRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.dialect, Dialect::Postgres);
        assert_eq!(deserialized.target_table.as_deref(), Some("users_report"));
    }

    #[test]
    fn test_dialect_defaults_to_generic() {
        let request: ExtractRequest = serde_json::from_str(r#"{"sql":"SELECT 1"}"#).unwrap();
        assert_eq!(request.dialect, Dialect::Generic);
    }

    #[test]
    fn test_family_mappings_use_generic_grammar() {
        assert!(Dialect::Trino.uses_generic_grammar());
        assert!(Dialect::Teradata.uses_generic_grammar());
        assert!(!Dialect::Postgres.uses_generic_grammar());
        assert!(!Dialect::Doris.uses_generic_grammar());
    }
}
