//! CLI argument parsing using clap.

use clap::{Parser, ValueEnum};
use sqlharvest_core::Dialect;
use std::path::PathBuf;

/// SQLHarvest - extract table/column metadata from SQL
#[derive(Parser, Debug)]
#[command(name = "sqlharvest")]
#[command(about = "Extract table and column metadata from SQL into a catalog CSV", long_about = None)]
#[command(version)]
pub struct Args {
    /// SQL file, directory of .sql files, or inline SQL text
    #[arg(short, long, value_name = "PATH_OR_SQL")]
    pub input: String,

    /// Output CSV file
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Database name recorded for extracted tables
    #[arg(short, long, value_name = "NAME")]
    pub database: Option<String>,

    /// Cluster name recorded for extracted tables
    #[arg(short, long, value_name = "NAME")]
    pub cluster: Option<String>,

    /// Schema applied to tables the SQL leaves unqualified
    #[arg(short, long, value_name = "NAME")]
    pub schema: Option<String>,

    /// Table name for inline SQL output columns (ignored when --input is a
    /// file or directory; the file name is used instead)
    #[arg(short, long, value_name = "NAME")]
    pub table: Option<String>,

    /// Database name recorded for source tables
    #[arg(long, alias = "source_database", value_name = "NAME")]
    pub source_database: Option<String>,

    /// Cluster name recorded for source tables
    #[arg(long, alias = "source_cluster", value_name = "NAME")]
    pub source_cluster: Option<String>,

    /// SQL dialect (defaults to a permissive generic grammar)
    #[arg(long, value_enum)]
    pub dialect: Option<DialectArg>,

    /// Suppress warnings on stderr
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    pub fn dialect(&self) -> Dialect {
        self.dialect.map(Into::into).unwrap_or_default()
    }
}

/// SQL dialect options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DialectArg {
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

impl From<DialectArg> for Dialect {
    fn from(d: DialectArg) -> Self {
        match d {
            DialectArg::Athena => Dialect::Athena,
            DialectArg::Bigquery => Dialect::Bigquery,
            DialectArg::Clickhouse => Dialect::Clickhouse,
            DialectArg::Databricks => Dialect::Databricks,
            DialectArg::Doris => Dialect::Doris,
            DialectArg::Drill => Dialect::Drill,
            DialectArg::Duckdb => Dialect::Duckdb,
            DialectArg::Hive => Dialect::Hive,
            DialectArg::Materialize => Dialect::Materialize,
            DialectArg::Mysql => Dialect::Mysql,
            DialectArg::Oracle => Dialect::Oracle,
            DialectArg::Postgres => Dialect::Postgres,
            DialectArg::Presto => Dialect::Presto,
            DialectArg::Prql => Dialect::Prql,
            DialectArg::Redshift => Dialect::Redshift,
            DialectArg::Risingwave => Dialect::Risingwave,
            DialectArg::Snowflake => Dialect::Snowflake,
            DialectArg::Spark => Dialect::Spark,
            DialectArg::Spark2 => Dialect::Spark2,
            DialectArg::Sqlite => Dialect::Sqlite,
            DialectArg::Starrocks => Dialect::Starrocks,
            DialectArg::Tableau => Dialect::Tableau,
            DialectArg::Teradata => Dialect::Teradata,
            DialectArg::Trino => Dialect::Trino,
            DialectArg::Tsql => Dialect::Tsql,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_conversion() {
        let dialect: Dialect = DialectArg::Postgres.into();
        assert_eq!(dialect, Dialect::Postgres);
    }

    #[test]
    fn test_parse_minimal_args() {
        let args = Args::parse_from(["sqlharvest", "-i", "query.sql", "-o", "out.csv"]);
        assert_eq!(args.input, "query.sql");
        assert_eq!(args.output.to_str().unwrap(), "out.csv");
        assert_eq!(args.dialect(), Dialect::Generic);
        assert!(args.table.is_none());
        assert!(!args.quiet);
    }

    #[test]
    fn test_parse_full_args() {
        let args = Args::parse_from([
            "sqlharvest",
            "--input",
            "sql/",
            "--output",
            "catalog.csv",
            "--database",
            "warehouse",
            "--cluster",
            "prod",
            "--schema",
            "analytics",
            "--source-database",
            "raw_db",
            "--source-cluster",
            "raw_cluster",
            "--dialect",
            "snowflake",
            "--quiet",
        ]);
        assert_eq!(args.database.as_deref(), Some("warehouse"));
        assert_eq!(args.cluster.as_deref(), Some("prod"));
        assert_eq!(args.schema.as_deref(), Some("analytics"));
        assert_eq!(args.source_database.as_deref(), Some("raw_db"));
        assert_eq!(args.source_cluster.as_deref(), Some("raw_cluster"));
        assert_eq!(args.dialect(), Dialect::Snowflake);
        assert!(args.quiet);
    }

    #[test]
    fn test_underscore_flag_aliases() {
        let args = Args::parse_from([
            "sqlharvest",
            "-i",
            "q.sql",
            "-o",
            "out.csv",
            "--source_database",
            "raw",
            "--source_cluster",
            "gold",
        ]);
        assert_eq!(args.source_database.as_deref(), Some("raw"));
        assert_eq!(args.source_cluster.as_deref(), Some("gold"));
    }

    #[test]
    fn test_input_and_output_required() {
        assert!(Args::try_parse_from(["sqlharvest", "-o", "out.csv"]).is_err());
        assert!(Args::try_parse_from(["sqlharvest", "-i", "q.sql"]).is_err());
    }

    #[test]
    fn test_invalid_dialect_rejected() {
        let result = Args::try_parse_from([
            "sqlharvest",
            "-i",
            "q.sql",
            "-o",
            "out.csv",
            "--dialect",
            "cobol",
        ]);
        assert!(result.is_err());
    }
}
