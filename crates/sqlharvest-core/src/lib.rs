//! Core metadata extraction engine for SQLHarvest.
//!
//! Parses SQL with the `sqlparser` crate and walks the AST to collect the
//! table and column facts a data catalog cares about: which tables a script
//! defines or writes, their columns and declared types, and where each output
//! column's data comes from.

pub mod error;
pub mod extractor;
pub mod parser;
pub mod types;

pub use error::ParseError;
pub use extractor::extract;
pub use parser::{parse_sql, parse_sql_with_dialect};

pub use types::{
    issue_codes, ColumnMetadata, ColumnOrigin, Dialect, ExtractRequest, ExtractResult,
    FilterClauseType, FilterPredicate, Issue, IssueCount, Severity, Summary, TableMetadata,
};
