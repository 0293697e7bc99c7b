//! Response types for the metadata extraction API.

use serde::{Deserialize, Serialize};

use super::common::{Issue, Summary};

/// The complete result of a metadata extraction run.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ExtractResult {
    /// Tables defined or written by the analyzed SQL, in statement order
    pub tables: Vec<TableMetadata>,

    /// Issues encountered during extraction
    pub issues: Vec<Issue>,

    /// Summary statistics
    pub summary: Summary,
}

/// Metadata for one table the SQL defines or writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableMetadata {
    /// Schema qualifier, from the SQL or the request's default schema
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Unqualified table name
    pub name: String,

    /// Output columns; empty for statements that only reference the table
    /// (DROP, DELETE, MERGE targets)
    #[serde(default)]
    pub columns: Vec<ColumnMetadata>,

    /// Filter predicates captured from the query that populated this table
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<FilterPredicate>,
}

impl TableMetadata {
    pub fn new(schema: Option<String>, name: impl Into<String>) -> Self {
        Self {
            schema,
            name: name.into(),
            columns: Vec::new(),
            filters: Vec::new(),
        }
    }
}

/// One output column of a table, with the source columns it derives from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMetadata {
    /// Column name (alias, identifier, or generated `col_<n>` label)
    pub name: String,

    /// Declared data type when the SQL provides one (DDL column definitions)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,

    /// SQL text of the defining expression, for derived columns
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,

    /// Explanatory note (unresolved reference, ambiguity, wildcard)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    /// Source columns this column's data flows from
    #[serde(default)]
    pub origins: Vec<ColumnOrigin>,
}

impl ColumnMetadata {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: None,
            expression: None,
            note: None,
            origins: Vec::new(),
        }
    }
}

/// A source column reference resolved from an expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnOrigin {
    /// Schema of the source table, when qualified in the SQL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Source table name; None when the reference could not be resolved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,

    /// Source column name (`*` for wildcard expansion)
    pub column: String,
}

/// A filter predicate captured from a WHERE or HAVING clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterPredicate {
    /// The SQL expression text of the predicate
    pub expression: String,

    /// Where this filter appears in the query
    pub clause_type: FilterClauseType,
}

/// The type of SQL clause where a filter predicate appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterClauseType {
    /// FROM ... WHERE clause
    Where,
    /// HAVING clause (after GROUP BY)
    Having,
}

impl FilterClauseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Where => "where",
            Self::Having => "having",
        }
    }
}
