//! Types shared between request and response.

use serde::{Deserialize, Serialize};

/// An issue encountered during extraction (error, warning, or info).
///
/// Issues are accumulated alongside successful results so a multi-statement
/// script still yields partial metadata when individual statements fail.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    /// Severity level
    pub severity: Severity,

    /// Machine-readable issue code
    pub code: String,

    /// Human-readable message
    pub message: String,

    /// Optional: which statement index this issue relates to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statement_index: Option<usize>,

    /// Optional: source file name where the issue occurred
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_name: Option<String>,
}

impl Issue {
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code: code.into(),
            message: message.into(),
            statement_index: None,
            source_name: None,
        }
    }

    pub fn warning(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code: code.into(),
            message: message.into(),
            statement_index: None,
            source_name: None,
        }
    }

    pub fn info(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            code: code.into(),
            message: message.into(),
            statement_index: None,
            source_name: None,
        }
    }

    pub fn with_statement(mut self, index: usize) -> Self {
        self.statement_index = Some(index);
        self
    }

    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = Some(name.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// Summary statistics for an extraction run.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Total number of statements parsed
    pub statement_count: usize,

    /// Total tables with metadata entries
    pub table_count: usize,

    /// Total columns across all tables
    pub column_count: usize,

    /// Issue counts by severity
    pub issue_count: IssueCount,

    /// Quick check: true if any errors were encountered
    pub has_errors: bool,
}

/// Counts of issues by severity level.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct IssueCount {
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
}

impl IssueCount {
    pub fn tally(issues: &[Issue]) -> Self {
        let mut count = Self::default();
        for issue in issues {
            match issue.severity {
                Severity::Error => count.errors += 1,
                Severity::Warning => count.warnings += 1,
                Severity::Info => count.infos += 1,
            }
        }
        count
    }
}

/// Machine-readable issue codes.
pub mod issue_codes {
    pub const PARSE_ERROR: &str = "PARSE_ERROR";
    pub const NO_METADATA: &str = "NO_METADATA";
    pub const UNRESOLVED_REFERENCE: &str = "UNRESOLVED_REFERENCE";
    pub const AMBIGUOUS_COLUMN: &str = "AMBIGUOUS_COLUMN";
    pub const RECURSION_LIMIT: &str = "RECURSION_LIMIT";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_builders() {
        let issue = Issue::error(issue_codes::PARSE_ERROR, "unexpected token")
            .with_statement(2)
            .with_source_name("etl/load.sql");

        assert_eq!(issue.severity, Severity::Error);
        assert_eq!(issue.code, "PARSE_ERROR");
        assert_eq!(issue.statement_index, Some(2));
        assert_eq!(issue.source_name.as_deref(), Some("etl/load.sql"));
    }

    #[test]
    fn test_issue_serialization_skips_empty_fields() {
        let issue = Issue::warning(issue_codes::AMBIGUOUS_COLUMN, "ambiguous column 'id'");
        let json = serde_json::to_string(&issue).unwrap();
        assert!(json.contains("\"severity\":\"warning\""));
        assert!(!json.contains("statementIndex"));
    }
}
