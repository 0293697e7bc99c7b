//! Public types for the metadata extraction API.

mod common;
mod request;
mod response;

pub use common::{issue_codes, Issue, IssueCount, Severity, Summary};
pub use request::{Dialect, ExtractRequest};
pub use response::{
    ColumnMetadata, ColumnOrigin, ExtractResult, FilterClauseType, FilterPredicate, TableMetadata,
};
