//! Statement-level metadata extraction.
//!
//! The extractor walks each parsed statement, records the tables it defines
//! or writes, and delegates projection analysis to [`select`]. Results from
//! multiple statements touching the same table are merged into one entry.

mod ddl;
mod expression;
mod scope;
mod select;

use sqlparser::ast::{ObjectName, ObjectType, Query, Statement, TableFactor};

use crate::parser::parse_sql_with_dialect;
use crate::types::issue_codes::{NO_METADATA, PARSE_ERROR};
use crate::types::{
    ColumnMetadata, ExtractRequest, ExtractResult, FilterPredicate, Issue, IssueCount, Summary,
    TableMetadata,
};
use select::CteMap;

/// Extracts table and column metadata from the SQL in `request`.
///
/// Extraction never fails outright: parse errors and unresolvable references
/// are reported as issues on the result, alongside whatever metadata could
/// still be collected from the rest of the input.
pub fn extract(request: &ExtractRequest) -> ExtractResult {
    Extractor::new(request).run()
}

pub(crate) struct Extractor<'a> {
    request: &'a ExtractRequest,
    tables: Vec<TableMetadata>,
    issues: Vec<Issue>,
}

impl<'a> Extractor<'a> {
    fn new(request: &'a ExtractRequest) -> Self {
        Self {
            request,
            tables: Vec::new(),
            issues: Vec::new(),
        }
    }

    fn run(mut self) -> ExtractResult {
        let statements = match parse_sql_with_dialect(&self.request.sql, self.request.dialect) {
            Ok(statements) => statements,
            Err(err) => {
                self.push_issue(Issue::error(PARSE_ERROR, err.to_string()));
                return self.finish(0);
            }
        };

        let statement_count = statements.len();
        for (index, statement) in statements.iter().enumerate() {
            self.harvest_statement(statement, index);
        }
        self.finish(statement_count)
    }

    fn harvest_statement(&mut self, statement: &Statement, index: usize) {
        match statement {
            Statement::Query(query) => self.harvest_bare_select(query, index),
            Statement::Insert(insert) => self.harvest_insert(insert, index),
            Statement::CreateTable(create) => self.harvest_create_table(create, index),
            Statement::CreateView {
                name,
                columns,
                query,
                ..
            } => self.harvest_create_view(name, columns, query, index),
            Statement::Update {
                table,
                assignments,
                from,
                selection,
                ..
            } => self.harvest_update(table, assignments, from.as_ref(), selection.as_ref(), index),
            Statement::Delete(delete) => self.harvest_delete(delete),
            Statement::Merge { table, .. } => {
                if let TableFactor::Table { name, .. } = table {
                    self.record_table(name);
                }
            }
            Statement::Drop {
                object_type: ObjectType::Table | ObjectType::View,
                names,
                ..
            } => {
                for name in names {
                    self.record_table(name);
                }
            }
            Statement::Truncate { table_names, .. } => {
                for target in table_names {
                    self.record_table(&target.name);
                }
            }
            _ => {
                // GRANT, SET, ALTER, and other statements carry no
                // column-level metadata we track
            }
        }
    }

    /// SELECT INTO writes a table named in the statement itself; any other
    /// bare SELECT only yields metadata when the request names a table to
    /// attribute its output columns to.
    fn harvest_bare_select(&mut self, query: &Query, index: usize) {
        if let Some(into_name) = select_into_target(query) {
            let output = self.analyze_query(query, &CteMap::new(), index);
            let (schema, table) = split_object_name(&into_name);
            self.merge_output(schema, &table, output.columns, output.filters);
            return;
        }
        let Some(target) = self.request.target_table.clone() else {
            self.push_issue(
                Issue::warning(
                    NO_METADATA,
                    "SELECT statement has no target table; provide a table name to record its output columns",
                )
                .with_statement(index),
            );
            return;
        };
        let output = self.analyze_query(query, &CteMap::new(), index);
        let (schema, table) = scope::split_table_path(&target);
        self.merge_output(schema, &table, output.columns, output.filters);
    }

    /// Records a table entry with no column information (DROP, DELETE,
    /// MERGE targets).
    fn record_table(&mut self, name: &ObjectName) {
        let (schema, table) = split_object_name(name);
        self.table_index(schema, &table);
    }

    fn merge_output(
        &mut self,
        schema: Option<String>,
        name: &str,
        columns: Vec<ColumnMetadata>,
        filters: Vec<FilterPredicate>,
    ) {
        let index = self.table_index(schema, name);
        let entry = &mut self.tables[index];
        for column in columns {
            merge_column(entry, column);
        }
        for filter in filters {
            if !entry.filters.contains(&filter) {
                entry.filters.push(filter);
            }
        }
    }

    /// Finds or creates the table entry for `(schema, name)`, applying the
    /// request's default schema to unqualified names.
    fn table_index(&mut self, schema: Option<String>, name: &str) -> usize {
        let schema = schema.or_else(|| self.request.default_schema.clone());
        let existing = self.tables.iter().position(|t| {
            t.name.eq_ignore_ascii_case(name)
                && match (&t.schema, &schema) {
                    (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
                    (None, None) => true,
                    _ => false,
                }
        });
        match existing {
            Some(index) => index,
            None => {
                self.tables.push(TableMetadata::new(schema, name));
                self.tables.len() - 1
            }
        }
    }

    fn push_issue(&mut self, issue: Issue) {
        let issue = match &self.request.source_name {
            Some(source) => issue.with_source_name(source.clone()),
            None => issue,
        };
        self.issues.push(issue);
    }

    fn finish(mut self, statement_count: usize) -> ExtractResult {
        if self.tables.is_empty() {
            self.push_issue(Issue::error(
                NO_METADATA,
                "No table or column metadata found",
            ));
        }

        let column_count = self.tables.iter().map(|t| t.columns.len()).sum();
        let issue_count = IssueCount::tally(&self.issues);
        let summary = Summary {
            statement_count,
            table_count: self.tables.len(),
            column_count,
            has_errors: issue_count.errors > 0,
            issue_count,
        };

        ExtractResult {
            tables: self.tables,
            issues: self.issues,
            summary,
        }
    }
}

fn select_into_target(query: &Query) -> Option<ObjectName> {
    if let sqlparser::ast::SetExpr::Select(select) = query.body.as_ref() {
        select.into.as_ref().map(|into| into.name.clone())
    } else {
        None
    }
}

/// Merges a column into a table entry, combining with an existing column of
/// the same name rather than duplicating it.
fn merge_column(table: &mut TableMetadata, column: ColumnMetadata) {
    match table
        .columns
        .iter_mut()
        .find(|c| c.name.eq_ignore_ascii_case(&column.name))
    {
        Some(existing) => {
            if existing.data_type.is_none() {
                existing.data_type = column.data_type;
            }
            if existing.expression.is_none() {
                existing.expression = column.expression;
            }
            if existing.note.is_none() {
                existing.note = column.note;
            }
            for origin in column.origins {
                if !existing.origins.contains(&origin) {
                    existing.origins.push(origin);
                }
            }
        }
        None => table.columns.push(column),
    }
}

/// Splits an object name into (schema, table), keeping the last two
/// components and dropping any catalog prefix.
pub(crate) fn split_object_name(name: &ObjectName) -> (Option<String>, String) {
    let mut parts: Vec<String> = name
        .0
        .iter()
        .map(|part| {
            part.as_ident()
                .map(|i| i.value.clone())
                .unwrap_or_else(|| part.to_string())
        })
        .collect();
    match parts.len() {
        0 => (None, String::new()),
        1 => (None, parts.remove(0)),
        n => {
            let table = parts.remove(n - 1);
            let schema = parts.remove(n - 2);
            (Some(schema), table)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Dialect;

    fn request(sql: &str) -> ExtractRequest {
        ExtractRequest {
            sql: sql.to_string(),
            dialect: Dialect::Generic,
            default_schema: None,
            target_table: None,
            source_name: None,
        }
    }

    #[test]
    fn test_parse_error_reported_as_issue() {
        let result = extract(&request("SELECT * FROM"));
        assert!(result.summary.has_errors);
        assert!(result
            .issues
            .iter()
            .any(|i| i.code == PARSE_ERROR));
        assert!(result.tables.is_empty());
    }

    #[test]
    fn test_empty_result_reports_no_metadata() {
        let result = extract(&request("SELECT 1"));
        assert!(result
            .issues
            .iter()
            .any(|i| i.code == NO_METADATA));
    }

    #[test]
    fn test_bare_select_with_target_table() {
        let mut req = request("SELECT id, name FROM users");
        req.target_table = Some("users_report".to_string());
        let result = extract(&req);
        assert_eq!(result.tables.len(), 1);
        assert_eq!(result.tables[0].name, "users_report");
        assert_eq!(result.tables[0].columns.len(), 2);
        assert_eq!(
            result.tables[0].columns[0].origins[0].table.as_deref(),
            Some("users")
        );
    }

    #[test]
    fn test_default_schema_applied_to_unqualified_target() {
        let mut req = request("CREATE TABLE daily (id INT)");
        req.default_schema = Some("analytics".to_string());
        let result = extract(&req);
        assert_eq!(result.tables[0].schema.as_deref(), Some("analytics"));
    }

    #[test]
    fn test_statements_merge_into_one_table_entry() {
        let sql = "CREATE TABLE t (id INT); INSERT INTO t (id) SELECT user_id FROM events";
        let result = extract(&request(sql));
        assert_eq!(result.tables.len(), 1);
        let t = &result.tables[0];
        assert_eq!(t.name, "t");
        assert_eq!(t.columns.len(), 1);
        assert_eq!(t.columns[0].data_type.as_deref(), Some("INT"));
        assert_eq!(t.columns[0].origins[0].table.as_deref(), Some("events"));
        assert_eq!(t.columns[0].origins[0].column, "user_id");
    }

    #[test]
    fn test_source_name_attached_to_issues() {
        let mut req = request("NOT VALID SQL AT ALL ???");
        req.source_name = Some("jobs/load.sql".to_string());
        let result = extract(&req);
        assert!(result
            .issues
            .iter()
            .all(|i| i.source_name.as_deref() == Some("jobs/load.sql")));
    }

    #[test]
    fn test_split_object_name_drops_catalog() {
        let statements =
            crate::parser::parse_sql("SELECT * FROM warehouse.sales.orders").unwrap();
        let Statement::Query(query) = &statements[0] else {
            panic!("expected query");
        };
        let sqlparser::ast::SetExpr::Select(select) = query.body.as_ref() else {
            panic!("expected select");
        };
        let TableFactor::Table { name, .. } = &select.from[0].relation else {
            panic!("expected table");
        };
        assert_eq!(
            split_object_name(name),
            (Some("sales".to_string()), "orders".to_string())
        );
    }
}
