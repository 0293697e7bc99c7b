//! Flattening of extraction results into catalog CSV rows.
//!
//! Each row pairs one output column with one of its source columns; columns
//! with several origins produce several rows, and tables recorded without
//! column detail (DROP/DELETE targets) produce a single table-level row.

use serde::Serialize;
use sqlharvest_core::{
    ColumnMetadata, ColumnOrigin, ExtractResult, FilterClauseType, TableMetadata,
};

/// Placeholder for column types the SQL does not declare.
const UNKNOWN_TYPE: &str = "NA";

/// Catalog names supplied on the command line, repeated on every row.
#[derive(Debug, Clone, Default)]
pub struct RowContext {
    pub database: Option<String>,
    pub cluster: Option<String>,
    pub source_database: Option<String>,
    pub source_cluster: Option<String>,
}

/// One line of catalog output. Field order defines the CSV column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogRow {
    pub filename: String,
    pub database_name: String,
    pub cluster_name: String,
    pub schema_name: String,
    pub table_name: String,
    pub column_name: String,
    pub column_data_type: String,
    pub expression: String,
    pub filter_type: String,
    pub filter: String,
    pub message: String,
    pub source_database_name: String,
    pub source_cluster_name: String,
    pub source_schema_name: String,
    pub source_table_name: String,
    pub source_column_name: String,
}

impl CatalogRow {
    pub const HEADER: [&'static str; 16] = [
        "filename",
        "database_name",
        "cluster_name",
        "schema_name",
        "table_name",
        "column_name",
        "column_data_type",
        "expression",
        "filter_type",
        "filter",
        "message",
        "source_database_name",
        "source_cluster_name",
        "source_schema_name",
        "source_table_name",
        "source_column_name",
    ];
}

/// Flattens one extraction result into rows, attributing them to `filename`.
pub fn result_to_rows(filename: &str, result: &ExtractResult, ctx: &RowContext) -> Vec<CatalogRow> {
    let mut rows = Vec::new();
    for table in &result.tables {
        append_table_rows(filename, table, ctx, &mut rows);
    }
    rows
}

fn append_table_rows(
    filename: &str,
    table: &TableMetadata,
    ctx: &RowContext,
    rows: &mut Vec<CatalogRow>,
) {
    let (filter_type, filter) = table_filter(table);

    if table.columns.is_empty() {
        rows.push(make_row(
            filename,
            ctx,
            table,
            None,
            None,
            &filter_type,
            &filter,
        ));
        return;
    }

    for column in &table.columns {
        if column.origins.is_empty() {
            rows.push(make_row(
                filename,
                ctx,
                table,
                Some(column),
                None,
                &filter_type,
                &filter,
            ));
        } else {
            for origin in &column.origins {
                rows.push(make_row(
                    filename,
                    ctx,
                    table,
                    Some(column),
                    Some(origin),
                    &filter_type,
                    &filter,
                ));
            }
        }
    }
}

/// A table's filter columns report its first WHERE predicate, falling back
/// to the first HAVING predicate.
fn table_filter(table: &TableMetadata) -> (String, String) {
    let predicate = table
        .filters
        .iter()
        .find(|f| f.clause_type == FilterClauseType::Where)
        .or_else(|| table.filters.first());
    match predicate {
        Some(p) => (p.clause_type.as_str().to_string(), p.expression.clone()),
        None => (String::new(), String::new()),
    }
}

fn make_row(
    filename: &str,
    ctx: &RowContext,
    table: &TableMetadata,
    column: Option<&ColumnMetadata>,
    origin: Option<&ColumnOrigin>,
    filter_type: &str,
    filter: &str,
) -> CatalogRow {
    CatalogRow {
        filename: filename.to_string(),
        database_name: ctx.database.clone().unwrap_or_default(),
        cluster_name: ctx.cluster.clone().unwrap_or_default(),
        schema_name: table.schema.clone().unwrap_or_default(),
        table_name: table.name.clone(),
        column_name: column.map(|c| c.name.clone()).unwrap_or_default(),
        column_data_type: column
            .map(|c| c.data_type.clone().unwrap_or_else(|| UNKNOWN_TYPE.to_string()))
            .unwrap_or_default(),
        expression: column
            .and_then(|c| c.expression.clone())
            .unwrap_or_default(),
        filter_type: filter_type.to_string(),
        filter: filter.to_string(),
        message: column.and_then(|c| c.note.clone()).unwrap_or_default(),
        source_database_name: ctx.source_database.clone().unwrap_or_default(),
        source_cluster_name: ctx.source_cluster.clone().unwrap_or_default(),
        source_schema_name: origin
            .and_then(|o| o.schema.clone())
            .unwrap_or_default(),
        source_table_name: origin.and_then(|o| o.table.clone()).unwrap_or_default(),
        source_column_name: origin.map(|o| o.column.clone()).unwrap_or_default(),
    }
}
