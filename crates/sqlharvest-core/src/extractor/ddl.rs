//! Harvesting of DDL and DML statements: CREATE TABLE/VIEW, INSERT, UPDATE,
//! DELETE.

use sqlparser::ast::{
    Assignment, AssignmentTarget, CreateTable, Delete, Expr, FromTable, ObjectName, Query,
    TableFactor, TableObject, TableWithJoins, UpdateTableFromKind, ViewColumnDef,
};

use super::scope::Scope;
use super::select::{CteMap, QueryOutput};
use super::{split_object_name, Extractor};
use crate::types::{ColumnMetadata, FilterClauseType, FilterPredicate};

impl Extractor<'_> {
    pub(super) fn harvest_create_table(&mut self, create: &CreateTable, statement_index: usize) {
        let (schema, table) = split_object_name(&create.name);

        let mut columns: Vec<ColumnMetadata> = create
            .columns
            .iter()
            .map(|col| {
                let mut column = ColumnMetadata::named(col.name.value.clone());
                column.data_type = Some(col.data_type.to_string());
                column
            })
            .collect();

        let mut filters = Vec::new();
        if let Some(query) = &create.query {
            // CTAS: the query defines the columns (or annotates declared ones)
            let output = self.analyze_query(query, &CteMap::new(), statement_index);
            if columns.is_empty() {
                columns = output.columns;
            } else {
                for (declared, derived) in columns.iter_mut().zip(output.columns) {
                    declared.expression = derived.expression;
                    declared.origins = derived.origins;
                    declared.note = derived.note;
                }
            }
            filters = output.filters;
        }

        self.merge_output(schema, &table, columns, filters);
    }

    pub(super) fn harvest_create_view(
        &mut self,
        name: &ObjectName,
        view_columns: &[ViewColumnDef],
        query: &Query,
        statement_index: usize,
    ) {
        let (schema, table) = split_object_name(name);
        let output = self.analyze_query(query, &CteMap::new(), statement_index);

        let mut columns = output.columns;
        // Explicit view column list renames the projection positionally
        for (i, view_col) in view_columns.iter().enumerate() {
            if let Some(column) = columns.get_mut(i) {
                column.name = view_col.name.value.clone();
                if let Some(data_type) = &view_col.data_type {
                    column.data_type = Some(data_type.to_string());
                }
            }
        }

        self.merge_output(schema, &table, columns, output.filters);
    }

    pub(super) fn harvest_insert(
        &mut self,
        insert: &sqlparser::ast::Insert,
        statement_index: usize,
    ) {
        let TableObject::TableName(name) = &insert.table else {
            return;
        };
        let (schema, table) = split_object_name(name);

        let QueryOutput {
            columns: derived_columns,
            filters,
        } = match &insert.source {
            Some(query) => self.analyze_query(query, &CteMap::new(), statement_index),
            None => QueryOutput::default(),
        };

        let columns = if insert.columns.is_empty() {
            derived_columns
        } else {
            // Explicit column list names the targets; source query columns
            // (if any) pair up positionally. VALUES sources yield names only.
            let mut derived = derived_columns.into_iter();
            insert
                .columns
                .iter()
                .map(|ident| match derived.next() {
                    Some(mut column) => {
                        column.name = ident.value.clone();
                        column
                    }
                    None => ColumnMetadata::named(ident.value.clone()),
                })
                .collect()
        };

        self.merge_output(schema, &table, columns, filters);
    }

    pub(super) fn harvest_update(
        &mut self,
        table: &TableWithJoins,
        assignments: &[Assignment],
        from: Option<&UpdateTableFromKind>,
        selection: Option<&Expr>,
        statement_index: usize,
    ) {
        let TableFactor::Table { name, .. } = &table.relation else {
            return;
        };
        let (schema, target) = split_object_name(name);

        let ctes = CteMap::new();
        let mut scope = Scope::default();
        self.add_table_factor(&table.relation, &mut scope, &ctes, statement_index);
        for join in &table.joins {
            self.add_table_factor(&join.relation, &mut scope, &ctes, statement_index);
        }
        if let Some(kind) = from {
            let from_tables = match kind {
                UpdateTableFromKind::BeforeSet(tables) | UpdateTableFromKind::AfterSet(tables) => {
                    tables
                }
            };
            for table_with_joins in from_tables {
                self.add_table_factor(
                    &table_with_joins.relation,
                    &mut scope,
                    &ctes,
                    statement_index,
                );
                for join in &table_with_joins.joins {
                    self.add_table_factor(&join.relation, &mut scope, &ctes, statement_index);
                }
            }
        }

        let mut columns = Vec::new();
        for assignment in assignments {
            for target_column in assignment_target_columns(&assignment.target) {
                let index = columns.len();
                columns.push(self.column_from_expr(
                    &assignment.value,
                    Some(target_column),
                    index,
                    &scope,
                    statement_index,
                ));
            }
        }

        let mut filters = Vec::new();
        if let Some(expr) = selection {
            filters.push(FilterPredicate {
                expression: expr.to_string(),
                clause_type: FilterClauseType::Where,
            });
        }

        self.merge_output(schema, &target, columns, filters);
    }

    pub(super) fn harvest_delete(&mut self, delete: &Delete) {
        if !delete.tables.is_empty() {
            for name in &delete.tables {
                self.record_table(name);
            }
            return;
        }
        let from_tables = match &delete.from {
            FromTable::WithFromKeyword(tables) | FromTable::WithoutKeyword(tables) => tables,
        };
        for table_with_joins in from_tables {
            if let TableFactor::Table { name, .. } = &table_with_joins.relation {
                self.record_table(name);
            }
        }
    }
}

fn assignment_target_columns(target: &AssignmentTarget) -> Vec<String> {
    match target {
        AssignmentTarget::ColumnName(name) => vec![split_object_name(name).1],
        AssignmentTarget::Tuple(names) => {
            names.iter().map(|name| split_object_name(name).1).collect()
        }
    }
}
