//! Query projection analysis: output columns, their origins, and filters.

use std::collections::HashMap;

use sqlparser::ast::{
    Expr, ObjectName, Query, Select, SelectItem, SelectItemQualifiedWildcardKind, SetExpr,
    TableFactor,
};

use super::expression::{derive_column_name, extract_column_refs, is_bare_column};
use super::scope::{Relation, Resolution, Scope, ScopeRelation};
use super::{split_object_name, Extractor};
use crate::types::issue_codes::{AMBIGUOUS_COLUMN, RECURSION_LIMIT, UNRESOLVED_REFERENCE};
use crate::types::{
    ColumnMetadata, ColumnOrigin, FilterClauseType, FilterPredicate, Issue,
};

/// CTE name (lowercased) to its output columns, accumulated in declaration
/// order so later CTEs can reference earlier ones.
pub(crate) type CteMap = HashMap<String, Vec<ColumnMetadata>>;

/// The analyzed output of a query: projected columns and captured filters.
#[derive(Debug, Default)]
pub(crate) struct QueryOutput {
    pub columns: Vec<ColumnMetadata>,
    pub filters: Vec<FilterPredicate>,
}

impl Extractor<'_> {
    pub(super) fn analyze_query(
        &mut self,
        query: &Query,
        outer_ctes: &CteMap,
        statement_index: usize,
    ) -> QueryOutput {
        let mut ctes = outer_ctes.clone();
        if let Some(with) = &query.with {
            for cte in &with.cte_tables {
                let output = self.analyze_query(&cte.query, &ctes, statement_index);
                let mut columns = output.columns;
                // Explicit CTE column aliases override the projection names
                for (i, alias_col) in cte.alias.columns.iter().enumerate() {
                    if let Some(col) = columns.get_mut(i) {
                        col.name = alias_col.name.value.clone();
                    }
                }
                ctes.insert(cte.alias.name.value.to_lowercase(), columns);
            }
        }
        self.analyze_set_expr(&query.body, &ctes, statement_index)
    }

    fn analyze_set_expr(
        &mut self,
        body: &SetExpr,
        ctes: &CteMap,
        statement_index: usize,
    ) -> QueryOutput {
        match body {
            SetExpr::Select(select) => self.analyze_select(select, ctes, statement_index),
            SetExpr::Query(query) => self.analyze_query(query, ctes, statement_index),
            SetExpr::SetOperation { left, right, .. } => {
                // UNION/INTERSECT/EXCEPT branches contribute origins to the
                // left side's columns positionally.
                let mut output = self.analyze_set_expr(left, ctes, statement_index);
                let right_output = self.analyze_set_expr(right, ctes, statement_index);
                for (column, right_column) in
                    output.columns.iter_mut().zip(right_output.columns)
                {
                    for origin in right_column.origins {
                        if !column.origins.contains(&origin) {
                            column.origins.push(origin);
                        }
                    }
                }
                output.filters.extend(right_output.filters);
                output
            }
            _ => QueryOutput::default(),
        }
    }

    fn analyze_select(
        &mut self,
        select: &Select,
        ctes: &CteMap,
        statement_index: usize,
    ) -> QueryOutput {
        let mut scope = Scope::default();
        for table_with_joins in &select.from {
            self.add_table_factor(&table_with_joins.relation, &mut scope, ctes, statement_index);
            for join in &table_with_joins.joins {
                self.add_table_factor(&join.relation, &mut scope, ctes, statement_index);
            }
        }

        let mut columns = Vec::new();
        for (index, item) in select.projection.iter().enumerate() {
            self.analyze_select_item(item, index, &scope, &mut columns, statement_index);
        }

        let mut filters = Vec::new();
        if let Some(selection) = &select.selection {
            filters.push(FilterPredicate {
                expression: selection.to_string(),
                clause_type: FilterClauseType::Where,
            });
        }
        if let Some(having) = &select.having {
            filters.push(FilterPredicate {
                expression: having.to_string(),
                clause_type: FilterClauseType::Having,
            });
        }

        QueryOutput { columns, filters }
    }

    pub(super) fn add_table_factor(
        &mut self,
        factor: &TableFactor,
        scope: &mut Scope,
        ctes: &CteMap,
        statement_index: usize,
    ) {
        match factor {
            TableFactor::Table { name, alias, .. } => {
                let (schema, table) = split_object_name(name);
                // Unqualified names may refer to a CTE declared earlier
                if name.0.len() == 1 {
                    if let Some(columns) = ctes.get(&table.to_lowercase()) {
                        let key = alias
                            .as_ref()
                            .map(|a| a.name.value.clone())
                            .unwrap_or_else(|| table.clone());
                        scope.add(key, Relation::Derived {
                            columns: columns.clone(),
                        });
                        return;
                    }
                }
                let key = alias
                    .as_ref()
                    .map(|a| a.name.value.clone())
                    .unwrap_or_else(|| table.clone());
                scope.add(key, Relation::Table { schema, name: table });
            }
            TableFactor::Derived {
                subquery, alias, ..
            } => {
                let output = self.analyze_query(subquery, ctes, statement_index);
                let key = alias
                    .as_ref()
                    .map(|a| a.name.value.clone())
                    .unwrap_or_default();
                scope.add(key, Relation::Derived {
                    columns: output.columns,
                });
            }
            TableFactor::NestedJoin {
                table_with_joins, ..
            } => {
                self.add_table_factor(
                    &table_with_joins.relation,
                    scope,
                    ctes,
                    statement_index,
                );
                for join in &table_with_joins.joins {
                    self.add_table_factor(&join.relation, scope, ctes, statement_index);
                }
            }
            _ => {}
        }
    }

    fn analyze_select_item(
        &mut self,
        item: &SelectItem,
        index: usize,
        scope: &Scope,
        columns: &mut Vec<ColumnMetadata>,
        statement_index: usize,
    ) {
        match item {
            SelectItem::UnnamedExpr(expr) => {
                columns.push(self.column_from_expr(expr, None, index, scope, statement_index));
            }
            SelectItem::ExprWithAlias { expr, alias } => {
                columns.push(self.column_from_expr(
                    expr,
                    Some(alias.value.clone()),
                    index,
                    scope,
                    statement_index,
                ));
            }
            SelectItem::Wildcard(_) => self.expand_wildcard(None, scope, columns),
            SelectItem::QualifiedWildcard(kind, _) => {
                if let SelectItemQualifiedWildcardKind::ObjectName(name) = kind {
                    self.expand_wildcard(Some(name), scope, columns);
                }
            }
        }
    }

    pub(super) fn column_from_expr(
        &mut self,
        expr: &Expr,
        alias: Option<String>,
        index: usize,
        scope: &Scope,
        statement_index: usize,
    ) -> ColumnMetadata {
        let name = alias.unwrap_or_else(|| derive_column_name(expr, index));
        let mut column = ColumnMetadata::named(name);
        if !is_bare_column(expr) {
            column.expression = Some(expr.to_string());
        }

        let (refs, depth_limited) = extract_column_refs(expr);
        if depth_limited {
            self.push_issue(
                Issue::warning(
                    RECURSION_LIMIT,
                    format!(
                        "Expression for column '{}' exceeds the nesting depth limit; source columns may be incomplete",
                        column.name
                    ),
                )
                .with_statement(statement_index),
            );
        }

        for col_ref in refs {
            match scope.resolve(col_ref.qualifier.as_deref(), &col_ref.column) {
                Resolution::Origins(origins) => {
                    for origin in origins {
                        if !column.origins.contains(&origin) {
                            column.origins.push(origin);
                        }
                    }
                }
                Resolution::Unresolved => {
                    let origin = ColumnOrigin {
                        schema: None,
                        table: None,
                        column: col_ref.column.clone(),
                    };
                    if !column.origins.contains(&origin) {
                        column.origins.push(origin);
                    }
                    set_note(
                        &mut column,
                        format!("unresolved reference to '{}'", col_ref.column),
                    );
                    self.push_issue(
                        Issue::warning(
                            UNRESOLVED_REFERENCE,
                            format!(
                                "Column reference '{}' could not be resolved to a table",
                                col_ref.column
                            ),
                        )
                        .with_statement(statement_index),
                    );
                }
                Resolution::Ambiguous => {
                    let origin = ColumnOrigin {
                        schema: None,
                        table: None,
                        column: col_ref.column.clone(),
                    };
                    if !column.origins.contains(&origin) {
                        column.origins.push(origin);
                    }
                    set_note(
                        &mut column,
                        format!("ambiguous reference to '{}'", col_ref.column),
                    );
                    self.push_issue(
                        Issue::warning(
                            AMBIGUOUS_COLUMN,
                            format!(
                                "Unqualified column '{}' matches more than one table in scope",
                                col_ref.column
                            ),
                        )
                        .with_statement(statement_index),
                    );
                }
            }
        }

        column
    }

    fn expand_wildcard(
        &mut self,
        qualifier: Option<&ObjectName>,
        scope: &Scope,
        columns: &mut Vec<ColumnMetadata>,
    ) {
        match qualifier {
            Some(name) => {
                let path = name
                    .0
                    .iter()
                    .map(|part| {
                        part.as_ident()
                            .map(|i| i.value.clone())
                            .unwrap_or_else(|| part.to_string())
                    })
                    .collect::<Vec<_>>()
                    .join(".");
                match scope.find(&path) {
                    Some(scoped) => push_relation_wildcard(scoped, columns),
                    None => {
                        // Not an alias in scope: treat as a direct table path
                        let (schema, table) = split_object_name(name);
                        columns.push(wildcard_column(schema, table));
                    }
                }
            }
            None => {
                for scoped in &scope.relations {
                    push_relation_wildcard(scoped, columns);
                }
            }
        }
    }
}

fn push_relation_wildcard(scoped: &ScopeRelation, columns: &mut Vec<ColumnMetadata>) {
    match &scoped.relation {
        Relation::Table { schema, name } => {
            columns.push(wildcard_column(schema.clone(), name.clone()));
        }
        Relation::Derived { columns: derived } => {
            columns.extend(derived.iter().cloned());
        }
    }
}

fn wildcard_column(schema: Option<String>, table: String) -> ColumnMetadata {
    let mut column = ColumnMetadata::named("*");
    column.note = Some("wildcard; source columns unknown without catalog access".to_string());
    column.origins.push(ColumnOrigin {
        schema,
        table: Some(table),
        column: "*".to_string(),
    });
    column
}

fn set_note(column: &mut ColumnMetadata, note: String) {
    if column.note.is_none() {
        column.note = Some(note);
    }
}
