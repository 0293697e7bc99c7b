//! Name scope for the relations visible to a SELECT's column references.
//!
//! A scope holds one entry per FROM-clause relation (base tables, CTEs,
//! derived subqueries), keyed by alias when present. Column references are
//! resolved against it to produce source-column origins.

use crate::types::{ColumnMetadata, ColumnOrigin};

/// A relation visible to column references.
#[derive(Debug, Clone)]
pub(crate) enum Relation {
    /// A base table reference, possibly schema-qualified.
    Table {
        schema: Option<String>,
        name: String,
    },
    /// A relation with known output columns (CTE or derived subquery).
    Derived { columns: Vec<ColumnMetadata> },
}

#[derive(Debug, Clone)]
pub(crate) struct ScopeRelation {
    /// Lookup key: the alias when present, else the simple table name.
    pub key: String,
    pub relation: Relation,
}

/// The relations in scope for one SELECT, in FROM-clause order.
#[derive(Debug, Default)]
pub(crate) struct Scope {
    pub relations: Vec<ScopeRelation>,
}

/// Outcome of resolving a column reference against a scope.
#[derive(Debug)]
pub(crate) enum Resolution {
    /// Resolved to source-column origins (possibly empty for columns that
    /// a derived relation computes from literals).
    Origins(Vec<ColumnOrigin>),
    /// No relation in scope could supply the column.
    Unresolved,
    /// More than one relation could supply an unqualified column.
    Ambiguous,
}

impl Scope {
    pub fn add(&mut self, key: String, relation: Relation) {
        self.relations.push(ScopeRelation { key, relation });
    }

    /// Finds a relation by key, case-insensitively.
    pub fn find(&self, key: &str) -> Option<&ScopeRelation> {
        self.relations
            .iter()
            .find(|r| r.key.eq_ignore_ascii_case(key))
    }

    /// Resolves a column reference to its source origins.
    ///
    /// A qualifier that matches no relation in scope is treated as a direct
    /// (possibly schema-qualified) table path, since SQL permits referencing
    /// a table by its name without an alias being registered here.
    pub fn resolve(&self, qualifier: Option<&str>, column: &str) -> Resolution {
        match qualifier {
            Some(qual) => match self.find(qual) {
                Some(scoped) => match resolve_in_relation(&scoped.relation, column) {
                    Some(origins) => Resolution::Origins(origins),
                    None => Resolution::Unresolved,
                },
                None => {
                    let (schema, table) = split_table_path(qual);
                    Resolution::Origins(vec![ColumnOrigin {
                        schema,
                        table: Some(table),
                        column: column.to_string(),
                    }])
                }
            },
            None => match self.relations.len() {
                0 => Resolution::Unresolved,
                1 => match resolve_in_relation(&self.relations[0].relation, column) {
                    Some(origins) => Resolution::Origins(origins),
                    None => Resolution::Unresolved,
                },
                _ => Resolution::Ambiguous,
            },
        }
    }
}

/// Resolves a column within a single relation.
///
/// Returns `None` when a derived relation does not expose the column.
/// Base tables always resolve since their column set is unknown.
fn resolve_in_relation(relation: &Relation, column: &str) -> Option<Vec<ColumnOrigin>> {
    match relation {
        Relation::Table { schema, name } => Some(vec![ColumnOrigin {
            schema: schema.clone(),
            table: Some(name.clone()),
            column: column.to_string(),
        }]),
        Relation::Derived { columns } => {
            if let Some(col) = columns
                .iter()
                .find(|c| c.name.eq_ignore_ascii_case(column))
            {
                return Some(col.origins.clone());
            }
            // A wildcard output column passes any requested name through to
            // its underlying tables.
            let wildcard_origins: Vec<ColumnOrigin> = columns
                .iter()
                .filter(|c| c.name == "*")
                .flat_map(|c| c.origins.iter())
                .map(|origin| ColumnOrigin {
                    schema: origin.schema.clone(),
                    table: origin.table.clone(),
                    column: column.to_string(),
                })
                .collect();
            if wildcard_origins.is_empty() {
                None
            } else {
                Some(wildcard_origins)
            }
        }
    }
}

/// Splits a dotted table path into (schema, table), keeping only the last
/// two components.
pub(crate) fn split_table_path(path: &str) -> (Option<String>, String) {
    match path.rsplit_once('.') {
        Some((qualifier, table)) => {
            let schema = qualifier
                .rsplit('.')
                .next()
                .map(|s| s.to_string())
                .filter(|s| !s.is_empty());
            (schema, table.to_string())
        }
        None => (None, path.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_scope() -> Scope {
        let mut scope = Scope::default();
        scope.add(
            "o".to_string(),
            Relation::Table {
                schema: Some("sales".to_string()),
                name: "orders".to_string(),
            },
        );
        scope
    }

    #[test]
    fn test_qualified_resolution() {
        let scope = table_scope();
        let Resolution::Origins(origins) = scope.resolve(Some("o"), "amount") else {
            panic!("expected origins");
        };
        assert_eq!(origins[0].schema.as_deref(), Some("sales"));
        assert_eq!(origins[0].table.as_deref(), Some("orders"));
        assert_eq!(origins[0].column, "amount");
    }

    #[test]
    fn test_unqualified_single_relation() {
        let scope = table_scope();
        let Resolution::Origins(origins) = scope.resolve(None, "amount") else {
            panic!("expected origins");
        };
        assert_eq!(origins[0].table.as_deref(), Some("orders"));
    }

    #[test]
    fn test_unqualified_ambiguous() {
        let mut scope = table_scope();
        scope.add(
            "u".to_string(),
            Relation::Table {
                schema: None,
                name: "users".to_string(),
            },
        );
        assert!(matches!(scope.resolve(None, "id"), Resolution::Ambiguous));
    }

    #[test]
    fn test_unknown_qualifier_treated_as_table_path() {
        let scope = table_scope();
        let Resolution::Origins(origins) = scope.resolve(Some("crm.accounts"), "owner") else {
            panic!("expected origins");
        };
        assert_eq!(origins[0].schema.as_deref(), Some("crm"));
        assert_eq!(origins[0].table.as_deref(), Some("accounts"));
    }

    #[test]
    fn test_derived_relation_lookup() {
        let mut scope = Scope::default();
        let mut col = ColumnMetadata::named("total");
        col.origins.push(ColumnOrigin {
            schema: None,
            table: Some("orders".to_string()),
            column: "amount".to_string(),
        });
        scope.add(
            "t".to_string(),
            Relation::Derived {
                columns: vec![col],
            },
        );

        let Resolution::Origins(origins) = scope.resolve(Some("t"), "total") else {
            panic!("expected origins");
        };
        assert_eq!(origins[0].column, "amount");

        assert!(matches!(
            scope.resolve(Some("t"), "missing"),
            Resolution::Unresolved
        ));
    }

    #[test]
    fn test_derived_wildcard_passthrough() {
        let mut scope = Scope::default();
        let mut star = ColumnMetadata::named("*");
        star.origins.push(ColumnOrigin {
            schema: Some("raw".to_string()),
            table: Some("events".to_string()),
            column: "*".to_string(),
        });
        scope.add(
            "e".to_string(),
            Relation::Derived {
                columns: vec![star],
            },
        );

        let Resolution::Origins(origins) = scope.resolve(Some("e"), "event_id") else {
            panic!("expected origins");
        };
        assert_eq!(origins[0].table.as_deref(), Some("events"));
        assert_eq!(origins[0].column, "event_id");
    }

    #[test]
    fn test_split_table_path() {
        assert_eq!(split_table_path("orders"), (None, "orders".to_string()));
        assert_eq!(
            split_table_path("sales.orders"),
            (Some("sales".to_string()), "orders".to_string())
        );
        assert_eq!(
            split_table_path("warehouse.sales.orders"),
            (Some("sales".to_string()), "orders".to_string())
        );
    }
}
