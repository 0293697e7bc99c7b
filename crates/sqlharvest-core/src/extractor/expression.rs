//! Expression traversal for column reference extraction.
//!
//! Walks SQL expressions to find the column references feeding an output
//! column, skipping subqueries (which carry their own scope) and guarding
//! against pathological nesting depth.

use sqlparser::ast::{self, Expr, FunctionArg, FunctionArgExpr};
#[cfg(feature = "tracing")]
use tracing::debug;

/// Maximum recursion depth for expression traversal to prevent stack overflow
/// on maliciously crafted or deeply nested SQL expressions.
pub(crate) const MAX_RECURSION_DEPTH: usize = 100;

/// A column reference found in an expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ColumnRef {
    /// Qualifier as written (alias, table, or dotted table path)
    pub qualifier: Option<String>,
    pub column: String,
}

/// Extracts all column references from an expression.
///
/// Returns the references in source order along with a flag indicating
/// whether the depth guard cut the traversal short. Subquery columns are not
/// included as they are resolved in their own scope.
pub(crate) fn extract_column_refs(expr: &Expr) -> (Vec<ColumnRef>, bool) {
    let mut refs = Vec::new();
    let depth_limited = collect_column_refs(expr, &mut refs, 0);
    (refs, depth_limited)
}

fn collect_column_refs(expr: &Expr, refs: &mut Vec<ColumnRef>, depth: usize) -> bool {
    if depth > MAX_RECURSION_DEPTH {
        #[cfg(feature = "tracing")]
        debug!(depth, "Max recursion depth exceeded in collect_column_refs");
        return true;
    }
    let next_depth = depth + 1;
    let mut depth_limited = false;

    match expr {
        Expr::Identifier(ident) => {
            refs.push(ColumnRef {
                qualifier: None,
                column: ident.value.clone(),
            });
        }
        Expr::CompoundIdentifier(parts) => {
            if parts.len() >= 2 {
                let qualifier = parts[..parts.len() - 1]
                    .iter()
                    .map(|i| i.value.as_str())
                    .collect::<Vec<_>>()
                    .join(".");
                let column = parts.last().map(|i| i.value.clone()).unwrap_or_default();
                refs.push(ColumnRef {
                    qualifier: Some(qualifier),
                    column,
                });
            }
        }
        Expr::BinaryOp { left, right, .. } => {
            depth_limited |= collect_column_refs(left, refs, next_depth);
            depth_limited |= collect_column_refs(right, refs, next_depth);
        }
        Expr::UnaryOp { expr, .. } => {
            depth_limited |= collect_column_refs(expr, refs, next_depth);
        }
        Expr::Function(func) => match &func.args {
            ast::FunctionArguments::List(arg_list) => {
                for arg in &arg_list.args {
                    match arg {
                        FunctionArg::Unnamed(FunctionArgExpr::Expr(e))
                        | FunctionArg::Named {
                            arg: FunctionArgExpr::Expr(e),
                            ..
                        } => {
                            depth_limited |= collect_column_refs(e, refs, next_depth);
                        }
                        _ => {}
                    }
                }
            }
            ast::FunctionArguments::Subquery(_) => {}
            ast::FunctionArguments::None => {}
        },
        Expr::Case {
            operand,
            conditions,
            else_result,
            ..
        } => {
            if let Some(op) = operand {
                depth_limited |= collect_column_refs(op, refs, next_depth);
            }
            for case_when in conditions {
                depth_limited |= collect_column_refs(&case_when.condition, refs, next_depth);
                depth_limited |= collect_column_refs(&case_when.result, refs, next_depth);
            }
            if let Some(el) = else_result {
                depth_limited |= collect_column_refs(el, refs, next_depth);
            }
        }
        Expr::Cast { expr, .. } => {
            depth_limited |= collect_column_refs(expr, refs, next_depth);
        }
        Expr::Nested(inner) => {
            depth_limited |= collect_column_refs(inner, refs, next_depth);
        }
        Expr::Subquery(_) | Expr::Exists { .. } => {
            // Subquery columns are handled in their own scope
        }
        Expr::InSubquery { expr, .. } => {
            depth_limited |= collect_column_refs(expr, refs, next_depth);
        }
        Expr::InList { expr, list, .. } => {
            depth_limited |= collect_column_refs(expr, refs, next_depth);
            for item in list {
                depth_limited |= collect_column_refs(item, refs, next_depth);
            }
        }
        Expr::Between {
            expr, low, high, ..
        } => {
            depth_limited |= collect_column_refs(expr, refs, next_depth);
            depth_limited |= collect_column_refs(low, refs, next_depth);
            depth_limited |= collect_column_refs(high, refs, next_depth);
        }
        Expr::IsNull(e) | Expr::IsNotNull(e) => {
            depth_limited |= collect_column_refs(e, refs, next_depth);
        }
        Expr::IsFalse(e) | Expr::IsNotFalse(e) | Expr::IsTrue(e) | Expr::IsNotTrue(e) => {
            depth_limited |= collect_column_refs(e, refs, next_depth);
        }
        Expr::Like { expr, pattern, .. } | Expr::ILike { expr, pattern, .. } => {
            depth_limited |= collect_column_refs(expr, refs, next_depth);
            depth_limited |= collect_column_refs(pattern, refs, next_depth);
        }
        Expr::Tuple(exprs) => {
            for e in exprs {
                depth_limited |= collect_column_refs(e, refs, next_depth);
            }
        }
        Expr::Extract { expr, .. } => {
            depth_limited |= collect_column_refs(expr, refs, next_depth);
        }
        Expr::Substring {
            expr,
            substring_from,
            substring_for,
            ..
        } => {
            depth_limited |= collect_column_refs(expr, refs, next_depth);
            if let Some(from) = substring_from {
                depth_limited |= collect_column_refs(from, refs, next_depth);
            }
            if let Some(for_expr) = substring_for {
                depth_limited |= collect_column_refs(for_expr, refs, next_depth);
            }
        }
        _ => {
            // Other expressions don't contain column references
        }
    }

    depth_limited
}

/// True when the expression is a plain column reference rather than a
/// derived value.
pub(crate) fn is_bare_column(expr: &Expr) -> bool {
    matches!(expr, Expr::Identifier(_) | Expr::CompoundIdentifier(_))
}

/// Derives a column name from an expression for output column labeling.
///
/// For simple column references, returns the column name. For functions,
/// returns the function name. For other expressions, returns a generated
/// label like `col_0`, `col_1`, etc.
pub(crate) fn derive_column_name(expr: &Expr, index: usize) -> String {
    match expr {
        Expr::Identifier(ident) => ident.value.clone(),
        Expr::CompoundIdentifier(parts) => parts
            .last()
            .map(|i| i.value.clone())
            .unwrap_or_else(|| format!("col_{index}")),
        Expr::Function(func) => func.name.to_string().to_lowercase(),
        _ => format!("col_{index}"),
    }
}
