//! SQLHarvest CLI - SQL metadata extraction for data catalogs

use anyhow::Result;
use clap::Parser;
use sqlharvest_core::{extract, ExtractRequest, ExtractResult, Severity};
use std::process::ExitCode;

use sqlharvest_cli::cli::Args;
use sqlharvest_cli::input;
use sqlharvest_cli::output;
use sqlharvest_cli::rows::{result_to_rows, CatalogRow, RowContext};

/// Extraction errors (parse failures, inputs that yielded no metadata).
const EXIT_FAILURE: u8 = 1;
/// Configuration error (unreadable input, missing --table for inline SQL).
const EXIT_CONFIG_ERROR: u8 = 66;

fn main() -> ExitCode {
    let args = Args::parse();

    match run(args) {
        Ok(has_errors) => {
            if has_errors {
                ExitCode::from(EXIT_FAILURE)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("sqlharvest: error: {e:#}");
            ExitCode::from(EXIT_CONFIG_ERROR)
        }
    }
}

fn run(args: Args) -> Result<bool> {
    let sources = input::resolve_input(&args.input, args.table.as_deref(), args.quiet)?;
    let dialect = args.dialect();

    let ctx = RowContext {
        database: args.database.clone(),
        cluster: args.cluster.clone(),
        source_database: args.source_database.clone(),
        source_cluster: args.source_cluster.clone(),
    };

    let mut rows: Vec<CatalogRow> = Vec::new();
    let mut has_errors = false;

    for source in &sources {
        let result = extract(&ExtractRequest {
            sql: source.sql.clone(),
            dialect,
            default_schema: args.schema.clone(),
            target_table: source.target_table.clone(),
            source_name: (!source.name.is_empty()).then(|| source.name.clone()),
        });

        if !args.quiet {
            print_issues_to_stderr(&result);
        }
        has_errors |= result.summary.has_errors;
        rows.extend(result_to_rows(&source.name, &result, &ctx));
    }

    output::write_csv(&args.output, &rows)?;

    if !args.quiet {
        eprintln!(
            "sqlharvest: wrote {} row(s) to {}",
            rows.len(),
            args.output.display()
        );
    }

    Ok(has_errors)
}

fn print_issues_to_stderr(result: &ExtractResult) {
    for issue in &result.issues {
        let level = match issue.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        };

        let location = issue
            .source_name
            .as_deref()
            .map(|name| format!(" [{name}]"))
            .unwrap_or_default();

        eprintln!("sqlharvest: {level}:{location} {}", issue.message);
    }
}
