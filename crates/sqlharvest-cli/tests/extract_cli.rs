use std::process::Command;

use tempfile::tempdir;

fn sqlharvest() -> Command {
    Command::new(env!("CARGO_BIN_EXE_sqlharvest"))
}

#[test]
fn extracts_single_file_to_csv() {
    let dir = tempdir().expect("temp dir");
    let sql_path = dir.path().join("daily_orders.sql");
    let output_path = dir.path().join("catalog.csv");

    std::fs::write(
        &sql_path,
        "SELECT o.id, o.total FROM sales.orders o WHERE o.total > 0",
    )
    .expect("write sql");

    let output = sqlharvest()
        .args([
            "-i",
            sql_path.to_str().expect("sql path"),
            "-o",
            output_path.to_str().expect("output path"),
        ])
        .output()
        .expect("run CLI");

    assert!(output.status.success());
    let content = std::fs::read_to_string(&output_path).expect("output exists");
    let mut lines = content.lines();
    assert_eq!(
        lines.next().expect("header"),
        "filename,database_name,cluster_name,schema_name,table_name,column_name,\
         column_data_type,expression,filter_type,filter,message,source_database_name,\
         source_cluster_name,source_schema_name,source_table_name,source_column_name"
    );
    // File stem becomes the table name for bare SELECTs
    let first = lines.next().expect("data row");
    assert!(first.contains("daily_orders"));
    assert!(first.contains("orders"));
    assert!(first.contains("where"));
}

#[test]
fn extracts_directory_one_table_per_file() {
    let dir = tempdir().expect("temp dir");
    let sql_dir = dir.path().join("queries");
    std::fs::create_dir(&sql_dir).expect("create dir");
    std::fs::write(sql_dir.join("alpha.sql"), "SELECT id FROM users").expect("write sql");
    std::fs::write(sql_dir.join("beta.sql"), "SELECT total FROM orders").expect("write sql");
    let output_path = dir.path().join("catalog.csv");

    let status = sqlharvest()
        .args([
            "-i",
            sql_dir.to_str().expect("dir path"),
            "-o",
            output_path.to_str().expect("output path"),
            "--quiet",
        ])
        .status()
        .expect("run CLI");

    assert!(status.success());
    let content = std::fs::read_to_string(&output_path).expect("output exists");
    assert_eq!(content.lines().count(), 3);
    assert!(content.contains("alpha"));
    assert!(content.contains("beta"));
}

#[test]
fn inline_sql_requires_table_name() {
    let dir = tempdir().expect("temp dir");
    let output_path = dir.path().join("catalog.csv");

    let output = sqlharvest()
        .args([
            "-i",
            "SELECT id FROM users",
            "-o",
            output_path.to_str().expect("output path"),
        ])
        .output()
        .expect("run CLI");

    assert_eq!(output.status.code(), Some(66));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--table"));
}

#[test]
fn inline_sql_with_table_name() {
    let dir = tempdir().expect("temp dir");
    let output_path = dir.path().join("catalog.csv");

    let status = sqlharvest()
        .args([
            "-i",
            "SELECT user_id, amount FROM payments",
            "-o",
            output_path.to_str().expect("output path"),
            "-t",
            "payment_report",
            "--database",
            "warehouse",
            "--quiet",
        ])
        .status()
        .expect("run CLI");

    assert!(status.success());
    let content = std::fs::read_to_string(&output_path).expect("output exists");
    assert!(content.contains("payment_report"));
    assert!(content.contains("warehouse"));
    assert!(content.contains("payments"));
}

#[test]
fn missing_required_args_is_usage_error() {
    let output = sqlharvest().output().expect("run CLI");
    assert_eq!(output.status.code(), Some(2));

    let dir = tempdir().expect("temp dir");
    let output_path = dir.path().join("catalog.csv");
    let output = sqlharvest()
        .args(["-o", output_path.to_str().expect("output path")])
        .output()
        .expect("run CLI");
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn rejects_unknown_dialect() {
    let output = sqlharvest()
        .args(["-i", "SELECT 1", "-o", "out.csv", "--dialect", "cobol"])
        .output()
        .expect("run CLI");
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn parse_error_exits_nonzero_but_writes_csv() {
    let dir = tempdir().expect("temp dir");
    let sql_path = dir.path().join("broken.sql");
    let output_path = dir.path().join("catalog.csv");
    std::fs::write(&sql_path, "SELECT * FROM").expect("write sql");

    let output = sqlharvest()
        .args([
            "-i",
            sql_path.to_str().expect("sql path"),
            "-o",
            output_path.to_str().expect("output path"),
        ])
        .output()
        .expect("run CLI");

    assert_eq!(output.status.code(), Some(1));
    let content = std::fs::read_to_string(&output_path).expect("output exists");
    // Header only: nothing could be extracted
    assert_eq!(content.lines().count(), 1);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error"));
}

#[test]
fn table_flag_ignored_for_file_input_with_warning() {
    let dir = tempdir().expect("temp dir");
    let sql_path = dir.path().join("report.sql");
    let output_path = dir.path().join("catalog.csv");
    std::fs::write(&sql_path, "SELECT id FROM users").expect("write sql");

    let output = sqlharvest()
        .args([
            "-i",
            sql_path.to_str().expect("sql path"),
            "-o",
            output_path.to_str().expect("output path"),
            "-t",
            "ignored_name",
        ])
        .output()
        .expect("run CLI");

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--table is ignored"));

    // The file stem names the table, not the ignored flag value
    let content = std::fs::read_to_string(&output_path).expect("output exists");
    assert!(content.contains(",report,"));
    assert!(!content.contains("ignored_name"));
}

#[test]
fn quiet_suppresses_warnings() {
    let dir = tempdir().expect("temp dir");
    let sql_path = dir.path().join("report.sql");
    let output_path = dir.path().join("catalog.csv");
    std::fs::write(&sql_path, "SELECT id FROM users").expect("write sql");

    let output = sqlharvest()
        .args([
            "-i",
            sql_path.to_str().expect("sql path"),
            "-o",
            output_path.to_str().expect("output path"),
            "-t",
            "ignored_name",
            "--quiet",
        ])
        .output()
        .expect("run CLI");

    assert!(output.status.success());
    assert!(output.stderr.is_empty());
}

#[test]
fn dialect_specific_sql_parses() {
    let dir = tempdir().expect("temp dir");
    let output_path = dir.path().join("catalog.csv");

    let status = sqlharvest()
        .args([
            "-i",
            "SELECT id::text AS id_text FROM ledger.usage_events",
            "-o",
            output_path.to_str().expect("output path"),
            "-t",
            "usage_report",
            "--dialect",
            "postgres",
            "--quiet",
        ])
        .status()
        .expect("run CLI");

    assert!(status.success());
    let content = std::fs::read_to_string(&output_path).expect("output exists");
    assert!(content.contains("id_text"));
    assert!(content.contains("ledger"));
}
