use super::*;
use crate::commands::common::build_forest;
use std::fs;
use tempfile::TempDir;

/// `sql/{addresses,orders,users}.sql` plus a manifest chaining them.
fn chain_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let sql = dir.path().join("sql");
    fs::create_dir(&sql).unwrap();
    for name in ["addresses.sql", "orders.sql", "users.sql"] {
        fs::write(sql.join(name), format!("-- {name}\n")).unwrap();
    }
    fs::write(
        dir.path().join(".db-relation.yml"),
        "relations:\n  - file: orders.sql\n    dependencies: [users.sql]\n  - file: users.sql\n    dependencies: [addresses.sql]\n",
    )
    .unwrap();
    dir
}

fn render(forest: &ScriptForest, output: PlanOutput) -> String {
    let mut buf = Vec::new();
    write_plan(&mut buf, forest, output).unwrap();
    String::from_utf8(buf).unwrap()
}

#[test]
fn test_order_output_lists_dependencies_first() {
    let dir = chain_project();
    let forest = build_forest(&dir.path().join(".db-relation.yml"), &dir.path().join("sql")).unwrap();

    assert_eq!(
        render(&forest, PlanOutput::Order),
        "addresses.sql\nusers.sql\norders.sql\n"
    );
}

#[test]
fn test_all_output_ends_with_json_forest() {
    let dir = chain_project();
    let forest = build_forest(&dir.path().join(".db-relation.yml"), &dir.path().join("sql")).unwrap();

    let text = render(&forest, PlanOutput::All);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(&lines[..3], ["addresses.sql", "users.sql", "orders.sql"]);

    let json: serde_json::Value = serde_json::from_str(lines[3]).unwrap();
    let roots = json.as_array().unwrap();
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0]["id"], "orders.sql");
    assert_eq!(roots[0]["children"][0]["id"], "users.sql");
    assert_eq!(roots[0]["children"][0]["children"][0]["id"], "addresses.sql");
}

#[test]
fn test_json_output_only() {
    let dir = chain_project();
    let forest = build_forest(&dir.path().join(".db-relation.yml"), &dir.path().join("sql")).unwrap();

    let text = render(&forest, PlanOutput::Json);
    assert_eq!(text.lines().count(), 1);
    assert!(text.starts_with('['));
}

#[test]
fn test_missing_manifest_plans_walked_files() {
    let dir = chain_project();
    let forest = build_forest(&dir.path().join("missing.yml"), &dir.path().join("sql")).unwrap();

    assert_eq!(
        render(&forest, PlanOutput::Order),
        "addresses.sql\norders.sql\nusers.sql\n"
    );
}

#[test]
fn test_missing_sql_dir_is_error() {
    let dir = chain_project();
    let err = build_forest(&dir.path().join(".db-relation.yml"), &dir.path().join("nope")).unwrap_err();
    assert!(err.to_string().contains("failed to walk directory"));
}

#[test]
fn test_empty_forest_prints_empty_array() {
    let forest = ScriptForest::default();
    assert_eq!(render(&forest, PlanOutput::All), "[]\n");
}
