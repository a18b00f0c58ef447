//! Configuration Tests
//!
//! Loading hql-rewrite.toml files and `.env` overrides from disk.

use std::fs;

use hql_rewrite::config::{CONFIG_FILE_NAME, ENV_COUNT_PROJECTION};
use hql_rewrite::{rewrite, Order, RewriteConfig, RewriteError};
use tempfile::TempDir;

fn write_config(dir: &TempDir, content: &str) {
    fs::write(dir.path().join(CONFIG_FILE_NAME), content).expect("Failed to write config");
}

#[test]
fn test_load_config_file() {
    let tmp_dir = TempDir::new().expect("Failed to create temp dir");
    write_config(
        &tmp_dir,
        r#"
        [[sort]]
        property = "lastName"
        direction = "desc"
        "#,
    );

    let config = RewriteConfig::load(&tmp_dir.path().join(CONFIG_FILE_NAME)).unwrap();
    assert_eq!(config.sort, vec![Order::desc("lastName")]);
    assert!(!config.count);

    let output = rewrite("select p from Person p", &config).unwrap();
    assert_eq!(output.query, "select p from Person p order by p.lastName desc");
}

#[test]
fn test_load_missing_file_is_io_error() {
    let tmp_dir = TempDir::new().expect("Failed to create temp dir");
    let err = RewriteConfig::load(&tmp_dir.path().join("missing.toml")).unwrap_err();
    assert!(matches!(err, RewriteError::IoError(_)));
}

#[test]
fn test_load_invalid_toml() {
    let tmp_dir = TempDir::new().expect("Failed to create temp dir");
    write_config(&tmp_dir, "count = \"sometimes\"");
    let err = RewriteConfig::load(&tmp_dir.path().join(CONFIG_FILE_NAME)).unwrap_err();
    assert!(matches!(err, RewriteError::TomlError(_)));
}

#[test]
fn test_load_rejects_empty_sort_property() {
    let tmp_dir = TempDir::new().expect("Failed to create temp dir");
    write_config(
        &tmp_dir,
        r#"
        [[sort]]
        property = ""
        "#,
    );
    let err = RewriteConfig::load(&tmp_dir.path().join(CONFIG_FILE_NAME)).unwrap_err();
    assert!(matches!(err, RewriteError::Query(_)));
}

#[test]
fn test_save_and_reload() {
    let tmp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = RewriteConfig {
        count: true,
        count_projection: Some("p.id".to_string()),
        sort: vec![Order::asc("name").ignore_case()],
    };
    config.save(tmp_dir.path()).unwrap();

    let loaded = RewriteConfig::load(&tmp_dir.path().join(CONFIG_FILE_NAME)).unwrap();
    assert_eq!(loaded, config);
}

// The only test in this binary that touches the process environment.
#[test]
fn test_load_from_dir_applies_dotenv() {
    let tmp_dir = TempDir::new().expect("Failed to create temp dir");
    write_config(&tmp_dir, "count = true");
    fs::write(
        tmp_dir.path().join(".env"),
        format!("{}=p.id\n", ENV_COUNT_PROJECTION),
    )
    .unwrap();

    let config = RewriteConfig::load_from_dir(tmp_dir.path()).unwrap();
    assert!(config.count);
    assert_eq!(config.count_projection.as_deref(), Some("p.id"));

    let output = rewrite("select p from Person p", &config).unwrap();
    assert_eq!(output.query, "select count(p.id) from Person p");
}
