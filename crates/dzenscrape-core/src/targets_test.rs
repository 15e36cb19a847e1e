use std::path::Path;

use super::*;
use crate::records::IdentifierKind;

#[test]
fn parses_database_and_users() {
    let yaml = r#"
database:
  user: scraper
  password: secret
  database: dzen
  host: localhost
  port: 5432
users:
  - id: "42"
    type: id
  - id: acme-feed
    type: channel
"#;
    let targets = parse_targets(yaml).expect("valid targets");

    let db = targets.database.expect("database section");
    assert_eq!(db.user, "scraper");
    assert_eq!(db.port, 5432);
    assert_eq!(targets.users.len(), 2);
    assert_eq!(targets.users[0].kind, IdentifierKind::Id);
    assert_eq!(targets.users[1].kind, IdentifierKind::Channel);
}

#[test]
fn database_section_is_optional() {
    let targets = parse_targets("users:\n  - id: \"7\"\n    type: id\n").unwrap();
    assert!(targets.database.is_none());
    assert_eq!(targets.users.len(), 1);
}

#[test]
fn empty_users_list_is_valid() {
    let targets = parse_targets("users: []\n").unwrap();
    assert!(targets.users.is_empty());
}

#[test]
fn rejects_blank_user_id() {
    let err = parse_targets("users:\n  - id: \"  \"\n    type: id\n").unwrap_err();
    assert!(matches!(err, ConfigError::Validation(_)), "got: {err:?}");
}

#[test]
fn rejects_duplicate_user() {
    let yaml = "users:\n  - id: \"1\"\n    type: id\n  - id: \"1\"\n    type: id\n";
    let err = parse_targets(yaml).unwrap_err();
    assert!(
        matches!(err, ConfigError::Validation(ref msg) if msg.contains("duplicate")),
        "got: {err:?}"
    );
}

#[test]
fn same_id_with_different_kinds_is_allowed() {
    let yaml = "users:\n  - id: \"1\"\n    type: id\n  - id: \"1\"\n    type: channel\n";
    let targets = parse_targets(yaml).unwrap();
    assert_eq!(targets.users.len(), 2);
}

#[test]
fn rejects_missing_type() {
    let err = parse_targets("users:\n  - id: \"1\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::TargetsFileParse(_)), "got: {err:?}");
}

#[test]
fn database_debug_redacts_password() {
    let db = DatabaseConfig {
        user: "scraper".to_string(),
        password: "hunter2".to_string(),
        database: "dzen".to_string(),
        host: "localhost".to_string(),
        port: 5432,
    };
    let rendered = format!("{db:?}");
    assert!(!rendered.contains("hunter2"));
}

#[test]
fn missing_file_reports_path() {
    let err = load_targets(Path::new("/nonexistent/targets.yaml")).unwrap_err();
    assert!(
        matches!(err, ConfigError::TargetsFileIo { ref path, .. } if path.contains("nonexistent")),
        "got: {err:?}"
    );
}

#[test]
fn load_targets_from_example_file() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("config")
        .join("targets.example.yaml");
    assert!(
        path.exists(),
        "targets.example.yaml missing at {path:?}, required for this test"
    );
    let targets = load_targets(&path).expect("failed to load targets.example.yaml");
    assert!(
        !targets.users.is_empty(),
        "targets.example.yaml should list at least one user"
    );
}
