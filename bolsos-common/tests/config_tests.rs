//! Unit tests for configuration resolution
//!
//! Covers the priority order (command line, environment, TOML, defaults)
//! and fail-fast handling of unparseable values.
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Every test that reads or writes DB_* variables is marked with #[serial].

use bolsos_common::config::{
    AppConfig, Backend, ConfigOverrides, DatabaseConfig, TomlConfig, DEFAULT_BIND,
};
use bolsos_common::Error;
use serial_test::serial;
use std::env;
use std::path::PathBuf;

const ENV_VARS: &[&str] = &[
    "DB_BACKEND",
    "DB_HOST",
    "DB_USER",
    "DB_PASSWORD",
    "DB_NAME",
    "DB_PORT",
    "DB_CHARSET",
    "DB_PATH",
    "BOLSOS_BIND",
];

fn clear_env() {
    for name in ENV_VARS {
        env::remove_var(name);
    }
}

#[test]
#[serial]
fn test_defaults_when_nothing_configured() {
    clear_env();

    let config = AppConfig::resolve(&ConfigOverrides::default(), &TomlConfig::default()).unwrap();

    assert_eq!(config.database, DatabaseConfig::default());
    assert_eq!(config.database.backend, Backend::MySql);
    assert_eq!(config.database.host, "localhost");
    assert_eq!(config.database.port, 3306);
    assert_eq!(config.database.name, "yasbel");
    assert_eq!(config.database.charset, "utf8mb4");
    assert_eq!(config.server.bind, DEFAULT_BIND);
    assert_eq!(config.logging.level, "info");
    assert!(!config.init_schema);
}

#[test]
#[serial]
fn test_env_overrides_toml() {
    clear_env();
    env::set_var("DB_HOST", "db.internal");
    env::set_var("DB_PORT", "3307");

    let toml = TomlConfig::parse(
        r#"
        [database]
        host = "toml-host"
        port = 4000
        user = "catalog"
        "#,
    )
    .unwrap();

    let config = AppConfig::resolve(&ConfigOverrides::default(), &toml).unwrap();

    assert_eq!(config.database.host, "db.internal");
    assert_eq!(config.database.port, 3307);
    // Not in the environment, so the TOML value wins over the default
    assert_eq!(config.database.user, "catalog");

    clear_env();
}

#[test]
#[serial]
fn test_command_line_overrides_env() {
    clear_env();
    env::set_var("DB_NAME", "from_env");
    env::set_var("BOLSOS_BIND", "0.0.0.0:9000");

    let overrides = ConfigOverrides {
        name: Some("from_cli".to_string()),
        bind: Some("127.0.0.1:7000".to_string()),
        init_schema: true,
        ..ConfigOverrides::default()
    };

    let config = AppConfig::resolve(&overrides, &TomlConfig::default()).unwrap();

    assert_eq!(config.database.name, "from_cli");
    assert_eq!(config.server.bind, "127.0.0.1:7000");
    assert!(config.init_schema);

    clear_env();
}

#[test]
#[serial]
fn test_invalid_port_fails_fast() {
    clear_env();
    env::set_var("DB_PORT", "not-a-port");

    let result = AppConfig::resolve(&ConfigOverrides::default(), &TomlConfig::default());

    match result {
        Err(Error::Config(msg)) => assert!(msg.contains("DB_PORT"), "unexpected message: {}", msg),
        other => panic!("Expected configuration error, got {:?}", other),
    }

    clear_env();
}

#[test]
#[serial]
fn test_unknown_backend_fails_fast() {
    clear_env();
    env::set_var("DB_BACKEND", "oracle");

    let result = AppConfig::resolve(&ConfigOverrides::default(), &TomlConfig::default());
    assert!(matches!(result, Err(Error::Config(_))));

    clear_env();
}

#[test]
#[serial]
fn test_sqlite_backend_from_toml() {
    clear_env();

    let toml = TomlConfig::parse(
        r#"
        init_schema = true

        [database]
        backend = "sqlite"
        path = "/tmp/bolsos-test.db"

        [logging]
        level = "debug"
        "#,
    )
    .unwrap();

    let config = AppConfig::resolve(&ConfigOverrides::default(), &toml).unwrap();

    assert_eq!(config.database.backend, Backend::Sqlite);
    assert_eq!(config.database.path, PathBuf::from("/tmp/bolsos-test.db"));
    assert_eq!(config.logging.level, "debug");
    assert!(config.init_schema);
}

#[test]
#[serial]
fn test_load_reads_file_from_disk() {
    clear_env();

    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("bolsos.toml");
    std::fs::write(&path, "[server]\nbind = \"127.0.0.1:8123\"\n").unwrap();

    let config = AppConfig::load(Some(&path), &ConfigOverrides::default()).unwrap();
    assert_eq!(config.server.bind, "127.0.0.1:8123");
}

#[test]
#[serial]
fn test_load_missing_file_is_config_error() {
    clear_env();

    let path = PathBuf::from("/nonexistent/bolsos/config.toml");
    let result = AppConfig::load(Some(&path), &ConfigOverrides::default());

    assert!(matches!(result, Err(Error::Config(_))));
}
