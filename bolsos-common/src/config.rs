//! Configuration loading and resolution
//!
//! Every setting is resolved in the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Values that are present but unparseable are a configuration error rather
//! than a silent fallback to the next tier.

use crate::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

/// Default HTTP bind address
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

/// Storage backend selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    MySql,
    Sqlite,
}

impl FromStr for Backend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(Backend::MySql),
            "sqlite" => Ok(Backend::Sqlite),
            other => Err(Error::Config(format!(
                "Unknown database backend '{}' (expected 'mysql' or 'sqlite')",
                other
            ))),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::MySql => write!(f, "mysql"),
            Backend::Sqlite => write!(f, "sqlite"),
        }
    }
}

/// Database connection parameters
///
/// `path` is only used by the SQLite backend; the remaining fields only by
/// MySQL.
#[derive(Clone, PartialEq)]
pub struct DatabaseConfig {
    pub backend: Backend,
    pub host: String,
    pub user: String,
    pub password: String,
    pub name: String,
    pub port: u16,
    pub charset: String,
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: Backend::MySql,
            host: "localhost".to_string(),
            user: "root".to_string(),
            password: String::new(),
            name: "yasbel".to_string(),
            port: 3306,
            charset: "utf8mb4".to_string(),
            path: PathBuf::from("bolsos.db"),
        }
    }
}

impl DatabaseConfig {
    /// SQLite configuration pointing at `path`
    pub fn sqlite(path: impl Into<PathBuf>) -> Self {
        Self {
            backend: Backend::Sqlite,
            path: path.into(),
            ..Self::default()
        }
    }

    /// Human-readable target for log lines (never includes the password)
    pub fn describe(&self) -> String {
        match self.backend {
            Backend::MySql => format!(
                "mysql://{}@{}:{}/{}",
                self.user, self.host, self.port, self.name
            ),
            Backend::Sqlite => format!("sqlite://{}", self.path.display()),
        }
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("backend", &self.backend)
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("name", &self.name)
            .field("port", &self.port)
            .field("charset", &self.charset)
            .field("path", &self.path)
            .finish()
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind: String,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// `[server]` table of the TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerSection {
    pub bind: Option<String>,
}

/// `[database]` table of the TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseSection {
    pub backend: Option<String>,
    pub host: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub port: Option<u16>,
    pub charset: Option<String>,
    pub path: Option<PathBuf>,
}

/// Configuration file contents
///
/// All tables are optional. A file named explicitly must exist.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub database: DatabaseSection,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Create the `bolso` table on startup if it is missing
    #[serde(default)]
    pub init_schema: Option<bool>,
}

impl TomlConfig {
    /// Parse a TOML document
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Read and parse a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Read TOML failed ({}): {}", path.display(), e))
        })?;
        Self::parse(&content)
    }
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub bind: Option<String>,
    pub backend: Option<String>,
    pub host: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub port: Option<u16>,
    pub charset: Option<String>,
    pub path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub init_schema: bool,
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub init_schema: bool,
}

impl AppConfig {
    /// Resolve configuration from command line, environment, optional TOML
    /// file, and compiled defaults
    pub fn load(config_file: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self> {
        let toml_config = match config_file {
            Some(path) => {
                info!("Loading configuration file: {}", path.display());
                TomlConfig::load(path)?
            }
            None => {
                debug!("No configuration file given, using environment and defaults");
                TomlConfig::default()
            }
        };

        Self::resolve(overrides, &toml_config)
    }

    /// Resolve configuration against an already parsed TOML document
    pub fn resolve(overrides: &ConfigOverrides, toml_config: &TomlConfig) -> Result<Self> {
        let defaults = DatabaseConfig::default();
        let db = &toml_config.database;

        let backend = match pick_string(
            overrides.backend.clone(),
            "DB_BACKEND",
            db.backend.clone(),
        ) {
            Some(value) => value.parse()?,
            None => defaults.backend,
        };

        let port = match overrides.port {
            Some(port) => port,
            None => match env_value("DB_PORT") {
                Some(raw) => raw.trim().parse::<u16>().map_err(|e| {
                    Error::Config(format!("Invalid DB_PORT '{}': {}", raw, e))
                })?,
                None => db.port.unwrap_or(defaults.port),
            },
        };

        let database = DatabaseConfig {
            backend,
            host: pick_string(overrides.host.clone(), "DB_HOST", db.host.clone())
                .unwrap_or(defaults.host),
            user: pick_string(overrides.user.clone(), "DB_USER", db.user.clone())
                .unwrap_or(defaults.user),
            password: pick_string(
                overrides.password.clone(),
                "DB_PASSWORD",
                db.password.clone(),
            )
            .unwrap_or(defaults.password),
            name: pick_string(overrides.name.clone(), "DB_NAME", db.name.clone())
                .unwrap_or(defaults.name),
            port,
            charset: pick_string(overrides.charset.clone(), "DB_CHARSET", db.charset.clone())
                .unwrap_or(defaults.charset),
            path: overrides
                .path
                .clone()
                .or_else(|| env_value("DB_PATH").map(PathBuf::from))
                .or_else(|| db.path.clone())
                .unwrap_or(defaults.path),
        };

        let server = ServerConfig {
            bind: pick_string(
                overrides.bind.clone(),
                "BOLSOS_BIND",
                toml_config.server.bind.clone(),
            )
            .unwrap_or_else(|| DEFAULT_BIND.to_string()),
        };

        let logging = LoggingConfig {
            level: overrides
                .log_level
                .clone()
                .unwrap_or_else(|| toml_config.logging.level.clone()),
        };

        let init_schema = overrides.init_schema || toml_config.init_schema.unwrap_or(false);

        Ok(Self {
            server,
            database,
            logging,
            init_schema,
        })
    }
}

/// Read an environment variable, treating unset and non-unicode alike
fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// First present value of command line, environment variable, TOML
fn pick_string(cli: Option<String>, env_var: &str, toml: Option<String>) -> Option<String> {
    cli.or_else(|| env_value(env_var)).or(toml)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_parse() {
        assert_eq!("mysql".parse::<Backend>().unwrap(), Backend::MySql);
        assert_eq!(" SQLite ".parse::<Backend>().unwrap(), Backend::Sqlite);
        assert!("postgres".parse::<Backend>().is_err());
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = DatabaseConfig {
            password: "hunter2".to_string(),
            ..DatabaseConfig::default()
        };

        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("[REDACTED]"));
        assert!(!config.describe().contains("hunter2"));
    }

    #[test]
    fn test_toml_sections_are_optional() {
        let config = TomlConfig::parse("").unwrap();
        assert!(config.database.host.is_none());
        assert_eq!(config.logging.level, "info");
        assert!(config.init_schema.is_none());
    }

    #[test]
    fn test_toml_rejects_bad_port_type() {
        let result = TomlConfig::parse("[database]\nport = \"not-a-port\"\n");
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
