//! TOML-based configuration for Galaxy.
//!
//! Supports a config file (galaxy.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [databases.underpass]
//! connection_string = "${UNDERPASS_DSN}"
//! statement_timeout_seconds = 120
//!
//! [databases.tasking_manager]
//! connection_string = "${TM_DSN}"
//!
//! [limits]
//! mapathon_max_days = 31
//! user_statistics_max_days = 30
//! data_quality_hashtag_max_hours = 24
//! training_max_days = 1826
//! max_polygon_area_km2 = 5000.0
//!
//! [logging]
//! filter = "galaxy=debug"
//!
//! [query]
//! dialect = "postgres"
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::sql::Dialect;
use crate::validation::Limits;

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Unsupported dialect: {0}")]
    UnsupportedDialect(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Database connections.
    pub databases: DatabaseSettings,

    /// Validation limits applied to every request.
    pub limits: Limits,

    /// Logging configuration.
    pub logging: LoggingSettings,

    /// Statement rendering.
    pub query: QuerySettings,
}

/// The two stores reports read from.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Change-history store (changesets, validation, training, hashtags).
    pub underpass: Option<ConnectionSettings>,

    /// Tasking-manager store. Reports skip tasking-manager sections without it.
    pub tasking_manager: Option<ConnectionSettings>,
}

/// Connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConnectionSettings {
    /// Connection string (supports ${ENV_VAR} expansion).
    pub connection_string: String,

    /// Statement timeout handed to the database collaborator.
    #[serde(default = "default_statement_timeout")]
    pub statement_timeout_seconds: u64,
}

fn default_statement_timeout() -> u64 {
    120
}

impl ConnectionSettings {
    /// Get the connection string with environment variables expanded.
    pub fn resolved_connection_string(&self) -> Result<String, SettingsError> {
        expand_env_vars(&self.connection_string)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `tracing_subscriber::EnvFilter` directive. `RUST_LOG` takes precedence.
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "galaxy=info".to_string(),
        }
    }
}

/// Statement rendering configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct QuerySettings {
    /// SQL dialect: "postgres" or "duckdb".
    pub dialect: String,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            dialect: "postgres".to_string(),
        }
    }
}

impl QuerySettings {
    /// Get the dialect type.
    pub fn dialect_type(&self) -> Result<Dialect, SettingsError> {
        self.dialect
            .parse()
            .map_err(|_| SettingsError::UnsupportedDialect(self.dialect.clone()))
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        settings.check()?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `GALAXY_CONFIG`
    /// 2. `./galaxy.toml`
    /// 3. `~/.config/galaxy/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("GALAXY_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("galaxy.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("galaxy").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    /// Reject limits that would make every request fail.
    fn check(&self) -> Result<(), SettingsError> {
        let l = &self.limits;
        let spans = [
            ("mapathon_max_days", l.mapathon_max_days),
            ("user_statistics_max_days", l.user_statistics_max_days),
            ("data_quality_hashtag_max_hours", l.data_quality_hashtag_max_hours),
            ("data_quality_username_max_days", l.data_quality_username_max_days),
            ("training_max_days", l.training_max_days),
            ("organization_max_days", l.organization_max_days),
        ];
        if let Some((name, _)) = spans.iter().find(|(_, v)| *v <= 0) {
            return Err(SettingsError::InvalidConfig(format!(
                "limits.{} must be positive",
                name
            )));
        }
        if !(l.max_polygon_area_km2 > 0.0) {
            return Err(SettingsError::InvalidConfig(
                "limits.max_polygon_area_km2 must be positive".to_string(),
            ));
        }
        self.query.dialect_type()?;
        Ok(())
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let var_name: String = if chars.next_if_eq(&'{').is_some() {
            let name = std::iter::from_fn(|| chars.next_if(|&ch| ch != '}')).collect();
            chars.next(); // consume '}'
            name
        } else {
            std::iter::from_fn(|| chars.next_if(|&ch| ch.is_alphanumeric() || ch == '_'))
                .collect()
        };

        if var_name.is_empty() {
            // Just a lone $, keep it
            result.push('$');
            continue;
        }

        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_env_vars_braces() {
        env::set_var("GALAXY_TEST_DSN", "postgresql://localhost/underpass");
        assert_eq!(
            expand_env_vars("${GALAXY_TEST_DSN}").unwrap(),
            "postgresql://localhost/underpass"
        );
        assert_eq!(
            expand_env_vars("x_${GALAXY_TEST_DSN}_y").unwrap(),
            "x_postgresql://localhost/underpass_y"
        );
        env::remove_var("GALAXY_TEST_DSN");
    }

    #[test]
    fn test_expand_env_vars_no_braces() {
        env::set_var("GALAXY_TEST_USER", "mapper");
        assert_eq!(expand_env_vars("$GALAXY_TEST_USER").unwrap(), "mapper");
        assert_eq!(expand_env_vars("$GALAXY_TEST_USER!").unwrap(), "mapper!");
        assert_eq!(expand_env_vars("cost $ 5").unwrap(), "cost $ 5");
        env::remove_var("GALAXY_TEST_USER");
    }

    #[test]
    fn test_expand_env_vars_missing() {
        let result = expand_env_vars("${GALAXY_NONEXISTENT_VAR_12345}");
        assert!(matches!(result, Err(SettingsError::MissingEnvVar(_))));
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
[databases.underpass]
connection_string = "postgresql://localhost/underpass"
statement_timeout_seconds = 60

[databases.tasking_manager]
connection_string = "postgresql://localhost/tm"

[limits]
mapathon_max_days = 7
max_polygon_area_km2 = 100.0

[logging]
filter = "galaxy=debug"
"#;

        let settings: Settings = toml::from_str(toml).unwrap();
        settings.check().unwrap();

        let underpass = settings.databases.underpass.as_ref().unwrap();
        assert_eq!(underpass.statement_timeout_seconds, 60);
        let tm = settings.databases.tasking_manager.as_ref().unwrap();
        assert_eq!(tm.statement_timeout_seconds, 120);

        assert_eq!(settings.limits.mapathon_max_days, 7);
        assert_eq!(settings.limits.user_statistics_max_days, 30);
        assert_eq!(settings.limits.max_polygon_area_km2, 100.0);
        assert_eq!(settings.logging.filter, "galaxy=debug");
        assert_eq!(settings.query.dialect_type().unwrap(), Dialect::Postgres);
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();

        assert!(settings.databases.underpass.is_none());
        assert!(settings.databases.tasking_manager.is_none());
        assert_eq!(settings.limits.mapathon_max_days, 31);
        assert_eq!(settings.limits.data_quality_hashtag_max_hours, 24);
        assert_eq!(settings.limits.training_max_days, 1826);
        assert_eq!(settings.logging.filter, "galaxy=info");
    }

    #[test]
    fn test_rejects_non_positive_limit() {
        let settings: Settings = toml::from_str("[limits]\ntraining_max_days = 0\n").unwrap();
        assert!(matches!(
            settings.check(),
            Err(SettingsError::InvalidConfig(msg)) if msg.contains("training_max_days")
        ));
    }

    #[test]
    fn test_rejects_unknown_dialect() {
        let settings: Settings = toml::from_str("[query]\ndialect = \"oracle\"\n").unwrap();
        assert!(matches!(
            settings.check(),
            Err(SettingsError::UnsupportedDialect(_))
        ));
    }

    #[test]
    fn test_from_file_missing() {
        let result = Settings::from_file("/nonexistent/galaxy.toml");
        assert!(matches!(result, Err(SettingsError::FileNotFound(_))));
    }
}
