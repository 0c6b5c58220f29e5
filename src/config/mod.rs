//! Configuration module for Galaxy.
//!
//! Handles database connection settings, validation limits and logging.

mod settings;

pub use settings::{
    expand_env_vars, ConnectionSettings, DatabaseSettings, LoggingSettings, QuerySettings,
    Settings, SettingsError,
};
