//! The blocking database collaborator.
//!
//! Connection handling, pooling and retries live behind this trait; the
//! report layer only hands it composed statements.

use serde_json::{Map, Value};

use crate::compose::ComposedQuery;

/// One result row, column name → value.
pub type Row = Map<String, Value>;

/// Opaque failure reported by the database. Never retried.
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseError {
    /// Driver error code, e.g. a SQLSTATE.
    pub code: Option<String>,
    pub message: String,
}

impl DatabaseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

impl std::fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.code {
            Some(code) => write!(f, "[{}] {}", code, self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for DatabaseError {}

/// Executes a composed statement with its bound parameters.
pub trait Database: Send + Sync {
    fn fetch(&self, query: &ComposedQuery) -> Result<Vec<Row>, DatabaseError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(DatabaseError::new("timeout").to_string(), "timeout");
        assert_eq!(
            DatabaseError::new("relation missing").with_code("42P01").to_string(),
            "[42P01] relation missing"
        );
    }
}
