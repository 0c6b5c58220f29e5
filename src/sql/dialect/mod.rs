//! SQL Dialect definitions and formatting rules.
//!
//! Report statements target PostgreSQL/PostGIS. DuckDB (with the spatial
//! extension) reads the same templates for offline snapshots; the two differ
//! only in how they spell placeholders.
//!
//! | Feature | PostgreSQL | DuckDB |
//! |---------|-----------|--------|
//! | Placeholders | `$1, $2, ...` | `?` |
//! | Identifier quoting | `"` | `"` |
//! | NULLS FIRST/LAST | ✓ | ✓ |
//!
//! # Usage
//!
//! ```ignore
//! use galaxy::sql::dialect::{Dialect, SqlDialect};
//!
//! let dialect = Dialect::Postgres;
//! assert_eq!(dialect.placeholder(2), "$2");
//! ```

mod duckdb;
pub mod helpers;
mod postgres;

pub use duckdb::DuckDb;
pub use postgres::Postgres;

/// SQL dialect trait - defines how SQL constructs are rendered.
pub trait SqlDialect: std::fmt::Debug {
    /// Dialect name for display/logging.
    fn name(&self) -> &'static str;

    /// Quote an identifier (table, column, alias).
    fn quote_identifier(&self, ident: &str) -> String;

    /// Quote a string literal.
    ///
    /// All supported dialects use single quotes with `''` for escaping.
    fn quote_string(&self, s: &str) -> String {
        helpers::quote_string_single(s)
    }

    /// Format a boolean literal.
    fn format_bool(&self, b: bool) -> &'static str;

    /// Placeholder text for the 1-based parameter `position`.
    fn placeholder(&self, position: usize) -> String;

    /// Whether this dialect supports NULLS FIRST/LAST in ORDER BY.
    fn supports_nulls_ordering(&self) -> bool {
        true
    }
}

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    #[default]
    Postgres,
    DuckDb,
}

impl Dialect {
    /// Get the dialect implementation.
    pub fn dialect(&self) -> &'static dyn SqlDialect {
        match self {
            Dialect::Postgres => &Postgres,
            Dialect::DuckDb => &DuckDb,
        }
    }
}

// Implement SqlDialect for Dialect enum by delegating to concrete types
impl SqlDialect for Dialect {
    fn name(&self) -> &'static str {
        self.dialect().name()
    }

    fn quote_identifier(&self, ident: &str) -> String {
        self.dialect().quote_identifier(ident)
    }

    fn quote_string(&self, s: &str) -> String {
        self.dialect().quote_string(s)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        self.dialect().format_bool(b)
    }

    fn placeholder(&self, position: usize) -> String {
        self.dialect().placeholder(position)
    }

    fn supports_nulls_ordering(&self) -> bool {
        self.dialect().supports_nulls_ordering()
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dialect().name())
    }
}

impl std::str::FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "postgis" => Ok(Dialect::Postgres),
            "duckdb" => Ok(Dialect::DuckDb),
            other => Err(format!("unsupported dialect: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_display() {
        assert_eq!(Dialect::Postgres.to_string(), "postgres");
        assert_eq!(Dialect::DuckDb.to_string(), "duckdb");
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(Dialect::Postgres.placeholder(1), "$1");
        assert_eq!(Dialect::Postgres.placeholder(12), "$12");
        assert_eq!(Dialect::DuckDb.placeholder(3), "?");
    }

    #[test]
    fn test_quote_identifier_escaping() {
        assert_eq!(
            Dialect::Postgres.quote_identifier("weird\"name"),
            "\"weird\"\"name\""
        );
    }

    #[test]
    fn test_from_str() {
        assert_eq!("PostGIS".parse::<Dialect>(), Ok(Dialect::Postgres));
        assert_eq!("duckdb".parse::<Dialect>(), Ok(Dialect::DuckDb));
        assert!("mysql".parse::<Dialect>().is_err());
    }
}
