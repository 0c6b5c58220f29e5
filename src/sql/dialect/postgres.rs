//! PostgreSQL SQL dialect.
//!
//! PostgreSQL/PostGIS features the report templates rely on:
//! - ANSI identifier quoting (`"`)
//! - Numbered placeholders (`$1`)
//! - `= ANY(array)` comparisons
//! - hstore `->` lookups

use super::helpers;
use super::SqlDialect;

/// PostgreSQL SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Postgres;

impl SqlDialect for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_literal(b)
    }

    fn placeholder(&self, position: usize) -> String {
        helpers::placeholder_numbered(position)
    }
}
