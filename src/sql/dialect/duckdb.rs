//! DuckDB SQL dialect.
//!
//! Used against offline snapshots of the change-history tables:
//! - ANSI identifier quoting (`"`)
//! - Anonymous positional placeholders (`?`)

use super::helpers;
use super::SqlDialect;

/// DuckDB SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct DuckDb;

impl SqlDialect for DuckDb {
    fn name(&self) -> &'static str {
        "duckdb"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_literal(b)
    }

    fn placeholder(&self, position: usize) -> String {
        helpers::placeholder_question(position)
    }
}
