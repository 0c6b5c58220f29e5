//! Shared helper functions for SQL dialect implementations.

/// Quote identifier with double quotes (ANSI style).
/// Used by: Postgres, DuckDB
pub fn quote_double(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote string with single quotes (standard SQL).
pub fn quote_string_single(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Format boolean as literal true/false.
pub fn format_bool_literal(b: bool) -> &'static str {
    if b {
        "true"
    } else {
        "false"
    }
}

/// Numbered placeholder: `$1`, `$2`, ...
/// Used by: Postgres
pub fn placeholder_numbered(position: usize) -> String {
    format!("${}", position)
}

/// Anonymous positional placeholder: `?`
/// Used by: DuckDB
pub fn placeholder_question(_position: usize) -> String {
    "?".to_string()
}
