//! SQL generation module.
//!
//! This module provides a type-safe SQL builder whose output is always a
//! statement with placeholders plus an ordered list of bound values.
//! It includes:
//!
//! - [`query`] - SELECT query builder
//! - [`expr`] - Expression AST and builder DSL
//! - [`token`] - Token types for SQL generation
//! - [`value`] - Values bound to placeholders
//! - [`dialect`] - SQL dialect implementations

pub mod dialect;
pub mod expr;
pub mod query;
pub mod token;
pub mod value;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types at the sql module level
pub use dialect::{Dialect, SqlDialect};
pub use expr::{
    and_all, arrow, case_when, cast, coalesce, col, count, count_distinct, count_star, func,
    func_distinct, lit_bool, lit_int, lit_null, lit_str, max, or_all, param, star, sum,
    table_col, table_star, BinaryOperator, Expr, ExprExt, Literal, UnaryOperator,
};
pub use query::{
    Cte, Join, JoinType, NullsOrder, OrderByExpr, Query, SelectExpr, SetOperation, SortDir,
    TableRef,
};
pub use token::{Token, TokenStream};
pub use value::SqlValue;
