//! # Galaxy
//!
//! Contribution analytics over OpenStreetMap change history: mapathon
//! summaries, user statistics, data-quality issues, training and
//! organisation reports.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                 Raw request (JSON)                       │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [validation + request]
//! ┌─────────────────────────────────────────────────────────┐
//! │       FilterRequest (validated, immutable values)        │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [predicate]
//! ┌─────────────────────────────────────────────────────────┐
//! │        FragmentSet (parameterized conditions)            │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [compose]
//! ┌─────────────────────────────────────────────────────────┐
//! │     ComposedQuery (statement text + bound values)        │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [report → Database]
//! ┌─────────────────────────────────────────────────────────┐
//! │          ReportBody (records, features, ...)             │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [output]
//! ┌─────────────────────────────────────────────────────────┐
//! │                JSON / CSV / GeoJSON                      │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything above the database call is pure; the database itself is a
//! collaborator behind [`report::Database`].

pub mod compose;
pub mod config;
pub mod output;
pub mod predicate;
pub mod report;
pub mod request;
pub mod sql;
pub mod validation;

pub use sql::dialect;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::compose::{compose, ComposeOptions, ComposedQuery, ComposerError, Template};
    pub use crate::output::{render, render_as, OutputError, Rendered};
    pub use crate::predicate::{ColumnRef, FilterSlot, FragmentSet, PredicateFragment};
    pub use crate::report::{
        Database, DatabaseError, ReportBody, ReportContext, ReportError, ReportOutcome,
        ReportResult, Row,
    };
    pub use crate::request::{FilterRequest, ReportFamily};
    pub use crate::sql::{Dialect, SqlValue};
    pub use crate::validation::{Limits, OutputType, ValidationErrors};
}

pub use sql::{Dialect, SqlValue};
