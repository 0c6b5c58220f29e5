//! Query composition: template + fragments → statement text and parameters.
//!
//! ```text
//! FragmentSet ─┐
//!              ├─ check slots/columns ─→ Template::build ─→ Query::render ─→ ComposedQuery
//! Template  ───┘                                                      (placeholders == parameters)
//! ```
//!
//! Placeholders are numbered in text order, and templates splice slots at
//! fixed positions, so the parameter order of a composed query depends only
//! on the template and the fragments, never on how the set was assembled.

pub mod schema;
mod template;
mod templates;

pub use template::Template;
pub use templates::{Backend, TemplateSpec};

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::predicate::{ColumnRef, FilterSlot, FragmentSet};
use crate::sql::{Dialect, SqlValue};

// ============================================================================
// Error Types
// ============================================================================

/// Composition failures. All are defects in the caller, never user errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ComposerError {
    #[error("unknown template '{0}'")]
    UnknownTemplate(String),

    #[error("template {template} does not accept a {slot} fragment")]
    UnsupportedSlot { template: Template, slot: FilterSlot },

    #[error("template {template} requires a {slot} fragment")]
    MissingRequiredSlot { template: Template, slot: FilterSlot },

    #[error("template {template} does not expose {column}, needed by the {slot} fragment")]
    MissingColumn {
        template: Template,
        slot: FilterSlot,
        column: ColumnRef,
    },

    #[error("template {template} has no geometry variant")]
    GeometryUnavailable { template: Template },

    #[error("template {template} rendered {placeholders} placeholders for {parameters} parameters")]
    PlaceholderMismatch {
        template: Template,
        placeholders: usize,
        parameters: usize,
    },
}

pub type ComposeResult<T> = Result<T, ComposerError>;

// ============================================================================
// Options
// ============================================================================

/// Options for composition.
#[derive(Debug, Clone, Copy)]
pub struct ComposeOptions {
    /// SQL dialect to render.
    pub dialect: Dialect,
    /// Render the GeoJSON variant of the template.
    pub include_geometry: bool,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            dialect: Dialect::Postgres,
            include_geometry: false,
        }
    }
}

impl ComposeOptions {
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn with_geometry(mut self, include_geometry: bool) -> Self {
        self.include_geometry = include_geometry;
        self
    }
}

// ============================================================================
// Result Types
// ============================================================================

/// A statement ready to hand to the database.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComposedQuery {
    template: Template,
    statement: String,
    parameters: Vec<SqlValue>,
    #[serde(skip)]
    dialect: Dialect,
}

impl ComposedQuery {
    pub fn template(&self) -> Template {
        self.template
    }

    pub fn statement(&self) -> &str {
        &self.statement
    }

    /// Bound values in placeholder order.
    pub fn parameters(&self) -> &[SqlValue] {
        &self.parameters
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn backend(&self) -> Backend {
        self.template.spec().backend
    }

    /// Short SHA-256 of the statement text. Safe to log; parameters are not
    /// part of it.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.statement.as_bytes());
        let hex = format!("{:x}", hasher.finalize());
        hex[..16].to_string()
    }
}

// ============================================================================
// Composition
// ============================================================================

/// Compose `template` with `fragments`.
///
/// Fails when a fragment targets a slot the template does not accept or a
/// column it does not expose, when a required slot is empty, or when the
/// rendered placeholders do not match the bound parameters.
pub fn compose(
    template: Template,
    fragments: &FragmentSet,
    options: &ComposeOptions,
) -> ComposeResult<ComposedQuery> {
    let spec = template.spec();

    for (slot, fragment) in fragments.iter() {
        if !spec.accepted.contains(&slot) {
            return Err(ComposerError::UnsupportedSlot { template, slot });
        }
        if let Some(column) = fragment
            .required_columns()
            .iter()
            .find(|c| !spec.columns.contains(c))
        {
            return Err(ComposerError::MissingColumn {
                template,
                slot,
                column: *column,
            });
        }
    }

    if let Some(slot) = spec.required.iter().find(|s| !fragments.contains(**s)) {
        return Err(ComposerError::MissingRequiredSlot {
            template,
            slot: *slot,
        });
    }

    if options.include_geometry && !spec.geometry {
        return Err(ComposerError::GeometryUnavailable { template });
    }

    let (statement, parameters) = template
        .build(fragments, options.include_geometry)
        .render(options.dialect);

    let placeholders = count_placeholders(&statement, options.dialect);
    if placeholders != parameters.len() {
        return Err(ComposerError::PlaceholderMismatch {
            template,
            placeholders,
            parameters: parameters.len(),
        });
    }

    Ok(ComposedQuery {
        template,
        statement,
        parameters,
        dialect: options.dialect,
    })
}

/// Count placeholders outside string literals and quoted identifiers.
pub fn count_placeholders(statement: &str, dialect: Dialect) -> usize {
    let mut count = 0;
    let mut quote: Option<char> = None;
    let mut chars = statement.chars().peekable();

    while let Some(ch) = chars.next() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => {}
            None => match ch {
                '\'' | '"' => quote = Some(ch),
                '$' if dialect == Dialect::Postgres => {
                    if chars.peek().is_some_and(|c| c.is_ascii_digit()) {
                        count += 1;
                        while chars.peek().is_some_and(|c| c.is_ascii_digit()) {
                            chars.next();
                        }
                    }
                }
                '?' if dialect == Dialect::DuckDb => count += 1,
                _ => {}
            },
        }
    }
    count
}
