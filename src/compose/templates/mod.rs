//! Fixed statement templates, grouped by report family.
//!
//! Each template is a static [`TemplateSpec`] (accepted and required slots,
//! exposed columns) plus a builder that splices fragments at fixed
//! positions of a [`Query`].

pub(super) mod country;
pub(super) mod data_quality;
pub(super) mod mapathon;
pub(super) mod organization;
pub(super) mod recency;
pub(super) mod tasking_manager;
pub(super) mod training;
pub(super) mod users;

use serde::Serialize;

use crate::predicate::{ColumnRef, FilterSlot, FragmentSet};
use crate::sql::{Query, SelectExpr};

/// Database a template runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    Underpass,
    TaskingManager,
}

/// What a template accepts and exposes.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateSpec {
    pub backend: Backend,
    /// Slots the template splices, in splice order.
    pub accepted: &'static [FilterSlot],
    pub required: &'static [FilterSlot],
    /// Columns a fragment may reference.
    pub columns: &'static [ColumnRef],
    /// Whether a GeoJSON variant exists.
    pub geometry: bool,
}

/// AND the fragments for `slots` into the WHERE clause, in slot order.
fn splice(query: Query, fragments: &FragmentSet, slots: &[FilterSlot]) -> Query {
    slots
        .iter()
        .fold(query, |query, slot| query.filter_opt(fragments.expr(*slot)))
}

fn column(c: ColumnRef) -> SelectExpr {
    SelectExpr::new(c.expr())
}

fn named(c: ColumnRef, alias: &str) -> SelectExpr {
    SelectExpr::new(c.expr()).with_alias(alias)
}
