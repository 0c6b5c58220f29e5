//! Predicate fragments - one builder per filter concern.
//!
//! A [`PredicateFragment`] is a boolean expression over a fixed set of
//! columns plus the values bound to it. An absent filter yields the null
//! fragment, never a tautology. Fragments are collected into a
//! [`FragmentSet`] keyed by [`FilterSlot`] and spliced into a template by
//! [`crate::compose`].

mod builders;

pub use builders::{
    any_of, array_contains, campaign, date_bounds, equals, hashtags, period_bounds,
    project_hashtags, project_ids, spatial, time_range, user_names, year_of, SpatialRelation,
};

use std::collections::BTreeMap;

use crate::sql::{table_col, Dialect, Expr, SqlValue};

/// A column qualified by the table alias a template binds it to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnRef {
    pub table: &'static str,
    pub column: &'static str,
}

impl ColumnRef {
    pub const fn new(table: &'static str, column: &'static str) -> Self {
        Self { table, column }
    }

    pub fn expr(&self) -> Expr {
        table_col(self.table, self.column)
    }
}

impl std::fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.table, self.column)
    }
}

/// A parameterized boolean expression, or nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredicateFragment {
    expr: Option<Expr>,
    required_columns: Vec<ColumnRef>,
}

impl PredicateFragment {
    /// The null fragment: contributes no predicate and no parameters.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new(expr: Expr, required_columns: Vec<ColumnRef>) -> Self {
        Self {
            expr: Some(expr),
            required_columns,
        }
    }

    pub fn is_none(&self) -> bool {
        self.expr.is_none()
    }

    pub fn expr(&self) -> Option<&Expr> {
        self.expr.as_ref()
    }

    pub fn required_columns(&self) -> &[ColumnRef] {
        &self.required_columns
    }

    /// Fragment text on its own, placeholders numbered from 1.
    pub fn sql_text(&self, dialect: Dialect) -> Option<String> {
        self.expr
            .as_ref()
            .map(|e| e.to_tokens().render(dialect).0)
    }

    /// Bound values in placeholder order.
    pub fn bound_parameters(&self) -> Vec<SqlValue> {
        self.expr.as_ref().map(Expr::params).unwrap_or_default()
    }

    /// Both fragments, ANDed. The null fragment is the identity.
    pub fn and(self, other: PredicateFragment) -> PredicateFragment {
        use crate::sql::ExprExt;

        match (self.expr, other.expr) {
            (Some(a), Some(b)) => {
                let mut columns = self.required_columns;
                for column in other.required_columns {
                    if !columns.contains(&column) {
                        columns.push(column);
                    }
                }
                PredicateFragment::new(a.and(b), columns)
            }
            (Some(a), None) => PredicateFragment::new(a, self.required_columns),
            (None, Some(b)) => PredicateFragment::new(b, other.required_columns),
            (None, None) => PredicateFragment::none(),
        }
    }
}

/// Fixed positions where templates accept a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FilterSlot {
    Time,
    Campaign,
    Users,
    UserId,
    Projects,
    IssueTypes,
    Geometry,
    Country,
    Organisation,
    TopicTypes,
    EventType,
    Frequency,
    Names,
    Status,
    Year,
}

impl FilterSlot {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterSlot::Time => "time",
            FilterSlot::Campaign => "campaign",
            FilterSlot::Users => "users",
            FilterSlot::UserId => "user_id",
            FilterSlot::Projects => "projects",
            FilterSlot::IssueTypes => "issue_types",
            FilterSlot::Geometry => "geometry",
            FilterSlot::Country => "country",
            FilterSlot::Organisation => "organisation",
            FilterSlot::TopicTypes => "topic_types",
            FilterSlot::EventType => "event_type",
            FilterSlot::Frequency => "frequency",
            FilterSlot::Names => "names",
            FilterSlot::Status => "status",
            FilterSlot::Year => "year",
        }
    }
}

impl std::fmt::Display for FilterSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fragments keyed by slot. Null fragments are not stored, so an absent
/// filter and a null fragment are the same thing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FragmentSet {
    fragments: BTreeMap<FilterSlot, PredicateFragment>,
}

impl FragmentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fragment for `slot`, replacing any earlier one.
    pub fn insert(&mut self, slot: FilterSlot, fragment: PredicateFragment) -> &mut Self {
        if fragment.is_none() {
            self.fragments.remove(&slot);
        } else {
            self.fragments.insert(slot, fragment);
        }
        self
    }

    /// Builder form of [`FragmentSet::insert`].
    pub fn with(mut self, slot: FilterSlot, fragment: PredicateFragment) -> Self {
        self.insert(slot, fragment);
        self
    }

    pub fn get(&self, slot: FilterSlot) -> Option<&PredicateFragment> {
        self.fragments.get(&slot)
    }

    /// Expression for `slot`, cloned for splicing into a template.
    pub fn expr(&self, slot: FilterSlot) -> Option<Expr> {
        self.get(slot).and_then(|f| f.expr()).cloned()
    }

    pub fn contains(&self, slot: FilterSlot) -> bool {
        self.fragments.contains_key(&slot)
    }

    pub fn slots(&self) -> impl Iterator<Item = FilterSlot> + '_ {
        self.fragments.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FilterSlot, &PredicateFragment)> {
        self.fragments.iter().map(|(slot, f)| (*slot, f))
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }
}
