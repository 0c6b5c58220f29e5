use super::{named, splice, Backend, TemplateSpec};
use crate::compose::schema::{changesets as c, table, users as u};
use crate::predicate::{FilterSlot, FragmentSet};
use crate::sql::{arrow, cast, col, sum, ExprExt, OrderByExpr, Query, SelectExpr};

pub(crate) static USER_IDS: TemplateSpec = TemplateSpec {
    backend: Backend::Underpass,
    accepted: &[FilterSlot::Users, FilterSlot::Time],
    required: &[FilterSlot::Users, FilterSlot::Time],
    columns: &[u::USERNAME, c::CREATED_AT],
    geometry: false,
};

pub(crate) static USER_STATISTICS: TemplateSpec = TemplateSpec {
    backend: Backend::Underpass,
    accepted: &[FilterSlot::UserId, FilterSlot::Time, FilterSlot::Campaign],
    required: &[FilterSlot::UserId, FilterSlot::Time],
    columns: &[c::USER_ID, c::CREATED_AT, c::HASHTAGS],
    geometry: false,
};

/// Ids of the named users who have a changeset in the window.
pub(crate) fn user_ids(fragments: &FragmentSet) -> Query {
    let query = Query::new()
        .distinct()
        .select(vec![named(u::ID, "user_id"), named(u::USERNAME, "user_name")])
        .from(table(u::TABLE, u::ALIAS))
        .inner_join(table(c::TABLE, c::ALIAS), c::USER_ID.expr().eq(u::ID.expr()));
    splice(query, fragments, USER_IDS.accepted)
        .order_by(vec![OrderByExpr::asc(col("user_name"))])
}

/// Sum of one hstore key over the user's changesets.
fn total(store: crate::predicate::ColumnRef, key: &'static str, alias: &str) -> SelectExpr {
    sum(cast(arrow(store.expr(), key), "NUMERIC")).alias(alias)
}

pub(crate) fn user_statistics(fragments: &FragmentSet) -> Query {
    let query = Query::new()
        .select(vec![
            SelectExpr::new(c::USER_ID.expr()),
            total(c::ADDED, "building", "added_buildings"),
            total(c::MODIFIED, "building", "modified_buildings"),
            total(c::ADDED, "highway", "added_highway"),
            total(c::MODIFIED, "highway", "modified_highway"),
            total(c::ADDED, "highway_km", "added_highway_km"),
            total(c::MODIFIED, "highway_km", "modified_highway_km"),
        ])
        .from(table(c::TABLE, c::ALIAS));
    splice(query, fragments, USER_STATISTICS.accepted).group_by(vec![c::USER_ID.expr()])
}
