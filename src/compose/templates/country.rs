use super::{column, splice, Backend, TemplateSpec};
use crate::compose::schema::{changesets as c, countries as b, table};
use crate::predicate::{ColumnRef, FilterSlot, FragmentSet};
use crate::sql::{arrow, cast, count_distinct, func, sum, Expr, ExprExt, OrderByExpr, Query};

pub(crate) static STATISTICS: TemplateSpec = TemplateSpec {
    backend: Backend::Underpass,
    accepted: &[FilterSlot::Time, FilterSlot::Campaign, FilterSlot::Geometry],
    required: &[],
    columns: &[c::CREATED_AT, c::HASHTAGS, c::BBOX, b::ISO3],
    geometry: true,
};

fn total(store: ColumnRef, key: &'static str) -> Expr {
    sum(cast(arrow(store.expr(), key), "NUMERIC"))
}

/// Contribution totals per country whose boundary the changesets touch.
pub(crate) fn statistics(fragments: &FragmentSet, geometry: bool) -> Query {
    let mut query = Query::new().select(vec![
        column(b::ISO3),
        column(b::NAME),
        count_distinct(c::USER_ID.expr()).alias("contributors"),
        total(c::ADDED, "building").alias("added_buildings"),
        total(c::MODIFIED, "building").alias("modified_buildings"),
        total(c::ADDED, "highway_km").alias("added_highway_km"),
        total(c::MODIFIED, "highway_km").alias("modified_highway_km"),
    ]);
    let mut group_by = vec![b::ISO3.expr(), b::NAME.expr()];
    if geometry {
        query = query.add_select(
            func("ST_AsGeoJSON", vec![b::BOUNDARY.expr()]).alias("geometry"),
        );
        group_by.push(b::BOUNDARY.expr());
    }

    let query = query.from(table(b::TABLE, b::ALIAS)).inner_join(
        table(c::TABLE, c::ALIAS),
        func("ST_Intersects", vec![b::BOUNDARY.expr(), c::BBOX.expr()]),
    );
    splice(query, fragments, STATISTICS.accepted)
        .group_by(group_by)
        .order_by(vec![OrderByExpr::asc(b::NAME.expr())])
}
