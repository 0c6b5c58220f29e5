use super::{column, named, splice, Backend, TemplateSpec};
use crate::compose::schema::{hashtag as h, hashtag_stats as hs, table};
use crate::predicate::{FilterSlot, FragmentSet};
use crate::sql::{ExprExt, OrderByExpr, Query};

pub(crate) static HASHTAGS: TemplateSpec = TemplateSpec {
    backend: Backend::Underpass,
    accepted: &[FilterSlot::Names, FilterSlot::Frequency, FilterSlot::Time],
    required: &[FilterSlot::Names, FilterSlot::Frequency],
    columns: &[h::NAME, hs::TYPE, hs::START_DATE, hs::END_DATE],
    geometry: false,
};

/// Precomputed per-period statistics for the requested hashtags.
pub(crate) fn hashtags(fragments: &FragmentSet) -> Query {
    let query = Query::new()
        .select(vec![
            named(h::NAME, "hashtag"),
            named(hs::TYPE, "frequency"),
            column(hs::START_DATE),
            column(hs::END_DATE),
            column(hs::TOTAL_NEW_BUILDINGS),
            named(hs::TOTAL_UQ_CONTRIBUTORS, "total_unique_contributors"),
            named(hs::TOTAL_NEW_ROAD_M, "total_new_road_meters"),
            named(hs::TOTAL_NEW_AMENITY, "total_new_amenities"),
            column(hs::TOTAL_NEW_PLACES),
        ])
        .from(table(hs::TABLE, hs::ALIAS))
        .inner_join(table(h::TABLE, h::ALIAS), h::ID.expr().eq(hs::HASHTAG_ID.expr()));
    splice(query, fragments, HASHTAGS.accepted).order_by(vec![
        OrderByExpr::asc(h::NAME.expr()),
        OrderByExpr::asc(hs::START_DATE.expr()),
    ])
}
