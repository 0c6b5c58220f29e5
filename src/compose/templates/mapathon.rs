//! Mapathon templates over changesets within a time window and campaign.

use super::{column, splice, Backend, TemplateSpec};
use crate::compose::schema::{changesets as c, table, users as u};
use crate::predicate::{ColumnRef, FilterSlot, FragmentSet};
use crate::sql::{
    arrow, cast, coalesce, col, count_distinct, func, func_distinct, lit_int, lit_str, sum,
    table_col, Cte, Expr, ExprExt, OrderByExpr, Query, SelectExpr, TableRef,
};

const SLOTS: &[FilterSlot] = &[FilterSlot::Time, FilterSlot::Campaign];
const COLUMNS: &[ColumnRef] = &[c::CREATED_AT, c::HASHTAGS];

pub(crate) static SUMMARY_FEATURES: TemplateSpec = TemplateSpec {
    backend: Backend::Underpass,
    accepted: SLOTS,
    required: SLOTS,
    columns: COLUMNS,
    geometry: false,
};

pub(crate) static CONTRIBUTOR_COUNT: TemplateSpec = TemplateSpec {
    backend: Backend::Underpass,
    accepted: SLOTS,
    required: SLOTS,
    columns: COLUMNS,
    geometry: false,
};

pub(crate) static USER_FEATURES: TemplateSpec = TemplateSpec {
    backend: Backend::Underpass,
    accepted: SLOTS,
    required: SLOTS,
    columns: COLUMNS,
    geometry: false,
};

pub(crate) static CONTRIBUTORS: TemplateSpec = TemplateSpec {
    backend: Backend::Underpass,
    accepted: SLOTS,
    required: SLOTS,
    columns: COLUMNS,
    geometry: true,
};

/// Changesets in the window, optionally joined to their authors.
fn changesets(fragments: &FragmentSet, select: Vec<SelectExpr>, with_users: bool) -> Query {
    let mut query = Query::new().select(select).from(table(c::TABLE, c::ALIAS));
    if with_users {
        query = query.inner_join(table(u::TABLE, u::ALIAS), u::ID.expr().eq(c::USER_ID.expr()));
    }
    splice(query, fragments, SLOTS)
}

/// One row per (feature, count) pair of the `added` and `modified` hstores
/// of `source`, tagged `create` or `modify`, carrying `carry` along.
fn feature_counts(source: &str, carry: &[&str]) -> Query {
    let side = |store: &str, action: &'static str| {
        let mut query = Query::new().select(vec![
            func("SKEYS", vec![table_col(source, store)]).alias("feature"),
            cast(func("SVALS", vec![table_col(source, store)]), "INTEGER").alias("count"),
            lit_str(action).alias("action"),
        ]);
        for name in carry {
            query = query.add_select(table_col(source, name));
        }
        query.from(TableRef::new(source))
    };
    side("added", "create")
        .union_all(side("modified", "modify"))
        .into_query()
}

pub(crate) fn summary_features(fragments: &FragmentSet) -> Query {
    let t2 = |name: &str| table_col("t2", name);
    Query::new()
        .with_cte(Cte::new(
            "t1",
            changesets(fragments, vec![column(c::ADDED), column(c::MODIFIED)], false),
        ))
        .with_cte(Cte::new("t2", feature_counts("t1", &[])))
        .select(vec![
            SelectExpr::new(t2("feature")),
            SelectExpr::new(t2("action")),
            sum(t2("count")).alias("count"),
        ])
        .from(TableRef::new("t2"))
        .group_by(vec![t2("feature"), t2("action")])
        .order_by(vec![OrderByExpr::desc(col("count"))])
}

pub(crate) fn contributor_count(fragments: &FragmentSet) -> Query {
    changesets(
        fragments,
        vec![count_distinct(c::USER_ID.expr()).alias("contributors_count")],
        false,
    )
}

pub(crate) fn user_features(fragments: &FragmentSet) -> Query {
    let t1 = changesets(
        fragments,
        vec![
            column(c::USER_ID),
            column(u::USERNAME),
            column(c::ADDED),
            column(c::MODIFIED),
            column(c::EDITOR),
        ],
        true,
    );
    let t2 = |name: &str| table_col("t2", name);
    Query::new()
        .with_cte(Cte::new("t1", t1))
        .with_cte(Cte::new(
            "t2",
            feature_counts("t1", &["user_id", "username", "editor"]),
        ))
        .select(vec![
            SelectExpr::new(t2("user_id")),
            SelectExpr::new(t2("username")),
            SelectExpr::new(t2("feature")),
            SelectExpr::new(t2("action")),
            sum(t2("count")).alias("count"),
            func_distinct("STRING_AGG", vec![t2("editor"), lit_str(",")]).alias("editors"),
        ])
        .from(TableRef::new("t2"))
        .group_by(vec![t2("user_id"), t2("username"), t2("feature"), t2("action")])
        .order_by(vec![
            OrderByExpr::asc(t2("username")),
            OrderByExpr::desc(col("count")),
        ])
}

fn building_total(source: &str, store: &'static str) -> Expr {
    sum(cast(arrow(table_col(source, store), "building"), "NUMERIC"))
}

/// Buildings and editors per contributor. The geometry variant adds the
/// collected changeset boxes as GeoJSON.
pub(crate) fn contributors(fragments: &FragmentSet, geometry: bool) -> Query {
    let mut select = vec![
        column(c::USER_ID),
        column(u::USERNAME),
        column(c::ADDED),
        column(c::MODIFIED),
        column(c::EDITOR),
    ];
    if geometry {
        select.push(column(c::BBOX));
    }
    let t1 = changesets(fragments, select, true);

    let t1c = |name: &str| table_col("t1", name);
    let mut per_user = Query::new().select(vec![
        SelectExpr::new(t1c("user_id")),
        SelectExpr::new(t1c("username")),
        building_total("t1", "added").alias("added_buildings"),
        building_total("t1", "modified").alias("modified_buildings"),
        func_distinct("STRING_AGG", vec![t1c("editor"), lit_str(",")]).alias("editors"),
    ]);
    if geometry {
        per_user = per_user.add_select(
            func("ST_AsGeoJSON", vec![func("ST_Collect", vec![t1c("bbox")])]).alias("geometry"),
        );
    }
    let per_user = per_user
        .from(TableRef::new("t1"))
        .group_by(vec![t1c("user_id"), t1c("username")]);

    let t2 = |name: &str| table_col("t2", name);
    let mut query = Query::new()
        .with_cte(Cte::new("t1", t1))
        .with_cte(Cte::new("t2", per_user))
        .select(vec![
            SelectExpr::new(t2("user_id")),
            SelectExpr::new(t2("username")),
            coalesce(vec![t2("added_buildings"), lit_int(0)])
                .add(coalesce(vec![t2("modified_buildings"), lit_int(0)]))
                .alias("total_buildings"),
            SelectExpr::new(t2("editors")),
        ]);
    if geometry {
        query = query.add_select(t2("geometry"));
    }
    query
        .from(TableRef::new("t2"))
        .order_by(vec![OrderByExpr::desc(col("total_buildings"))])
}
