//! Data-quality templates over validation results.
//!
//! `validation.status` is an array, so each template first unnests it into
//! the `vs` CTE (one row per issue) and matches issue types against that.

use super::{column, named, splice, Backend, TemplateSpec};
use crate::compose::schema::{changesets as c, issues, table, users as u, validation as v};
use crate::predicate::{FilterSlot, FragmentSet};
use crate::sql::{
    col, count, func, lit_str, table_col, Cte, Expr, ExprExt, OrderByExpr, Query, SelectExpr,
    TableRef,
};

pub(crate) static PROJECT: TemplateSpec = TemplateSpec {
    backend: Backend::Underpass,
    accepted: &[FilterSlot::Campaign, FilterSlot::IssueTypes],
    required: &[FilterSlot::Campaign, FilterSlot::IssueTypes],
    columns: &[c::HASHTAGS, issues::STATUS],
    geometry: false,
};

pub(crate) static USERNAME: TemplateSpec = TemplateSpec {
    backend: Backend::Underpass,
    accepted: &[FilterSlot::Users, FilterSlot::Time, FilterSlot::IssueTypes],
    required: &[FilterSlot::Users, FilterSlot::Time, FilterSlot::IssueTypes],
    columns: &[u::USERNAME, c::CREATED_AT, issues::STATUS],
    geometry: false,
};

pub(crate) static HASHTAG: TemplateSpec = TemplateSpec {
    backend: Backend::Underpass,
    accepted: &[
        FilterSlot::Geometry,
        FilterSlot::Time,
        FilterSlot::Campaign,
        FilterSlot::IssueTypes,
    ],
    required: &[FilterSlot::Time, FilterSlot::IssueTypes],
    columns: &[v::LOCATION, c::CREATED_AT, c::HASHTAGS, issues::STATUS],
    geometry: false,
};

pub(crate) static HASHTAG_SUMMARY: TemplateSpec = TemplateSpec {
    backend: Backend::Underpass,
    accepted: &[
        FilterSlot::Geometry,
        FilterSlot::Time,
        FilterSlot::Campaign,
        FilterSlot::IssueTypes,
    ],
    required: &[FilterSlot::Time, FilterSlot::IssueTypes],
    columns: &[v::LOCATION, c::CREATED_AT, c::HASHTAGS, issues::STATUS],
    geometry: false,
};

fn vs(name: &str) -> Expr {
    table_col(issues::ALIAS, name)
}

fn unnest(expr: Expr, alias: &str) -> SelectExpr {
    func("UNNEST", vec![expr]).alias(alias)
}

/// Validation rows with coordinates and one issue per row.
fn issue_rows(extra: Vec<SelectExpr>) -> Query {
    let mut select = vec![
        column(v::OSM_ID),
        column(v::CHANGE_ID),
        func("ST_X", vec![v::LOCATION.expr()]).alias("lng"),
        func("ST_Y", vec![v::LOCATION.expr()]).alias("lat"),
    ];
    select.extend(extra);
    select.push(unnest(v::STATUS.expr(), "status"));
    Query::new().select(select).from(table(v::TABLE, v::ALIAS))
}

/// `ARRAY_TO_STRING(ARRAY_AGG(vs.status), ',') AS issues`
fn issue_list() -> SelectExpr {
    func(
        "ARRAY_TO_STRING",
        vec![func("ARRAY_AGG", vec![vs("status")]), lit_str(",")],
    )
    .alias("issues")
}

fn join_changesets(query: Query) -> Query {
    query.inner_join(
        table(c::TABLE, c::ALIAS),
        c::ID.expr().eq(vs("change_id")),
    )
}

/// Issues on changesets carrying a project's hashtag.
pub(crate) fn project(fragments: &FragmentSet) -> Query {
    let changesets = splice(
        Query::new()
            .select(vec![column(c::ID)])
            .from(table(c::TABLE, c::ALIAS)),
        fragments,
        &[FilterSlot::Campaign],
    );
    let rows = issue_rows(vec![column(v::TIMESTAMP)]).inner_join(
        TableRef::new("t1"),
        table_col("t1", "id").eq(v::CHANGE_ID.expr()),
    );

    let query = Query::new()
        .with_cte(Cte::new("t1", changesets))
        .with_cte(Cte::new(issues::ALIAS, rows))
        .select(vec![
            SelectExpr::new(vs("osm_id")),
            SelectExpr::new(vs("change_id")).with_alias("changeset_id"),
            SelectExpr::new(vs("timestamp")).with_alias("changeset_timestamp"),
            issue_list(),
            SelectExpr::new(vs("lng")),
            SelectExpr::new(vs("lat")),
        ])
        .from(TableRef::new(issues::ALIAS));
    splice(query, fragments, &[FilterSlot::IssueTypes]).group_by(vec![
        vs("osm_id"),
        vs("change_id"),
        vs("timestamp"),
        vs("lng"),
        vs("lat"),
    ])
}

/// Issues on the named users' changesets within the window.
pub(crate) fn username(fragments: &FragmentSet) -> Query {
    let rows = splice(
        issue_rows(vec![column(u::USERNAME)])
            .inner_join(table(u::TABLE, u::ALIAS), u::ID.expr().eq(v::USER_ID.expr())),
        fragments,
        &[FilterSlot::Users],
    );

    let query = join_changesets(
        Query::new()
            .with_cte(Cte::new(issues::ALIAS, rows))
            .select(vec![
                SelectExpr::new(vs("osm_id")),
                SelectExpr::new(vs("change_id")).with_alias("changeset_id"),
                named(c::CREATED_AT, "changeset_timestamp"),
                issue_list(),
                SelectExpr::new(vs("username")),
                SelectExpr::new(vs("lng")),
                SelectExpr::new(vs("lat")),
            ])
            .from(TableRef::new(issues::ALIAS)),
    );
    splice(query, fragments, &[FilterSlot::Time, FilterSlot::IssueTypes]).group_by(vec![
        vs("osm_id"),
        vs("change_id"),
        c::CREATED_AT.expr(),
        vs("username"),
        vs("lng"),
        vs("lat"),
    ])
}

/// Issues on campaign changesets within the window and area.
pub(crate) fn hashtag(fragments: &FragmentSet) -> Query {
    let rows = splice(issue_rows(vec![]), fragments, &[FilterSlot::Geometry]);

    let query = join_changesets(
        Query::new()
            .with_cte(Cte::new(issues::ALIAS, rows))
            .select(vec![
                SelectExpr::new(vs("osm_id")),
                SelectExpr::new(vs("change_id")).with_alias("changeset_id"),
                named(c::CREATED_AT, "changeset_timestamp"),
                issue_list(),
                SelectExpr::new(vs("lng")),
                SelectExpr::new(vs("lat")),
            ])
            .from(TableRef::new(issues::ALIAS)),
    );
    splice(
        query,
        fragments,
        &[FilterSlot::Time, FilterSlot::Campaign, FilterSlot::IssueTypes],
    )
    .group_by(vec![
        vs("osm_id"),
        vs("change_id"),
        c::CREATED_AT.expr(),
        vs("lng"),
        vs("lat"),
    ])
}

/// Offending tag values counted per validation source.
pub(crate) fn hashtag_summary(fragments: &FragmentSet) -> Query {
    let rows = splice(
        Query::new()
            .select(vec![
                column(v::CHANGE_ID),
                column(v::SOURCE),
                unnest(v::STATUS.expr(), "status"),
                unnest(v::VALUES.expr(), "value"),
            ])
            .from(table(v::TABLE, v::ALIAS)),
        fragments,
        &[FilterSlot::Geometry],
    );

    let query = join_changesets(
        Query::new()
            .with_cte(Cte::new(issues::ALIAS, rows))
            .select(vec![
                SelectExpr::new(vs("value")),
                SelectExpr::new(vs("source")),
                count(vs("value")).alias("count"),
            ])
            .from(TableRef::new(issues::ALIAS))
            .filter(vs("value").is_not_null()),
    );
    splice(
        query,
        fragments,
        &[FilterSlot::Time, FilterSlot::Campaign, FilterSlot::IssueTypes],
    )
    .group_by(vec![vs("value"), vs("source")])
    .order_by(vec![OrderByExpr::desc(col("count"))])
}
