//! Tasking-manager templates: per-user task history and validator work.

use super::{column, named, splice, Backend, TemplateSpec};
use crate::compose::schema::{
    organisations as o, projects as p, table, task_history as th, tasks as tk, tm_users as tu,
};
use crate::predicate::{ColumnRef, FilterSlot, FragmentSet};
use crate::sql::{
    case_when, cast, coalesce, col, count, count_distinct, func, lit_int, lit_str, sum,
    table_col, Cte, Expr, ExprExt, OrderByExpr, Query, SelectExpr, TableRef,
};

const HISTORY_SLOTS: &[FilterSlot] = &[FilterSlot::Time, FilterSlot::Projects];
const HISTORY_COLUMNS: &[ColumnRef] = &[th::ACTION_DATE, th::PROJECT_ID];

pub(crate) static TASKS_MAPPED: TemplateSpec = TemplateSpec {
    backend: Backend::TaskingManager,
    accepted: HISTORY_SLOTS,
    required: HISTORY_SLOTS,
    columns: HISTORY_COLUMNS,
    geometry: false,
};

pub(crate) static TASKS_VALIDATED: TemplateSpec = TemplateSpec {
    backend: Backend::TaskingManager,
    accepted: HISTORY_SLOTS,
    required: HISTORY_SLOTS,
    columns: HISTORY_COLUMNS,
    geometry: false,
};

pub(crate) static TIME_MAPPING: TemplateSpec = TemplateSpec {
    backend: Backend::TaskingManager,
    accepted: HISTORY_SLOTS,
    required: HISTORY_SLOTS,
    columns: HISTORY_COLUMNS,
    geometry: false,
};

pub(crate) static TIME_VALIDATING: TemplateSpec = TemplateSpec {
    backend: Backend::TaskingManager,
    accepted: HISTORY_SLOTS,
    required: HISTORY_SLOTS,
    columns: HISTORY_COLUMNS,
    geometry: false,
};

pub(crate) static VALIDATOR_STATS: TemplateSpec = TemplateSpec {
    backend: Backend::TaskingManager,
    accepted: &[
        FilterSlot::Year,
        FilterSlot::Status,
        FilterSlot::Organisation,
        FilterSlot::Country,
    ],
    required: &[],
    columns: &[p::CREATED, p::STATUS, o::NAME, p::COUNTRY],
    geometry: false,
};

/// One measure per user over the filtered task history.
fn per_user(fragments: &FragmentSet, measure: SelectExpr, actions: Expr) -> Query {
    let query = Query::new()
        .select(vec![column(th::USER_ID), measure])
        .from(table(th::TABLE, th::ALIAS))
        .filter(actions);
    splice(query, fragments, HISTORY_SLOTS).group_by(vec![th::USER_ID.expr()])
}

/// Lock durations are stored as interval text in `action_text`.
fn lock_seconds() -> Expr {
    func(
        "DATE_PART",
        vec![lit_str("epoch"), cast(th::ACTION_TEXT.expr(), "INTERVAL")],
    )
}

pub(crate) fn tasks_mapped(fragments: &FragmentSet) -> Query {
    per_user(
        fragments,
        count(th::TASK_ID.expr()).alias("tasks_mapped"),
        th::ACTION_TEXT.expr().eq(lit_str("MAPPED")),
    )
}

pub(crate) fn tasks_validated(fragments: &FragmentSet) -> Query {
    per_user(
        fragments,
        count(th::TASK_ID.expr()).alias("tasks_validated"),
        th::ACTION_TEXT.expr().eq(lit_str("VALIDATED")),
    )
}

pub(crate) fn time_mapping(fragments: &FragmentSet) -> Query {
    per_user(
        fragments,
        sum(lock_seconds()).alias("time_spent_mapping"),
        th::ACTION
            .expr()
            .in_list(vec![lit_str("LOCKED_FOR_MAPPING"), lit_str("AUTO_UNLOCKED_FOR_MAPPING")]),
    )
}

pub(crate) fn time_validating(fragments: &FragmentSet) -> Query {
    per_user(
        fragments,
        sum(lock_seconds()).alias("time_spent_validating"),
        th::ACTION.expr().eq(lit_str("LOCKED_FOR_VALIDATION")),
    )
}

fn mapping_level() -> Expr {
    let level = || tu::MAPPING_LEVEL.expr();
    case_when(
        vec![
            (level().eq(lit_int(1)), lit_str("BEGINNER")),
            (level().eq(lit_int(2)), lit_str("INTERMEDIATE")),
            (level().eq(lit_int(3)), lit_str("ADVANCED")),
        ],
        None,
    )
}

fn project_status() -> Expr {
    let status = || p::STATUS.expr();
    case_when(
        vec![
            (status().eq(lit_int(0)), lit_str("ARCHIVED")),
            (status().eq(lit_int(1)), lit_str("PUBLISHED")),
            (status().eq(lit_int(2)), lit_str("DRAFT")),
        ],
        None,
    )
}

/// Validated task counts per validator and project, with every project in
/// the filter listed even when nobody validated it.
pub(crate) fn validator_stats(fragments: &FragmentSet) -> Query {
    let validated = Query::new()
        .select(vec![
            named(tk::VALIDATED_BY, "user_id"),
            column(tk::PROJECT_ID),
            count_distinct(tk::ID.expr()).alias("validated_tasks"),
        ])
        .from(table(tk::TABLE, tk::ALIAS))
        .filter(tk::VALIDATED_BY.expr().is_not_null())
        .group_by(vec![tk::VALIDATED_BY.expr(), tk::PROJECT_ID.expr()]);

    let t1 = |name: &str| table_col("t1", name);
    let query = Query::new()
        .with_cte(Cte::new("t1", validated))
        .select(vec![
            coalesce(vec![t1("user_id"), lit_int(0)]).alias("user_id"),
            coalesce(vec![tu::USERNAME.expr(), lit_str("N/A")]).alias("username"),
            mapping_level().alias("mapping_level"),
            named(p::ID, "project_id"),
            coalesce(vec![t1("validated_tasks"), lit_int(0)]).alias("validated_tasks"),
            project_status().alias("project_status"),
            coalesce(vec![o::NAME.expr(), lit_str("N/A")]).alias("organisation_name"),
            column(p::TOTAL_TASKS),
            column(p::TASKS_MAPPED),
            column(p::TASKS_VALIDATED),
            func("ARRAY_TO_STRING", vec![p::COUNTRY.expr(), lit_str(",")]).alias("country"),
        ])
        .from(table(p::TABLE, p::ALIAS))
        .left_join(TableRef::new("t1"), t1("project_id").eq(p::ID.expr()))
        .left_join(table(tu::TABLE, tu::ALIAS), tu::ID.expr().eq(t1("user_id")))
        .left_join(table(o::TABLE, o::ALIAS), o::ID.expr().eq(p::ORGANISATION_ID.expr()));

    splice(query, fragments, VALIDATOR_STATS.accepted).order_by(vec![
        OrderByExpr::asc(col("username")).nulls_last(),
        OrderByExpr::asc(col("project_id")),
    ])
}
