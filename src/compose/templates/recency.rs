use super::{Backend, TemplateSpec};
use crate::compose::schema::{changesets as c, table, validation as v};
use crate::predicate::ColumnRef;
use crate::sql::{func, max, ExprExt, Query};

pub(crate) static CHANGESETS: TemplateSpec = TemplateSpec {
    backend: Backend::Underpass,
    accepted: &[],
    required: &[],
    columns: &[],
    geometry: false,
};

pub(crate) static VALIDATION: TemplateSpec = TemplateSpec {
    backend: Backend::Underpass,
    accepted: &[],
    required: &[],
    columns: &[],
    geometry: false,
};

/// `NOW() - MAX(column) AS last_updated`
fn since_newest(newest: ColumnRef, table_name: &str, alias: &str) -> Query {
    Query::new()
        .select(vec![func("NOW", vec![])
            .sub(max(newest.expr()))
            .alias("last_updated")])
        .from(table(table_name, alias))
}

pub(crate) fn changesets() -> Query {
    since_newest(c::UPDATED_AT, c::TABLE, c::ALIAS)
}

pub(crate) fn validation() -> Query {
    since_newest(v::TIMESTAMP, v::TABLE, v::ALIAS)
}
