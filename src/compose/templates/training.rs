use super::{column, named, splice, Backend, TemplateSpec};
use crate::compose::schema::{organizations as org, table, training as t};
use crate::predicate::{FilterSlot, FragmentSet};
use crate::sql::{ExprExt, OrderByExpr, Query};

pub(crate) static ORGANISATIONS: TemplateSpec = TemplateSpec {
    backend: Backend::Underpass,
    accepted: &[],
    required: &[],
    columns: &[],
    geometry: false,
};

pub(crate) static LIST: TemplateSpec = TemplateSpec {
    backend: Backend::Underpass,
    accepted: &[
        FilterSlot::Organisation,
        FilterSlot::TopicTypes,
        FilterSlot::EventType,
        FilterSlot::Time,
    ],
    required: &[],
    columns: &[t::ORGANIZATION, t::TOPIC_TYPE, t::EVENT_TYPE, t::DATE],
    geometry: false,
};

pub(crate) fn organisations() -> Query {
    Query::new()
        .select(vec![named(org::OID, "id"), column(org::NAME)])
        .from(table(org::TABLE, org::ALIAS))
        .order_by(vec![OrderByExpr::asc(org::OID.expr())])
}

/// Training events, newest first, with the organising body's name.
pub(crate) fn list(fragments: &FragmentSet) -> Query {
    let query = Query::new()
        .select(vec![
            column(t::TID),
            column(t::NAME),
            column(t::LOCATION),
            named(org::NAME, "organization"),
            named(t::EVENT_TYPE, "event_type"),
            named(t::TOPIC_TYPE, "topic_type"),
            column(t::TOPICS),
            column(t::HOURS),
            column(t::DATE),
        ])
        .from(table(t::TABLE, t::ALIAS))
        .left_join(
            table(org::TABLE, org::ALIAS),
            org::OID.expr().eq(t::ORGANIZATION.expr()),
        );
    splice(query, fragments, LIST.accepted).order_by(vec![
        OrderByExpr::desc(t::DATE.expr()),
        OrderByExpr::asc(t::TID.expr()),
    ])
}
