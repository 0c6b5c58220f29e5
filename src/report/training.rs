use serde_json::Value;

use super::context::ReportContext;
use super::error::ReportResult;
use super::shape::{ColumnSpec, ReportBody, ReportOutcome};
use crate::compose::schema::training as t;
use crate::compose::Template;
use crate::predicate::{any_of, date_bounds, equals, FilterSlot, FragmentSet};
use crate::request::{TrainingOrganisationsRequest, TrainingRequest};

const ORGANISATIONS: &[ColumnSpec] = &[
    ColumnSpec::new("id", "id"),
    ColumnSpec::new("name", "name"),
];

const TRAININGS: &[ColumnSpec] = &[
    ColumnSpec::new("tid", "tid"),
    ColumnSpec::new("name", "name"),
    ColumnSpec::new("location", "location"),
    ColumnSpec::new("organization", "organization"),
    ColumnSpec::new("event_type", "eventType"),
    ColumnSpec::new("topic_type", "topicType"),
    ColumnSpec::new("topics", "topics"),
    ColumnSpec::new("hours", "hours"),
    ColumnSpec::new("date", "date"),
];

pub(crate) fn training_fragments(request: &TrainingRequest) -> FragmentSet {
    let mut fragments = FragmentSet::new().with(
        FilterSlot::Time,
        date_bounds(t::DATE, t::DATE, &request.dates),
    );
    if let Some(oid) = request.oid {
        fragments.insert(FilterSlot::Organisation, equals(t::ORGANIZATION, oid));
    }
    if let Some(topics) = &request.topic_types {
        fragments.insert(FilterSlot::TopicTypes, any_of(t::TOPIC_TYPE, topics.names()));
    }
    if let Some(event_type) = request.event_type {
        fragments.insert(FilterSlot::EventType, equals(t::EVENT_TYPE, event_type.as_str()));
    }
    fragments
}

pub fn organisations(ctx: &ReportContext, input: &Value) -> ReportResult<ReportOutcome> {
    ctx.run(input, |_: &TrainingOrganisationsRequest| {
        Ok(ReportBody::Records(ctx.records(
            Template::TrainingOrganisations,
            &FragmentSet::new(),
            ORGANISATIONS,
        )?))
    })
}

pub fn list(ctx: &ReportContext, input: &Value) -> ReportResult<ReportOutcome> {
    ctx.run(input, |request: &TrainingRequest| {
        Ok(ReportBody::Records(ctx.records(
            Template::TrainingList,
            &training_fragments(request),
            TRAININGS,
        )?))
    })
}
