use serde_json::Value;

use super::context::ReportContext;
use super::error::ReportResult;
use super::shape::{ColumnSpec, ReportBody, ReportOutcome};
use crate::compose::schema::{organisations as o, projects as p};
use crate::compose::Template;
use crate::predicate::{any_of, array_contains, equals, year_of, FilterSlot, FragmentSet};
use crate::request::ValidatorStatsRequest;

const VALIDATOR_STATS: &[ColumnSpec] = &[
    ColumnSpec::new("user_id", "userId"),
    ColumnSpec::new("username", "username"),
    ColumnSpec::new("mapping_level", "mappingLevel"),
    ColumnSpec::new("project_id", "projectId"),
    ColumnSpec::new("validated_tasks", "validatedTasks").zero_if_null(),
    ColumnSpec::new("project_status", "projectStatus"),
    ColumnSpec::new("organisation_name", "organisationName"),
    ColumnSpec::new("total_tasks", "totalTasks").zero_if_null(),
    ColumnSpec::new("tasks_mapped", "tasksMapped").zero_if_null(),
    ColumnSpec::new("tasks_validated", "tasksValidated").zero_if_null(),
    ColumnSpec::new("country", "country"),
];

pub(crate) fn validator_fragments(request: &ValidatorStatsRequest) -> FragmentSet {
    let mut fragments = FragmentSet::new().with(FilterSlot::Year, year_of(p::CREATED, request.year));
    if let Some(status) = request.status {
        fragments.insert(FilterSlot::Status, equals(p::STATUS, status.code()));
    }
    if let Some(organisations) = &request.organisations {
        fragments.insert(FilterSlot::Organisation, any_of(o::NAME, organisations.clone()));
    }
    if let Some(country) = &request.country {
        fragments.insert(FilterSlot::Country, array_contains(p::COUNTRY, country.as_str()));
    }
    fragments
}

/// Validated tasks per validator and project. Runs on the tasking-manager
/// database only.
pub fn stats(ctx: &ReportContext, input: &Value) -> ReportResult<ReportOutcome> {
    ctx.run(input, |request: &ValidatorStatsRequest| {
        Ok(ReportBody::Records(ctx.records(
            Template::ValidatorStats,
            &validator_fragments(request),
            VALIDATOR_STATS,
        )?))
    })
}
