//! Mapathon reports: campaign-wide summary and per-contributor detail.

use serde_json::Value;
use tracing::debug;

use super::context::ReportContext;
use super::error::ReportResult;
use super::shape::{scalar, ColumnSpec, FeatureSet, ReportBody, ReportOutcome};
use crate::compose::schema::{changesets as c, task_history as th};
use crate::compose::Template;
use crate::predicate::{campaign, project_ids, time_range, FilterSlot, FragmentSet};
use crate::request::{MapathonDetailRequest, MapathonRequest, MapathonSummaryRequest};
use crate::validation::{OutputType, ProjectIds};

const MAPPED_FEATURES: &[ColumnSpec] = &[
    ColumnSpec::new("feature", "feature"),
    ColumnSpec::new("action", "action"),
    ColumnSpec::new("count", "count").zero_if_null(),
];

const USER_FEATURES: &[ColumnSpec] = &[
    ColumnSpec::new("user_id", "userId"),
    ColumnSpec::new("username", "username"),
    ColumnSpec::new("feature", "feature"),
    ColumnSpec::new("action", "action"),
    ColumnSpec::new("count", "count").zero_if_null(),
    ColumnSpec::new("editors", "editors"),
];

const CONTRIBUTORS: &[ColumnSpec] = &[
    ColumnSpec::new("user_id", "userId"),
    ColumnSpec::new("username", "username"),
    ColumnSpec::new("total_buildings", "totalBuildings").zero_if_null(),
    ColumnSpec::new("editors", "editors"),
];

const TASKS_MAPPED: &[ColumnSpec] = &[
    ColumnSpec::new("user_id", "userId"),
    ColumnSpec::new("tasks_mapped", "tasksMapped").zero_if_null(),
];

const TASKS_VALIDATED: &[ColumnSpec] = &[
    ColumnSpec::new("user_id", "userId"),
    ColumnSpec::new("tasks_validated", "tasksValidated").zero_if_null(),
];

const TIME_MAPPING: &[ColumnSpec] = &[
    ColumnSpec::new("user_id", "userId"),
    ColumnSpec::new("time_spent_mapping", "timeSpentMapping").zero_if_null(),
];

const TIME_VALIDATING: &[ColumnSpec] = &[
    ColumnSpec::new("user_id", "userId"),
    ColumnSpec::new("time_spent_validating", "timeSpentValidating").zero_if_null(),
];

/// Changesets in the window that carry a campaign hashtag.
pub(crate) fn changeset_fragments(request: &MapathonRequest) -> FragmentSet {
    FragmentSet::new()
        .with(FilterSlot::Time, time_range(c::CREATED_AT, &request.time))
        .with(
            FilterSlot::Campaign,
            campaign(
                c::HASHTAGS,
                request.hashtags.as_ref(),
                request.project_ids.as_ref(),
            ),
        )
}

/// Task history of the campaign's projects over the same window.
pub(crate) fn task_history_fragments(
    request: &MapathonRequest,
    projects: &ProjectIds,
) -> FragmentSet {
    FragmentSet::new()
        .with(FilterSlot::Time, time_range(th::ACTION_DATE, &request.time))
        .with(FilterSlot::Projects, project_ids(th::PROJECT_ID, projects))
}

/// Contributor count and mapped-feature totals for a campaign.
pub fn summary(ctx: &ReportContext, input: &Value) -> ReportResult<ReportOutcome> {
    ctx.run(input, |request: &MapathonSummaryRequest| {
        let fragments = changeset_fragments(&request.0);

        let rows = ctx.fetch(Template::MapathonContributorCount, &fragments, false)?;
        let contributors = scalar(
            Template::MapathonContributorCount,
            &rows,
            "contributors_count",
        )?;
        let features = ctx.records(
            Template::MapathonSummaryFeatures,
            &fragments,
            MAPPED_FEATURES,
        )?;

        Ok(ReportBody::Sections(vec![
            ("totalContributors", ReportBody::Value(contributors)),
            ("mappedFeatures", ReportBody::Records(features)),
        ]))
    })
}

/// Per-contributor detail. As GeoJSON, one feature per contributor over the
/// bounding boxes of their changesets.
pub fn detail(ctx: &ReportContext, input: &Value) -> ReportResult<ReportOutcome> {
    ctx.run(input, |request: &MapathonDetailRequest| {
        let request = &request.0;
        let fragments = changeset_fragments(request);

        if request.output_type == OutputType::Geojson {
            let rows = ctx.fetch(Template::MapathonContributors, &fragments, true)?;
            let features = FeatureSet::geometries(
                Template::MapathonContributors,
                &rows,
                "geometry",
                CONTRIBUTORS,
            )?;
            return Ok(ReportBody::Features(features));
        }

        let mut sections = vec![
            (
                "mappedFeatures",
                ReportBody::Records(ctx.records(
                    Template::MapathonUserFeatures,
                    &fragments,
                    USER_FEATURES,
                )?),
            ),
            (
                "contributors",
                ReportBody::Records(ctx.records(
                    Template::MapathonContributors,
                    &fragments,
                    CONTRIBUTORS,
                )?),
            ),
        ];

        match request.tasking_manager_projects() {
            Some(projects) if ctx.has_tasking_manager() => {
                let history = task_history_fragments(request, &projects);
                sections.push((
                    "taskingManager",
                    ReportBody::Sections(vec![
                        (
                            "tasksMapped",
                            ReportBody::Records(ctx.records(
                                Template::TmTasksMapped,
                                &history,
                                TASKS_MAPPED,
                            )?),
                        ),
                        (
                            "tasksValidated",
                            ReportBody::Records(ctx.records(
                                Template::TmTasksValidated,
                                &history,
                                TASKS_VALIDATED,
                            )?),
                        ),
                        (
                            "timeSpentMapping",
                            ReportBody::Records(ctx.records(
                                Template::TmTimeMapping,
                                &history,
                                TIME_MAPPING,
                            )?),
                        ),
                        (
                            "timeSpentValidating",
                            ReportBody::Records(ctx.records(
                                Template::TmTimeValidating,
                                &history,
                                TIME_VALIDATING,
                            )?),
                        ),
                    ]),
                ));
            }
            Some(_) => debug!("tasking-manager database not configured, skipping task sections"),
            None => {}
        }

        Ok(ReportBody::Sections(sections))
    })
}
