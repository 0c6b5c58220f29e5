//! Data-quality reports. Issues are point features at the flagged object;
//! CSV output flattens them to `lng`/`lat` columns.

use serde_json::Value;

use super::context::ReportContext;
use super::error::ReportResult;
use super::shape::{ColumnSpec, FeatureSet, ReportBody, ReportOutcome};
use crate::compose::schema::{changesets as c, countries as b, issues, users as u, validation as v};
use crate::compose::Template;
use crate::predicate::{
    any_of, campaign, project_hashtags, spatial, time_range, user_names, FilterSlot, FragmentSet,
    PredicateFragment, SpatialRelation,
};
use crate::request::{
    DataQualityHashtagRequest, DataQualityHashtagSummaryRequest, DataQualityProjectRequest,
    DataQualityUsernameRequest,
};
use crate::validation::IssueTypes;

const ISSUES: &[ColumnSpec] = &[
    ColumnSpec::new("osm_id", "osmId"),
    ColumnSpec::new("changeset_id", "changesetId"),
    ColumnSpec::new("changeset_timestamp", "changesetTimestamp"),
    ColumnSpec::new("issues", "issues"),
];

const USER_ISSUES: &[ColumnSpec] = &[
    ColumnSpec::new("osm_id", "osmId"),
    ColumnSpec::new("changeset_id", "changesetId"),
    ColumnSpec::new("changeset_timestamp", "changesetTimestamp"),
    ColumnSpec::new("issues", "issues"),
    ColumnSpec::new("username", "username"),
];

const ISSUE_VALUES: &[ColumnSpec] = &[
    ColumnSpec::new("value", "value"),
    ColumnSpec::new("source", "source"),
    ColumnSpec::new("count", "count").zero_if_null(),
];

fn issue_types(types: &IssueTypes) -> PredicateFragment {
    any_of(issues::STATUS, types.names())
}

fn issue_points(
    ctx: &ReportContext,
    template: Template,
    fragments: &FragmentSet,
    specs: &[ColumnSpec],
) -> ReportResult<ReportBody> {
    let rows = ctx.fetch(template, fragments, false)?;
    Ok(ReportBody::Features(FeatureSet::points(
        template, &rows, "lng", "lat", specs,
    )?))
}

pub fn project(ctx: &ReportContext, input: &Value) -> ReportResult<ReportOutcome> {
    ctx.run(input, |request: &DataQualityProjectRequest| {
        let fragments = FragmentSet::new()
            .with(
                FilterSlot::Campaign,
                project_hashtags(c::HASHTAGS, &request.project_ids),
            )
            .with(FilterSlot::IssueTypes, issue_types(&request.issue_types));
        issue_points(ctx, Template::DataQualityProject, &fragments, ISSUES)
    })
}

pub fn username(ctx: &ReportContext, input: &Value) -> ReportResult<ReportOutcome> {
    ctx.run(input, |request: &DataQualityUsernameRequest| {
        let fragments = FragmentSet::new()
            .with(FilterSlot::Users, user_names(u::USERNAME, &request.osm_usernames))
            .with(FilterSlot::Time, time_range(c::CREATED_AT, &request.time))
            .with(FilterSlot::IssueTypes, issue_types(&request.issue_types));
        issue_points(ctx, Template::DataQualityUsername, &fragments, USER_ISSUES)
    })
}

/// Hashtag and area filters shared by the list and the summary.
pub(crate) fn hashtag_fragments(request: &DataQualityHashtagRequest) -> FragmentSet {
    let mut fragments = FragmentSet::new()
        .with(FilterSlot::Time, time_range(c::CREATED_AT, &request.time))
        .with(
            FilterSlot::Campaign,
            campaign(c::HASHTAGS, request.hashtags.as_ref(), None),
        )
        .with(FilterSlot::IssueTypes, issue_types(&request.issue_types));
    if let Some(geometry) = &request.geometry {
        fragments.insert(
            FilterSlot::Geometry,
            spatial(v::LOCATION, b::ISO3, geometry, SpatialRelation::Contains),
        );
    }
    fragments
}

pub fn hashtag(ctx: &ReportContext, input: &Value) -> ReportResult<ReportOutcome> {
    ctx.run(input, |request: &DataQualityHashtagRequest| {
        issue_points(
            ctx,
            Template::DataQualityHashtag,
            &hashtag_fragments(request),
            ISSUES,
        )
    })
}

/// Flagged values and how often each occurs.
pub fn hashtag_summary(ctx: &ReportContext, input: &Value) -> ReportResult<ReportOutcome> {
    ctx.run(input, |request: &DataQualityHashtagSummaryRequest| {
        Ok(ReportBody::Records(ctx.records(
            Template::DataQualityHashtagSummary,
            &hashtag_fragments(&request.0),
            ISSUE_VALUES,
        )?))
    })
}
