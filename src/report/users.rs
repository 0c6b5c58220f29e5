use serde_json::Value;

use super::context::ReportContext;
use super::error::ReportResult;
use super::shape::{ColumnSpec, ReportBody, ReportOutcome};
use crate::compose::schema::{changesets as c, users as u};
use crate::compose::Template;
use crate::predicate::{campaign, equals, time_range, user_names, FilterSlot, FragmentSet};
use crate::request::{UserStatsRequest, UsersListRequest};

const USER_IDS: &[ColumnSpec] = &[
    ColumnSpec::new("user_id", "userId"),
    ColumnSpec::new("user_name", "userName"),
];

const USER_STATISTICS: &[ColumnSpec] = &[
    ColumnSpec::new("added_buildings", "addedBuildings").zero_if_null(),
    ColumnSpec::new("modified_buildings", "modifiedBuildings").zero_if_null(),
    ColumnSpec::new("added_highway", "addedHighway").zero_if_null(),
    ColumnSpec::new("modified_highway", "modifiedHighway").zero_if_null(),
    ColumnSpec::new("added_highway_km", "addedHighwayKm").zero_if_null(),
    ColumnSpec::new("modified_highway_km", "modifiedHighwayKm").zero_if_null(),
];

/// Ids of the named users who edited in the window.
pub fn lookup(ctx: &ReportContext, input: &Value) -> ReportResult<ReportOutcome> {
    ctx.run(input, |request: &UsersListRequest| {
        let fragments = FragmentSet::new()
            .with(FilterSlot::Users, user_names(u::USERNAME, &request.user_names))
            .with(FilterSlot::Time, time_range(c::CREATED_AT, &request.time));
        Ok(ReportBody::Records(ctx.records(
            Template::UserIds,
            &fragments,
            USER_IDS,
        )?))
    })
}

/// Building and highway totals for one user. A user without edits gets zeros.
pub fn statistics(ctx: &ReportContext, input: &Value) -> ReportResult<ReportOutcome> {
    ctx.run(input, |request: &UserStatsRequest| {
        let fragments = FragmentSet::new()
            .with(FilterSlot::UserId, equals(c::USER_ID, request.user_id))
            .with(FilterSlot::Time, time_range(c::CREATED_AT, &request.time))
            .with(
                FilterSlot::Campaign,
                campaign(
                    c::HASHTAGS,
                    request.hashtags.as_ref(),
                    request.project_ids.as_ref(),
                ),
            );
        Ok(ReportBody::Records(ctx.records(
            Template::UserStatistics,
            &fragments,
            USER_STATISTICS,
        )?))
    })
}
