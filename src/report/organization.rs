use serde_json::Value;

use super::context::ReportContext;
use super::error::ReportResult;
use super::shape::{ColumnSpec, ReportBody, ReportOutcome};
use crate::compose::schema::{hashtag as h, hashtag_stats as hs};
use crate::compose::Template;
use crate::predicate::{any_of, equals, period_bounds, FilterSlot, FragmentSet};
use crate::request::OrganizationHashtagRequest;

const HASHTAG_STATS: &[ColumnSpec] = &[
    ColumnSpec::new("hashtag", "hashtag"),
    ColumnSpec::new("frequency", "frequency"),
    ColumnSpec::new("start_date", "startDate"),
    ColumnSpec::new("end_date", "endDate"),
    ColumnSpec::new("total_new_buildings", "totalNewBuildings").zero_if_null(),
    ColumnSpec::new("total_unique_contributors", "totalUniqueContributors").zero_if_null(),
    ColumnSpec::new("total_new_road_meters", "totalNewRoadMeters").zero_if_null(),
    ColumnSpec::new("total_new_amenities", "totalNewAmenities").zero_if_null(),
    ColumnSpec::new("total_new_places", "totalNewPlaces").zero_if_null(),
];

/// Stored periods of the requested frequency lying inside the date bounds.
pub(crate) fn hashtag_fragments(request: &OrganizationHashtagRequest) -> FragmentSet {
    let frequency = request.frequency;
    FragmentSet::new()
        .with(
            FilterSlot::Names,
            any_of(h::NAME, request.hashtags.tags().to_vec()),
        )
        .with(FilterSlot::Frequency, equals(hs::TYPE, frequency.code()))
        .with(
            FilterSlot::Time,
            period_bounds(
                hs::START_DATE,
                hs::END_DATE,
                &request.dates,
                frequency.boundary_hour(),
            ),
        )
}

pub fn hashtags(ctx: &ReportContext, input: &Value) -> ReportResult<ReportOutcome> {
    ctx.run(input, |request: &OrganizationHashtagRequest| {
        Ok(ReportBody::Records(ctx.records(
            Template::OrganizationHashtags,
            &hashtag_fragments(request),
            HASHTAG_STATS,
        )?))
    })
}
