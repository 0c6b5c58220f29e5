use serde_json::Value;

use super::context::ReportContext;
use super::error::ReportResult;
use super::shape::{ColumnSpec, FeatureSet, ReportBody, ReportOutcome};
use crate::compose::schema::{changesets as c, countries as b};
use crate::compose::Template;
use crate::predicate::{campaign, spatial, time_range, FilterSlot, FragmentSet, SpatialRelation};
use crate::request::CountryRequest;
use crate::validation::OutputType;

const COUNTRIES: &[ColumnSpec] = &[
    ColumnSpec::new("iso3", "iso3"),
    ColumnSpec::new("name", "name"),
    ColumnSpec::new("contributors", "contributors").zero_if_null(),
    ColumnSpec::new("added_buildings", "addedBuildings").zero_if_null(),
    ColumnSpec::new("modified_buildings", "modifiedBuildings").zero_if_null(),
    ColumnSpec::new("added_highway_km", "addedHighwayKm").zero_if_null(),
    ColumnSpec::new("modified_highway_km", "modifiedHighwayKm").zero_if_null(),
];

/// Every filter is optional; an empty request yields an empty set.
pub(crate) fn country_fragments(request: &CountryRequest) -> FragmentSet {
    let mut fragments = FragmentSet::new();
    if let Some(time) = &request.time {
        fragments.insert(FilterSlot::Time, time_range(c::CREATED_AT, time));
    }
    fragments.insert(
        FilterSlot::Campaign,
        campaign(c::HASHTAGS, request.hashtags.as_ref(), None),
    );
    if let Some(geometry) = &request.geometry {
        fragments.insert(
            FilterSlot::Geometry,
            spatial(c::BBOX, b::ISO3, geometry, SpatialRelation::Intersects),
        );
    }
    fragments
}

/// Contribution totals per country; as GeoJSON, each country's boundary.
pub fn statistics(ctx: &ReportContext, input: &Value) -> ReportResult<ReportOutcome> {
    ctx.run(input, |request: &CountryRequest| {
        let fragments = country_fragments(request);
        if request.output_type == OutputType::Geojson {
            let rows = ctx.fetch(Template::CountryStatistics, &fragments, true)?;
            return Ok(ReportBody::Features(FeatureSet::geometries(
                Template::CountryStatistics,
                &rows,
                "geometry",
                COUNTRIES,
            )?));
        }
        Ok(ReportBody::Records(ctx.records(
            Template::CountryStatistics,
            &fragments,
            COUNTRIES,
        )?))
    })
}
