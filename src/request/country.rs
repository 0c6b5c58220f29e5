use serde_json::{Map, Value};

use super::{
    read_hashtags, read_optional_time_range, read_output_type, AppliedFilters, FilterRequest,
    ReportFamily,
};
use crate::validation::{
    parse, AliasTable, CountryCode, Fields, GeometryFilter, HashtagFilter, Limits, OutputType,
    Polygon, TimeRange, ValidationErrors,
};

/// Contribution statistics per country. Every filter is optional; an empty
/// request covers all countries over all time.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryRequest {
    pub time: Option<TimeRange>,
    pub hashtags: Option<HashtagFilter>,
    pub geometry: Option<GeometryFilter>,
    pub output_type: OutputType,
}

impl FilterRequest for CountryRequest {
    const FAMILY: ReportFamily = ReportFamily::Countries;
    const ALIASES: &'static AliasTable = &AliasTable::new(&[
        ("from_timestamp", "fromTimestamp"),
        ("to_timestamp", "toTimestamp"),
        ("hashtags", "hashtags"),
        ("match_mode", "matchMode"),
        ("geometry", "geometry"),
        ("iso3", "iso3"),
        ("output_type", "outputType"),
    ]);

    fn from_input(input: &Value, limits: &Limits) -> Result<Self, ValidationErrors> {
        let mut fields = Fields::read(input, Self::ALIASES);

        let time = read_optional_time_range(&mut fields, None);
        let hashtags = read_hashtags(&mut fields, false);

        let polygon = fields.optional("geometry", Polygon::from_json);
        let country = fields.optional("iso3", |v| CountryCode::new(&parse::string(v)?));
        let geometry = if polygon.is_some() || country.is_some() {
            fields.check(
                &["geometry", "iso3"],
                GeometryFilter::new(polygon, country, limits.max_polygon_area_km2),
            )
        } else {
            None
        };

        let output_type = read_output_type(&mut fields, Self::FAMILY);

        // A broken optional filter is recorded in `fields`, so the request is always built.
        fields.finish(Some(CountryRequest {
            time,
            hashtags,
            geometry,
            output_type,
        }))
    }

    fn applied_filters(&self) -> Map<String, Value> {
        let polygon = self.geometry.as_ref().and_then(|g| g.polygon());
        let country = self.geometry.as_ref().and_then(|g| g.country());

        let mut applied = AppliedFilters::new(Self::ALIASES);
        if let Some(time) = &self.time {
            applied.time_range(time);
        }
        applied
            .hashtags(self.hashtags.as_ref())
            .set_opt(
                "geometry",
                polygon.and_then(|p| serde_json::from_str::<Value>(&p.to_geojson()).ok()),
            )
            .set_opt("iso3", country)
            .set("output_type", self.output_type);
        applied.into_map()
    }

    fn output_type(&self) -> OutputType {
        self.output_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ViolationKind;
    use serde_json::json;

    fn read(input: Value) -> Result<CountryRequest, ValidationErrors> {
        CountryRequest::from_input(&input, &Limits::default())
    }

    #[test]
    fn test_empty_request() {
        let request = read(json!({})).unwrap();
        assert_eq!(request.time, None);
        assert_eq!(request.hashtags, None);
        assert_eq!(request.geometry, None);
        assert_eq!(request.output_type, OutputType::Json);
    }

    #[test]
    fn test_country_code_is_upper_cased() {
        let request = read(json!({"iso3": "npl", "outputType": "geojson"})).unwrap();
        let geometry = request.geometry.unwrap();
        assert_eq!(geometry.country().unwrap().as_str(), "NPL");
        assert!(geometry.polygon().is_none());
    }

    #[test]
    fn test_half_open_time_range() {
        let errors = read(json!({"fromTimestamp": "2023-01-01"})).unwrap_err();
        assert!(errors.has("toTimestamp", ViolationKind::Missing));
    }

    #[test]
    fn test_bad_country_code() {
        let errors = read(json!({"iso3": "NP"})).unwrap_err();
        assert!(errors.has("iso3", ViolationKind::InvalidValue));
    }
}
