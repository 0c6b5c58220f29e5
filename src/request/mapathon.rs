use serde_json::{Map, Value};

use super::{
    has_items, read_hashtags, read_output_type, read_project_ids, read_time_range,
    AppliedFilters, FilterRequest, ReportFamily,
};
use crate::validation::{
    parse, AliasTable, Fields, HashtagFilter, Limits, OutputType, ProjectIds, Source,
    TimeRange, ValidationErrors, Violation, ViolationKind,
};

const MAPATHON_ALIASES: AliasTable = AliasTable::new(&[
    ("from_timestamp", "fromTimestamp"),
    ("to_timestamp", "toTimestamp"),
    ("project_ids", "projectIds"),
    ("hashtags", "hashtags"),
    ("match_mode", "matchMode"),
    ("source", "source"),
    ("output_type", "outputType"),
]);

/// Filters shared by the mapathon summary and detail reports.
#[derive(Debug, Clone, PartialEq)]
pub struct MapathonRequest {
    pub time: TimeRange,
    pub project_ids: Option<ProjectIds>,
    pub hashtags: Option<HashtagFilter>,
    pub source: Source,
    pub output_type: OutputType,
}

impl MapathonRequest {
    fn read(input: &Value, limits: &Limits, family: ReportFamily) -> Result<Self, ValidationErrors> {
        let mut fields = Fields::read(input, &MAPATHON_ALIASES);

        let time = read_time_range(&mut fields, Some(limits.mapathon_span()));

        if !has_items(&fields, "project_ids") && !has_items(&fields, "hashtags") {
            fields.error(
                &["project_ids", "hashtags"],
                Violation::new(
                    ViolationKind::Empty,
                    "at least one project id or hashtag is required",
                ),
            );
        }
        let project_ids = read_project_ids(&mut fields, false);
        let hashtags = read_hashtags(&mut fields, false);

        let source = fields
            .optional("source", |v| parse::string(v)?.parse::<Source>())
            .unwrap_or_default();
        if !source.supports_hashtags() && has_items(&fields, "hashtags") {
            fields.error(
                &["source", "hashtags"],
                Violation::new(
                    ViolationKind::Conflict,
                    "the insight source has no hashtag data, filter by project ids instead",
                ),
            );
        }

        let output_type = read_output_type(&mut fields, family);

        let built = time.map(|time| MapathonRequest {
            time,
            project_ids,
            hashtags,
            source,
            output_type,
        });
        fields.finish(built)
    }

    /// Tasking-manager projects: explicit ids plus `hotosm-project-<id>` hashtags.
    pub fn tasking_manager_projects(&self) -> Option<ProjectIds> {
        let from_tags = self
            .hashtags
            .as_ref()
            .map(|h| h.project_ids())
            .unwrap_or_default();
        match &self.project_ids {
            Some(ids) => Some(ids.merged(&from_tags)),
            None => ProjectIds::from_hashtag_ids(from_tags),
        }
    }

    fn applied(&self) -> Map<String, Value> {
        let mut applied = AppliedFilters::new(&MAPATHON_ALIASES);
        applied
            .time_range(&self.time)
            .set_opt("project_ids", self.project_ids.as_ref())
            .hashtags(self.hashtags.as_ref())
            .set("source", self.source)
            .set("output_type", self.output_type);
        applied.into_map()
    }
}

/// Mapathon summary: contributor count and mapped features.
#[derive(Debug, Clone, PartialEq)]
pub struct MapathonSummaryRequest(pub MapathonRequest);

/// Mapathon detail: per-user features, contributors and tasking-manager activity.
#[derive(Debug, Clone, PartialEq)]
pub struct MapathonDetailRequest(pub MapathonRequest);

impl FilterRequest for MapathonSummaryRequest {
    const FAMILY: ReportFamily = ReportFamily::MapathonSummary;
    const ALIASES: &'static AliasTable = &MAPATHON_ALIASES;

    fn from_input(input: &Value, limits: &Limits) -> Result<Self, ValidationErrors> {
        MapathonRequest::read(input, limits, Self::FAMILY).map(Self)
    }

    fn applied_filters(&self) -> Map<String, Value> {
        self.0.applied()
    }

    fn output_type(&self) -> OutputType {
        self.0.output_type
    }
}

impl FilterRequest for MapathonDetailRequest {
    const FAMILY: ReportFamily = ReportFamily::MapathonDetail;
    const ALIASES: &'static AliasTable = &MAPATHON_ALIASES;

    fn from_input(input: &Value, limits: &Limits) -> Result<Self, ValidationErrors> {
        MapathonRequest::read(input, limits, Self::FAMILY).map(Self)
    }

    fn applied_filters(&self) -> Map<String, Value> {
        self.0.applied()
    }

    fn output_type(&self) -> OutputType {
        self.0.output_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn detail(input: Value) -> Result<MapathonDetailRequest, ValidationErrors> {
        MapathonDetailRequest::from_input(&input, &Limits::default())
    }

    #[test]
    fn test_valid_detail_request() {
        let request = detail(json!({
            "hashtags": ["#hotosm-project-1"],
            "fromTimestamp": "2023-01-01",
            "toTimestamp": "2023-02-01",
            "outputType": "geojson"
        }))
        .unwrap();
        assert_eq!(request.0.output_type, OutputType::Geojson);
        assert_eq!(request.0.source, Source::Underpass);
        assert_eq!(request.0.tasking_manager_projects().unwrap().ids(), &[1]);
    }

    #[test]
    fn test_internal_names_accepted() {
        let request = detail(json!({
            "project_ids": [11, 12],
            "from_timestamp": "2023-01-01T00:00:00",
            "to_timestamp": "2023-01-01T12:00:00"
        }))
        .unwrap();
        assert_eq!(request.0.project_ids.unwrap().ids(), &[11, 12]);
    }

    #[test]
    fn test_requires_projects_or_hashtags() {
        let errors = detail(json!({
            "projectIds": [],
            "hashtags": [],
            "fromTimestamp": "2023-01-01",
            "toTimestamp": "2023-01-02"
        }))
        .unwrap_err();
        let error = errors.for_field("projectIds").unwrap();
        assert_eq!(error.fields, vec!["projectIds", "hashtags"]);
        assert_eq!(error.kind, ViolationKind::Empty);
    }

    #[test]
    fn test_insight_rejects_hashtags() {
        let errors = detail(json!({
            "hashtags": ["missingmaps"],
            "source": "insight",
            "fromTimestamp": "2023-01-01",
            "toTimestamp": "2023-01-02"
        }))
        .unwrap_err();
        assert!(errors.has("source", ViolationKind::Conflict));
        assert!(errors.has("hashtags", ViolationKind::Conflict));
    }

    #[test]
    fn test_summary_rejects_geojson() {
        let errors = MapathonSummaryRequest::from_input(
            &json!({
                "projectIds": [1],
                "fromTimestamp": "2023-01-01",
                "toTimestamp": "2023-01-02",
                "outputType": "geojson"
            }),
            &Limits::default(),
        )
        .unwrap_err();
        assert!(errors.has("outputType", ViolationKind::InvalidValue));
    }

    #[test]
    fn test_applied_filters_use_external_names() {
        let request = detail(json!({
            "hashtags": ["#MissingMaps"],
            "fromTimestamp": "2023-01-01",
            "toTimestamp": "2023-01-02"
        }))
        .unwrap();
        let applied = request.applied_filters();
        assert_eq!(applied["hashtags"], json!(["missingmaps"]));
        assert_eq!(applied["matchMode"], json!("single"));
        assert_eq!(applied["fromTimestamp"], json!("2023-01-01T00:00:00"));
        assert_eq!(applied["outputType"], json!("json"));
        assert!(!applied.contains_key("projectIds"));
    }
}
