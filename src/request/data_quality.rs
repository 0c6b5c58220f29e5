use serde_json::{Map, Value};

use super::{
    has_items, read_hashtags, read_output_type, read_project_ids, read_time_range,
    AppliedFilters, FilterRequest, ReportFamily,
};
use crate::validation::{
    parse, AliasTable, Fields, GeometryFilter, HashtagFilter, IssueTypes, Limits, OutputType,
    Polygon, ProjectIds, TimeRange, UserNames, ValidationErrors, Violation, ViolationKind,
};

fn read_issue_types(fields: &mut Fields, internal: &str) -> Option<IssueTypes> {
    let raw = fields.required(internal, parse::string_list)?;
    fields.check(&[internal], IssueTypes::new(&raw))
}

/// Data-quality issues inside tasking-manager projects.
#[derive(Debug, Clone, PartialEq)]
pub struct DataQualityProjectRequest {
    pub project_ids: ProjectIds,
    pub issue_types: IssueTypes,
    pub output_type: OutputType,
}

impl FilterRequest for DataQualityProjectRequest {
    const FAMILY: ReportFamily = ReportFamily::DataQualityProject;
    const ALIASES: &'static AliasTable = &AliasTable::new(&[
        ("project_ids", "projectIds"),
        ("issue_types", "issueTypes"),
        ("output_type", "outputType"),
    ]);

    fn from_input(input: &Value, _limits: &Limits) -> Result<Self, ValidationErrors> {
        let mut fields = Fields::read(input, Self::ALIASES);

        let project_ids = read_project_ids(&mut fields, true);
        let issue_types = read_issue_types(&mut fields, "issue_types");
        let output_type = read_output_type(&mut fields, Self::FAMILY);

        let built = (|| {
            Some(DataQualityProjectRequest {
                project_ids: project_ids?,
                issue_types: issue_types?,
                output_type,
            })
        })();
        fields.finish(built)
    }

    fn applied_filters(&self) -> Map<String, Value> {
        let mut applied = AppliedFilters::new(Self::ALIASES);
        applied
            .set("project_ids", &self.project_ids)
            .set("issue_types", &self.issue_types)
            .set("output_type", self.output_type);
        applied.into_map()
    }

    fn output_type(&self) -> OutputType {
        self.output_type
    }
}

/// Data-quality issues created by given OSM users.
#[derive(Debug, Clone, PartialEq)]
pub struct DataQualityUsernameRequest {
    pub osm_usernames: UserNames,
    pub time: TimeRange,
    pub issue_types: IssueTypes,
    pub output_type: OutputType,
}

impl FilterRequest for DataQualityUsernameRequest {
    const FAMILY: ReportFamily = ReportFamily::DataQualityUsername;
    const ALIASES: &'static AliasTable = &AliasTable::new(&[
        ("osm_usernames", "osmUsernames"),
        ("from_timestamp", "fromTimestamp"),
        ("to_timestamp", "toTimestamp"),
        ("issue_types", "issueTypes"),
        ("output_type", "outputType"),
    ]);

    fn from_input(input: &Value, limits: &Limits) -> Result<Self, ValidationErrors> {
        let mut fields = Fields::read(input, Self::ALIASES);

        let osm_usernames = fields
            .required("osm_usernames", parse::string_list)
            .and_then(|raw| fields.check(&["osm_usernames"], UserNames::new(raw)));
        let time = read_time_range(&mut fields, Some(limits.data_quality_username_span()));
        let issue_types = read_issue_types(&mut fields, "issue_types");
        let output_type = read_output_type(&mut fields, Self::FAMILY);

        let built = (|| {
            Some(DataQualityUsernameRequest {
                osm_usernames: osm_usernames?,
                time: time?,
                issue_types: issue_types?,
                output_type,
            })
        })();
        fields.finish(built)
    }

    fn applied_filters(&self) -> Map<String, Value> {
        let mut applied = AppliedFilters::new(Self::ALIASES);
        applied
            .set("osm_usernames", &self.osm_usernames)
            .time_range(&self.time)
            .set("issue_types", &self.issue_types)
            .set("output_type", self.output_type);
        applied.into_map()
    }

    fn output_type(&self) -> OutputType {
        self.output_type
    }
}

const HASHTAG_ALIASES: AliasTable = AliasTable::new(&[
    ("from_timestamp", "fromTimestamp"),
    ("to_timestamp", "toTimestamp"),
    ("hashtags", "hashtags"),
    ("match_mode", "matchMode"),
    ("issue_type", "issueType"),
    ("geometry", "geometry"),
    ("output_type", "outputType"),
]);

/// Data-quality issues by campaign hashtag and/or area.
#[derive(Debug, Clone, PartialEq)]
pub struct DataQualityHashtagRequest {
    pub time: TimeRange,
    pub hashtags: Option<HashtagFilter>,
    pub issue_types: IssueTypes,
    pub geometry: Option<GeometryFilter>,
    pub output_type: OutputType,
}

impl DataQualityHashtagRequest {
    fn read(input: &Value, limits: &Limits, family: ReportFamily) -> Result<Self, ValidationErrors> {
        let mut fields = Fields::read(input, &HASHTAG_ALIASES);

        let time = read_time_range(&mut fields, Some(limits.data_quality_hashtag_span()));

        if !has_items(&fields, "hashtags") && !fields.is_present("geometry") {
            fields.error(
                &["hashtags", "geometry"],
                Violation::new(ViolationKind::Empty, "hashtags or geometry is required"),
            );
        }
        let hashtags = read_hashtags(&mut fields, false);
        let geometry = fields
            .optional("geometry", Polygon::from_json)
            .and_then(|polygon| {
                fields.check(
                    &["geometry"],
                    GeometryFilter::new(Some(polygon), None, limits.max_polygon_area_km2),
                )
            });
        let issue_types = read_issue_types(&mut fields, "issue_type");
        let output_type = read_output_type(&mut fields, family);

        let built = (|| {
            Some(DataQualityHashtagRequest {
                time: time?,
                hashtags,
                issue_types: issue_types?,
                geometry,
                output_type,
            })
        })();
        fields.finish(built)
    }

    fn applied(&self) -> Map<String, Value> {
        let mut applied = AppliedFilters::new(&HASHTAG_ALIASES);
        applied
            .time_range(&self.time)
            .hashtags(self.hashtags.as_ref())
            .set("issue_type", &self.issue_types)
            .set_opt(
                "geometry",
                self.geometry
                    .as_ref()
                    .and_then(|g| g.polygon())
                    .and_then(|p| serde_json::from_str::<Value>(&p.to_geojson()).ok()),
            )
            .set("output_type", self.output_type);
        applied.into_map()
    }
}

impl FilterRequest for DataQualityHashtagRequest {
    const FAMILY: ReportFamily = ReportFamily::DataQualityHashtag;
    const ALIASES: &'static AliasTable = &HASHTAG_ALIASES;

    fn from_input(input: &Value, limits: &Limits) -> Result<Self, ValidationErrors> {
        Self::read(input, limits, Self::FAMILY)
    }

    fn applied_filters(&self) -> Map<String, Value> {
        self.applied()
    }

    fn output_type(&self) -> OutputType {
        self.output_type
    }
}

/// Issue counts per hashtag, same filters as [`DataQualityHashtagRequest`].
#[derive(Debug, Clone, PartialEq)]
pub struct DataQualityHashtagSummaryRequest(pub DataQualityHashtagRequest);

impl FilterRequest for DataQualityHashtagSummaryRequest {
    const FAMILY: ReportFamily = ReportFamily::DataQualityHashtagSummary;
    const ALIASES: &'static AliasTable = &HASHTAG_ALIASES;

    fn from_input(input: &Value, limits: &Limits) -> Result<Self, ValidationErrors> {
        DataQualityHashtagRequest::read(input, limits, Self::FAMILY).map(Self)
    }

    fn applied_filters(&self) -> Map<String, Value> {
        self.0.applied()
    }

    fn output_type(&self) -> OutputType {
        self.0.output_type
    }
}
