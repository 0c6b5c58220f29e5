//! Request models, one per report family.
//!
//! A request is read from raw JSON through the family's alias table, every
//! field is validated with the value types in [`crate::validation`], and all
//! violations are returned together. Once built, a request is immutable.

mod country;
mod data_quality;
mod mapathon;
mod organization;
mod recency;
mod tasking_manager;
mod training;
mod users;

pub use country::CountryRequest;
pub use data_quality::{
    DataQualityHashtagRequest, DataQualityHashtagSummaryRequest, DataQualityProjectRequest,
    DataQualityUsernameRequest,
};
pub use mapathon::{MapathonDetailRequest, MapathonRequest, MapathonSummaryRequest};
pub use organization::OrganizationHashtagRequest;
pub use recency::{Dataset, RecencyRequest};
pub use tasking_manager::ValidatorStatsRequest;
pub use training::{TrainingOrganisationsRequest, TrainingRequest};
pub use users::{UserStatsRequest, UsersListRequest};

use chrono::Duration;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::validation::{
    parse, parse_timestamp, AliasTable, Fields, HashtagFilter, Limits, MatchMode, OutputType,
    ProjectIds, TimeRange, ValidationErrors, Violation, ViolationKind,
};

/// A report family: one endpoint, one orchestrator, a fixed set of templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportFamily {
    MapathonSummary,
    MapathonDetail,
    UserLookup,
    UserStatistics,
    DataQualityProject,
    DataQualityUsername,
    DataQualityHashtag,
    DataQualityHashtagSummary,
    TrainingOrganisations,
    TrainingList,
    OrganizationHashtags,
    Countries,
    ValidatorStats,
    DataRecency,
}

impl ReportFamily {
    pub const ALL: [ReportFamily; 14] = [
        ReportFamily::MapathonSummary,
        ReportFamily::MapathonDetail,
        ReportFamily::UserLookup,
        ReportFamily::UserStatistics,
        ReportFamily::DataQualityProject,
        ReportFamily::DataQualityUsername,
        ReportFamily::DataQualityHashtag,
        ReportFamily::DataQualityHashtagSummary,
        ReportFamily::TrainingOrganisations,
        ReportFamily::TrainingList,
        ReportFamily::OrganizationHashtags,
        ReportFamily::Countries,
        ReportFamily::ValidatorStats,
        ReportFamily::DataRecency,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            ReportFamily::MapathonSummary => "mapathon-summary",
            ReportFamily::MapathonDetail => "mapathon-detail",
            ReportFamily::UserLookup => "user-lookup",
            ReportFamily::UserStatistics => "user-statistics",
            ReportFamily::DataQualityProject => "data-quality-project",
            ReportFamily::DataQualityUsername => "data-quality-username",
            ReportFamily::DataQualityHashtag => "data-quality-hashtag",
            ReportFamily::DataQualityHashtagSummary => "data-quality-hashtag-summary",
            ReportFamily::TrainingOrganisations => "training-organisations",
            ReportFamily::TrainingList => "training",
            ReportFamily::OrganizationHashtags => "organization-hashtags",
            ReportFamily::Countries => "countries",
            ReportFamily::ValidatorStats => "validator-stats",
            ReportFamily::DataRecency => "data-recency",
        }
    }

    /// Output types this family can be serialized to. The first is the default.
    pub fn accepted_outputs(&self) -> &'static [OutputType] {
        use OutputType::*;
        match self {
            ReportFamily::MapathonSummary | ReportFamily::DataRecency => &[Json],
            ReportFamily::MapathonDetail => &[Json, Geojson],
            ReportFamily::UserLookup
            | ReportFamily::UserStatistics
            | ReportFamily::TrainingOrganisations
            | ReportFamily::TrainingList
            | ReportFamily::OrganizationHashtags => &[Json, Csv],
            ReportFamily::DataQualityProject
            | ReportFamily::DataQualityUsername
            | ReportFamily::DataQualityHashtag => &[Geojson, Csv],
            ReportFamily::DataQualityHashtagSummary | ReportFamily::ValidatorStats => &[Csv, Json],
            ReportFamily::Countries => &[Json, Csv, Geojson],
        }
    }

    pub fn default_output(&self) -> OutputType {
        self.accepted_outputs()[0]
    }

    /// Whether the family can produce GeoJSON.
    pub fn is_spatial(&self) -> bool {
        self.accepted_outputs().contains(&OutputType::Geojson)
    }
}

impl std::fmt::Display for ReportFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl std::str::FromStr for ReportFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReportFamily::ALL
            .into_iter()
            .find(|f| f.id() == s)
            .ok_or_else(|| format!("unknown report family '{}'", s))
    }
}

/// A validated, immutable filter request for one report family.
pub trait FilterRequest: Sized + std::fmt::Debug {
    const FAMILY: ReportFamily;
    const ALIASES: &'static AliasTable;

    /// Validate raw input, reporting every violated field.
    fn from_input(input: &Value, limits: &Limits) -> Result<Self, ValidationErrors>;

    /// Validated filters under their external names.
    fn applied_filters(&self) -> Map<String, Value>;

    fn output_type(&self) -> OutputType;
}

/// Alias table of a family's request model.
pub fn alias_table(family: ReportFamily) -> &'static AliasTable {
    match family {
        ReportFamily::MapathonSummary => MapathonSummaryRequest::ALIASES,
        ReportFamily::MapathonDetail => MapathonDetailRequest::ALIASES,
        ReportFamily::UserLookup => UsersListRequest::ALIASES,
        ReportFamily::UserStatistics => UserStatsRequest::ALIASES,
        ReportFamily::DataQualityProject => DataQualityProjectRequest::ALIASES,
        ReportFamily::DataQualityUsername => DataQualityUsernameRequest::ALIASES,
        ReportFamily::DataQualityHashtag => DataQualityHashtagRequest::ALIASES,
        ReportFamily::DataQualityHashtagSummary => DataQualityHashtagSummaryRequest::ALIASES,
        ReportFamily::TrainingOrganisations => TrainingOrganisationsRequest::ALIASES,
        ReportFamily::TrainingList => TrainingRequest::ALIASES,
        ReportFamily::OrganizationHashtags => OrganizationHashtagRequest::ALIASES,
        ReportFamily::Countries => CountryRequest::ALIASES,
        ReportFamily::ValidatorStats => ValidatorStatsRequest::ALIASES,
        ReportFamily::DataRecency => RecencyRequest::ALIASES,
    }
}

/// Validate input for any family; returns the applied filters.
pub fn validate(
    family: ReportFamily,
    input: &Value,
    limits: &Limits,
) -> Result<Map<String, Value>, ValidationErrors> {
    fn applied<R: FilterRequest>(
        input: &Value,
        limits: &Limits,
    ) -> Result<Map<String, Value>, ValidationErrors> {
        R::from_input(input, limits).map(|r| r.applied_filters())
    }

    match family {
        ReportFamily::MapathonSummary => applied::<MapathonSummaryRequest>(input, limits),
        ReportFamily::MapathonDetail => applied::<MapathonDetailRequest>(input, limits),
        ReportFamily::UserLookup => applied::<UsersListRequest>(input, limits),
        ReportFamily::UserStatistics => applied::<UserStatsRequest>(input, limits),
        ReportFamily::DataQualityProject => applied::<DataQualityProjectRequest>(input, limits),
        ReportFamily::DataQualityUsername => applied::<DataQualityUsernameRequest>(input, limits),
        ReportFamily::DataQualityHashtag => applied::<DataQualityHashtagRequest>(input, limits),
        ReportFamily::DataQualityHashtagSummary => {
            applied::<DataQualityHashtagSummaryRequest>(input, limits)
        }
        ReportFamily::TrainingOrganisations => {
            applied::<TrainingOrganisationsRequest>(input, limits)
        }
        ReportFamily::TrainingList => applied::<TrainingRequest>(input, limits),
        ReportFamily::OrganizationHashtags => applied::<OrganizationHashtagRequest>(input, limits),
        ReportFamily::Countries => applied::<CountryRequest>(input, limits),
        ReportFamily::ValidatorStats => applied::<ValidatorStatsRequest>(input, limits),
        ReportFamily::DataRecency => applied::<RecencyRequest>(input, limits),
    }
}

/// Builds the applied-filter map under external names.
pub(crate) struct AppliedFilters {
    table: &'static AliasTable,
    map: Map<String, Value>,
}

impl AppliedFilters {
    pub(crate) fn new(table: &'static AliasTable) -> Self {
        Self {
            table,
            map: Map::new(),
        }
    }

    pub(crate) fn set(&mut self, internal: &str, value: impl Serialize) -> &mut Self {
        if let Ok(value) = serde_json::to_value(value) {
            self.map
                .insert(self.table.external(internal).to_string(), value);
        }
        self
    }

    pub(crate) fn set_opt<T: Serialize>(&mut self, internal: &str, value: Option<T>) -> &mut Self {
        match value {
            Some(value) => self.set(internal, value),
            None => self,
        }
    }

    pub(crate) fn time_range(&mut self, time: &TimeRange) -> &mut Self {
        self.set("from_timestamp", time.from())
            .set("to_timestamp", time.to())
    }

    pub(crate) fn hashtags(&mut self, hashtags: Option<&HashtagFilter>) -> &mut Self {
        if let Some(h) = hashtags {
            self.set("hashtags", h.tags()).set("match_mode", h.mode());
        }
        self
    }

    pub(crate) fn into_map(self) -> Map<String, Value> {
        self.map
    }
}

// ---------------------------------------------------------------------------
// Readers shared by several request models
// ---------------------------------------------------------------------------

/// `from_timestamp`/`to_timestamp`, both required.
pub(crate) fn read_time_range(fields: &mut Fields, max_span: Option<Duration>) -> Option<TimeRange> {
    let from = fields.required("from_timestamp", parse_timestamp);
    let to = fields.required("to_timestamp", parse_timestamp);
    let (from, to) = (from?, to?);
    fields.check(
        &["from_timestamp", "to_timestamp"],
        TimeRange::new(from, to, max_span),
    )
}

/// `from_timestamp`/`to_timestamp`, both or neither.
pub(crate) fn read_optional_time_range(
    fields: &mut Fields,
    max_span: Option<Duration>,
) -> Option<TimeRange> {
    match (
        fields.is_present("from_timestamp"),
        fields.is_present("to_timestamp"),
    ) {
        (false, false) => None,
        _ => read_time_range(fields, max_span),
    }
}

/// Whether a list field is present and non-empty.
pub(crate) fn has_items(fields: &Fields, internal: &str) -> bool {
    fields
        .raw(internal)
        .and_then(Value::as_array)
        .is_some_and(|items| !items.is_empty())
}

/// `hashtags` plus optional `match_mode`. An empty optional list is absent,
/// and a match mode without hashtags is rejected.
pub(crate) fn read_hashtags(fields: &mut Fields, required: bool) -> Option<HashtagFilter> {
    let mode = fields.optional("match_mode", |v| parse::string(v)?.parse::<MatchMode>());
    if !required && fields.is_present("match_mode") && !has_items(fields, "hashtags") {
        fields.error(
            &["match_mode", "hashtags"],
            Violation::new(
                ViolationKind::Conflict,
                "a match mode needs at least one hashtag",
            ),
        );
        return None;
    }
    let raw = if required {
        fields.required("hashtags", parse::string_list)?
    } else {
        fields.optional("hashtags", parse::string_list)?
    };
    if raw.is_empty() && !required {
        return None;
    }
    fields.check(&["hashtags"], HashtagFilter::new(&raw, mode))
}

/// `project_ids`. An empty optional list is absent.
pub(crate) fn read_project_ids(fields: &mut Fields, required: bool) -> Option<ProjectIds> {
    let raw = if required {
        fields.required("project_ids", parse::integer_list)?
    } else {
        fields.optional("project_ids", parse::integer_list)?
    };
    if raw.is_empty() && !required {
        return None;
    }
    fields.check(&["project_ids"], ProjectIds::new(raw))
}

/// `output_type`, checked against the family. Defaults to the family's first output.
pub(crate) fn read_output_type(fields: &mut Fields, family: ReportFamily) -> OutputType {
    let requested = fields.optional("output_type", |v| {
        let output = parse::string(v)?.parse::<OutputType>()?;
        if family.accepted_outputs().contains(&output) {
            Ok(output)
        } else {
            let accepted: Vec<&str> = family.accepted_outputs().iter().map(|o| o.as_str()).collect();
            Err(Violation::new(
                ViolationKind::InvalidValue,
                format!(
                    "{} output is not available for {} reports, use one of: {}",
                    output,
                    family,
                    accepted.join(", ")
                ),
            ))
        }
    });
    requested.unwrap_or_else(|| family.default_output())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_ids_round_trip() {
        for family in ReportFamily::ALL {
            assert_eq!(family.id().parse::<ReportFamily>().unwrap(), family);
        }
        assert!("mapathon".parse::<ReportFamily>().is_err());
    }

    #[test]
    fn test_spatial_families() {
        let spatial: Vec<ReportFamily> = ReportFamily::ALL
            .into_iter()
            .filter(|f| f.is_spatial())
            .collect();
        assert_eq!(
            spatial,
            vec![
                ReportFamily::MapathonDetail,
                ReportFamily::DataQualityProject,
                ReportFamily::DataQualityUsername,
                ReportFamily::DataQualityHashtag,
                ReportFamily::Countries,
            ]
        );
    }

    #[test]
    fn test_default_outputs() {
        assert_eq!(ReportFamily::DataQualityProject.default_output(), OutputType::Geojson);
        assert_eq!(ReportFamily::ValidatorStats.default_output(), OutputType::Csv);
        assert_eq!(ReportFamily::Countries.default_output(), OutputType::Json);
    }
}
