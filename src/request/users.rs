use serde_json::{Map, Value};

use super::{
    read_hashtags, read_output_type, read_project_ids, read_time_range, AppliedFilters,
    FilterRequest, ReportFamily,
};
use crate::validation::{
    parse, AliasTable, Fields, HashtagFilter, Limits, OutputType, ProjectIds, TimeRange,
    UserNames, ValidationErrors,
};

/// Resolve OSM user names to ids among users active in a window.
#[derive(Debug, Clone, PartialEq)]
pub struct UsersListRequest {
    pub user_names: UserNames,
    pub time: TimeRange,
    pub output_type: OutputType,
}

impl FilterRequest for UsersListRequest {
    const FAMILY: ReportFamily = ReportFamily::UserLookup;
    const ALIASES: &'static AliasTable = &AliasTable::new(&[
        ("user_names", "userNames"),
        ("from_timestamp", "fromTimestamp"),
        ("to_timestamp", "toTimestamp"),
        ("output_type", "outputType"),
    ]);

    fn from_input(input: &Value, _limits: &Limits) -> Result<Self, ValidationErrors> {
        let mut fields = Fields::read(input, Self::ALIASES);

        let user_names = fields
            .required("user_names", parse::string_list)
            .and_then(|raw| fields.check(&["user_names"], UserNames::new(raw)));
        let time = read_time_range(&mut fields, None);
        let output_type = read_output_type(&mut fields, Self::FAMILY);

        let built = (|| {
            Some(UsersListRequest {
                user_names: user_names?,
                time: time?,
                output_type,
            })
        })();
        fields.finish(built)
    }

    fn applied_filters(&self) -> Map<String, Value> {
        let mut applied = AppliedFilters::new(Self::ALIASES);
        applied
            .set("user_names", &self.user_names)
            .time_range(&self.time)
            .set("output_type", self.output_type);
        applied.into_map()
    }

    fn output_type(&self) -> OutputType {
        self.output_type
    }
}

/// Building and highway edits of one user in a window.
#[derive(Debug, Clone, PartialEq)]
pub struct UserStatsRequest {
    pub user_id: i64,
    pub time: TimeRange,
    pub hashtags: Option<HashtagFilter>,
    pub project_ids: Option<ProjectIds>,
    pub output_type: OutputType,
}

impl FilterRequest for UserStatsRequest {
    const FAMILY: ReportFamily = ReportFamily::UserStatistics;
    const ALIASES: &'static AliasTable = &AliasTable::new(&[
        ("user_id", "userId"),
        ("from_timestamp", "fromTimestamp"),
        ("to_timestamp", "toTimestamp"),
        ("hashtags", "hashtags"),
        ("match_mode", "matchMode"),
        ("project_ids", "projectIds"),
        ("output_type", "outputType"),
    ]);

    fn from_input(input: &Value, limits: &Limits) -> Result<Self, ValidationErrors> {
        let mut fields = Fields::read(input, Self::ALIASES);

        let user_id = fields.required("user_id", parse::positive_integer);
        let time = read_time_range(&mut fields, Some(limits.user_statistics_span()));
        let hashtags = read_hashtags(&mut fields, false);
        let project_ids = read_project_ids(&mut fields, false);
        let output_type = read_output_type(&mut fields, Self::FAMILY);

        let built = (|| {
            Some(UserStatsRequest {
                user_id: user_id?,
                time: time?,
                hashtags,
                project_ids,
                output_type,
            })
        })();
        fields.finish(built)
    }

    fn applied_filters(&self) -> Map<String, Value> {
        let mut applied = AppliedFilters::new(Self::ALIASES);
        applied
            .set("user_id", self.user_id)
            .time_range(&self.time)
            .hashtags(self.hashtags.as_ref())
            .set_opt("project_ids", self.project_ids.as_ref())
            .set("output_type", self.output_type);
        applied.into_map()
    }

    fn output_type(&self) -> OutputType {
        self.output_type
    }
}
