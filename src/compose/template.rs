//! Template identifiers and dispatch to their builders.

use serde::Serialize;

use super::templates::{
    country, data_quality, mapathon, organization, recency, tasking_manager, training, users,
    TemplateSpec,
};
use super::ComposerError;
use crate::predicate::FragmentSet;
use crate::sql::Query;

/// One fixed statement template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Template {
    MapathonSummaryFeatures,
    MapathonContributorCount,
    MapathonUserFeatures,
    MapathonContributors,
    TmTasksMapped,
    TmTasksValidated,
    TmTimeMapping,
    TmTimeValidating,
    UserIds,
    UserStatistics,
    DataQualityProject,
    DataQualityUsername,
    DataQualityHashtag,
    DataQualityHashtagSummary,
    TrainingOrganisations,
    TrainingList,
    OrganizationHashtags,
    CountryStatistics,
    ValidatorStats,
    ChangesetRecency,
    ValidationRecency,
}

impl Template {
    pub const ALL: [Template; 21] = [
        Template::MapathonSummaryFeatures,
        Template::MapathonContributorCount,
        Template::MapathonUserFeatures,
        Template::MapathonContributors,
        Template::TmTasksMapped,
        Template::TmTasksValidated,
        Template::TmTimeMapping,
        Template::TmTimeValidating,
        Template::UserIds,
        Template::UserStatistics,
        Template::DataQualityProject,
        Template::DataQualityUsername,
        Template::DataQualityHashtag,
        Template::DataQualityHashtagSummary,
        Template::TrainingOrganisations,
        Template::TrainingList,
        Template::OrganizationHashtags,
        Template::CountryStatistics,
        Template::ValidatorStats,
        Template::ChangesetRecency,
        Template::ValidationRecency,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Template::MapathonSummaryFeatures => "mapathon_summary_features",
            Template::MapathonContributorCount => "mapathon_contributor_count",
            Template::MapathonUserFeatures => "mapathon_user_features",
            Template::MapathonContributors => "mapathon_contributors",
            Template::TmTasksMapped => "tm_tasks_mapped",
            Template::TmTasksValidated => "tm_tasks_validated",
            Template::TmTimeMapping => "tm_time_mapping",
            Template::TmTimeValidating => "tm_time_validating",
            Template::UserIds => "user_ids",
            Template::UserStatistics => "user_statistics",
            Template::DataQualityProject => "data_quality_project",
            Template::DataQualityUsername => "data_quality_username",
            Template::DataQualityHashtag => "data_quality_hashtag",
            Template::DataQualityHashtagSummary => "data_quality_hashtag_summary",
            Template::TrainingOrganisations => "training_organisations",
            Template::TrainingList => "training_list",
            Template::OrganizationHashtags => "organization_hashtags",
            Template::CountryStatistics => "country_statistics",
            Template::ValidatorStats => "validator_stats",
            Template::ChangesetRecency => "changeset_recency",
            Template::ValidationRecency => "validation_recency",
        }
    }

    /// Slots, columns and backend of this template.
    pub fn spec(&self) -> &'static TemplateSpec {
        match self {
            Template::MapathonSummaryFeatures => &mapathon::SUMMARY_FEATURES,
            Template::MapathonContributorCount => &mapathon::CONTRIBUTOR_COUNT,
            Template::MapathonUserFeatures => &mapathon::USER_FEATURES,
            Template::MapathonContributors => &mapathon::CONTRIBUTORS,
            Template::TmTasksMapped => &tasking_manager::TASKS_MAPPED,
            Template::TmTasksValidated => &tasking_manager::TASKS_VALIDATED,
            Template::TmTimeMapping => &tasking_manager::TIME_MAPPING,
            Template::TmTimeValidating => &tasking_manager::TIME_VALIDATING,
            Template::UserIds => &users::USER_IDS,
            Template::UserStatistics => &users::USER_STATISTICS,
            Template::DataQualityProject => &data_quality::PROJECT,
            Template::DataQualityUsername => &data_quality::USERNAME,
            Template::DataQualityHashtag => &data_quality::HASHTAG,
            Template::DataQualityHashtagSummary => &data_quality::HASHTAG_SUMMARY,
            Template::TrainingOrganisations => &training::ORGANISATIONS,
            Template::TrainingList => &training::LIST,
            Template::OrganizationHashtags => &organization::HASHTAGS,
            Template::CountryStatistics => &country::STATISTICS,
            Template::ValidatorStats => &tasking_manager::VALIDATOR_STATS,
            Template::ChangesetRecency => &recency::CHANGESETS,
            Template::ValidationRecency => &recency::VALIDATION,
        }
    }

    /// Build the statement with `fragments` spliced in. Callers check the
    /// fragment set against [`Template::spec`] first.
    pub(crate) fn build(&self, fragments: &FragmentSet, include_geometry: bool) -> Query {
        match self {
            Template::MapathonSummaryFeatures => mapathon::summary_features(fragments),
            Template::MapathonContributorCount => mapathon::contributor_count(fragments),
            Template::MapathonUserFeatures => mapathon::user_features(fragments),
            Template::MapathonContributors => mapathon::contributors(fragments, include_geometry),
            Template::TmTasksMapped => tasking_manager::tasks_mapped(fragments),
            Template::TmTasksValidated => tasking_manager::tasks_validated(fragments),
            Template::TmTimeMapping => tasking_manager::time_mapping(fragments),
            Template::TmTimeValidating => tasking_manager::time_validating(fragments),
            Template::UserIds => users::user_ids(fragments),
            Template::UserStatistics => users::user_statistics(fragments),
            Template::DataQualityProject => data_quality::project(fragments),
            Template::DataQualityUsername => data_quality::username(fragments),
            Template::DataQualityHashtag => data_quality::hashtag(fragments),
            Template::DataQualityHashtagSummary => data_quality::hashtag_summary(fragments),
            Template::TrainingOrganisations => training::organisations(),
            Template::TrainingList => training::list(fragments),
            Template::OrganizationHashtags => organization::hashtags(fragments),
            Template::CountryStatistics => country::statistics(fragments, include_geometry),
            Template::ValidatorStats => tasking_manager::validator_stats(fragments),
            Template::ChangesetRecency => recency::changesets(),
            Template::ValidationRecency => recency::validation(),
        }
    }
}

impl std::fmt::Display for Template {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl std::str::FromStr for Template {
    type Err = ComposerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Template::ALL
            .into_iter()
            .find(|t| t.id() == s)
            .ok_or_else(|| ComposerError::UnknownTemplate(s.to_string()))
    }
}
