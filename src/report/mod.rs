//! Report orchestration.
//!
//! ```text
//! raw JSON ──validate──▶ request ──fragments──▶ FragmentSet
//!                                                  │
//!                         Template ◀───────────────┘
//!                            │ compose
//!                            ▼
//!                      ComposedQuery ──Database::fetch──▶ rows ──shape──▶ ReportBody
//! ```
//!
//! Each family has one orchestrator. It validates first, so a rejected
//! request never reaches a database, and any failure after that discards
//! everything already fetched.

mod context;
mod country;
mod data_quality;
mod database;
mod error;
mod mapathon;
mod organization;
mod recency;
mod shape;
mod training;
mod users;
mod validator;

pub use context::ReportContext;
pub use database::{Database, DatabaseError, Row};
pub use error::{ExecutionError, ReportError, ReportResult};
pub use shape::{
    scalar, ColumnSpec, Feature, FeatureSet, RecordSet, ReportBody, ReportOutcome, ShapeError,
};

pub mod families {
    //! One entry point per report family.
    pub use super::country::statistics as countries;
    pub use super::data_quality::{
        hashtag as data_quality_hashtag, hashtag_summary as data_quality_hashtag_summary,
        project as data_quality_project, username as data_quality_username,
    };
    pub use super::mapathon::{detail as mapathon_detail, summary as mapathon_summary};
    pub use super::organization::hashtags as organization_hashtags;
    pub use super::recency::last_updated as data_recency;
    pub use super::training::{list as training_list, organisations as training_organisations};
    pub use super::users::{lookup as user_lookup, statistics as user_statistics};
    pub use super::validator::stats as validator_stats;
}

use serde_json::Value;

use crate::request::ReportFamily;

/// Run the orchestrator of `family` on raw input.
pub fn run(family: ReportFamily, ctx: &ReportContext, input: &Value) -> ReportResult<ReportOutcome> {
    use families::*;

    match family {
        ReportFamily::MapathonSummary => mapathon_summary(ctx, input),
        ReportFamily::MapathonDetail => mapathon_detail(ctx, input),
        ReportFamily::UserLookup => user_lookup(ctx, input),
        ReportFamily::UserStatistics => user_statistics(ctx, input),
        ReportFamily::DataQualityProject => data_quality_project(ctx, input),
        ReportFamily::DataQualityUsername => data_quality_username(ctx, input),
        ReportFamily::DataQualityHashtag => data_quality_hashtag(ctx, input),
        ReportFamily::DataQualityHashtagSummary => data_quality_hashtag_summary(ctx, input),
        ReportFamily::TrainingOrganisations => training_organisations(ctx, input),
        ReportFamily::TrainingList => training_list(ctx, input),
        ReportFamily::OrganizationHashtags => organization_hashtags(ctx, input),
        ReportFamily::Countries => countries(ctx, input),
        ReportFamily::ValidatorStats => validator_stats(ctx, input),
        ReportFamily::DataRecency => data_recency(ctx, input),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::{ComposedQuery, Template};
    use crate::predicate::FilterSlot;
    use crate::sql::SqlValue;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Answers by template, recording every statement it sees.
    #[derive(Default)]
    struct Canned {
        rows: HashMap<Template, Vec<Row>>,
        seen: Mutex<Vec<(Template, Vec<SqlValue>)>>,
    }

    impl Canned {
        fn with(mut self, template: Template, rows: Value) -> Self {
            self.rows
                .insert(template, serde_json::from_value(rows).unwrap());
            self
        }

        fn seen(&self) -> Vec<Template> {
            self.seen.lock().unwrap().iter().map(|(t, _)| *t).collect()
        }
    }

    impl Database for Canned {
        fn fetch(&self, query: &ComposedQuery) -> Result<Vec<Row>, DatabaseError> {
            self.seen
                .lock()
                .unwrap()
                .push((query.template(), query.parameters().to_vec()));
            Ok(self.rows.get(&query.template()).cloned().unwrap_or_default())
        }
    }

    fn mapathon_input() -> Value {
        json!({
            "fromTimestamp": "2023-01-01T00:00:00",
            "toTimestamp": "2023-01-02T00:00:00",
            "hashtags": ["hotosm-project-1"],
        })
    }

    #[test]
    fn test_mapathon_summary_sections() {
        let db = Canned::default()
            .with(Template::MapathonContributorCount, json!([{"contributors_count": 4}]))
            .with(
                Template::MapathonSummaryFeatures,
                json!([{"feature": "building", "action": "create", "count": 12}]),
            );
        let ctx = ReportContext::new(&db);
        let outcome = run(ReportFamily::MapathonSummary, &ctx, &mapathon_input()).unwrap();

        assert_eq!(
            serde_json::to_value(&outcome.body).unwrap(),
            json!({
                "totalContributors": 4,
                "mappedFeatures": [{"feature": "building", "action": "create", "count": 12}],
            })
        );
        assert_eq!(outcome.filters["hashtags"], json!(["hotosm-project-1"]));
    }

    #[test]
    fn test_mapathon_detail_runs_task_sections_when_configured() {
        let underpass = Canned::default();
        let tasking_manager = Canned::default();

        let ctx = ReportContext::new(&underpass);
        let outcome = run(ReportFamily::MapathonDetail, &ctx, &mapathon_input()).unwrap();
        assert!(outcome.body.section("taskingManager").is_none());

        let ctx = ReportContext::new(&underpass).with_tasking_manager(&tasking_manager);
        let outcome = run(ReportFamily::MapathonDetail, &ctx, &mapathon_input()).unwrap();
        assert!(outcome.body.section("taskingManager").is_some());
        assert_eq!(
            tasking_manager.seen(),
            vec![
                Template::TmTasksMapped,
                Template::TmTasksValidated,
                Template::TmTimeMapping,
                Template::TmTimeValidating,
            ]
        );
    }

    #[test]
    fn test_validator_stats_needs_tasking_manager() {
        let db = Canned::default();
        let ctx = ReportContext::new(&db);
        let err = run(ReportFamily::ValidatorStats, &ctx, &json!({"year": 2020})).unwrap_err();
        assert!(matches!(err, ReportError::Unavailable(Template::ValidatorStats)));
        assert_eq!(err.status_code(), 503);
        assert!(db.seen().is_empty());
    }

    #[test]
    fn test_recency_is_scalar() {
        let db = Canned::default()
            .with(Template::ValidationRecency, json!([{"last_updated": "00:02:00"}]));
        let ctx = ReportContext::new(&db);
        let outcome =
            run(ReportFamily::DataRecency, &ctx, &json!({"dataset": "validation"})).unwrap();
        assert_eq!(outcome.body, ReportBody::Value(json!("00:02:00")));

        let err = run(ReportFamily::DataRecency, &ctx, &json!({})).unwrap_err();
        assert!(matches!(err, ReportError::Shape(ShapeError::NotScalar { rows: 0, .. })));
    }

    #[test]
    fn test_user_statistics_binds_user_first() {
        let db = Canned::default().with(
            Template::UserStatistics,
            json!([{
                "added_buildings": null, "modified_buildings": 3,
                "added_highway": null, "modified_highway": null,
                "added_highway_km": null, "modified_highway_km": null,
            }]),
        );
        let ctx = ReportContext::new(&db);
        let outcome = run(
            ReportFamily::UserStatistics,
            &ctx,
            &json!({
                "userId": 42,
                "fromTimestamp": "2023-01-01T00:00:00",
                "toTimestamp": "2023-01-05T00:00:00",
            }),
        )
        .unwrap();

        let params = db.seen.lock().unwrap()[0].1.clone();
        assert_eq!(params[0], SqlValue::Int(42));
        assert_eq!(params.len(), 3);
        assert_eq!(
            serde_json::to_value(&outcome.body).unwrap()[0]["addedBuildings"],
            json!(0)
        );
    }

    #[test]
    fn test_country_fragments_follow_filters() {
        let request = crate::request::CountryRequest {
            time: None,
            hashtags: None,
            geometry: None,
            output_type: crate::validation::OutputType::Json,
        };
        assert!(country::country_fragments(&request).is_empty());
        assert!(!country::country_fragments(&request).contains(FilterSlot::Time));
    }
}
