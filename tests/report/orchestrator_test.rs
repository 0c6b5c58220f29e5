use galaxy::compose::{ComposedQuery, Template};
use galaxy::output::render;
use galaxy::report::{self, Database, DatabaseError, ReportBody, ReportContext, ReportError, Row};
use galaxy::request::ReportFamily;
use galaxy::validation::{Limits, OutputType, ViolationKind};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Mutex;

/// Fake database: canned rows per template, optional failure, and a log of
/// every statement it was asked to run.
#[derive(Default)]
struct FakeDatabase {
    rows: HashMap<Template, Vec<Row>>,
    fail_on: Option<Template>,
    executed: Mutex<Vec<ComposedQuery>>,
}

impl FakeDatabase {
    fn with_rows(mut self, template: Template, rows: Value) -> Self {
        self.rows
            .insert(template, serde_json::from_value(rows).unwrap());
        self
    }

    fn failing_on(mut self, template: Template) -> Self {
        self.fail_on = Some(template);
        self
    }

    fn executed(&self) -> Vec<ComposedQuery> {
        self.executed.lock().unwrap().clone()
    }
}

impl Database for FakeDatabase {
    fn fetch(&self, query: &ComposedQuery) -> Result<Vec<Row>, DatabaseError> {
        self.executed.lock().unwrap().push(query.clone());
        if self.fail_on == Some(query.template()) {
            return Err(DatabaseError::new("canceling statement due to statement timeout")
                .with_code("57014"));
        }
        Ok(self.rows.get(&query.template()).cloned().unwrap_or_default())
    }
}

#[test]
fn test_mapathon_detail_geojson() {
    let db = FakeDatabase::default().with_rows(
        Template::MapathonContributors,
        json!([{
            "user_id": 11,
            "username": "mapper",
            "total_buildings": 42,
            "editors": "iD",
            "geometry": r#"{"type":"Point","coordinates":[85.3,27.7]}"#,
        }]),
    );
    let ctx = ReportContext::new(&db);
    let input = json!({
        "hashtags": ["#hotosm-project-1"],
        "from_timestamp": "2023-01-01",
        "to_timestamp": "2023-02-01",
        "output_type": "geojson",
    });

    let outcome = report::run(ReportFamily::MapathonDetail, &ctx, &input).unwrap();
    assert_eq!(outcome.output, OutputType::Geojson);

    let executed = db.executed();
    assert_eq!(executed.len(), 1);
    let statement = executed[0].statement();
    assert!(statement.contains(r#"$3 = ANY("c"."hashtags")"#), "{}", statement);
    assert!(statement.contains(r#""c"."created_at" BETWEEN $1 AND $2"#), "{}", statement);
    assert!(statement.contains("ST_ASGEOJSON"), "{}", statement);

    let rendered = render(&outcome).unwrap();
    assert_eq!(rendered.content_type, "application/geo+json");
    let collection: Value = serde_json::from_str(&rendered.body).unwrap();
    assert_eq!(collection["type"], "FeatureCollection");
    let properties = &collection["features"][0]["properties"];
    assert_eq!(properties["username"], "mapper");
    assert_eq!(properties["totalBuildings"], 42);
    assert_eq!(collection["features"][0]["geometry"]["type"], "Point");
}

#[test]
fn test_database_failure_returns_no_partial_result() {
    let db = FakeDatabase::default()
        .with_rows(Template::MapathonContributorCount, json!([{"contributors_count": 3}]))
        .failing_on(Template::MapathonSummaryFeatures);
    let ctx = ReportContext::new(&db);
    let input = json!({
        "fromTimestamp": "2023-01-01T00:00:00",
        "toTimestamp": "2023-01-02T00:00:00",
        "projectIds": [1],
    });

    let err = report::run(ReportFamily::MapathonSummary, &ctx, &input).unwrap_err();
    match &err {
        ReportError::Execution(execution) => {
            assert_eq!(execution.template, Template::MapathonSummaryFeatures);
            assert_eq!(execution.source.code.as_deref(), Some("57014"));
            assert_eq!(execution.fingerprint.len(), 16);
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(err.status_code(), 500);
    assert_eq!(err.public_message(), "internal error");
}

#[test]
fn test_empty_country_request_runs_unfiltered() {
    let db = FakeDatabase::default().with_rows(
        Template::CountryStatistics,
        json!([
            {"iso3": "NPL", "name": "Nepal", "contributors": 4,
             "added_buildings": 10, "modified_buildings": null,
             "added_highway_km": 1.5, "modified_highway_km": 0},
        ]),
    );
    let ctx = ReportContext::new(&db);

    let outcome = report::run(ReportFamily::Countries, &ctx, &json!({})).unwrap();

    let executed = db.executed();
    assert_eq!(executed.len(), 1);
    assert!(!executed[0].statement().contains("WHERE"));
    assert!(executed[0].parameters().is_empty());

    let body = serde_json::to_value(&outcome.body).unwrap();
    assert_eq!(body[0]["iso3"], "NPL");
    assert_eq!(body[0]["modifiedBuildings"], 0);
    assert!(outcome.filters.contains_key("outputType"));
}

#[test]
fn test_organization_cap_fails_before_any_query() {
    let db = FakeDatabase::default();
    let limits = Limits {
        organization_max_days: 365,
        ..Limits::default()
    };
    let ctx = ReportContext::new(&db).with_limits(limits);
    let input = json!({
        "hashtags": ["hotosm"],
        "frequency": "w",
        "startDate": "2020-01-01",
        "endDate": "2022-01-01",
    });

    let err = report::run(ReportFamily::OrganizationHashtags, &ctx, &input).unwrap_err();
    match &err {
        ReportError::Validation(errors) => {
            assert!(errors.has("startDate", ViolationKind::SpanExceeded));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(err.status_code(), 422);
    assert!(db.executed().is_empty());
}

#[test]
fn test_organization_weekly_periods_start_at_noon() {
    let db = FakeDatabase::default();
    let ctx = ReportContext::new(&db);
    let input = json!({
        "hashtags": ["hotosm"],
        "frequency": "w",
        "startDate": "2022-01-03",
        "endDate": "2022-03-28",
        "outputType": "csv",
    });

    let outcome = report::run(ReportFamily::OrganizationHashtags, &ctx, &input).unwrap();
    let parameters: Vec<String> = db.executed()[0]
        .parameters()
        .iter()
        .map(|p| p.to_string())
        .collect();
    assert_eq!(
        parameters,
        vec![
            r#"{"hotosm"}"#,
            r#""w""#,
            "2022-01-03T12:00:00",
            "2022-03-28T12:00:00",
        ]
    );

    let rendered = render(&outcome).unwrap();
    assert_eq!(rendered.content_type, "text/csv");
    assert!(rendered.body.starts_with("hashtag,frequency,startDate,endDate,"));
}

#[test]
fn test_data_quality_hashtag_area_only() {
    let db = FakeDatabase::default().with_rows(
        Template::DataQualityHashtag,
        json!([{
            "osm_id": 5, "changeset_id": 9, "changeset_timestamp": "2023-01-01T10:00:00",
            "issues": "badgeom,orphan", "lng": 85.31, "lat": 27.71,
        }]),
    );
    let ctx = ReportContext::new(&db);
    let input = json!({
        "fromTimestamp": "2023-01-01T00:00:00",
        "toTimestamp": "2023-01-01T12:00:00",
        "issueType": ["badgeom"],
        "geometry": {
            "type": "Polygon",
            "coordinates": [[[85.3, 27.7], [85.32, 27.7], [85.32, 27.72], [85.3, 27.72], [85.3, 27.7]]]
        },
    });

    let outcome = report::run(ReportFamily::DataQualityHashtag, &ctx, &input).unwrap();
    let statement = db.executed()[0].statement().to_string();
    assert!(statement.contains("ST_CONTAINS"), "{}", statement);
    assert!(!statement.contains("hashtags\")"), "{}", statement);

    match &outcome.body {
        ReportBody::Features(features) => {
            assert!(features.is_points());
            assert_eq!(features.len(), 1);
        }
        other => panic!("unexpected body: {:?}", other),
    }
}

#[test]
fn test_every_family_runs_against_empty_database() {
    let db = FakeDatabase::default();
    let tm = FakeDatabase::default();
    let ctx = ReportContext::new(&db).with_tasking_manager(&tm);

    let inputs = [
        (
            ReportFamily::UserLookup,
            json!({"userNames": ["mapper"], "fromTimestamp": "2023-01-01", "toTimestamp": "2023-01-02"}),
        ),
        (
            ReportFamily::DataQualityProject,
            json!({"projectIds": [1], "issueTypes": ["all"]}),
        ),
        (
            ReportFamily::DataQualityUsername,
            json!({"osmUsernames": ["mapper"], "fromTimestamp": "2023-01-01", "toTimestamp": "2023-01-02", "issueTypes": ["badvalue"]}),
        ),
        (ReportFamily::TrainingOrganisations, json!({})),
        (ReportFamily::TrainingList, json!({"eventType": "virtual"})),
        (ReportFamily::ValidatorStats, json!({"year": 2021, "status": "archived"})),
    ];

    for (family, input) in inputs {
        let outcome = report::run(family, &ctx, &input)
            .unwrap_or_else(|e| panic!("{}: {}", family, e));
        assert_eq!(outcome.family, family);
        render(&outcome).unwrap_or_else(|e| panic!("{}: {}", family, e));
    }
    assert_eq!(tm.executed().len(), 1);
}
