use chrono::NaiveDateTime;
use galaxy::compose::schema::{changesets as c, countries as b, training as t};
use galaxy::compose::{compose, count_placeholders, ComposeOptions, ComposerError, Template};
use galaxy::predicate::{
    equals, hashtags, spatial, time_range, FilterSlot, FragmentSet, SpatialRelation,
};
use galaxy::sql::{Dialect, SqlValue};
use galaxy::validation::{CountryCode, GeometryFilter, HashtagFilter, MatchMode, TimeRange};
use sqlparser::dialect::{DuckDbDialect, PostgreSqlDialect};
use sqlparser::parser::Parser;

fn ts(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
}

fn window() -> TimeRange {
    TimeRange::new(ts("2023-01-01T00:00:00"), ts("2023-01-08T00:00:00"), None).unwrap()
}

fn tags(raw: &[&str], mode: Option<MatchMode>) -> HashtagFilter {
    let raw: Vec<String> = raw.iter().map(|s| s.to_string()).collect();
    HashtagFilter::new(&raw, mode).unwrap()
}

fn parses(statement: &str, dialect: Dialect) {
    let result = match dialect {
        Dialect::Postgres => Parser::parse_sql(&PostgreSqlDialect {}, statement),
        Dialect::DuckDb => Parser::parse_sql(&DuckDbDialect {}, statement),
    };
    if let Err(e) = result {
        panic!("{:?} rejected statement: {}\n{}", dialect, e, statement);
    }
}

#[test]
fn test_composition_is_deterministic() {
    let fragments = FragmentSet::new()
        .with(FilterSlot::Time, time_range(c::CREATED_AT, &window()))
        .with(
            FilterSlot::Campaign,
            hashtags(c::HASHTAGS, &tags(&["missingmaps", "hotosm"], None)),
        );
    let options = ComposeOptions::default();

    let first = compose(Template::MapathonUserFeatures, &fragments, &options).unwrap();
    let second = compose(Template::MapathonUserFeatures, &fragments, &options).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.fingerprint(), second.fingerprint());
    parses(first.statement(), Dialect::Postgres);
}

#[test]
fn test_fragment_insertion_order_does_not_matter() {
    let time = time_range(c::CREATED_AT, &window());
    let tags = hashtags(c::HASHTAGS, &tags(&["missingmaps"], None));

    let forward = FragmentSet::new()
        .with(FilterSlot::Time, time.clone())
        .with(FilterSlot::Campaign, tags.clone());
    let backward = FragmentSet::new()
        .with(FilterSlot::Campaign, tags)
        .with(FilterSlot::Time, time);

    for template in [Template::MapathonContributorCount, Template::CountryStatistics] {
        let a = compose(template, &forward, &ComposeOptions::default()).unwrap();
        let b = compose(template, &backward, &ComposeOptions::default()).unwrap();
        assert_eq!(a.statement(), b.statement());
        assert_eq!(a.parameters(), b.parameters());
    }
}

#[test]
fn test_time_predicate_present_only_with_range() {
    let with_time = FragmentSet::new().with(FilterSlot::Time, time_range(c::CREATED_AT, &window()));
    let composed =
        compose(Template::CountryStatistics, &with_time, &ComposeOptions::default()).unwrap();
    assert_eq!(composed.statement().matches("BETWEEN").count(), 1);
    assert_eq!(
        composed.parameters(),
        &[
            SqlValue::Timestamp(ts("2023-01-01T00:00:00")),
            SqlValue::Timestamp(ts("2023-01-08T00:00:00")),
        ]
    );

    let composed = compose(
        Template::CountryStatistics,
        &FragmentSet::new(),
        &ComposeOptions::default(),
    )
    .unwrap();
    assert!(!composed.statement().contains("BETWEEN"));
    assert!(!composed.statement().contains("WHERE"));
    assert!(composed.parameters().is_empty());
}

#[test]
fn test_or_hashtags_stay_grouped() {
    let fragments = FragmentSet::new()
        .with(FilterSlot::Time, time_range(c::CREATED_AT, &window()))
        .with(
            FilterSlot::Campaign,
            hashtags(c::HASHTAGS, &tags(&["a1", "b2"], Some(MatchMode::Any))),
        );
    let composed = compose(
        Template::CountryStatistics,
        &fragments,
        &ComposeOptions::default(),
    )
    .unwrap();

    assert!(composed.statement().contains(
        r#"AND ($3 = ANY("c"."hashtags") OR $4 = ANY("c"."hashtags"))"#
    ));
    parses(composed.statement(), Dialect::Postgres);
}

#[test]
fn test_values_never_reach_statement_text() {
    let hostile = "x'); DROP TABLE training; --";
    let fragments = FragmentSet::new()
        .with(FilterSlot::Organisation, equals(t::ORGANIZATION, hostile))
        .with(FilterSlot::EventType, equals(t::EVENT_TYPE, "virtual"));
    for dialect in [Dialect::Postgres, Dialect::DuckDb] {
        let options = ComposeOptions::default().with_dialect(dialect);
        let composed = compose(Template::TrainingList, &fragments, &options).unwrap();
        assert!(!composed.statement().contains("DROP"));
        assert_eq!(composed.parameters()[0], SqlValue::Text(hostile.into()));
        assert_eq!(
            count_placeholders(composed.statement(), dialect),
            composed.parameters().len()
        );
        parses(composed.statement(), dialect);
    }
}

#[test]
fn test_country_code_filter() {
    let geometry = GeometryFilter::new(None, Some(CountryCode::new("npl").unwrap()), 5000.0).unwrap();
    let fragments = FragmentSet::new().with(
        FilterSlot::Geometry,
        spatial(c::BBOX, b::ISO3, &geometry, SpatialRelation::Intersects),
    );
    let composed = compose(
        Template::CountryStatistics,
        &fragments,
        &ComposeOptions::default().with_geometry(true),
    )
    .unwrap();
    assert!(composed.statement().contains(r#"WHERE "b"."iso3" = $1"#));
    assert!(composed.statement().contains("ST_ASGEOJSON"));
    assert_eq!(composed.parameters(), &[SqlValue::Text("NPL".into())]);
    parses(composed.statement(), Dialect::Postgres);
}

#[test]
fn test_composer_errors() {
    let training_time = FragmentSet::new().with(FilterSlot::Users, equals(t::NAME, "x"));
    assert_eq!(
        compose(Template::TrainingList, &training_time, &ComposeOptions::default()).unwrap_err(),
        ComposerError::UnsupportedSlot {
            template: Template::TrainingList,
            slot: FilterSlot::Users,
        }
    );

    let wrong_column = FragmentSet::new().with(FilterSlot::Organisation, equals(c::EDITOR, "iD"));
    assert!(matches!(
        compose(Template::TrainingList, &wrong_column, &ComposeOptions::default()).unwrap_err(),
        ComposerError::MissingColumn { column, .. } if column == c::EDITOR
    ));

    assert!(matches!(
        compose(
            Template::UserIds,
            &FragmentSet::new(),
            &ComposeOptions::default()
        )
        .unwrap_err(),
        ComposerError::MissingRequiredSlot { .. }
    ));

    assert_eq!(
        compose(
            Template::TrainingOrganisations,
            &FragmentSet::new(),
            &ComposeOptions::default().with_geometry(true)
        )
        .unwrap_err(),
        ComposerError::GeometryUnavailable {
            template: Template::TrainingOrganisations
        }
    );

    assert_eq!(
        "mapathon".parse::<Template>().unwrap_err(),
        ComposerError::UnknownTemplate("mapathon".into())
    );
}
