use galaxy::request::{
    alias_table, validate, CountryRequest, FilterRequest, MapathonDetailRequest,
    OrganizationHashtagRequest, ReportFamily,
};
use galaxy::validation::{Limits, MatchMode, OutputType, ViolationKind};
use inflector::Inflector;
use serde_json::json;
use std::collections::HashSet;

#[test]
fn test_alias_tables_are_camel_case() {
    for family in ReportFamily::ALL {
        for (internal, external) in alias_table(family).entries() {
            // Inflector splits digits off differently; iso3 stays as is.
            if internal.chars().any(|c| c.is_ascii_digit()) {
                assert_eq!(internal, external);
                continue;
            }
            assert_eq!(&internal.to_camel_case(), external, "{}", family);
        }
    }
}

#[test]
fn test_alias_tables_are_bijective() {
    for family in ReportFamily::ALL {
        let table = alias_table(family);
        let internals: HashSet<_> = table.entries().iter().map(|(i, _)| *i).collect();
        let externals: HashSet<_> = table.entries().iter().map(|(_, e)| *e).collect();
        assert_eq!(internals.len(), table.entries().len(), "{}", family);
        assert_eq!(externals.len(), table.entries().len(), "{}", family);

        for (internal, external) in table.entries() {
            assert_eq!(table.external(internal), *external);
            assert_eq!(table.internal(external), Some(*internal));
            assert_eq!(table.internal(internal), Some(*internal));
        }
    }
}

#[test]
fn test_reversed_time_range_names_both_fields() {
    let errors = MapathonDetailRequest::from_input(
        &json!({
            "fromTimestamp": "2023-02-01T00:00:00",
            "toTimestamp": "2023-01-01T00:00:00",
            "hashtags": ["mapathon"],
        }),
        &Limits::default(),
    )
    .unwrap_err();

    let error = errors.for_field("fromTimestamp").unwrap();
    assert_eq!(error.kind, ViolationKind::OutOfOrder);
    assert!(error.fields.contains(&"toTimestamp".to_string()));
}

#[test]
fn test_case_insensitive_duplicate_hashtags() {
    let errors = MapathonDetailRequest::from_input(
        &json!({
            "fromTimestamp": "2023-01-01T00:00:00",
            "toTimestamp": "2023-01-02T00:00:00",
            "hashtags": ["#Map", "#map"],
        }),
        &Limits::default(),
    )
    .unwrap_err();
    assert!(errors.has("hashtags", ViolationKind::Duplicate));
}

#[test]
fn test_mapathon_span_cap() {
    let input = |to: &str| {
        json!({
            "fromTimestamp": "2023-01-01",
            "toTimestamp": to,
            "hashtags": ["#hotosm-project-1"],
            "outputType": "geojson",
        })
    };

    let request =
        MapathonDetailRequest::from_input(&input("2023-02-01"), &Limits::default()).unwrap();
    assert_eq!(request.0.output_type, OutputType::Geojson);
    assert_eq!(request.0.hashtags.as_ref().unwrap().mode(), MatchMode::Single);

    let errors =
        MapathonDetailRequest::from_input(&input("2023-02-02"), &Limits::default()).unwrap_err();
    assert!(errors.has("toTimestamp", ViolationKind::SpanExceeded));
}

#[test]
fn test_every_violation_is_reported() {
    let errors = validate(
        ReportFamily::MapathonSummary,
        &json!({
            "fromTimestamp": "yesterday",
            "projectIds": [1, 1],
            "colour": "blue",
        }),
        &Limits::default(),
    )
    .unwrap_err();

    assert!(errors.has("fromTimestamp", ViolationKind::InvalidValue));
    assert!(errors.has("toTimestamp", ViolationKind::Missing));
    assert!(errors.has("projectIds", ViolationKind::Duplicate));
    assert!(errors.has("colour", ViolationKind::UnknownField));
}

#[test]
fn test_organization_date_cap() {
    let limits = Limits {
        organization_max_days: 400,
        ..Limits::default()
    };
    let input = |end: &str| {
        json!({
            "hashtags": ["hotosm"],
            "frequency": "m",
            "startDate": "2020-01-01",
            "endDate": end,
        })
    };

    assert!(OrganizationHashtagRequest::from_input(&input("2021-01-01"), &limits).is_ok());

    let errors = OrganizationHashtagRequest::from_input(&input("2022-01-01"), &limits).unwrap_err();
    assert!(errors.has("startDate", ViolationKind::SpanExceeded));
    assert!(errors.has("endDate", ViolationKind::SpanExceeded));
}

#[test]
fn test_empty_country_request() {
    let request = CountryRequest::from_input(&json!({}), &Limits::default()).unwrap();
    assert!(request.time.is_none());
    assert!(request.hashtags.is_none());
    assert!(request.geometry.is_none());
    assert_eq!(request.output_type, ReportFamily::Countries.default_output());
}

#[test]
fn test_applied_filters_use_external_names() {
    let applied = validate(
        ReportFamily::UserStatistics,
        &json!({
            "user_id": 7,
            "fromTimestamp": "2023-01-01T00:00:00",
            "to_timestamp": "2023-01-03T00:00:00",
        }),
        &Limits::default(),
    )
    .unwrap();

    assert_eq!(applied["userId"], json!(7));
    assert!(applied.contains_key("toTimestamp"));
    assert!(!applied.contains_key("user_id"));
}

#[test]
fn test_output_type_must_be_accepted() {
    let errors = validate(
        ReportFamily::MapathonSummary,
        &json!({
            "fromTimestamp": "2023-01-01T00:00:00",
            "toTimestamp": "2023-01-02T00:00:00",
            "projectIds": [5],
            "outputType": "csv",
        }),
        &Limits::default(),
    )
    .unwrap_err();
    assert!(errors.has("outputType", ViolationKind::InvalidValue));
}

#[test]
fn test_match_mode_needs_hashtags() {
    let errors = MapathonDetailRequest::from_input(
        &json!({
            "fromTimestamp": "2023-01-01T00:00:00",
            "toTimestamp": "2023-01-02T00:00:00",
            "projectIds": [1],
            "matchMode": "all",
        }),
        &Limits::default(),
    )
    .unwrap_err();
    let error = errors.for_field("matchMode").unwrap();
    assert_eq!(error.kind, ViolationKind::Conflict);
    assert_eq!(error.fields, vec!["matchMode", "hashtags"]);

    let errors = validate(
        ReportFamily::Countries,
        &json!({"hashtags": [], "matchMode": "any"}),
        &Limits::default(),
    )
    .unwrap_err();
    assert!(errors.has("hashtags", ViolationKind::Conflict));
}
