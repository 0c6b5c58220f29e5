use galaxy::compose::Template;
use galaxy::output::{render, render_as, OutputError};
use galaxy::report::{ColumnSpec, FeatureSet, RecordSet, ReportBody, ReportOutcome, Row};
use galaxy::request::ReportFamily;
use galaxy::validation::OutputType;
use serde_json::{json, Map, Value};

fn rows(value: Value) -> Vec<Row> {
    serde_json::from_value(value).unwrap()
}

fn outcome(family: ReportFamily, output: OutputType, body: ReportBody) -> ReportOutcome {
    ReportOutcome {
        family,
        filters: Map::new(),
        output,
        body,
    }
}

const COUNTRY: &[ColumnSpec] = &[
    ColumnSpec::new("iso3", "iso3"),
    ColumnSpec::new("contributors", "contributors").zero_if_null(),
];

#[test]
fn test_country_features_in_every_output() {
    let features = FeatureSet::geometries(
        Template::CountryStatistics,
        &rows(json!([{
            "iso3": "NPL",
            "contributors": null,
            "geometry": r#"{"type":"Point","coordinates":[84.1,28.3]}"#,
        }])),
        "geometry",
        COUNTRY,
    )
    .unwrap();
    let report = outcome(
        ReportFamily::Countries,
        OutputType::Geojson,
        ReportBody::Features(features),
    );

    let geojson: Value = serde_json::from_str(&render(&report).unwrap().body).unwrap();
    assert_eq!(
        geojson["features"][0]["properties"],
        json!({"iso3": "NPL", "contributors": 0})
    );

    let csv = render_as(&report, OutputType::Csv).unwrap();
    assert_eq!(
        csv.body,
        "iso3,contributors,geometry\nNPL,0,\"{\"\"type\"\":\"\"Point\"\",\"\"coordinates\"\":[84.1,28.3]}\"\n"
    );

    let json = render_as(&report, OutputType::Json).unwrap();
    assert_eq!(json.content_type, "application/json");
    assert_eq!(serde_json::from_str::<Value>(&json.body).unwrap(), geojson);
}

#[test]
fn test_records_cannot_be_geojson() {
    let records = RecordSet::shape(
        Template::CountryStatistics,
        &rows(json!([{"iso3": "NPL", "contributors": 2}])),
        COUNTRY,
    )
    .unwrap();
    let report = outcome(ReportFamily::Countries, OutputType::Json, ReportBody::Records(records));

    assert_eq!(
        render_as(&report, OutputType::Geojson).unwrap_err(),
        OutputError::Unsupported {
            body: "records",
            output: OutputType::Geojson
        }
    );
    assert_eq!(
        render(&report).unwrap().body,
        r#"[{"iso3":"NPL","contributors":2}]"#
    );
}

#[test]
fn test_output_must_be_accepted_by_family() {
    let report = outcome(
        ReportFamily::UserLookup,
        OutputType::Json,
        ReportBody::Value(json!(null)),
    );
    assert_eq!(
        render_as(&report, OutputType::Geojson).unwrap_err(),
        OutputError::NotAccepted {
            family: ReportFamily::UserLookup,
            output: OutputType::Geojson
        }
    );
}
