//! Serialization dispatcher: one entry point from a report body to bytes.
//!
//! | Body       | json | csv | geojson |
//! |------------|------|-----|---------|
//! | Records    | ✓    | ✓   |         |
//! | Features   | ✓    | ✓   | ✓       |
//! | Sections   | ✓    |     |         |
//! | Value      | ✓    |     |         |
//!
//! CSV of a feature set carries the properties plus `lng`/`lat` for point
//! features, or the geometry as GeoJSON text otherwise.

use serde_json::{Map, Value};

use crate::report::{FeatureSet, RecordSet, ReportBody, ReportOutcome};
use crate::request::ReportFamily;
use crate::validation::OutputType;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OutputError {
    #[error("{family} reports cannot be rendered as {output}")]
    NotAccepted {
        family: ReportFamily,
        output: OutputType,
    },

    #[error("a {body} body cannot be rendered as {output}")]
    Unsupported {
        body: &'static str,
        output: OutputType,
    },

    #[error("CSV encoding failed: {0}")]
    Csv(String),

    #[error("JSON encoding failed: {0}")]
    Json(String),
}

/// Rendered report, ready to hand to a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub content_type: &'static str,
    pub body: String,
}

/// Render in the output type the request asked for.
pub fn render(outcome: &ReportOutcome) -> Result<Rendered, OutputError> {
    render_as(outcome, outcome.output)
}

/// Render in `output`, which must be accepted by the outcome's family.
pub fn render_as(outcome: &ReportOutcome, output: OutputType) -> Result<Rendered, OutputError> {
    if !outcome.family.accepted_outputs().contains(&output) {
        return Err(OutputError::NotAccepted {
            family: outcome.family,
            output,
        });
    }
    match output {
        OutputType::Json => Ok(Rendered {
            content_type: "application/json",
            body: serde_json::to_string(&outcome.body)
                .map_err(|e| OutputError::Json(e.to_string()))?,
        }),
        OutputType::Geojson => match &outcome.body {
            ReportBody::Features(features) => Ok(Rendered {
                content_type: "application/geo+json",
                body: features.to_geojson().to_string(),
            }),
            other => Err(unsupported(other, output)),
        },
        OutputType::Csv => {
            let body = match &outcome.body {
                ReportBody::Records(records) => records_csv(records),
                ReportBody::Features(features) => features_csv(features),
                other => return Err(unsupported(other, output)),
            }?;
            Ok(Rendered {
                content_type: "text/csv",
                body,
            })
        }
    }
}

fn unsupported(body: &ReportBody, output: OutputType) -> OutputError {
    OutputError::Unsupported {
        body: body.kind(),
        output,
    }
}

/// A JSON value as one CSV cell.
fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn write_csv(header: &[&str], rows: impl Iterator<Item = Vec<String>>) -> Result<String, OutputError> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer
        .write_record(header)
        .map_err(|e| OutputError::Csv(e.to_string()))?;
    for row in rows {
        writer
            .write_record(&row)
            .map_err(|e| OutputError::Csv(e.to_string()))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| OutputError::Csv(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| OutputError::Csv(e.to_string()))
}

fn row_cells(columns: &[&str], row: &Map<String, Value>) -> Vec<String> {
    columns.iter().map(|c| cell(row.get(*c))).collect()
}

fn records_csv(records: &RecordSet) -> Result<String, OutputError> {
    let columns = records.columns();
    write_csv(columns, records.rows().iter().map(|row| row_cells(columns, row)))
}

fn features_csv(features: &FeatureSet) -> Result<String, OutputError> {
    let columns = features.property_columns();
    let mut header: Vec<&str> = columns.to_vec();
    if features.is_points() {
        header.extend(["lng", "lat"]);
    } else {
        header.push("geometry");
    }

    let rows = features.features().iter().map(|feature| {
        let mut cells = row_cells(columns, &feature.properties);
        if features.is_points() {
            let coordinates = feature.geometry.get("coordinates");
            cells.push(cell(coordinates.and_then(|c| c.get(0))));
            cells.push(cell(coordinates.and_then(|c| c.get(1))));
        } else {
            cells.push(cell(Some(&feature.geometry)));
        }
        cells
    });
    write_csv(&header, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::Template;
    use crate::report::ColumnSpec;
    use serde_json::json;

    fn outcome(family: ReportFamily, output: OutputType, body: ReportBody) -> ReportOutcome {
        ReportOutcome {
            family,
            filters: Map::new(),
            output,
            body,
        }
    }

    fn rows(value: Value) -> Vec<Map<String, Value>> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_records_csv_quotes_and_nulls() {
        let specs = [
            ColumnSpec::new("user_name", "userName"),
            ColumnSpec::new("user_id", "userId"),
        ];
        let records = RecordSet::shape(
            Template::UserIds,
            &rows(json!([{"user_name": "a, b", "user_id": null}])),
            &specs,
        )
        .unwrap();
        let rendered = render(&outcome(
            ReportFamily::UserLookup,
            OutputType::Csv,
            ReportBody::Records(records),
        ))
        .unwrap();
        assert_eq!(rendered.content_type, "text/csv");
        assert_eq!(rendered.body, "userName,userId\n\"a, b\",\n");
    }

    #[test]
    fn test_empty_records_still_have_header() {
        let records =
            RecordSet::shape(Template::UserIds, &[], &[ColumnSpec::new("user_id", "userId")])
                .unwrap();
        let rendered = render(&outcome(
            ReportFamily::UserLookup,
            OutputType::Csv,
            ReportBody::Records(records),
        ))
        .unwrap();
        assert_eq!(rendered.body, "userId\n");
    }

    #[test]
    fn test_point_features_csv() {
        let features = FeatureSet::points(
            Template::DataQualityProject,
            &rows(json!([{"osm_id": 9, "lng": 85.5, "lat": 27.25}])),
            "lng",
            "lat",
            &[ColumnSpec::new("osm_id", "osmId")],
        )
        .unwrap();
        let rendered = render(&outcome(
            ReportFamily::DataQualityProject,
            OutputType::Csv,
            ReportBody::Features(features),
        ))
        .unwrap();
        assert_eq!(rendered.body, "osmId,lng,lat\n9,85.5,27.25\n");
    }

    #[test]
    fn test_sections_are_json_only() {
        let body = ReportBody::Sections(vec![("totalContributors", ReportBody::Value(json!(2)))]);
        let summary = outcome(ReportFamily::MapathonSummary, OutputType::Json, body);
        assert_eq!(render(&summary).unwrap().body, r#"{"totalContributors":2}"#);

        let err = render_as(&summary, OutputType::Csv).unwrap_err();
        assert_eq!(
            err,
            OutputError::NotAccepted {
                family: ReportFamily::MapathonSummary,
                output: OutputType::Csv
            }
        );

        let body = ReportBody::Sections(vec![]);
        let detail = outcome(ReportFamily::MapathonDetail, OutputType::Geojson, body);
        assert_eq!(
            render(&detail).unwrap_err(),
            OutputError::Unsupported {
                body: "sections",
                output: OutputType::Geojson
            }
        );
    }
}
