//! Report bodies and the shaping of raw rows into them.
//!
//! Raw rows carry database column names; every shaped field carries its
//! external (camelCase) name from an explicit [`ColumnSpec`] table.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{json, Map, Value};

use super::database::Row;
use crate::compose::Template;
use crate::request::ReportFamily;
use crate::validation::OutputType;

/// A row does not fit the declared output schema.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ShapeError {
    #[error("{template}: row {row} has no column '{column}'")]
    MissingColumn {
        template: Template,
        row: usize,
        column: &'static str,
    },

    #[error("{template}: row {row}, column '{column}': {message}")]
    InvalidValue {
        template: Template,
        row: usize,
        column: &'static str,
        message: String,
    },

    #[error("{template}: expected exactly one row, got {rows}")]
    NotScalar { template: Template, rows: usize },
}

/// One output field: database column → external name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub source: &'static str,
    pub external: &'static str,
    /// Report NULL as 0 (aggregates over no rows).
    pub zero_if_null: bool,
}

impl ColumnSpec {
    pub const fn new(source: &'static str, external: &'static str) -> Self {
        Self {
            source,
            external,
            zero_if_null: false,
        }
    }

    pub const fn zero_if_null(mut self) -> Self {
        self.zero_if_null = true;
        self
    }

    fn take(&self, template: Template, index: usize, row: &Row) -> Result<Value, ShapeError> {
        match row.get(self.source) {
            None => Err(ShapeError::MissingColumn {
                template,
                row: index,
                column: self.source,
            }),
            Some(Value::Null) if self.zero_if_null => Ok(Value::from(0)),
            Some(value) => Ok(value.clone()),
        }
    }
}

fn rename(
    template: Template,
    index: usize,
    row: &Row,
    specs: &[ColumnSpec],
) -> Result<Map<String, Value>, ShapeError> {
    specs
        .iter()
        .map(|spec| Ok((spec.external.to_string(), spec.take(template, index, row)?)))
        .collect()
}

/// Flat records with a fixed column order.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSet {
    columns: Vec<&'static str>,
    rows: Vec<Map<String, Value>>,
}

impl RecordSet {
    pub fn shape(
        template: Template,
        rows: &[Row],
        specs: &[ColumnSpec],
    ) -> Result<Self, ShapeError> {
        let rows = rows
            .iter()
            .enumerate()
            .map(|(i, row)| rename(template, i, row, specs))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            columns: specs.iter().map(|s| s.external).collect(),
            rows,
        })
    }

    /// External column names, in output order.
    pub fn columns(&self) -> &[&'static str] {
        &self.columns
    }

    pub fn rows(&self) -> &[Map<String, Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Serialize for RecordSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.rows.serialize(serializer)
    }
}

/// The single value of a one-row result.
pub fn scalar(template: Template, rows: &[Row], column: &'static str) -> Result<Value, ShapeError> {
    match rows {
        [row] => row.get(column).cloned().ok_or(ShapeError::MissingColumn {
            template,
            row: 0,
            column,
        }),
        _ => Err(ShapeError::NotScalar {
            template,
            rows: rows.len(),
        }),
    }
}

/// A GeoJSON feature.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub geometry: Value,
    pub properties: Map<String, Value>,
}

/// Features sharing one property schema.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSet {
    property_columns: Vec<&'static str>,
    features: Vec<Feature>,
    points: bool,
}

fn coordinate(
    template: Template,
    index: usize,
    row: &Row,
    column: &'static str,
) -> Result<f64, ShapeError> {
    match row.get(column) {
        None => Err(ShapeError::MissingColumn {
            template,
            row: index,
            column,
        }),
        Some(value) => value.as_f64().ok_or_else(|| ShapeError::InvalidValue {
            template,
            row: index,
            column,
            message: format!("expected a number, got {}", value),
        }),
    }
}

impl FeatureSet {
    /// Point features from longitude/latitude columns.
    pub fn points(
        template: Template,
        rows: &[Row],
        lng: &'static str,
        lat: &'static str,
        specs: &[ColumnSpec],
    ) -> Result<Self, ShapeError> {
        let features = rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let x = coordinate(template, i, row, lng)?;
                let y = coordinate(template, i, row, lat)?;
                Ok(Feature {
                    geometry: json!({"type": "Point", "coordinates": [x, y]}),
                    properties: rename(template, i, row, specs)?,
                })
            })
            .collect::<Result<Vec<_>, ShapeError>>()?;
        Ok(Self::new(specs, features, true))
    }

    /// Features whose geometry column holds GeoJSON text. NULL geometry is
    /// kept as a feature without geometry.
    pub fn geometries(
        template: Template,
        rows: &[Row],
        geometry_column: &'static str,
        specs: &[ColumnSpec],
    ) -> Result<Self, ShapeError> {
        let features = rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let geometry = match row.get(geometry_column) {
                    None => {
                        return Err(ShapeError::MissingColumn {
                            template,
                            row: i,
                            column: geometry_column,
                        })
                    }
                    Some(Value::String(text)) => {
                        serde_json::from_str(text).map_err(|e| ShapeError::InvalidValue {
                            template,
                            row: i,
                            column: geometry_column,
                            message: e.to_string(),
                        })?
                    }
                    Some(other) => other.clone(),
                };
                Ok(Feature {
                    geometry,
                    properties: rename(template, i, row, specs)?,
                })
            })
            .collect::<Result<Vec<_>, ShapeError>>()?;
        Ok(Self::new(specs, features, false))
    }

    fn new(specs: &[ColumnSpec], features: Vec<Feature>, points: bool) -> Self {
        Self {
            property_columns: specs.iter().map(|s| s.external).collect(),
            features,
            points,
        }
    }

    /// Whether every geometry is a point built by [`FeatureSet::points`].
    pub fn is_points(&self) -> bool {
        self.points
    }

    pub fn property_columns(&self) -> &[&'static str] {
        &self.property_columns
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// The set as a GeoJSON `FeatureCollection`.
    pub fn to_geojson(&self) -> Value {
        let features: Vec<Value> = self
            .features
            .iter()
            .map(|f| {
                json!({
                    "type": "Feature",
                    "geometry": f.geometry,
                    "properties": f.properties,
                })
            })
            .collect();
        json!({"type": "FeatureCollection", "features": features})
    }
}

impl Serialize for FeatureSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_geojson().serialize(serializer)
    }
}

/// Result body: one tagged shape, consumed by [`crate::output::render`].
#[derive(Debug, Clone, PartialEq)]
pub enum ReportBody {
    Records(RecordSet),
    Features(FeatureSet),
    /// Named parts, serialized as one JSON object in this order.
    Sections(Vec<(&'static str, ReportBody)>),
    Value(Value),
}

impl ReportBody {
    pub fn kind(&self) -> &'static str {
        match self {
            ReportBody::Records(_) => "records",
            ReportBody::Features(_) => "features",
            ReportBody::Sections(_) => "sections",
            ReportBody::Value(_) => "value",
        }
    }

    pub fn section(&self, name: &str) -> Option<&ReportBody> {
        match self {
            ReportBody::Sections(sections) => {
                sections.iter().find(|(n, _)| *n == name).map(|(_, b)| b)
            }
            _ => None,
        }
    }
}

impl Serialize for ReportBody {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ReportBody::Records(records) => records.serialize(serializer),
            ReportBody::Features(features) => features.serialize(serializer),
            ReportBody::Sections(sections) => {
                let mut map = serializer.serialize_map(Some(sections.len()))?;
                for (name, body) in sections {
                    map.serialize_entry(name, body)?;
                }
                map.end()
            }
            ReportBody::Value(value) => value.serialize(serializer),
        }
    }
}

/// A finished report: what was asked and what came back.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportOutcome {
    pub family: ReportFamily,
    /// Validated filters under their external names.
    pub filters: Map<String, Value>,
    /// Output requested by the caller.
    pub output: OutputType,
    pub body: ReportBody,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            _ => panic!("row must be an object"),
        }
    }

    const SPECS: &[ColumnSpec] = &[
        ColumnSpec::new("user_id", "userId"),
        ColumnSpec::new("added_buildings", "addedBuildings").zero_if_null(),
    ];

    #[test]
    fn test_records_rename_and_zero_nulls() {
        let rows = vec![row(json!({"user_id": 7, "added_buildings": null, "extra": 1}))];
        let records = RecordSet::shape(Template::UserStatistics, &rows, SPECS).unwrap();
        assert_eq!(records.columns(), &["userId", "addedBuildings"]);
        assert_eq!(
            serde_json::to_value(&records).unwrap(),
            json!([{"userId": 7, "addedBuildings": 0}])
        );
    }

    #[test]
    fn test_missing_column() {
        let rows = vec![row(json!({"user_id": 7}))];
        let err = RecordSet::shape(Template::UserStatistics, &rows, SPECS).unwrap_err();
        assert_eq!(
            err,
            ShapeError::MissingColumn {
                template: Template::UserStatistics,
                row: 0,
                column: "added_buildings",
            }
        );
    }

    #[test]
    fn test_scalar() {
        let rows = vec![row(json!({"last_updated": "00:05:00"}))];
        assert_eq!(
            scalar(Template::ChangesetRecency, &rows, "last_updated").unwrap(),
            json!("00:05:00")
        );
        assert_eq!(
            scalar(Template::ChangesetRecency, &[], "last_updated").unwrap_err(),
            ShapeError::NotScalar {
                template: Template::ChangesetRecency,
                rows: 0
            }
        );
    }

    #[test]
    fn test_points() {
        let rows = vec![row(json!({"osm_id": 1, "lng": 85.3, "lat": 27.7}))];
        let specs = [ColumnSpec::new("osm_id", "osmId")];
        let features =
            FeatureSet::points(Template::DataQualityProject, &rows, "lng", "lat", &specs).unwrap();
        assert_eq!(
            features.to_geojson(),
            json!({
                "type": "FeatureCollection",
                "features": [{
                    "type": "Feature",
                    "geometry": {"type": "Point", "coordinates": [85.3, 27.7]},
                    "properties": {"osmId": 1}
                }]
            })
        );
    }

    #[test]
    fn test_bad_geometry_text() {
        let rows = vec![row(json!({"geometry": "not json", "username": "a"}))];
        let err = FeatureSet::geometries(Template::MapathonContributors, &rows, "geometry", &[])
            .unwrap_err();
        assert!(matches!(err, ShapeError::InvalidValue { column: "geometry", .. }));
    }

    #[test]
    fn test_sections_keep_order() {
        let body = ReportBody::Sections(vec![
            ("totalContributors", ReportBody::Value(json!(3))),
            ("mappedFeatures", ReportBody::Value(json!([]))),
        ]);
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"totalContributors":3,"mappedFeatures":[]}"#
        );
        assert_eq!(body.section("totalContributors"), Some(&ReportBody::Value(json!(3))));
    }
}
