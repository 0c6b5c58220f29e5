//! Validation of report filter input.
//!
//! Each filter concern is a standalone value type with a validating
//! constructor ([`TimeRange`], [`HashtagFilter`], [`GeometryFilter`], ...).
//! Constructors report a [`Violation`]; the request models in
//! [`crate::request`] attach external field names to it and collect every
//! violation into [`ValidationErrors`] instead of stopping at the first.

mod enums;
mod fields;
mod geometry;
mod hashtag;
mod lists;
mod time;

pub use enums::{EventType, Frequency, OutputType, Source, Status, TopicType};
pub use fields::{parse, AliasTable, Fields};
pub use geometry::{CountryCode, GeometryFilter, Polygon, Position};
pub use hashtag::{HashtagFilter, MatchMode};
pub use lists::{IssueType, IssueTypes, ProjectIds, TopicTypes, UserNames};
pub use time::{parse_date, parse_timestamp, DateBounds, TimeRange};

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Category of a broken rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// Required field absent.
    Missing,
    /// Field not known to the request model.
    UnknownField,
    /// Wrong JSON type.
    InvalidType,
    /// Right type, value out of range or not recognised.
    InvalidValue,
    /// Start of a range is not before its end.
    OutOfOrder,
    /// Range longer than the configured maximum.
    SpanExceeded,
    /// Range shorter than the minimum for the chosen frequency.
    SpanTooShort,
    Duplicate,
    Empty,
    /// Fields that cannot be combined.
    Conflict,
    InvalidGeometry,
    AreaExceeded,
}

/// A rule broken by a single value, before field names are attached.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub kind: ViolationKind,
    pub message: String,
}

impl Violation {
    pub fn new(kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// One violated rule, naming the external field(s) involved.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error("{}: {}", .fields.join(", "), .message)]
pub struct ValidationError {
    pub fields: Vec<String>,
    pub kind: ViolationKind,
    pub message: String,
}

/// Every violated rule of one request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ValidationError) {
        self.0.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.0.iter()
    }

    /// First error that names `field`.
    pub fn for_field(&self, field: &str) -> Option<&ValidationError> {
        self.0.iter().find(|e| e.fields.iter().any(|f| f == field))
    }

    /// Whether an error of `kind` names `field`.
    pub fn has(&self, field: &str, kind: ViolationKind) -> bool {
        self.0
            .iter()
            .any(|e| e.kind == kind && e.fields.iter().any(|f| f == field))
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} invalid field(s)", self.0.len())?;
        for error in &self.0 {
            write!(f, "; {}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Configurable caps on request size.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Limits {
    pub mapathon_max_days: i64,
    pub user_statistics_max_days: i64,
    pub data_quality_hashtag_max_hours: i64,
    pub data_quality_username_max_days: i64,
    pub training_max_days: i64,
    pub organization_max_days: i64,
    pub max_polygon_area_km2: f64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            mapathon_max_days: 31,
            user_statistics_max_days: 30,
            data_quality_hashtag_max_hours: 24,
            data_quality_username_max_days: 30,
            training_max_days: 1826,
            organization_max_days: 1826,
            max_polygon_area_km2: 5000.0,
        }
    }
}

// Keeps chrono's Duration constructors away from their overflow panic.
const MAX_DAYS: i64 = 3_650_000;

impl Limits {
    pub fn mapathon_span(&self) -> Duration {
        days(self.mapathon_max_days)
    }

    pub fn user_statistics_span(&self) -> Duration {
        days(self.user_statistics_max_days)
    }

    pub fn data_quality_hashtag_span(&self) -> Duration {
        Duration::hours(self.data_quality_hashtag_max_hours.clamp(0, MAX_DAYS * 24))
    }

    pub fn data_quality_username_span(&self) -> Duration {
        days(self.data_quality_username_max_days)
    }
}

fn days(n: i64) -> Duration {
    Duration::days(n.clamp(0, MAX_DAYS))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error(fields: &[&str], kind: ViolationKind) -> ValidationError {
        ValidationError {
            fields: fields.iter().map(|f| f.to_string()).collect(),
            kind,
            message: "bad".into(),
        }
    }

    #[test]
    fn test_error_display_names_fields() {
        let e = error(&["fromTimestamp", "toTimestamp"], ViolationKind::OutOfOrder);
        assert_eq!(e.to_string(), "fromTimestamp, toTimestamp: bad");
    }

    #[test]
    fn test_errors_lookup() {
        let mut errors = ValidationErrors::new();
        errors.push(error(&["hashtags"], ViolationKind::Duplicate));
        errors.push(error(&["geometry"], ViolationKind::AreaExceeded));

        assert_eq!(errors.len(), 2);
        assert!(errors.has("hashtags", ViolationKind::Duplicate));
        assert!(!errors.has("hashtags", ViolationKind::Empty));
        assert!(errors.for_field("geometry").is_some());
        assert_eq!(
            errors.to_string(),
            "2 invalid field(s); hashtags: bad; geometry: bad"
        );
    }

    #[test]
    fn test_default_limits() {
        let limits = Limits::default();
        assert_eq!(limits.mapathon_span(), Duration::days(31));
        assert_eq!(limits.data_quality_hashtag_span(), Duration::hours(24));
    }
}
