//! Closed vocabularies on report filters.

use serde::Serialize;

use super::{Violation, ViolationKind};

fn unknown(what: &str, got: &str, expected: &[&str]) -> Violation {
    Violation::new(
        ViolationKind::InvalidValue,
        format!("unknown {} '{}', expected one of: {}", what, got, expected.join(", ")),
    )
}

/// Serialization requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputType {
    Json,
    Csv,
    Geojson,
}

impl OutputType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputType::Json => "json",
            OutputType::Csv => "csv",
            OutputType::Geojson => "geojson",
        }
    }
}

impl std::fmt::Display for OutputType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OutputType {
    type Err = Violation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(OutputType::Json),
            "csv" => Ok(OutputType::Csv),
            "geojson" => Ok(OutputType::Geojson),
            _ => Err(unknown("output type", s, &["json", "csv", "geojson"])),
        }
    }
}

/// Aggregation period of organisation hashtag statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Frequency {
    #[serde(rename = "w")]
    Weekly,
    #[serde(rename = "m")]
    Monthly,
    #[serde(rename = "q")]
    Quarterly,
    #[serde(rename = "y")]
    Yearly,
}

impl Frequency {
    /// Stored `hashtag_stats.type` code.
    pub fn code(&self) -> &'static str {
        match self {
            Frequency::Weekly => "w",
            Frequency::Monthly => "m",
            Frequency::Quarterly => "q",
            Frequency::Yearly => "y",
        }
    }

    /// Shortest date range that holds one full period.
    pub fn min_days(&self) -> i64 {
        match self {
            Frequency::Weekly => 7,
            Frequency::Monthly => 30,
            Frequency::Quarterly => 90,
            Frequency::Yearly => 365,
        }
    }

    /// Hour of day at which stored periods start and end. Weekly rows are cut at noon.
    pub fn boundary_hour(&self) -> u32 {
        match self {
            Frequency::Weekly => 12,
            _ => 0,
        }
    }
}

impl std::str::FromStr for Frequency {
    type Err = Violation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "w" => Ok(Frequency::Weekly),
            "m" => Ok(Frequency::Monthly),
            "q" => Ok(Frequency::Quarterly),
            "y" => Ok(Frequency::Yearly),
            _ => Err(unknown("frequency", s, &["w", "m", "q", "y"])),
        }
    }
}

/// Training event format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Virtual,
    InPerson,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Virtual => "virtual",
            EventType::InPerson => "inperson",
        }
    }
}

impl std::str::FromStr for EventType {
    type Err = Violation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "virtual" => Ok(EventType::Virtual),
            "inperson" => Ok(EventType::InPerson),
            _ => Err(unknown("event type", s, &["virtual", "inperson"])),
        }
    }
}

/// Training topic category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TopicType {
    Remote,
    Field,
    Other,
}

impl TopicType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TopicType::Remote => "remote",
            TopicType::Field => "field",
            TopicType::Other => "other",
        }
    }
}

impl std::str::FromStr for TopicType {
    type Err = Violation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "remote" => Ok(TopicType::Remote),
            "field" => Ok(TopicType::Field),
            "other" => Ok(TopicType::Other),
            _ => Err(unknown("topic type", s, &["remote", "field", "other"])),
        }
    }
}

/// Dataset a mapathon report reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    #[default]
    Underpass,
    /// Legacy statistics export. Has no hashtag data.
    Insight,
}

impl Source {
    pub fn supports_hashtags(&self) -> bool {
        matches!(self, Source::Underpass)
    }
}

impl std::str::FromStr for Source {
    type Err = Violation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "underpass" => Ok(Source::Underpass),
            "insight" => Ok(Source::Insight),
            _ => Err(unknown("source", s, &["underpass", "insight"])),
        }
    }
}

/// Tasking-manager project status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Archived,
    Published,
    Draft,
}

impl Status {
    /// Integer stored in `projects.status`.
    pub fn code(&self) -> i64 {
        match self {
            Status::Archived => 0,
            Status::Published => 1,
            Status::Draft => 2,
        }
    }
}

impl std::str::FromStr for Status {
    type Err = Violation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "archived" => Ok(Status::Archived),
            "published" => Ok(Status::Published),
            "draft" => Ok(Status::Draft),
            _ => Err(unknown("status", s, &["archived", "published", "draft"])),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency() {
        let weekly: Frequency = "w".parse().unwrap();
        assert_eq!(weekly.min_days(), 7);
        assert_eq!(weekly.boundary_hour(), 12);
        assert_eq!("y".parse::<Frequency>().unwrap().boundary_hour(), 0);
        assert!("d".parse::<Frequency>().is_err());
    }

    #[test]
    fn test_output_type_case_insensitive() {
        assert_eq!("GeoJSON".parse::<OutputType>().unwrap(), OutputType::Geojson);
        let err = "xml".parse::<OutputType>().unwrap_err();
        assert!(err.message.contains("json, csv, geojson"));
    }

    #[test]
    fn test_source() {
        assert!(!"insight".parse::<Source>().unwrap().supports_hashtags());
        assert_eq!(Source::default(), Source::Underpass);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!("draft".parse::<Status>().unwrap().code(), 2);
    }
}
