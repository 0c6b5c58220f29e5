use std::collections::HashSet;

use chrono::{Datelike, Utc};
use serde_json::{Map, Value};

use super::{read_output_type, AppliedFilters, FilterRequest, ReportFamily};
use crate::validation::{
    parse, AliasTable, Fields, Limits, OutputType, Status, ValidationErrors, Violation,
    ViolationKind,
};

/// First year with tasking-manager projects.
pub const FIRST_YEAR: i32 = 2005;
const DEFAULT_YEAR: i32 = 2012;

fn parse_year(value: &Value) -> Result<i32, Violation> {
    let year = parse::integer(value)?;
    let current = Utc::now().year();
    if year < FIRST_YEAR as i64 || year > current as i64 {
        return Err(Violation::new(
            ViolationKind::InvalidValue,
            format!("year must be between {} and {}, got {}", FIRST_YEAR, current, year),
        ));
    }
    Ok(year as i32)
}

fn organisation_names(value: &Value) -> Result<Vec<String>, Violation> {
    let raw = parse::string_list(value)?;
    if raw.is_empty() {
        return Err(Violation::new(
            ViolationKind::Empty,
            "at least one organisation is required",
        ));
    }
    let mut seen = HashSet::new();
    let mut names = Vec::with_capacity(raw.len());
    for name in raw {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(Violation::new(
                ViolationKind::Empty,
                "organisation names must not be blank",
            ));
        }
        if !seen.insert(name.clone()) {
            return Err(Violation::new(
                ViolationKind::Duplicate,
                format!("organisation '{}' appears more than once", name),
            ));
        }
        names.push(name);
    }
    Ok(names)
}

/// Validation work per validator over projects created in one year.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatorStatsRequest {
    pub year: i32,
    pub country: Option<String>,
    pub organisations: Option<Vec<String>>,
    pub status: Option<Status>,
    pub output_type: OutputType,
}

impl FilterRequest for ValidatorStatsRequest {
    const FAMILY: ReportFamily = ReportFamily::ValidatorStats;
    const ALIASES: &'static AliasTable = &AliasTable::new(&[
        ("year", "year"),
        ("country", "country"),
        ("organisation", "organisation"),
        ("status", "status"),
        ("output_type", "outputType"),
    ]);

    fn from_input(input: &Value, _limits: &Limits) -> Result<Self, ValidationErrors> {
        let mut fields = Fields::read(input, Self::ALIASES);

        let year = fields.optional("year", parse_year);
        let country = fields.optional("country", parse::text);
        let organisations = fields.optional("organisation", organisation_names);
        let status = fields.optional("status", |v| parse::string(v)?.parse::<Status>());
        let output_type = read_output_type(&mut fields, Self::FAMILY);

        fields.finish(Some(ValidatorStatsRequest {
            year: year.unwrap_or(DEFAULT_YEAR),
            country,
            organisations,
            status,
            output_type,
        }))
    }

    fn applied_filters(&self) -> Map<String, Value> {
        let mut applied = AppliedFilters::new(Self::ALIASES);
        applied
            .set("year", self.year)
            .set_opt("country", self.country.as_ref())
            .set_opt("organisation", self.organisations.as_ref())
            .set_opt("status", self.status)
            .set("output_type", self.output_type);
        applied.into_map()
    }

    fn output_type(&self) -> OutputType {
        self.output_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn read(input: Value) -> Result<ValidatorStatsRequest, ValidationErrors> {
        ValidatorStatsRequest::from_input(&input, &Limits::default())
    }

    #[test]
    fn test_defaults() {
        let request = read(json!({})).unwrap();
        assert_eq!(request.year, 2012);
        assert_eq!(request.country, None);
        assert_eq!(request.output_type, OutputType::Csv);
    }

    #[test]
    fn test_filters() {
        let request = read(json!({
            "year": 2021,
            "country": " Nepal ",
            "organisation": ["HOT", "Kathmandu Living Labs"],
            "status": "PUBLISHED",
            "outputType": "json"
        }))
        .unwrap();
        assert_eq!(request.country.as_deref(), Some("Nepal"));
        assert_eq!(request.status, Some(Status::Published));
        assert_eq!(request.organisations.unwrap().len(), 2);
    }

    #[test]
    fn test_year_bounds() {
        let errors = read(json!({"year": 2004})).unwrap_err();
        assert!(errors.has("year", ViolationKind::InvalidValue));
        let next_year = Utc::now().year() + 1;
        let errors = read(json!({ "year": next_year })).unwrap_err();
        assert!(errors.has("year", ViolationKind::InvalidValue));
    }

    #[test]
    fn test_blank_country_and_duplicate_organisation() {
        let errors = read(json!({
            "country": "  ",
            "organisation": ["HOT", "HOT"],
            "status": "deleted"
        }))
        .unwrap_err();
        assert!(errors.has("country", ViolationKind::Empty));
        assert!(errors.has("organisation", ViolationKind::Duplicate));
        assert!(errors.has("status", ViolationKind::InvalidValue));
    }
}
