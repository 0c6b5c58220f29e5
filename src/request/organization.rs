use serde_json::{Map, Value};

use super::{read_hashtags, read_output_type, AppliedFilters, FilterRequest, ReportFamily};
use crate::validation::{
    parse, parse_date, AliasTable, DateBounds, Fields, Frequency, HashtagFilter, Limits,
    OutputType, ValidationErrors,
};

/// Pre-aggregated hashtag statistics per period.
#[derive(Debug, Clone, PartialEq)]
pub struct OrganizationHashtagRequest {
    pub hashtags: HashtagFilter,
    pub frequency: Frequency,
    pub dates: DateBounds,
    pub output_type: OutputType,
}

impl FilterRequest for OrganizationHashtagRequest {
    const FAMILY: ReportFamily = ReportFamily::OrganizationHashtags;
    const ALIASES: &'static AliasTable = &AliasTable::new(&[
        ("hashtags", "hashtags"),
        ("match_mode", "matchMode"),
        ("frequency", "frequency"),
        ("start_date", "startDate"),
        ("end_date", "endDate"),
        ("output_type", "outputType"),
    ]);

    fn from_input(input: &Value, limits: &Limits) -> Result<Self, ValidationErrors> {
        let mut fields = Fields::read(input, Self::ALIASES);

        let hashtags = read_hashtags(&mut fields, true);
        let frequency = fields.required("frequency", |v| parse::string(v)?.parse::<Frequency>());

        let start = fields.optional("start_date", parse_date);
        let end = fields.optional("end_date", parse_date);
        // The minimum span depends on the frequency; skip the range check until it is known.
        // An open end reads every stored period on that side, so neither cap applies.
        let dates = frequency.and_then(|frequency| {
            fields.check(
                &["start_date", "end_date"],
                DateBounds::new(
                    start,
                    end,
                    Some(limits.organization_max_days),
                    Some(frequency.min_days()),
                ),
            )
        });
        let output_type = read_output_type(&mut fields, Self::FAMILY);

        let built = (|| {
            Some(OrganizationHashtagRequest {
                hashtags: hashtags?,
                frequency: frequency?,
                dates: dates?,
                output_type,
            })
        })();
        fields.finish(built)
    }

    fn applied_filters(&self) -> Map<String, Value> {
        let mut applied = AppliedFilters::new(Self::ALIASES);
        applied
            .hashtags(Some(&self.hashtags))
            .set("frequency", self.frequency)
            .set_opt("start_date", self.dates.from())
            .set_opt("end_date", self.dates.to())
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
    use crate::validation::ViolationKind;
    use serde_json::json;

    fn read(input: Value) -> Result<OrganizationHashtagRequest, ValidationErrors> {
        OrganizationHashtagRequest::from_input(&input, &Limits::default())
    }

    #[test]
    fn test_valid_request() {
        let request = read(json!({
            "hashtags": ["hotosm-project-1", "#MissingMaps"],
            "frequency": "m",
            "startDate": "2022-01-01",
            "endDate": "2022-12-31",
            "outputType": "csv"
        }))
        .unwrap();
        assert_eq!(request.frequency, Frequency::Monthly);
        assert_eq!(request.hashtags.tags(), &["hotosm-project-1", "missingmaps"]);
        assert_eq!(request.output_type, OutputType::Csv);
    }

    #[test]
    fn test_span_shorter_than_frequency() {
        let errors = read(json!({
            "hashtags": ["hotosm"],
            "frequency": "q",
            "startDate": "2022-01-01",
            "endDate": "2022-02-01"
        }))
        .unwrap_err();
        assert!(errors.has("startDate", ViolationKind::SpanTooShort));
    }

    #[test]
    fn test_span_over_cap() {
        let errors = read(json!({
            "hashtags": ["hotosm"],
            "frequency": "y",
            "startDate": "2010-01-01",
            "endDate": "2022-01-01"
        }))
        .unwrap_err();
        let error = errors.for_field("endDate").unwrap();
        assert_eq!(error.kind, ViolationKind::SpanExceeded);
        assert_eq!(error.fields, vec!["startDate", "endDate"]);
    }

    #[test]
    fn test_open_end_skips_span_checks() {
        let request = read(json!({
            "hashtags": ["hotosm"],
            "frequency": "w",
            "startDate": "2000-01-01"
        }))
        .unwrap();
        assert_eq!(request.dates.to(), None);
    }

    #[test]
    fn test_hashtags_and_frequency_required() {
        let errors = read(json!({"hashtags": []})).unwrap_err();
        assert!(errors.has("hashtags", ViolationKind::Empty));
        assert!(errors.has("frequency", ViolationKind::Missing));
        assert_eq!(errors.len(), 2);
    }
}
