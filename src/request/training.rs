use serde_json::{Map, Value};

use super::{read_output_type, AppliedFilters, FilterRequest, ReportFamily};
use crate::validation::{
    parse, parse_date, AliasTable, DateBounds, EventType, Fields, Limits, OutputType, TopicTypes,
    ValidationErrors,
};

/// Organisations that ran trainings. Takes no filter besides the output.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingOrganisationsRequest {
    pub output_type: OutputType,
}

impl FilterRequest for TrainingOrganisationsRequest {
    const FAMILY: ReportFamily = ReportFamily::TrainingOrganisations;
    const ALIASES: &'static AliasTable = &AliasTable::new(&[("output_type", "outputType")]);

    fn from_input(input: &Value, _limits: &Limits) -> Result<Self, ValidationErrors> {
        let mut fields = Fields::read(input, Self::ALIASES);
        let output_type = read_output_type(&mut fields, Self::FAMILY);
        fields.finish(Some(TrainingOrganisationsRequest { output_type }))
    }

    fn applied_filters(&self) -> Map<String, Value> {
        let mut applied = AppliedFilters::new(Self::ALIASES);
        applied.set("output_type", self.output_type);
        applied.into_map()
    }

    fn output_type(&self) -> OutputType {
        self.output_type
    }
}

/// Training events, every filter optional.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingRequest {
    pub dates: DateBounds,
    pub oid: Option<i64>,
    pub topic_types: Option<TopicTypes>,
    pub event_type: Option<EventType>,
    pub output_type: OutputType,
}

impl FilterRequest for TrainingRequest {
    const FAMILY: ReportFamily = ReportFamily::TrainingList;
    const ALIASES: &'static AliasTable = &AliasTable::new(&[
        ("from_datestamp", "fromDatestamp"),
        ("to_datestamp", "toDatestamp"),
        ("oid", "oid"),
        ("topic_type", "topicType"),
        ("event_type", "eventType"),
        ("output_type", "outputType"),
    ]);

    fn from_input(input: &Value, limits: &Limits) -> Result<Self, ValidationErrors> {
        let mut fields = Fields::read(input, Self::ALIASES);

        let from = fields.optional("from_datestamp", parse_date);
        let to = fields.optional("to_datestamp", parse_date);
        let dates = fields.check(
            &["from_datestamp", "to_datestamp"],
            DateBounds::new(from, to, Some(limits.training_max_days), None),
        );

        let oid = fields.optional("oid", parse::positive_integer);
        let topic_types = fields
            .optional("topic_type", parse::string_list)
            .and_then(|raw| fields.check(&["topic_type"], TopicTypes::new(&raw)));
        let event_type = fields.optional("event_type", |v| parse::string(v)?.parse::<EventType>());
        let output_type = read_output_type(&mut fields, Self::FAMILY);

        let built = dates.map(|dates| TrainingRequest {
            dates,
            oid,
            topic_types,
            event_type,
            output_type,
        });
        fields.finish(built)
    }

    fn applied_filters(&self) -> Map<String, Value> {
        let mut applied = AppliedFilters::new(Self::ALIASES);
        applied
            .set_opt("from_datestamp", self.dates.from())
            .set_opt("to_datestamp", self.dates.to())
            .set_opt("oid", self.oid)
            .set_opt("topic_type", self.topic_types.as_ref())
            .set_opt("event_type", self.event_type)
            .set("output_type", self.output_type);
        applied.into_map()
    }

    fn output_type(&self) -> OutputType {
        self.output_type
    }
}
