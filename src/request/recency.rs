use serde::Serialize;
use serde_json::{Map, Value};

use super::{read_output_type, AppliedFilters, FilterRequest, ReportFamily};
use crate::validation::{
    parse, AliasTable, Fields, Limits, OutputType, ValidationErrors, Violation, ViolationKind,
};

/// Table whose freshness is reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dataset {
    #[default]
    Changesets,
    Validation,
}

impl std::str::FromStr for Dataset {
    type Err = Violation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "changesets" => Ok(Dataset::Changesets),
            "validation" => Ok(Dataset::Validation),
            _ => Err(Violation::new(
                ViolationKind::InvalidValue,
                format!("unknown dataset '{}', expected one of: changesets, validation", s),
            )),
        }
    }
}

/// Time since the newest row of a dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct RecencyRequest {
    pub dataset: Dataset,
    pub output_type: OutputType,
}

impl FilterRequest for RecencyRequest {
    const FAMILY: ReportFamily = ReportFamily::DataRecency;
    const ALIASES: &'static AliasTable =
        &AliasTable::new(&[("dataset", "dataset"), ("output_type", "outputType")]);

    fn from_input(input: &Value, _limits: &Limits) -> Result<Self, ValidationErrors> {
        let mut fields = Fields::read(input, Self::ALIASES);
        let dataset = fields
            .optional("dataset", |v| parse::string(v)?.parse::<Dataset>())
            .unwrap_or_default();
        let output_type = read_output_type(&mut fields, Self::FAMILY);
        fields.finish(Some(RecencyRequest {
            dataset,
            output_type,
        }))
    }

    fn applied_filters(&self) -> Map<String, Value> {
        let mut applied = AppliedFilters::new(Self::ALIASES);
        applied
            .set("dataset", self.dataset)
            .set("output_type", self.output_type);
        applied.into_map()
    }

    fn output_type(&self) -> OutputType {
        self.output_type
    }
}
