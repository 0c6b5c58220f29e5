use serde_json::Value;

use super::context::ReportContext;
use super::error::ReportResult;
use super::shape::{scalar, ReportBody, ReportOutcome};
use crate::compose::Template;
use crate::predicate::FragmentSet;
use crate::request::{Dataset, RecencyRequest};

/// Time elapsed since the newest row of the chosen dataset.
pub fn last_updated(ctx: &ReportContext, input: &Value) -> ReportResult<ReportOutcome> {
    ctx.run(input, |request: &RecencyRequest| {
        let template = match request.dataset {
            Dataset::Changesets => Template::ChangesetRecency,
            Dataset::Validation => Template::ValidationRecency,
        };
        let rows = ctx.fetch(template, &FragmentSet::new(), false)?;
        Ok(ReportBody::Value(scalar(template, &rows, "last_updated")?))
    })
}
