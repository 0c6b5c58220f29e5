use serde_json::Value;
use tracing::{debug, error, info, info_span, warn};

use super::database::{Database, Row};
use super::error::{ExecutionError, ReportError, ReportResult};
use super::shape::{ColumnSpec, RecordSet, ReportBody, ReportOutcome};
use crate::compose::{compose, Backend, ComposeOptions, Template};
use crate::predicate::FragmentSet;
use crate::request::FilterRequest;
use crate::sql::Dialect;
use crate::validation::Limits;

/// Everything an orchestrator needs: the databases, validation limits and
/// the SQL dialect to render.
///
/// The tasking-manager database is optional. Sections that need it are
/// skipped when it is absent; reports that need nothing else fail with
/// [`ReportError::Unavailable`].
pub struct ReportContext<'a> {
    underpass: &'a dyn Database,
    tasking_manager: Option<&'a dyn Database>,
    limits: Limits,
    dialect: Dialect,
}

impl<'a> ReportContext<'a> {
    pub fn new(underpass: &'a dyn Database) -> Self {
        Self {
            underpass,
            tasking_manager: None,
            limits: Limits::default(),
            dialect: Dialect::default(),
        }
    }

    pub fn with_tasking_manager(mut self, database: &'a dyn Database) -> Self {
        self.tasking_manager = Some(database);
        self
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn has_tasking_manager(&self) -> bool {
        self.tasking_manager.is_some()
    }

    /// Validate `input`, build the body from the request, and wrap both into
    /// an outcome. Nothing runs against a database when validation fails.
    pub(crate) fn run<R, F>(&self, input: &Value, body: F) -> ReportResult<ReportOutcome>
    where
        R: FilterRequest,
        F: FnOnce(&R) -> ReportResult<ReportBody>,
    {
        let span = info_span!("report", family = %R::FAMILY);
        let _entered = span.enter();

        let request = R::from_input(input, &self.limits).map_err(|errors| {
            warn!(violations = errors.len(), "request rejected");
            ReportError::Validation(errors)
        })?;

        let body = body(&request)?;
        info!(body = body.kind(), "report ready");
        Ok(ReportOutcome {
            family: R::FAMILY,
            filters: request.applied_filters(),
            output: request.output_type(),
            body,
        })
    }

    /// Compose `template` and run it against the database it belongs to.
    pub(crate) fn fetch(
        &self,
        template: Template,
        fragments: &FragmentSet,
        include_geometry: bool,
    ) -> ReportResult<Vec<Row>> {
        let options = ComposeOptions::default()
            .with_dialect(self.dialect)
            .with_geometry(include_geometry);
        let composed = compose(template, fragments, &options).map_err(|e| {
            error!(%template, error = %e, "composition failed");
            e
        })?;

        let database = match composed.backend() {
            Backend::Underpass => self.underpass,
            Backend::TaskingManager => self
                .tasking_manager
                .ok_or(ReportError::Unavailable(template))?,
        };

        let fingerprint = composed.fingerprint();
        debug!(
            %template,
            %fingerprint,
            parameters = composed.parameters().len(),
            "executing"
        );

        let rows = database.fetch(&composed).map_err(|source| {
            error!(%template, %fingerprint, code = ?source.code, "query failed");
            ExecutionError {
                template,
                fingerprint: fingerprint.clone(),
                source,
            }
        })?;
        debug!(%template, rows = rows.len(), "fetched");
        Ok(rows)
    }

    /// [`fetch`](Self::fetch) shaped into flat records.
    pub(crate) fn records(
        &self,
        template: Template,
        fragments: &FragmentSet,
        specs: &[ColumnSpec],
    ) -> ReportResult<RecordSet> {
        let rows = self.fetch(template, fragments, false)?;
        Ok(RecordSet::shape(template, &rows, specs)?)
    }
}
