use super::database::DatabaseError;
use super::shape::ShapeError;
use crate::compose::{ComposerError, Template};
use crate::output::OutputError;
use crate::validation::ValidationErrors;

/// A statement the database rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{template} [{fingerprint}] failed: {source}")]
pub struct ExecutionError {
    pub template: Template,
    /// Statement fingerprint; parameter values are never recorded.
    pub fingerprint: String,
    pub source: DatabaseError,
}

/// Any failure of a report call. No partial result accompanies it.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Composer(#[from] ComposerError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error(transparent)]
    Shape(#[from] ShapeError),

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error("{0} needs the tasking-manager database, which is not configured")]
    Unavailable(Template),
}

pub type ReportResult<T> = Result<T, ReportError>;

impl ReportError {
    /// HTTP status for the transport layer.
    pub fn status_code(&self) -> u16 {
        match self {
            ReportError::Validation(_) => 422,
            ReportError::Unavailable(_) => 503,
            ReportError::Composer(_)
            | ReportError::Execution(_)
            | ReportError::Shape(_)
            | ReportError::Output(_) => 500,
        }
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }

    /// Message safe to show the caller. Internal failures stay opaque.
    pub fn public_message(&self) -> String {
        match self {
            ReportError::Validation(errors) => errors.to_string(),
            ReportError::Unavailable(_) => "report source unavailable".to_string(),
            _ => "internal error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let validation = ReportError::Validation(ValidationErrors::new());
        assert_eq!(validation.status_code(), 422);
        assert!(validation.is_client_error());

        let execution = ReportError::Execution(ExecutionError {
            template: Template::UserIds,
            fingerprint: "abc".into(),
            source: DatabaseError::new("password authentication failed for user galaxy"),
        });
        assert_eq!(execution.status_code(), 500);
        assert_eq!(execution.public_message(), "internal error");
        assert!(execution.to_string().contains("user_ids [abc]"));
    }
}
