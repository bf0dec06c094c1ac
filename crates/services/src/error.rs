//! Shared error types for the services crate.

use thiserror::Error;

use learn_core::assessment::AssessmentError;
use learn_core::model::{CatalogError, QuestionId};
use storage::sqlite::SqliteInitError;

/// Errors emitted by a theory session.
///
/// Navigation never fails; only assessment actions report errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("not in assessment mode")]
    NotInAssessment,
    #[error("unknown question {0}")]
    UnknownQuestion(QuestionId),
    #[error("question {question} has no option {option}")]
    InvalidOption { question: QuestionId, option: usize },
    #[error(transparent)]
    Assessment(#[from] AssessmentError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("could not read catalog {path}: {source}")]
    CatalogIo {
        path: String,
        source: std::io::Error,
    },
    #[error("module {0:?} is not in the catalog")]
    UnknownModule(String),
    #[error(transparent)]
    Assessment(#[from] AssessmentError),
}
