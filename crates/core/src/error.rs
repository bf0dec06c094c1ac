use thiserror::Error;

use crate::assessment::AssessmentError;
use crate::model::{CatalogError, ModuleError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Module(#[from] ModuleError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Assessment(#[from] AssessmentError),
}
