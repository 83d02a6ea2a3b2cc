//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use study_core::model::{ItemId, ItemRepositoryError, ItemValidationError};
use study_core::quiz::ModeError;

/// Failure to obtain a dataset, from the store or its seed document.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    #[error("seed request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("seed document is not a list of items: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("cannot read seed document: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid seed location: {0}")]
    Location(#[from] url::ParseError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by the study modes and the app controller.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StudyError {
    #[error("{0}")]
    Validation(#[from] ItemValidationError),
    #[error(transparent)]
    InsufficientData(#[from] ModeError),
    #[error("unknown item {0}")]
    UnknownItem(ItemId),
    #[error("no item is being edited")]
    NotEditing,
    #[error("no delete is waiting for confirmation")]
    NoPendingDelete,
    #[error("question {0} does not exist")]
    UnknownQuestion(usize),
    #[error("option {option} does not exist for question {question}")]
    UnknownOption { question: usize, option: usize },
    #[error("cannot {action} while {state}")]
    InvalidState {
        action: &'static str,
        state: &'static str,
    },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<ItemRepositoryError> for StudyError {
    fn from(err: ItemRepositoryError) -> Self {
        match err {
            ItemRepositoryError::UnknownItem(id) => StudyError::UnknownItem(id),
            ItemRepositoryError::Validation(err) => StudyError::Validation(err),
            // non_exhaustive upstream
            _ => StudyError::InvalidState {
                action: "change the repository",
                state: "in an unexpected state",
            },
        }
    }
}
