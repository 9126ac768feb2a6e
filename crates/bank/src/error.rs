use std::path::PathBuf;

use thiserror::Error;

use crate::core::QuizError;

/// Why a question file could not be used.
#[derive(Debug, Error)]
pub enum BankError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("question file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("question file has no questions")]
    EmptyQuestionFile,
    #[error("question record {index} is missing `{field}`")]
    InvalidRecord { index: usize, field: &'static str },
    #[error(transparent)]
    Invalid(#[from] QuizError),
}
