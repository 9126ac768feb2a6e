//! Reading question files.

use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::core::validate_questions;
use crate::defaults::default_questions;
use crate::error::BankError;
use crate::record::QuestionFile;
use crate::types::Question;

/// Questions ready for a session, and whether they came from the built-in set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedBank {
    pub questions: Vec<Question>,
    pub fallback: bool,
}

/// Parse and validate the JSON text of a question file.
pub fn parse_questions(json: &str) -> Result<Vec<Question>, BankError> {
    let file: QuestionFile = serde_json::from_str(json)?;
    if file.questions.is_empty() {
        return Err(BankError::EmptyQuestionFile);
    }

    let questions = file
        .questions
        .into_iter()
        .enumerate()
        .map(|(i, rec)| rec.into_question(i))
        .collect::<Result<Vec<_>, _>>()?;

    validate_questions(&questions)?;
    Ok(questions)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<Vec<Question>, BankError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| BankError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_questions(&text)
}

/// Load `path`, falling back to the built-in questions on any failure.
pub fn load_or_default(path: impl AsRef<Path>) -> LoadedBank {
    let path = path.as_ref();
    match load_from_path(path) {
        Ok(questions) => {
            info!(path = %path.display(), count = questions.len(), "loaded question file");
            LoadedBank {
                questions,
                fallback: false,
            }
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "using built-in questions");
            LoadedBank {
                questions: default_questions(),
                fallback: true,
            }
        }
    }
}
