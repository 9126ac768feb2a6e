//! Question file records.
//!
//! The on-disk shape mirrors what quiz authors already write:
//!
//! ```json
//! {"questions": [
//!   {"prompt": "...", "timeLimitSec": 30,
//!    "answers": [{"text": "...", "points": 50, "synonyms": ["..."]}]}
//! ]}
//! ```
//!
//! Required fields are `Option` here so a missing one is reported by name
//! instead of as a generic serde error.

use serde::Deserialize;

use crate::error::BankError;
use crate::types::{Answer, Question};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct QuestionFile {
    #[serde(default)]
    pub questions: Vec<QuestionRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct QuestionRecord {
    pub prompt: Option<String>,
    #[serde(rename = "timeLimitSec")]
    pub time_limit_sec: Option<u32>,
    pub answers: Option<Vec<AnswerRecord>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AnswerRecord {
    pub text: Option<String>,
    pub points: Option<u32>,
    #[serde(default)]
    pub synonyms: Vec<String>,
}

impl QuestionRecord {
    pub fn into_question(self, index: usize) -> Result<Question, BankError> {
        let missing = |field| BankError::InvalidRecord { index, field };

        let prompt = self.prompt.ok_or_else(|| missing("prompt"))?;
        let time_limit_sec = self.time_limit_sec.ok_or_else(|| missing("timeLimitSec"))?;
        let answers = self
            .answers
            .ok_or_else(|| missing("answers"))?
            .into_iter()
            .map(|a| {
                let text = a.text.ok_or_else(|| missing("answers[].text"))?;
                let points = a.points.ok_or_else(|| missing("answers[].points"))?;
                Ok(Answer::new(text, points).with_synonyms(a.synonyms))
            })
            .collect::<Result<Vec<_>, BankError>>()?;

        Ok(Question::new(prompt, time_limit_sec, answers))
    }
}
