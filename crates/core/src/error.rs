//! Error kinds and question-set validation.

use thiserror::Error;

use crate::types::{Question, MAX_ANSWER_SLOTS};

/// Reasons a session cannot start.
#[derive(Debug, Clone, Error, PartialEq, Eq, Hash)]
pub enum QuizError {
    #[error("no questions available")]
    EmptyQuestionSet,
    #[error("question {index} is malformed: {reason}")]
    InvalidQuestionShape { index: usize, reason: ShapeError },
}

/// What is wrong with a single question.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq, Hash)]
pub enum ShapeError {
    #[error("prompt is empty")]
    EmptyPrompt,
    #[error("time limit must be at least one second")]
    ZeroTimeLimit,
    #[error("question has no answers")]
    NoAnswers,
    #[error("question has {count} answers, at most {max} are supported")]
    TooManyAnswers { count: usize, max: usize },
    #[error("answer {slot} has empty text")]
    EmptyAnswerText { slot: usize },
}

/// Check one question.
pub fn validate_question(index: usize, question: &Question) -> Result<(), QuizError> {
    let fail = |reason| Err(QuizError::InvalidQuestionShape { index, reason });

    if question.prompt.trim().is_empty() {
        return fail(ShapeError::EmptyPrompt);
    }
    if question.time_limit_sec == 0 {
        return fail(ShapeError::ZeroTimeLimit);
    }
    if question.answers.is_empty() {
        return fail(ShapeError::NoAnswers);
    }
    if question.answers.len() > MAX_ANSWER_SLOTS {
        return fail(ShapeError::TooManyAnswers {
            count: question.answers.len(),
            max: MAX_ANSWER_SLOTS,
        });
    }
    if let Some(slot) = question.answers.iter().position(|a| a.text.trim().is_empty()) {
        return fail(ShapeError::EmptyAnswerText { slot });
    }
    Ok(())
}

/// Check a whole question list; the first problem wins.
pub fn validate_questions(questions: &[Question]) -> Result<(), QuizError> {
    if questions.is_empty() {
        return Err(QuizError::EmptyQuestionSet);
    }
    questions
        .iter()
        .enumerate()
        .try_for_each(|(i, q)| validate_question(i, q))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Answer;

    fn good() -> Question {
        Question::new("p", 30, vec![Answer::new("a", 10), Answer::new("b", 5)])
    }

    #[test]
    fn accepts_well_formed_questions() {
        assert_eq!(validate_questions(&[good(), good()]), Ok(()));
    }

    #[test]
    fn rejects_empty_set() {
        assert_eq!(validate_questions(&[]), Err(QuizError::EmptyQuestionSet));
    }

    #[test]
    fn reports_first_bad_question() {
        let mut bad = good();
        bad.time_limit_sec = 0;
        let err = validate_questions(&[good(), bad]).unwrap_err();
        assert_eq!(
            err,
            QuizError::InvalidQuestionShape {
                index: 1,
                reason: ShapeError::ZeroTimeLimit
            }
        );
        assert_eq!(
            err.to_string(),
            "question 1 is malformed: time limit must be at least one second"
        );
    }

    #[test]
    fn rejects_shape_problems() {
        let mut q = good();
        q.prompt = "  ".into();
        assert!(matches!(
            validate_question(0, &q),
            Err(QuizError::InvalidQuestionShape { reason: ShapeError::EmptyPrompt, .. })
        ));

        let mut q = good();
        q.answers.clear();
        assert!(matches!(
            validate_question(0, &q),
            Err(QuizError::InvalidQuestionShape { reason: ShapeError::NoAnswers, .. })
        ));

        let mut q = good();
        q.answers = (0..=MAX_ANSWER_SLOTS).map(|i| Answer::new(i.to_string(), 1)).collect();
        assert!(matches!(
            validate_question(0, &q),
            Err(QuizError::InvalidQuestionShape { reason: ShapeError::TooManyAnswers { .. }, .. })
        ));

        let mut q = good();
        q.answers[1].text = String::new();
        assert!(matches!(
            validate_question(0, &q),
            Err(QuizError::InvalidQuestionShape {
                reason: ShapeError::EmptyAnswerText { slot: 1 },
                ..
            })
        ));
    }
}
