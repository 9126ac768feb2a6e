use std::env;
use std::path::PathBuf;

use crate::types::DEFAULT_QUESTIONS_PER_SESSION;

/// Where questions come from and how many a session plays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankConfig {
    pub path: PathBuf,
    pub questions_per_session: usize,
    /// Fixed selection seed; `None` seeds from the clock.
    pub seed: Option<u32>,
}

impl Default for BankConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("questions.json"),
            questions_per_session: DEFAULT_QUESTIONS_PER_SESSION,
            seed: None,
        }
    }
}

impl BankConfig {
    /// Read `QUIZ_QUESTIONS_PATH`, `QUIZ_QUESTIONS_PER_SESSION` and `QUIZ_SEED`.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let path = env::var("QUIZ_QUESTIONS_PATH")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.path);

        let questions_per_session = env::var("QUIZ_QUESTIONS_PER_SESSION")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .filter(|n| *n > 0)
            .unwrap_or(defaults.questions_per_session);

        let seed = env::var("QUIZ_SEED")
            .ok()
            .and_then(|s| s.trim().parse().ok());

        Self {
            path,
            questions_per_session,
            seed,
        }
    }
}
