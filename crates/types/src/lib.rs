//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the application.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (round engine, terminal rendering, agent protocol).
//!
//! # Round Timing Constants
//!
//! Timing values are in milliseconds:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `SECOND_MS` | 1000 | Ticker cadence while a round is live |
//! | `COUNTDOWN_STEP_MS` | 700 | Cadence of the 3-2-1 countdown |
//! | `ADVANCE_DELAY_MS` | 900 | Pause after the full reveal before moving on |
//! | `POLL_MS` | 50 | Terminal input poll timeout in the main loop |
//!
//! # Examples
//!
//! ```
//! use tui_quiz_types::{Answer, Phase, Question, ATTEMPTS_PER_QUESTION};
//!
//! let question = Question::new(
//!     "Something people ride to get somewhere?",
//!     30,
//!     vec![
//!         Answer::new("car", 50).with_synonyms(["auto"]),
//!         Answer::new("plane", 40),
//!         Answer::new("bike", 30),
//!         Answer::new("train", 20),
//!     ],
//! );
//! assert_eq!(question.slot_count(), 4);
//! assert_eq!(question.total_points(), 140);
//!
//! assert_eq!(Phase::Countdown(2).as_str(), "countdown");
//! assert!(Phase::Countdown(2).is_round_ending());
//! assert_eq!(ATTEMPTS_PER_QUESTION, 7);
//! ```

/// Wrong guesses allowed per question before the round ends.
pub const ATTEMPTS_PER_QUESTION: u32 = 7;

/// Ticker cadence while a round is Active.
pub const SECOND_MS: u32 = 1000;

/// First number shown when a round ends.
pub const COUNTDOWN_FROM: u8 = 3;

/// Interval between countdown steps.
pub const COUNTDOWN_STEP_MS: u32 = 700;

/// Pause between the forced full reveal and the next question.
pub const ADVANCE_DELAY_MS: u32 = 900;

/// Main loop input poll timeout.
pub const POLL_MS: u32 = 50;

/// Upper bound on answer slots per question.
pub const MAX_ANSWER_SLOTS: usize = 8;

/// Conventional slot count (a 2x2 board).
pub const DEFAULT_SLOT_COUNT: usize = 4;

/// How many questions a session plays when the caller does not say.
pub const DEFAULT_QUESTIONS_PER_SESSION: usize = 2;

/// One acceptable answer to a question.
///
/// `synonyms` are alternate phrasings; their order carries no meaning.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Answer {
    pub text: String,
    pub points: u32,
    pub synonyms: Vec<String>,
}

impl Answer {
    pub fn new(text: impl Into<String>, points: u32) -> Self {
        Self {
            text: text.into(),
            points,
            synonyms: Vec::new(),
        }
    }

    pub fn with_synonyms<I, S>(mut self, synonyms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.synonyms = synonyms.into_iter().map(Into::into).collect();
        self
    }
}

/// A prompt with its point-weighted answer key.
///
/// The order of `answers` is the slot order. Data files list answers by
/// descending points so slot 1 is the top answer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Question {
    pub prompt: String,
    pub time_limit_sec: u32,
    pub answers: Vec<Answer>,
}

impl Question {
    pub fn new(prompt: impl Into<String>, time_limit_sec: u32, answers: Vec<Answer>) -> Self {
        Self {
            prompt: prompt.into(),
            time_limit_sec,
            answers,
        }
    }

    pub fn slot_count(&self) -> usize {
        self.answers.len()
    }

    pub fn total_points(&self) -> u32 {
        self.answers.iter().map(|a| a.points).sum()
    }
}

/// Lifecycle phase of the round engine.
///
/// `Countdown` and `Revealed` together form the "round ending" stretch
/// between the end condition firing and the next question starting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    /// No valid question set has been supplied yet.
    #[default]
    AwaitingData,
    Active,
    /// Counting down; holds the number currently shown (3, 2, 1).
    Countdown(u8),
    /// Every slot is visible; waiting out the pause before advancing.
    Revealed,
    Finished,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::AwaitingData => "awaiting_data",
            Phase::Active => "active",
            Phase::Countdown(_) => "countdown",
            Phase::Revealed => "revealed",
            Phase::Finished => "finished",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Phase::Active)
    }

    pub fn is_round_ending(&self) -> bool {
        matches!(self, Phase::Countdown(_) | Phase::Revealed)
    }

    pub fn countdown(&self) -> Option<u8> {
        match self {
            Phase::Countdown(n) => Some(*n),
            _ => None,
        }
    }
}

/// Why a round stopped accepting guesses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndReason {
    AllRevealed,
    OutOfAttempts,
    TimeUp,
}

impl EndReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndReason::AllRevealed => "all_revealed",
            EndReason::OutOfAttempts => "out_of_attempts",
            EndReason::TimeUp => "time_up",
        }
    }
}

/// Player intents produced by the input layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizAction {
    Insert(char),
    Backspace,
    ClearInput,
    Submit,
    Restart,
}

impl QuizAction {
    /// Whether the action edits the guess buffer (as opposed to driving the session).
    pub fn is_edit(&self) -> bool {
        matches!(
            self,
            QuizAction::Insert(_) | QuizAction::Backspace | QuizAction::ClearInput
        )
    }
}
