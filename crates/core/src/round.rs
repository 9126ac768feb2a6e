//! Round engine - drives questions through guessing, countdown and advance
//!
//! The engine is a pure state machine. It never reads a clock; the timed
//! steps (`tick`, `check_round_end`, `countdown_step`, `advance`) are invoked
//! by whoever owns the timers, normally [`crate::session::QuizSession`].
//!
//! ```text
//! AwaitingData --start_session--> Active --check_round_end--> Countdown(3)
//!   Countdown(3) -> Countdown(2) -> Countdown(1) --countdown_step--> Revealed
//!   Revealed --advance--> Active (next question) | Finished
//! ```

use arrayvec::ArrayVec;
use tracing::{debug, info, warn};

use crate::error::{validate_questions, QuizError};
use crate::matcher::{normalize, AnswerKey};
use crate::snapshot::{RoundEvent, RoundSnapshot, SlotSnapshot};
use crate::types::{
    EndReason, Phase, Question, ATTEMPTS_PER_QUESTION, COUNTDOWN_FROM, MAX_ANSWER_SLOTS,
};

/// Mutable state of the current question plus the session score.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundState {
    pub question_index: usize,
    /// Slot is visible. Monotonic within a question.
    pub revealed: ArrayVec<bool, MAX_ANSWER_SLOTS>,
    /// Slot's points were added to `score` (matched by a guess).
    pub credited: ArrayVec<bool, MAX_ANSWER_SLOTS>,
    pub attempts_left: u32,
    pub time_left_sec: u32,
    /// Session-scoped; survives question changes.
    pub score: u32,
    pub phase: Phase,
}

impl RoundState {
    pub fn all_revealed(&self) -> bool {
        !self.revealed.is_empty() && self.revealed.iter().all(|&r| r)
    }
}

/// Result of a single [`RoundEngine::submit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Not accepted: no live round, the round already met an end condition,
    /// or a blank guess.
    Ignored,
    /// The guess names a slot that is already showing. Costs nothing.
    AlreadyRevealed { slot: usize },
    Revealed { slot: usize, points: u32 },
    Missed { attempts_left: u32 },
}

/// Owns the question list and the single [`RoundState`].
#[derive(Debug, Clone)]
pub struct RoundEngine {
    questions: Vec<Question>,
    keys: Vec<AnswerKey>,
    state: RoundState,
    attempts_per_question: u32,
    /// Increments on every session start.
    session_id: u32,
    /// Increments on every question start; timers are tagged with it.
    round_id: u32,
    last_event: Option<RoundEvent>,
    error: Option<QuizError>,
}

impl Default for RoundEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RoundEngine {
    pub fn new() -> Self {
        Self::with_attempts(ATTEMPTS_PER_QUESTION)
    }

    pub fn with_attempts(attempts_per_question: u32) -> Self {
        Self {
            questions: Vec::new(),
            keys: Vec::new(),
            state: RoundState::default(),
            attempts_per_question,
            session_id: 0,
            round_id: 0,
            last_event: None,
            error: None,
        }
    }

    /// Start a new session on `questions`, beginning with the first one.
    ///
    /// Invalid input leaves the engine in [`Phase::AwaitingData`] with the
    /// error recorded on the snapshot.
    pub fn start_session(&mut self, questions: Vec<Question>) -> Result<(), QuizError> {
        if let Err(err) = validate_questions(&questions) {
            warn!(error = %err, "cannot start session");
            self.questions.clear();
            self.keys.clear();
            self.state = RoundState::default();
            self.last_event = None;
            self.error = Some(err.clone());
            return Err(err);
        }

        self.questions = questions;
        self.session_id = self.session_id.wrapping_add(1);
        self.state.score = 0;
        self.error = None;
        info!(
            session_id = self.session_id,
            questions = self.questions.len(),
            "session started"
        );
        self.begin_question(0);
        Ok(())
    }

    /// Play the current question list again from the top with a zero score.
    pub fn restart(&mut self) -> Result<(), QuizError> {
        let questions = std::mem::take(&mut self.questions);
        self.start_session(questions)
    }

    fn begin_question(&mut self, index: usize) {
        let question = &self.questions[index];
        let slots = question.slot_count();

        self.keys = question.answers.iter().map(AnswerKey::new).collect();
        self.round_id = self.round_id.wrapping_add(1);
        self.state.question_index = index;
        self.state.revealed = std::iter::repeat(false).take(slots).collect();
        self.state.credited = std::iter::repeat(false).take(slots).collect();
        self.state.attempts_left = self.attempts_per_question;
        self.state.time_left_sec = question.time_limit_sec;
        self.state.phase = Phase::Active;
        self.last_event = Some(RoundEvent::QuestionStarted { index });

        debug!(
            round_id = self.round_id,
            index,
            time_limit_sec = question.time_limit_sec,
            "question started"
        );
    }

    /// Evaluate a guess against the unrevealed slots, in slot order.
    ///
    /// A match reveals the slot and credits its points; anything else costs an
    /// attempt, except a guess for a slot that is already showing. The round
    /// end condition is not checked here, see [`Self::check_round_end`].
    pub fn submit(&mut self, guess: &str) -> SubmitOutcome {
        if !self.state.phase.is_active()
            || self.round_end_reason().is_some()
            || guess.trim().is_empty()
        {
            return SubmitOutcome::Ignored;
        }

        let normalized = normalize(guess);
        let mut repeat = None;
        for (slot, key) in self.keys.iter().enumerate() {
            if !key.accepts_normalized(&normalized) {
                continue;
            }
            if self.state.revealed[slot] {
                repeat.get_or_insert(slot);
                continue;
            }

            let points = self.questions[self.state.question_index].answers[slot].points;
            self.state.revealed[slot] = true;
            self.state.credited[slot] = true;
            self.state.score = self.state.score.saturating_add(points);
            self.last_event = Some(RoundEvent::Revealed { slot, points });
            debug!(slot, points, score = self.state.score, "slot revealed");
            return SubmitOutcome::Revealed { slot, points };
        }

        if let Some(slot) = repeat {
            return SubmitOutcome::AlreadyRevealed { slot };
        }

        self.state.attempts_left = self.state.attempts_left.saturating_sub(1);
        let attempts_left = self.state.attempts_left;
        self.last_event = Some(RoundEvent::Missed { attempts_left });
        debug!(attempts_left, "guess missed");
        SubmitOutcome::Missed { attempts_left }
    }

    /// One elapsed second of a live round. No-op in any other phase.
    pub fn tick(&mut self) -> bool {
        if !self.state.phase.is_active() || self.state.time_left_sec == 0 {
            return false;
        }
        self.state.time_left_sec -= 1;
        true
    }

    /// Which end condition currently holds for the live round, if any.
    pub fn round_end_reason(&self) -> Option<EndReason> {
        if !self.state.phase.is_active() {
            return None;
        }
        if self.state.all_revealed() {
            Some(EndReason::AllRevealed)
        } else if self.state.attempts_left == 0 {
            Some(EndReason::OutOfAttempts)
        } else if self.state.time_left_sec == 0 {
            Some(EndReason::TimeUp)
        } else {
            None
        }
    }

    /// Move Active → Countdown when an end condition holds.
    pub fn check_round_end(&mut self) -> Option<EndReason> {
        let reason = self.round_end_reason()?;
        self.state.phase = Phase::Countdown(COUNTDOWN_FROM);
        self.last_event = Some(RoundEvent::RoundEnded { reason });
        debug!(
            round_id = self.round_id,
            reason = reason.as_str(),
            "round ending"
        );
        Some(reason)
    }

    /// One countdown step. Returns true on the step that runs out.
    ///
    /// Running out shows every slot. Slots nobody guessed are displayed but
    /// their points are not credited.
    pub fn countdown_step(&mut self) -> bool {
        match self.state.phase {
            Phase::Countdown(n) if n > 1 => {
                self.state.phase = Phase::Countdown(n - 1);
                false
            }
            Phase::Countdown(_) => {
                self.state.revealed.iter_mut().for_each(|r| *r = true);
                self.state.phase = Phase::Revealed;
                true
            }
            _ => false,
        }
    }

    /// Leave the reveal pause: next question, or Finished after the last one.
    pub fn advance(&mut self) -> bool {
        if self.state.phase != Phase::Revealed {
            return false;
        }

        let next = self.state.question_index + 1;
        if next < self.questions.len() {
            self.begin_question(next);
        } else {
            self.state.phase = Phase::Finished;
            self.last_event = Some(RoundEvent::SessionFinished {
                score: self.state.score,
            });
            info!(
                session_id = self.session_id,
                score = self.state.score,
                "session finished"
            );
        }
        true
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn score(&self) -> u32 {
        self.state.score
    }

    pub fn attempts_left(&self) -> u32 {
        self.state.attempts_left
    }

    pub fn time_left_sec(&self) -> u32 {
        self.state.time_left_sec
    }

    pub fn question_index(&self) -> usize {
        self.state.question_index
    }

    pub fn revealed(&self) -> &[bool] {
        &self.state.revealed
    }

    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    pub fn current_question(&self) -> Option<&Question> {
        if self.state.phase == Phase::AwaitingData {
            return None;
        }
        self.questions.get(self.state.question_index)
    }

    pub fn session_id(&self) -> u32 {
        self.session_id
    }

    pub fn round_id(&self) -> u32 {
        self.round_id
    }

    pub fn last_event(&self) -> Option<RoundEvent> {
        self.last_event
    }

    pub fn error(&self) -> Option<&QuizError> {
        self.error.as_ref()
    }

    pub fn snapshot_into(&self, out: &mut RoundSnapshot) {
        out.phase = self.state.phase;
        out.session_id = self.session_id;
        out.round_id = self.round_id;
        out.question_index = self.state.question_index;
        out.total_questions = self.questions.len();
        out.attempts_left = self.state.attempts_left;
        out.time_left_sec = self.state.time_left_sec;
        out.score = self.state.score;
        out.last_event = self.last_event;
        out.error = self.error.clone();

        out.prompt.clear();
        out.slots.clear();
        if let Some(question) = self.current_question() {
            out.prompt.push_str(&question.prompt);
            for (slot, answer) in question.answers.iter().enumerate() {
                let revealed = self.state.revealed[slot];
                out.slots.push(SlotSnapshot {
                    revealed,
                    credited: self.state.credited[slot],
                    text: revealed.then(|| answer.text.clone()),
                    points: revealed.then_some(answer.points),
                });
            }
        }
    }

    pub fn snapshot(&self) -> RoundSnapshot {
        let mut s = RoundSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }
}
