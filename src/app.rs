//! Glue between player input, agent commands and the quiz session.
//!
//! Owns the [`QuizSession`] and the guess [`LineEditor`]. The binary feeds it
//! key actions, adapter commands and elapsed time; everything here is
//! synchronous and clock-free so it can be driven from tests.

use std::cell::Cell;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::adapter::ClientCommand;
use crate::core::{QuizError, QuizSession, RoundSnapshot, SubmitOutcome};
use crate::input::{EditOutcome, LineEditor};
use crate::types::{Question, QuizAction};

pub struct App {
    session: QuizSession,
    editor: LineEditor,
    changed: Rc<Cell<bool>>,
}

impl App {
    /// Start a session on `questions`.
    ///
    /// A rejected list leaves the app in the awaiting-data state with the
    /// error on the snapshot.
    pub fn new(questions: Vec<Question>) -> Self {
        let changed = Rc::new(Cell::new(false));
        let mut session = QuizSession::new();
        {
            let changed = Rc::clone(&changed);
            session.subscribe(move |_: &RoundSnapshot| changed.set(true));
        }
        if let Err(e) = session.start(questions) {
            warn!(error = %e, "session did not start");
        }
        Self {
            session,
            editor: LineEditor::new(),
            changed,
        }
    }

    pub fn snapshot(&self) -> &RoundSnapshot {
        self.session.snapshot()
    }

    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    /// Current guess buffer.
    pub fn input(&self) -> &str {
        self.editor.text()
    }

    /// True once per batch of state changes.
    pub fn take_changed(&mut self) -> bool {
        self.changed.replace(false)
    }

    /// Apply a key action. Returns the outcome when a guess was submitted.
    ///
    /// Outside the active phase only restart does anything.
    pub fn handle_action(&mut self, action: QuizAction) -> Option<SubmitOutcome> {
        if action == QuizAction::Restart {
            self.restart();
            return None;
        }
        if !self.session.snapshot().accepting_guesses() {
            return None;
        }

        match self.editor.apply(action) {
            EditOutcome::Edited | EditOutcome::Passthrough(_) => None,
            EditOutcome::Submitted(guess) => {
                let outcome = self.session.submit(&guess);
                debug!(?outcome, "player guess");
                self.session.flush();
                Some(outcome)
            }
        }
    }

    /// Apply an agent command. Guesses report their outcome.
    pub fn handle_command(&mut self, command: &ClientCommand) -> Result<Option<SubmitOutcome>, QuizError> {
        match command {
            ClientCommand::Guess(guess) => {
                let outcome = self.session.submit(guess);
                debug!(?outcome, "agent guess");
                self.session.flush();
                Ok(Some(outcome))
            }
            ClientCommand::Restart => {
                self.editor.clear();
                self.session.restart().map(|()| None)
            }
        }
    }

    /// Let `elapsed_ms` of wall-clock time pass.
    pub fn advance(&mut self, elapsed_ms: u32) {
        let was_accepting = self.session.snapshot().accepting_guesses();
        self.session.advance(elapsed_ms);
        if was_accepting && !self.session.snapshot().accepting_guesses() {
            self.editor.clear();
        }
    }

    fn restart(&mut self) {
        self.editor.clear();
        if let Err(e) = self.session.restart() {
            warn!(error = %e, "restart refused");
        }
    }
}
