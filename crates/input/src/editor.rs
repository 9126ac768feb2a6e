//! Guess buffer editing.
//!
//! The editor only knows about text. Whether a submit reaches the session is
//! decided by the caller; the buffer is cleared after every submit either way.

use crate::types::QuizAction;

/// Longest guess the editor will hold, in characters.
pub const MAX_GUESS_CHARS: usize = 64;

/// What the caller should do after an action was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// Buffer changed (or was already in the requested state).
    Edited,
    /// Enter pressed; carries the buffer contents before clearing.
    Submitted(String),
    /// Session-level action the editor does not handle.
    Passthrough(QuizAction),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineEditor {
    buffer: String,
}

impl LineEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn char_count(&self) -> usize {
        self.buffer.chars().count()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    pub fn apply(&mut self, action: QuizAction) -> EditOutcome {
        match action {
            QuizAction::Insert(c) => {
                if self.char_count() < MAX_GUESS_CHARS {
                    self.buffer.push(c);
                }
                EditOutcome::Edited
            }
            QuizAction::Backspace => {
                self.buffer.pop();
                EditOutcome::Edited
            }
            QuizAction::ClearInput => {
                self.buffer.clear();
                EditOutcome::Edited
            }
            QuizAction::Submit => EditOutcome::Submitted(std::mem::take(&mut self.buffer)),
            QuizAction::Restart => EditOutcome::Passthrough(action),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_str(ed: &mut LineEditor, s: &str) {
        for c in s.chars() {
            ed.apply(QuizAction::Insert(c));
        }
    }

    #[test]
    fn typing_and_backspace_work_per_char() {
        let mut ed = LineEditor::new();
        type_str(&mut ed, "سيارة");
        assert_eq!(ed.char_count(), 5);
        ed.apply(QuizAction::Backspace);
        assert_eq!(ed.text(), "سيار");
    }

    #[test]
    fn submit_takes_buffer() {
        let mut ed = LineEditor::new();
        type_str(&mut ed, "قطار");
        assert_eq!(
            ed.apply(QuizAction::Submit),
            EditOutcome::Submitted("قطار".to_string())
        );
        assert!(ed.is_empty());
        assert_eq!(ed.apply(QuizAction::Submit), EditOutcome::Submitted(String::new()));
    }

    #[test]
    fn clear_and_restart() {
        let mut ed = LineEditor::new();
        type_str(&mut ed, "abc");
        ed.apply(QuizAction::ClearInput);
        assert!(ed.is_empty());
        assert_eq!(
            ed.apply(QuizAction::Restart),
            EditOutcome::Passthrough(QuizAction::Restart)
        );
    }

    #[test]
    fn buffer_is_capped() {
        let mut ed = LineEditor::new();
        type_str(&mut ed, &"ب".repeat(MAX_GUESS_CHARS + 10));
        assert_eq!(ed.char_count(), MAX_GUESS_CHARS);
    }
}
