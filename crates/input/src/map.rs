//! Key mapping from terminal events to quiz actions.

use crate::types::QuizAction;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Map keyboard input to quiz actions.
///
/// Printable characters (including Arabic and spaces) go to the guess buffer.
/// Release events and control chords other than Ctrl+R are ignored.
pub fn handle_key_event(key: KeyEvent) -> Option<QuizAction> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('r') | KeyCode::Char('R') if ctrl => Some(QuizAction::Restart),
        KeyCode::Char(_) if ctrl || key.modifiers.contains(KeyModifiers::ALT) => None,
        KeyCode::Char(c) if !c.is_control() => Some(QuizAction::Insert(c)),

        KeyCode::Backspace => Some(QuizAction::Backspace),
        KeyCode::Esc => Some(QuizAction::ClearInput),
        KeyCode::Enter => Some(QuizAction::Submit),

        _ => None,
    }
}

/// Check if key should quit the quiz.
///
/// Plain `q` is a valid guess character, so quitting needs Ctrl.
pub fn should_quit(key: KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(
            key.code,
            KeyCode::Char('c') | KeyCode::Char('C') | KeyCode::Char('q') | KeyCode::Char('Q')
        )
}
