//! Terminal input module (session-facing).
//!
//! This module is independent of any UI framework. It maps `crossterm` key
//! events into [`crate::types::QuizAction`] and provides the guess line
//! editor used by the terminal front end.

pub mod editor;
pub mod map;

pub use tui_quiz_types as types;

pub use editor::{EditOutcome, LineEditor, MAX_GUESS_CHARS};
pub use map::{handle_key_event, should_quit};
