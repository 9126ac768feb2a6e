//! TUI Quiz (workspace facade crate).
//!
//! Re-exports the workspace crates under short names
//! (`tui_quiz::{core, bank, adapter, term, input, types}`) and hosts the
//! pieces the binary wires together.

pub use tui_quiz_adapter as adapter;
pub use tui_quiz_bank as bank;
pub use tui_quiz_core as core;
pub use tui_quiz_input as input;
pub use tui_quiz_term as term;
pub use tui_quiz_types as types;

pub mod app;
pub mod logging;

pub use app::App;
