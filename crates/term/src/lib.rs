//! Terminal quiz renderer.
//!
//! A small rendering layer for the quiz screen. It avoids widget/layout
//! libraries and renders into a simple framebuffer that is diffed and
//! flushed to the terminal.
//!
//! - [`GameView`] is pure: snapshot + guess buffer in, framebuffer out
//! - [`TerminalRenderer`] owns the terminal and writes only changed runs
//! - [`RenderThrottle`] gates redraws on a view fingerprint

pub mod fb;
pub mod game_view;
pub mod renderer;
pub mod throttle;

pub use tui_quiz_core as core;
pub use tui_quiz_types as types;

pub use fb::{text_width, Cell, CellStyle, FrameBuffer, Rgb};
pub use game_view::{AdapterStatusView, AnchorY, GameView, Viewport};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
pub use throttle::RenderThrottle;
