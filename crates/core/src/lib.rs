//! Core quiz logic - pure, deterministic, and testable
//!
//! This crate contains the answer matcher and the round lifecycle. It has
//! **no dependencies** on terminals, sockets, files or wall-clock time:
//!
//! - **Deterministic**: the engine only moves when a timed step is invoked
//! - **Testable**: a manually clocked [`TimerQueue`] drives whole sessions in
//!   microseconds
//! - **Portable**: the same session runs behind the terminal UI or the agent
//!   adapter
//!
//! # Module Structure
//!
//! - [`matcher`]: Arabic-aware normalization and guess/answer comparison
//! - [`round`]: the per-question state machine ([`RoundEngine`])
//! - [`scheduler`]: timer abstraction plus the deterministic [`TimerQueue`]
//! - [`session`]: [`QuizSession`], which owns the timers and notifies observers
//! - [`snapshot`]: render-ready read-only view of the engine
//! - [`error`]: error kinds and question validation
//!
//! # Round Rules
//!
//! - Each question starts with 7 attempts and its own time limit
//! - A matching guess reveals its slot and credits its points once
//! - A wrong guess costs one attempt; blank guesses and repeats cost nothing
//! - The round ends when time runs out, attempts run out, or every slot is
//!   revealed; a 3-2-1 countdown (700 ms steps) follows
//! - When the countdown runs out every slot is shown, unguessed slots score
//!   nothing, and after 900 ms the next question starts (or the session ends)
//!
//! # Example
//!
//! ```
//! use tui_quiz_core::{QuizSession, SubmitOutcome};
//! use tui_quiz_types::{Answer, Phase, Question};
//!
//! let question = Question::new(
//!     "شيء يستخدمه الإنسان للوصول إلى وجهته؟",
//!     30,
//!     vec![
//!         Answer::new("سيارة", 50).with_synonyms(["موتر"]),
//!         Answer::new("طيارة", 40).with_synonyms(["طائرة"]),
//!         Answer::new("دراجة", 30),
//!         Answer::new("قطار", 20),
//!     ],
//! );
//!
//! let mut session = QuizSession::new();
//! session.start(vec![question]).unwrap();
//!
//! assert_eq!(session.submit("موتر"), SubmitOutcome::Revealed { slot: 0, points: 50 });
//! assert_eq!(session.snapshot().score, 50);
//!
//! // 30 seconds later the round is over.
//! session.advance(30_000);
//! assert_eq!(session.snapshot().phase, Phase::Countdown(3));
//! ```

pub mod error;
pub mod matcher;
pub mod round;
pub mod scheduler;
pub mod session;
pub mod snapshot;

pub use tui_quiz_types as types;

pub use error::{validate_question, validate_questions, QuizError, ShapeError};
pub use matcher::{matches, normalize, AnswerKey};
pub use round::{RoundEngine, RoundState, SubmitOutcome};
pub use scheduler::{Scheduler, TimerHandle, TimerQueue};
pub use session::{ChannelSink, QuizSession, RenderSink, TimerEvent};
pub use snapshot::{RoundEvent, RoundSnapshot, SlotSnapshot};
