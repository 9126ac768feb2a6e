//! Question bank - loading, defaults and per-session selection
//!
//! Questions live in a JSON file (see [`record`] for the format). Anything
//! wrong with that file is logged and the built-in set is used instead, so a
//! session can always start:
//!
//! ```
//! use tui_quiz_bank::{load_or_default, pick_random, SimpleRng};
//!
//! let bank = load_or_default("/definitely/not/here.json");
//! assert!(bank.fallback);
//!
//! let mut rng = SimpleRng::new(7);
//! let session = pick_random(&mut rng, &bank.questions, 2);
//! assert_eq!(session.len(), 2);
//! ```

pub mod config;
pub mod defaults;
pub mod error;
pub mod loader;
pub mod record;
pub mod rng;

pub use tui_quiz_core as core;
pub use tui_quiz_types as types;

pub use config::BankConfig;
pub use defaults::default_questions;
pub use error::BankError;
pub use loader::{load_from_path, load_or_default, parse_questions, LoadedBank};
pub use record::{AnswerRecord, QuestionFile, QuestionRecord};
pub use rng::{pick_random, SimpleRng};

/// Load per `config` and pick this session's questions.
pub fn session_questions(config: &BankConfig, rng: &mut SimpleRng) -> LoadedBank {
    let loaded = load_or_default(&config.path);
    LoadedBank {
        questions: pick_random(rng, &loaded.questions, config.questions_per_session),
        fallback: loaded.fallback,
    }
}
