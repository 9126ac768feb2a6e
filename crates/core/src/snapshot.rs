//! Read-only round snapshots handed to renderers and the adapter.

use arrayvec::ArrayVec;

use crate::error::QuizError;
use crate::types::{EndReason, Phase, MAX_ANSWER_SLOTS};

/// Notable state change recorded by the engine (consumed by observers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoundEvent {
    QuestionStarted { index: usize },
    Revealed { slot: usize, points: u32 },
    Missed { attempts_left: u32 },
    RoundEnded { reason: EndReason },
    SessionFinished { score: u32 },
}

/// Render view of one answer slot.
///
/// Text and points are only present once the slot is revealed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SlotSnapshot {
    pub revealed: bool,
    /// Points were added to the score (false for slots shown by the forced reveal).
    pub credited: bool,
    pub text: Option<String>,
    pub points: Option<u32>,
}

impl SlotSnapshot {
    /// Points this slot contributed to the score.
    pub fn awarded(&self) -> u32 {
        if self.credited {
            self.points.unwrap_or(0)
        } else {
            0
        }
    }
}

/// Read-only view of the whole engine, produced after every mutation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct RoundSnapshot {
    pub phase: Phase,
    pub session_id: u32,
    pub round_id: u32,
    pub question_index: usize,
    pub total_questions: usize,
    pub prompt: String,
    pub attempts_left: u32,
    pub time_left_sec: u32,
    pub score: u32,
    pub slots: ArrayVec<SlotSnapshot, MAX_ANSWER_SLOTS>,
    pub last_event: Option<RoundEvent>,
    pub error: Option<QuizError>,
}

impl RoundSnapshot {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn countdown(&self) -> Option<u8> {
        self.phase.countdown()
    }

    pub fn accepting_guesses(&self) -> bool {
        self.phase.is_active() && !self.all_revealed()
    }

    pub fn finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn all_revealed(&self) -> bool {
        !self.slots.is_empty() && self.slots.iter().all(|s| s.revealed)
    }

    pub fn revealed(&self) -> impl Iterator<Item = bool> + '_ {
        self.slots.iter().map(|s| s.revealed)
    }
}
