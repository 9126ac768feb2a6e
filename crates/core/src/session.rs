//! Session driver - wires a [`RoundEngine`] to a [`Scheduler`]
//!
//! The driver owns every timer the engine needs and is the only place that
//! installs or cancels them:
//!
//! | phase | timer |
//! |-------|-------|
//! | Active | `Second` every 1000 ms |
//! | after a submit or tick | `CheckRoundEnd` once, 0 ms |
//! | Countdown | `CountdownStep` every 700 ms |
//! | Revealed | `Advance` once, 900 ms |
//!
//! Starting or restarting cancels all of them before new state is installed,
//! and every event carries the round id it was scheduled for, so a timer left
//! over from an earlier round is dropped instead of applied.
//!
//! After each state change the driver refreshes its snapshot and hands it to
//! every subscribed [`RenderSink`].

use std::sync::mpsc::Sender;

use tracing::{debug, trace};

use crate::error::QuizError;
use crate::round::{RoundEngine, SubmitOutcome};
use crate::scheduler::{Scheduler, TimerHandle, TimerQueue};
use crate::snapshot::RoundSnapshot;
use crate::types::{Phase, Question, ADVANCE_DELAY_MS, COUNTDOWN_STEP_MS, SECOND_MS};

/// Timed steps of the round lifecycle, tagged with their round id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerEvent {
    Second { round: u32 },
    CheckRoundEnd { round: u32 },
    CountdownStep { round: u32 },
    Advance { round: u32 },
}

impl TimerEvent {
    pub fn round(&self) -> u32 {
        match *self {
            TimerEvent::Second { round }
            | TimerEvent::CheckRoundEnd { round }
            | TimerEvent::CountdownStep { round }
            | TimerEvent::Advance { round } => round,
        }
    }
}

/// Receives a snapshot after every state change.
pub trait RenderSink {
    fn render(&mut self, snapshot: &RoundSnapshot);
}

impl<F> RenderSink for F
where
    F: FnMut(&RoundSnapshot),
{
    fn render(&mut self, snapshot: &RoundSnapshot) {
        self(snapshot)
    }
}

/// Forwards snapshots into a channel. A disconnected receiver is ignored.
#[derive(Debug, Clone)]
pub struct ChannelSink(pub Sender<RoundSnapshot>);

impl RenderSink for ChannelSink {
    fn render(&mut self, snapshot: &RoundSnapshot) {
        let _ = self.0.send(snapshot.clone());
    }
}

/// A quiz session: engine, timers and observers.
pub struct QuizSession<S = TimerQueue<TimerEvent>> {
    engine: RoundEngine,
    scheduler: S,
    ticker: Option<TimerHandle>,
    countdown: Option<TimerHandle>,
    pending_check: Option<TimerHandle>,
    pending_advance: Option<TimerHandle>,
    sinks: Vec<Box<dyn RenderSink>>,
    snapshot: RoundSnapshot,
}

impl QuizSession<TimerQueue<TimerEvent>> {
    pub fn new() -> Self {
        Self::with_parts(RoundEngine::new(), TimerQueue::new())
    }
}

impl Default for QuizSession<TimerQueue<TimerEvent>> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Scheduler<TimerEvent>> QuizSession<S> {
    pub fn with_parts(engine: RoundEngine, scheduler: S) -> Self {
        let snapshot = engine.snapshot();
        Self {
            engine,
            scheduler,
            ticker: None,
            countdown: None,
            pending_check: None,
            pending_advance: None,
            sinks: Vec::new(),
            snapshot,
        }
    }

    pub fn subscribe(&mut self, sink: impl RenderSink + 'static) {
        self.sinks.push(Box::new(sink));
    }

    pub fn engine(&self) -> &RoundEngine {
        &self.engine
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> &RoundSnapshot {
        &self.snapshot
    }

    pub fn now_ms(&self) -> u64 {
        self.scheduler.now_ms()
    }

    /// Start a session on `questions`.
    ///
    /// On error the session sits in [`Phase::AwaitingData`] and the error is
    /// published on the snapshot; supplying a valid list later recovers.
    pub fn start(&mut self, questions: Vec<Question>) -> Result<(), QuizError> {
        self.cancel_timers();
        let result = self.engine.start_session(questions);
        if result.is_ok() {
            self.start_ticker();
        }
        self.notify();
        result
    }

    /// Start the same question list over with a zero score.
    pub fn restart(&mut self) -> Result<(), QuizError> {
        self.cancel_timers();
        let result = self.engine.restart();
        if result.is_ok() {
            self.start_ticker();
        }
        self.notify();
        result
    }

    /// Apply a guess. The end-of-round check runs on the next drain.
    pub fn submit(&mut self, guess: &str) -> SubmitOutcome {
        let outcome = self.engine.submit(guess);
        if outcome != SubmitOutcome::Ignored {
            self.request_check();
            self.notify();
        }
        outcome
    }

    /// Let `elapsed_ms` pass, firing every due timer in order.
    pub fn advance(&mut self, elapsed_ms: u32) {
        let target = self.scheduler.now_ms() + elapsed_ms as u64;
        while let Some(event) = self.scheduler.pop_due(target) {
            self.dispatch(event);
        }
        self.scheduler.advance_to(target);
    }

    /// Fire whatever is already due (pending zero-delay checks) without
    /// letting time pass.
    pub fn flush(&mut self) {
        self.advance(0);
    }

    fn dispatch(&mut self, event: TimerEvent) {
        let round = self.engine.round_id();
        if event.round() != round {
            debug!(?event, current = round, "dropping stale timer event");
            return;
        }
        trace!(?event, now_ms = self.scheduler.now_ms(), "timer fired");

        match event {
            TimerEvent::Second { .. } => {
                if self.engine.tick() {
                    self.request_check();
                    self.notify();
                }
            }
            TimerEvent::CheckRoundEnd { .. } => {
                self.pending_check = None;
                if self.engine.check_round_end().is_some() {
                    self.cancel(TimerSlot::Ticker);
                    self.countdown = Some(
                        self.scheduler
                            .schedule_every(COUNTDOWN_STEP_MS, TimerEvent::CountdownStep { round }),
                    );
                    self.notify();
                }
            }
            TimerEvent::CountdownStep { .. } => {
                if self.engine.countdown_step() {
                    self.cancel(TimerSlot::Countdown);
                    self.pending_advance = Some(
                        self.scheduler
                            .schedule_once(ADVANCE_DELAY_MS, TimerEvent::Advance { round }),
                    );
                }
                self.notify();
            }
            TimerEvent::Advance { .. } => {
                self.pending_advance = None;
                if self.engine.advance() {
                    if self.engine.phase() == Phase::Active {
                        self.start_ticker();
                    }
                    self.notify();
                }
            }
        }
    }

    fn start_ticker(&mut self) {
        let round = self.engine.round_id();
        self.ticker = Some(
            self.scheduler
                .schedule_every(SECOND_MS, TimerEvent::Second { round }),
        );
    }

    fn request_check(&mut self) {
        if self.pending_check.is_some() {
            return;
        }
        let round = self.engine.round_id();
        self.pending_check = Some(
            self.scheduler
                .schedule_once(0, TimerEvent::CheckRoundEnd { round }),
        );
    }

    fn cancel(&mut self, slot: TimerSlot) {
        let handle = match slot {
            TimerSlot::Ticker => self.ticker.take(),
            TimerSlot::Countdown => self.countdown.take(),
            TimerSlot::Check => self.pending_check.take(),
            TimerSlot::Advance => self.pending_advance.take(),
        };
        if let Some(handle) = handle {
            self.scheduler.cancel(handle);
        }
    }

    fn cancel_timers(&mut self) {
        for slot in [
            TimerSlot::Ticker,
            TimerSlot::Countdown,
            TimerSlot::Check,
            TimerSlot::Advance,
        ] {
            self.cancel(slot);
        }
    }

    fn notify(&mut self) {
        self.engine.snapshot_into(&mut self.snapshot);
        for sink in self.sinks.iter_mut() {
            sink.render(&self.snapshot);
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum TimerSlot {
    Ticker,
    Countdown,
    Check,
    Advance,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Answer, EndReason};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn one_answer(time: u32) -> Question {
        Question::new("p", time, vec![Answer::new("a", 10), Answer::new("b", 5)])
    }

    #[test]
    fn only_one_timer_per_purpose() {
        let mut s = QuizSession::new();
        s.start(vec![one_answer(30)]).unwrap();
        assert_eq!(s.scheduler().pending(), 1);
        s.submit("x");
        s.submit("y");
        assert_eq!(s.scheduler().pending(), 2);
        s.flush();
        assert_eq!(s.scheduler().pending(), 1);
    }

    #[test]
    fn restart_cancels_previous_timers() {
        let mut s = QuizSession::new();
        s.start(vec![one_answer(30), one_answer(30)]).unwrap();
        s.submit("a");
        s.submit("b");
        s.flush();
        assert_eq!(s.snapshot().phase, Phase::Countdown(3));

        s.restart().unwrap();
        assert_eq!(s.scheduler().pending(), 1);
        s.advance(3000);
        assert_eq!(s.snapshot().phase, Phase::Active);
        assert_eq!(s.snapshot().question_index, 0);
        assert_eq!(s.snapshot().time_left_sec, 27);
    }

    #[test]
    fn sinks_see_every_change() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut s = QuizSession::new();
        {
            let seen = Rc::clone(&seen);
            s.subscribe(move |snap: &RoundSnapshot| seen.borrow_mut().push(snap.phase));
        }
        s.start(vec![one_answer(1)]).unwrap();
        s.advance(1000);
        s.advance(700 * 3 + 900);

        let phases = seen.borrow();
        assert_eq!(phases.first(), Some(&Phase::Active));
        assert!(phases.contains(&Phase::Countdown(3)));
        assert!(phases.contains(&Phase::Countdown(1)));
        assert!(phases.contains(&Phase::Revealed));
        assert_eq!(phases.last(), Some(&Phase::Finished));
    }

    #[test]
    fn channel_sink_forwards_snapshots() {
        let (tx, rx) = std::sync::mpsc::channel();
        let mut s = QuizSession::new();
        s.subscribe(ChannelSink(tx));
        s.start(vec![one_answer(5)]).unwrap();
        s.submit("a");
        let got: Vec<RoundSnapshot> = rx.try_iter().collect();
        assert_eq!(got.len(), 2);
        assert_eq!(got[1].score, 10);
    }

    #[test]
    fn time_up_reported_as_end_reason() {
        let mut s = QuizSession::new();
        s.start(vec![one_answer(2)]).unwrap();
        s.advance(2000);
        assert_eq!(s.snapshot().phase, Phase::Countdown(3));
        assert_eq!(
            s.snapshot().last_event,
            Some(crate::snapshot::RoundEvent::RoundEnded {
                reason: EndReason::TimeUp
            })
        );
    }

    #[test]
    fn failed_start_publishes_error() {
        let mut s = QuizSession::new();
        assert_eq!(s.start(vec![]), Err(QuizError::EmptyQuestionSet));
        assert_eq!(s.snapshot().phase, Phase::AwaitingData);
        assert_eq!(s.snapshot().error, Some(QuizError::EmptyQuestionSet));
        assert_eq!(s.scheduler().pending(), 0);
        s.advance(10_000);
        assert_eq!(s.snapshot().phase, Phase::AwaitingData);
    }
}
