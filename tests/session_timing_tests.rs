use std::cell::RefCell;
use std::rc::Rc;

use tui_quiz::core::{QuizSession, RoundSnapshot, SubmitOutcome};
use tui_quiz::types::{
    Answer, Phase, Question, ADVANCE_DELAY_MS, ATTEMPTS_PER_QUESTION, COUNTDOWN_STEP_MS,
};

fn question(prompt: &str, time_limit_sec: u32) -> Question {
    Question::new(
        prompt,
        time_limit_sec,
        vec![
            Answer::new("سيارة", 50).with_synonyms(["موتر"]),
            Answer::new("قطار", 20),
        ],
    )
}

fn burn_attempts(session: &mut QuizSession) {
    for _ in 0..ATTEMPTS_PER_QUESTION {
        session.submit("فيل");
    }
}

#[test]
fn clock_ticks_once_per_second() {
    let mut session = QuizSession::new();
    session.start(vec![question("a", 30)]).unwrap();

    session.advance(999);
    assert_eq!(session.snapshot().time_left_sec, 30);
    session.advance(1);
    assert_eq!(session.snapshot().time_left_sec, 29);
    session.advance(5_000);
    assert_eq!(session.snapshot().time_left_sec, 24);
    assert_eq!(session.now_ms(), 6_000);
}

#[test]
fn round_end_is_checked_right_after_a_submit() {
    let mut session = QuizSession::new();
    session.start(vec![question("a", 30)]).unwrap();
    burn_attempts(&mut session);
    assert_eq!(session.snapshot().phase, Phase::Active);

    session.flush();
    assert_eq!(session.snapshot().phase, Phase::Countdown(3));
    assert_eq!(session.now_ms(), 0);
}

#[test]
fn countdown_steps_every_700ms_then_pauses_900ms() {
    let mut session = QuizSession::new();
    session
        .start(vec![question("a", 30), question("b", 15)])
        .unwrap();
    burn_attempts(&mut session);
    session.flush();

    session.advance(COUNTDOWN_STEP_MS - 1);
    assert_eq!(session.snapshot().phase, Phase::Countdown(3));
    session.advance(1);
    assert_eq!(session.snapshot().phase, Phase::Countdown(2));
    session.advance(COUNTDOWN_STEP_MS);
    assert_eq!(session.snapshot().phase, Phase::Countdown(1));
    session.advance(COUNTDOWN_STEP_MS);
    assert_eq!(session.snapshot().phase, Phase::Revealed);
    assert!(session.snapshot().all_revealed());
    assert_eq!(session.snapshot().score, 0);

    session.advance(ADVANCE_DELAY_MS - 1);
    assert_eq!(session.snapshot().phase, Phase::Revealed);
    session.advance(1);
    assert_eq!(session.snapshot().phase, Phase::Active);
    assert_eq!(session.snapshot().question_index, 1);
    assert_eq!(session.snapshot().prompt, "b");
    assert_eq!(session.snapshot().time_left_sec, 15);
}

#[test]
fn clock_stops_during_countdown() {
    let mut session = QuizSession::new();
    session.start(vec![question("a", 30)]).unwrap();
    session.advance(2_000);
    burn_attempts(&mut session);
    session.flush();
    assert_eq!(session.snapshot().time_left_sec, 28);

    session.advance(COUNTDOWN_STEP_MS * 2);
    assert_eq!(session.snapshot().time_left_sec, 28);
}

#[test]
fn time_up_runs_to_game_over() {
    let mut session = QuizSession::new();
    session.start(vec![question("a", 3)]).unwrap();
    assert_eq!(session.submit("موتر"), SubmitOutcome::Revealed { slot: 0, points: 50 });

    session.advance(3_000);
    assert_eq!(session.snapshot().phase, Phase::Countdown(3));
    session.advance(COUNTDOWN_STEP_MS * 3 + ADVANCE_DELAY_MS);
    assert_eq!(session.snapshot().phase, Phase::Finished);
    assert_eq!(session.snapshot().score, 50);
    assert_eq!(session.scheduler().pending(), 0);

    session.advance(60_000);
    assert_eq!(session.snapshot().phase, Phase::Finished);
}

#[test]
fn one_long_advance_plays_whole_session() {
    let mut session = QuizSession::new();
    session
        .start(vec![question("a", 2), question("b", 2)])
        .unwrap();
    session.advance(60_000);
    assert_eq!(session.snapshot().phase, Phase::Finished);
    assert_eq!(session.snapshot().question_index, 1);
}

#[test]
fn restart_mid_countdown_drops_old_timers() {
    let mut session = QuizSession::new();
    session
        .start(vec![question("a", 30), question("b", 30)])
        .unwrap();
    session.submit("موتر");
    burn_attempts(&mut session);
    session.flush();
    session.advance(COUNTDOWN_STEP_MS);
    assert_eq!(session.snapshot().phase, Phase::Countdown(2));

    session.restart().unwrap();
    assert_eq!(session.snapshot().phase, Phase::Active);
    assert_eq!(session.snapshot().score, 0);
    assert_eq!(session.scheduler().pending(), 1);

    session.advance(COUNTDOWN_STEP_MS * 3 + ADVANCE_DELAY_MS);
    assert_eq!(session.snapshot().phase, Phase::Active);
    assert_eq!(session.snapshot().question_index, 0);
    assert_eq!(session.snapshot().time_left_sec, 27);
}

#[test]
fn observers_see_countdown_numbers_in_order() {
    let countdowns = Rc::new(RefCell::new(Vec::new()));
    let mut session = QuizSession::new();
    {
        let countdowns = Rc::clone(&countdowns);
        session.subscribe(move |snap: &RoundSnapshot| {
            if let Some(n) = snap.countdown() {
                countdowns.borrow_mut().push(n);
            }
        });
    }
    session.start(vec![question("a", 1)]).unwrap();
    session.advance(10_000);

    assert_eq!(*countdowns.borrow(), vec![3, 2, 1]);
}

#[test]
fn bad_question_set_never_schedules() {
    let mut session = QuizSession::new();
    let bad = Question::new("a", 0, vec![Answer::new("x", 1)]);
    assert!(session.start(vec![bad]).is_err());
    assert_eq!(session.snapshot().phase, Phase::AwaitingData);
    assert_eq!(session.scheduler().pending(), 0);

    session.start(vec![question("a", 5)]).unwrap();
    assert_eq!(session.snapshot().phase, Phase::Active);
    assert!(session.snapshot().error.is_none());
}

#[test]
fn correct_guess_during_countdown_earns_nothing() {
    let mut session = QuizSession::new();
    session
        .start(vec![question("a", 30), question("b", 30)])
        .unwrap();
    burn_attempts(&mut session);
    session.flush();
    assert_eq!(session.snapshot().phase, Phase::Countdown(3));

    assert_eq!(session.submit("قطار"), SubmitOutcome::Ignored);
    session.flush();
    let snap = session.snapshot();
    assert_eq!(snap.score, 0);
    assert_eq!(snap.phase, Phase::Countdown(3));
    assert!(snap.slots.iter().all(|s| s.text.is_none()));

    session.advance(3 * COUNTDOWN_STEP_MS);
    assert_eq!(session.snapshot().phase, Phase::Revealed);
    assert_eq!(session.submit("سيارة"), SubmitOutcome::Ignored);
    assert_eq!(session.snapshot().score, 0);
}
