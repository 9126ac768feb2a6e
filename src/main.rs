//! Terminal quiz runner (default binary).
//!
//! Uses crossterm for input and the framebuffer renderer from `tui_quiz::term`.
//! When enabled, the TCP adapter runs alongside so an external agent can
//! play or watch.

use std::hash::{Hash, Hasher};
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event};
use tracing::{info, warn};

use tui_quiz::adapter::{Adapter, ErrorCode, InboundPayload};
use tui_quiz::bank::{session_questions, BankConfig, SimpleRng};
use tui_quiz::input::{handle_key_event, should_quit};
use tui_quiz::logging::init_logging;
use tui_quiz::term::{AdapterStatusView, FrameBuffer, GameView, RenderThrottle, TerminalRenderer, Viewport};
use tui_quiz::types::POLL_MS;
use tui_quiz::App;

/// Redraw at least this often even when nothing changed.
const REFRESH_MS: u64 = 1000;

fn main() -> Result<()> {
    init_logging()?;

    let config = BankConfig::from_env();
    let mut rng = SimpleRng::from_seed(config.seed);
    let bank = session_questions(&config, &mut rng);
    info!(
        questions = bank.questions.len(),
        fallback = bank.fallback,
        seed = rng.state(),
        "session prepared"
    );

    let adapter = match Adapter::start_from_env() {
        Ok(adapter) => adapter,
        Err(e) => {
            warn!(error = %e, "adapter unavailable, continuing without it");
            None
        }
    };

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, App::new(bank.questions), adapter);

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

fn run(term: &mut TerminalRenderer, mut app: App, mut adapter: Option<Adapter>) -> Result<()> {
    let view = GameView::default();
    let mut fb = FrameBuffer::new(0, 0);
    let mut throttle = RenderThrottle::new(REFRESH_MS);
    let started = Instant::now();
    let mut last_tick = Instant::now();

    if let Some(adapter) = adapter.as_mut() {
        adapter.broadcast(app.snapshot());
    }

    loop {
        // Agent commands.
        if let Some(adapter) = adapter.as_mut() {
            while let Some(cmd) = adapter.try_recv() {
                match cmd.payload {
                    InboundPayload::SnapshotRequest => adapter.observe_to(cmd.client_id, app.snapshot()),
                    InboundPayload::Command(command) => match app.handle_command(&command) {
                        Ok(outcome) => adapter.ack(cmd.client_id, cmd.seq, outcome),
                        Err(e) => adapter.reject(cmd.client_id, cmd.seq, ErrorCode::NoQuestions, &e.to_string()),
                    },
                }
            }
        }

        // Time. Whole milliseconds only; the remainder carries over.
        let elapsed_ms = last_tick.elapsed().as_millis().min(u32::MAX as u128) as u32;
        last_tick += Duration::from_millis(elapsed_ms as u64);
        app.advance(elapsed_ms);

        if app.take_changed() {
            if let Some(adapter) = adapter.as_mut() {
                adapter.broadcast(app.snapshot());
            }
        }

        // Render.
        let status = adapter.as_ref().map(|a| {
            let s = a.status();
            AdapterStatusView {
                enabled: true,
                client_count: s.client_count,
                controller_id: s.controller_id,
                streaming_count: s.streaming_count,
            }
        });
        let fingerprint = {
            let mut h = std::collections::hash_map::DefaultHasher::new();
            app.snapshot().hash(&mut h);
            app.input().hash(&mut h);
            status.map(|s| (s.client_count, s.streaming_count, s.controller_id)).hash(&mut h);
            h.finish()
        };
        let now_ms = started.elapsed().as_millis() as u64;
        if throttle.should_render(now_ms, fingerprint) {
            let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
            view.render_into_with_adapter(app.snapshot(), app.input(), status.as_ref(), Viewport::new(w, h), &mut fb);
            term.draw_swap(&mut fb)?;
        }

        // Input.
        if event::poll(Duration::from_millis(POLL_MS as u64))? {
            match event::read()? {
                Event::Key(key) => {
                    if should_quit(key) {
                        return Ok(());
                    }
                    if let Some(action) = handle_key_event(key) {
                        app.handle_action(action);
                    }
                }
                Event::Resize(_, _) => {
                    term.invalidate();
                    throttle.reset();
                }
                _ => {}
            }
        }
    }
}
