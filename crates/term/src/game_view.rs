//! GameView: maps a `core::RoundSnapshot` into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.

use crate::core::{RoundEvent, RoundSnapshot, SlotSnapshot};
use crate::fb::{text_width, CellStyle, FrameBuffer, Rgb};
use crate::types::{EndReason, Phase};

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdapterStatusView {
    pub enabled: bool,
    pub client_count: u16,
    pub controller_id: Option<usize>,
    pub streaming_count: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorY {
    Center,
    Top,
}

const BG: Rgb = Rgb::new(0, 0, 0);
const TITLE: CellStyle = CellStyle::new(Rgb::new(250, 200, 80), BG).bold();
const BORDER: CellStyle = CellStyle::new(Rgb::new(200, 200, 200), BG);
const LABEL: CellStyle = CellStyle::new(Rgb::new(220, 220, 220), BG).bold();
const VALUE: CellStyle = CellStyle::new(Rgb::new(200, 200, 200), BG);
const HINT: CellStyle = CellStyle::new(Rgb::new(140, 140, 150), BG).dim();
const CARD_BG: Rgb = Rgb::new(30, 30, 40);
const HIDDEN: CellStyle = CellStyle::new(Rgb::new(120, 120, 140), CARD_BG);
const SHOWN: CellStyle = CellStyle::new(Rgb::new(240, 240, 240), CARD_BG).bold();
const CREDITED: CellStyle = CellStyle::new(Rgb::new(100, 220, 120), CARD_BG).bold();
const FORCED: CellStyle = CellStyle::new(Rgb::new(150, 150, 150), CARD_BG).dim();
const GOOD: CellStyle = CellStyle::new(Rgb::new(100, 220, 120), BG).bold();
const BAD: CellStyle = CellStyle::new(Rgb::new(220, 80, 80), BG).bold();
const OVERLAY: CellStyle = CellStyle::new(Rgb::new(255, 255, 255), Rgb::new(60, 40, 90)).bold();

const CARD_H: u16 = 3;
const GRID_COLS: usize = 2;
/// Rows above the slot grid: header, stats, question, input, feedback.
const GRID_TOP: u16 = 13;
/// Rows below the slot grid: blank, hints, adapter status.
const FOOTER_H: u16 = 3;

/// A lightweight terminal renderer for the quiz.
pub struct GameView {
    /// Widest the content column gets, in terminal columns.
    max_width: u16,
    anchor_y: AnchorY,
}

impl Default for GameView {
    fn default() -> Self {
        Self {
            max_width: 60,
            anchor_y: AnchorY::Center,
        }
    }
}

/// Placement of the content column inside the viewport.
#[derive(Debug, Clone, Copy)]
struct Layout {
    x: u16,
    y: u16,
    w: u16,
}

impl GameView {
    pub fn new(max_width: u16) -> Self {
        Self {
            max_width,
            anchor_y: AnchorY::Center,
        }
    }

    pub fn with_anchor_y(mut self, anchor_y: AnchorY) -> Self {
        self.anchor_y = anchor_y;
        self
    }

    /// Rows the view needs for `slot_count` slots.
    pub fn content_height(slot_count: usize) -> u16 {
        let rows = slot_count.div_ceil(GRID_COLS) as u16;
        GRID_TOP + rows * CARD_H + FOOTER_H
    }

    /// Render the current snapshot into an existing framebuffer.
    ///
    /// This is the allocation-free hot path. Callers can reuse a framebuffer
    /// across frames and only resize when the terminal size changes.
    pub fn render_into(&self, snap: &RoundSnapshot, input: &str, viewport: Viewport, fb: &mut FrameBuffer) {
        self.render_into_with_adapter(snap, input, None, viewport, fb);
    }

    pub fn render_into_with_adapter(
        &self,
        snap: &RoundSnapshot,
        input: &str,
        adapter: Option<&AdapterStatusView>,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(CellStyle::default().into_cell(' '));

        let w = viewport.width.min(self.max_width);
        let content_h = Self::content_height(snap.slots.len());
        let layout = Layout {
            x: viewport.width.saturating_sub(w) / 2,
            y: match self.anchor_y {
                AnchorY::Center => viewport.height.saturating_sub(content_h) / 2,
                AnchorY::Top => 0,
            },
            w,
        };

        self.draw_header(fb, layout);
        let footer_y = layout.y + content_h - FOOTER_H + 1;

        match snap.phase {
            Phase::AwaitingData => self.draw_awaiting_panel(fb, snap, layout),
            Phase::Finished => {
                self.draw_stats(fb, snap, layout);
                self.draw_finished_panel(fb, snap, layout);
            }
            Phase::Active | Phase::Countdown(_) | Phase::Revealed => {
                self.draw_stats(fb, snap, layout);
                self.draw_question(fb, snap, layout);
                self.draw_input(fb, snap, input, layout);
                self.draw_feedback(fb, snap, layout);
                self.draw_grid(fb, snap, layout);
                if let Some(n) = snap.countdown() {
                    self.draw_countdown(fb, snap, layout, n);
                }
            }
        }

        self.draw_hints(fb, snap, layout, footer_y);
        self.draw_adapter_status(fb, adapter, layout, footer_y + 1);
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, snap: &RoundSnapshot, input: &str, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(snap, input, viewport, &mut fb);
        fb
    }

    pub fn render_with_adapter(
        &self,
        snap: &RoundSnapshot,
        input: &str,
        adapter: Option<&AdapterStatusView>,
        viewport: Viewport,
    ) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into_with_adapter(snap, input, adapter, viewport, &mut fb);
        fb
    }

    fn draw_header(&self, fb: &mut FrameBuffer, l: Layout) {
        let title = "تحدي الأسئلة - TRIVIA";
        let x = l.x + l.w.saturating_sub(text_width(title)) / 2;
        fb.put_str_max(x, l.y, title, l.w, TITLE);
    }

    fn draw_stats(&self, fb: &mut FrameBuffer, snap: &RoundSnapshot, l: Layout) {
        let box_w = l.w.saturating_sub(2) / 3;
        if box_w < 4 {
            return;
        }
        let y = l.y + 2;
        let stats = [
            ("TIME", snap.time_left_sec),
            ("ATTEMPTS", snap.attempts_left),
            ("SCORE", snap.score),
        ];
        for (i, (label, value)) in stats.into_iter().enumerate() {
            let x = l.x + (i as u16) * (box_w + 1);
            draw_border(fb, x, y, box_w, 3, BORDER);
            fb.put_str_max(x + 1, y, label, box_w.saturating_sub(2), LABEL);
            let vx = x + box_w.saturating_sub(digit_count(value)) / 2;
            fb.put_u32(vx, y + 1, value, VALUE);
        }
    }

    fn draw_question(&self, fb: &mut FrameBuffer, snap: &RoundSnapshot, l: Layout) {
        let y = l.y + 6;
        let mut x = l.x;
        x += fb.put_str(x, y, "Question ", LABEL);
        x += fb.put_u32(x, y, (snap.question_index + 1) as u32, LABEL);
        x += fb.put_str(x, y, " of ", LABEL);
        fb.put_u32(x, y, snap.total_questions as u32, LABEL);

        fb.put_str_max(l.x, y + 1, &snap.prompt, l.w, VALUE);
    }

    fn draw_input(&self, fb: &mut FrameBuffer, snap: &RoundSnapshot, input: &str, l: Layout) {
        let y = l.y + 9;
        draw_border(fb, l.x, y, l.w, 3, BORDER);
        fb.put_str(l.x + 1, y, "GUESS", LABEL);

        let style = if snap.accepting_guesses() {
            VALUE
        } else {
            HINT
        };
        let inner_w = l.w.saturating_sub(4);
        fb.put_str(l.x + 1, y + 1, ">", LABEL);
        // Keep the tail of long input visible.
        let len = text_width(input);
        let skip = len.saturating_sub(inner_w.saturating_sub(1)) as usize;
        let mut x = l.x + 3;
        for ch in input.chars().skip(skip) {
            fb.put_char(x, y + 1, ch, style);
            x += 1;
        }
        if snap.accepting_guesses() {
            fb.put_char(x, y + 1, '▏', LABEL);
        }
    }

    fn draw_feedback(&self, fb: &mut FrameBuffer, snap: &RoundSnapshot, l: Layout) {
        let y = l.y + 12;
        let Some(event) = snap.last_event else {
            return;
        };
        match event {
            RoundEvent::Revealed { points, .. } => {
                let x = l.x + fb.put_str(l.x, y, "Correct! +", GOOD);
                fb.put_u32(x, y, points, GOOD);
            }
            RoundEvent::Missed { attempts_left } => {
                let mut x = l.x + fb.put_str(l.x, y, "Wrong answer, ", BAD);
                x += fb.put_u32(x, y, attempts_left, BAD);
                fb.put_str(x, y, " attempts left", BAD);
            }
            RoundEvent::RoundEnded { reason } => {
                let text = match reason {
                    EndReason::AllRevealed => "All answers found!",
                    EndReason::OutOfAttempts => "Out of attempts",
                    EndReason::TimeUp => "Time's up",
                };
                fb.put_str_max(l.x, y, text, l.w, LABEL);
            }
            RoundEvent::QuestionStarted { .. } | RoundEvent::SessionFinished { .. } => {}
        }
    }

    fn draw_grid(&self, fb: &mut FrameBuffer, snap: &RoundSnapshot, l: Layout) {
        let card_w = l.w.saturating_sub(1) / GRID_COLS as u16;
        if card_w < 6 {
            return;
        }
        for (i, slot) in snap.slots.iter().enumerate() {
            let col = (i % GRID_COLS) as u16;
            let row = (i / GRID_COLS) as u16;
            let x = l.x + col * (card_w + 1);
            let y = l.y + GRID_TOP + row * CARD_H;
            self.draw_card(fb, i, slot, x, y, card_w);
        }
    }

    fn draw_card(&self, fb: &mut FrameBuffer, index: usize, slot: &SlotSnapshot, x: u16, y: u16, w: u16) {
        let fill = CellStyle::new(BORDER.fg, CARD_BG);
        fb.fill_rect(x, y, w, CARD_H, ' ', fill);
        draw_border(fb, x, y, w, CARD_H, fill);

        match (&slot.text, slot.revealed) {
            (Some(text), true) => {
                let (points, style) = if slot.credited {
                    (slot.awarded(), CREDITED)
                } else {
                    (0, FORCED)
                };
                let points_w = digit_count(points) + 1;
                let text_w = w.saturating_sub(points_w + 5);
                fb.put_str_max(x + 2, y + 1, text, text_w, SHOWN);

                let px = x + w.saturating_sub(points_w + 2);
                fb.put_char(px, y + 1, '+', style);
                fb.put_u32(px + 1, y + 1, points, style);
            }
            _ => {
                let number = (index + 1) as u32;
                let nx = x + w.saturating_sub(digit_count(number)) / 2;
                fb.put_u32(nx, y + 1, number, HIDDEN);
            }
        }
    }

    fn draw_countdown(&self, fb: &mut FrameBuffer, snap: &RoundSnapshot, l: Layout, n: u8) {
        let rows = snap.slots.len().div_ceil(GRID_COLS) as u16;
        let grid_h = rows * CARD_H;
        let box_w = 9;
        let box_h = 3;
        let x = l.x + l.w.saturating_sub(box_w) / 2;
        let y = l.y + GRID_TOP + grid_h.saturating_sub(box_h) / 2;
        fb.fill_rect(x, y, box_w, box_h, ' ', OVERLAY);
        draw_border(fb, x, y, box_w, box_h, OVERLAY);
        fb.put_u32(x + box_w / 2, y + 1, n as u32, OVERLAY);
    }

    fn draw_finished_panel(&self, fb: &mut FrameBuffer, snap: &RoundSnapshot, l: Layout) {
        let y = l.y + 7;
        draw_border(fb, l.x, y, l.w, 6, BORDER);
        let title = "انتهت اللعبة - GAME OVER";
        fb.put_str_max(l.x + l.w.saturating_sub(text_width(title)) / 2, y + 1, title, l.w, TITLE);

        let label = "Final score: ";
        let line_w = text_width(label) + digit_count(snap.score);
        let x = l.x + l.w.saturating_sub(line_w) / 2;
        let x = x + fb.put_str(x, y + 3, label, LABEL);
        fb.put_u32(x, y + 3, snap.score, GOOD);

        let hint = "Ctrl+R to play again";
        fb.put_str_max(l.x + l.w.saturating_sub(text_width(hint)) / 2, y + 4, hint, l.w, HINT);
    }

    fn draw_awaiting_panel(&self, fb: &mut FrameBuffer, snap: &RoundSnapshot, l: Layout) {
        let y = l.y + 4;
        draw_border(fb, l.x, y, l.w, 5, BORDER);
        fb.put_str_max(l.x + 2, y + 1, "Waiting for questions...", l.w.saturating_sub(4), LABEL);
        if let Some(err) = &snap.error {
            let msg = err.to_string();
            fb.put_str_max(l.x + 2, y + 3, &msg, l.w.saturating_sub(4), BAD);
        }
    }

    fn draw_hints(&self, fb: &mut FrameBuffer, snap: &RoundSnapshot, l: Layout, y: u16) {
        let text = match snap.phase {
            Phase::Active => "Enter submit  Esc clear  Ctrl+R restart  Ctrl+C quit",
            Phase::Countdown(_) | Phase::Revealed => "Next question coming up...",
            Phase::Finished | Phase::AwaitingData => "Ctrl+R restart  Ctrl+C quit",
        };
        fb.put_str_max(l.x, y, text, l.w, HINT);
    }

    fn draw_adapter_status(&self, fb: &mut FrameBuffer, adapter: Option<&AdapterStatusView>, l: Layout, y: u16) {
        let mut x = l.x + fb.put_str(l.x, y, "AI ", LABEL);
        let Some(st) = adapter.filter(|st| st.enabled) else {
            fb.put_str(x, y, "OFF", VALUE);
            return;
        };
        x += fb.put_str(x, y, "ON  clients ", VALUE);
        x += fb.put_u32(x, y, st.client_count as u32, VALUE);
        x += fb.put_str(x, y, "  streaming ", VALUE);
        x += fb.put_u32(x, y, st.streaming_count as u32, VALUE);
        x += fb.put_str(x, y, "  ctrl ", VALUE);
        match st.controller_id {
            Some(id) => fb.put_u32(x, y, id as u32, VALUE),
            None => fb.put_str(x, y, "-", VALUE),
        };
    }
}

fn draw_border(fb: &mut FrameBuffer, x: u16, y: u16, w: u16, h: u16, style: CellStyle) {
    if w < 2 || h < 2 {
        return;
    }

    fb.put_char(x, y, '┌', style);
    fb.put_char(x + w - 1, y, '┐', style);
    fb.put_char(x, y + h - 1, '└', style);
    fb.put_char(x + w - 1, y + h - 1, '┘', style);

    for dx in 1..w - 1 {
        fb.put_char(x + dx, y, '─', style);
        fb.put_char(x + dx, y + h - 1, '─', style);
    }
    for dy in 1..h - 1 {
        fb.put_char(x, y + dy, '│', style);
        fb.put_char(x + w - 1, y + dy, '│', style);
    }
}

fn digit_count(mut n: u32) -> u16 {
    let mut d = 1;
    while n >= 10 {
        n /= 10;
        d += 1;
    }
    d
}
