/// Decides when the main loop redraws.
///
/// A frame is drawn as soon as the view fingerprint changes, and otherwise
/// at most once per `refresh_ms`.
#[derive(Debug, Clone)]
pub struct RenderThrottle {
    refresh_ms: u64,
    last_render_ms: u64,
    last_fingerprint: Option<u64>,
}

impl RenderThrottle {
    pub fn new(refresh_ms: u64) -> Self {
        Self {
            refresh_ms,
            last_render_ms: 0,
            last_fingerprint: None,
        }
    }

    pub fn should_render(&mut self, now_ms: u64, fingerprint: u64) -> bool {
        let changed = self.last_fingerprint != Some(fingerprint);
        let stale = now_ms.saturating_sub(self.last_render_ms) >= self.refresh_ms;
        if changed || stale {
            self.last_render_ms = now_ms;
            self.last_fingerprint = Some(fingerprint);
            return true;
        }
        false
    }

    /// Make the next call render regardless of fingerprint.
    pub fn reset(&mut self) {
        self.last_fingerprint = None;
    }
}
