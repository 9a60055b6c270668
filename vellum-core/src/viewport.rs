//! Bidirectional scroll mirroring between the editor and preview panes.
//!
//! When one pane scrolls, the other is moved to the same scroll *fraction*.
//! The programmatic scroll of the target pane fires a scroll event of its
//! own; a time-boxed re-entrancy guard swallows that echo so the two panes do
//! not feed back into each other. Mirroring is best-effort: a request that
//! arrives while the guard is armed is dropped, never queued.

use std::time::{Duration, Instant};

/// Default guard window. Must cover the host's event-dispatch latency for
/// the programmatic scroll.
const DEFAULT_GUARD: Duration = Duration::from_millis(50);

/// Scroll geometry of a pane, as reported by the host surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaneMetrics {
    /// Current scroll offset from the top.
    pub scroll_top: f64,
    /// Total content height.
    pub scroll_height: f64,
    /// Visible height.
    pub client_height: f64,
}

impl PaneMetrics {
    /// Scrollable range; zero or negative when the content fits the pane.
    fn range(&self) -> f64 {
        self.scroll_height - self.client_height
    }
}

/// Re-entrancy-guarded scroll mirroring state.
///
/// One instance is shared by both mirroring directions — the guard is what
/// keeps an applied mirror from bouncing back.
#[derive(Debug)]
pub struct ScrollSync {
    guard: Duration,
    armed_until: Option<Instant>,
}

impl Default for ScrollSync {
    fn default() -> Self {
        Self::with_guard(DEFAULT_GUARD)
    }
}

impl ScrollSync {
    /// Create with a custom guard window (tests use a short one).
    pub fn with_guard(guard: Duration) -> Self {
        Self {
            guard,
            armed_until: None,
        }
    }

    /// Mirror `source`'s scroll fraction onto `target`.
    ///
    /// Returns the offset to apply to the target pane, or `None` when the
    /// request is dropped: the guard is armed (an earlier mirror is still in
    /// flight) or the source pane has no scrollable range.
    pub fn mirror(&mut self, source: &PaneMetrics, target: &PaneMetrics) -> Option<f64> {
        self.mirror_at(Instant::now(), source, target)
    }

    fn mirror_at(
        &mut self,
        now: Instant,
        source: &PaneMetrics,
        target: &PaneMetrics,
    ) -> Option<f64> {
        if let Some(armed_until) = self.armed_until {
            if now < armed_until {
                return None;
            }
        }

        let source_range = source.range();
        if source_range <= 0.0 {
            return None;
        }

        let fraction = (source.scroll_top / source_range).clamp(0.0, 1.0);
        let offset = fraction * target.range().max(0.0);

        self.armed_until = Some(now + self.guard);
        Some(offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pane(scroll_top: f64, scroll_height: f64, client_height: f64) -> PaneMetrics {
        PaneMetrics {
            scroll_top,
            scroll_height,
            client_height,
        }
    }

    #[test]
    fn mirrors_scroll_fraction() {
        let mut sync = ScrollSync::default();
        // Source at 50%: 400 of (1000 - 200).
        let source = pane(400.0, 1000.0, 200.0);
        let target = pane(0.0, 2000.0, 500.0);
        let offset = sync.mirror(&source, &target).unwrap();
        assert!((offset - 0.5 * (2000.0 - 500.0)).abs() < f64::EPSILON);
    }

    #[test]
    fn echo_within_guard_window_is_dropped() {
        let mut sync = ScrollSync::default();
        let source = pane(100.0, 1000.0, 200.0);
        let target = pane(0.0, 2000.0, 500.0);
        assert!(sync.mirror(&source, &target).is_some());
        // The mirrored pane's own scroll event bounces straight back.
        assert_eq!(sync.mirror(&target, &source), None);
    }

    #[test]
    fn guard_expires_after_window() {
        let mut sync = ScrollSync::with_guard(Duration::from_millis(5));
        let source = pane(100.0, 1000.0, 200.0);
        let target = pane(0.0, 2000.0, 500.0);
        assert!(sync.mirror(&source, &target).is_some());
        std::thread::sleep(Duration::from_millis(10));
        assert!(sync.mirror(&source, &target).is_some());
    }

    #[test]
    fn unscrollable_source_is_ignored() {
        let mut sync = ScrollSync::default();
        let source = pane(0.0, 100.0, 200.0);
        let target = pane(0.0, 2000.0, 500.0);
        assert_eq!(sync.mirror(&source, &target), None);
    }

    #[test]
    fn unscrollable_target_pins_to_zero() {
        let mut sync = ScrollSync::default();
        let source = pane(400.0, 1000.0, 200.0);
        let target = pane(0.0, 100.0, 200.0);
        assert_eq!(sync.mirror(&source, &target), Some(0.0));
    }

    #[test]
    fn fraction_is_clamped() {
        let mut sync = ScrollSync::default();
        // Overscroll past the range (momentum bounce).
        let source = pane(900.0, 1000.0, 200.0);
        let target = pane(0.0, 2000.0, 500.0);
        assert_eq!(sync.mirror(&source, &target), Some(1500.0));
    }
}
