//! # Debounce Window
//!
//! Suppresses repeat detections so one physical code held in front of the
//! camera fires a single product-add side effect, not one per frame.
//!
//! ## Acceptance Law
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  accept("123") ── t=0ms      ──► fires                                  │
//! │  accept("123") ── t=120ms    ──► suppressed (inside window)             │
//! │  accept("456") ── t=900ms    ──► suppressed (ANY value is suppressed)   │
//! │  accept("456") ── t=2100ms   ──► fires (window elapsed)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The window suppresses *any* value, not just repeats of the last one:
//! consecutive frames of the same physical code occasionally decode to
//! slightly different strings, and those must not double-fire either.
//!
//! The clock is injected (`Instant` parameters) so the capture loop and
//! the tests own time; `Instant::now()` convenience wrappers exist for
//! production call sites.

use std::time::{Duration, Instant};

use crate::DEBOUNCE_WINDOW_MS;

// =============================================================================
// Debounce Window
// =============================================================================

/// Tracks the last accepted detection and suppresses further accepts
/// inside the configured window.
#[derive(Debug, Clone)]
pub struct DebounceWindow {
    /// Suppression interval after an accepted detection.
    window: Duration,

    /// Value of the last accepted detection.
    last_accepted_value: Option<String>,

    /// Monotonic timestamp of the last accepted detection.
    last_accepted_at: Option<Instant>,
}

impl DebounceWindow {
    /// Creates a window with a custom suppression interval.
    pub fn new(window: Duration) -> Self {
        DebounceWindow {
            window,
            last_accepted_value: None,
            last_accepted_at: None,
        }
    }

    /// Creates a window with the default interval.
    pub fn with_default_window() -> Self {
        DebounceWindow::new(Duration::from_millis(DEBOUNCE_WINDOW_MS))
    }

    /// Returns true when an accept at `now` must be suppressed.
    pub fn is_suppressed_at(&self, now: Instant) -> bool {
        match self.last_accepted_at {
            Some(last) => now.saturating_duration_since(last) < self.window,
            None => false,
        }
    }

    /// Records an accepted detection at `now`.
    pub fn record_accept_at(&mut self, value: &str, now: Instant) {
        self.last_accepted_value = Some(value.to_string());
        self.last_accepted_at = Some(now);
    }

    /// Combined check-and-record: returns true (and records) when the
    /// accept fires, false when it is suppressed.
    pub fn try_accept_at(&mut self, value: &str, now: Instant) -> bool {
        if self.is_suppressed_at(now) {
            return false;
        }
        self.record_accept_at(value, now);
        true
    }

    /// `try_accept_at` with the real clock.
    pub fn try_accept(&mut self, value: &str) -> bool {
        self.try_accept_at(value, Instant::now())
    }

    /// Value of the last accepted detection, if any.
    pub fn last_value(&self) -> Option<&str> {
        self.last_accepted_value.as_deref()
    }

    /// Monotonic timestamp of the last accepted detection, if any.
    #[inline]
    pub fn last_accepted_at(&self) -> Option<Instant> {
        self.last_accepted_at
    }

    /// The configured suppression interval.
    #[inline]
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Forgets the last acceptance, re-arming the window immediately.
    pub fn reset(&mut self) {
        self.last_accepted_value = None;
        self.last_accepted_at = None;
    }
}

impl Default for DebounceWindow {
    fn default() -> Self {
        DebounceWindow::with_default_window()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_accept_always_fires() {
        let mut window = DebounceWindow::with_default_window();
        assert!(window.try_accept_at("123", Instant::now()));
        assert_eq!(window.last_value(), Some("123"));
    }

    #[test]
    fn test_same_value_suppressed_inside_window() {
        let mut window = DebounceWindow::new(Duration::from_millis(2000));
        let t0 = Instant::now();

        assert!(window.try_accept_at("123", t0));
        assert!(!window.try_accept_at("123", t0 + Duration::from_millis(100)));
        assert!(!window.try_accept_at("123", t0 + Duration::from_millis(1999)));
    }

    #[test]
    fn test_different_value_also_suppressed_inside_window() {
        let mut window = DebounceWindow::new(Duration::from_millis(2000));
        let t0 = Instant::now();

        assert!(window.try_accept_at("123", t0));
        assert!(!window.try_accept_at("456", t0 + Duration::from_millis(500)));
        // last accepted value is unchanged by a suppressed accept
        assert_eq!(window.last_value(), Some("123"));
    }

    #[test]
    fn test_accept_fires_after_window_elapses() {
        let mut window = DebounceWindow::new(Duration::from_millis(2000));
        let t0 = Instant::now();

        assert!(window.try_accept_at("123", t0));
        assert!(window.try_accept_at("456", t0 + Duration::from_millis(2000)));
        assert_eq!(window.last_value(), Some("456"));
    }

    #[test]
    fn test_at_most_one_accept_per_window() {
        let mut window = DebounceWindow::new(Duration::from_millis(2000));
        let t0 = Instant::now();

        // A burst of detections 50ms apart: exactly one fires per window.
        let mut fired = 0;
        for i in 0..40 {
            if window.try_accept_at("123", t0 + Duration::from_millis(50 * i)) {
                fired += 1;
            }
        }
        assert_eq!(fired, 1);
    }

    #[test]
    fn test_reset_rearms_immediately() {
        let mut window = DebounceWindow::new(Duration::from_millis(2000));
        let t0 = Instant::now();

        assert!(window.try_accept_at("123", t0));
        window.reset();
        assert!(window.try_accept_at("123", t0 + Duration::from_millis(10)));
    }
}
