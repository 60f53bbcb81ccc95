//! Search input coalescing.
//!
//! Keystrokes update the pending value; only the value still pending after
//! a quiet window fires.  Time is passed in so the main loop drives it from
//! its tick and tests can step it.

use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct Debouncer {
    quiet: Duration,
    pending: Option<(String, Instant)>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
        }
    }

    /// Record a new value, cancelling any earlier pending one.
    pub fn input(&mut self, value: impl Into<String>, now: Instant) {
        self.pending = Some((value.into(), now + self.quiet));
    }

    /// The pending value, once its quiet window has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        let due = matches!(&self.pending, Some((_, deadline)) if now >= *deadline);
        if due {
            self.flush()
        } else {
            None
        }
    }

    /// Fire immediately regardless of the window.
    pub fn flush(&mut self) -> Option<String> {
        self.pending.take().map(|(v, _)| v)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUIET: Duration = Duration::from_millis(500);

    #[test]
    fn nothing_fires_before_window() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(QUIET);
        d.input("ru", t0);
        assert_eq!(d.poll(t0 + Duration::from_millis(499)), None);
        assert!(d.is_pending());
    }

    #[test]
    fn fires_once_after_window() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(QUIET);
        d.input("rust", t0);
        assert_eq!(d.poll(t0 + QUIET), Some("rust".to_string()));
        assert_eq!(d.poll(t0 + QUIET * 2), None);
    }

    #[test]
    fn later_input_restarts_window_and_wins() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(QUIET);
        d.input("r", t0);
        d.input("ru", t0 + Duration::from_millis(300));
        d.input("rust", t0 + Duration::from_millis(600));

        assert_eq!(d.poll(t0 + Duration::from_millis(900)), None);
        assert_eq!(d.poll(t0 + Duration::from_millis(1100)), Some("rust".to_string()));
    }

    #[test]
    fn flush_and_cancel() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(QUIET);
        d.input("now", t0);
        assert_eq!(d.flush(), Some("now".to_string()));

        d.input("never", t0);
        d.cancel();
        assert_eq!(d.poll(t0 + QUIET), None);
    }
}
