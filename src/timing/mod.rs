//! Monotonic recording clock
//!
//! Measures how long a recording has been running. Time spent paused does
//! not count.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Default)]
pub struct RecordingClock {
    /// Set while the clock runs
    running_since: Option<Instant>,
    /// Time accumulated before the current run
    banked: Duration,
}

impl RecordingClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero the clock and start it
    pub fn start(&mut self) {
        self.banked = Duration::ZERO;
        self.running_since = Some(Instant::now());
    }

    pub fn pause(&mut self) {
        if let Some(since) = self.running_since.take() {
            self.banked += since.elapsed();
        }
    }

    pub fn resume(&mut self) {
        if self.running_since.is_none() {
            self.running_since = Some(Instant::now());
        }
    }

    /// Stop and zero the clock
    pub fn reset(&mut self) {
        self.running_since = None;
        self.banked = Duration::ZERO;
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running_since.is_some()
    }

    #[inline]
    pub fn elapsed(&self) -> Duration {
        match self.running_since {
            Some(since) => self.banked + since.elapsed(),
            None => self.banked,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_idle_clock_is_zero() {
        let clock = RecordingClock::new();
        assert_eq!(clock.elapsed(), Duration::ZERO);
        assert!(!clock.is_running());
    }

    #[test]
    fn test_running_clock_increases() {
        let mut clock = RecordingClock::new();
        clock.start();
        let first = clock.elapsed();
        sleep(Duration::from_millis(5));
        assert!(clock.elapsed() > first);
    }

    #[test]
    fn test_pause_freezes_elapsed() {
        let mut clock = RecordingClock::new();
        clock.start();
        sleep(Duration::from_millis(5));
        clock.pause();
        let frozen = clock.elapsed();
        sleep(Duration::from_millis(5));
        assert_eq!(clock.elapsed(), frozen);

        clock.resume();
        sleep(Duration::from_millis(2));
        assert!(clock.elapsed() > frozen);

        clock.reset();
        assert_eq!(clock.elapsed(), Duration::ZERO);
    }
}
