//! Pure timing logic library with no platform dependencies.
//!
//! Every operation takes the current monotonic time in milliseconds, so the
//! displayed value is always derived from the reference timestamp rather than
//! accumulated per frame.

use std::time::Instant;

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum TimerState {
    Stopped,
    Running,
    Paused,
}

/// Elapsed-time tracker. The reference timestamp is only held while running;
/// elapsed time is always `accumulated + (now - reference)`.
#[derive(Clone, Debug)]
pub struct TimerCore {
    pub state: TimerState,
    accumulated_ms: u64,
    reference_ms: Option<u64>,
    target_ms: Option<u64>,
}

impl TimerCore {
    fn with_target(target_ms: Option<u64>) -> Self {
        Self {
            state: TimerState::Stopped,
            accumulated_ms: 0,
            reference_ms: None,
            target_ms,
        }
    }

    pub fn new_stopwatch() -> Self {
        Self::with_target(None)
    }

    pub fn new_countdown(duration_ms: u64) -> Self {
        Self::with_target(Some(duration_ms))
    }

    /// Starts or resumes. Returns false if already running.
    pub fn start(&mut self, now_ms: u64) -> bool {
        if self.reference_ms.is_some() {
            return false;
        }
        self.reference_ms = Some(now_ms);
        self.state = TimerState::Running;
        true
    }

    /// Folds the live segment into the accumulator. Returns false if not running.
    pub fn pause(&mut self, now_ms: u64) -> bool {
        let Some(reference) = self.reference_ms.take() else {
            return false;
        };
        self.accumulated_ms = self
            .accumulated_ms
            .saturating_add(now_ms.saturating_sub(reference));
        self.state = TimerState::Paused;
        true
    }

    pub fn reset(&mut self) {
        self.accumulated_ms = 0;
        self.reference_ms = None;
        self.state = TimerState::Stopped;
    }

    pub fn is_running(&self) -> bool {
        self.reference_ms.is_some()
    }

    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        let live = self
            .reference_ms
            .map_or(0, |reference| now_ms.saturating_sub(reference));
        self.accumulated_ms.saturating_add(live)
    }

    pub fn remaining_ms(&self, now_ms: u64) -> Option<u64> {
        self.target_ms
            .map(|target| target.saturating_sub(self.elapsed_ms(now_ms)))
    }

    pub fn is_expired(&self, now_ms: u64) -> bool {
        self.target_ms
            .is_some_and(|target| self.elapsed_ms(now_ms) >= target)
    }

    pub fn target_ms(&self) -> Option<u64> {
        self.target_ms
    }
}

/// Monotonic millisecond source anchored at creation.
pub struct Clock {
    origin: Instant,
}

impl Clock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

/// Converts a minutes/seconds pair into milliseconds, clamping each part at zero.
pub fn duration_from_parts(minutes: i64, seconds: i64) -> u64 {
    let m = minutes.max(0) as u64;
    let s = seconds.max(0) as u64;
    m.saturating_mul(60_000).saturating_add(s.saturating_mul(1000))
}

/// Format milliseconds as "MM:SS". Minutes are not wrapped at 60.
pub fn format_mm_ss(ms: u64) -> String {
    let total_secs = ms / 1000;
    let m = total_secs / 60;
    let s = total_secs % 60;
    format!("{:02}:{:02}", m, s)
}

/// Format milliseconds as "MM:SS.mmm". Minutes are not wrapped at 60.
pub fn format_mm_ss_mmm(ms: u64) -> String {
    let total_secs = ms / 1000;
    let millis = ms % 1000;
    let m = total_secs / 60;
    let s = total_secs % 60;
    format!("{:02}:{:02}.{:03}", m, s, millis)
}

/// Format a signed delta as "+MM:SS.mmm" or "-MM:SS.mmm".
pub fn format_signed_mm_ss_mmm(delta_ms: i64) -> String {
    let sign = if delta_ms >= 0 { '+' } else { '-' };
    format!("{}{}", sign, format_mm_ss_mmm(delta_ms.unsigned_abs()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elapsed_spans_several_segments() {
        let mut timer = TimerCore::new_stopwatch();
        assert_eq!(timer.state, TimerState::Stopped);
        assert!(!timer.is_running());

        // three running segments of 400, 250 and 1350 ms with gaps between
        for (from, to) in [(100, 500), (2_000, 2_250), (9_000, 10_350)] {
            assert!(timer.start(from));
            assert_eq!(timer.state, TimerState::Running);
            assert!(timer.pause(to));
            assert_eq!(timer.state, TimerState::Paused);
        }
        assert_eq!(timer.elapsed_ms(60_000), 2_000);

        timer.start(70_000);
        assert_eq!(timer.elapsed_ms(70_123), 2_123);

        timer.reset();
        assert_eq!(timer.state, TimerState::Stopped);
        assert!(!timer.is_running());
        assert_eq!(timer.elapsed_ms(80_000), 0);
    }

    #[test]
    fn test_start_twice_is_idempotent() {
        let mut once = TimerCore::new_stopwatch();
        once.start(100);

        let mut twice = TimerCore::new_stopwatch();
        assert!(twice.start(100));
        assert!(!twice.start(400));

        assert_eq!(once.elapsed_ms(1000), twice.elapsed_ms(1000));
        assert_eq!(twice.elapsed_ms(1000), 900);
    }

    #[test]
    fn test_pause_when_not_running_is_noop() {
        let mut sw = TimerCore::new_stopwatch();
        assert!(!sw.pause(500));
        assert_eq!(sw.state, TimerState::Stopped);
        assert_eq!(sw.elapsed_ms(500), 0);
    }

    #[test]
    fn test_elapsed_monotonic_across_cycles() {
        let mut sw = TimerCore::new_stopwatch();
        let mut last = 0;
        let mut now = 0;
        for cycle in 0..5u64 {
            sw.start(now);
            for _ in 0..10 {
                now += 16 + cycle;
                let e = sw.elapsed_ms(now);
                assert!(e >= last);
                last = e;
            }
            sw.pause(now);
            let frozen = sw.elapsed_ms(now);
            now += 1000;
            assert_eq!(sw.elapsed_ms(now), frozen);
        }
        assert_eq!(last, sw.elapsed_ms(now));
    }

    #[test]
    fn test_elapsed_never_negative_with_stale_now() {
        let mut sw = TimerCore::new_stopwatch();
        sw.start(5000);
        assert_eq!(sw.elapsed_ms(4000), 0);
    }

    #[test]
    fn test_countdown_keeps_remaining_across_pause() {
        let mut stage = TimerCore::new_countdown(60_000);
        assert_eq!(stage.target_ms(), Some(60_000));
        assert_eq!(stage.remaining_ms(12_345), Some(60_000));

        stage.start(0);
        stage.pause(45_000);
        assert_eq!(stage.remaining_ms(300_000), Some(15_000));
        assert!(!stage.is_expired(300_000));

        stage.start(300_000);
        assert!(!stage.is_expired(314_999));
        assert!(stage.is_expired(315_000));
        assert_eq!(stage.remaining_ms(400_000), Some(0));
        assert_eq!(TimerCore::new_stopwatch().remaining_ms(5), None);
    }

    #[test]
    fn test_zero_countdown_is_expired_immediately() {
        let cd = TimerCore::new_countdown(0);
        assert!(cd.is_expired(0));
        assert_eq!(cd.remaining_ms(0), Some(0));
    }

    #[test]
    fn test_duration_from_parts() {
        assert_eq!(duration_from_parts(1, 30), 90_000);
        assert_eq!(duration_from_parts(-3, 15), 15_000);
        assert_eq!(duration_from_parts(2, -10), 120_000);
        assert_eq!(duration_from_parts(0, 0), 0);
    }

    #[test]
    fn test_format_mm_ss() {
        assert_eq!(format_mm_ss(0), "00:00");
        assert_eq!(format_mm_ss(1_500_000), "25:00");
        assert_eq!(format_mm_ss(59_999), "00:59");
        assert_eq!(format_mm_ss(7_500_000), "125:00");
    }

    #[test]
    fn test_format_mm_ss_mmm() {
        assert_eq!(format_mm_ss_mmm(0), "00:00.000");
        assert_eq!(format_mm_ss_mmm(12_345), "00:12.345");
        assert_eq!(format_mm_ss_mmm(3_661_007), "61:01.007");
    }

    #[test]
    fn test_format_signed() {
        assert_eq!(format_signed_mm_ss_mmm(0), "+00:00.000");
        assert_eq!(format_signed_mm_ss_mmm(1_250), "+00:01.250");
        assert_eq!(format_signed_mm_ss_mmm(-61_001), "-01:01.001");
    }
}
