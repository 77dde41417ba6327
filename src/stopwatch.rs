use timer_core::TimerCore;

const MAX_LAPS: usize = 999;

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum StopwatchStage {
    Idle,
    Running,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct LapRow {
    pub number: usize,
    pub total_ms: u64,
    pub split_ms: u64,
    pub delta_ms: i64,
}

pub struct StopwatchState {
    pub timer: TimerCore,
    pub laps: Vec<u64>,
}

impl StopwatchState {
    pub fn new() -> Self {
        Self {
            timer: TimerCore::new_stopwatch(),
            laps: Vec::new(),
        }
    }

    pub fn stage(&self) -> StopwatchStage {
        if self.timer.is_running() {
            StopwatchStage::Running
        } else {
            StopwatchStage::Idle
        }
    }

    pub fn start(&mut self, now_ms: u64) -> bool {
        self.timer.start(now_ms)
    }

    pub fn pause(&mut self, now_ms: u64) -> bool {
        self.timer.pause(now_ms)
    }

    /// Start/Pause on a single key. Returns true if the stopwatch is now running.
    pub fn toggle(&mut self, now_ms: u64) -> bool {
        if self.timer.is_running() {
            self.pause(now_ms);
            false
        } else {
            self.start(now_ms);
            true
        }
    }

    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        self.timer.elapsed_ms(now_ms)
    }

    pub fn record_lap(&mut self, now_ms: u64) -> bool {
        if !self.timer.is_running() {
            log::debug!("lap ignored: stopwatch not running");
            return false;
        }
        if self.laps.len() >= MAX_LAPS {
            return false;
        }
        self.laps.push(self.timer.elapsed_ms(now_ms));
        true
    }

    pub fn reset(&mut self) {
        self.timer.reset();
        self.laps.clear();
    }

    pub fn lap_rows(&self) -> Vec<LapRow> {
        let mut rows = Vec::with_capacity(self.laps.len());
        let mut prev_total = 0u64;
        let mut prev_split = 0u64;
        for (i, &total) in self.laps.iter().enumerate() {
            let split = total.saturating_sub(prev_total);
            let delta = if i == 0 {
                0
            } else {
                split as i64 - prev_split as i64
            };
            rows.push(LapRow {
                number: i + 1,
                total_ms: total,
                split_ms: split,
                delta_ms: delta,
            });
            prev_total = total;
            prev_split = split;
        }
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_runs_and_pauses() {
        let mut sw = StopwatchState::new();
        assert_eq!(sw.stage(), StopwatchStage::Idle);
        assert!(sw.toggle(0));
        assert_eq!(sw.stage(), StopwatchStage::Running);
        assert!(!sw.toggle(1200));
        assert_eq!(sw.stage(), StopwatchStage::Idle);
        assert_eq!(sw.elapsed_ms(9000), 1200);
    }

    #[test]
    fn laps_only_while_running() {
        let mut sw = StopwatchState::new();
        assert!(!sw.record_lap(100));
        sw.start(0);
        assert!(sw.record_lap(1000));
        sw.pause(1500);
        assert!(!sw.record_lap(2000));
        assert_eq!(sw.laps, vec![1000]);
    }

    #[test]
    fn laps_are_elapsed_snapshots_across_pauses() {
        let mut sw = StopwatchState::new();
        sw.start(0);
        sw.record_lap(1000);
        sw.pause(1500);
        sw.start(10_000);
        sw.record_lap(10_500);
        assert_eq!(sw.laps, vec![1000, 2000]);
    }

    #[test]
    fn lap_rows_split_and_delta() {
        let mut sw = StopwatchState::new();
        sw.start(0);
        for t in [1000, 3000, 4500, 7000] {
            sw.record_lap(t);
        }
        let rows = sw.lap_rows();
        let splits: Vec<u64> = rows.iter().map(|r| r.split_ms).collect();
        let deltas: Vec<i64> = rows.iter().map(|r| r.delta_ms).collect();
        assert_eq!(splits, vec![1000, 2000, 1500, 2500]);
        // second lap compares against the first lap itself
        assert_eq!(deltas, vec![0, 1000, -500, 1000]);
        assert_eq!(rows[3].number, 4);
        assert_eq!(rows[3].total_ms, 7000);
    }

    #[test]
    fn reset_clears_from_any_stage() {
        let mut sw = StopwatchState::new();
        sw.start(0);
        sw.record_lap(500);
        sw.reset();
        assert_eq!(sw.stage(), StopwatchStage::Idle);
        assert_eq!(sw.elapsed_ms(5000), 0);
        assert!(sw.laps.is_empty());

        sw.start(0);
        sw.pause(700);
        sw.reset();
        assert_eq!(sw.elapsed_ms(5000), 0);
    }

    #[test]
    fn lap_cap_is_enforced() {
        let mut sw = StopwatchState::new();
        sw.start(0);
        for t in 0..(MAX_LAPS as u64 + 5) {
            sw.record_lap(t);
        }
        assert_eq!(sw.laps.len(), MAX_LAPS);
    }
}
