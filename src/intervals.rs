use timer_core::{duration_from_parts, TimerCore};

use crate::alerts::{fire_cue, Notifier};

const MAX_INTERVALS: usize = 50;
const DEFAULT_NEW_SECONDS: i64 = 30;

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum IntervalStage {
    Editing,
    Running,
    Paused,
    Done,
}

#[derive(Clone, PartialEq, Debug)]
pub struct IntervalSpec {
    pub label: String,
    pub duration_ms: u64,
}

impl IntervalSpec {
    pub fn new(label: &str, minutes: i64, seconds: i64) -> Self {
        Self {
            label: label.to_string(),
            duration_ms: duration_from_parts(minutes, seconds),
        }
    }
}

/// Result of evaluating the sequencer once.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum TickOutcome {
    /// Not running; nothing was evaluated.
    Idle,
    Continue,
    Advanced(usize),
    Finished,
}

pub struct IntervalState {
    pub stage: IntervalStage,
    pub entries: Vec<IntervalSpec>,
    pub cursor: usize,
    stage_timer: TimerCore,
    cues_fired: u32,
}

impl IntervalState {
    pub fn new() -> Self {
        Self::with_entries(vec![
            IntervalSpec::new("Warm-up", 1, 0),
            IntervalSpec::new("Work", 0, 30),
            IntervalSpec::new("Rest", 0, 15),
        ])
    }

    pub fn with_entries(entries: Vec<IntervalSpec>) -> Self {
        Self {
            stage: IntervalStage::Editing,
            entries,
            cursor: 0,
            stage_timer: TimerCore::new_countdown(0),
            cues_fired: 0,
        }
    }

    pub fn add_interval(&mut self) -> bool {
        if self.stage != IntervalStage::Editing || self.entries.len() >= MAX_INTERVALS {
            return false;
        }
        let label = format!("Interval {}", self.entries.len() + 1);
        self.entries.push(IntervalSpec::new(&label, 0, DEFAULT_NEW_SECONDS));
        true
    }

    pub fn remove_interval(&mut self, index: usize) -> bool {
        if self.stage != IntervalStage::Editing || index >= self.entries.len() {
            return false;
        }
        self.entries.remove(index);
        true
    }

    pub fn rename_interval(&mut self, index: usize, label: &str) -> bool {
        if self.stage != IntervalStage::Editing {
            return false;
        }
        match self.entries.get_mut(index) {
            Some(entry) => {
                entry.label = label.to_string();
                true
            }
            None => false,
        }
    }

    pub fn set_interval_duration(&mut self, index: usize, minutes: i64, seconds: i64) -> bool {
        if self.stage != IntervalStage::Editing {
            return false;
        }
        match self.entries.get_mut(index) {
            Some(entry) => {
                entry.duration_ms = duration_from_parts(minutes, seconds);
                true
            }
            None => false,
        }
    }

    pub fn start(&mut self, now_ms: u64) -> bool {
        if self.stage != IntervalStage::Editing || self.entries.is_empty() {
            return false;
        }
        self.cues_fired = 0;
        self.run_from(0, now_ms);
        log::info!("interval sequence started ({} stages)", self.entries.len());
        true
    }

    pub fn pause(&mut self, now_ms: u64) -> bool {
        if self.stage != IntervalStage::Running {
            return false;
        }
        self.stage_timer.pause(now_ms);
        self.stage = IntervalStage::Paused;
        true
    }

    pub fn resume(&mut self, now_ms: u64) -> bool {
        if self.stage != IntervalStage::Paused {
            return false;
        }
        self.stage_timer.start(now_ms);
        self.stage = IntervalStage::Running;
        true
    }

    /// Re-seeds the current stage with its full duration and runs it again.
    pub fn restart_current(&mut self, now_ms: u64) -> bool {
        if self.stage != IntervalStage::Paused {
            return false;
        }
        self.run_from(self.cursor, now_ms);
        true
    }

    pub fn reset(&mut self) {
        self.stage_timer = TimerCore::new_countdown(0);
        self.cursor = 0;
        self.cues_fired = 0;
        self.stage = IntervalStage::Editing;
    }

    fn run_from(&mut self, index: usize, now_ms: u64) {
        let duration = self.entries[index].duration_ms;
        self.cursor = index;
        self.stage_timer = TimerCore::new_countdown(duration);
        self.stage_timer.start(now_ms);
        self.stage = IntervalStage::Running;
    }

    /// Evaluates the current stage once. At most one transition per call, so a
    /// zero-length stage still fires its cue and moves on at the next tick.
    pub fn tick(&mut self, now_ms: u64, notifier: &dyn Notifier) -> TickOutcome {
        if self.stage != IntervalStage::Running {
            return TickOutcome::Idle;
        }
        if !self.stage_timer.is_expired(now_ms) {
            return TickOutcome::Continue;
        }

        let finished = &self.entries[self.cursor].label;
        let message = format!("{} done", finished);
        fire_cue(notifier, &message);
        self.cues_fired += 1;

        let next = self.cursor + 1;
        if next >= self.entries.len() {
            self.stage_timer.pause(now_ms);
            self.stage = IntervalStage::Done;
            log::info!("interval sequence complete");
            return TickOutcome::Finished;
        }
        log::debug!("advancing to interval {} ({})", next, self.entries[next].label);
        self.run_from(next, now_ms);
        TickOutcome::Advanced(next)
    }

    pub fn is_running(&self) -> bool {
        self.stage == IntervalStage::Running
    }

    pub fn cues_fired(&self) -> u32 {
        self.cues_fired
    }

    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        match self.stage {
            IntervalStage::Editing | IntervalStage::Done => 0,
            _ => self.stage_timer.remaining_ms(now_ms).unwrap_or(0),
        }
    }

    pub fn current_label(&self) -> Option<&str> {
        self.entries.get(self.cursor).map(|e| e.label.as_str())
    }

    pub fn next_label(&self) -> &str {
        self.entries
            .get(self.cursor + 1)
            .map(|e| e.label.as_str())
            .unwrap_or("—")
    }

    pub fn total_ms(&self) -> u64 {
        sum_durations(&self.entries)
    }

    fn current_duration_ms(&self) -> u64 {
        self.entries.get(self.cursor).map(|e| e.duration_ms).unwrap_or(0)
    }

    pub fn current_progress_pct(&self, now_ms: u64) -> u8 {
        let duration = self.current_duration_ms();
        if duration == 0 || self.stage == IntervalStage::Editing {
            return 0;
        }
        let done = duration - self.remaining_ms(now_ms).min(duration);
        percent(done, duration)
    }

    pub fn overall_progress_pct(&self, now_ms: u64) -> u8 {
        let total = self.total_ms();
        if total == 0 || self.stage == IntervalStage::Editing {
            return 0;
        }
        let before = sum_durations(&self.entries[..self.cursor.min(self.entries.len())]);
        let duration = self.current_duration_ms();
        let current = duration - self.remaining_ms(now_ms).min(duration);
        percent(before.saturating_add(current), total)
    }
}

fn sum_durations(entries: &[IntervalSpec]) -> u64 {
    entries
        .iter()
        .fold(0u64, |acc, e| acc.saturating_add(e.duration_ms))
}

fn percent(part: u64, whole: u64) -> u8 {
    let pct = (part as f64 / whole as f64 * 100.0).round();
    pct.clamp(0.0, 100.0) as u8
}
