use timer_core::TimerCore;

pub const MIN_COMPETITORS: usize = 1;
pub const MAX_COMPETITORS: usize = 200;
const DEFAULT_COMPETITORS: usize = 5;

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum RaceStage {
    Setup,
    Ready,
    Running,
    Done,
}

#[derive(Clone, PartialEq, Debug)]
pub struct Finish {
    pub competitor: String,
    pub elapsed_ms: u64,
}

#[derive(Clone, PartialEq, Debug)]
pub struct FinishRow<'a> {
    pub position: usize,
    pub competitor: &'a str,
    pub elapsed_ms: u64,
    pub gap_ms: u64,
}

pub struct RaceState {
    pub stage: RaceStage,
    pub timer: TimerCore,
    names: Vec<String>,
    ledger: Vec<Finish>,
}

fn default_name(index: usize) -> String {
    format!("P{}", index + 1)
}

pub fn clamp_count(count: i64) -> usize {
    count.clamp(MIN_COMPETITORS as i64, MAX_COMPETITORS as i64) as usize
}

impl RaceState {
    pub fn new() -> Self {
        Self {
            stage: RaceStage::Setup,
            timer: TimerCore::new_stopwatch(),
            names: (0..DEFAULT_COMPETITORS).map(default_name).collect(),
            ledger: Vec::new(),
        }
    }

    pub fn count(&self) -> usize {
        self.names.len()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn set_count(&mut self, count: i64) -> bool {
        if self.stage != RaceStage::Setup {
            return false;
        }
        let count = clamp_count(count);
        self.names.truncate(count);
        while self.names.len() < count {
            let next = default_name(self.names.len());
            self.names.push(next);
        }
        true
    }

    pub fn set_name(&mut self, index: usize, name: &str) -> bool {
        if self.stage != RaceStage::Setup {
            return false;
        }
        match self.names.get_mut(index) {
            Some(slot) => {
                *slot = name.to_string();
                true
            }
            None => false,
        }
    }

    /// Locks the roster. The clock does not start yet.
    pub fn confirm(&mut self) -> bool {
        if self.stage != RaceStage::Setup {
            return false;
        }
        self.timer.reset();
        self.ledger.clear();
        self.stage = RaceStage::Ready;
        log::info!("race confirmed with {} competitors", self.count());
        true
    }

    pub fn start(&mut self, now_ms: u64) -> bool {
        match self.stage {
            RaceStage::Ready | RaceStage::Running => {
                if !self.timer.start(now_ms) {
                    return false;
                }
                self.stage = RaceStage::Running;
                true
            }
            _ => false,
        }
    }

    /// Halts the clock without clearing the ledger. `start` resumes it.
    pub fn stop(&mut self, now_ms: u64) -> bool {
        if self.stage != RaceStage::Running {
            return false;
        }
        self.timer.pause(now_ms)
    }

    pub fn mark_finish(&mut self, now_ms: u64) -> bool {
        if self.stage != RaceStage::Running || !self.timer.is_running() {
            log::debug!("finish ignored: clock not running");
            return false;
        }
        if self.ledger.len() >= self.count() {
            return false;
        }
        let elapsed_ms = self.timer.elapsed_ms(now_ms);
        let competitor = self.next_competitor();
        self.ledger.push(Finish { competitor, elapsed_ms });

        if self.ledger.len() >= self.count() {
            self.timer.pause(now_ms);
            self.stage = RaceStage::Done;
            log::info!("race finished: {} arrivals recorded", self.ledger.len());
        }
        true
    }

    pub fn reset(&mut self) {
        self.timer.reset();
        self.ledger.clear();
        self.stage = RaceStage::Setup;
    }

    pub fn clock_running(&self) -> bool {
        self.timer.is_running()
    }

    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        self.timer.elapsed_ms(now_ms)
    }

    pub fn finishes(&self) -> &[Finish] {
        &self.ledger
    }

    pub fn next_competitor(&self) -> String {
        let idx = self.ledger.len();
        self.names
            .get(idx)
            .filter(|n| !n.is_empty())
            .cloned()
            .unwrap_or_else(|| default_name(idx))
    }

    pub fn rows(&self) -> Vec<FinishRow<'_>> {
        let first = self.ledger.first().map(|f| f.elapsed_ms).unwrap_or(0);
        self.ledger
            .iter()
            .enumerate()
            .map(|(i, f)| FinishRow {
                position: i + 1,
                competitor: &f.competitor,
                elapsed_ms: f.elapsed_ms,
                gap_ms: f.elapsed_ms.saturating_sub(first),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running_race(count: i64) -> RaceState {
        let mut race = RaceState::new();
        race.set_count(count);
        race.confirm();
        race.start(0);
        race
    }

    #[test]
    fn count_is_clamped_and_names_resized() {
        let mut race = RaceState::new();
        assert_eq!(race.count(), 5);
        race.set_count(0);
        assert_eq!(race.count(), 1);
        race.set_count(-7);
        assert_eq!(race.count(), 1);
        race.set_count(500);
        assert_eq!(race.count(), 200);
        race.set_count(3);
        assert_eq!(race.names(), ["P1", "P2", "P3"]);
    }

    #[test]
    fn names_kept_when_count_grows() {
        let mut race = RaceState::new();
        race.set_count(2);
        race.set_name(1, "Bea");
        race.set_count(4);
        assert_eq!(race.names(), ["P1", "Bea", "P3", "P4"]);
        assert!(!race.set_name(4, "Out of range"));
    }

    #[test]
    fn roster_locked_outside_setup() {
        let mut race = RaceState::new();
        race.confirm();
        assert!(!race.set_count(10));
        assert!(!race.set_name(0, "Ann"));
        assert_eq!(race.count(), 5);
    }

    #[test]
    fn cannot_mark_before_running() {
        let mut race = RaceState::new();
        assert!(!race.mark_finish(100));
        race.confirm();
        assert!(!race.mark_finish(100));
        assert!(race.finishes().is_empty());
    }

    #[test]
    fn start_requires_confirm() {
        let mut race = RaceState::new();
        assert!(!race.start(0));
        assert_eq!(race.stage, RaceStage::Setup);
    }

    #[test]
    fn nth_finish_completes_race() {
        let mut race = running_race(3);
        race.set_name(0, "ignored after confirm");
        assert!(race.mark_finish(1000));
        assert!(race.mark_finish(1500));
        assert_eq!(race.stage, RaceStage::Running);
        assert!(race.mark_finish(2600));
        assert_eq!(race.stage, RaceStage::Done);
        assert!(!race.clock_running());
        assert_eq!(race.elapsed_ms(99_999), 2600);

        assert!(!race.mark_finish(3000));
        assert_eq!(race.finishes().len(), 3);
    }

    #[test]
    fn finishes_use_roster_names() {
        let mut race = RaceState::new();
        race.set_count(2);
        race.set_name(0, "Ann");
        race.set_name(1, "");
        race.confirm();
        race.start(0);
        race.mark_finish(10);
        race.mark_finish(20);
        let names: Vec<&str> = race.finishes().iter().map(|f| f.competitor.as_str()).collect();
        assert_eq!(names, ["Ann", "P2"]);
    }

    #[test]
    fn gaps_relative_to_first_finish() {
        let mut race = running_race(3);
        race.mark_finish(61_000);
        race.mark_finish(61_250);
        race.mark_finish(70_000);
        let gaps: Vec<u64> = race.rows().iter().map(|r| r.gap_ms).collect();
        assert_eq!(gaps, vec![0, 250, 9_000]);
        assert_eq!(race.rows()[0].position, 1);
    }

    #[test]
    fn stop_keeps_ledger_and_resume_accumulates() {
        let mut race = running_race(4);
        race.mark_finish(1000);
        assert!(race.stop(2000));
        assert_eq!(race.stage, RaceStage::Running);
        assert!(!race.mark_finish(2500));

        assert!(race.start(10_000));
        race.mark_finish(10_500);
        let times: Vec<u64> = race.finishes().iter().map(|f| f.elapsed_ms).collect();
        assert_eq!(times, vec![1000, 2500]);
    }

    #[test]
    fn double_start_is_noop() {
        let mut race = running_race(2);
        assert!(!race.start(5000));
        assert_eq!(race.elapsed_ms(6000), 6000);
    }

    #[test]
    fn reset_returns_to_setup_from_any_stage() {
        let mut race = running_race(1);
        race.mark_finish(400);
        assert_eq!(race.stage, RaceStage::Done);
        race.reset();
        assert_eq!(race.stage, RaceStage::Setup);
        assert!(race.finishes().is_empty());
        assert_eq!(race.elapsed_ms(1000), 0);
        assert_eq!(race.count(), 1);

        race.confirm();
        race.reset();
        assert_eq!(race.stage, RaceStage::Setup);
    }
}
