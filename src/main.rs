mod alerts;
mod config;
mod intervals;
mod race;
mod stopwatch;
mod ui;

use std::io::{self, BufRead};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use timer_core::Clock;
use tracing_subscriber::EnvFilter;

use crate::alerts::TerminalNotifier;
use crate::config::Config;
use crate::intervals::{IntervalStage, IntervalState, TickOutcome};
use crate::race::{RaceStage, RaceState};
use crate::stopwatch::StopwatchState;

enum AppMsg {
    Line(String),
    Pump,
    Quit,
}

enum PumpOp {
    Start(u64),
    Stop,
    Quit,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum AppMode {
    ModeSelect,
    Stopwatch,
    Race,
    Intervals,
}

struct CronoApp {
    clock: Clock,
    notifier: TerminalNotifier,

    mode: AppMode,
    help_visible: bool,
    quit: bool,

    stopwatch: StopwatchState,
    race: RaceState,
    intervals: IntervalState,

    pump_tx: Sender<PumpOp>,
    pump_running: bool,
    clock_frame_ms: u64,
    sequencer_frame_ms: u64,
}

impl CronoApp {
    fn new(config: &Config, pump_tx: Sender<PumpOp>) -> Self {
        Self {
            clock: Clock::new(),
            notifier: TerminalNotifier::new(config.alert_config()),
            mode: AppMode::ModeSelect,
            help_visible: false,
            quit: false,
            stopwatch: StopwatchState::new(),
            race: RaceState::new(),
            intervals: IntervalState::new(),
            pump_tx,
            pump_running: false,
            clock_frame_ms: config.clock_frame_ms(),
            sequencer_frame_ms: config.sequencer_frame_ms(),
        }
    }

    fn now_ms(&self) -> u64 {
        self.clock.elapsed_ms()
    }

    fn redraw(&self) {
        let frame = if self.help_visible {
            ui::draw_help(self.help_text())
        } else {
            let now = self.now_ms();
            match self.mode {
                AppMode::ModeSelect => ui::draw_mode_select(),
                AppMode::Stopwatch => ui::draw_stopwatch(&self.stopwatch, now),
                AppMode::Race => ui::draw_race(&self.race, now),
                AppMode::Intervals => ui::draw_intervals(&self.intervals, now),
            }
        };
        if let Err(e) = ui::present(&frame) {
            log::error!("redraw failed: {}", e);
        }
    }

    fn start_pump(&mut self, interval_ms: u64) {
        if !self.pump_running {
            self.pump_running = true;
            self.pump_tx.send(PumpOp::Start(interval_ms)).ok();
        }
    }

    fn stop_pump(&mut self) {
        if self.pump_running {
            self.pump_running = false;
            self.pump_tx.send(PumpOp::Stop).ok();
        }
    }

    /// Keeps the pump alive exactly while the visible tool is running.
    fn sync_pump(&mut self) {
        match self.mode {
            AppMode::Stopwatch if self.stopwatch.timer.is_running() => {
                self.start_pump(self.clock_frame_ms)
            }
            AppMode::Race if self.race.clock_running() => self.start_pump(self.clock_frame_ms),
            AppMode::Intervals if self.intervals.is_running() => {
                self.start_pump(self.sequencer_frame_ms)
            }
            _ => self.stop_pump(),
        }
    }

    fn handle_pump(&mut self) {
        let now = self.now_ms();
        match self.mode {
            AppMode::Stopwatch => {
                if !self.stopwatch.timer.is_running() {
                    self.stop_pump();
                    return;
                }
            }
            AppMode::Race => {
                if !self.race.clock_running() {
                    self.stop_pump();
                    return;
                }
            }
            AppMode::Intervals => match self.intervals.tick(now, &self.notifier) {
                TickOutcome::Idle => {
                    self.stop_pump();
                    return;
                }
                TickOutcome::Finished => self.stop_pump(),
                TickOutcome::Continue | TickOutcome::Advanced(_) => {}
            },
            AppMode::ModeSelect => {
                self.stop_pump();
                return;
            }
        }
        self.redraw();
    }

    fn handle_line(&mut self, line: &str) {
        if self.help_visible {
            self.help_visible = false;
            self.redraw();
            return;
        }

        let line = line.trim();
        let (cmd, args) = match line.split_once(char::is_whitespace) {
            Some((cmd, rest)) => (cmd, rest.trim()),
            None => (line, ""),
        };

        if cmd == "h" {
            self.help_visible = true;
            self.redraw();
            return;
        }

        match self.mode {
            AppMode::ModeSelect => self.handle_mode_select(cmd),
            AppMode::Stopwatch => self.handle_stopwatch(cmd),
            AppMode::Race => self.handle_race(cmd, args),
            AppMode::Intervals => self.handle_intervals(cmd, args),
        }
        self.sync_pump();
        if !self.quit {
            self.redraw();
        }
    }

    /// Leaving a tool discards its state.
    fn leave_tool(&mut self) {
        match self.mode {
            AppMode::Stopwatch => self.stopwatch.reset(),
            AppMode::Race => self.race.reset(),
            AppMode::Intervals => self.intervals.reset(),
            AppMode::ModeSelect => {}
        }
        self.mode = AppMode::ModeSelect;
    }

    fn handle_mode_select(&mut self, cmd: &str) {
        match cmd {
            "1" => self.mode = AppMode::Stopwatch,
            "2" => self.mode = AppMode::Race,
            "3" => self.mode = AppMode::Intervals,
            "q" => self.quit = true,
            _ => {}
        }
        log::debug!("mode is now {:?}", self.mode);
    }

    fn handle_stopwatch(&mut self, cmd: &str) {
        let now = self.now_ms();
        match cmd {
            "" => {
                self.stopwatch.toggle(now);
            }
            "l" => {
                self.stopwatch.record_lap(now);
            }
            "r" => self.stopwatch.reset(),
            "q" => self.leave_tool(),
            _ => {}
        }
    }

    fn handle_race(&mut self, cmd: &str, args: &str) {
        let now = self.now_ms();
        match (self.race.stage, cmd) {
            (_, "q") => self.leave_tool(),
            (_, "r") => self.race.reset(),
            (RaceStage::Setup, "c") => {
                self.race.set_count(parse_number(args));
            }
            (RaceStage::Setup, "n") => {
                let (pos, name) = args.split_once(char::is_whitespace).unwrap_or((args, ""));
                if let Some(index) = parse_position(pos) {
                    self.race.set_name(index, name.trim());
                }
            }
            (RaceStage::Setup, "") => {
                self.race.confirm();
            }
            (RaceStage::Ready, "") => {
                self.race.start(now);
            }
            (RaceStage::Running, "") => {
                if self.race.clock_running() {
                    self.race.mark_finish(now);
                } else {
                    self.race.start(now);
                }
            }
            (RaceStage::Running, "s") => {
                self.race.stop(now);
            }
            _ => {}
        }
    }

    fn handle_intervals(&mut self, cmd: &str, args: &str) {
        let now = self.now_ms();
        match (self.intervals.stage, cmd) {
            (_, "q") => self.leave_tool(),
            (_, "r") => self.intervals.reset(),
            (IntervalStage::Editing, "a") => {
                self.intervals.add_interval();
            }
            (IntervalStage::Editing, "x") => {
                if let Some(index) = parse_position(args) {
                    self.intervals.remove_interval(index);
                }
            }
            (IntervalStage::Editing, "n") => {
                let (pos, label) = args.split_once(char::is_whitespace).unwrap_or((args, ""));
                if let Some(index) = parse_position(pos) {
                    self.intervals.rename_interval(index, label.trim());
                }
            }
            (IntervalStage::Editing, "d") => {
                let (pos, duration) = args.split_once(char::is_whitespace).unwrap_or((args, ""));
                if let Some(index) = parse_position(pos) {
                    let (minutes, seconds) = parse_mmss(duration.trim());
                    self.intervals.set_interval_duration(index, minutes, seconds);
                }
            }
            (IntervalStage::Editing, "") => {
                self.intervals.start(now);
            }
            (IntervalStage::Running, "") => {
                self.intervals.pause(now);
            }
            (IntervalStage::Paused, "") => {
                self.intervals.resume(now);
            }
            (IntervalStage::Paused, "t") => {
                self.intervals.restart_current(now);
            }
            _ => {}
        }
    }

    fn help_text(&self) -> &'static str {
        match self.mode {
            AppMode::ModeSelect => {
                "CRONO HELP\n\n\
                 1      Stopwatch\n\
                 2      Race\n\
                 3      Intervals\n\
                 q      Quit"
            }
            AppMode::Stopwatch => {
                "STOPWATCH HELP\n\n\
                 Enter  Start/Pause\n\
                 l      Record lap\n\
                 r      Reset\n\
                 q      Back"
            }
            AppMode::Race => {
                "RACE HELP\n\n\
                 c <n>          Competitor count (1-200)\n\
                 n <pos> <name> Rename competitor\n\
                 Enter          Confirm / Start / Next position\n\
                 s              Stop clock\n\
                 r              Reset to setup\n\
                 q              Back"
            }
            AppMode::Intervals => {
                "INTERVALS HELP\n\n\
                 a                Add interval\n\
                 x <n>            Remove interval\n\
                 n <n> <label>    Rename interval\n\
                 d <n> <MM:SS>    Set duration\n\
                 Enter            Start / Pause / Resume\n\
                 t                Restart current interval (paused)\n\
                 r                Reset to editing\n\
                 q                Back"
            }
        }
    }

    fn shutdown(&mut self) {
        self.stop_pump();
        self.pump_tx.send(PumpOp::Quit).ok();
    }
}

fn parse_number(s: &str) -> i64 {
    s.trim().parse::<i64>().unwrap_or(0)
}

/// Parse a 1-based position into an index.
fn parse_position(s: &str) -> Option<usize> {
    s.trim().parse::<usize>().ok().and_then(|p| p.checked_sub(1))
}

/// Parse "MM:SS" or plain seconds into (minutes, seconds).
fn parse_mmss(s: &str) -> (i64, i64) {
    let parts: Vec<&str> = s.split(':').collect();
    match parts.len() {
        1 => (0, parse_number(parts[0])),
        2 => (parse_number(parts[0]), parse_number(parts[1])),
        _ => (0, 0),
    }
}

fn pump_thread(control: Receiver<PumpOp>, main_tx: Sender<AppMsg>) {
    let mut interval_ms = 100u64;
    let mut running = false;

    loop {
        // Block-wait when stopped
        let op = if running {
            match control.recv_timeout(Duration::from_millis(interval_ms)) {
                Ok(op) => Some(op),
                Err(RecvTimeoutError::Timeout) => {
                    if main_tx.send(AppMsg::Pump).is_err() {
                        break;
                    }
                    None
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        } else {
            match control.recv() {
                Ok(op) => Some(op),
                Err(_) => break,
            }
        };

        match op {
            Some(PumpOp::Start(ms)) => {
                interval_ms = if ms == 0 { 100 } else { ms };
                running = true;
            }
            Some(PumpOp::Stop) => running = false,
            Some(PumpOp::Quit) => break,
            None => {}
        }
    }
    log::debug!("pump thread exiting");
}

fn input_thread(main_tx: Sender<AppMsg>) {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        match line {
            Ok(line) => {
                if main_tx.send(AppMsg::Line(line)).is_err() {
                    return;
                }
            }
            Err(e) => {
                log::error!("stdin read failed: {}", e);
                break;
            }
        }
    }
    main_tx.send(AppMsg::Quit).ok();
}

fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("crono={}", config.log_level())));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    log::info!("Starting crono v{}", env!("CARGO_PKG_VERSION"));

    let (main_tx, main_rx) = mpsc::channel();
    let (pump_tx, pump_rx) = mpsc::channel();

    let pump_main_tx = main_tx.clone();
    thread::Builder::new()
        .name("pump".into())
        .spawn(move || pump_thread(pump_rx, pump_main_tx))
        .context("can't spawn pump thread")?;

    let input_main_tx = main_tx;
    thread::Builder::new()
        .name("input".into())
        .spawn(move || input_thread(input_main_tx))
        .context("can't spawn input thread")?;

    let mut app = CronoApp::new(&config, pump_tx);
    app.redraw();

    for msg in main_rx.iter() {
        match msg {
            AppMsg::Line(line) => app.handle_line(&line),
            AppMsg::Pump => app.handle_pump(),
            AppMsg::Quit => break,
        }
        if app.quit {
            break;
        }
    }

    app.shutdown();
    log::info!("crono exiting");
    Ok(())
}
