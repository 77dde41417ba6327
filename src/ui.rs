use std::fmt::Write as _;
use std::io::{self, Write};

use timer_core::{format_mm_ss, format_mm_ss_mmm, format_signed_mm_ss_mmm};

use crate::intervals::{IntervalStage, IntervalState};
use crate::race::{RaceStage, RaceState};
use crate::stopwatch::{StopwatchStage, StopwatchState};

const CLEAR: &str = "\x1b[2J\x1b[H";
const BAR_WIDTH: usize = 30;
const MODES: [&str; 3] = ["Stopwatch", "Race", "Intervals"];

/// Writes a full frame, replacing whatever was on screen.
pub fn present(frame: &str) -> io::Result<()> {
    let mut out = io::stdout().lock();
    out.write_all(CLEAR.as_bytes())?;
    out.write_all(frame.as_bytes())?;
    out.flush()
}

fn bar(pct: u8) -> String {
    let filled = BAR_WIDTH * pct as usize / 100;
    format!("[{}{}] {:3}%", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled), pct)
}

pub fn draw_help(help_text: &str) -> String {
    format!("{}\n\nPress Enter to close\n", help_text)
}

pub fn draw_mode_select() -> String {
    let mut s = String::from("CRONO\n\n");
    for (i, name) in MODES.iter().enumerate() {
        writeln!(s, "  {}  {}", i + 1, name).ok();
    }
    s.push_str("\n1-3=open  h=help  q=quit\n");
    s
}

pub fn draw_stopwatch(state: &StopwatchState, now_ms: u64) -> String {
    let mut s = String::from("STOPWATCH\n\n");
    writeln!(s, "    {}", format_mm_ss_mmm(state.elapsed_ms(now_ms))).ok();
    let status = match state.stage() {
        StopwatchStage::Running => "Running",
        StopwatchStage::Idle if state.elapsed_ms(now_ms) > 0 => "Paused",
        StopwatchStage::Idle => "Ready",
    };
    writeln!(s, "    {}\n", status).ok();

    let rows = state.lap_rows();
    if !rows.is_empty() {
        writeln!(s, "  {:>4}  {:>10}  {:>10}  {:>11}", "#", "Total", "Lap", "Delta").ok();
        // newest first
        for row in rows.iter().rev() {
            let delta = if row.number == 1 {
                "—".to_string()
            } else {
                format_signed_mm_ss_mmm(row.delta_ms)
            };
            writeln!(
                s,
                "  {:>4}  {:>10}  {:>10}  {:>11}",
                format!("#{}", row.number),
                format_mm_ss_mmm(row.total_ms),
                format_mm_ss_mmm(row.split_ms),
                delta,
            )
            .ok();
        }
        s.push('\n');
    }
    s.push_str("Enter=start/pause  l=lap  r=reset  h=help  q=back\n");
    s
}

pub fn draw_race(state: &RaceState, now_ms: u64) -> String {
    let mut s = String::from("RACE\n\n");
    match state.stage {
        RaceStage::Setup => {
            writeln!(s, "  Competitors: {}\n", state.count()).ok();
            for (i, name) in state.names().iter().enumerate() {
                writeln!(s, "  Pos {:>3}  {}", i + 1, name).ok();
            }
            s.push_str("\nc <n>=count  n <pos> <name>=rename  Enter=confirm  q=back\n");
        }
        RaceStage::Ready => {
            writeln!(s, "  Competitors ready: {}", state.count()).ok();
            writeln!(s, "    {}\n", format_mm_ss_mmm(0)).ok();
            writeln!(s, "  Next to finish: {}\n", state.next_competitor()).ok();
            s.push_str("Enter=start  r=edit roster  q=back\n");
        }
        RaceStage::Running | RaceStage::Done => {
            writeln!(s, "    {}\n", format_mm_ss_mmm(state.elapsed_ms(now_ms))).ok();
            if state.stage == RaceStage::Done {
                writeln!(s, "  Race finished ({} arrivals recorded)", state.count()).ok();
            } else {
                writeln!(
                    s,
                    "  Arrivals: {} / {}   Next: {}",
                    state.finishes().len(),
                    state.count(),
                    state.next_competitor()
                )
                .ok();
            }
            s.push('\n');
            let rows = state.rows();
            if !rows.is_empty() {
                writeln!(s, "  {:>4}  {:<20}  {:>10}  {:>11}", "#", "Competitor", "Time", "Gap").ok();
                for row in &rows {
                    let gap = if row.position == 1 {
                        "—".to_string()
                    } else {
                        format!("+{}", format_mm_ss_mmm(row.gap_ms))
                    };
                    writeln!(
                        s,
                        "  {:>4}  {:<20}  {:>10}  {:>11}",
                        row.position,
                        row.competitor,
                        format_mm_ss_mmm(row.elapsed_ms),
                        gap,
                    )
                    .ok();
                }
                s.push('\n');
            }
            match state.stage {
                RaceStage::Done => s.push_str("r=reset  q=back\n"),
                _ if state.clock_running() => s.push_str("Enter=next position  s=stop  r=reset  q=back\n"),
                _ => s.push_str("Enter=start  r=reset  q=back\n"),
            }
        }
    }
    s
}

pub fn draw_intervals(state: &IntervalState, now_ms: u64) -> String {
    let mut s = String::from("INTERVALS\n\n");
    if state.stage == IntervalStage::Editing {
        for (i, entry) in state.entries.iter().enumerate() {
            writeln!(s, "  {:>2}  {:<20}  {}", i + 1, entry.label, format_mm_ss(entry.duration_ms)).ok();
        }
        writeln!(s, "\n  Total programmed: {}\n", format_mm_ss(state.total_ms())).ok();
        s.push_str("a=add  x <n>=remove  n <n> <label>=rename  d <n> <MM:SS>=duration\n");
        s.push_str("Enter=start  q=back\n");
        return s;
    }

    writeln!(s, "  Current: {}", state.current_label().unwrap_or("—")).ok();
    writeln!(s, "    {}", format_mm_ss(state.remaining_ms(now_ms))).ok();
    writeln!(s, "  {}", bar(state.current_progress_pct(now_ms))).ok();
    writeln!(s, "  Next: {}", state.next_label()).ok();
    writeln!(s, "  {}\n", bar(state.overall_progress_pct(now_ms))).ok();

    match state.stage {
        IntervalStage::Running => s.push_str("Enter=pause  r=reset  q=back\n"),
        IntervalStage::Paused => s.push_str("Enter=resume  t=restart interval  r=reset  q=back\n"),
        _ => s.push_str("Finished.  r=reset  q=back\n"),
    }
    s
}
