//! Command-line configuration

use clap::Parser;

use crate::alerts::AlertConfig;

const FALLBACK_FRAME_MS: u64 = 100;

#[derive(Parser, Debug)]
#[command(name = "crono")]
#[command(about = "Stopwatch, race timer and interval timer")]
#[command(version)]
pub struct Config {
    /// Do not ring the terminal bell when an interval ends
    #[arg(long)]
    pub no_bell: bool,

    /// Do not log a notification when an interval ends
    #[arg(long)]
    pub no_notify: bool,

    /// Refresh interval in milliseconds for the stopwatch and race clock
    #[arg(long, default_value = "50")]
    pub frame_ms: u64,

    /// Refresh interval in milliseconds for the interval timer
    #[arg(long, default_value = "100")]
    pub interval_frame_ms: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    pub fn parse() -> Self {
        Parser::parse()
    }

    pub fn alert_config(&self) -> AlertConfig {
        AlertConfig {
            audio: !self.no_bell,
            notification: !self.no_notify,
        }
    }

    pub fn clock_frame_ms(&self) -> u64 {
        non_zero_frame(self.frame_ms)
    }

    pub fn sequencer_frame_ms(&self) -> u64 {
        non_zero_frame(self.interval_frame_ms)
    }

    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}

fn non_zero_frame(ms: u64) -> u64 {
    if ms == 0 { FALLBACK_FRAME_MS } else { ms }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::try_parse_from(["crono"]).unwrap();
        assert_eq!(config.clock_frame_ms(), 50);
        assert_eq!(config.sequencer_frame_ms(), 100);
        assert!(config.alert_config().audio);
        assert_eq!(config.log_level(), "info");
    }

    #[test]
    fn zero_frame_falls_back() {
        let config = Config::try_parse_from(["crono", "--frame-ms", "0", "--no-bell", "-v"]).unwrap();
        assert_eq!(config.clock_frame_ms(), FALLBACK_FRAME_MS);
        assert!(!config.alert_config().audio);
        assert!(config.alert_config().notification);
        assert_eq!(config.log_level(), "debug");
    }
}
