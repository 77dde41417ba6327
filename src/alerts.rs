use std::io::{self, Write};

#[derive(Clone, Debug)]
pub struct AlertConfig {
    pub audio: bool,
    pub notification: bool,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            audio: true,
            notification: true,
        }
    }
}

/// Best-effort cue fired when an interval stage completes.
pub trait Notifier {
    fn cue(&self, message: &str) -> io::Result<()>;
}

pub struct TerminalNotifier {
    config: AlertConfig,
}

impl TerminalNotifier {
    pub fn new(config: AlertConfig) -> Self {
        Self { config }
    }
}

impl Notifier for TerminalNotifier {
    fn cue(&self, message: &str) -> io::Result<()> {
        if self.config.notification {
            log::info!("{}", message);
        }
        if self.config.audio {
            let mut out = io::stdout().lock();
            out.write_all(b"\x07")?;
            out.flush()?;
        }
        Ok(())
    }
}

/// Fires a cue and swallows any failure. Timing never depends on the result.
pub fn fire_cue(notifier: &dyn Notifier, message: &str) {
    if let Err(e) = notifier.cue(message) {
        log::warn!("cue failed: {}", e);
    }
}
