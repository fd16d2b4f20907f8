//! Liveness spinner for long scans.
//!
//! The spinner redraws on its own; enumerators report progress through
//! [`ScanProgress::tick`]. A watchdog thread stops the spinner when no tick
//! arrived for a while, so a stalled scan does not animate forever.

use driftkit::ScanProgress;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Spinner redraw interval
pub const TICK_INTERVAL: Duration = Duration::from_millis(200);
/// Idle time after which the spinner stops itself
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(10);

pub struct Heartbeat {
    bar: ProgressBar,
    ticks: Option<Sender<()>>,
    watchdog: Option<JoinHandle<()>>,
}

impl Heartbeat {
    /// Start a spinner. A hidden one still counts ticks.
    pub fn start(message: &str, visible: bool) -> Self {
        Self::with_timeout(message, visible, IDLE_TIMEOUT)
    }

    fn with_timeout(message: &str, visible: bool, timeout: Duration) -> Self {
        let bar = if visible {
            ProgressBar::new_spinner()
        } else {
            ProgressBar::hidden()
        };
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg} ({pos})") {
            bar.set_style(style);
        }
        bar.set_message(message.to_string());
        bar.enable_steady_tick(TICK_INTERVAL);

        let (tx, rx) = mpsc::channel();
        let watched = bar.clone();
        let watchdog = thread::spawn(move || watch(&rx, &watched, timeout));

        Self {
            bar,
            ticks: Some(tx),
            watchdog: Some(watchdog),
        }
    }

    /// Stop the spinner. Calling it again does nothing.
    pub fn stop(&mut self) {
        // Dropping the sender wakes the watchdog up.
        self.ticks.take();
        if self.watchdog.take().is_some_and(|watchdog| watchdog.join().is_err()) {
            log::debug!("Progress watchdog panicked");
        }
        if self.is_running() {
            self.bar.finish_and_clear();
        }
    }

    pub fn is_running(&self) -> bool {
        !self.bar.is_finished()
    }

    /// Ticks received so far
    pub fn count(&self) -> u64 {
        self.bar.position()
    }
}

impl ScanProgress for Heartbeat {
    fn tick(&self) {
        self.bar.inc(1);
        if let Some(ticks) = &self.ticks {
            let _ = ticks.send(());
        }
    }
}

impl Drop for Heartbeat {
    fn drop(&mut self) {
        self.stop();
    }
}

fn watch(ticks: &Receiver<()>, bar: &ProgressBar, timeout: Duration) {
    loop {
        match ticks.recv_timeout(timeout) {
            Ok(()) => {}
            Err(RecvTimeoutError::Timeout) => {
                log::debug!("Progress did not receive any tic. Stopping...");
                bar.finish_and_clear();
                return;
            }
            Err(RecvTimeoutError::Disconnected) => return,
        }
    }
}
