//! Step-counting progress reporting.
//!
//! Generation declares its step count up front and advances once per
//! written variant plus once per closing phase. Reporters only observe.

use indicatif::{ProgressBar, ProgressStyle};

/// Sink for progress notifications.
pub trait Progress {
    /// Declare the total number of steps.
    fn set_steps(&mut self, steps: u64);

    /// Advance by one step, naming what was just done.
    fn next_step(&mut self, message: &str);

    /// Steps taken so far.
    fn position(&self) -> u64;

    /// Finish reporting.
    fn finish(&mut self) {}
}

/// Discards notifications but still counts steps.
#[derive(Debug, Default)]
pub struct SilentProgress {
    steps: u64,
    position: u64,
}

impl SilentProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }
}

impl Progress for SilentProgress {
    fn set_steps(&mut self, steps: u64) {
        self.steps = steps;
    }

    fn next_step(&mut self, message: &str) {
        self.position += 1;
        tracing::trace!("[{}/{}] {}", self.position, self.steps, message);
    }

    fn position(&self) -> u64 {
        self.position
    }
}

/// Terminal progress bar.
pub struct BarProgress {
    pb: ProgressBar,
    position: u64,
}

impl BarProgress {
    pub fn new() -> Self {
        let pb = ProgressBar::new(0);
        if let Ok(style) =
            ProgressStyle::default_bar().template("{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        BarProgress { pb, position: 0 }
    }
}

impl Default for BarProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl Progress for BarProgress {
    fn set_steps(&mut self, steps: u64) {
        self.pb.set_length(steps);
    }

    fn next_step(&mut self, message: &str) {
        self.position += 1;
        self.pb.set_message(message.to_string());
        self.pb.inc(1);
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn finish(&mut self) {
        self.pb.finish_and_clear();
    }
}
