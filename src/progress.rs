// src/progress.rs

//! Progress reporting for registry queries
//!
//! Building the package record table issues one `npm info` per direct
//! dependency, which can take a while on large projects. The
//! `ProgressTracker` trait lets the caller choose how that is shown:
//! - `CliProgress`: indicatif progress bar for interactive terminals
//! - `LogProgress`: periodic tracing events (used with --debug)
//! - `SilentProgress`: no output

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Core trait for progress tracking
pub trait ProgressTracker {
    /// Set the current status message
    fn set_message(&self, message: &str);

    /// Increment progress by the given amount
    fn increment(&self, amount: u64);

    /// Set the total (length) of the progress
    fn set_length(&self, length: u64);

    /// Finish progress successfully with a message
    fn finish_with_message(&self, message: &str);

    /// Finish progress with an error/abandonment message
    fn finish_with_error(&self, message: &str);
}

/// Silent progress tracker (no-op)
#[derive(Debug, Default)]
pub struct SilentProgress;

impl SilentProgress {
    pub fn new() -> Self {
        Self
    }
}

impl ProgressTracker for SilentProgress {
    fn set_message(&self, _message: &str) {}

    fn increment(&self, _amount: u64) {}

    fn set_length(&self, _length: u64) {}

    fn finish_with_message(&self, _message: &str) {}

    fn finish_with_error(&self, _message: &str) {}
}

/// Logging progress tracker
///
/// Emits an info event for every message and at roughly every tenth of the
/// total, so debug logs are not interleaved with a redrawn progress bar.
#[derive(Debug)]
pub struct LogProgress {
    name: String,
    position: AtomicU64,
    length: AtomicU64,
}

impl LogProgress {
    pub fn new(name: impl Into<String>, length: u64) -> Self {
        Self {
            name: name.into(),
            position: AtomicU64::new(0),
            length: AtomicU64::new(length),
        }
    }

    fn log_interval(&self) -> u64 {
        std::cmp::max(1, self.length.load(Ordering::Relaxed) / 10)
    }
}

impl ProgressTracker for LogProgress {
    fn set_message(&self, message: &str) {
        info!("{}: {}", self.name, message);
    }

    fn increment(&self, amount: u64) {
        let old_pos = self.position.fetch_add(amount, Ordering::Relaxed);
        let new_pos = old_pos + amount;
        let length = self.length.load(Ordering::Relaxed);
        let interval = self.log_interval();

        if length > 0 && new_pos / interval > old_pos / interval {
            info!("{}: {}/{}", self.name, new_pos, length);
        }
    }

    fn set_length(&self, length: u64) {
        self.length.store(length, Ordering::Relaxed);
    }

    fn finish_with_message(&self, message: &str) {
        info!("{}: {}", self.name, message);
    }

    fn finish_with_error(&self, message: &str) {
        info!("{}: ERROR - {}", self.name, message);
    }
}

/// Terminal progress bar
pub struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    pub fn new(operation: &str, length: u64) -> Self {
        let bar = ProgressBar::new(length);
        let style = ProgressStyle::default_bar()
            .template("{msg:40!} ({pos}/{len}) [{bar:30.green/dim}]")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-");
        bar.set_style(style);
        bar.set_message(operation.to_string());
        Self { bar }
    }
}

impl ProgressTracker for CliProgress {
    fn set_message(&self, message: &str) {
        self.bar.set_message(message.to_string());
    }

    fn increment(&self, amount: u64) {
        self.bar.inc(amount);
    }

    fn set_length(&self, length: u64) {
        self.bar.set_length(length);
    }

    fn finish_with_message(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }

    fn finish_with_error(&self, message: &str) {
        self.bar.abandon_with_message(format!("ERROR: {}", message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_progress_counts_and_resizes() {
        let progress = LogProgress::new("npm info", 4);

        progress.increment(1);
        progress.increment(1);
        assert_eq!(progress.position.load(Ordering::Relaxed), 2);
        assert_eq!(progress.log_interval(), 1);

        progress.set_length(40);
        assert_eq!(progress.log_interval(), 4);
        progress.finish_with_error("registry unreachable");
    }

    #[test]
    fn test_cli_progress_hidden_target() {
        let progress = CliProgress::new("Querying", 3);
        progress.bar.set_draw_target(indicatif::ProgressDrawTarget::hidden());

        progress.set_length(5);
        progress.increment(2);
        assert_eq!(progress.bar.position(), 2);
        assert_eq!(progress.bar.length(), Some(5));

        progress.finish_with_message("done");
        assert!(progress.bar.is_finished());
    }
}
