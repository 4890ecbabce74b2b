use std::time::Duration;

use fileledger::{ProgressReporter, RunResults};
use indicatif::{ProgressBar, ProgressStyle};

/// Terminal progress reporter: a single 0–100 bar with the current item name
/// as the message.
pub struct TermReporter {
    bar: ProgressBar,
}

impl TermReporter {
    pub fn new() -> Self {
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::with_template(
                "  {spinner:.cyan} [{bar:30.cyan/dim}] {pos:>3}% {wide_msg}",
            )
            .unwrap()
            .progress_chars("━╸─")
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        bar.enable_steady_tick(Duration::from_millis(80));
        Self { bar }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressReporter for TermReporter {
    fn on_progress(&self, percent: u8, current_item: &str) {
        self.bar.set_position(u64::from(percent));
        if !current_item.is_empty() {
            self.bar.set_message(format!("Processing: {current_item}"));
        }
    }

    fn on_complete(&self, _results: &RunResults) {
        self.bar.set_position(100);
    }
}
