//! Terminal feedback: scan spinner, status lines, styled labels.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::confidence::Verdict;
use crate::proposal::RiskLevel;

/// Spinner shown while the repository is scanned.
pub struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    /// Create a new spinner with a message
    pub fn new(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        let tick_style = ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        bar.set_style(
            tick_style
                .clone()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or(tick_style),
        );
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));
        Self { bar }
    }

    pub fn set_message(&self, message: &str) {
        self.bar.set_message(message.to_string());
    }

    /// Clear the spinner and print a green check line (stderr).
    pub fn finish_success(&self, message: &str) {
        self.bar.finish_and_clear();
        eprintln!("{} {}", style("✓").green().bold(), message);
    }

    pub fn finish_error(&self, message: &str) {
        self.bar.finish_and_clear();
        eprintln!("{} {}", style("✗").red().bold(), message);
    }

    pub fn finish_clear(&self) {
        self.bar.finish_and_clear();
    }
}

pub fn success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

pub fn info(message: &str) {
    println!("{} {}", style("ℹ").blue().bold(), message);
}

pub fn warning(message: &str) {
    println!("{} {}", style("⚠").yellow().bold(), message);
}

pub fn error(message: &str) {
    eprintln!("{} {}", style("✗").red().bold(), message);
}

/// Risk label colored by severity.
pub fn risk_label(risk: RiskLevel) -> String {
    let label = style(risk.label());
    match risk {
        RiskLevel::Low => label.green(),
        RiskLevel::Medium => label.yellow(),
        RiskLevel::High => label.red().bold(),
    }
    .to_string()
}

pub fn verdict_label(verdict: Verdict) -> String {
    let label = style(verdict.label());
    match verdict {
        Verdict::High => label.green().bold(),
        Verdict::Medium => label.yellow().bold(),
        Verdict::Low => label.red().bold(),
    }
    .to_string()
}

/// Format duration in human-readable form
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs < 1.0 {
        format!("{:.0}ms", secs * 1000.0)
    } else if secs < 60.0 {
        format!("{:.2}s", secs)
    } else {
        format!("{:.1}m", secs / 60.0)
    }
}

/// Format a count with proper singular/plural
pub fn format_count(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}
