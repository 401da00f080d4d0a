//! Terminal output formatting with rich UI support.

use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Prints a success message.
pub fn success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

/// Prints an error message.
pub fn error(message: &str) {
    eprintln!("{} {}", style("✗").red().bold(), message);
}

/// Prints an info message.
pub fn info(message: &str) {
    println!("{} {}", style("ℹ").blue().bold(), message);
}

/// Creates a spinner for a running pipeline stage.
pub fn stage_spinner(label: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .expect("Invalid spinner template"),
    );
    spinner.set_message(format!("{} {}", style("▶").cyan(), label));
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Finishes a stage spinner with success.
pub fn spinner_success(spinner: &ProgressBar, message: &str) {
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{msg}")
            .expect("Invalid spinner template"),
    );
    spinner.finish_with_message(format!("{} {}", style("✓").green(), message));
}

/// Finishes a stage spinner with failure.
pub fn spinner_failure(spinner: &ProgressBar, message: &str) {
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{msg}")
            .expect("Invalid spinner template"),
    );
    spinner.finish_with_message(format!("{} {}", style("✗").red(), message));
}

/// Finishes a stage spinner with skip status.
pub fn spinner_skipped(spinner: &ProgressBar, message: &str) {
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{msg}")
            .expect("Invalid spinner template"),
    );
    spinner.finish_with_message(format!(
        "{} {} {}",
        style("○").dim(),
        style(message).dim(),
        style("(skipped)").dim()
    ));
}

/// Prints a summary of the run.
pub fn summary(success: bool, detail: &str, duration_ms: u64) {
    println!();

    if success {
        println!(
            "{}: {} in {}ms",
            style("SUCCESS").green().bold(),
            detail,
            duration_ms
        );
    } else {
        println!(
            "{}: {} in {}ms",
            style("FAILED").red().bold(),
            detail,
            duration_ms
        );
    }
}
