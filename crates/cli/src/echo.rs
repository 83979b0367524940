use owo_colors::OwoColorize;
use tldw_core::{BatchReport, StructuredSummary};

use crate::VERSION;

/// Print a styled banner for verbose mode
pub fn print_banner() {
    eprintln!("\n{} {} {}", "tldw".bold().bright_blue(), "v".dimmed(), VERSION.dimmed());
    eprintln!("{}", "Structured summaries for long videos\n".dimmed());
}

/// Print a styled step message
pub fn print_step(step: usize, total: usize, message: &str) {
    eprintln!("{} {}", format!("[{}/{}]", step, total).dimmed(), message.bright_cyan());
}

/// Print a success message
pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green(), message.bright_green());
}

/// Print an info message
pub fn print_info(message: &str) {
    eprintln!("{} {}", "ℹ".blue(), message.bright_blue());
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message.bright_yellow());
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message.bright_red());
}

/// One-line shape of a validated summary
pub fn print_summary_shape(summary: &StructuredSummary) {
    print_success(&format!(
        "Summary validated: tldr={} chars, ideas={}, insights={}",
        summary.tldr.chars().count(),
        summary.ideas.len(),
        summary.insights.len()
    ));
}

/// Print the per-document results of a batch
pub fn print_batch_report(report: &BatchReport) {
    for id in &report.updated {
        print_success(&format!("Updated {}", id.bright_white()));
    }
    for (id, reason) in &report.skipped {
        eprintln!("  {} {} ({})", "-".dimmed(), id.dimmed(), reason.to_string().dimmed());
    }
    for (id, error) in &report.failed {
        print_error(&format!("{}: {}", id, error));
    }

    eprintln!("\n{}", "═".repeat(60).dimmed());
    eprintln!(
        "  {} {}  {} {}  {} {}\n",
        "Updated:".dimmed(),
        report.updated.len().to_string().bright_white(),
        "Skipped:".dimmed(),
        report.skipped.len().to_string().bright_white(),
        "Failed:".dimmed(),
        report.failed.len().to_string().bright_white()
    );
}
