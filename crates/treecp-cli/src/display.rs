//! Terminal output for treecp runs

use console::style;
use std::time::Duration;
use treecp_engine::CopyReport;
use treecp_types::{Failure, Summary};

/// Print the run statistics followed by any failures
pub fn print_report(report: &CopyReport) {
    let summary = &report.summary;

    println!();
    println!("{}", style("Copy Statistics:").bold().underlined());
    println!("  Files copied: {}", style(summary.files_copied).green());
    println!(
        "  Directories created: {}",
        style(summary.directories_created).green()
    );
    println!(
        "  Bytes copied: {}",
        style(format_bytes(summary.bytes_copied)).green()
    );
    println!("  Files skipped: {}", style(summary.files_skipped).yellow());
    println!(
        "  Failures: {}",
        if summary.failure_count() > 0 {
            style(summary.failure_count()).red()
        } else {
            style(0).green()
        }
    );
    println!(
        "  Parallel listings: {}",
        style(report.parallel_listings).dim()
    );
    println!("  Duration: {}", style(format_duration(report.duration)).cyan());
    if report.summary.bytes_copied > 0 {
        println!(
            "  Throughput: {}/s",
            style(format_bytes(report.throughput() as u64)).cyan()
        );
    }

    print_failures(summary);

    println!();
    if report.is_success() {
        println!("{} Copy completed", style("✓").green().bold());
    } else {
        println!(
            "{} Copy completed with {} failure(s)",
            style("!").yellow().bold(),
            summary.failure_count()
        );
    }
}

/// Print per-unit and listing failures to stderr
pub fn print_failures(summary: &Summary) {
    print_failure_list("Failed units", &summary.failures);
    print_failure_list("Unreadable directories", &summary.listing_failures);
}

fn print_failure_list(title: &str, failures: &[Failure]) {
    if failures.is_empty() {
        return;
    }

    eprintln!();
    eprintln!("{}", style(format!("{title}:")).red().bold());
    for failure in failures {
        eprintln!(
            "  {} {}: {}",
            style("✗").red(),
            failure.path.display(),
            style(&failure.error).dim()
        );
    }
}

/// Print an error that ended the run
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("✗").red().bold(), style(message).red());
}

/// Format a byte count with binary units
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];

    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{bytes} {}", UNITS[0])
    } else {
        format!("{size:.2} {}", UNITS[unit])
    }
}

/// Format a duration for humans
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    if total >= 3600 {
        format!("{}h {}m {}s", total / 3600, (total % 3600) / 60, total % 60)
    } else if total >= 60 {
        format!("{}m {}s", total / 60, total % 60)
    } else {
        format!("{:.2}s", duration.as_secs_f64())
    }
}
