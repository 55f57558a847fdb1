//! Display utilities for the DirMirror CLI

use console::style;
use dirmirror_sync::DiffTree;
use dirmirror_types::ReplicationStats;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

/// Print the pair being worked on
pub fn print_header(symbol: &str, verb: &str, source: &Path, destination: &Path) {
    println!(
        "{} {} {} → {}",
        style(symbol).green().bold(),
        verb,
        style(source.display()).cyan(),
        style(destination.display()).cyan()
    );
}

/// Print the diff tree followed by a one-line summary
pub fn print_diff(diff: &DiffTree, show_tree: bool) {
    println!();
    if show_tree {
        print!("{}", diff.root);
        println!();
    }
    println!("{}", style(summary_line(diff)).bold());
}

/// Status line describing a comparison result
pub fn summary_line(diff: &DiffTree) -> String {
    if diff.is_empty() {
        "No differences found. Directories are in sync.".to_string()
    } else {
        format!(
            "{} items missing from destination directory ({} files).",
            diff.item_count(),
            diff.missing_files
        )
    }
}

/// Print replication statistics
pub fn print_stats(operation: &str, stats: &ReplicationStats) {
    println!();
    println!("{}", style(format!("{} Statistics:", operation)).bold().underlined());
    println!("  Files processed: {}", style(stats.files_processed).green());
    println!(
        "  Directories created: {}",
        style(stats.directories_created).green()
    );
    println!(
        "  Skipped subtrees: {}",
        if stats.skipped.is_empty() {
            style(stats.skipped.len()).green()
        } else {
            style(stats.skipped.len()).yellow()
        }
    );
    for path in &stats.skipped {
        println!("    • {}", style(path.display()).dim());
    }
    println!(
        "  Duration: {}",
        style(format_duration(stats.duration)).blue()
    );
    println!(
        "  Rate: {}",
        style(format!("{:.1} files/s", stats.files_per_second())).blue()
    );
}

/// Spinner shown while a comparison runs
pub fn create_spinner(quiet: bool) -> Option<ProgressBar> {
    if quiet {
        return None;
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    Some(pb)
}

/// Bar shown while files are replicated
pub fn create_progress_bar(total: u64, quiet: bool) -> Option<ProgressBar> {
    if quiet {
        return None;
    }

    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{wide_bar:.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  "),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    Some(pb)
}

/// Format a duration as a short human readable string
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{:.2}s", duration.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
