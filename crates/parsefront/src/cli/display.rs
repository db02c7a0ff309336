//! Common display utilities for CLI commands.

use std::time::Duration;

use colored::Colorize;
use parsefront::{CacheStatus, ParseEvent, SyntaxTree};

const MAX_DISPLAY_ITEMS: usize = 10;

/// Display the syntax errors of `tree` with optional truncation.
///
/// Shows up to `MAX_DISPLAY_ITEMS` errors with bullet points. If there are
/// more, shows "... and N more".
pub fn print_syntax_errors(tree: &SyntaxTree) {
    let errors = tree.errors();
    for error in errors.iter().take(MAX_DISPLAY_ITEMS) {
        println!("    {} {}", "•".red(), error);
    }

    if errors.len() > MAX_DISPLAY_ITEMS {
        println!(
            "    {} ... and {} more",
            "•".dimmed(),
            errors.len() - MAX_DISPLAY_ITEMS
        );
    }
}

/// Print the tree indented under its summary line.
pub fn print_tree(tree: &SyntaxTree) {
    for line in tree.debug_tree().lines() {
        println!("    {}", line.dimmed());
    }
}

/// Colored cache status label.
pub fn status_label(status: CacheStatus) -> String {
    match status {
        CacheStatus::Hit => status.as_str().green().to_string(),
        CacheStatus::Miss => status.as_str().yellow().to_string(),
    }
}

/// Milliseconds with two decimals, or `-` when nothing was timed.
pub fn format_elapsed(elapsed: Option<Duration>) -> String {
    elapsed.map_or_else(
        || "-".to_string(),
        |elapsed| format!("{:.2}ms", elapsed.as_secs_f64() * 1000.0),
    )
}

/// One JSON object per event, for `--json` output.
pub fn event_json(
    path: &str,
    round: u32,
    event: &ParseEvent,
    tree: &SyntaxTree,
) -> serde_json::Value {
    let entry = event.entry.map(|entry| entry.as_str());
    let elapsed_ms = event
        .elapsed
        .map(|elapsed| elapsed.as_secs_f64() * 1000.0);
    let errors: Vec<String> = tree.errors().iter().map(ToString::to_string).collect();

    serde_json::json!({
        "path": path,
        "round": round,
        "file_name": event.file_name,
        "entry": entry,
        "status": event.status.as_str(),
        "elapsed_ms": elapsed_ms,
        "content_changed": event.content_changed,
        "root": format!("{:?}", tree.kind()),
        "errors": errors,
    })
}
