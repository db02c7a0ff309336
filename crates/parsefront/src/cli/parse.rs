//! `parsefront parse` command implementation.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use colored::Colorize;
use parsefront::{CacheStatus, ParseRequest, Parsed, Parser, SourceKind, TokenSource};
use rayon::prelude::*;

use super::display;

/// Flags for the parse command.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Declared kind of every file.
    pub source_kind: SourceKind,
    /// Key files by canonical path; when off, parses are anonymous.
    pub use_cache: bool,
    /// Print each tree.
    pub show_tree: bool,
    /// Print JSON events instead of the human summary.
    pub json: bool,
    /// Number of passes over the file set.
    pub repeat: u32,
}

/// Run the parse command.
///
/// Files within a round are parsed in parallel through the shared parser.
pub fn run(parser: &Parser, files: &[PathBuf], options: &ParseOptions) -> anyhow::Result<()> {
    let start = Instant::now();
    let mut json_events = Vec::new();
    let mut hits = 0usize;
    let mut misses = 0usize;
    let mut files_with_errors = 0usize;

    for round in 1..=options.repeat {
        let results: Vec<anyhow::Result<Parsed>> = files
            .par_iter()
            .map(|path| parse_one(parser, path, options))
            .collect();

        if !options.json && options.repeat > 1 {
            println!("{} {round}", "Round".cyan().bold());
        }

        let last_round = round == options.repeat;
        for (path, result) in files.iter().zip(results) {
            let parsed = result?;
            match parsed.event.status {
                CacheStatus::Hit => hits += 1,
                CacheStatus::Miss => misses += 1,
            }
            if last_round && parsed.tree.has_errors() {
                files_with_errors += 1;
            }

            if options.json {
                let path = path.display().to_string();
                json_events.push(display::event_json(&path, round, &parsed.event, &parsed.tree));
            } else {
                print_result(path, &parsed, options.show_tree && round == 1);
            }
        }
    }

    if options.json {
        let output = serde_json::to_string_pretty(&json_events)
            .context("failed to serialize parse events")?;
        println!("{output}");
    } else {
        println!();
        println!(
            "{} {} files ({} misses, {} hits) in {:.2?}",
            "Parsed".green().bold(),
            files.len(),
            misses,
            hits,
            start.elapsed()
        );
        println!("{}: {}", "Cached trees".dimmed(), parser.cache().len());
    }

    if files_with_errors > 0 {
        anyhow::bail!("{files_with_errors} file(s) contain syntax errors");
    }
    Ok(())
}

fn parse_one(parser: &Parser, path: &Path, options: &ParseOptions) -> anyhow::Result<Parsed> {
    if options.use_cache {
        return parser
            .parse_path(path, options.source_kind)
            .with_context(|| format!("failed to parse {}", path.display()));
    }

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map_or_else(String::new, |name| name.to_string_lossy().into_owned());
    let request = ParseRequest::anonymous(file_name).with_source_kind(options.source_kind);
    Ok(parser.parse_detailed(&request, TokenSource::new(text)))
}

fn print_result(path: &Path, parsed: &Parsed, show_tree: bool) {
    let marker = if parsed.tree.has_errors() {
        "✗".red()
    } else {
        "✓".green()
    };
    println!(
        "  {} {} {} {:?} {}",
        marker,
        path.display().to_string().white().bold(),
        display::status_label(parsed.event.status),
        parsed.tree.kind(),
        display::format_elapsed(parsed.event.elapsed).dimmed()
    );

    if parsed.tree.has_errors() {
        display::print_syntax_errors(&parsed.tree);
    }
    if show_tree {
        display::print_tree(&parsed.tree);
    }
}
