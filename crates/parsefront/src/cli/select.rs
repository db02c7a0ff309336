//! `parsefront select` command implementation.

use colored::Colorize;
use parsefront::selector::extension;
use parsefront::{Selector, SourceKind};

/// Run the select command.
pub fn run(selector: &Selector, file: &str, source_kind: SourceKind) {
    let entry = selector.select(file, source_kind);
    let ext = extension(file).unwrap_or("(none)");

    println!("{} {}", entry.to_string().cyan().bold(), file);
    println!("  {}: {}", "Extension".dimmed(), ext);
    println!(
        "  {}: {}",
        "Canonical".dimmed(),
        selector.canonical_extension()
    );
    if source_kind == SourceKind::PrecompiledFile {
        println!("  {}", "Declared precompiled".dimmed());
    }
}
