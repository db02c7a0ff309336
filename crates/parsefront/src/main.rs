//! Parsefront CLI - grammar entry selection and cached parsing from the
//! command line.
//!
//! Parses source files with the reference grammar, sharing one parse cache
//! across all files and repetitions of a run.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser as ClapParser, Subcommand};
use colored::Colorize;
use parsefront::config::CONFIG_FILE_NAME;
use parsefront::{ParseCache, Parser, ParserConfig, ReferenceGrammar, SourceKind};
use tracing_subscriber::EnvFilter;

mod cli;

use cli::fragment::FragmentArg;

/// Parsefront: grammar entry dispatch and parse caching.
#[derive(ClapParser)]
#[command(name = "parsefront")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file (defaults to ./parsefront.yaml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse source files, choosing the grammar from each file name
    Parse {
        /// Files to parse
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Parse without file identities, bypassing the cache
        #[arg(long)]
        no_cache: bool,

        /// Treat every file as precompiled (always the whole-file grammar)
        #[arg(long)]
        precompiled: bool,

        /// Print each syntax tree
        #[arg(long)]
        tree: bool,

        /// Print parse events as JSON
        #[arg(long)]
        json: bool,

        /// Parse the file set this many times (later rounds hit the cache)
        #[arg(long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
        repeat: u32,
    },

    /// Parse a code fragment from a fixed grammar entry
    Fragment {
        /// Grammar entry to start from
        #[arg(value_enum)]
        kind: FragmentArg,

        /// Fragment source text
        text: String,

        /// Print the syntax tree
        #[arg(long)]
        tree: bool,
    },

    /// Show which grammar entry a file name selects
    Select {
        /// File name or path
        file: String,

        /// Declare the file as precompiled
        #[arg(long)]
        precompiled: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = load_config(cli.config.as_deref()).and_then(|config| run(cli.command, &config));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {e}", "error".red().bold());
            // Show cause chain for nested errors
            for cause in e.chain().skip(1) {
                eprintln!("  {}: {cause}", "caused by".dimmed());
            }
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands, config: &ParserConfig) -> anyhow::Result<()> {
    let parser = Parser::from_config(
        Arc::new(ReferenceGrammar),
        Arc::new(ParseCache::new()),
        config,
    );

    match command {
        Commands::Parse {
            files,
            no_cache,
            precompiled,
            tree,
            json,
            repeat,
        } => {
            let options = cli::parse::ParseOptions {
                source_kind: source_kind(precompiled),
                use_cache: !no_cache,
                show_tree: tree,
                json,
                repeat,
            };
            cli::parse::run(&parser, &files, &options)
        }
        Commands::Fragment { kind, text, tree } => {
            cli::fragment::run(parser.engine().as_ref(), kind, &text, tree)
        }
        Commands::Select { file, precompiled } => {
            cli::select::run(parser.selector(), &file, source_kind(precompiled));
            Ok(())
        }
    }
}

fn source_kind(precompiled: bool) -> SourceKind {
    if precompiled {
        SourceKind::PrecompiledFile
    } else {
        SourceKind::RegularFile
    }
}

/// An explicit path must exist; the default file is optional.
fn load_config(path: Option<&Path>) -> anyhow::Result<ParserConfig> {
    if let Some(path) = path {
        return ParserConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()));
    }

    let default_path = Path::new(CONFIG_FILE_NAME);
    if default_path.is_file() {
        tracing::debug!(path = %default_path.display(), "loading default config");
        return ParserConfig::load(default_path)
            .with_context(|| format!("failed to load config from {}", default_path.display()));
    }

    Ok(ParserConfig::default())
}
