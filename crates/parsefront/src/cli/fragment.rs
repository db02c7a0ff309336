//! `parsefront fragment` command implementation.

use clap::ValueEnum;
use colored::Colorize;
use parsefront::{Fragment, GrammarEngine, TokenSource, fragments};

use super::display;

/// Fragment kinds accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FragmentArg {
    /// A type reference
    Type,
    /// An expression
    Expression,
    /// Statements without braces
    Block,
    /// A lambda literal
    Lambda,
    /// A braced block
    BlockExpression,
}

impl From<FragmentArg> for Fragment {
    fn from(arg: FragmentArg) -> Self {
        match arg {
            FragmentArg::Type => Self::Type,
            FragmentArg::Expression => Self::Expression,
            FragmentArg::Block => Self::Block,
            FragmentArg::Lambda => Self::Lambda,
            FragmentArg::BlockExpression => Self::BlockExpression,
        }
    }
}

/// Run the fragment command.
pub fn run(
    engine: &dyn GrammarEngine,
    kind: FragmentArg,
    text: &str,
    show_tree: bool,
) -> anyhow::Result<()> {
    let fragment = Fragment::from(kind);
    let tree = fragments::parse_fragment(engine, fragment, TokenSource::new(text));

    println!(
        "{} {} as {:?}",
        "Parsed".green().bold(),
        fragment.entry(),
        tree.kind()
    );
    if show_tree {
        display::print_tree(&tree);
    }

    if tree.has_errors() {
        println!();
        println!("{} ({}):", "Errors".red().bold(), tree.errors().len());
        display::print_syntax_errors(&tree);
        anyhow::bail!("fragment contains syntax errors");
    }
    Ok(())
}
