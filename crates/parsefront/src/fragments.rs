//! Parsing code fragments from a fixed grammar entry.
//!
//! Fragments have no file behind them, so there is no identity to cache
//! under and no observer to report to. Every call runs the engine afresh:
//! two calls on identical input return structurally equal but independently
//! built trees.

use crate::engine::GrammarEngine;
use crate::syntax::SyntaxTree;
use crate::tokens::TokenSource;
use crate::types::Fragment;

/// Parse a lone type reference, e.g. `Map<String, Int?>`.
pub fn parse_type_fragment<E>(engine: &E, tokens: TokenSource) -> SyntaxTree
where
    E: GrammarEngine + ?Sized,
{
    parse_fragment(engine, Fragment::Type, tokens)
}

/// Parse a lone expression, e.g. `a + b * c`.
pub fn parse_expression_fragment<E>(engine: &E, tokens: TokenSource) -> SyntaxTree
where
    E: GrammarEngine + ?Sized,
{
    parse_fragment(engine, Fragment::Expression, tokens)
}

/// Parse statements without surrounding braces.
pub fn parse_block_fragment<E>(engine: &E, tokens: TokenSource) -> SyntaxTree
where
    E: GrammarEngine + ?Sized,
{
    parse_fragment(engine, Fragment::Block, tokens)
}

/// Parse a lambda literal, e.g. `{ a, b -> a + b }`.
pub fn parse_lambda_expression<E>(engine: &E, tokens: TokenSource) -> SyntaxTree
where
    E: GrammarEngine + ?Sized,
{
    parse_fragment(engine, Fragment::Lambda, tokens)
}

/// Parse a braced block.
pub fn parse_block_expression<E>(engine: &E, tokens: TokenSource) -> SyntaxTree
where
    E: GrammarEngine + ?Sized,
{
    parse_fragment(engine, Fragment::BlockExpression, tokens)
}

/// Parse `tokens` as `fragment`.
pub fn parse_fragment<E>(engine: &E, fragment: Fragment, tokens: TokenSource) -> SyntaxTree
where
    E: GrammarEngine + ?Sized,
{
    let entry = fragment.entry();
    tracing::trace!(entry = entry.as_str(), "parsing fragment");
    engine.run(entry, tokens)
}
