//! The grammar engine contract.
//!
//! An engine is a set of entry rules over a [`TokenSource`]. It never fails:
//! whatever it cannot make sense of it wraps in `ERROR` nodes and records as
//! a [`SyntaxError`](crate::SyntaxError), and it always leaves exactly one
//! tree behind. [`GrammarEngine::run`] opens the root for the entry, calls
//! the entry rule, and retrieves that tree, so implementations only write
//! the rules themselves.
//!
//! Engines are shared across threads by the facade, hence `Send + Sync`.
//! They hold no per-parse state; everything mutable lives in the token
//! source.

use crate::syntax::SyntaxTree;
use crate::tokens::TokenSource;
use crate::types::GrammarEntry;

/// A grammar that can start parsing from any [`GrammarEntry`].
pub trait GrammarEngine: Send + Sync {
    /// Whole source file.
    fn parse_file(&self, tokens: &mut TokenSource);

    /// Script file.
    fn parse_script(&self, tokens: &mut TokenSource);

    /// A lone type reference.
    fn parse_type_code_fragment(&self, tokens: &mut TokenSource);

    /// A lone expression.
    fn parse_expression_code_fragment(&self, tokens: &mut TokenSource);

    /// Statements without surrounding braces.
    fn parse_block_code_fragment(&self, tokens: &mut TokenSource);

    /// A lambda literal.
    fn parse_lambda_expression(&self, tokens: &mut TokenSource);

    /// A braced block.
    fn parse_block_expression(&self, tokens: &mut TokenSource);

    /// Run the rule for `entry` over `tokens` and return the one tree built.
    fn run(&self, entry: GrammarEntry, mut tokens: TokenSource) -> SyntaxTree {
        tokens.start_root(entry.root_kind());
        match entry {
            GrammarEntry::TopLevelFile => self.parse_file(&mut tokens),
            GrammarEntry::Script => self.parse_script(&mut tokens),
            GrammarEntry::TypeFragment => self.parse_type_code_fragment(&mut tokens),
            GrammarEntry::ExpressionFragment => self.parse_expression_code_fragment(&mut tokens),
            GrammarEntry::BlockFragment => self.parse_block_code_fragment(&mut tokens),
            GrammarEntry::LambdaExpression => self.parse_lambda_expression(&mut tokens),
            GrammarEntry::BlockExpression => self.parse_block_expression(&mut tokens),
        }
        tokens.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::SyntaxKind;

    /// Consumes nothing; every token should end up in the driver's
    /// leftover `ERROR` node.
    struct Lazy;

    impl GrammarEngine for Lazy {
        fn parse_file(&self, _: &mut TokenSource) {}
        fn parse_script(&self, _: &mut TokenSource) {}
        fn parse_type_code_fragment(&self, _: &mut TokenSource) {}
        fn parse_expression_code_fragment(&self, _: &mut TokenSource) {}
        fn parse_block_code_fragment(&self, _: &mut TokenSource) {}
        fn parse_lambda_expression(&self, _: &mut TokenSource) {}
        fn parse_block_expression(&self, _: &mut TokenSource) {}
    }

    #[test]
    fn run_roots_the_tree_at_the_entry_kind() {
        for entry in GrammarEntry::ALL {
            let tree = Lazy.run(entry, TokenSource::new(""));
            assert_eq!(tree.kind(), entry.root_kind());
            assert!(!tree.has_errors());
        }
    }

    #[test]
    fn run_keeps_unconsumed_input_lossless() {
        let tree = Lazy.run(GrammarEntry::Script, TokenSource::new("a + b\n"));

        assert_eq!(tree.text(), "a + b\n");
        assert_eq!(tree.errors().len(), 1);
        assert_eq!(
            tree.node_kinds(),
            vec![SyntaxKind::Script, SyntaxKind::Error]
        );
    }
}
