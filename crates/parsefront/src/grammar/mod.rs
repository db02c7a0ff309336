//! Reference grammar engine for a Kotlin-flavoured language subset.
//!
//! The facade and fragment entry points work with any [`GrammarEngine`];
//! this one exists so they can be exercised end to end. It covers:
//!
//! - `package` and `import` directives
//! - `fun`, `val`/`var` and `class` declarations
//! - statements separated by newlines or `;`
//! - binary and prefix operators, calls, member access, parentheses
//! - `if`/`else`, `return`, literals
//! - lambdas (`{ a, b -> a + b }`) and blocks
//! - nullable and generic type references
//!
//! ## Error Recovery
//!
//! Rules never fail. An unexpected token is wrapped in an `ERROR` node and
//! reported; a missing token is reported without consuming anything, leaving
//! the caller to carry on. Nesting beyond [`MAX_DEPTH`] open nodes is
//! swallowed into one `ERROR` node instead of being recursed into.

mod declarations;
mod expressions;
mod type_refs;

use crate::engine::GrammarEngine;
use crate::syntax::SyntaxKind;
use crate::tokens::TokenSource;

use SyntaxKind as K;

/// Open nodes beyond which rules stop recursing.
pub(crate) const MAX_DEPTH: usize = 256;

/// The built-in grammar engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReferenceGrammar;

impl GrammarEngine for ReferenceGrammar {
    fn parse_file(&self, p: &mut TokenSource) {
        declarations::preamble(p);
        while !p.at_end() {
            if p.eat(K::Semicolon) {
                continue;
            }
            if declarations::at_declaration(p) {
                declarations::declaration(p);
            } else {
                p.error_until(
                    "expected a top-level declaration",
                    declarations::DECLARATION_START,
                );
            }
        }
    }

    fn parse_script(&self, p: &mut TokenSource) {
        declarations::preamble(p);
        p.start_node(K::Block);
        statements(p, None);
        p.finish_node();
    }

    fn parse_type_code_fragment(&self, p: &mut TokenSource) {
        type_refs::type_reference(p);
    }

    fn parse_expression_code_fragment(&self, p: &mut TokenSource) {
        p.with_newlines(false, expressions::expression);
    }

    fn parse_block_code_fragment(&self, p: &mut TokenSource) {
        p.start_node(K::Block);
        statements(p, None);
        p.finish_node();
    }

    fn parse_lambda_expression(&self, p: &mut TokenSource) {
        if p.at(K::LBrace) {
            expressions::lambda(p);
        } else {
            p.error("expected a lambda expression");
        }
    }

    fn parse_block_expression(&self, p: &mut TokenSource) {
        if p.at(K::LBrace) {
            block(p);
        } else {
            p.error("expected `{`");
        }
    }
}

/// Statements until `terminator` (not consumed) or the end of input.
fn statements(p: &mut TokenSource, terminator: Option<SyntaxKind>) {
    let at_terminator = |p: &TokenSource| terminator.is_some_and(|kind| p.at(kind));
    p.with_newlines(true, |p| {
        loop {
            while p.eat(K::Semicolon) {}
            if p.at_end() || at_terminator(p) {
                break;
            }

            let before = p.position();
            statement(p);
            if p.position() == before {
                // Already reported by the rule that gave up.
                p.start_node(K::Error);
                p.bump();
                p.finish_node();
                continue;
            }

            if !p.at_end()
                && !p.at(K::Semicolon)
                && !at_terminator(p)
                && !p.newline_before_current()
            {
                p.error("expected a newline or `;` between statements");
            }
        }
    });
}

fn statement(p: &mut TokenSource) {
    if declarations::at_declaration(p) {
        declarations::declaration(p);
    } else {
        expressions::expression(p);
    }
}

/// `{ statements }`
fn block(p: &mut TokenSource) {
    p.start_node(K::Block);
    p.expect(K::LBrace, "`{`");
    statements(p, Some(K::RBrace));
    p.expect(K::RBrace, "`}`");
    p.finish_node();
}
