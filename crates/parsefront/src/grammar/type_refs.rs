//! Type references: `a.b.Name<Args>?`

use super::MAX_DEPTH;
use crate::syntax::SyntaxKind;
use crate::tokens::TokenSource;

use SyntaxKind as K;

pub(super) fn type_reference(p: &mut TokenSource) {
    if p.depth() >= MAX_DEPTH {
        p.error_until("type nested too deeply", &[K::Comma, K::Gt, K::RParen]);
        return;
    }

    let checkpoint = p.checkpoint();
    p.start_node(K::TypeReference);
    if p.expect(K::Ident, "a type name") {
        while p.at(K::Dot) && p.nth(1) == K::Ident {
            p.bump();
            p.bump();
        }
        if p.at(K::Lt) {
            type_arguments(p);
        }
    }
    p.finish_node();

    while p.at(K::Quest) {
        p.start_node_at(checkpoint, K::NullableType);
        p.bump();
        p.finish_node();
    }
}

/// `<A, B?, *>`
fn type_arguments(p: &mut TokenSource) {
    p.start_node(K::TypeArgumentList);
    p.bump();
    p.with_newlines(false, |p| {
        loop {
            if !p.eat(K::Star) {
                type_reference(p);
            }
            if !p.eat(K::Comma) {
                break;
            }
        }
    });
    p.expect(K::Gt, "`>`");
    p.finish_node();
}
