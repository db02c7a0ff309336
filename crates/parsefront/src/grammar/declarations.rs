//! Directives and declarations.

use super::{MAX_DEPTH, block, expressions, type_refs};
use crate::syntax::SyntaxKind;
use crate::tokens::TokenSource;

use SyntaxKind as K;

/// Tokens that can start a declaration.
pub(super) const DECLARATION_START: &[SyntaxKind] = &[K::FunKw, K::ValKw, K::VarKw, K::ClassKw];

pub(super) fn at_declaration(p: &TokenSource) -> bool {
    p.at_any(DECLARATION_START)
}

/// Optional `package` directive followed by any number of imports.
pub(super) fn preamble(p: &mut TokenSource) {
    while p.eat(K::Semicolon) {}
    if p.at(K::PackageKw) {
        p.start_node(K::PackageDirective);
        p.bump();
        qualified_name(p);
        p.finish_node();
    }
    while p.eat(K::Semicolon) {}
    if p.at(K::ImportKw) {
        p.start_node(K::ImportList);
        while p.at(K::ImportKw) {
            import_directive(p);
            while p.eat(K::Semicolon) {}
        }
        p.finish_node();
    }
}

/// `import a.b.C`, `import a.b.*`, `import a.b.C as D`
fn import_directive(p: &mut TokenSource) {
    p.start_node(K::ImportDirective);
    p.bump();
    qualified_name(p);
    if p.at(K::Dot) && p.nth(1) == K::Star {
        p.bump();
        p.bump();
    } else if p.eat(K::AsKw) {
        p.expect(K::Ident, "an alias");
    }
    p.finish_node();
}

fn qualified_name(p: &mut TokenSource) {
    p.start_node(K::QualifiedName);
    p.expect(K::Ident, "a name");
    while p.at(K::Dot) && p.nth(1) == K::Ident {
        p.bump();
        p.bump();
    }
    p.finish_node();
}

pub(super) fn declaration(p: &mut TokenSource) {
    if p.depth() >= MAX_DEPTH {
        p.error_until("declaration nested too deeply", &[K::RBrace]);
        return;
    }
    match p.current() {
        K::FunKw => function(p),
        K::ValKw | K::VarKw => property(p),
        K::ClassKw => class(p),
        _ => p.error_and_bump("expected a declaration"),
    }
}

/// `fun name(params): Type { ... }` or `fun name(params) = expr`
fn function(p: &mut TokenSource) {
    p.start_node(K::Fun);
    p.bump();
    p.expect(K::Ident, "a function name");
    if p.at(K::LParen) {
        value_parameters(p);
    } else {
        p.error("expected `(`");
    }
    if p.eat(K::Colon) {
        type_refs::type_reference(p);
    }
    if p.at(K::LBrace) {
        block(p);
    } else if p.eat(K::Eq) {
        expressions::expression(p);
    }
    p.finish_node();
}

/// `val name: Type = expr`
fn property(p: &mut TokenSource) {
    p.start_node(K::Property);
    p.bump();
    p.expect(K::Ident, "a property name");
    if p.eat(K::Colon) {
        type_refs::type_reference(p);
    }
    if p.eat(K::Eq) {
        expressions::expression(p);
    }
    p.finish_node();
}

/// `class Name(params) { members }`
fn class(p: &mut TokenSource) {
    p.start_node(K::Class);
    p.bump();
    p.expect(K::Ident, "a class name");
    if p.at(K::LParen) && !p.newline_before_current() {
        value_parameters(p);
    }
    if p.at(K::LBrace) {
        class_body(p);
    }
    p.finish_node();
}

fn class_body(p: &mut TokenSource) {
    p.start_node(K::ClassBody);
    p.bump();
    p.with_newlines(true, |p| {
        loop {
            while p.eat(K::Semicolon) {}
            if p.at(K::RBrace) || p.at_end() {
                break;
            }
            if at_declaration(p) {
                declaration(p);
            } else {
                p.error_until(
                    "expected a member declaration",
                    &[K::RBrace, K::FunKw, K::ValKw, K::VarKw, K::ClassKw],
                );
            }
        }
    });
    p.expect(K::RBrace, "`}`");
    p.finish_node();
}

/// `(a: A, val b: B = default)`
fn value_parameters(p: &mut TokenSource) {
    const RECOVERY: &[SyntaxKind] = &[K::Comma, K::RParen, K::LBrace, K::RBrace];

    p.start_node(K::ValueParameterList);
    p.bump();
    p.with_newlines(false, |p| {
        while !p.at(K::RParen) && !p.at_end() {
            if p.at_any(&[K::Ident, K::ValKw, K::VarKw]) {
                value_parameter(p);
            } else {
                p.error_until("expected a parameter", RECOVERY);
            }
            if !p.eat(K::Comma) {
                break;
            }
        }
    });
    p.expect(K::RParen, "`)`");
    p.finish_node();
}

fn value_parameter(p: &mut TokenSource) {
    p.start_node(K::ValueParameter);
    if p.at_any(&[K::ValKw, K::VarKw]) {
        p.bump();
    }
    p.expect(K::Ident, "a parameter name");
    if p.expect(K::Colon, "`:` and a parameter type") {
        type_refs::type_reference(p);
    }
    if p.eat(K::Eq) {
        expressions::expression(p);
    }
    p.finish_node();
}
