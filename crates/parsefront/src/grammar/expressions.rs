//! Expressions, by precedence climbing.

use super::{MAX_DEPTH, block, statements};
use crate::syntax::SyntaxKind;
use crate::tokens::TokenSource;

use SyntaxKind as K;

const PREFIX_OPERATORS: &[SyntaxKind] = &[K::Minus, K::Plus, K::Excl];

/// Tokens that cannot start an expression but belong to an enclosing rule;
/// an atom that finds one reports and leaves it in place.
const ATOM_RECOVERY: &[SyntaxKind] = &[
    K::Eof,
    K::RParen,
    K::RBrace,
    K::Comma,
    K::Semicolon,
    K::Arrow,
    K::ElseKw,
    K::FunKw,
    K::ValKw,
    K::VarKw,
    K::ClassKw,
];

/// `(left, right)` binding power; higher binds tighter. Assignment is the
/// only right-associative operator.
fn infix_binding_power(kind: SyntaxKind) -> Option<(u8, u8)> {
    let power = match kind {
        K::Eq => (2, 1),
        K::OrOr => (3, 4),
        K::AndAnd => (5, 6),
        K::EqEq | K::ExclEq => (7, 8),
        K::Lt | K::Gt | K::LtEq | K::GtEq => (9, 10),
        K::Plus | K::Minus => (11, 12),
        K::Star | K::Slash | K::Percent => (13, 14),
        _ => return None,
    };
    Some(power)
}

pub(super) fn expression(p: &mut TokenSource) {
    expression_bp(p, 0);
}

fn expression_bp(p: &mut TokenSource, min_power: u8) {
    let checkpoint = p.checkpoint();
    if !unary(p) {
        return;
    }
    loop {
        let Some((left, right)) = infix_binding_power(p.current()) else {
            break;
        };
        // A line break before a binary operator ends the statement.
        if left < min_power || p.newline_before_current() {
            break;
        }
        p.start_node_at(checkpoint, K::BinaryExpression);
        p.bump();
        expression_bp(p, right);
        p.finish_node();
    }
}

/// Returns `false` if nothing was built.
fn unary(p: &mut TokenSource) -> bool {
    if p.depth() >= MAX_DEPTH {
        let consumed = !p.at_end();
        p.error_until("expression nested too deeply", &[K::RParen, K::RBrace]);
        return consumed;
    }
    if p.at_any(PREFIX_OPERATORS) {
        p.start_node(K::PrefixExpression);
        p.bump();
        unary(p);
        p.finish_node();
        return true;
    }
    postfix(p)
}

fn postfix(p: &mut TokenSource) -> bool {
    let checkpoint = p.checkpoint();
    if !atom(p) {
        return false;
    }
    loop {
        match p.current() {
            K::LParen if !p.newline_before_current() => {
                p.start_node_at(checkpoint, K::CallExpression);
                value_arguments(p);
                p.finish_node();
            }
            // Trailing lambda: `items.forEach { println(it) }`
            K::LBrace if !p.newline_before_current() => {
                p.start_node_at(checkpoint, K::CallExpression);
                lambda(p);
                p.finish_node();
            }
            K::Dot => {
                p.start_node_at(checkpoint, K::DotQualifiedExpression);
                p.bump();
                if p.at(K::Ident) {
                    p.start_node(K::ReferenceExpression);
                    p.bump();
                    p.finish_node();
                } else {
                    p.error("expected a member name after `.`");
                }
                p.finish_node();
            }
            _ => break,
        }
    }
    true
}

fn atom(p: &mut TokenSource) -> bool {
    match p.current() {
        K::Ident => {
            p.start_node(K::ReferenceExpression);
            p.bump();
            p.finish_node();
        }
        K::IntLiteral | K::StringLiteral | K::TrueKw | K::FalseKw | K::NullKw => {
            p.start_node(K::Literal);
            p.bump();
            p.finish_node();
        }
        K::LParen => parenthesized(p),
        K::LBrace => lambda(p),
        K::IfKw => if_expression(p),
        K::ReturnKw => return_expression(p),
        kind if ATOM_RECOVERY.contains(&kind) => {
            p.error("expected an expression");
            return false;
        }
        _ => p.error_and_bump("expected an expression"),
    }
    true
}

fn parenthesized(p: &mut TokenSource) {
    p.start_node(K::ParenthesizedExpression);
    p.bump();
    p.with_newlines(false, expression);
    p.expect(K::RParen, "`)`");
    p.finish_node();
}

/// `(a, b)` after a callee.
fn value_arguments(p: &mut TokenSource) {
    p.start_node(K::ValueArgumentList);
    p.bump();
    p.with_newlines(false, |p| {
        while !p.at(K::RParen) && !p.at_end() {
            expression(p);
            if !p.eat(K::Comma) {
                break;
            }
        }
    });
    p.expect(K::RParen, "`)`");
    p.finish_node();
}

/// `{ a, b -> body }` or `{ body }`
pub(super) fn lambda(p: &mut TokenSource) {
    p.start_node(K::LambdaExpression);
    p.start_node(K::FunctionLiteral);
    p.bump();
    if at_lambda_parameters(p) {
        p.start_node(K::LambdaParameterList);
        while p.at(K::Ident) {
            p.bump();
            if !p.eat(K::Comma) {
                break;
            }
        }
        p.finish_node();
        p.expect(K::Arrow, "`->`");
    }
    p.start_node(K::Block);
    statements(p, Some(K::RBrace));
    p.finish_node();
    p.expect(K::RBrace, "`}`");
    p.finish_node();
    p.finish_node();
}

/// Whether the tokens after `{` are `a, b ->` (or a bare `->`).
fn at_lambda_parameters(p: &TokenSource) -> bool {
    if p.at(K::Arrow) {
        return true;
    }
    let mut ahead = p.lookahead();
    loop {
        if ahead.next() != Some(K::Ident) {
            return false;
        }
        match ahead.next() {
            Some(K::Comma) => {}
            Some(K::Arrow) => return true,
            _ => return false,
        }
    }
}

/// `if (cond) then else otherwise`
fn if_expression(p: &mut TokenSource) {
    p.start_node(K::IfExpression);
    p.bump();
    if p.expect(K::LParen, "`(` after `if`") {
        p.with_newlines(false, expression);
        p.expect(K::RParen, "`)`");
    }
    branch(p);
    if p.eat(K::ElseKw) {
        branch(p);
    }
    p.finish_node();
}

fn branch(p: &mut TokenSource) {
    if p.at(K::LBrace) {
        block(p);
    } else {
        expression(p);
    }
}

fn return_expression(p: &mut TokenSource) {
    p.start_node(K::ReturnExpression);
    p.bump();
    if !p.newline_before_current() && !p.at_any(ATOM_RECOVERY) {
        expression(p);
    }
    p.finish_node();
}
