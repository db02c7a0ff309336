//! Integration tests for the fragment entry points.
//!
//! Fragments are parsed without identity, cache or observer:
//! - Each entry point starts from its own grammar root
//! - Repeated calls build structurally equal but distinct trees
//! - A parser's cache is never touched by fragment parsing

use std::sync::Arc;

use parsefront::fragments::{
    parse_block_expression, parse_block_fragment, parse_expression_fragment, parse_fragment,
    parse_lambda_expression, parse_type_fragment,
};
use parsefront::{Fragment, Parser, ReferenceGrammar, SyntaxKind, SyntaxTree, TokenSource};
use rstest::rstest;

type EntryPoint = fn(&ReferenceGrammar, TokenSource) -> SyntaxTree;

#[rstest]
#[case::type_ref(parse_type_fragment::<ReferenceGrammar>, "Map<String, List<Int?>>?")]
#[case::expression(parse_expression_fragment::<ReferenceGrammar>, "user.name.length + 1 > limit")]
#[case::block(parse_block_fragment::<ReferenceGrammar>, "val a = load()\nprint(a)")]
#[case::lambda(parse_lambda_expression::<ReferenceGrammar>, "{ a, b -> a * b }")]
#[case::block_expression(parse_block_expression::<ReferenceGrammar>, "{\n  val x = 1\n  x\n}")]
fn repeated_fragment_calls_build_equal_independent_trees(
    #[case] entry_point: EntryPoint,
    #[case] text: &str,
) {
    let parser = Parser::default();

    let first = entry_point(&ReferenceGrammar, TokenSource::new(text));
    let second = entry_point(&ReferenceGrammar, TokenSource::new(text));

    assert_eq!(first, second, "identical input must give equal trees");
    assert!(!first.ptr_eq(&second), "each call must build its own tree");
    assert!(!first.has_errors(), "unexpected errors: {:?}", first.errors());
    assert_eq!(first.text(), text);
    assert!(parser.cache().is_empty());
}

#[rstest]
#[case(Fragment::Type, SyntaxKind::TypeCodeFragment)]
#[case(Fragment::Expression, SyntaxKind::ExpressionCodeFragment)]
#[case(Fragment::Block, SyntaxKind::BlockCodeFragment)]
#[case(Fragment::Lambda, SyntaxKind::LambdaCodeFragment)]
#[case(Fragment::BlockExpression, SyntaxKind::BlockExpressionCodeFragment)]
fn fragment_roots_match_entry(#[case] fragment: Fragment, #[case] root: SyntaxKind) {
    let tree = parse_fragment(&ReferenceGrammar, fragment, TokenSource::new(""));
    assert_eq!(tree.kind(), root);
}

#[test]
fn fragments_use_the_parsers_engine_without_its_cache() {
    let parser = Parser::default();

    let tree = parse_expression_fragment(parser.engine().as_ref(), TokenSource::new("f(x)"));

    assert_eq!(tree.kind(), SyntaxKind::ExpressionCodeFragment);
    assert!(parser.cache().is_empty());
}

#[test]
fn malformed_fragment_is_recovered_not_rejected() {
    let text = "a + ) b";

    let tree = parse_expression_fragment(&ReferenceGrammar, TokenSource::new(text));

    assert!(tree.has_errors());
    assert_eq!(tree.text(), text);
    assert!(tree.node_kinds().contains(&SyntaxKind::Error));
}

#[test]
fn fragment_trees_can_be_shared_across_threads() {
    let tree = Arc::new(parse_block_fragment(
        &ReferenceGrammar,
        TokenSource::new("f()"),
    ));

    let handle = {
        let tree = Arc::clone(&tree);
        std::thread::spawn(move || tree.text())
    };

    assert_eq!(handle.join().expect("thread should not panic"), "f()");
}
