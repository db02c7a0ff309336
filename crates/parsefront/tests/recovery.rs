//! Property tests for the reference grammar's error recovery.
//!
//! Whatever the input, every entry must return exactly one tree that
//! reproduces the source text, with problems reported as `ERROR` nodes and
//! syntax errors rather than failures.

use parsefront::{GrammarEngine, GrammarEntry, ReferenceGrammar, SyntaxKind, TokenSource};
use proptest::prelude::*;

/// Source-like text: identifiers, keywords, punctuation and line breaks.
fn source_text() -> impl Strategy<Value = String> {
    let piece = prop_oneof![
        Just("fun ".to_string()),
        Just("val ".to_string()),
        Just("class ".to_string()),
        Just("if ".to_string()),
        Just("else ".to_string()),
        Just("return ".to_string()),
        Just("import ".to_string()),
        Just("package ".to_string()),
        Just("->".to_string()),
        Just("\n".to_string()),
        Just("/* c */".to_string()),
        Just("// c\n".to_string()),
        "[a-z]{1,4}",
        "[0-9]{1,3}",
        "[(){}<>?:;,.=+*/!\" -]",
    ];
    prop::collection::vec(piece, 0..40).prop_map(|pieces| pieces.concat())
}

/// Text made only of comments and whitespace. Block comment bodies may
/// span lines and contain `*`, but never the closing `*/`.
fn comment_text() -> impl Strategy<Value = String> {
    let piece = prop_oneof![
        "[a-z *\n]{0,12}".prop_map(|body| format!("/*{body}*/")),
        "[a-z */]{0,12}".prop_map(|body| format!("//{body}\n")),
        Just(" ".to_string()),
        Just("\n".to_string()),
        Just("\t".to_string()),
    ];
    prop::collection::vec(piece, 0..12).prop_map(|pieces| pieces.concat())
}

proptest! {
    #[test]
    fn every_entry_reproduces_its_input(text in source_text(), index in 0usize..7) {
        let entry = GrammarEntry::ALL[index];

        let tree = ReferenceGrammar.run(entry, TokenSource::new(text.as_str()));

        prop_assert_eq!(tree.text(), text);
        prop_assert_eq!(tree.kind(), entry.root_kind());
    }

    #[test]
    fn error_nodes_imply_reported_errors(text in source_text(), index in 0usize..7) {
        let entry = GrammarEntry::ALL[index];

        let tree = ReferenceGrammar.run(entry, TokenSource::new(text.as_str()));

        if tree.node_kinds().contains(&SyntaxKind::Error) {
            prop_assert!(tree.has_errors());
        }
    }

    #[test]
    fn comment_only_input_has_no_errors(text in comment_text(), index in 0usize..3) {
        let entry = [GrammarEntry::TopLevelFile, GrammarEntry::Script, GrammarEntry::BlockFragment][index];

        let tree = ReferenceGrammar.run(entry, TokenSource::new(text.as_str()));

        prop_assert_eq!(tree.errors().len(), 0, "{:?} on {:?}", tree.errors(), text);
        prop_assert_eq!(tree.text(), text);
    }

    #[test]
    fn arbitrary_text_never_panics(text in "\\PC{0,64}") {
        for entry in GrammarEntry::ALL {
            let tree = ReferenceGrammar.run(entry, TokenSource::new(text.as_str()));
            prop_assert_eq!(tree.text(), text.as_str());
        }
    }
}

#[test]
fn error_offsets_point_into_the_source() {
    let text = "fun (a: ) {\n  val = \n}\n";

    let tree = ReferenceGrammar.run(GrammarEntry::TopLevelFile, TokenSource::new(text));

    assert!(tree.has_errors());
    for error in tree.errors() {
        assert!(
            usize::from(error.offset) <= text.len(),
            "offset {:?} outside source",
            error.offset
        );
    }
}
