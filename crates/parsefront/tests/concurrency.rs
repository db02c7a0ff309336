//! Integration tests for concurrent use of one parser and its cache.
//!
//! - Distinct identities parsed in parallel are all cached, none overwritten
//! - Racing first parses of one identity run the engine exactly once
//! - Readers never observe a partially stored tree
//! - Evicting during a first parse does not drop the tree it stores

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use parsefront::{
    FileIdentity, GrammarEngine, NoopObserver, ParseCache, ParseRequest, Parser, ReferenceGrammar,
    TokenSource,
};

/// Reference grammar that is slow on whole files and counts invocations.
#[derive(Default)]
struct SlowEngine {
    calls: AtomicUsize,
}

impl SlowEngine {
    fn whole_file(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(20));
    }
}

impl GrammarEngine for SlowEngine {
    fn parse_file(&self, tokens: &mut TokenSource) {
        self.whole_file();
        ReferenceGrammar.parse_file(tokens);
    }

    fn parse_script(&self, tokens: &mut TokenSource) {
        self.whole_file();
        ReferenceGrammar.parse_script(tokens);
    }

    fn parse_type_code_fragment(&self, tokens: &mut TokenSource) {
        ReferenceGrammar.parse_type_code_fragment(tokens);
    }

    fn parse_expression_code_fragment(&self, tokens: &mut TokenSource) {
        ReferenceGrammar.parse_expression_code_fragment(tokens);
    }

    fn parse_block_code_fragment(&self, tokens: &mut TokenSource) {
        ReferenceGrammar.parse_block_code_fragment(tokens);
    }

    fn parse_lambda_expression(&self, tokens: &mut TokenSource) {
        ReferenceGrammar.parse_lambda_expression(tokens);
    }

    fn parse_block_expression(&self, tokens: &mut TokenSource) {
        ReferenceGrammar.parse_block_expression(tokens);
    }
}

fn shared_parser() -> (Arc<SlowEngine>, Arc<Parser>) {
    let engine = Arc::new(SlowEngine::default());
    let parser = Parser::new(engine.clone(), Arc::new(ParseCache::new()))
        .with_observer(Arc::new(NoopObserver));
    (engine, Arc::new(parser))
}

#[test]
fn distinct_identities_parsed_concurrently_are_all_cached() {
    let (engine, parser) = shared_parser();
    let barrier = Arc::new(Barrier::new(2));

    let handles: Vec<_> = [("A.kt", "fun a() {}"), ("B.kt", "fun b() {}")]
        .into_iter()
        .map(|(name, text)| {
            let parser = Arc::clone(&parser);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                parser.parse_source(&ParseRequest::for_file(name), text)
            })
        })
        .collect();

    let trees: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("parse thread should not panic"))
        .collect();

    assert_eq!(engine.calls.load(Ordering::SeqCst), 2);
    let a = parser.cache().get(&FileIdentity::new("A.kt")).expect("A cached");
    let b = parser.cache().get(&FileIdentity::new("B.kt")).expect("B cached");
    assert!(a.ptr_eq(&trees[0]));
    assert!(b.ptr_eq(&trees[1]));
    assert_eq!(a.text(), "fun a() {}");
    assert_eq!(b.text(), "fun b() {}");
}

#[test]
fn racing_first_parses_of_one_identity_run_engine_once() {
    let (engine, parser) = shared_parser();
    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|i| {
            let parser = Arc::clone(&parser);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                // Content differs per thread; only the winner's is stored.
                parser.parse_source(&ParseRequest::for_file("Shared.kt"), &format!("val v{i} = {i}"))
            })
        })
        .collect();

    let trees: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("parse thread should not panic"))
        .collect();

    assert_eq!(engine.calls.load(Ordering::SeqCst), 1);
    assert!(
        trees.windows(2).all(|w| w[0].ptr_eq(&w[1])),
        "every caller should receive the one stored tree"
    );
    assert_eq!(parser.cache().len(), 1);
}

#[test]
fn many_files_in_parallel_populate_cache_once_each() {
    let (engine, parser) = shared_parser();
    let files: Vec<String> = (0..16).map(|i| format!("src/File{i}.kt")).collect();

    thread::scope(|scope| {
        for round in 0..2 {
            for name in &files {
                let parser = &parser;
                scope.spawn(move || {
                    parser.parse_source(&ParseRequest::for_file(name), &format!("val r = {round}"));
                });
            }
        }
    });

    assert_eq!(engine.calls.load(Ordering::SeqCst), files.len());
    assert_eq!(parser.cache().len(), files.len());
}

#[test]
fn concurrent_readers_see_absent_or_complete_trees() {
    let cache = Arc::new(ParseCache::new());
    let identity = FileIdentity::new("Late.kt");
    let barrier = Arc::new(Barrier::new(2));

    let writer = {
        let cache = Arc::clone(&cache);
        let identity = identity.clone();
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            cache.get_or_insert_with(identity, || {
                thread::sleep(Duration::from_millis(20));
                let tree = ReferenceGrammar.run(
                    parsefront::GrammarEntry::TopLevelFile,
                    TokenSource::new("val done = true"),
                );
                (tree, None)
            })
        })
    };

    barrier.wait();
    for _ in 0..50 {
        if let Some(tree) = cache.get(&identity) {
            assert_eq!(tree.text(), "val done = true");
        }
        thread::sleep(Duration::from_millis(1));
    }

    let outcome = writer.join().expect("writer should not panic");
    assert!(cache.get(&identity).expect("stored").ptr_eq(&outcome.tree));
}

#[test]
fn evict_during_first_parse_keeps_the_stored_tree() {
    let cache = Arc::new(ParseCache::new());
    let identity = FileIdentity::new("Busy.kt");
    let started = Arc::new(Barrier::new(2));

    let writer = {
        let cache = Arc::clone(&cache);
        let identity = identity.clone();
        let started = Arc::clone(&started);
        thread::spawn(move || {
            cache.get_or_insert_with(identity, || {
                started.wait();
                thread::sleep(Duration::from_millis(50));
                let tree = ReferenceGrammar.run(
                    parsefront::GrammarEntry::TopLevelFile,
                    TokenSource::new("val busy = true"),
                );
                (tree, None)
            })
        })
    };

    started.wait();
    assert!(!cache.evict(&identity), "nothing stored yet");

    let outcome = writer.join().expect("writer should not panic");
    let cached = cache.get(&identity).expect("tree stored after eviction attempt");
    assert!(cached.ptr_eq(&outcome.tree));
    assert_eq!(cache.len(), 1);

    assert!(cache.evict(&identity));
    assert!(cache.is_empty());
}
