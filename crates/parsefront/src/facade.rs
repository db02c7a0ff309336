//! The parser facade: whole-file and script parsing with caching.
//!
//! [`Parser`] combines a [`GrammarEngine`], a session-owned [`ParseCache`],
//! a [`Selector`] and a [`ParseObserver`]. A call either returns the tree
//! already cached for the request's identity, without touching the engine,
//! or selects a grammar entry, runs the engine, stores the result and
//! returns it.
//!
//! ## Design Decisions
//!
//! | Decision | Choice | Rationale |
//! |----------|--------|-----------|
//! | Cache ownership | Injected `Arc<ParseCache>` | Sessions and tests get isolated caches |
//! | Cache key | Identity only | Content is not compared; evict to re-parse |
//! | First population | Per-identity `OnceLock` | Racing callers run the engine once |
//! | Bare entry calls | [`EntryParser`] always fails | No file context means no entry choice |
//! | Diagnostics | [`ParseObserver`] | Timing and hit/miss never affect control flow |

use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use xxhash_rust::xxh3::xxh3_64;

use crate::cache::ParseCache;
use crate::config::ParserConfig;
use crate::engine::GrammarEngine;
use crate::error::{Error, Result};
use crate::grammar::ReferenceGrammar;
use crate::observe::{NoopObserver, ParseEvent, ParseObserver, TracingObserver};
use crate::selector::Selector;
use crate::syntax::SyntaxTree;
use crate::tokens::TokenSource;
use crate::types::{FileIdentity, GrammarEntry, ParseRequest, SourceKind};

/// A tree together with the event describing how it was obtained.
#[derive(Debug, Clone)]
pub struct Parsed {
    /// The resulting tree; shared with the cache on a hit.
    pub tree: SyntaxTree,
    /// What the call did.
    pub event: ParseEvent,
}

/// Whole-file and script parser with an identity-keyed cache.
///
/// `Parser` is `Send + Sync`; share one by reference (or `Arc`) across
/// threads.
pub struct Parser {
    engine: Arc<dyn GrammarEngine>,
    cache: Arc<ParseCache>,
    observer: Arc<dyn ParseObserver>,
    selector: Selector,
    fingerprint_content: bool,
}

impl Parser {
    /// Create a parser over `engine` storing trees in `cache`.
    ///
    /// Events go to [`TracingObserver`]; content fingerprinting is off.
    pub fn new(engine: Arc<dyn GrammarEngine>, cache: Arc<ParseCache>) -> Self {
        Self {
            engine,
            cache,
            observer: Arc::new(TracingObserver),
            selector: Selector::default(),
            fingerprint_content: false,
        }
    }

    /// Create a parser configured by `config`.
    pub fn from_config(
        engine: Arc<dyn GrammarEngine>,
        cache: Arc<ParseCache>,
        config: &ParserConfig,
    ) -> Self {
        let observer: Arc<dyn ParseObserver> = if config.emit_parse_events {
            Arc::new(TracingObserver)
        } else {
            Arc::new(NoopObserver)
        };
        Self::new(engine, cache)
            .with_selector(Selector::with_canonical_extension(
                config.canonical_extension.clone(),
            ))
            .with_observer(observer)
            .with_fingerprinting(config.fingerprint_content)
    }

    /// Replace the observer.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn ParseObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Replace the entry selector.
    #[must_use]
    pub fn with_selector(mut self, selector: Selector) -> Self {
        self.selector = selector;
        self
    }

    /// Turn content fingerprinting on or off.
    #[must_use]
    pub fn with_fingerprinting(mut self, enabled: bool) -> Self {
        self.fingerprint_content = enabled;
        self
    }

    /// The cache this parser reads and populates.
    #[must_use]
    pub fn cache(&self) -> &Arc<ParseCache> {
        &self.cache
    }

    /// The grammar engine.
    #[must_use]
    pub fn engine(&self) -> &Arc<dyn GrammarEngine> {
        &self.engine
    }

    /// The entry selector.
    #[must_use]
    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Parse `tokens` as the file described by `request`.
    ///
    /// If the request carries an identity that is already cached, the cached
    /// tree is returned and `tokens` is ignored, whatever it contains.
    pub fn parse(&self, request: &ParseRequest, tokens: TokenSource) -> SyntaxTree {
        self.parse_detailed(request, tokens).tree
    }

    /// Lex `text` and parse it as the file described by `request`.
    pub fn parse_source(&self, request: &ParseRequest, text: &str) -> SyntaxTree {
        self.parse(request, TokenSource::new(text))
    }

    /// Like [`Parser::parse`], also returning the event sent to the observer.
    pub fn parse_detailed(&self, request: &ParseRequest, tokens: TokenSource) -> Parsed {
        let file_name = request.file_name.as_str();

        let Some(identity) = &request.identity else {
            let entry = self.entry_for(request);
            let (tree, elapsed) = self.invoke(entry, tokens);
            return self.report(tree, ParseEvent::miss(file_name, entry, elapsed));
        };

        let fingerprint = self
            .fingerprint_content
            .then(|| xxh3_64(tokens.text().as_bytes()));
        let mut invocation = None;
        let outcome = self.cache.get_or_insert_with(identity.clone(), || {
            let entry = self.entry_for(request);
            let (tree, elapsed) = self.invoke(entry, tokens);
            invocation = Some((entry, elapsed));
            (tree, fingerprint)
        });

        let event = match invocation {
            Some((entry, elapsed)) => ParseEvent::miss(file_name, entry, elapsed),
            None => {
                let content_changed = fingerprint
                    .zip(outcome.fingerprint)
                    .map(|(now, then)| now != then);
                ParseEvent::hit(file_name, content_changed)
            }
        };
        self.report(outcome.tree, event)
    }

    /// Read, identify and parse the file at `path`.
    ///
    /// The identity is the canonical path, so different spellings of the
    /// same file share one cache entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the path cannot be resolved or read.
    pub fn parse_path(&self, path: &Path, source_kind: SourceKind) -> Result<Parsed> {
        let identity = FileIdentity::canonical(path)?;
        let text = std::fs::read_to_string(identity.as_path())?;
        let request = ParseRequest::for_file(identity.as_path())
            .with_identity(identity)
            .with_source_kind(source_kind);
        Ok(self.parse_detailed(&request, TokenSource::new(text)))
    }

    fn entry_for(&self, request: &ParseRequest) -> GrammarEntry {
        self.selector.select(&request.file_name, request.source_kind)
    }

    fn invoke(&self, entry: GrammarEntry, tokens: TokenSource) -> (SyntaxTree, Duration) {
        let start = Instant::now();
        let tree = self.engine.run(entry, tokens);
        (tree, start.elapsed())
    }

    fn report(&self, tree: SyntaxTree, event: ParseEvent) -> Parsed {
        self.observer.on_parse(&event);
        Parsed { tree, event }
    }
}

impl Default for Parser {
    /// The reference grammar with a fresh cache.
    fn default() -> Self {
        Self::new(Arc::new(ReferenceGrammar), Arc::new(ParseCache::new()))
    }
}

impl fmt::Debug for Parser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser")
            .field("cached", &self.cache.len())
            .field("selector", &self.selector)
            .field("fingerprint_content", &self.fingerprint_content)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Single-argument entry protocol
// ============================================================================

/// Parse starting from a named grammar entry, with nothing but the tokens.
pub trait EntryParser {
    /// Parse `tokens` from `entry`.
    ///
    /// # Errors
    ///
    /// Implementations that need file context return
    /// [`Error::MissingFileContext`].
    fn parse_entry(&self, entry: GrammarEntry, tokens: TokenSource) -> Result<SyntaxTree>;
}

impl EntryParser for Parser {
    /// Always fails: the facade cannot choose between the whole-file and
    /// script grammars, or find a cache key, without a [`ParseRequest`].
    /// Use [`Parser::parse`] or the [fragment entry points](crate::fragments).
    fn parse_entry(&self, entry: GrammarEntry, _tokens: TokenSource) -> Result<SyntaxTree> {
        Err(Error::MissingFileContext { entry })
    }
}
