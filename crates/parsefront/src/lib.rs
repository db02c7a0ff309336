//! # Parsefront: Grammar Entry Dispatch and Parse Caching
//!
//! Parsefront sits between callers that want syntax trees and a grammar
//! engine that builds them. It picks the right starting rule for a file,
//! memoises whole-file trees by file identity, and offers fixed entry points
//! for parsing code fragments that have no file behind them.
//!
//! ## Design Philosophy
//!
//! - **Facade, not grammar** - The engine is pluggable; [`ReferenceGrammar`] is one implementation
//! - **Identity, not content** - Cached trees are keyed by [`FileIdentity`]; callers evict on change
//! - **Session-owned state** - A [`ParseCache`] is injected, never global
//! - **Never fail on input** - Malformed source yields `ERROR` nodes, not errors
//! - **Fail fast on misuse** - Bare entry calls without file context are rejected
//!
//! ## Quick Start
//!
//! ```
//! use parsefront::{ParseRequest, Parser, SyntaxKind};
//!
//! let parser = Parser::default();
//! let request = ParseRequest::for_file("src/Main.kt");
//!
//! let tree = parser.parse_source(&request, "fun main() { println(\"hi\") }");
//! assert_eq!(tree.kind(), SyntaxKind::File);
//! assert!(!tree.has_errors());
//!
//! // Same identity: served from the cache, whatever the new text says.
//! let again = parser.parse_source(&request, "val changed = true");
//! assert!(again.ptr_eq(&tree));
//! ```
//!
//! Fragments bypass the cache:
//!
//! ```
//! use parsefront::{ReferenceGrammar, SyntaxKind, TokenSource, fragments};
//!
//! let tree = fragments::parse_expression_fragment(&ReferenceGrammar, TokenSource::new("a + b * c"));
//! assert_eq!(tree.kind(), SyntaxKind::ExpressionCodeFragment);
//! ```

pub mod cache;
pub mod config;
pub mod engine;
mod error;
pub mod facade;
pub mod fragments;
pub mod grammar;
pub mod observe;
pub mod selector;
pub mod syntax;
pub mod tokens;
mod types;

pub use cache::{CacheOutcome, ParseCache};
pub use config::ParserConfig;
pub use engine::GrammarEngine;
pub use error::{Error, Result};
pub use facade::{EntryParser, Parsed, Parser};
pub use grammar::ReferenceGrammar;
pub use observe::{NoopObserver, ParseEvent, ParseObserver, TracingObserver};
pub use selector::{Selector, select};
pub use syntax::{Lang, SyntaxError, SyntaxKind, SyntaxNode, SyntaxToken, SyntaxTree};
pub use tokens::TokenSource;
pub use types::{CacheStatus, FileIdentity, Fragment, GrammarEntry, ParseRequest, SourceKind};
