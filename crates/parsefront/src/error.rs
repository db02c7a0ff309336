//! Error types for parsefront operations.
//!
//! Very little in this crate can fail:
//!
//! - **Malformed source never fails.** The grammar engine recovers and records
//!   problems as `ERROR` nodes and [`SyntaxError`](crate::SyntaxError)s inside
//!   the returned tree.
//! - **Usage errors fail fast.** Asking the facade to parse a bare grammar
//!   entry without file context is always rejected.
//! - **Infrastructure errors** (reading a config file, resolving a path to a
//!   canonical identity) are reported as-is.
//!
//! Serving a cached tree for an identity whose content has since changed is
//! *not* an error here. See [`ParseCache`](crate::ParseCache).

use thiserror::Error;

use crate::types::GrammarEntry;

/// Result type for parsefront operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for parsefront operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A grammar entry was requested without the file context needed to
    /// choose between the whole-file and script grammars.
    #[error(
        "cannot parse `{entry}` without file context; use `Parser::parse` or a fragment entry point"
    )]
    MissingFileContext {
        /// The entry the caller asked for.
        entry: GrammarEntry,
    },

    /// File system operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration or arguments
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Returns `true` if this error signals API misuse rather than a
    /// problem with the input or the environment.
    #[must_use]
    pub fn is_usage_error(&self) -> bool {
        matches!(self, Self::MissingFileContext { .. })
    }
}
