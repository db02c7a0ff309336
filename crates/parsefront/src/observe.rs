//! Parse events and the observers that receive them.
//!
//! The facade reports one [`ParseEvent`] per whole-file or script request.
//! Observers are side channels only: they cannot change control flow or the
//! tree that is returned.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::types::{CacheStatus, GrammarEntry};

/// What happened during one facade call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEvent {
    /// File name from the request.
    pub file_name: String,
    /// Entry the engine ran; `None` on a cache hit.
    pub entry: Option<GrammarEntry>,
    /// Whether the cache served the tree.
    pub status: CacheStatus,
    /// Engine wall-clock time; `None` on a cache hit.
    pub elapsed: Option<Duration>,
    /// On a fingerprinted hit, whether the presented content differs from
    /// the content the cached tree was built from.
    pub content_changed: Option<bool>,
}

impl ParseEvent {
    /// Event for a call that ran the engine.
    #[must_use]
    pub fn miss(file_name: impl Into<String>, entry: GrammarEntry, elapsed: Duration) -> Self {
        Self {
            file_name: file_name.into(),
            entry: Some(entry),
            status: CacheStatus::Miss,
            elapsed: Some(elapsed),
            content_changed: None,
        }
    }

    /// Event for a call served from the cache.
    #[must_use]
    pub fn hit(file_name: impl Into<String>, content_changed: Option<bool>) -> Self {
        Self {
            file_name: file_name.into(),
            entry: None,
            status: CacheStatus::Hit,
            elapsed: None,
            content_changed,
        }
    }

    /// Returns `true` if a hit served a tree built from other content.
    #[must_use]
    pub fn is_stale_hit(&self) -> bool {
        self.status == CacheStatus::Hit && self.content_changed == Some(true)
    }
}

/// Receives parse events from the facade.
pub trait ParseObserver: Send + Sync {
    /// Called once per facade parse, after the tree is available.
    fn on_parse(&self, event: &ParseEvent);
}

/// Logs every event through `tracing`.
///
/// Misses are logged at `info` with the engine time, hits at `debug`, and
/// stale hits at `warn`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ParseObserver for TracingObserver {
    fn on_parse(&self, event: &ParseEvent) {
        match event.status {
            CacheStatus::Miss => {
                let elapsed_ms = event
                    .elapsed
                    .map_or(0.0, |elapsed| elapsed.as_secs_f64() * 1000.0);
                info!(
                    file = %event.file_name,
                    entry = event.entry.map_or("unknown", |entry| entry.as_str()),
                    elapsed_ms,
                    "parsed"
                );
            }
            CacheStatus::Hit if event.is_stale_hit() => {
                warn!(
                    file = %event.file_name,
                    "served cached tree built from different content; evict the file to re-parse"
                );
            }
            CacheStatus::Hit => debug!(file = %event.file_name, "parse cache hit"),
        }
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ParseObserver for NoopObserver {
    fn on_parse(&self, _event: &ParseEvent) {}
}
