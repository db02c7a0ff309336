//! Identity-keyed memo of built syntax trees.
//!
//! ## Keying
//!
//! Entries are keyed by [`FileIdentity`] only. Content is never compared:
//! once an identity is cached, every later request for it gets the same
//! tree, even if the file changed on disk in the meantime. This is the
//! documented behaviour, not an oversight. Integrators who re-parse edited
//! files must [`evict`](ParseCache::evict) them first. The facade can record
//! a content fingerprint next to each entry to *report* such stale hits
//! without changing what is served.
//!
//! There is no eviction policy, TTL or size bound; a cache lives as long as
//! the session that owns it.
//!
//! ## Concurrency
//!
//! The map lock is held only long enough to find or create the slot for an
//! identity. Each slot is a [`OnceLock`], so:
//!
//! - readers never observe a half-stored tree;
//! - the first population of an identity runs exactly once, and concurrent
//!   callers for that identity wait for it instead of parsing again;
//! - populations of different identities proceed in parallel and never
//!   overwrite each other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use crate::syntax::SyntaxTree;
use crate::types::{CacheStatus, FileIdentity};

#[derive(Debug)]
struct Entry {
    tree: SyntaxTree,
    fingerprint: Option<u64>,
}

type Slot = Arc<OnceLock<Entry>>;

/// What [`ParseCache::get_or_insert_with`] found or stored.
#[derive(Debug, Clone)]
pub struct CacheOutcome {
    /// The resident tree for the identity.
    pub tree: SyntaxTree,
    /// Fingerprint stored alongside the tree, if any.
    pub fingerprint: Option<u64>,
    /// `Miss` if this call ran the initializer.
    pub status: CacheStatus,
}

/// Session-owned store of previously built trees.
#[derive(Debug, Default)]
pub struct ParseCache {
    slots: Mutex<HashMap<FileIdentity, Slot>>,
}

impl ParseCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Slots are only ever inserted or removed whole, so a panic while the
    /// lock was held cannot leave the map inconsistent.
    fn lock(&self) -> MutexGuard<'_, HashMap<FileIdentity, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn slot(&self, identity: FileIdentity) -> Slot {
        Arc::clone(self.lock().entry(identity).or_default())
    }

    fn existing_slot(&self, identity: &FileIdentity) -> Option<Slot> {
        self.lock().get(identity).map(Arc::clone)
    }

    /// The tree cached for `identity`, if one has been stored.
    ///
    /// An identity whose first parse is still running on another thread
    /// reads as absent.
    #[must_use]
    pub fn get(&self, identity: &FileIdentity) -> Option<SyntaxTree> {
        self.existing_slot(identity)?
            .get()
            .map(|entry| entry.tree.clone())
    }

    /// Returns `true` if a tree is stored for `identity`.
    #[must_use]
    pub fn contains(&self, identity: &FileIdentity) -> bool {
        self.existing_slot(identity)
            .is_some_and(|slot| slot.get().is_some())
    }

    /// Store `tree` for `identity` unless a tree is already resident, and
    /// return the resident tree. A second write for the same identity is
    /// ignored.
    pub fn put(&self, identity: FileIdentity, tree: SyntaxTree) -> SyntaxTree {
        let slot = self.slot(identity);
        let entry = slot.get_or_init(|| Entry {
            tree,
            fingerprint: None,
        });
        entry.tree.clone()
    }

    /// Return the resident tree for `identity`, or run `init` to build and
    /// store one.
    ///
    /// `init` runs at most once per identity across all threads; callers
    /// racing on the same identity block until it finishes and then share
    /// its result. If `init` panics the identity stays empty.
    pub fn get_or_insert_with<F>(&self, identity: FileIdentity, init: F) -> CacheOutcome
    where
        F: FnOnce() -> (SyntaxTree, Option<u64>),
    {
        let slot = self.slot(identity);
        let mut status = CacheStatus::Hit;
        let entry = slot.get_or_init(|| {
            status = CacheStatus::Miss;
            let (tree, fingerprint) = init();
            Entry { tree, fingerprint }
        });
        CacheOutcome {
            tree: entry.tree.clone(),
            fingerprint: entry.fingerprint,
            status,
        }
    }

    /// Drop the entry for `identity` so the next parse rebuilds it.
    /// Returns `true` if a stored tree was removed.
    ///
    /// A first parse still running on another thread is not interrupted:
    /// its slot stays in place, the tree it builds is stored, and this call
    /// returns `false`. Evict again once that parse has finished.
    pub fn evict(&self, identity: &FileIdentity) -> bool {
        let mut slots = self.lock();
        if !slots.get(identity).is_some_and(|slot| slot.get().is_some()) {
            return false;
        }
        slots.remove(identity);
        tracing::debug!(identity = %identity, "evicted cached syntax tree");
        true
    }

    /// Drop every entry.
    pub fn clear(&self) {
        let mut slots = self.lock();
        let count = slots.len();
        slots.clear();
        tracing::debug!(count, "cleared parse cache");
    }

    /// Number of identities with a stored tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock()
            .values()
            .filter(|slot| slot.get().is_some())
            .count()
    }

    /// Returns `true` if no tree is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Identities with a stored tree, sorted.
    #[must_use]
    pub fn identities(&self) -> Vec<FileIdentity> {
        let mut identities: Vec<_> = self
            .lock()
            .iter()
            .filter(|(_, slot)| slot.get().is_some())
            .map(|(identity, _)| identity.clone())
            .collect();
        identities.sort();
        identities
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::GrammarEngine;
    use crate::grammar::ReferenceGrammar;
    use crate::tokens::TokenSource;
    use crate::types::GrammarEntry;

    fn tree(text: &str) -> SyntaxTree {
        ReferenceGrammar.run(GrammarEntry::Script, TokenSource::new(text))
    }

    #[test]
    fn get_returns_what_was_put() {
        let cache = ParseCache::new();
        let id = FileIdentity::new("a.kts");
        let stored = tree("a()");

        let resident = cache.put(id.clone(), stored.clone());

        assert!(resident.ptr_eq(&stored));
        assert!(cache.get(&id).expect("cached").ptr_eq(&stored));
        assert!(cache.contains(&id));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn second_put_keeps_first_tree() {
        let cache = ParseCache::new();
        let id = FileIdentity::new("a.kts");
        let first = tree("first()");

        cache.put(id.clone(), first.clone());
        let resident = cache.put(id.clone(), tree("second()"));

        assert!(resident.ptr_eq(&first));
        assert_eq!(cache.get(&id).expect("cached").text(), "first()");
    }

    #[test]
    fn lookups_use_normalised_identity() {
        let cache = ParseCache::new();
        cache.put(FileIdentity::new("src/./a.kt"), tree("x"));

        assert!(cache.get(&FileIdentity::new("src/b/../a.kt")).is_some());
    }

    #[test]
    fn get_or_insert_with_runs_init_once() {
        let cache = ParseCache::new();
        let id = FileIdentity::new("a.kts");
        let mut calls = 0;

        let first = cache.get_or_insert_with(id.clone(), || {
            calls += 1;
            (tree("a"), Some(7))
        });
        let second = cache.get_or_insert_with(id, || {
            calls += 1;
            (tree("b"), None)
        });

        assert_eq!(calls, 1);
        assert_eq!(first.status, CacheStatus::Miss);
        assert_eq!(second.status, CacheStatus::Hit);
        assert_eq!(second.fingerprint, Some(7));
        assert!(second.tree.ptr_eq(&first.tree));
    }

    #[test]
    fn evict_and_clear() {
        let cache = ParseCache::new();
        let a = FileIdentity::new("a.kt");
        let b = FileIdentity::new("b.kt");
        cache.put(a.clone(), tree("a"));
        cache.put(b.clone(), tree("b"));

        assert!(cache.evict(&a));
        assert!(!cache.evict(&a));
        assert!(cache.get(&a).is_none());
        assert_eq!(cache.identities(), vec![b]);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn panicking_init_leaves_identity_empty() {
        let cache = ParseCache::new();
        let id = FileIdentity::new("boom.kt");

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            cache.get_or_insert_with(id.clone(), || panic!("engine bug"));
        }));

        assert!(result.is_err());
        assert!(cache.get(&id).is_none());
        let outcome = cache.get_or_insert_with(id, || (tree("ok"), None));
        assert_eq!(outcome.status, CacheStatus::Miss);
    }
}
