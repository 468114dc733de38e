//! The shared store of currently registered, cacheable mount contexts.

use std::sync::{Arc, PoisonError, RwLock};

use url::Url;

use crate::context::MountContext;
use crate::path_trie::PathTrie;

/// Keyed store of cacheable mount contexts with longest-prefix lookup.
///
/// Keys flatten the mount URI to `[scheme, authority, path segments...]`,
/// so a prefix match implies the scheme and authority match exactly and
/// the mount root path is a whole-segment prefix of the looked-up path.
/// Mount roots are unique tree paths, so lookups cannot tie.
///
/// Contexts are added and removed as whole `Arc`s under a
/// multiple-reader/single-writer lock: readers never block each other and
/// never observe a partially registered mount.
pub struct MountCache {
    mounts: RwLock<PathTrie<Arc<MountContext>>>,
}

fn cache_key(uri: &Url) -> Vec<String> {
    let mut key = vec![uri.scheme().to_string(), uri.authority().to_string()];
    if let Some(segments) = uri.path_segments() {
        key.extend(segments.filter(|s| !s.is_empty()).map(String::from));
    }
    key
}

impl Default for MountCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MountCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        MountCache {
            mounts: RwLock::new(PathTrie::new()),
        }
    }

    /// Register a context iff its constraints mark it cacheable;
    /// otherwise a no-op.
    pub fn add(&self, context: &Arc<MountContext>) {
        if !context.is_cacheable() {
            return;
        }
        self.mounts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(&cache_key(context.root_uri()), context.clone());
    }

    /// Symmetric, idempotent removal.
    pub fn remove(&self, context: &Arc<MountContext>) {
        if !context.is_cacheable() {
            return;
        }
        self.mounts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&cache_key(context.root_uri()));
    }

    /// The context whose mount root is the longest prefix of `uri`, or
    /// none when no registered mount contains it.
    pub fn find(&self, uri: &Url) -> Option<Arc<MountContext>> {
        self.mounts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .find_ancestor(&cache_key(uri))
            .map(|(context, _)| context.clone())
    }

    /// Number of registered contexts.
    pub fn len(&self) -> usize {
        self.mounts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.mounts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}
