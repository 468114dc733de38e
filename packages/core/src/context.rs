//! Mount contexts: one backend, one root node, one nested-mount index.

use std::collections::BTreeSet;
use std::sync::{Arc, PoisonError, RwLock};

use url::Url;

use crate::error::VfsError;
use crate::fs::FileSystem;
use crate::node::Node;
use crate::path::VirtualPath;
use crate::path_trie::PathTrie;

/// Declared constraints on a mount context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MountConstraint {
    /// The context may be registered in the shared mount cache.
    Cacheable,
}

/// The record owning a mount's backend, constraints, and nested-mount
/// index.
///
/// A context is created when a resource is mounted and destroyed by an
/// explicit unmount, which also releases the backend. The nested-mount
/// index maps a relative path prefix to an already-materialized sub-tree
/// root (a "temp mount"): an archive beneath this mount that must be
/// treated as an independent resolution root for everything under its
/// prefix. Entries live and die with their owning context.
pub struct MountContext {
    root_uri: Url,
    root_path: VirtualPath,
    fs: Arc<dyn FileSystem>,
    root_node: Arc<dyn Node>,
    constraints: BTreeSet<MountConstraint>,
    temp_mounts: RwLock<PathTrie<Arc<dyn Node>>>,
}

impl MountContext {
    /// Bind an already-constructed backend and root node to a mount root
    /// URI. How the backend was built is the caller's business.
    pub fn new(
        root_uri: Url,
        fs: Arc<dyn FileSystem>,
        root_node: Arc<dyn Node>,
        constraints: BTreeSet<MountConstraint>,
    ) -> Result<Arc<Self>, VfsError> {
        let root_path = VirtualPath::from_uri(&root_uri)?;
        Ok(Arc::new(MountContext {
            root_uri,
            root_path,
            fs,
            root_node,
            constraints,
            temp_mounts: RwLock::new(PathTrie::new()),
        }))
    }

    /// The URI this context is mounted at.
    pub fn root_uri(&self) -> &Url {
        &self.root_uri
    }

    /// Path component of the mount root URI.
    pub fn root_path(&self) -> &VirtualPath {
        &self.root_path
    }

    /// The backend serving this mount.
    pub fn filesystem(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    /// The root tree node of this mount.
    pub fn root_node(&self) -> Arc<dyn Node> {
        self.root_node.clone()
    }

    /// Declared constraints.
    pub fn constraints(&self) -> &BTreeSet<MountConstraint> {
        &self.constraints
    }

    /// Whether this context may live in the mount cache.
    pub fn is_cacheable(&self) -> bool {
        self.constraints.contains(&MountConstraint::Cacheable)
    }

    /// Register a materialized sub-tree at a relative path prefix.
    pub fn add_temp_mount(&self, prefix: VirtualPath, node: Arc<dyn Node>) {
        self.temp_mounts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(&prefix.components, node);
    }

    /// Drop the sub-tree registered at the exact prefix, if any.
    pub fn remove_temp_mount(&self, prefix: &VirtualPath) -> Option<Arc<dyn Node>> {
        self.temp_mounts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&prefix.components)
    }

    /// The deepest nested-mount entry whose prefix matches `relative`,
    /// with the prefix it consumed. Deeper entries always win over
    /// ancestor ones.
    pub fn furthest_temp_mount(
        &self,
        relative: &VirtualPath,
    ) -> Option<(VirtualPath, Arc<dyn Node>)> {
        let guard = self
            .temp_mounts
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let (node, depth) = guard.find_ancestor(&relative.components)?;
        let prefix = VirtualPath {
            components: relative.components[..depth].to_vec(),
        };
        Some((prefix, node.clone()))
    }

    /// Release the owned backend's resources.
    ///
    /// Best-effort: a close failure is recorded and ignored so an
    /// unmount never aborts halfway.
    pub fn close(&self) {
        if let Err(error) = self.fs.close() {
            log::warn!("failed to close backend for '{}': {}", self.root_uri, error);
        }
    }
}
