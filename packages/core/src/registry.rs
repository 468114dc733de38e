//! The public resolution facade.
//!
//! A `Registry` canonicalizes an incoming URI, asks the mount cache for
//! the most specific matching context, short-circuits into that
//! context's nested mounts where possible, and walks whatever path
//! remains one segment at a time.

use std::path::Path;
use std::sync::Arc;

use url::Url;

use crate::cache::MountCache;
use crate::context::MountContext;
use crate::error::VfsError;
use crate::node::Node;
use crate::path::VirtualPath;

/// Process-wide resolution configuration.
///
/// Read once at startup and immutable afterwards; inject it into the
/// `Registry` instead of consulting the environment at lookup time.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegistryConfig {
    /// Rewrite URI paths to their canonical, symlink-resolved absolute
    /// form before lookup. Off by default.
    pub force_canonical: bool,
}

impl RegistryConfig {
    /// Environment key controlling canonical lookup.
    pub const FORCE_CANONICAL_VAR: &'static str = "MOUNTFS_FORCE_CANONICAL";

    /// Read the configuration from the environment.
    pub fn from_env() -> Self {
        let force_canonical = std::env::var(Self::FORCE_CANONICAL_VAR)
            .map(|v| {
                let v = v.trim();
                v == "1" || v.eq_ignore_ascii_case("true")
            })
            .unwrap_or(false);
        RegistryConfig { force_canonical }
    }
}

/// Maps arbitrary URIs to nodes inside registered mounts.
pub struct Registry {
    cache: MountCache,
    force_canonical: bool,
}

impl Registry {
    /// Create a registry with the given startup configuration.
    pub fn new(config: RegistryConfig) -> Self {
        if config.force_canonical {
            log::info!("force canonical lookup is enabled");
        }
        Registry {
            cache: MountCache::new(),
            force_canonical: config.force_canonical,
        }
    }

    /// The underlying mount cache.
    pub fn cache(&self) -> &MountCache {
        &self.cache
    }

    /// Register a mount context.
    ///
    /// The cacheable constraint is verified here, before any cache
    /// mutation: cacheability is this registry's gate to the cache, not
    /// the cache's own business logic.
    pub fn add_context(&self, context: &Arc<MountContext>) {
        if context.is_cacheable() {
            self.cache.add(context);
        }
    }

    /// Unregister a mount context and release its backend.
    ///
    /// Backend release is best-effort; a failure is logged and never
    /// aborts the unmount.
    pub fn remove_context(&self, context: &Arc<MountContext>) {
        if context.is_cacheable() {
            self.cache.remove(context);
        }
        context.close();
    }

    /// Rewrite the URI's path to its canonical symlink-resolved absolute
    /// form when the startup switch is on; the identity function when
    /// off. Scheme, host, query and fragment are preserved unchanged.
    pub fn canonicalize(&self, uri: &Url) -> Result<Url, VfsError> {
        if !self.force_canonical {
            return Ok(uri.clone());
        }
        let canonical = std::fs::canonicalize(Path::new(uri.path()))?;
        let path = canonical
            .to_str()
            .ok_or_else(|| VfsError::InvalidArgument {
                message: format!("canonical path of '{}' is not valid UTF-8", uri),
            })?;
        let mut rewritten = uri.clone();
        rewritten.set_path(path);
        Ok(rewritten)
    }

    /// The context mounted exactly at `uri`, or none.
    ///
    /// This is an exact-mount lookup, not a general resolver: a URI that
    /// points below a mount root yields none.
    pub fn get_context(&self, uri: &str) -> Result<Option<Arc<MountContext>>, VfsError> {
        let uri = self.parse(uri)?;
        let uri = self.canonicalize(&uri)?;
        if let Some(context) = self.cache.find(&uri) {
            let path = VirtualPath::from_uri(&uri)?;
            if path.strip_prefix(context.root_path()).is_some_and(|r| r.is_empty()) {
                return Ok(Some(context));
            }
        }
        Ok(None)
    }

    /// Resolve `uri` to a node inside the most specific registered
    /// mount.
    ///
    /// An unmounted URI is simply not present (`Ok(None)`, not a fault).
    /// Inside a mount, the deepest matching nested-mount entry is tried
    /// first with only the path suffix beyond its prefix, so an already
    /// materialized nested archive acts as its own resolution root; when
    /// the nested walk yields nothing, resolution falls back to the full
    /// walk from the mount's own root, which faults with diagnostics on
    /// a missing child.
    pub fn get_file(&self, uri: &str) -> Result<Option<Arc<dyn Node>>, VfsError> {
        let uri = self.parse(uri)?;
        let uri = self.canonicalize(&uri)?;

        let Some(context) = self.cache.find(&uri) else {
            return Ok(None);
        };
        let path = VirtualPath::from_uri(&uri)?;
        let Some(relative) = path.strip_prefix(context.root_path()) else {
            return Ok(None);
        };

        if let Some((prefix, node)) = context.furthest_temp_mount(&relative) {
            let suffix = relative
                .strip_prefix(&prefix)
                .unwrap_or_else(VirtualPath::root);
            if let Some(found) = Self::find_node(&node, &suffix, true)? {
                return Ok(Some(found));
            }
        }

        Self::find_node(&context.root_node(), &relative, false)
    }

    fn parse(&self, uri: &str) -> Result<Url, VfsError> {
        if uri.trim().is_empty() {
            return Err(VfsError::InvalidArgument {
                message: "empty uri".to_string(),
            });
        }
        Ok(Url::parse(uri)?)
    }

    /// Walk `path` from `root`, one segment at a time.
    ///
    /// With `allow_not_found`, a missing segment yields `Ok(None)`;
    /// otherwise it is a fault naming the searched segment and the
    /// children actually present at the point the walk stopped.
    fn find_node(
        root: &Arc<dyn Node>,
        path: &VirtualPath,
        allow_not_found: bool,
    ) -> Result<Option<Arc<dyn Node>>, VfsError> {
        let mut current = root.clone();
        for segment in &path.components {
            match current.child(segment)? {
                Some(child) => current = child,
                None if allow_not_found => return Ok(None),
                None => {
                    let available = current
                        .children(false)?
                        .iter()
                        .map(|c| c.name())
                        .collect();
                    return Err(VfsError::NotFound {
                        name: segment.clone(),
                        parent: current.file().to_string(),
                        available,
                    });
                }
            }
        }
        Ok(Some(current))
    }
}
