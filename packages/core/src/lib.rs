//! Core MountFS: uniform, path-based access to mounted resources.
//!
//! Resources may live on a real disk, inside an archive, or be
//! synthesized from several physical roots; clients address them by URI
//! and this layer resolves the URI to a concrete readable node:
//! - `FileSystem`: the pluggable backend capability interface
//! - `MountContext`: one backend + one root node + nested-mount index
//! - `MountCache`: longest-prefix lookup over registered mounts
//! - `Registry`: canonicalization and the resolution walk
//!
//! # Example
//!
//! ```rust,no_run
//! use mountfs_core::{Registry, RegistryConfig};
//!
//! let registry = Registry::new(RegistryConfig::from_env());
//! // mount contexts are registered out of band, then:
//! let node = registry.get_file("file:///deploy/app/x.txt")?;
//! # Ok::<(), mountfs_core::VfsError>(())
//! ```

mod cache;
mod context;
mod error;
mod file;
mod fs;
mod node;
mod path;
mod path_trie;
mod registry;
#[cfg(test)]
mod testing;

pub use cache::MountCache;
pub use context::{MountConstraint, MountContext};
pub use error::VfsError;
pub use file::VirtualFile;
pub use fs::{native_relative, CodeSigner, FileSystem, NEEDS_CONVERSION};
pub use node::{BackendNode, Node};
pub use path::{PathError, VirtualPath};
pub use path_trie::PathTrie;
pub use registry::{Registry, RegistryConfig};

// Re-export the URI type clients address mounts with.
pub use url::Url;
